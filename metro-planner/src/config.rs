//! Planner configuration.
//!
//! All tunables live here: fixed timing constants, per-line average speeds,
//! the heuristic wait-time fallback table, the fare schedule, and the
//! search safety valve. Defaults reproduce the production network values.

use std::collections::HashMap;

/// Fixed timing constants, in fractional minutes.
#[derive(Debug, Clone)]
pub struct TimingConfig {
    /// Time to change lines at a transfer station.
    pub transfer_minutes: f64,

    /// Dwell time per intermediate stop while riding.
    pub stop_minutes: f64,

    /// Wait time assumed when no schedule and no heuristic band applies.
    pub default_wait_minutes: f64,

    /// Fixed wait assumed on loop lines, where no terminal timetable exists.
    pub loop_wait_minutes: f64,

    /// Travel time assumed for a schedule-offset segment whose edge
    /// distance is missing from the dataset.
    pub fallback_travel_minutes: f64,
}

impl TimingConfig {
    /// Dwell time used when accumulating schedule offsets.
    ///
    /// Offsets use half the riding dwell per stop; see the schedule module
    /// for where this applies along a direction's sequence.
    pub fn offset_dwell_minutes(&self) -> f64 {
        self.stop_minutes / 2.0
    }
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            transfer_minutes: 5.0,
            stop_minutes: 1.0,
            default_wait_minutes: 3.0,
            loop_wait_minutes: 2.0,
            fallback_travel_minutes: 2.0,
        }
    }
}

/// Average line speeds in km/h, keyed by *base* line name
/// (terminal-pair suffixes stripped, e.g. "Line 5", "Airport Express").
#[derive(Debug, Clone)]
pub struct SpeedTable {
    /// Fallback speed for lines with no table entry.
    pub default_kmh: f64,

    per_line: HashMap<String, f64>,
}

impl SpeedTable {
    /// Create a table from explicit entries.
    pub fn new(default_kmh: f64, entries: impl IntoIterator<Item = (String, f64)>) -> Self {
        Self {
            default_kmh,
            per_line: entries.into_iter().collect(),
        }
    }

    /// Speed for a line, given its base name.
    pub fn speed_for(&self, base_name: &str) -> f64 {
        self.per_line
            .get(base_name)
            .copied()
            .unwrap_or(self.default_kmh)
    }
}

impl Default for SpeedTable {
    fn default() -> Self {
        let entries = [
            ("Line 1", 37.5),
            ("Line 2", 40.0),
            ("Line 4", 45.0),
            ("Line 5", 40.0),
            ("Line 6", 50.0),
            ("Line 7", 40.0),
            ("Line 8", 40.0),
            ("Line 9", 40.0),
            ("Line 10", 40.0),
            ("Line 13", 37.5),
            ("Line 14", 37.5),
            ("Line 15", 40.0),
            ("Line 16", 40.0),
            ("Line 17", 50.0),
            ("Line 19", 60.0),
            ("Changping Line", 50.0),
            ("Fangshan Line", 50.0),
            ("Yizhuang Line", 40.0),
            ("Yanfang Line", 40.0),
            ("Airport Express", 55.0),
            ("Daxing Airport Express", 80.0),
            ("S1 Line", 50.0),
            ("Xijiao Line", 35.0),
        ];
        Self::new(
            40.0,
            entries.into_iter().map(|(name, kmh)| (name.to_string(), kmh)),
        )
    }
}

/// Expected wait minutes for the three time-of-day bands.
#[derive(Debug, Clone, Copy)]
pub struct WaitBands {
    /// 07:00-09:00 and 17:00-19:00.
    pub peak: f64,

    /// 06:00-23:00 outside the peaks.
    pub daytime: f64,

    /// Everything else.
    pub night: f64,
}

/// Fallback headway estimates used when no schedule resolves.
///
/// Two-dimensional lookup: trunk lines run tighter headways than the rest.
/// This is a hand-tuned policy table, not derived from data; swap it out
/// via `PlannerConfig` when better estimates exist.
#[derive(Debug, Clone)]
pub struct WaitHeuristic {
    /// Base names of trunk lines.
    pub trunk_lines: Vec<String>,

    /// Bands applied to trunk lines.
    pub trunk: WaitBands,

    /// Bands applied to all other lines.
    pub other: WaitBands,
}

impl WaitHeuristic {
    /// Estimated wait in minutes for a line (identified by base name)
    /// at a given hour of day.
    pub fn estimate(&self, base_name: &str, hour: u32) -> f64 {
        let bands = if self.trunk_lines.iter().any(|t| t == base_name) {
            &self.trunk
        } else {
            &self.other
        };

        if (7..9).contains(&hour) || (17..19).contains(&hour) {
            bands.peak
        } else if (6..23).contains(&hour) {
            bands.daytime
        } else {
            bands.night
        }
    }
}

impl Default for WaitHeuristic {
    fn default() -> Self {
        Self {
            trunk_lines: ["Line 1", "Line 2", "Line 4", "Line 5", "Line 10"]
                .into_iter()
                .map(String::from)
                .collect(),
            trunk: WaitBands {
                peak: 2.5,
                daytime: 4.0,
                night: 6.0,
            },
            other: WaitBands {
                peak: 4.0,
                daytime: 5.5,
                night: 8.0,
            },
        }
    }
}

/// Distance-tiered fare schedule.
#[derive(Debug, Clone)]
pub struct FareSchedule {
    /// Tiers of (upper bound in km, inclusive; fare units).
    pub tiers: Vec<(f64, u32)>,

    /// Beyond the last tier, one extra unit per started block of this
    /// many kilometres.
    pub extension_km: f64,
}

impl FareSchedule {
    /// Fare for a trip of the given length.
    pub fn fare(&self, distance_km: f64) -> u32 {
        for &(bound, units) in &self.tiers {
            if distance_km <= bound {
                return units;
            }
        }

        let (last_bound, last_units) = match self.tiers.last() {
            Some(&(bound, units)) => (bound, units),
            None => return 0,
        };

        let extra_km = distance_km - last_bound;
        let extra_units = (extra_km / self.extension_km).ceil() as u32;
        last_units + extra_units
    }
}

impl Default for FareSchedule {
    fn default() -> Self {
        Self {
            tiers: vec![(6.0, 3), (12.0, 4), (22.0, 5), (32.0, 6)],
            extension_km: 20.0,
        }
    }
}

/// Top-level configuration shared by the schedule index and the router.
#[derive(Debug, Clone)]
pub struct PlannerConfig {
    pub timing: TimingConfig,
    pub speeds: SpeedTable,
    pub wait_heuristic: WaitHeuristic,
    pub fares: FareSchedule,

    /// Hard cap on search expansions; exceeding it aborts the query.
    pub max_iterations: usize,

    /// Transfer penalty used by the least-transfers search mode.
    pub least_transfers_penalty: f64,

    /// Externally supplied ordered station lists per line, used when a
    /// line's sequence cannot be reconstructed from adjacency.
    pub fallback_line_orders: HashMap<String, Vec<String>>,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            timing: TimingConfig::default(),
            speeds: SpeedTable::default(),
            wait_heuristic: WaitHeuristic::default(),
            fares: FareSchedule::default(),
            max_iterations: 100_000,
            least_transfers_penalty: 10_000.0,
            fallback_line_orders: HashMap::new(),
        }
    }
}
