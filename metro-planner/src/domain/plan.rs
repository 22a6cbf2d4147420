//! Route plan value types produced by the router.

use std::collections::HashMap;

use super::time::TransitTime;

/// Timing breakdown for one hop between adjacent stations.
///
/// All components are fractional minutes. `transfer_minutes` and
/// `wait_minutes` are incurred before boarding; `travel_minutes` and
/// `stop_minutes` while riding.
#[derive(Debug, Clone, PartialEq)]
pub struct SegmentTiming {
    /// Line ridden for this hop.
    pub line: String,

    /// Time spent changing lines (zero when staying on the same line).
    pub transfer_minutes: f64,

    /// Time spent waiting for the next departure.
    pub wait_minutes: f64,

    /// In-motion travel time derived from edge distance and line speed.
    pub travel_minutes: f64,

    /// Dwell time at the stop (zero for the very first hop of a trip).
    pub stop_minutes: f64,

    /// Wall-clock departure from the hop's origin (after transfer + wait).
    pub departure: TransitTime,

    /// Wall-clock arrival at the hop's destination.
    pub arrival: TransitTime,

    /// Whether boarding this hop involved a line change.
    pub is_transfer: bool,
}

impl SegmentTiming {
    /// Total real minutes for this segment, penalty-free.
    pub fn total_minutes(&self) -> f64 {
        self.transfer_minutes + self.wait_minutes + self.travel_minutes + self.stop_minutes
    }
}

/// How the search concluded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchOutcome {
    /// A route to the destination was found.
    Found,

    /// The queue was exhausted without reaching the destination.
    NoRoute,

    /// The iteration cap was hit before reaching the destination.
    ///
    /// Externally equivalent to `NoRoute`; kept distinct for diagnostics.
    IterationLimit,
}

/// A resolved route: the ordered station list plus per-segment timing.
///
/// Produced once per query and immutable afterwards. An unreachable
/// destination yields an empty station list rather than an error.
#[derive(Debug, Clone)]
pub struct RoutePlan {
    /// Stations visited, in travel order. Empty when no route was found;
    /// a single entry when start and destination coincide.
    pub stations: Vec<String>,

    /// Timing detail per (from, to) station pair along the route.
    pub segments: HashMap<(String, String), SegmentTiming>,

    /// True elapsed minutes, reconciled without the search's transfer
    /// penalty bias.
    pub total_minutes: f64,

    /// How the search concluded.
    pub outcome: SearchOutcome,

    /// Number of queue expansions the search performed.
    pub iterations: usize,
}

impl RoutePlan {
    /// An empty plan for a failed search.
    pub fn empty(outcome: SearchOutcome, iterations: usize) -> Self {
        Self {
            stations: Vec::new(),
            segments: HashMap::new(),
            total_minutes: 0.0,
            outcome,
            iterations,
        }
    }

    /// The zero-length plan for a query whose start equals its destination.
    pub fn degenerate(station: String) -> Self {
        Self {
            stations: vec![station],
            segments: HashMap::new(),
            total_minutes: 0.0,
            outcome: SearchOutcome::Found,
            iterations: 0,
        }
    }

    /// Whether the plan actually connects two distinct stations.
    pub fn is_route(&self) -> bool {
        !self.stations.is_empty() && self.outcome == SearchOutcome::Found
    }

    /// Timing detail for the hop between two adjacent stations on the route.
    pub fn segment(&self, from: &str, to: &str) -> Option<&SegmentTiming> {
        self.segments.get(&(from.to_string(), to.to_string()))
    }

    /// Segments in path order, skipping pairs with no recorded detail.
    pub fn segments_in_order(&self) -> Vec<(&str, &str, &SegmentTiming)> {
        let mut out = Vec::new();
        for pair in self.stations.windows(2) {
            let key = (pair[0].clone(), pair[1].clone());
            if let Some(timing) = self.segments.get(&key) {
                out.push((pair[0].as_str(), pair[1].as_str(), timing));
            }
        }
        out
    }
}
