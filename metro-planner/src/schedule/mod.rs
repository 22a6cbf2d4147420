//! Schedule index: raw terminal timetables plus derived schedules.
//!
//! The raw timetable only covers line terminals. For every other station a
//! schedule is derived on demand: find the station's cumulative minute
//! offset along the line, fetch the terminal's raw departure table, and
//! shift every departure by the offset (carrying across hour and midnight
//! boundaries). Lookups degrade gracefully: a station/line pair with no
//! raw and no derivable schedule yields an empty table, never an error.

pub mod aliases;
mod offsets;

use std::collections::BTreeMap;

use chrono::{NaiveDate, NaiveTime};
use tracing::{debug, trace};

use crate::config::PlannerConfig;
use crate::dataset::{DayTables, DirectionTables, HourlySchedule, TimetableData};
use crate::domain::{DayType, Direction, TransitTime};
use crate::network::AdjacencyIndex;

use aliases::LineAliases;
use offsets::LineGeometry;

/// Immutable schedule index over the raw timetable and derived offsets.
///
/// Built once at startup; afterwards all queries are read-only, so a shared
/// reference can serve concurrent lookups.
#[derive(Debug)]
pub struct ScheduleIndex {
    timetable: TimetableData,
    aliases: LineAliases,
    geometry: LineGeometry,
}

impl ScheduleIndex {
    /// Build the index from the network and raw timetable.
    pub fn build(
        network: &AdjacencyIndex,
        timetable: TimetableData,
        config: &PlannerConfig,
    ) -> Self {
        // Every line name either dataset knows feeds the alias resolver.
        let mut line_names: Vec<String> = network
            .station_names()
            .flat_map(|s| network.lines_of(s).iter().cloned())
            .collect();
        line_names.extend(
            timetable
                .values()
                .flat_map(|lines| lines.keys().cloned()),
        );

        let aliases = LineAliases::build(line_names);
        let geometry = offsets::build_geometry(network, &aliases, config);

        debug!(
            lines = aliases.all_lines().len(),
            terminals = timetable.len(),
            "schedule index built"
        );

        Self {
            timetable,
            aliases,
            geometry,
        }
    }

    /// The alias resolver built over both datasets' line names.
    pub fn aliases(&self) -> &LineAliases {
        &self.aliases
    }

    /// Whether the name denotes a loop line (in any of its spellings).
    pub fn is_loop(&self, line: &str) -> bool {
        aliases::is_loop_line(line) || aliases::is_loop_line(&self.aliases.normalize(line))
    }

    /// Ordered station sequence for a line and direction, if known.
    pub fn sequence_for(&self, line: &str, direction: Direction) -> Option<&[String]> {
        self.geometry.sequence(&self.aliases.normalize(line), direction)
    }

    /// Cumulative minute offset of a station along a line and direction.
    pub fn offset_for(&self, station: &str, line: &str, direction: Direction) -> Option<f64> {
        self.geometry
            .offsets_of(&self.aliases.normalize(line), direction)
            .and_then(|offsets| offsets.get(station))
            .copied()
    }

    /// Departure table for a station/line/direction/day, derived if the
    /// raw timetable has no entry. Empty when nothing resolves.
    pub fn schedule_of(
        &self,
        station: &str,
        line: &str,
        direction: Direction,
        day: DayType,
    ) -> HourlySchedule {
        let normalized = self.aliases.normalize(line);

        // Raw timetable, exact line key.
        if let Some(lines) = self.timetable.get(station) {
            if let Some(hours) = lines
                .get(&normalized)
                .and_then(|tables| raw_hours(tables, direction, day))
            {
                return hours.clone();
            }

            // Raw timetable, fuzzy line key.
            let mut keys: Vec<&String> = lines.keys().collect();
            keys.sort();
            for key in keys {
                let matches = key.contains(normalized.as_str())
                    || aliases::similar(&normalized, key);
                if !matches {
                    continue;
                }
                if let Some(hours) = raw_hours(&lines[key], direction, day) {
                    trace!(station, line = %key, "fuzzy raw timetable match");
                    return hours.clone();
                }
            }
        }

        // Derived from offsets, for the line itself then its siblings.
        let derived = self.derive_schedule(station, &normalized, direction, day);
        if !derived.is_empty() {
            return derived;
        }

        let mut candidates: Vec<&String> = self
            .geometry
            .offsets
            .keys()
            .filter(|key| **key != normalized && aliases::similar(key, &normalized))
            .collect();
        candidates.sort();
        for candidate in candidates {
            let derived = self.derive_schedule(station, candidate, direction, day);
            if !derived.is_empty() {
                trace!(station, line = %candidate, "derived from sibling line");
                return derived;
            }
        }

        HourlySchedule::new()
    }

    /// The first departure strictly after `at`, wrapping to the next day's
    /// earliest departure when the service day is over.
    pub fn next_departure(
        &self,
        station: &str,
        line: &str,
        direction: Direction,
        at: TransitTime,
        day: DayType,
    ) -> Option<TransitTime> {
        let schedule = self.schedule_of(station, line, direction, day);

        // Later in the current hour, strictly after the query minute.
        if let Some(minutes) = schedule.get(&at.hour()) {
            if let Some(found) = minutes
                .iter()
                .filter(|&&m| m > at.minute())
                .filter_map(|&m| clock_at(at.date(), at.hour(), m))
                .min()
            {
                return Some(found);
            }
        }

        // First departure in any later hour.
        for (&hour, minutes) in schedule.range(at.hour() + 1..) {
            if let Some(found) = minutes
                .iter()
                .filter_map(|&m| clock_at(at.date(), hour, m))
                .min()
            {
                return Some(found);
            }
        }

        // Service over; wrap to the next day's earliest departure.
        for (&hour, minutes) in &schedule {
            if let Some(found) = minutes
                .iter()
                .filter_map(|&m| clock_at(at.next_day().date(), hour, m))
                .min()
            {
                return Some(found);
            }
        }

        None
    }

    /// Derive a station's departure table by shifting the line's
    /// first-station schedule by the station's cumulative offset.
    fn derive_schedule(
        &self,
        station: &str,
        line: &str,
        direction: Direction,
        day: DayType,
    ) -> HourlySchedule {
        let Some(by_direction) = self.geometry.offsets.get(line) else {
            return HourlySchedule::new();
        };

        // Prefer the requested direction; an offset found only in the
        // opposite one is still usable for a headway estimate.
        for used in [direction, direction.opposite()] {
            let Some(offsets) = by_direction.get(&used) else {
                continue;
            };
            let Some(offset) = lookup_offset(offsets, station) else {
                continue;
            };

            let Some(first) = self
                .geometry
                .sequence(line, used)
                .and_then(|seq| seq.first())
            else {
                continue;
            };

            let Some(base) = self.first_station_hours(first, line, used, day) else {
                continue;
            };

            trace!(
                station,
                line,
                direction = %used,
                offset,
                "deriving schedule by offset shift"
            );
            return shift_schedule(base, offset);
        }

        HourlySchedule::new()
    }

    /// Raw departure table at a line's first station, tolerant of line-name,
    /// direction and day-type variations.
    fn first_station_hours(
        &self,
        station: &str,
        line: &str,
        direction: Direction,
        day: DayType,
    ) -> Option<&HourlySchedule> {
        let lines = self.timetable.get(station)?;

        let tables = lines.get(line).or_else(|| {
            let mut keys: Vec<&String> = lines.keys().collect();
            keys.sort();
            keys.into_iter()
                .find(|key| key.contains(line) || aliases::similar(line, key))
                .map(|key| &lines[key])
        })?;

        tolerant_hours(tables, direction, day)
    }
}

/// Strict direction and day lookup into a line's raw tables.
fn raw_hours(
    tables: &DirectionTables,
    direction: Direction,
    day: DayType,
) -> Option<&HourlySchedule> {
    let hours = tables.get(&direction)?.get(&day)?;
    (!hours.is_empty()).then_some(hours)
}

/// Direction and day lookup that falls back to the opposite direction and
/// the other day type rather than giving up.
fn tolerant_hours(
    tables: &DirectionTables,
    direction: Direction,
    day: DayType,
) -> Option<&HourlySchedule> {
    let days = tables
        .get(&direction)
        .or_else(|| tables.get(&direction.opposite()))?;
    day_hours(days, day)
}

fn day_hours(days: &DayTables, day: DayType) -> Option<&HourlySchedule> {
    let other = match day {
        DayType::Workday => DayType::Weekend,
        DayType::Weekend => DayType::Workday,
    };
    days.get(&day)
        .or_else(|| days.get(&other))
        .filter(|hours| !hours.is_empty())
}

/// Find a station's offset, tolerating spelling drift between the
/// adjacency and timetable datasets.
fn lookup_offset(offsets: &std::collections::HashMap<String, f64>, station: &str) -> Option<f64> {
    if let Some(&offset) = offsets.get(station) {
        return Some(offset);
    }

    let mut names: Vec<&String> = offsets.keys().collect();
    names.sort();

    let squashed = station.replace(' ', "");
    let lowered = station.to_lowercase();
    for name in &names {
        if name.replace(' ', "") == squashed || name.to_lowercase() == lowered {
            return offsets.get(*name).copied();
        }
    }
    for name in &names {
        if name.contains(station) || station.contains(name.as_str()) {
            return offsets.get(*name).copied();
        }
    }
    None
}

/// Shift every departure by `offset` fractional minutes, carrying into
/// later hours and across midnight, then sort and deduplicate per hour.
fn shift_schedule(base: &HourlySchedule, offset: f64) -> HourlySchedule {
    let anchor = NaiveDate::default();
    let mut shifted: BTreeMap<u32, Vec<u32>> = BTreeMap::new();

    for (&hour, minutes) in base {
        for &minute in minutes {
            let Some(time) = NaiveTime::from_hms_opt(hour % 24, minute.min(59), 0) else {
                continue;
            };
            let departure = TransitTime::new(anchor, time).plus_minutes(offset);
            shifted
                .entry(departure.hour())
                .or_default()
                .push(departure.minute());
        }
    }

    for minutes in shifted.values_mut() {
        minutes.sort_unstable();
        minutes.dedup();
    }
    shifted
}

fn clock_at(date: NaiveDate, hour: u32, minute: u32) -> Option<TransitTime> {
    NaiveTime::from_hms_opt(hour, minute, 0).map(|time| TransitTime::new(date, time))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::{AdjacencyData, EdgeRecord, StationRecord};
    use std::collections::HashMap;

    const L9: &str = "Line 9 (Apple--Date)";

    fn edge(station: &str, distance: f64) -> EdgeRecord {
        EdgeRecord {
            station: station.to_string(),
            line: L9.to_string(),
            distance,
        }
    }

    /// Linear line: Apple - Banana - Cherry - Date, 2 km per segment.
    ///
    /// At 40 km/h that is 3 minutes per hop; offsets are 0 / 3 / 6.5 / 10.
    fn network() -> AdjacencyIndex {
        let stations = ["Apple", "Banana", "Cherry", "Date"];
        let mut data = AdjacencyData::new();
        for (i, name) in stations.iter().enumerate() {
            let mut edges = Vec::new();
            if i > 0 {
                edges.push(edge(stations[i - 1], 2000.0));
            }
            if i + 1 < stations.len() {
                edges.push(edge(stations[i + 1], 2000.0));
            }
            data.insert(
                name.to_string(),
                StationRecord {
                    edge: edges,
                    lines: vec![L9.to_string()],
                    line_count: 1,
                },
            );
        }
        AdjacencyIndex::from_data(data)
    }

    fn hourly(entries: &[(u32, &[u32])]) -> HourlySchedule {
        entries
            .iter()
            .map(|(hour, minutes)| (*hour, minutes.to_vec()))
            .collect()
    }

    fn terminal_entry(hours: HourlySchedule) -> HashMap<String, DirectionTables> {
        let mut days = DayTables::new();
        days.insert(DayType::Workday, hours);

        let mut directions = DirectionTables::new();
        directions.insert(Direction::Forward, days);

        let mut lines = HashMap::new();
        lines.insert(L9.to_string(), directions);
        lines
    }

    fn index() -> ScheduleIndex {
        let mut timetable = TimetableData::new();
        timetable.insert(
            "Apple".to_string(),
            terminal_entry(hourly(&[(10, &[5, 25, 45]), (23, &[58])])),
        );
        ScheduleIndex::build(&network(), timetable, &PlannerConfig::default())
    }

    fn at(s: &str) -> TransitTime {
        let date = chrono::NaiveDate::from_ymd_opt(2024, 3, 15).unwrap();
        TransitTime::parse_hhmm(s, date).unwrap()
    }

    #[test]
    fn raw_schedule_at_terminal() {
        let index = index();
        let schedule =
            index.schedule_of("Apple", L9, Direction::Forward, DayType::Workday);
        assert_eq!(schedule[&10], vec![5, 25, 45]);
    }

    #[test]
    fn short_line_name_resolves_to_raw_schedule() {
        let index = index();
        let schedule =
            index.schedule_of("Apple", "Line 9", Direction::Forward, DayType::Workday);
        assert_eq!(schedule[&10], vec![5, 25, 45]);
    }

    #[test]
    fn derived_schedule_shifts_by_offset() {
        let index = index();

        // Banana sits 3.0 minutes down the line.
        let banana =
            index.schedule_of("Banana", L9, Direction::Forward, DayType::Workday);
        assert_eq!(banana[&10], vec![8, 28, 48]);

        // Cherry sits at 6.5 minutes; 10:05 + 6.5 lands at 10:11:30.
        let cherry =
            index.schedule_of("Cherry", L9, Direction::Forward, DayType::Workday);
        assert_eq!(cherry[&10], vec![11, 31, 51]);
    }

    #[test]
    fn derived_schedule_carries_across_midnight() {
        let index = index();
        let banana =
            index.schedule_of("Banana", L9, Direction::Forward, DayType::Workday);
        // 23:58 shifted by 3 minutes lands in the 00 hour bucket.
        assert_eq!(banana[&0], vec![1]);
    }

    #[test]
    fn missing_day_type_falls_back_for_derived_lookups() {
        let index = index();
        // Only workday tables exist; a weekend query still derives.
        let banana =
            index.schedule_of("Banana", L9, Direction::Forward, DayType::Weekend);
        assert_eq!(banana[&10], vec![8, 28, 48]);
    }

    #[test]
    fn unknown_station_yields_empty_schedule() {
        let index = index();
        let schedule =
            index.schedule_of("Nowhere", L9, Direction::Forward, DayType::Workday);
        assert!(schedule.is_empty());
    }

    #[test]
    fn reverse_falls_back_to_forward_offsets() {
        let index = index();
        // The reverse first station is Date, which has no raw timetable,
        // so the derivation retries with the forward direction and shifts
        // Apple's table by Cherry's forward offset of 6.5.
        let cherry =
            index.schedule_of("Cherry", L9, Direction::Reverse, DayType::Workday);
        assert_eq!(cherry[&10], vec![11, 31, 51]);
    }

    #[test]
    fn backfilled_reverse_terminal_has_a_schedule() {
        let index = index();
        // Raw data covers direction 1 only; the reverse terminal (Date,
        // forward offset 10.0) still resolves a non-empty table.
        let date =
            index.schedule_of("Date", L9, Direction::Reverse, DayType::Workday);
        assert_eq!(date[&10], vec![15, 35, 55]);
    }

    #[test]
    fn next_departure_same_hour_is_strictly_after() {
        let index = index();
        let next = index
            .next_departure("Apple", L9, Direction::Forward, at("10:25"), DayType::Workday)
            .unwrap();
        assert_eq!(next.to_string(), "10:45");
    }

    #[test]
    fn next_departure_moves_to_later_hour() {
        let index = index();
        let next = index
            .next_departure("Apple", L9, Direction::Forward, at("10:50"), DayType::Workday)
            .unwrap();
        assert_eq!(next.to_string(), "23:58");
    }

    #[test]
    fn next_departure_wraps_to_next_day() {
        let index = index();
        let next = index
            .next_departure("Apple", L9, Direction::Forward, at("23:59"), DayType::Workday)
            .unwrap();
        assert_eq!(next.to_string(), "10:05");
        assert_eq!(
            next.date(),
            chrono::NaiveDate::from_ymd_opt(2024, 3, 16).unwrap()
        );
    }

    #[test]
    fn next_departure_none_without_any_schedule() {
        let index = index();
        assert!(
            index
                .next_departure(
                    "Nowhere",
                    "Maglev",
                    Direction::Forward,
                    at("10:00"),
                    DayType::Workday
                )
                .is_none()
        );
    }

    #[test]
    fn offset_accessor_uses_normalized_line() {
        let index = index();
        assert_eq!(index.offset_for("Banana", "Line 9", Direction::Forward), Some(3.0));
        assert_eq!(index.offset_for("Apple", L9, Direction::Forward), Some(0.0));
    }

    #[test]
    fn loop_detection_spans_aliases() {
        let index = index();
        assert!(index.is_loop("Line 2 Outer Loop"));
        assert!(!index.is_loop(L9));
    }
}
