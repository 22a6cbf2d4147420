//! Line geometry: station sequences and cumulative time offsets.
//!
//! Raw timetables exist only at line terminals. To derive a schedule for
//! any other station, each line/direction gets an ordered station sequence
//! (reconstructed from adjacency) and a cumulative minute offset per
//! station, measured from the direction's first station.

use std::collections::HashMap;

use tracing::{debug, warn};

use crate::config::PlannerConfig;
use crate::domain::Direction;
use crate::network::AdjacencyIndex;

use super::aliases::{self, LineAliases};

/// Derived sequences and offsets per line and direction.
#[derive(Debug, Default)]
pub(crate) struct LineGeometry {
    /// Ordered station sequence per line/direction.
    pub sequences: HashMap<String, HashMap<Direction, Vec<String>>>,

    /// Cumulative minutes from the direction's first station, per station.
    pub offsets: HashMap<String, HashMap<Direction, HashMap<String, f64>>>,
}

impl LineGeometry {
    pub fn sequence(&self, line: &str, direction: Direction) -> Option<&[String]> {
        self.sequences
            .get(line)
            .and_then(|dirs| dirs.get(&direction))
            .map(Vec::as_slice)
    }

    pub fn offsets_of(
        &self,
        line: &str,
        direction: Direction,
    ) -> Option<&HashMap<String, f64>> {
        self.offsets.get(line).and_then(|dirs| dirs.get(&direction))
    }
}

/// Travel minutes between adjacent stations for offset accumulation.
///
/// Falls back to any-line distance, then to the configured constant, so a
/// gap in the distance data cannot leave a hole in the derived schedule.
fn segment_travel_minutes(
    network: &AdjacencyIndex,
    config: &PlannerConfig,
    from: &str,
    to: &str,
    line: &str,
) -> f64 {
    let distance = network
        .distance(from, to, Some(line))
        .or_else(|| network.distance(from, to, None));

    match distance {
        Some(meters) if meters > 0.0 => {
            let speed = config.speeds.speed_for(&aliases::base_name(line));
            (meters / 1000.0) / speed * 60.0
        }
        _ => config.timing.fallback_travel_minutes,
    }
}

/// Cumulative offsets along an ordered station sequence.
///
/// offset(first) = 0; each later station adds the segment travel time plus
/// a half-stop dwell — the dwell only from the second transition onward.
fn accumulate_offsets(
    network: &AdjacencyIndex,
    config: &PlannerConfig,
    stations: &[String],
    line: &str,
) -> HashMap<String, f64> {
    let mut offsets = HashMap::new();
    let Some(first) = stations.first() else {
        return offsets;
    };
    offsets.insert(first.clone(), 0.0);

    let dwell = config.timing.offset_dwell_minutes();
    let mut cumulative = 0.0;

    for i in 1..stations.len() {
        let travel =
            segment_travel_minutes(network, config, &stations[i - 1], &stations[i], line);
        let stop = if i > 1 { dwell } else { 0.0 };
        cumulative += travel + stop;
        offsets.insert(stations[i].clone(), cumulative);
    }

    offsets
}

/// Build sequences and offsets for every line the timetable names.
pub(crate) fn build_geometry(
    network: &AdjacencyIndex,
    aliases: &LineAliases,
    config: &PlannerConfig,
) -> LineGeometry {
    let mut geometry = LineGeometry::default();

    build_sequences(network, aliases, config, &mut geometry);
    compute_all_offsets(network, config, &mut geometry);
    backfill_missing_directions(network, config, &mut geometry);
    propagate_aliases(aliases, &mut geometry);

    geometry
}

fn build_sequences(
    network: &AdjacencyIndex,
    aliases: &LineAliases,
    config: &PlannerConfig,
    geometry: &mut LineGeometry,
) {
    for line in aliases.all_lines() {
        let Some((start, end)) = aliases::terminal_pair(line) else {
            debug!(%line, "no terminal pair in line name; skipping sequence");
            continue;
        };

        let terminals = [
            (Direction::Forward, start.as_str(), end.as_str()),
            (Direction::Reverse, end.as_str(), start.as_str()),
        ];

        for (direction, from, to) in terminals {
            let path = network
                .path_on_line(from, to, |edge_line| {
                    edge_line == line || aliases::similar(edge_line, line)
                })
                .or_else(|| fallback_order(config, line, direction));

            match path {
                Some(stations) if !stations.is_empty() => {
                    debug!(
                        %line,
                        direction = %direction,
                        stations = stations.len(),
                        "built station sequence"
                    );
                    geometry
                        .sequences
                        .entry(line.clone())
                        .or_default()
                        .insert(direction, stations);
                }
                _ => {
                    warn!(%line, direction = %direction, "could not order stations");
                }
            }
        }
    }
}

/// Externally supplied station order for a line, reversed for direction 2.
fn fallback_order(
    config: &PlannerConfig,
    line: &str,
    direction: Direction,
) -> Option<Vec<String>> {
    let order = config
        .fallback_line_orders
        .get(line)
        .or_else(|| config.fallback_line_orders.get(&aliases::base_name(line)))?;

    let mut stations = order.clone();
    if direction == Direction::Reverse {
        stations.reverse();
    }
    Some(stations)
}

fn compute_all_offsets(
    network: &AdjacencyIndex,
    config: &PlannerConfig,
    geometry: &mut LineGeometry,
) {
    for (line, directions) in &geometry.sequences {
        for (direction, stations) in directions {
            if stations.is_empty() {
                continue;
            }
            let offsets = accumulate_offsets(network, config, stations, line);
            geometry
                .offsets
                .entry(line.clone())
                .or_default()
                .insert(*direction, offsets);
        }
    }
}

/// Derive a missing direction from the other by reversing the station
/// order and recomputing offsets from scratch.
///
/// Offsets are recomputed rather than mirrored: the dwell skip on the
/// second transition makes the cumulative values direction-dependent.
fn backfill_missing_directions(
    network: &AdjacencyIndex,
    config: &PlannerConfig,
    geometry: &mut LineGeometry,
) {
    let lines: Vec<String> = geometry.sequences.keys().cloned().collect();

    for line in lines {
        for direction in Direction::BOTH {
            let opposite = direction.opposite();

            let has_this = geometry.sequence(&line, direction).is_some();
            let source = geometry.sequence(&line, opposite);
            let (Some(source), false) = (source, has_this) else {
                continue;
            };

            let mut reversed: Vec<String> = source.to_vec();
            reversed.reverse();
            let offsets = accumulate_offsets(network, config, &reversed, &line);

            debug!(%line, direction = %direction, "backfilled direction from reverse");
            geometry
                .offsets
                .entry(line.clone())
                .or_default()
                .insert(direction, offsets);
            geometry
                .sequences
                .entry(line.clone())
                .or_default()
                .insert(direction, reversed);
        }
    }
}

/// Copy the richest variant's geometry to every alias of the same physical
/// line, including the generic short name.
fn propagate_aliases(aliases: &LineAliases, geometry: &mut LineGeometry) {
    // Group concrete variants by physical line.
    let mut groups: HashMap<String, Vec<String>> = HashMap::new();
    for line in aliases.all_lines() {
        groups
            .entry(aliases::base_name(line))
            .or_default()
            .push(line.clone());
    }

    for (base, variants) in groups {
        // Pick the variant with the longest known sequence as the donor.
        let best = variants
            .iter()
            .filter_map(|v| {
                let dirs = geometry.sequences.get(v)?;
                let longest = dirs.values().map(Vec::len).max()?;
                Some((v.clone(), longest))
            })
            .max_by_key(|(_, longest)| *longest)
            .map(|(v, _)| v);

        let Some(best) = best else {
            continue;
        };

        let donor_sequences = geometry.sequences.get(&best).cloned().unwrap_or_default();
        let donor_offsets = geometry.offsets.get(&best).cloned().unwrap_or_default();
        if donor_sequences.len() < 2 {
            // Donor itself lacks both directions; nothing worth copying.
            continue;
        }

        let mut targets: Vec<String> = variants.into_iter().filter(|v| *v != best).collect();
        targets.push(base);

        for target in targets {
            let complete = geometry
                .sequences
                .get(&target)
                .is_some_and(|dirs| dirs.len() >= 2);
            if complete {
                continue;
            }
            geometry.sequences.insert(target.clone(), donor_sequences.clone());
            geometry.offsets.insert(target.clone(), donor_offsets.clone());
        }
    }
}
