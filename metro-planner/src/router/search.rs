//! Time-dependent Dijkstra over (station, line) states.
//!
//! States carry the boarded line so that a line change costs the transfer
//! overhead and, in least-transfers mode, the artificial penalty. The
//! penalty biases the search order only; reported times are reconciled
//! penalty-free after the goal is reached.

use std::cmp::{Ordering, Reverse};
use std::collections::{BinaryHeap, HashMap};

use tracing::{debug, warn};

use crate::config::PlannerConfig;
use crate::domain::{DayType, RoutePlan, SearchOutcome, SegmentTiming, TransitTime};
use crate::itinerary;
use crate::network::AdjacencyIndex;
use crate::schedule::{aliases, ScheduleIndex};

use super::timing;

struct State {
    station: String,
    /// Line ridden into `station`; `None` before first boarding.
    line: Option<String>,
    clock: TransitTime,
    path: Vec<String>,
    segments: HashMap<(String, String), SegmentTiming>,
}

struct QueueEntry {
    cost: f64,
    /// Insertion sequence; breaks cost ties deterministically.
    seq: u64,
    state: State,
}

impl PartialEq for QueueEntry {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for QueueEntry {}

impl PartialOrd for QueueEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for QueueEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        self.cost
            .total_cmp(&other.cost)
            .then_with(|| self.seq.cmp(&other.seq))
    }
}

pub(super) fn run(
    network: &AdjacencyIndex,
    schedule: &ScheduleIndex,
    config: &PlannerConfig,
    from: &str,
    to: &str,
    departure: TransitTime,
    day: DayType,
    transfer_penalty: f64,
) -> RoutePlan {
    let mut heap = BinaryHeap::new();
    let mut best: HashMap<(String, Option<String>), f64> = HashMap::new();
    let mut seq = 0u64;
    let mut iterations = 0usize;

    best.insert((from.to_string(), None), 0.0);
    heap.push(Reverse(QueueEntry {
        cost: 0.0,
        seq,
        state: State {
            station: from.to_string(),
            line: None,
            clock: departure,
            path: vec![from.to_string()],
            segments: HashMap::new(),
        },
    }));

    while let Some(Reverse(entry)) = heap.pop() {
        iterations += 1;
        if iterations > config.max_iterations {
            warn!(from, to, iterations, "search hit the iteration cap");
            return RoutePlan::empty(SearchOutcome::IterationLimit, iterations);
        }

        let QueueEntry { cost, state, .. } = entry;

        let key = (state.station.clone(), state.line.clone());
        if best.get(&key).is_some_and(|&b| cost > b) {
            continue;
        }

        if state.station == to {
            let total = itinerary::recompute_actual_time(
                network, schedule, config, &state.path, departure, day,
            );
            debug!(
                from,
                to,
                stations = state.path.len(),
                total_minutes = total,
                iterations,
                "route found"
            );
            return RoutePlan {
                stations: state.path,
                segments: state.segments,
                total_minutes: total,
                outcome: SearchOutcome::Found,
                iterations,
            };
        }

        for neighbor in network.neighbors(&state.station) {
            if state.path.iter().any(|s| s == neighbor) {
                continue;
            }

            let mut lines = network.connecting_lines(&state.station, neighbor);
            if let Some(current) = &state.line {
                // Stable: the boarded line's candidates come first.
                lines.sort_by_key(|l| !aliases::similar(l, current));
            }

            for line in lines {
                let is_transfer = state
                    .line
                    .as_deref()
                    .is_some_and(|current| !aliases::similar(current, line));
                let transfer = if is_transfer {
                    config.timing.transfer_minutes
                } else {
                    0.0
                };

                // A wait occurs on first boarding and after every change.
                let wait = if state.line.is_none() || is_transfer {
                    timing::waiting_minutes(
                        schedule,
                        config,
                        &state.station,
                        line,
                        state.clock.plus_minutes(transfer),
                        day,
                    )
                } else {
                    0.0
                };

                let Some(travel) =
                    timing::travel_minutes(network, config, &state.station, neighbor, line)
                else {
                    continue;
                };

                let stop = if state.path.len() > 1 {
                    config.timing.stop_minutes
                } else {
                    0.0
                };

                let actual = transfer + wait + travel + stop;
                let penalized = actual + if is_transfer { transfer_penalty } else { 0.0 };
                let next_cost = cost + penalized;

                let next_key = (neighbor.to_string(), Some(line.to_string()));
                if best.get(&next_key).is_some_and(|&b| next_cost >= b) {
                    continue;
                }
                best.insert(next_key, next_cost);

                let arrival = state.clock.plus_minutes(actual);
                let mut segments = state.segments.clone();
                segments.insert(
                    (state.station.clone(), neighbor.to_string()),
                    SegmentTiming {
                        line: line.to_string(),
                        transfer_minutes: transfer,
                        wait_minutes: wait,
                        travel_minutes: travel,
                        stop_minutes: stop,
                        departure: state.clock.plus_minutes(transfer + wait),
                        arrival,
                        is_transfer,
                    },
                );
                let mut path = state.path.clone();
                path.push(neighbor.to_string());

                seq += 1;
                heap.push(Reverse(QueueEntry {
                    cost: next_cost,
                    seq,
                    state: State {
                        station: neighbor.to_string(),
                        line: Some(line.to_string()),
                        clock: arrival,
                        path,
                        segments,
                    },
                }));
            }
        }
    }

    debug!(from, to, iterations, "queue exhausted; no route");
    RoutePlan::empty(SearchOutcome::NoRoute, iterations)
}
