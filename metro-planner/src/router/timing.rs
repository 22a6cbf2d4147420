//! Wait and travel time computation shared by the search and the
//! post-search reconciliation walk.

use tracing::trace;

use crate::config::PlannerConfig;
use crate::domain::{DayType, Direction, TransitTime};
use crate::network::AdjacencyIndex;
use crate::schedule::aliases;
use crate::schedule::ScheduleIndex;

/// Expected wait before boarding `line` at `station` at time `at`.
///
/// Loop lines run continuously, so a fixed short wait applies. Otherwise
/// the next scheduled departure across the line's name variants and both
/// directions gives the wait; with no schedule at all, the time-of-day
/// heuristic estimates one.
pub(crate) fn waiting_minutes(
    schedule: &ScheduleIndex,
    config: &PlannerConfig,
    station: &str,
    line: &str,
    at: TransitTime,
    day: DayType,
) -> f64 {
    if schedule.is_loop(line) {
        return config.timing.loop_wait_minutes;
    }

    let mut best: Option<f64> = None;
    for variant in schedule.aliases().search_variants(line) {
        for direction in Direction::BOTH {
            if let Some(departure) =
                schedule.next_departure(station, &variant, direction, at, day)
            {
                let wait = departure.minutes_since(at).max(0.0);
                best = Some(best.map_or(wait, |b: f64| b.min(wait)));
            }
        }
    }

    match best {
        Some(wait) => wait,
        None => {
            let estimate = config
                .wait_heuristic
                .estimate(&aliases::base_name(line), at.hour());
            trace!(station, line, estimate, "no schedule; heuristic wait");
            estimate
        }
    }
}

/// In-motion minutes between adjacent stations on a line, from edge
/// distance and the line's average speed. `None` when the edge has no
/// recorded distance on that line.
pub(crate) fn travel_minutes(
    network: &AdjacencyIndex,
    config: &PlannerConfig,
    from: &str,
    to: &str,
    line: &str,
) -> Option<f64> {
    let meters = network.distance(from, to, Some(line))?;
    if meters <= 0.0 {
        return None;
    }
    let speed = config.speeds.speed_for(&aliases::base_name(line));
    Some((meters / 1000.0) / speed * 60.0)
}
