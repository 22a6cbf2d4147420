//! Post-search itinerary reconciliation and presentation.
//!
//! The search may bias its cost with a transfer penalty, so the real trip
//! time is always re-derived here by a penalty-free walk along the found
//! path. The same walk rules drive transfer counting, trip distance, the
//! fare, and the printable itinerary.

use std::fmt::Write;

use crate::config::PlannerConfig;
use crate::domain::{DayType, RoutePlan, TransitTime};
use crate::network::AdjacencyIndex;
use crate::router::timing;
use crate::schedule::{aliases, ScheduleIndex};

/// The line to ride between two adjacent stations: stay on the current
/// line when it connects them, otherwise take the first connecting line.
fn choose_line(
    network: &AdjacencyIndex,
    from: &str,
    to: &str,
    current: Option<&str>,
) -> Option<String> {
    let lines = network.connecting_lines(from, to);
    if let Some(current) = current {
        if let Some(line) = lines.iter().find(|l| aliases::similar(l, current)) {
            return Some(line.to_string());
        }
    }
    lines.first().map(|l| l.to_string())
}

/// Real elapsed minutes along a station path, penalty-free.
///
/// Re-applies the transfer, wait, travel and stop rules while advancing a
/// wall clock, so waits reflect the actual schedule at each boarding. Hops
/// with no connecting line are skipped; a missing edge distance falls back
/// to the configured travel constant rather than distorting the total.
pub fn recompute_actual_time(
    network: &AdjacencyIndex,
    schedule: &ScheduleIndex,
    config: &PlannerConfig,
    stations: &[String],
    departure: TransitTime,
    day: DayType,
) -> f64 {
    let mut total = 0.0;
    let mut clock = departure;
    let mut current: Option<String> = None;

    for (i, pair) in stations.windows(2).enumerate() {
        let (from, to) = (&pair[0], &pair[1]);
        let Some(line) = choose_line(network, from, to, current.as_deref()) else {
            continue;
        };

        let is_transfer = current
            .as_deref()
            .is_some_and(|c| !aliases::similar(c, &line));
        let transfer = if is_transfer {
            config.timing.transfer_minutes
        } else {
            0.0
        };
        let wait = if current.is_none() || is_transfer {
            timing::waiting_minutes(
                schedule,
                config,
                from,
                &line,
                clock.plus_minutes(transfer),
                day,
            )
        } else {
            0.0
        };
        let travel = timing::travel_minutes(network, config, from, to, &line)
            .unwrap_or(config.timing.fallback_travel_minutes);
        let stop = if i > 0 { config.timing.stop_minutes } else { 0.0 };

        let leg = transfer + wait + travel + stop;
        total += leg;
        clock = clock.plus_minutes(leg);
        current = Some(line);
    }

    total
}

/// Number of line changes along a plan's path.
///
/// Derived from the path and adjacency rather than the search's segment
/// records, so it is stable across search modes. Hops with no connecting
/// line are ignored.
pub fn count_transfers(network: &AdjacencyIndex, plan: &RoutePlan) -> usize {
    let mut transfers = 0;
    let mut current: Option<String> = None;

    for pair in plan.stations.windows(2) {
        let Some(line) = choose_line(network, &pair[0], &pair[1], current.as_deref()) else {
            continue;
        };
        if current
            .as_deref()
            .is_some_and(|c| !aliases::similar(c, &line))
        {
            transfers += 1;
        }
        current = Some(line);
    }

    transfers
}

/// Trip length in kilometres, summed over the path's edges.
///
/// Each hop prefers the distance on the line actually ridden, then any
/// recorded distance for the pair. Hops with no distance contribute zero.
pub fn path_distance_km(network: &AdjacencyIndex, plan: &RoutePlan) -> f64 {
    let mut meters = 0.0;
    for pair in plan.stations.windows(2) {
        let line = plan
            .segment(&pair[0], &pair[1])
            .map(|segment| segment.line.clone());
        let hop = network
            .distance(&pair[0], &pair[1], line.as_deref())
            .or_else(|| network.distance(&pair[0], &pair[1], None))
            .unwrap_or(0.0);
        meters += hop;
    }
    meters / 1000.0
}

/// Fare in currency units for a plan, from its trip distance.
pub fn fare(network: &AdjacencyIndex, config: &PlannerConfig, plan: &RoutePlan) -> u32 {
    config.fares.fare(path_distance_km(network, plan))
}

/// Render a plan as a human-readable itinerary.
///
/// One line per hop with wall-clock departure and arrival, boarding and
/// transfer callouts, and a trailing summary.
pub fn format_itinerary(network: &AdjacencyIndex, plan: &RoutePlan) -> String {
    if !plan.is_route() {
        return "No route found.".to_string();
    }
    if plan.stations.len() == 1 {
        return format!("Already at {}.", plan.stations[0]);
    }

    let mut out = String::new();
    for (i, (from, to, segment)) in plan.segments_in_order().into_iter().enumerate() {
        if i == 0 {
            let _ = writeln!(
                out,
                "Board {} at {} (departs {})",
                segment.line, from, segment.departure
            );
        } else if segment.is_transfer {
            let _ = writeln!(
                out,
                "Transfer to {} at {} (departs {})",
                segment.line, from, segment.departure
            );
        }
        let _ = writeln!(
            out,
            "  {from} -> {to}  {} - {}",
            segment.departure, segment.arrival
        );
    }

    let transfers = count_transfers(network, plan);
    let _ = write!(
        out,
        "{} stations, {} transfer{}, {:.1} minutes",
        plan.stations.len(),
        transfers,
        if transfers == 1 { "" } else { "s" },
        plan.total_minutes
    );
    out
}
