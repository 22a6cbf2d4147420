use std::env;
use std::process::ExitCode;

use chrono::Local;
use tracing_subscriber::EnvFilter;

use metro_planner::config::PlannerConfig;
use metro_planner::dataset;
use metro_planner::domain::TransitTime;
use metro_planner::itinerary;
use metro_planner::network::AdjacencyIndex;
use metro_planner::router::{RouteRequest, Router};
use metro_planner::schedule::ScheduleIndex;

const USAGE: &str = "usage: metro-planner <adjacency.json> <timetable.json> <from> <to> \
[HH:MM] [--fewest-transfers]";

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(message) => {
            eprintln!("{message}");
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<(), String> {
    let mut fewest_transfers = false;
    let mut positional = Vec::new();
    for arg in env::args().skip(1) {
        if arg == "--fewest-transfers" {
            fewest_transfers = true;
        } else {
            positional.push(arg);
        }
    }

    let (adjacency_path, timetable_path, from, to) = match positional.as_slice() {
        [a, t, from, to, ..] if positional.len() <= 5 => (a, t, from, to),
        _ => return Err(USAGE.to_string()),
    };

    let now = Local::now().naive_local();
    let departure = match positional.get(4) {
        Some(hhmm) => TransitTime::parse_hhmm(hhmm, now.date())
            .map_err(|e| format!("{e}\n{USAGE}"))?,
        None => TransitTime::from_datetime(now),
    };

    let adjacency = dataset::load_adjacency(adjacency_path).map_err(|e| e.to_string())?;
    let timetable = dataset::load_timetable(timetable_path).map_err(|e| e.to_string())?;

    let config = PlannerConfig::default();
    let network = AdjacencyIndex::from_data(adjacency);
    let schedule = ScheduleIndex::build(&network, timetable, &config);
    let router = Router::new(&network, &schedule, &config);

    let mut request = RouteRequest::new(from.clone(), to.clone(), departure);
    if fewest_transfers {
        request = request.with_transfer_penalty(config.least_transfers_penalty);
    }
    let plan = router.plan(&request).map_err(|e| e.to_string())?;

    println!("{}", itinerary::format_itinerary(&network, &plan));
    if plan.is_route() && plan.stations.len() > 1 {
        println!(
            "Distance: {:.1} km, fare: {}",
            itinerary::path_distance_km(&network, &plan),
            itinerary::fare(&network, &config, &plan)
        );
    }

    Ok(())
}
