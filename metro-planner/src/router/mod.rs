//! Route planning over the network and schedule indexes.
//!
//! The router runs a time-dependent Dijkstra whose cost is real elapsed
//! minutes plus an optional per-transfer penalty. Penalty zero plans the
//! fastest trip; a penalty dwarfing any realistic trip time plans the
//! fewest-transfers trip. Either way the reported total is the real,
//! penalty-free time.

mod search;
pub(crate) mod timing;

use crate::config::PlannerConfig;
use crate::domain::{DayType, RoutePlan, TransitTime};
use crate::network::AdjacencyIndex;
use crate::schedule::ScheduleIndex;

/// Error for an unplannable request.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RouteError {
    #[error("unknown station: {0}")]
    UnknownStation(String),
}

/// One planning query.
#[derive(Debug, Clone)]
pub struct RouteRequest {
    pub from: String,
    pub to: String,
    pub departure: TransitTime,
    pub day: DayType,

    /// Artificial cost added per line change during the search.
    pub transfer_penalty: f64,
}

impl RouteRequest {
    /// A fastest-trip request; the day type follows the departure date.
    pub fn new(from: impl Into<String>, to: impl Into<String>, departure: TransitTime) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
            departure,
            day: DayType::from_date(departure.date()),
            transfer_penalty: 0.0,
        }
    }

    /// Override the day type (e.g. a public holiday on a weekday date).
    pub fn with_day(mut self, day: DayType) -> Self {
        self.day = day;
        self
    }

    /// Override the transfer penalty.
    pub fn with_transfer_penalty(mut self, penalty: f64) -> Self {
        self.transfer_penalty = penalty;
        self
    }
}

/// Route planner borrowing the immutable indexes.
///
/// Cheap to construct per query; holds no mutable state, so one instance
/// may serve concurrent queries.
#[derive(Debug, Clone, Copy)]
pub struct Router<'a> {
    network: &'a AdjacencyIndex,
    schedule: &'a ScheduleIndex,
    config: &'a PlannerConfig,
}

impl<'a> Router<'a> {
    pub fn new(
        network: &'a AdjacencyIndex,
        schedule: &'a ScheduleIndex,
        config: &'a PlannerConfig,
    ) -> Self {
        Self {
            network,
            schedule,
            config,
        }
    }

    /// Plan a route for the request.
    ///
    /// Unknown stations are an error; an unreachable destination is not,
    /// and yields a plan whose outcome says so.
    pub fn plan(&self, request: &RouteRequest) -> Result<RoutePlan, RouteError> {
        for station in [&request.from, &request.to] {
            if !self.network.contains(station) {
                return Err(RouteError::UnknownStation(station.clone()));
            }
        }

        if request.from == request.to {
            return Ok(RoutePlan::degenerate(request.from.clone()));
        }

        Ok(search::run(
            self.network,
            self.schedule,
            self.config,
            &request.from,
            &request.to,
            request.departure,
            request.day,
            request.transfer_penalty,
        ))
    }

    /// Plan the fastest trip.
    pub fn shortest_time(
        &self,
        from: &str,
        to: &str,
        departure: TransitTime,
    ) -> Result<RoutePlan, RouteError> {
        self.plan(&RouteRequest::new(from, to, departure))
    }

    /// Plan the trip with the fewest line changes.
    pub fn fewest_transfers(
        &self,
        from: &str,
        to: &str,
        departure: TransitTime,
    ) -> Result<RoutePlan, RouteError> {
        self.plan(
            &RouteRequest::new(from, to, departure)
                .with_transfer_penalty(self.config.least_transfers_penalty),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::{AdjacencyData, EdgeRecord, StationRecord, TimetableData};
    use crate::domain::SearchOutcome;
    use crate::itinerary;

    const L7: &str = "Line 7 (P--R)";
    const L8: &str = "Line 8 (C--B)";

    fn edge(station: &str, line: &str, distance: f64) -> EdgeRecord {
        EdgeRecord {
            station: station.to_string(),
            line: line.to_string(),
            distance,
        }
    }

    fn record(edges: Vec<EdgeRecord>, lines: &[&str]) -> StationRecord {
        StationRecord {
            edge: edges,
            lines: lines.iter().map(|s| s.to_string()).collect(),
            line_count: lines.len(),
        }
    }

    /// Single line: P - Q - R, 2 km per segment.
    fn linear_network() -> AdjacencyIndex {
        let mut data = AdjacencyData::new();
        data.insert("P".to_string(), record(vec![edge("Q", L7, 2000.0)], &[L7]));
        data.insert(
            "Q".to_string(),
            record(vec![edge("P", L7, 2000.0), edge("R", L7, 2000.0)], &[L7]),
        );
        data.insert("R".to_string(), record(vec![edge("Q", L7, 2000.0)], &[L7]));
        // An isolated station, reachable by nothing.
        data.insert("Z".to_string(), record(vec![], &[]));
        AdjacencyIndex::from_data(data)
    }

    /// Two routes from A to B: direct on Line 7 (10 km), or via C with a
    /// change to Line 8 (1 km + 1 km).
    fn forked_network() -> AdjacencyIndex {
        let mut data = AdjacencyData::new();
        data.insert(
            "A".to_string(),
            record(
                vec![edge("B", L7, 10_000.0), edge("C", L7, 1000.0)],
                &[L7],
            ),
        );
        data.insert(
            "B".to_string(),
            record(
                vec![edge("A", L7, 10_000.0), edge("C", L8, 1000.0)],
                &[L7, L8],
            ),
        );
        data.insert(
            "C".to_string(),
            record(
                vec![edge("A", L7, 1000.0), edge("B", L8, 1000.0)],
                &[L7, L8],
            ),
        );
        AdjacencyIndex::from_data(data)
    }

    fn planner(network: &AdjacencyIndex) -> (ScheduleIndex, PlannerConfig) {
        let config = PlannerConfig::default();
        let schedule = ScheduleIndex::build(network, TimetableData::new(), &config);
        (schedule, config)
    }

    fn at(s: &str) -> TransitTime {
        // A Friday, so the derived day type is Workday.
        let date = chrono::NaiveDate::from_ymd_opt(2024, 3, 15).unwrap();
        TransitTime::parse_hhmm(s, date).unwrap()
    }

    #[test]
    fn same_station_is_a_degenerate_route() {
        let network = linear_network();
        let (schedule, config) = planner(&network);
        let router = Router::new(&network, &schedule, &config);

        let plan = router.shortest_time("Q", "Q", at("10:00")).unwrap();
        assert!(plan.is_route());
        assert_eq!(plan.stations, vec!["Q"]);
        assert_eq!(plan.total_minutes, 0.0);
    }

    #[test]
    fn unknown_station_is_an_error() {
        let network = linear_network();
        let (schedule, config) = planner(&network);
        let router = Router::new(&network, &schedule, &config);

        let err = router.shortest_time("P", "Nowhere", at("10:00")).unwrap_err();
        assert_eq!(err, RouteError::UnknownStation("Nowhere".to_string()));
    }

    #[test]
    fn unreachable_station_is_no_route() {
        let network = linear_network();
        let (schedule, config) = planner(&network);
        let router = Router::new(&network, &schedule, &config);

        let plan = router.shortest_time("P", "Z", at("10:00")).unwrap();
        assert!(!plan.is_route());
        assert_eq!(plan.outcome, SearchOutcome::NoRoute);
    }

    #[test]
    fn single_line_trip_times_are_exact() {
        let network = linear_network();
        let (schedule, config) = planner(&network);
        let router = Router::new(&network, &schedule, &config);

        let plan = router.shortest_time("P", "R", at("10:00")).unwrap();
        assert_eq!(plan.stations, vec!["P", "Q", "R"]);

        // 2 km at 40 km/h is 3 minutes per hop. With no timetable the
        // boarding wait is the daytime heuristic (5.5 for a non-trunk
        // line); the intermediate stop at Q adds one minute.
        assert_eq!(plan.total_minutes, 5.5 + 3.0 + 1.0 + 3.0);

        let first = plan.segment("P", "Q").unwrap();
        assert_eq!(first.travel_minutes, 3.0);
        assert_eq!(first.wait_minutes, 5.5);
        assert_eq!(first.stop_minutes, 0.0);
        assert!(!first.is_transfer);

        let second = plan.segment("Q", "R").unwrap();
        assert_eq!(second.stop_minutes, 1.0);
        assert_eq!(second.wait_minutes, 0.0);
    }

    #[test]
    fn zero_penalty_prefers_the_faster_transfer_route() {
        let network = forked_network();
        let (schedule, config) = planner(&network);
        let router = Router::new(&network, &schedule, &config);

        let plan = router.shortest_time("A", "B", at("10:00")).unwrap();
        assert_eq!(plan.stations, vec!["A", "C", "B"]);
        assert!(plan.segment("C", "B").unwrap().is_transfer);
    }

    #[test]
    fn high_penalty_prefers_the_direct_route() {
        let network = forked_network();
        let (schedule, config) = planner(&network);
        let router = Router::new(&network, &schedule, &config);

        let plan = router.fewest_transfers("A", "B", at("10:00")).unwrap();
        assert_eq!(plan.stations, vec!["A", "B"]);
        assert_eq!(itinerary::count_transfers(&network, &plan), 0);
    }

    #[test]
    fn penalty_never_reduces_transfer_count() {
        let network = forked_network();
        let (schedule, config) = planner(&network);
        let router = Router::new(&network, &schedule, &config);

        let fast = router.shortest_time("A", "B", at("10:00")).unwrap();
        let direct = router.fewest_transfers("A", "B", at("10:00")).unwrap();
        assert!(
            itinerary::count_transfers(&network, &direct)
                <= itinerary::count_transfers(&network, &fast)
        );
    }

    #[test]
    fn actual_time_is_independent_of_penalty_on_the_same_path() {
        // Only one possible path, so both modes must agree on everything.
        let network = linear_network();
        let (schedule, config) = planner(&network);
        let router = Router::new(&network, &schedule, &config);

        let fast = router.shortest_time("P", "R", at("10:00")).unwrap();
        let direct = router.fewest_transfers("P", "R", at("10:00")).unwrap();
        assert_eq!(fast.stations, direct.stations);
        assert_eq!(fast.total_minutes, direct.total_minutes);
    }

    #[test]
    fn reported_time_is_penalty_free() {
        let network = forked_network();
        let (schedule, config) = planner(&network);
        let router = Router::new(&network, &schedule, &config);

        let direct = router.fewest_transfers("A", "B", at("10:00")).unwrap();
        // 10 km at 40 km/h is 15 minutes, plus the 5.5-minute heuristic
        // wait. The penalty must not leak into the total.
        assert_eq!(direct.total_minutes, 5.5 + 15.0);
    }

    #[test]
    fn missing_distance_edges_are_not_ridden() {
        let mut data = AdjacencyData::new();
        data.insert(
            "P".to_string(),
            record(vec![edge("Q", L7, 0.0)], &[L7]),
        );
        data.insert(
            "Q".to_string(),
            record(vec![edge("P", L7, 0.0)], &[L7]),
        );
        let network = AdjacencyIndex::from_data(data);
        let (schedule, config) = planner(&network);
        let router = Router::new(&network, &schedule, &config);

        let plan = router.shortest_time("P", "Q", at("10:00")).unwrap();
        assert_eq!(plan.outcome, SearchOutcome::NoRoute);
    }

    #[test]
    fn weekday_request_derives_workday() {
        let request = RouteRequest::new("P", "R", at("10:00"));
        assert_eq!(request.day, DayType::Workday);

        let saturday = chrono::NaiveDate::from_ymd_opt(2024, 3, 16).unwrap();
        let departure = TransitTime::parse_hhmm("10:00", saturday).unwrap();
        let request = RouteRequest::new("P", "R", departure);
        assert_eq!(request.day, DayType::Weekend);
    }
}
