//! Station adjacency index.
//!
//! An in-memory, read-only view of the adjacency dataset. Answers the
//! neighbor, shared-line and distance queries the router needs, plus the
//! line-constrained BFS the schedule index uses to reconstruct station
//! sequences. Unknown stations yield empty results, never errors.

use std::collections::{HashMap, HashSet, VecDeque};

use crate::dataset::{AdjacencyData, StationRecord};

/// Read-only station adjacency index.
///
/// Built once from the adjacency dataset and shared across queries.
#[derive(Debug, Clone, Default)]
pub struct AdjacencyIndex {
    stations: HashMap<String, StationRecord>,
}

impl AdjacencyIndex {
    /// Build the index from the loaded adjacency dataset.
    pub fn from_data(data: AdjacencyData) -> Self {
        Self { stations: data }
    }

    /// Whether the station exists in the dataset.
    pub fn contains(&self, station: &str) -> bool {
        self.stations.contains_key(station)
    }

    /// Number of stations in the network.
    pub fn station_count(&self) -> usize {
        self.stations.len()
    }

    /// All station names, in arbitrary order.
    pub fn station_names(&self) -> impl Iterator<Item = &str> {
        self.stations.keys().map(String::as_str)
    }

    /// Adjacent stations, in edge order, deduplicated.
    ///
    /// A station pair connected by several lines appears once.
    pub fn neighbors(&self, station: &str) -> Vec<&str> {
        let Some(record) = self.stations.get(station) else {
            return Vec::new();
        };

        let mut seen = HashSet::new();
        let mut out = Vec::new();
        for edge in &record.edge {
            if seen.insert(edge.station.as_str()) {
                out.push(edge.station.as_str());
            }
        }
        out
    }

    /// Lines serving a station, in dataset order. Empty when unknown.
    pub fn lines_of(&self, station: &str) -> &[String] {
        self.stations
            .get(station)
            .map(|r| r.lines.as_slice())
            .unwrap_or(&[])
    }

    /// Lines serving both stations, in `a`'s line order.
    pub fn shared_lines(&self, a: &str, b: &str) -> Vec<&str> {
        let b_lines: HashSet<&str> = self.lines_of(b).iter().map(String::as_str).collect();
        self.lines_of(a)
            .iter()
            .map(String::as_str)
            .filter(|line| b_lines.contains(line))
            .collect()
    }

    /// Distance in meters between two adjacent stations.
    ///
    /// With `line` given, only an edge on that exact line matches. Checks
    /// the reverse edge too, in case the producer recorded only one side.
    pub fn distance(&self, from: &str, to: &str, line: Option<&str>) -> Option<f64> {
        self.directed_distance(from, to, line)
            .or_else(|| self.directed_distance(to, from, line))
    }

    fn directed_distance(&self, from: &str, to: &str, line: Option<&str>) -> Option<f64> {
        let record = self.stations.get(from)?;
        record
            .edge
            .iter()
            .find(|edge| {
                edge.station == to && line.is_none_or(|l| edge.line == l)
            })
            .map(|edge| edge.distance)
    }

    /// Lines carrying an edge between two adjacent stations, deduplicated,
    /// in `from`'s edge order. Checks the reverse edges as well.
    pub fn connecting_lines(&self, from: &str, to: &str) -> Vec<&str> {
        let mut seen = HashSet::new();
        let mut out = Vec::new();
        for (a, b) in [(from, to), (to, from)] {
            let Some(record) = self.stations.get(a) else {
                continue;
            };
            for edge in &record.edge {
                if edge.station == b && seen.insert(edge.line.as_str()) {
                    out.push(edge.line.as_str());
                }
            }
        }
        out
    }

    /// Whether the station serves more than one line.
    pub fn is_transfer_station(&self, station: &str) -> bool {
        self.lines_of(station).len() > 1
    }

    /// Ordered station path from `start` to `end` constrained to edges
    /// whose line satisfies `matches_line`.
    ///
    /// Breadth-first, so the first-discovered (fewest-hop) path wins ties.
    /// Returns `None` for unknown stations or when no such path exists.
    pub fn path_on_line<F>(&self, start: &str, end: &str, matches_line: F) -> Option<Vec<String>>
    where
        F: Fn(&str) -> bool,
    {
        if !self.contains(start) || !self.contains(end) {
            return None;
        }

        let mut queue: VecDeque<Vec<String>> = VecDeque::new();
        queue.push_back(vec![start.to_string()]);
        let mut visited: HashSet<String> = HashSet::new();

        while let Some(path) = queue.pop_front() {
            let current = path.last().expect("paths are never empty").clone();

            if current == end {
                return Some(path);
            }

            if !visited.insert(current.clone()) {
                continue;
            }

            let Some(record) = self.stations.get(&current) else {
                continue;
            };

            for edge in &record.edge {
                if matches_line(&edge.line) && !visited.contains(&edge.station) {
                    let mut next = path.clone();
                    next.push(edge.station.clone());
                    queue.push_back(next);
                }
            }
        }

        None
    }
}
