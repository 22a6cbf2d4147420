//! On-disk dataset models.
//!
//! Two JSON files feed the planner: the station adjacency dataset
//! (station name to edges, lines and line count) and the raw timetable
//! dataset (terminal station to line to direction to day type to an
//! hour-keyed departure table). Both are produced and maintained by the
//! map editor; this module only reads them.

use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::Path;

use serde::Deserialize;
use serde::de::DeserializeOwned;

use crate::domain::{DayType, Direction};

/// Error loading a dataset file.
#[derive(Debug, thiserror::Error)]
pub enum DatasetError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_json::Error,
    },
}

/// One directed adjacency edge out of a station.
///
/// The dataset stores both directions of every physical connection, with
/// the same line and distance on each side.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct EdgeRecord {
    /// Neighboring station name.
    pub station: String,

    /// Line the edge belongs to.
    pub line: String,

    /// Edge length in meters.
    pub distance: f64,
}

/// A station entry in the adjacency dataset.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct StationRecord {
    /// Edges to adjacent stations.
    #[serde(default)]
    pub edge: Vec<EdgeRecord>,

    /// Lines serving this station.
    #[serde(default)]
    pub lines: Vec<String>,

    /// Producer-side count of `lines`; parsed but not trusted.
    #[serde(default, rename = "line_siz")]
    pub line_count: usize,
}

/// The full adjacency dataset: station name to record.
pub type AdjacencyData = HashMap<String, StationRecord>;

/// Departure minutes per hour of day, ordered by hour.
pub type HourlySchedule = BTreeMap<u32, Vec<u32>>;

/// Hourly tables per day type.
pub type DayTables = HashMap<DayType, HourlySchedule>;

/// Day tables per direction.
pub type DirectionTables = HashMap<Direction, DayTables>;

/// The full raw timetable dataset: station to line to direction tables.
///
/// Only terminal stations carry authoritative entries; every other
/// station's schedule is derived by offset shifting.
pub type TimetableData = HashMap<String, HashMap<String, DirectionTables>>;

/// Load the adjacency dataset from a JSON file.
pub fn load_adjacency(path: impl AsRef<Path>) -> Result<AdjacencyData, DatasetError> {
    load_json(path.as_ref())
}

/// Load the raw timetable dataset from a JSON file.
pub fn load_timetable(path: impl AsRef<Path>) -> Result<TimetableData, DatasetError> {
    load_json(path.as_ref())
}

fn load_json<T: DeserializeOwned>(path: &Path) -> Result<T, DatasetError> {
    let text = fs::read_to_string(path).map_err(|source| DatasetError::Io {
        path: path.display().to_string(),
        source,
    })?;
    serde_json::from_str(&text).map_err(|source| DatasetError::Parse {
        path: path.display().to_string(),
        source,
    })
}
