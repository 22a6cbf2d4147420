//! Line travel directions.

use serde::Deserialize;
use std::fmt;

/// Direction of travel along a line.
///
/// Raw timetables key departures by `"1"` (forward: start terminal to end
/// terminal) or `"2"` (reverse), so this deserializes directly from those
/// dataset keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
pub enum Direction {
    #[serde(rename = "1")]
    Forward,
    #[serde(rename = "2")]
    Reverse,
}

impl Direction {
    /// Both directions, forward first.
    pub const BOTH: [Direction; 2] = [Direction::Forward, Direction::Reverse];

    /// The dataset key for this direction.
    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::Forward => "1",
            Direction::Reverse => "2",
        }
    }

    /// The opposite direction.
    pub fn opposite(&self) -> Self {
        match self {
            Direction::Forward => Direction::Reverse,
            Direction::Reverse => Direction::Forward,
        }
    }

    /// Parse from the dataset key.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "1" => Some(Direction::Forward),
            "2" => Some(Direction::Reverse),
            _ => None,
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
