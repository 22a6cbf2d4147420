//! Core domain types for the metro planner.

mod day;
mod direction;
mod plan;
mod time;

pub use day::DayType;
pub use direction::Direction;
pub use plan::{RoutePlan, SearchOutcome, SegmentTiming};
pub use time::{minutes, TimeError, TransitTime};
