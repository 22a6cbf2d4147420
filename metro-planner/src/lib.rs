//! Time-aware metro itinerary planner.
//!
//! Answers: "leaving this station at this time, how do I reach my
//! destination, when does each leg depart, and what does the trip cost?"
//!
//! Two JSON datasets feed the planner: station adjacency (edges, lines,
//! distances) and raw departure timetables, which only cover line
//! terminals. The [`schedule`] module derives every other station's
//! schedule by offset shifting; the [`router`] runs a time-dependent
//! search over it; [`itinerary`] reconciles and renders the result.

pub mod config;
pub mod dataset;
pub mod domain;
pub mod itinerary;
pub mod network;
pub mod router;
pub mod schedule;
