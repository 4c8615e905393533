//! `gs-flow` — moves vehicles between intersections after a tick's plans
//! are fixed.
//!
//! Flow runs in two halves so that planning never observes a half-updated
//! grid:
//!
//! ```text
//! ① plan   — per node, read-only: FlowSimulator::plan(snapshot, schedule) → NodeFlow
//! ② apply  — sequential, ascending NodeId: departures, then arrivals
//! ```
//!
//! ① can run on any number of threads; ② is the only writer.

pub mod flow;

#[cfg(test)]
mod tests;

pub use flow::{apply, Arrival, Departure, FlowReport, FlowSimulator, NodeFlow};
