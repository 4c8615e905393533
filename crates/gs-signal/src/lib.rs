//! `gs-signal` — turns one node's queued demand into a signal schedule.
//!
//! # Crate layout
//!
//! | Module        | Contents                                                  |
//! |---------------|-----------------------------------------------------------|
//! | [`phase`]     | `Phase` (the four fixed phases), `PhaseMap<T>`            |
//! | [`schedule`]  | `Schedule`, `Interval`                                    |
//! | [`pressure`]  | `BackPressure` — downstream saturation check              |
//! | [`allocator`] | `PhaseAllocator` — proportional green-time split          |
//!
//! # Allocation pipeline
//!
//! ```text
//! DemandMatrix ─► aggregate per phase ─► proportional split (≥ min green)
//!              ─► reconcile to usable budget ─► back-pressure pass
//!              ─► donate blocked phases' time ─► timeline
//! ```
//!
//! The allocator only reads demand.  It never mutates a matrix, so every
//! node of a tick can be planned against the same snapshot in any order.

pub mod allocator;
pub mod phase;
pub mod pressure;
pub mod schedule;


pub use allocator::PhaseAllocator;
pub use phase::{Phase, PhaseMap};
pub use pressure::BackPressure;
pub use schedule::{Interval, Schedule};
