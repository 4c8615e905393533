//! `gs-sim` — tick loop orchestrator for the gridsignal scheduler.
//!
//! # Tick loop
//!
//! ```text
//! for tick in 0..config.total_ticks:
//!   ① Refresh  — DemandSource::refresh writes this tick's queues.
//!   ② Plan     — PhaseAllocator::allocate for every node against the
//!                same immutable snapshot (parallel with `parallel`).
//!   ③ Observe  — observers see the snapshot and every schedule.
//!   ④ Flow     — if enabled, every node's NodeFlow is planned from the
//!                snapshot, then merged into a fresh buffer in ascending
//!                NodeId order and swapped in for the next tick.
//! ```
//!
//! # Cargo features
//!
//! | Feature    | Effect                                                 |
//! |------------|--------------------------------------------------------|
//! | `parallel` | Runs ② and the planning half of ④ on Rayon.            |
//!
//! # Quick-start
//!
//! ```rust,ignore
//! use gs_grid::Topology;
//! use gs_sim::{NoopObserver, RandomDemand, SimBuilder, SimConfig};
//!
//! let config = SimConfig::default();
//! let topology = Topology::grid(4, 4)?;
//! let source = RandomDemand::replace(config.seed, 20);
//! let mut sim = SimBuilder::new(config, topology, source).build()?;
//! sim.run(&mut NoopObserver)?;
//! ```

pub mod builder;
pub mod config;
pub mod demand;
pub mod error;
pub mod loader;
pub mod observer;
pub mod sim;

#[cfg(test)]
mod tests;

pub use builder::SimBuilder;
pub use config::SimConfig;
pub use demand::{DemandMode, DemandSource, NoopDemand, RandomDemand};
pub use error::{SimError, SimResult};
pub use loader::{load_demand_csv, load_demand_reader, NodeRef, ReplayDemand};
pub use observer::{NoopObserver, SimObserver};
pub use sim::{plan_tick, Sim, StepOutcome};
