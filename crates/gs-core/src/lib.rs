//! `gs-core` — foundational types for the `gridsignal` phase scheduler.
//!
//! This crate is a dependency of every other `gs-*` crate.  It intentionally
//! has no `gs-*` dependencies and minimal external ones (only `rand` and
//! `thiserror`, plus optional `serde`).
//!
//! # What lives here
//!
//! | Module          | Contents                                              |
//! |-----------------|-------------------------------------------------------|
//! | [`ids`]         | `NodeId`                                              |
//! | [`direction`]   | `Direction`, `Turn`, `Movement`, `MovementMap<T>`     |
//! | [`time`]        | `Tick`, `SimClock`                                    |
//! | [`config`]      | `SignalConfig`, `FlowConfig`, `TurnShares`            |
//! | [`rng`]         | `NodeRng` (per node, per tick)                       |
//! | [`error`]       | `CoreError`, `CoreResult`                             |
//!
//! # Feature flags
//!
//! | Flag    | Effect                                                     |
//! |---------|------------------------------------------------------------|
//! | `serde` | Adds `Serialize`/`Deserialize` to all public types.        |

pub mod config;
pub mod direction;
pub mod error;
pub mod ids;
pub mod rng;
pub mod time;


// ── Re-exports ────────────────────────────────────────────────────────────────

pub use config::{FlowConfig, SignalConfig, TurnShares};
pub use direction::{Direction, Movement, MovementMap, Turn};
pub use error::{CoreError, CoreResult};
pub use ids::NodeId;
pub use rng::NodeRng;
pub use time::{SimClock, Tick};
