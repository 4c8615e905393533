//! `gs-grid` — intersection topology and queued demand.
//!
//! # Crate layout
//!
//! | Module       | Contents                                                   |
//! |--------------|------------------------------------------------------------|
//! | [`topology`] | `Node`, `Position`, `Topology`, `TopologyBuilder`          |
//! | [`demand`]   | `DemandMatrix`, `BoundaryPolicy`                           |
//! | [`error`]    | `TopologyError`, `DemandError`                             |
//!
//! # Ownership model
//!
//! The topology is a cyclic neighbor graph, but nodes refer to each other
//! only by [`NodeId`](gs_core::NodeId).  Demand matrices live in a plain
//! `Vec<DemandMatrix>` indexed by the same ids, so readers borrow the whole
//! slice immutably and writers replace it wholesale between ticks.
//!
//! # Feature flags
//!
//! | Flag    | Effect                                                       |
//! |---------|--------------------------------------------------------------|
//! | `serde` | Derives `Serialize`/`Deserialize` on public types.           |

pub mod demand;
pub mod error;
pub mod topology;


pub use demand::{matrices_for, BoundaryPolicy, DemandMatrix};
pub use error::{DemandError, DemandResult, TopologyError, TopologyResult};
pub use topology::{grid_label, Node, Position, Topology, TopologyBuilder};
