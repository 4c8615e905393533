//! Grid-subsystem error types.

use thiserror::Error;

use gs_core::{Direction, Movement, NodeId};

/// Malformed topology, rejected by [`TopologyBuilder::build`](crate::TopologyBuilder::build).
#[derive(Debug, Error)]
pub enum TopologyError {
    #[error("{node} lists {neighbor} to the {direction}, but {neighbor} does not list {node} back")]
    NotReciprocal {
        node:      NodeId,
        direction: Direction,
        neighbor:  NodeId,
    },

    #[error("{node} lists unknown neighbor {neighbor} to the {direction}")]
    UnknownNeighbor {
        node:      NodeId,
        direction: Direction,
        neighbor:  NodeId,
    },

    #[error("{0} lists itself as a neighbor")]
    SelfLoop(NodeId),

    #[error("node {0} not found in topology")]
    NodeNotFound(NodeId),

    #[error("grid must have at least one row and one column, got {rows}×{cols}")]
    EmptyGrid { rows: u32, cols: u32 },
}

pub type TopologyResult<T> = Result<T, TopologyError>;

/// Invalid access to a [`DemandMatrix`](crate::DemandMatrix).
#[derive(Debug, Error)]
pub enum DemandError {
    #[error("movement {0} is not legal at this node")]
    IllegalMovement(Movement),

    #[error("expected {expected} demand matrices (one per node), got {got}")]
    NodeCountMismatch { expected: usize, got: usize },
}

pub type DemandResult<T> = Result<T, DemandError>;
