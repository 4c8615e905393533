use gs_core::CoreError;
use gs_grid::{DemandError, TopologyError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SimError {
    #[error("simulation configuration error: {0}")]
    Config(#[from] CoreError),

    #[error("topology error: {0}")]
    Topology(#[from] TopologyError),

    #[error("demand error: {0}")]
    Demand(#[from] DemandError),

    #[error("expected {expected} {what} (one per node), got {got}")]
    NodeCountMismatch {
        expected: usize,
        got:      usize,
        what:     &'static str,
    },

    #[error("demand load error: {0}")]
    Load(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type SimResult<T> = Result<T, SimError>;
