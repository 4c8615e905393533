//! Run-level configuration.

use gs_core::{FlowConfig, SignalConfig, Tick};
use gs_grid::BoundaryPolicy;

/// Top-level simulation configuration.
///
/// Typically loaded from a JSON file by the application crate and passed to
/// [`SimBuilder`](crate::SimBuilder).  Missing fields take their defaults.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct SimConfig {
    /// Cycle constants shared by every intersection.
    pub signal: SignalConfig,

    /// Vehicle flow between ticks.  `None` plans schedules only and leaves
    /// queues to the demand source.
    pub flow: Option<FlowConfig>,

    /// Meaning of movements toward the grid edge.
    pub boundary: BoundaryPolicy,

    /// Total ticks (signal cycles) to simulate.
    pub total_ticks: u64,

    /// Master RNG seed for random demand.  The same seed always produces
    /// identical results.
    pub seed: u64,

    /// Unix timestamp for tick 0.
    pub start_unix_secs: i64,

    /// Report schedules every N ticks.  1 = every tick; 0 = never.
    pub output_interval_ticks: u64,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            signal:                SignalConfig::default(),
            flow:                  Some(FlowConfig::default()),
            boundary:              BoundaryPolicy::Exit,
            total_ticks:           10,
            seed:                  42,
            start_unix_secs:       0,
            output_interval_ticks: 1,
        }
    }
}

impl SimConfig {
    /// The tick at which the simulation ends (exclusive upper bound).
    #[inline]
    pub fn end_tick(&self) -> Tick {
        Tick(self.total_ticks)
    }
}
