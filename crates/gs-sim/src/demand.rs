//! Demand sources — the pluggable producer of each tick's queues.

use gs_core::{NodeRng, Tick};
use gs_grid::{DemandMatrix, Topology};

use crate::SimResult;

/// Writes queued demand before each tick is planned.
///
/// Implementations stand in for whatever feeds the grid in a deployment:
/// a random generator, a recorded file, or live detector counts.  They are
/// the only code that mutates queues apart from the flow merge.
///
/// # Example
///
/// ```rust,ignore
/// struct RushHour;
///
/// impl DemandSource for RushHour {
///     fn refresh(&mut self, tick: Tick, _: &Topology, demand: &mut [DemandMatrix]) -> SimResult<()> {
///         if tick.0 == 0 {
///             demand[0].set(Movement::new(Direction::N, Turn::Straight), 40)?;
///         }
///         Ok(())
///     }
/// }
/// ```
pub trait DemandSource: Send {
    fn refresh(
        &mut self,
        tick:     Tick,
        topology: &Topology,
        demand:   &mut [DemandMatrix],
    ) -> SimResult<()>;
}

/// A [`DemandSource`] that never touches the queues.  Use with flow enabled
/// to watch seeded queues drain and propagate.
pub struct NoopDemand;

impl DemandSource for NoopDemand {
    fn refresh(&mut self, _: Tick, _: &Topology, _: &mut [DemandMatrix]) -> SimResult<()> {
        Ok(())
    }
}

// ── RandomDemand ──────────────────────────────────────────────────────────────

/// How [`RandomDemand`] combines fresh draws with existing queues.
#[derive(Copy, Clone, PartialEq, Eq, Debug, Default)]
pub enum DemandMode {
    /// Overwrite every queue each tick.
    #[default]
    Replace,
    /// Add the draw to whatever is already queued.
    Add,
}

/// Uniform random demand in `0..=max_per_movement` on every legal movement.
///
/// Each node draws from its own [`NodeRng`] seeded by `(seed, node, tick)`,
/// so the result does not depend on node iteration order.
pub struct RandomDemand {
    pub seed:             u64,
    pub max_per_movement: u32,
    pub mode:             DemandMode,
}

impl RandomDemand {
    /// Regenerate the whole grid every tick.
    pub fn replace(seed: u64, max_per_movement: u32) -> Self {
        Self { seed, max_per_movement, mode: DemandMode::Replace }
    }

    /// Add fresh arrivals every tick.
    pub fn arrivals(seed: u64, max_per_movement: u32) -> Self {
        Self { seed, max_per_movement, mode: DemandMode::Add }
    }
}

impl DemandSource for RandomDemand {
    fn refresh(
        &mut self,
        tick:     Tick,
        topology: &Topology,
        demand:   &mut [DemandMatrix],
    ) -> SimResult<()> {
        for node in topology.ids() {
            let mut rng = NodeRng::new(self.seed, node, tick);
            let matrix = &mut demand[node.index()];
            let legal: Vec<_> = matrix.legal_movements().collect();
            for m in legal {
                let drawn = rng.gen_range(0..=self.max_per_movement);
                match self.mode {
                    DemandMode::Replace => matrix.set(m, drawn)?,
                    DemandMode::Add     => matrix.add(m, drawn)?,
                }
            }
        }
        Ok(())
    }
}
