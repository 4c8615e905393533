//! Fluent builder for constructing a [`Sim`].

use gs_core::SimClock;
use gs_flow::FlowSimulator;
use gs_grid::{matrices_for, DemandMatrix, Topology};
use gs_signal::PhaseAllocator;

use crate::{DemandSource, Sim, SimConfig, SimError, SimResult};

/// Fluent builder for [`Sim<D>`].
///
/// # Required inputs
///
/// - [`SimConfig`] — cycle constants, flow, boundary policy, ticks, seed
/// - [`Topology`] — from [`Topology::grid`] or a
///   [`TopologyBuilder`](gs_grid::TopologyBuilder)
/// - `D: DemandSource` — writes each tick's queues
///
/// # Optional inputs (have defaults)
///
/// | Method                | Default                                      |
/// |-----------------------|----------------------------------------------|
/// | `.initial_demand(v)`  | Empty matrices for `config.boundary`         |
///
/// # Example
///
/// ```rust,ignore
/// let topology = Topology::grid(4, 4)?;
/// let mut sim = SimBuilder::new(config, topology, RandomDemand::replace(42, 20))
///     .build()?;
/// sim.run(&mut NoopObserver)?;
/// ```
pub struct SimBuilder<D: DemandSource> {
    config:   SimConfig,
    topology: Topology,
    source:   D,
    demand:   Option<Vec<DemandMatrix>>,
}

impl<D: DemandSource> SimBuilder<D> {
    /// Create a builder with all required inputs.
    pub fn new(config: SimConfig, topology: Topology, source: D) -> Self {
        Self { config, topology, source, demand: None }
    }

    /// Seed the queues present before tick 0's refresh (must be one matrix
    /// per node, indexed by `NodeId`).
    pub fn initial_demand(mut self, demand: Vec<DemandMatrix>) -> Self {
        self.demand = Some(demand);
        self
    }

    /// Validate inputs and return a ready-to-run [`Sim`].
    pub fn build(self) -> SimResult<Sim<D>> {
        let node_count = self.topology.node_count();

        let allocator = PhaseAllocator::new(self.config.signal.clone())?;
        let flow = self
            .config
            .flow
            .clone()
            .map(FlowSimulator::new)
            .transpose()?;

        let demand = match self.demand {
            Some(d) => {
                if d.len() != node_count {
                    return Err(SimError::NodeCountMismatch {
                        expected: node_count,
                        got:      d.len(),
                        what:     "demand matrices",
                    });
                }
                d
            }
            None => matrices_for(&self.topology, self.config.boundary),
        };

        let clock = SimClock::new(self.config.start_unix_secs, self.config.signal.cycle_length);

        Ok(Sim {
            clock,
            config:   self.config,
            topology: self.topology,
            demand,
            allocator,
            flow,
            source:   self.source,
        })
    }
}
