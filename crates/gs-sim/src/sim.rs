//! The `Sim` struct and its tick loop.

use gs_core::{SimClock, Tick};
use gs_flow::{FlowReport, FlowSimulator, NodeFlow};
use gs_grid::{DemandMatrix, Topology};
use gs_signal::{PhaseAllocator, Schedule};

use crate::{DemandSource, SimConfig, SimObserver, SimResult};

// ── StepOutcome ───────────────────────────────────────────────────────────────

/// Everything one call to [`Sim::step`] produced.
#[derive(Clone, Debug)]
pub struct StepOutcome {
    pub tick: Tick,
    /// Unix timestamp at which the cycle starts.
    pub unix_time_secs: i64,
    /// One schedule per node, indexed by `NodeId`.
    pub schedules: Vec<Schedule>,
    /// `None` when flow is disabled.
    pub flow: Option<FlowReport>,
}

impl StepOutcome {
    /// Vehicles queued across the grid when the tick was planned.
    pub fn total_vehicles(&self) -> u64 {
        self.schedules.iter().map(|s| s.total_vehicles).sum()
    }

    pub fn active_phases(&self) -> u32 {
        self.schedules.iter().map(Schedule::active_phase_count).sum()
    }

    pub fn blocked_phases(&self) -> u32 {
        self.schedules.iter().map(|s| s.blocked_phases().count() as u32).sum()
    }

    /// Vehicles discharged this tick; zero without flow.
    pub fn vehicles_served(&self) -> u64 {
        self.flow.map_or(0, |f| f.served)
    }
}

// ── Sim ───────────────────────────────────────────────────────────────────────

/// The main simulation runner.
///
/// `Sim<D>` holds the grid, its queues, and drives the tick loop:
///
/// 1. **Refresh**: the [`DemandSource`] writes this tick's queues.
/// 2. **Plan** (optionally parallel with the `parallel` feature): every node
///    is allocated from the same immutable snapshot via [`plan_tick`].
/// 3. **Flow** (when `config.flow` is set): every node's discharge is
///    planned from that snapshot, then merged into a copy in ascending
///    `NodeId` order and swapped in for the next tick.
///
/// Create via [`SimBuilder`][crate::SimBuilder].
pub struct Sim<D: DemandSource> {
    /// Global configuration (cycle constants, ticks, seed, …).
    pub config: SimConfig,

    /// Simulation clock.  One tick is one signal cycle.
    pub clock: SimClock,

    /// The grid.  Immutable for the life of the run.
    pub topology: Topology,

    /// Queues at every node, indexed by `NodeId`.
    pub demand: Vec<DemandMatrix>,

    pub allocator: PhaseAllocator,

    /// `None` runs allocation only.
    pub flow: Option<FlowSimulator>,

    /// Producer of each tick's demand.
    pub source: D,
}

impl<D: DemandSource> Sim<D> {
    // ── Public API ────────────────────────────────────────────────────────

    /// Run the simulation from the current tick to `config.end_tick()`.
    ///
    /// Calls observer hooks at every tick boundary.  Use
    /// [`NoopObserver`][crate::NoopObserver] if you don't need callbacks.
    pub fn run<O: SimObserver>(&mut self, observer: &mut O) -> SimResult<()> {
        log::info!(
            "run: {} nodes, {} → {}",
            self.topology.node_count(),
            self.clock.current_tick,
            self.config.end_tick()
        );
        while self.clock.current_tick < self.config.end_tick() {
            self.observed_step(observer)?;
        }
        observer.on_sim_end(self.clock.current_tick);
        log::info!("run finished at {}", self.clock);
        Ok(())
    }

    /// Run exactly `n` ticks from the current position (ignores `end_tick`).
    ///
    /// Useful for tests and incremental stepping.
    pub fn run_ticks<O: SimObserver>(&mut self, n: u64, observer: &mut O) -> SimResult<()> {
        for _ in 0..n {
            self.observed_step(observer)?;
        }
        Ok(())
    }

    /// Advance one tick without an observer.
    pub fn step(&mut self) -> SimResult<StepOutcome> {
        self.process_tick(&mut crate::NoopObserver)
    }

    fn observed_step<O: SimObserver>(&mut self, observer: &mut O) -> SimResult<StepOutcome> {
        let now = self.clock.current_tick;
        observer.on_tick_start(now);
        let outcome = self.process_tick(observer)?;
        observer.on_tick_end(now, &outcome);
        Ok(outcome)
    }

    // ── Core tick processing ──────────────────────────────────────────────

    fn process_tick<O: SimObserver>(&mut self, observer: &mut O) -> SimResult<StepOutcome> {
        let now = self.clock.current_tick;

        // ── Phase 1: refresh demand ───────────────────────────────────────
        self.source.refresh(now, &self.topology, &mut self.demand)?;

        // ── Phase 2: plan every node against the snapshot ─────────────────
        let schedules = plan_tick(&self.allocator, &self.topology, &self.demand);

        let interval = self.config.output_interval_ticks;
        if interval > 0 && now.0.is_multiple_of(interval) {
            observer.on_schedules(now, &self.topology, &self.demand, &schedules);
        }

        // ── Phase 3: flow ─────────────────────────────────────────────────
        //
        // Departures and arrivals are sized against the snapshot and merged
        // into a copy, so no node sees another node's update this tick.
        let flow = match &self.flow {
            None => None,
            Some(sim) => {
                let flows = plan_flows(sim, &self.topology, &self.demand, &schedules);
                let mut next = self.demand.clone();
                let report = gs_flow::apply(&mut next, &flows)?;
                self.demand = next;
                observer.on_flow(now, &report);
                Some(report)
            }
        };

        let outcome = StepOutcome {
            tick: now,
            unix_time_secs: self.clock.unix_secs_at(now),
            schedules,
            flow,
        };
        log::debug!(
            "{now}: {} vehicles, {} active / {} blocked phases, {} served",
            outcome.total_vehicles(),
            outcome.active_phases(),
            outcome.blocked_phases(),
            outcome.vehicles_served()
        );

        self.clock.advance();
        Ok(outcome)
    }
}

// ── Snapshot planning ─────────────────────────────────────────────────────────

/// Allocate every node in `topology` from one demand snapshot.
///
/// The result is indexed by `NodeId`.  Nodes only read the snapshot, so the
/// schedules are identical whatever order (or thread) they are computed in.
pub fn plan_tick(
    allocator: &PhaseAllocator,
    topology:  &Topology,
    demand:    &[DemandMatrix],
) -> Vec<Schedule> {
    #[cfg(not(feature = "parallel"))]
    {
        topology
            .ids()
            .map(|node| allocator.allocate(topology, demand, node))
            .collect()
    }

    #[cfg(feature = "parallel")]
    {
        use rayon::prelude::*;

        (0..topology.node_count())
            .into_par_iter()
            .map(|i| allocator.allocate(topology, demand, gs_core::NodeId(i as u32)))
            .collect()
    }
}

fn plan_flows(
    sim:       &FlowSimulator,
    topology:  &Topology,
    demand:    &[DemandMatrix],
    schedules: &[Schedule],
) -> Vec<NodeFlow> {
    #[cfg(not(feature = "parallel"))]
    {
        schedules.iter().map(|s| sim.plan(topology, demand, s)).collect()
    }

    #[cfg(feature = "parallel")]
    {
        use rayon::prelude::*;

        schedules.par_iter().map(|s| sim.plan(topology, demand, s)).collect()
    }
}
