//! Simulation observer trait for progress reporting and data collection.

use gs_core::Tick;
use gs_flow::FlowReport;
use gs_grid::{DemandMatrix, Topology};
use gs_signal::Schedule;

use crate::StepOutcome;

/// Callbacks invoked by [`Sim::run`][crate::Sim::run] at key points in the
/// tick loop.
///
/// All methods have default no-op implementations so implementors only need to
/// override what they care about.
///
/// # Example — progress printer
///
/// ```rust,ignore
/// struct ProgressPrinter;
///
/// impl SimObserver for ProgressPrinter {
///     fn on_tick_end(&mut self, tick: Tick, outcome: &StepOutcome) {
///         println!("{tick}: {} blocked phases", outcome.blocked_phases());
///     }
/// }
/// ```
pub trait SimObserver {
    /// Called at the very start of each tick, before demand is refreshed.
    fn on_tick_start(&mut self, _tick: Tick) {}

    /// Called at output intervals (every `config.output_interval_ticks`
    /// ticks) once every node is planned, before any flow is applied.
    ///
    /// `demand` is the snapshot the schedules were computed from, indexed
    /// by `NodeId`; `schedules` is in the same order.
    fn on_schedules(
        &mut self,
        _tick:      Tick,
        _topology:  &Topology,
        _demand:    &[DemandMatrix],
        _schedules: &[Schedule],
    ) {}

    /// Called after flow is merged, only when flow is enabled.
    fn on_flow(&mut self, _tick: Tick, _report: &FlowReport) {}

    /// Called at the end of each tick.
    fn on_tick_end(&mut self, _tick: Tick, _outcome: &StepOutcome) {}

    /// Called once after the final tick completes.
    fn on_sim_end(&mut self, _final_tick: Tick) {}
}

/// A [`SimObserver`] that does nothing.  Use when you need to call `run` but
/// don't want progress callbacks.
pub struct NoopObserver;

impl SimObserver for NoopObserver {}
