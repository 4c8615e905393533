//! `SimOutputObserver<W>` — bridges `SimObserver` to an `OutputWriter`.

use gs_core::Tick;
use gs_grid::{DemandMatrix, Topology};
use gs_signal::Schedule;
use gs_sim::{SimObserver, StepOutcome};

use crate::document::{DocumentMeta, StepDocument};
use crate::row::{PhaseRow, SignalRow, TickSummaryRow};
use crate::writer::OutputWriter;
use crate::OutputError;

/// A [`SimObserver`] that writes phase rows, signal rows, tick summaries,
/// and step documents to any [`OutputWriter`] backend.
///
/// Errors from the writer are stored internally because `SimObserver` methods
/// have no return value.  After `sim.run()` returns, check for errors with
/// [`take_error`][Self::take_error].
pub struct SimOutputObserver<W: OutputWriter> {
    writer:     W,
    meta:       DocumentMeta,
    last_error: Option<OutputError>,
}

impl<W: OutputWriter> SimOutputObserver<W> {
    pub fn new(writer: W) -> Self {
        Self {
            writer,
            meta:       DocumentMeta::default(),
            last_error: None,
        }
    }

    /// Override the section prefix and location stamped on step documents.
    pub fn with_document_meta(mut self, meta: DocumentMeta) -> Self {
        self.meta = meta;
        self
    }

    /// Take the stored write error (if any) after `sim.run()` returns.
    ///
    /// Returns `None` if all writes succeeded.
    pub fn take_error(&mut self) -> Option<OutputError> {
        self.last_error.take()
    }

    /// Unwrap the inner writer (e.g. to inspect files after the sim).
    pub fn into_writer(self) -> W {
        self.writer
    }

    fn store_err(&mut self, result: crate::OutputResult<()>) {
        if let Err(e) = result {
            // Keep only the first error.
            if self.last_error.is_none() {
                log::error!("output write failed: {e}");
                self.last_error = Some(e);
            }
        }
    }
}

impl<W: OutputWriter> SimObserver for SimOutputObserver<W> {
    fn on_schedules(
        &mut self,
        tick:      Tick,
        topology:  &Topology,
        demand:    &[DemandMatrix],
        schedules: &[Schedule],
    ) {
        let phases: Vec<PhaseRow> = schedules
            .iter()
            .flat_map(|s| PhaseRow::for_schedule(tick, s))
            .collect();
        if !phases.is_empty() {
            let result = self.writer.write_phases(&phases);
            self.store_err(result);
        }

        let signals: Vec<SignalRow> = demand
            .iter()
            .zip(schedules)
            .flat_map(|(matrix, s)| SignalRow::for_node(tick, matrix, s))
            .collect();
        if !signals.is_empty() {
            let result = self.writer.write_signals(&signals);
            self.store_err(result);
        }

        if self.writer.wants_documents() {
            let doc = StepDocument::build(&self.meta, tick, topology, demand, schedules);
            let result = self.writer.write_document(&doc);
            self.store_err(result);
        }
    }

    fn on_tick_end(&mut self, tick: Tick, outcome: &StepOutcome) {
        let row = TickSummaryRow {
            tick:            tick.0,
            unix_time_secs:  outcome.unix_time_secs,
            total_vehicles:  outcome.total_vehicles(),
            active_phases:   outcome.active_phases(),
            blocked_phases:  outcome.blocked_phases(),
            vehicles_served: outcome.vehicles_served(),
        };
        let result = self.writer.write_tick_summary(&row);
        self.store_err(result);
    }

    fn on_sim_end(&mut self, _final_tick: Tick) {
        let result = self.writer.finish();
        self.store_err(result);
    }
}
