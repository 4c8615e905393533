//! The `OutputWriter` trait implemented by all backend writers.

use crate::{OutputResult, PhaseRow, SignalRow, StepDocument, TickSummaryRow};

/// Trait implemented by CSV, SQLite, and JSON document writers.
///
/// All methods are infallible from the observer's perspective — errors are
/// stored internally and retrieved with
/// [`SimOutputObserver::take_error`](crate::SimOutputObserver::take_error).
pub trait OutputWriter {
    /// Write a batch of phase rows.
    fn write_phases(&mut self, rows: &[PhaseRow]) -> OutputResult<()>;

    /// Write a batch of signal rows.
    fn write_signals(&mut self, rows: &[SignalRow]) -> OutputResult<()>;

    /// Write one tick summary row.
    fn write_tick_summary(&mut self, row: &TickSummaryRow) -> OutputResult<()>;

    /// Whether [`write_document`](Self::write_document) does anything.  The
    /// observer skips building documents for writers that return `false`.
    fn wants_documents(&self) -> bool {
        false
    }

    /// Write one per-step document.
    fn write_document(&mut self, _doc: &StepDocument) -> OutputResult<()> {
        Ok(())
    }

    /// Flush and close all underlying file handles.
    ///
    /// Idempotent — safe to call more than once.
    fn finish(&mut self) -> OutputResult<()>;
}

/// Fan out to two writers, e.g. CSV tables plus JSON documents.  Both
/// writers are always called; the first error is returned.
impl<A: OutputWriter, B: OutputWriter> OutputWriter for (A, B) {
    fn write_phases(&mut self, rows: &[PhaseRow]) -> OutputResult<()> {
        let a = self.0.write_phases(rows);
        let b = self.1.write_phases(rows);
        a.and(b)
    }

    fn write_signals(&mut self, rows: &[SignalRow]) -> OutputResult<()> {
        let a = self.0.write_signals(rows);
        let b = self.1.write_signals(rows);
        a.and(b)
    }

    fn write_tick_summary(&mut self, row: &TickSummaryRow) -> OutputResult<()> {
        let a = self.0.write_tick_summary(row);
        let b = self.1.write_tick_summary(row);
        a.and(b)
    }

    fn wants_documents(&self) -> bool {
        self.0.wants_documents() || self.1.wants_documents()
    }

    fn write_document(&mut self, doc: &StepDocument) -> OutputResult<()> {
        let a = self.0.write_document(doc);
        let b = self.1.write_document(doc);
        a.and(b)
    }

    fn finish(&mut self) -> OutputResult<()> {
        let a = self.0.finish();
        let b = self.1.finish();
        a.and(b)
    }
}
