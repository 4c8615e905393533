//! CSV output backend.
//!
//! Creates three files in the configured output directory:
//! - `phases.csv`
//! - `signals.csv`
//! - `tick_summaries.csv`

use std::fs::File;
use std::path::Path;

use csv::Writer;

use crate::{OutputResult, PhaseRow, SignalRow, TickSummaryRow};
use crate::writer::OutputWriter;

/// Writes simulation output to three CSV files.
pub struct CsvWriter {
    phases:    Writer<File>,
    signals:   Writer<File>,
    summaries: Writer<File>,
    finished:  bool,
}

impl CsvWriter {
    /// Open (or create) the CSV files in `dir` and write the header rows.
    pub fn new(dir: &Path) -> OutputResult<Self> {
        let mut phases = Writer::from_path(dir.join("phases.csv"))?;
        phases.write_record(["tick", "node", "phase", "demand", "seconds", "start", "end", "blocked"])?;

        let mut signals = Writer::from_path(dir.join("signals.csv"))?;
        signals.write_record(["tick", "node", "from", "to", "vehicles", "allowed"])?;

        let mut summaries = Writer::from_path(dir.join("tick_summaries.csv"))?;
        summaries.write_record([
            "tick", "unix_time_secs", "total_vehicles", "active_phases", "blocked_phases", "vehicles_served",
        ])?;

        Ok(Self {
            phases,
            signals,
            summaries,
            finished: false,
        })
    }
}

/// Empty field for `None`.
fn opt(v: Option<u32>) -> String {
    v.map(|v| v.to_string()).unwrap_or_default()
}

impl OutputWriter for CsvWriter {
    fn write_phases(&mut self, rows: &[PhaseRow]) -> OutputResult<()> {
        for row in rows {
            self.phases.write_record(&[
                row.tick.to_string(),
                row.node.to_string(),
                row.phase.to_owned(),
                row.demand.to_string(),
                row.seconds.to_string(),
                opt(row.start),
                opt(row.end),
                (row.blocked as u8).to_string(),
            ])?;
        }
        Ok(())
    }

    fn write_signals(&mut self, rows: &[SignalRow]) -> OutputResult<()> {
        for row in rows {
            self.signals.write_record(&[
                row.tick.to_string(),
                row.node.to_string(),
                row.from.to_owned(),
                row.to.to_owned(),
                row.vehicles.to_string(),
                (row.allowed as u8).to_string(),
            ])?;
        }
        Ok(())
    }

    fn write_tick_summary(&mut self, row: &TickSummaryRow) -> OutputResult<()> {
        self.summaries.write_record(&[
            row.tick.to_string(),
            row.unix_time_secs.to_string(),
            row.total_vehicles.to_string(),
            row.active_phases.to_string(),
            row.blocked_phases.to_string(),
            row.vehicles_served.to_string(),
        ])?;
        Ok(())
    }

    fn finish(&mut self) -> OutputResult<()> {
        if self.finished {
            return Ok(());
        }
        self.finished = true;
        self.phases.flush()?;
        self.signals.flush()?;
        self.summaries.flush()?;
        Ok(())
    }
}
