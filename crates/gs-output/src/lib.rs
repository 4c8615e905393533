//! `gs-output` — reporting and persistence for the gridsignal scheduler.
//!
//! Backends, all implementing [`OutputWriter`]:
//!
//! | Feature   | Backend             | Files created                                   |
//! |-----------|---------------------|-------------------------------------------------|
//! | *(none)*  | CSV                 | `phases.csv`, `signals.csv`, `tick_summaries.csv` |
//! | *(none)*  | JSON step documents | `documents.jsonl`                               |
//! | `sqlite`  | SQLite              | `output.db`                                     |
//!
//! Writers are driven by [`SimOutputObserver`], which implements
//! `gs_sim::SimObserver`.  A `(A, B)` tuple of writers fans out to both.
//! [`render_cycle_chart`] produces the console view of one node's plan.
//!
//! # Usage
//!
//! ```rust,ignore
//! use gs_output::{CsvWriter, JsonDocumentWriter, SimOutputObserver};
//!
//! let writer = (CsvWriter::new(dir)?, JsonDocumentWriter::create(dir)?);
//! let mut obs = SimOutputObserver::new(writer);
//! sim.run(&mut obs)?;
//! obs.take_error().map(|e| eprintln!("output error: {e}"));
//! ```

pub mod csv;
pub mod document;
pub mod error;
pub mod observer;
pub mod report;
pub mod row;
pub mod writer;

#[cfg(feature = "sqlite")]
pub mod sqlite;


pub use csv::CsvWriter;
pub use document::{DocumentMeta, IntervalDocument, JsonDocumentWriter, NodeDocument, StepDocument};
pub use error::{OutputError, OutputResult};
pub use observer::SimOutputObserver;
pub use report::{render_cycle_chart, CycleChart};
pub use row::{PhaseRow, SignalRow, TickSummaryRow};
pub use writer::OutputWriter;

#[cfg(feature = "sqlite")]
pub use sqlite::SqliteWriter;
