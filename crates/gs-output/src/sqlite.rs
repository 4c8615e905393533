//! SQLite output backend (feature `sqlite`).
//!
//! Creates a single `output.db` file in the configured output directory with
//! three tables: `phases`, `signals`, and `tick_summaries`.

use std::path::Path;

use rusqlite::Connection;

use crate::{OutputResult, PhaseRow, SignalRow, TickSummaryRow};
use crate::writer::OutputWriter;

/// Writes simulation output to an SQLite database.
pub struct SqliteWriter {
    conn:     Connection,
    finished: bool,
}

impl SqliteWriter {
    /// Open (or create) `output.db` in `dir` and initialise the schema.
    pub fn new(dir: &Path) -> OutputResult<Self> {
        let conn = Connection::open(dir.join("output.db"))?;

        conn.execute_batch(
            "PRAGMA journal_mode = WAL;
             PRAGMA synchronous  = NORMAL;
             CREATE TABLE IF NOT EXISTS phases (
                 tick       INTEGER NOT NULL,
                 node       INTEGER NOT NULL,
                 phase      TEXT    NOT NULL,
                 demand     INTEGER NOT NULL,
                 seconds    INTEGER NOT NULL,
                 start_secs INTEGER,
                 end_secs   INTEGER,
                 blocked    INTEGER NOT NULL
             );
             CREATE TABLE IF NOT EXISTS signals (
                 tick     INTEGER NOT NULL,
                 node     INTEGER NOT NULL,
                 from_dir TEXT    NOT NULL,
                 to_dir   TEXT    NOT NULL,
                 vehicles INTEGER NOT NULL,
                 allowed  INTEGER NOT NULL
             );
             CREATE TABLE IF NOT EXISTS tick_summaries (
                 tick            INTEGER PRIMARY KEY,
                 unix_time_secs  INTEGER NOT NULL,
                 total_vehicles  INTEGER NOT NULL,
                 active_phases   INTEGER NOT NULL,
                 blocked_phases  INTEGER NOT NULL,
                 vehicles_served INTEGER NOT NULL
             );",
        )?;

        Ok(Self { conn, finished: false })
    }
}

impl OutputWriter for SqliteWriter {
    fn write_phases(&mut self, rows: &[PhaseRow]) -> OutputResult<()> {
        if rows.is_empty() {
            return Ok(());
        }
        let tx = self.conn.unchecked_transaction()?;
        {
            let mut stmt = tx.prepare_cached(
                "INSERT INTO phases \
                 (tick, node, phase, demand, seconds, start_secs, end_secs, blocked) \
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            )?;
            for row in rows {
                stmt.execute(rusqlite::params![
                    row.tick,
                    row.node,
                    row.phase,
                    row.demand,
                    row.seconds,
                    row.start,
                    row.end,
                    row.blocked as i64,
                ])?;
            }
        }
        tx.commit()?;
        Ok(())
    }

    fn write_signals(&mut self, rows: &[SignalRow]) -> OutputResult<()> {
        if rows.is_empty() {
            return Ok(());
        }
        let tx = self.conn.unchecked_transaction()?;
        {
            let mut stmt = tx.prepare_cached(
                "INSERT INTO signals \
                 (tick, node, from_dir, to_dir, vehicles, allowed) \
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            )?;
            for row in rows {
                stmt.execute(rusqlite::params![
                    row.tick,
                    row.node,
                    row.from,
                    row.to,
                    row.vehicles,
                    row.allowed as i64,
                ])?;
            }
        }
        tx.commit()?;
        Ok(())
    }

    fn write_tick_summary(&mut self, row: &TickSummaryRow) -> OutputResult<()> {
        self.conn.execute(
            "INSERT INTO tick_summaries \
             (tick, unix_time_secs, total_vehicles, active_phases, blocked_phases, vehicles_served) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            rusqlite::params![
                row.tick,
                row.unix_time_secs,
                row.total_vehicles,
                row.active_phases,
                row.blocked_phases,
                row.vehicles_served,
            ],
        )?;
        Ok(())
    }

    fn finish(&mut self) -> OutputResult<()> {
        if self.finished {
            return Ok(());
        }
        self.finished = true;
        self.conn
            .execute_batch("PRAGMA wal_checkpoint(TRUNCATE);")?;
        Ok(())
    }
}
