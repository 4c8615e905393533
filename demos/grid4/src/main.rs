//! grid4 — 4×4 signal-phase demonstration for the gridsignal scheduler.
//!
//! Sixteen intersections (A–P) receive fresh random queues every step; each
//! step every node's cycle is planned from the same snapshot and printed as
//! a console chart.  Phase rows, signal rows, and tick summaries go to CSV,
//! and one JSON document per step goes to `documents.jsonl`.
//!
//! Usage: `grid4 [config.json]`.  The optional file is a serialized
//! `SimConfig`; set `"flow"` to move vehicles between nodes, in which case
//! random demand is added on top of the remaining queues instead of
//! replacing them.  Log level via `RUST_LOG`.

use std::path::Path;
use std::time::Instant;

use anyhow::{Context, Result};

use gs_core::{SignalConfig, Tick};
use gs_grid::{DemandMatrix, Topology};
use gs_output::{render_cycle_chart, CsvWriter, JsonDocumentWriter, OutputWriter, SimOutputObserver};
use gs_signal::Schedule;
use gs_sim::{RandomDemand, SimBuilder, SimConfig, SimObserver, StepOutcome};

// ── Constants ─────────────────────────────────────────────────────────────────

const GRID_SIZE:        u32  = 4;
const MAX_PER_MOVEMENT: u32  = 20;
const STEPS:            u64  = 10;
const OUTPUT_DIR:       &str = "output/grid4";

// ── Observer wrapper that prints charts ───────────────────────────────────────

struct ChartPrinter<W: OutputWriter> {
    inner:  SimOutputObserver<W>,
    signal: SignalConfig,
    served: u64,
}

impl<W: OutputWriter> SimObserver for ChartPrinter<W> {
    fn on_schedules(
        &mut self,
        tick:      Tick,
        topology:  &Topology,
        demand:    &[DemandMatrix],
        schedules: &[Schedule],
    ) {
        println!("\n=== Step {} ===", tick.0 + 1);
        for ((node, matrix), schedule) in topology.nodes().iter().zip(demand).zip(schedules) {
            println!();
            print!("{}", render_cycle_chart(node, schedule, matrix, &self.signal));
        }
        self.inner.on_schedules(tick, topology, demand, schedules);
    }

    fn on_tick_end(&mut self, tick: Tick, outcome: &StepOutcome) {
        if let Some(report) = outcome.flow {
            println!(
                "\nflow: {} served, {} moved on, {} left the grid, {} absorbed",
                report.served, report.arrived, report.exited, report.absorbed
            );
        }
        self.served += outcome.vehicles_served();
        self.inner.on_tick_end(tick, outcome);
    }

    fn on_sim_end(&mut self, final_tick: Tick) {
        self.inner.on_sim_end(final_tick);
    }
}

// ── main ──────────────────────────────────────────────────────────────────────

fn load_config() -> Result<SimConfig> {
    match std::env::args().nth(1) {
        Some(path) => {
            let text = std::fs::read_to_string(&path)
                .with_context(|| format!("reading config {path}"))?;
            serde_json::from_str(&text).with_context(|| format!("parsing config {path}"))
        }
        None => Ok(SimConfig { flow: None, total_ticks: STEPS, ..SimConfig::default() }),
    }
}

fn main() -> Result<()> {
    env_logger::init();

    let config = load_config()?;
    println!("=== grid4 — gridsignal phase scheduler ===");
    println!(
        "Grid: {GRID_SIZE}×{GRID_SIZE}  |  Steps: {}  |  Seed: {}  |  Flow: {}",
        config.total_ticks,
        config.seed,
        if config.flow.is_some() { "on" } else { "off" },
    );

    // 1. Grid and demand source.
    let topology = Topology::grid(GRID_SIZE, GRID_SIZE)?;
    let source = if config.flow.is_some() {
        RandomDemand::arrivals(config.seed, MAX_PER_MOVEMENT)
    } else {
        RandomDemand::replace(config.seed, MAX_PER_MOVEMENT)
    };

    // 2. Build sim.
    let signal = config.signal.clone();
    let mut sim = SimBuilder::new(config, topology, source).build()?;

    // 3. Set up output.
    let dir = Path::new(OUTPUT_DIR);
    std::fs::create_dir_all(dir)?;
    let writer = (CsvWriter::new(dir)?, JsonDocumentWriter::create(dir)?);
    let mut obs = ChartPrinter { inner: SimOutputObserver::new(writer), signal, served: 0 };

    // 4. Run.
    let t0 = Instant::now();
    sim.run(&mut obs)?;
    let elapsed = t0.elapsed();

    if let Some(e) = obs.inner.take_error() {
        eprintln!("output error: {e}");
    }

    // 5. Summary.
    println!();
    println!("Simulation complete in {:.3} s", elapsed.as_secs_f64());
    if sim.flow.is_some() {
        println!("  vehicles served     : {}", obs.served);
        println!(
            "  vehicles still queued: {}",
            sim.demand.iter().map(DemandMatrix::total).sum::<u64>()
        );
    }
    println!("  output written to   : {}", dir.display());
    log::info!("wrote phases.csv, signals.csv, tick_summaries.csv, documents.jsonl");

    Ok(())
}
