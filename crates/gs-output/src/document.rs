//! Per-step JSON documents.
//!
//! One [`StepDocument`] describes the whole grid at one tick: every node's
//! neighbors, queues, green seconds, timeline, displayed signals and green
//! lanes.  The
//! layout suits a document store or a web dashboard; direction and phase
//! keys are the same short names the console chart prints.

use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use serde::{Deserialize, Serialize};

use gs_core::Tick;
use gs_grid::{DemandMatrix, Node, Topology};
use gs_signal::Schedule;

use crate::writer::OutputWriter;
use crate::{OutputResult, PhaseRow, SignalRow, TickSummaryRow};

// ── Document types ────────────────────────────────────────────────────────────

/// Labels attached to every document of a run.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DocumentMeta {
    /// Prefix of each document's `section_name`; the step number is appended.
    pub section_prefix: String,
    pub location:       String,
}

impl Default for DocumentMeta {
    fn default() -> Self {
        Self {
            section_prefix: "Grid Step".into(),
            location:       "Sector 5, City".into(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct IntervalDocument {
    pub phase: String,
    pub start: u32,
    pub end:   u32,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeDocument {
    pub node:           String,
    /// `[row, col]`, row 0 at the north edge.
    pub position:       [u32; 2],
    /// Direction → neighbor label.
    pub neighbors:      BTreeMap<String, String>,
    /// From-direction → to-direction → queued vehicles.
    pub queues:         BTreeMap<String, BTreeMap<String, u32>>,
    /// Phase → green seconds, for phases that received any.
    pub phase_times:    BTreeMap<String, u32>,
    pub timeline:       Vec<IntervalDocument>,
    /// From-direction → to-direction → displayed green.
    pub lane_allowance: BTreeMap<String, BTreeMap<String, bool>>,
    pub blocked_phases: Vec<String>,
    /// `[from, to]` pairs lit green.  The node's own green movements come
    /// first in canonical order, followed by the greens of each upstream
    /// neighbor feeding this node, recorded as `[arrival side, opposite of
    /// the upstream approach]`.
    pub green_lanes:    Vec<[String; 2]>,
    pub total_vehicles: u64,
}

/// The whole grid at one tick.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepDocument {
    pub section_name: String,
    pub location:     String,
    /// 1-based step number (`tick + 1`).
    pub step:         u64,
    pub nodes:        Vec<NodeDocument>,
}

impl StepDocument {
    /// Assemble the document for `tick`.  `demand` and `schedules` are
    /// indexed by `NodeId`.
    pub fn build(
        meta:      &DocumentMeta,
        tick:      Tick,
        topology:  &Topology,
        demand:    &[DemandMatrix],
        schedules: &[Schedule],
    ) -> Self {
        let step = tick.0 + 1;
        let nodes = topology
            .nodes()
            .iter()
            .zip(demand)
            .zip(schedules)
            .map(|((node, matrix), schedule)| {
                node_document(topology, node, matrix, schedule, schedules)
            })
            .collect();
        Self {
            section_name: format!("{} {step}", meta.section_prefix),
            location: meta.location.clone(),
            step,
            nodes,
        }
    }
}

fn node_document(
    topology: &Topology,
    node:     &Node,
    matrix:   &DemandMatrix,
    schedule: &Schedule,
    all:      &[Schedule],
) -> NodeDocument {
    let neighbors = node
        .neighbors()
        .map(|(dir, id)| (dir.as_str().to_owned(), topology.node(id).label.clone()))
        .collect();

    let mut queues: BTreeMap<String, BTreeMap<String, u32>> = BTreeMap::new();
    let mut lane_allowance: BTreeMap<String, BTreeMap<String, bool>> = BTreeMap::new();
    for (m, vehicles) in matrix.iter() {
        let from = m.from.as_str().to_owned();
        let to = m.to().as_str().to_owned();
        queues.entry(from.clone()).or_default().insert(to.clone(), vehicles);
        lane_allowance.entry(from).or_default().insert(to, schedule.is_allowed(m));
    }

    let phase_times = schedule
        .phase_seconds
        .iter()
        .filter(|&(_, secs)| secs > 0)
        .map(|(p, secs)| (p.name().to_owned(), secs))
        .collect();

    let mut green_lanes: Vec<[String; 2]> = schedule
        .green_movements()
        .map(|m| [m.from.as_str().to_owned(), m.to().as_str().to_owned()])
        .collect();
    for (side, upstream) in node.neighbors() {
        let incoming = all[upstream.index()]
            .green_movements()
            .filter(|m| m.to() == side.opposite())
            .map(|m| [side.as_str().to_owned(), m.from.opposite().as_str().to_owned()]);
        green_lanes.extend(incoming);
    }

    NodeDocument {
        node: node.label.clone(),
        position: [node.position.row, node.position.col],
        neighbors,
        queues,
        phase_times,
        timeline: schedule
            .timeline
            .iter()
            .map(|i| IntervalDocument { phase: i.phase.name().to_owned(), start: i.start, end: i.end })
            .collect(),
        lane_allowance,
        blocked_phases: schedule.blocked_phases().map(|p| p.name().to_owned()).collect(),
        green_lanes,
        total_vehicles: schedule.total_vehicles,
    }
}

// ── JsonDocumentWriter ────────────────────────────────────────────────────────

/// Writes one JSON [`StepDocument`] per line.  Row batches are ignored.
pub struct JsonDocumentWriter<W: Write> {
    out:      W,
    finished: bool,
}

impl JsonDocumentWriter<BufWriter<File>> {
    /// Create (or truncate) `documents.jsonl` in `dir`.
    pub fn create(dir: &Path) -> OutputResult<Self> {
        let file = File::create(dir.join("documents.jsonl"))?;
        Ok(Self::new(BufWriter::new(file)))
    }
}

impl<W: Write> JsonDocumentWriter<W> {
    pub fn new(out: W) -> Self {
        Self { out, finished: false }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> OutputWriter for JsonDocumentWriter<W> {
    fn write_phases(&mut self, _rows: &[PhaseRow]) -> OutputResult<()> {
        Ok(())
    }

    fn write_signals(&mut self, _rows: &[SignalRow]) -> OutputResult<()> {
        Ok(())
    }

    fn write_tick_summary(&mut self, _row: &TickSummaryRow) -> OutputResult<()> {
        Ok(())
    }

    fn wants_documents(&self) -> bool {
        true
    }

    fn write_document(&mut self, doc: &StepDocument) -> OutputResult<()> {
        serde_json::to_writer(&mut self.out, doc)?;
        self.out.write_all(b"\n")?;
        Ok(())
    }

    fn finish(&mut self) -> OutputResult<()> {
        if self.finished {
            return Ok(());
        }
        self.finished = true;
        self.out.flush()?;
        Ok(())
    }
}
