//! CSV demand replay.
//!
//! # CSV format
//!
//! One row per (tick, node, movement) count:
//!
//! ```csv
//! tick,node,from,to,vehicles
//! 0,A,N,S,12
//! 0,A,E,N,3
//! 0,5,W,E,7
//! 2,A,N,S,0
//! ```
//!
//! **`node`** is either a node label (`A`, `B`, …) or a numeric `NodeId`.
//! **`from`** / **`to`** are compass letters; `to` must differ from `from`.
//!
//! At each listed tick the listed queues are overwritten; queues and ticks
//! not in the file are left alone.

use std::collections::BTreeMap;
use std::io::Read;
use std::path::Path;

use serde::Deserialize;

use gs_core::{Direction, Movement, NodeId, Tick};
use gs_grid::{DemandMatrix, Topology};

use crate::demand::DemandSource;
use crate::{SimError, SimResult};

// ── CSV record ────────────────────────────────────────────────────────────────

#[derive(Deserialize)]
struct DemandRecord {
    tick:     u64,
    node:     String,
    from:     String,
    to:       String,
    vehicles: u32,
}

/// How a row names its node.  Labels are resolved against the topology at
/// replay time.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum NodeRef {
    Id(NodeId),
    Label(String),
}

impl NodeRef {
    fn parse(s: &str) -> NodeRef {
        let s = s.trim();
        match s.parse::<u32>() {
            Ok(id) => NodeRef::Id(NodeId(id)),
            Err(_) => NodeRef::Label(s.to_owned()),
        }
    }

    fn resolve(&self, topology: &Topology) -> SimResult<NodeId> {
        match self {
            NodeRef::Id(id) => {
                topology.get(*id)?;
                Ok(*id)
            }
            NodeRef::Label(label) => topology
                .find_by_label(label)
                .ok_or_else(|| SimError::Load(format!("unknown node label {label:?}"))),
        }
    }
}

/// One parsed row.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DemandEntry {
    pub node:     NodeRef,
    pub movement: Movement,
    pub vehicles: u32,
}

// ── ReplayDemand ──────────────────────────────────────────────────────────────

/// A [`DemandSource`] that replays recorded per-tick counts.
#[derive(Clone, Debug, Default)]
pub struct ReplayDemand {
    by_tick: BTreeMap<u64, Vec<DemandEntry>>,
}

impl ReplayDemand {
    /// Ticks with at least one recorded row, ascending.
    pub fn ticks(&self) -> impl Iterator<Item = Tick> + '_ {
        self.by_tick.keys().map(|&t| Tick(t))
    }

    pub fn entries(&self, tick: Tick) -> &[DemandEntry] {
        self.by_tick.get(&tick.0).map(Vec::as_slice).unwrap_or(&[])
    }
}

impl DemandSource for ReplayDemand {
    fn refresh(
        &mut self,
        tick:     Tick,
        topology: &Topology,
        demand:   &mut [DemandMatrix],
    ) -> SimResult<()> {
        for entry in self.entries(tick) {
            let node = entry.node.resolve(topology)?;
            demand[node.index()].set(entry.movement, entry.vehicles)?;
        }
        Ok(())
    }
}

// ── Public API ────────────────────────────────────────────────────────────────

/// Load a [`ReplayDemand`] from a CSV file.
pub fn load_demand_csv(path: &Path) -> SimResult<ReplayDemand> {
    let file = std::fs::File::open(path)?;
    load_demand_reader(file)
}

/// Like [`load_demand_csv`] but accepts any `Read` source.
///
/// Useful for testing (pass a `std::io::Cursor`) or reading a detector feed.
pub fn load_demand_reader<R: Read>(reader: R) -> SimResult<ReplayDemand> {
    let mut csv_reader = csv::Reader::from_reader(reader);
    let mut by_tick: BTreeMap<u64, Vec<DemandEntry>> = BTreeMap::new();

    for result in csv_reader.deserialize::<DemandRecord>() {
        let row = result.map_err(|e| SimError::Load(e.to_string()))?;
        let from = parse_direction(&row.from, row.tick)?;
        let to = parse_direction(&row.to, row.tick)?;
        let movement = Movement::between(from, to).ok_or_else(|| {
            SimError::Load(format!("tick {}: {from}→{to} is a U-turn", row.tick))
        })?;
        by_tick.entry(row.tick).or_default().push(DemandEntry {
            node: NodeRef::parse(&row.node),
            movement,
            vehicles: row.vehicles,
        });
    }

    Ok(ReplayDemand { by_tick })
}

fn parse_direction(s: &str, tick: u64) -> SimResult<Direction> {
    s.parse::<Direction>()
        .map_err(|e| SimError::Load(format!("tick {tick}: {e}")))
}
