//! Per-node queued demand.
//!
//! A [`DemandMatrix`] counts vehicles waiting at one intersection for each
//! of the 12 [`Movement`]s.  Which movements are legal depends on the
//! node's neighbors and the run's [`BoundaryPolicy`]; counts on illegal
//! movements are always zero and cannot be set.

use gs_core::{Direction, Movement, MovementMap};

use crate::{DemandError, DemandResult, Node, Topology};

// ── BoundaryPolicy ────────────────────────────────────────────────────────────

/// What a movement toward a missing neighbor means.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum BoundaryPolicy {
    /// Boundary movements leave the network.  They queue, receive green
    /// time, and can never be back-pressured.
    #[default]
    Exit,
    /// Boundary movements do not exist.
    Closed,
}

// ── DemandMatrix ──────────────────────────────────────────────────────────────

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DemandMatrix {
    queues: MovementMap<u32>,
    legal:  MovementMap<bool>,
}

impl DemandMatrix {
    /// An empty matrix for `node` under `policy`.
    pub fn for_node(node: &Node, policy: BoundaryPolicy) -> Self {
        let mut legal = MovementMap::splat(true);
        if policy == BoundaryPolicy::Closed {
            for m in Movement::all() {
                legal[m] = node.neighbor(m.to()).is_some();
            }
        }
        Self { queues: MovementMap::splat(0), legal }
    }

    /// An empty matrix on which every movement is legal.
    pub fn open() -> Self {
        Self {
            queues: MovementMap::splat(0),
            legal:  MovementMap::splat(true),
        }
    }

    /// Builder-style: `DemandMatrix::open().with(m, 10)`.
    ///
    /// # Panics
    /// Panics if `m` is illegal for this matrix.
    pub fn with(mut self, m: Movement, vehicles: u32) -> Self {
        if let Err(e) = self.set(m, vehicles) {
            panic!("{e}");
        }
        self
    }

    #[inline]
    pub fn is_legal(&self, m: Movement) -> bool {
        self.legal[m]
    }

    #[inline]
    pub fn get(&self, m: Movement) -> u32 {
        self.queues[m]
    }

    pub fn set(&mut self, m: Movement, vehicles: u32) -> DemandResult<()> {
        if !self.legal[m] {
            return Err(DemandError::IllegalMovement(m));
        }
        self.queues[m] = vehicles;
        Ok(())
    }

    /// Add arrivals to an existing queue.  Saturates at `u32::MAX`.
    pub fn add(&mut self, m: Movement, vehicles: u32) -> DemandResult<()> {
        if !self.legal[m] {
            return Err(DemandError::IllegalMovement(m));
        }
        self.queues[m] = self.queues[m].saturating_add(vehicles);
        Ok(())
    }

    /// Remove up to `vehicles` from the queue and return how many were
    /// actually removed.  Never drives a count below zero.
    pub fn remove(&mut self, m: Movement, vehicles: u32) -> u32 {
        let removed = vehicles.min(self.queues[m]);
        self.queues[m] -= removed;
        removed
    }

    /// Zero every queue, keeping legality.
    pub fn clear(&mut self) {
        self.queues = MovementMap::splat(0);
    }

    /// Legal movements in canonical order.
    pub fn legal_movements(&self) -> impl Iterator<Item = Movement> + '_ {
        Movement::all().filter(|&m| self.legal[m])
    }

    /// `(movement, vehicles)` for every legal movement.
    pub fn iter(&self) -> impl Iterator<Item = (Movement, u32)> + '_ {
        self.legal_movements().map(|m| (m, self.queues[m]))
    }

    /// Vehicles queued that entered through side `dir`, whatever their turn.
    ///
    /// This is the occupancy an upstream node sees when it sends vehicles
    /// toward this node from the opposite side.
    pub fn arrivals_from(&self, dir: Direction) -> u64 {
        gs_core::Turn::ALL
            .into_iter()
            .map(|turn| u64::from(self.queues[Movement::new(dir, turn)]))
            .sum()
    }

    /// Total vehicles waiting at the node.  Summed in `u64` since each
    /// queue may hold up to `u32::MAX`.
    pub fn total(&self) -> u64 {
        self.queues.0.iter().map(|&q| u64::from(q)).sum()
    }
}

/// One empty matrix per topology node, indexed by `NodeId`.
pub fn matrices_for(topology: &Topology, policy: BoundaryPolicy) -> Vec<DemandMatrix> {
    topology
        .nodes()
        .iter()
        .map(|n| DemandMatrix::for_node(n, policy))
        .collect()
}
