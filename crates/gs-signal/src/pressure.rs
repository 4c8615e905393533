//! Downstream saturation check.
//!
//! A movement is held red when the node it feeds already has too many
//! vehicles queued on the side the movement would arrive on.  The check is
//! instantaneous: it looks only at the tick-start snapshot, so a movement
//! may flip between blocked and allowed from one tick to the next.

use gs_core::{Movement, MovementMap, NodeId};
use gs_grid::{DemandMatrix, Topology};

/// Back-pressure resolver for one capacity threshold.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct BackPressure {
    capacity_threshold: u32,
}

impl BackPressure {
    pub fn new(capacity_threshold: u32) -> Self {
        Self { capacity_threshold }
    }

    pub fn capacity_threshold(&self) -> u32 {
        self.capacity_threshold
    }

    /// Vehicles already queued at the node `m` feeds, on the side `m`
    /// arrives from.  `None` when `m` leaves the grid.
    pub fn downstream_load(
        &self,
        topology: &Topology,
        demand:   &[DemandMatrix],
        node:     NodeId,
        m:        Movement,
    ) -> Option<u64> {
        let dest = topology.neighbor(node, m.to())?;
        Some(demand[dest.index()].arrivals_from(m.to().opposite()))
    }

    /// `true` if the downstream arrival side is at or over capacity.
    /// Movements toward the boundary are never blocked.
    pub fn is_blocked(
        &self,
        topology: &Topology,
        demand:   &[DemandMatrix],
        node:     NodeId,
        m:        Movement,
    ) -> bool {
        self.downstream_load(topology, demand, node, m)
            .is_some_and(|load| load >= u64::from(self.capacity_threshold))
    }

    /// Signal state for every movement at `node`: green iff vehicles are
    /// waiting and the movement is not blocked.  Movements without demand
    /// are not checked.
    pub fn resolve(
        &self,
        topology: &Topology,
        demand:   &[DemandMatrix],
        node:     NodeId,
    ) -> MovementMap<bool> {
        let own = &demand[node.index()];
        let mut allowed = MovementMap::splat(false);
        for (m, queued) in own.iter() {
            if queued > 0 && !self.is_blocked(topology, demand, node, m) {
                allowed[m] = true;
            }
        }
        allowed
    }
}
