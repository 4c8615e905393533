//! One node's signal plan for one tick.

use gs_core::{Movement, MovementMap, NodeId};

use crate::{Phase, PhaseMap};

/// A green interval `[start, end)` in seconds from the start of the cycle.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Interval {
    pub phase: Phase,
    pub start: u32,
    pub end:   u32,
}

impl Interval {
    #[inline]
    pub fn duration(&self) -> u32 {
        self.end - self.start
    }
}

/// Output of [`PhaseAllocator::allocate`](crate::PhaseAllocator::allocate).
///
/// Recomputed from scratch every tick; nothing carries over.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Schedule {
    pub node: NodeId,

    /// Vehicles queued for each phase at the start of the tick.
    pub phase_demand: PhaseMap<u64>,

    /// Final green seconds per phase.
    pub phase_seconds: PhaseMap<u32>,

    /// Phases with demand whose every queued movement is back-pressured.
    pub blocked: PhaseMap<bool>,

    /// Displayed signal per movement: green only if vehicles are waiting and
    /// the downstream side has room.
    pub allowed: MovementMap<bool>,

    /// Green intervals in canonical phase order, separated by clearance.
    pub timeline: Vec<Interval>,

    /// Green seconds taken from blocked phases that no other phase could use.
    pub dropped_green: u32,

    /// Total vehicles waiting at the node.
    pub total_vehicles: u64,
}

impl Schedule {
    /// The schedule of a node with nothing to serve.
    pub fn idle(node: NodeId, total_vehicles: u64) -> Self {
        Self {
            node,
            phase_demand:   PhaseMap::splat(0),
            phase_seconds:  PhaseMap::splat(0),
            blocked:        PhaseMap::splat(false),
            allowed:        MovementMap::splat(false),
            timeline:       Vec::new(),
            dropped_green:  0,
            total_vehicles,
        }
    }

    /// Phases with queued demand, blocked or not, in canonical order.
    pub fn active_phases(&self) -> impl Iterator<Item = Phase> + '_ {
        Phase::ALL.into_iter().filter(|&p| self.phase_demand[p] > 0)
    }

    pub fn active_phase_count(&self) -> u32 {
        self.active_phases().count() as u32
    }

    pub fn is_idle(&self) -> bool {
        self.active_phase_count() == 0
    }

    pub fn blocked_phases(&self) -> impl Iterator<Item = Phase> + '_ {
        Phase::ALL.into_iter().filter(|&p| self.blocked[p])
    }

    #[inline]
    pub fn seconds(&self, phase: Phase) -> u32 {
        self.phase_seconds[phase]
    }

    /// Sum of green seconds over all phases.
    pub fn green_total(&self) -> u32 {
        self.phase_seconds.sum()
    }

    /// Green plus one clearance per active phase: the share of the cycle
    /// the plan accounts for.
    pub fn cycle_used(&self, clearance: u32) -> u32 {
        self.green_total() + self.active_phase_count() * clearance
    }

    pub fn interval(&self, phase: Phase) -> Option<&Interval> {
        self.timeline.iter().find(|i| i.phase == phase)
    }

    #[inline]
    pub fn is_allowed(&self, m: Movement) -> bool {
        self.allowed[m]
    }

    /// Movements showing green, in canonical movement order.
    pub fn green_movements(&self) -> impl Iterator<Item = Movement> + '_ {
        Movement::all().filter(|&m| self.allowed[m])
    }

    /// Green seconds available to `m` this cycle: its phase's time if the
    /// movement is allowed, otherwise zero.
    pub fn green_for(&self, m: Movement) -> u32 {
        if self.allowed[m] { self.phase_seconds[Phase::of(m)] } else { 0 }
    }
}
