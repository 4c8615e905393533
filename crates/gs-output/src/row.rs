//! Plain data row types written by output backends.

use gs_core::Tick;
use gs_grid::DemandMatrix;
use gs_signal::{Phase, Schedule};

/// One phase of one node's plan at a given tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PhaseRow {
    pub tick:    u64,
    pub node:    u32,
    pub phase:   &'static str,
    /// Vehicles queued on the phase's movements.
    pub demand:  u64,
    pub seconds: u32,
    /// Green interval bounds; `None` when the phase got no green.
    pub start:   Option<u32>,
    pub end:     Option<u32>,
    pub blocked: bool,
}

impl PhaseRow {
    /// Rows for every phase that had demand, in canonical phase order.
    pub fn for_schedule(tick: Tick, schedule: &Schedule) -> impl Iterator<Item = PhaseRow> + '_ {
        Phase::ALL
            .into_iter()
            .filter(|&p| schedule.phase_demand[p] > 0)
            .map(move |p| {
                let interval = schedule.interval(p);
                PhaseRow {
                    tick:    tick.0,
                    node:    schedule.node.0,
                    phase:   p.name(),
                    demand:  schedule.phase_demand[p],
                    seconds: schedule.phase_seconds[p],
                    start:   interval.map(|i| i.start),
                    end:     interval.map(|i| i.end),
                    blocked: schedule.blocked[p],
                }
            })
    }
}

/// The displayed signal and queue of one movement at a given tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SignalRow {
    pub tick:     u64,
    pub node:     u32,
    pub from:     &'static str,
    pub to:       &'static str,
    pub vehicles: u32,
    pub allowed:  bool,
}

impl SignalRow {
    /// Rows for every legal movement at the node, in movement order.
    pub fn for_node<'a>(
        tick:     Tick,
        demand:   &'a DemandMatrix,
        schedule: &'a Schedule,
    ) -> impl Iterator<Item = SignalRow> + 'a {
        demand.iter().map(move |(m, vehicles)| SignalRow {
            tick: tick.0,
            node: schedule.node.0,
            from: m.from.as_str(),
            to:   m.to().as_str(),
            vehicles,
            allowed: schedule.is_allowed(m),
        })
    }
}

/// Summary statistics for one simulation tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TickSummaryRow {
    pub tick:            u64,
    pub unix_time_secs:  i64,
    pub total_vehicles:  u64,
    pub active_phases:   u32,
    pub blocked_phases:  u32,
    /// Zero when flow is disabled.
    pub vehicles_served: u64,
}
