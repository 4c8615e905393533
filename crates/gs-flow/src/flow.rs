//! Vehicle discharge and downstream arrival.

use gs_core::{CoreResult, FlowConfig, Movement, NodeId, Turn};
use gs_grid::{DemandMatrix, DemandResult, Topology};
use gs_signal::Schedule;

/// Vehicles leaving one queue at the planning node.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Departure {
    pub movement: Movement,
    pub vehicles: u32,
}

/// Vehicles joining a queue at a downstream node.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Arrival {
    pub node:     NodeId,
    pub movement: Movement,
    pub vehicles: u32,
}

/// Every queue change caused by one node's green time in one tick.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct NodeFlow {
    pub node:       NodeId,
    pub departures: Vec<Departure>,
    pub arrivals:   Vec<Arrival>,
    /// Vehicles that left the grid across the boundary.
    pub exited:     u32,
    /// Vehicles dropped when splitting arrivals into whole turns.
    pub absorbed:   u32,
}

impl NodeFlow {
    pub fn served(&self) -> u32 {
        self.departures.iter().map(|d| d.vehicles).sum()
    }
}

/// Aggregate counts for one tick of flow.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct FlowReport {
    /// Vehicles discharged from a queue.
    pub served:   u64,
    /// Vehicles added to a downstream queue.
    pub arrived:  u64,
    /// Vehicles that left the grid.
    pub exited:   u64,
    /// Vehicles lost to integer truncation or unassigned turn share.
    pub absorbed: u64,
}

/// Applies schedules to queues using a saturation flow rate and a fixed
/// turn split at the downstream node.
#[derive(Clone, Debug)]
pub struct FlowSimulator {
    config: FlowConfig,
}

impl FlowSimulator {
    pub fn new(config: FlowConfig) -> CoreResult<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &FlowConfig {
        &self.config
    }

    /// Work out `schedule.node`'s flow against the tick-start snapshot.
    ///
    /// Each green movement discharges
    /// `min(queued, floor(green × saturation_rate))` vehicles.  Discharged
    /// vehicles arrive at the neighbor on the side they came from and are
    /// split across its turns by the configured shares, truncated.
    pub fn plan(&self, topology: &Topology, demand: &[DemandMatrix], schedule: &Schedule) -> NodeFlow {
        let node = schedule.node;
        let own = &demand[node.index()];
        let mut flow = NodeFlow { node, ..NodeFlow::default() };

        for m in schedule.green_movements() {
            let moved = own.get(m).min(self.config.capacity(schedule.green_for(m)));
            if moved == 0 {
                continue;
            }
            flow.departures.push(Departure { movement: m, vehicles: moved });

            let Some(dest) = topology.neighbor(node, m.to()) else {
                flow.exited += moved;
                continue;
            };
            let side = m.to().opposite();
            let dest_matrix = &demand[dest.index()];
            let mut placed = 0;
            for turn in Turn::ALL {
                let share = (moved as f64 * self.config.turn_shares.get(turn)).floor() as u32;
                if share == 0 {
                    continue;
                }
                placed += share;
                let onward = Movement::new(side, turn);
                if dest_matrix.is_legal(onward) {
                    flow.arrivals.push(Arrival { node: dest, movement: onward, vehicles: share });
                } else {
                    flow.exited += share;
                }
            }
            flow.absorbed += moved - placed;
        }
        flow
    }

    /// Plan every schedule against `demand` and return the next tick's
    /// matrices.  `demand` itself is left untouched.
    pub fn step(
        &self,
        topology:  &Topology,
        demand:    &[DemandMatrix],
        schedules: &[Schedule],
    ) -> DemandResult<(Vec<DemandMatrix>, FlowReport)> {
        let flows: Vec<NodeFlow> = schedules
            .iter()
            .map(|s| self.plan(topology, demand, s))
            .collect();
        let mut next = demand.to_vec();
        let report = apply(&mut next, &flows)?;
        Ok((next, report))
    }
}

/// Merge planned flows into `demand`: all departures first, then all
/// arrivals, each in the order given.
///
/// Departures were sized against the same matrices, so no queue goes
/// negative.
pub fn apply(demand: &mut [DemandMatrix], flows: &[NodeFlow]) -> DemandResult<FlowReport> {
    let mut report = FlowReport::default();
    for flow in flows {
        let queues = &mut demand[flow.node.index()];
        for d in &flow.departures {
            let removed = queues.remove(d.movement, d.vehicles);
            debug_assert_eq!(removed, d.vehicles, "{}: departure exceeds queue", flow.node);
            report.served += removed as u64;
        }
        report.exited += flow.exited as u64;
        report.absorbed += flow.absorbed as u64;
    }
    for flow in flows {
        for a in &flow.arrivals {
            demand[a.node.index()].add(a.movement, a.vehicles)?;
            report.arrived += a.vehicles as u64;
        }
    }
    log::debug!(
        "flow: served {} arrived {} exited {} absorbed {}",
        report.served, report.arrived, report.exited, report.absorbed
    );
    Ok(report)
}
