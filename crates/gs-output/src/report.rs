//! Console cycle chart.
//!
//! ```text
//! Node F cycle (CYCLE=120s, MIN=15s, YELLOW=3s):
//! Total vehicles at node: 61
//! Phase ns_main [0s -> 52s]
//!   N   straight -> S  : GREEN (12 cars)
//!   N   left     -> E  : RED (4 cars)
//! ```

use std::fmt;

use gs_core::SignalConfig;
use gs_grid::{DemandMatrix, Node};
use gs_signal::Schedule;

/// Display adapter for one node's plan.  Only phases that received green
/// are listed, in timeline order.
pub struct CycleChart<'a> {
    pub node:     &'a Node,
    pub schedule: &'a Schedule,
    pub demand:   &'a DemandMatrix,
    pub config:   &'a SignalConfig,
}

impl fmt::Display for CycleChart<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Node {} cycle (CYCLE={}s, MIN={}s, YELLOW={}s):",
            self.node.label, self.config.cycle_length, self.config.min_green, self.config.clearance,
        )?;
        writeln!(f, "Total vehicles at node: {}", self.schedule.total_vehicles)?;

        for interval in &self.schedule.timeline {
            writeln!(f, "Phase {} [{}s -> {}s]", interval.phase.name(), interval.start, interval.end)?;
            for m in interval.phase.movements().filter(|&m| self.demand.is_legal(m)) {
                let signal = if self.schedule.is_allowed(m) { "GREEN" } else { "RED" };
                writeln!(
                    f,
                    "  {:<3} {:<8} -> {:<3}: {} ({} cars)",
                    m.from.as_str(),
                    m.turn.as_str(),
                    m.to().as_str(),
                    signal,
                    self.demand.get(m),
                )?;
            }
        }
        Ok(())
    }
}

/// Render the chart for `node` as a string.
pub fn render_cycle_chart(
    node:     &Node,
    schedule: &Schedule,
    demand:   &DemandMatrix,
    config:   &SignalConfig,
) -> String {
    CycleChart { node, schedule, demand, config }.to_string()
}
