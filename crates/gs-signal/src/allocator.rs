//! Proportional green-time allocation for one intersection.
//!
//! # Reconciliation order
//!
//! 1. Aggregate queued vehicles per phase.
//! 2. Phases with demand are *active*; none active → idle schedule.
//! 3. `usable = cycle_length − active × clearance` (floored at 0).
//! 4. Each active phase gets `round(share × usable)` (halves round up),
//!    floored at `min_green`.
//! 5. Add or remove single seconds, cycling through active phases in
//!    descending-demand order, until the sum equals `usable`.  Removal
//!    skips phases already at `min_green`.
//! 6. Back-pressure pass; a phase with demand but no green movement is
//!    *blocked*.
//! 7. Blocked phases' seconds are split among the remaining served phases
//!    by demand (largest remainder), or dropped if nobody can use them.
//! 8. Build the timeline in canonical phase order.
//!
//! Minimum green is enforced before blocked time is donated, so donations
//! only ever add to phases that already hold at least `min_green`.

use std::cmp::Reverse;

use gs_core::{CoreResult, NodeId, SignalConfig};
use gs_grid::{DemandMatrix, Topology};

use crate::{BackPressure, Interval, Phase, PhaseMap, Schedule};

/// Computes a [`Schedule`] for one node from the tick-start demand snapshot.
#[derive(Clone, Debug)]
pub struct PhaseAllocator {
    config:   SignalConfig,
    pressure: BackPressure,
}

impl PhaseAllocator {
    /// Validate `config` and build an allocator.
    pub fn new(config: SignalConfig) -> CoreResult<Self> {
        config.validate()?;
        let pressure = BackPressure::new(config.capacity_threshold);
        Ok(Self { config, pressure })
    }

    pub fn config(&self) -> &SignalConfig {
        &self.config
    }

    /// Plan `node` for one cycle.
    ///
    /// `demand` is the snapshot for every node, indexed by `NodeId`; only
    /// `node` and its neighbors are read.
    ///
    /// # Panics
    /// Panics if the finished plan overruns the cycle.  That would be a
    /// defect in this module, not a property of the input.
    pub fn allocate(&self, topology: &Topology, demand: &[DemandMatrix], node: NodeId) -> Schedule {
        let own = &demand[node.index()];
        let phase_demand = aggregate(own);
        let total_vehicles = own.total();

        let active: Vec<Phase> = Phase::ALL
            .into_iter()
            .filter(|&p| phase_demand[p] > 0)
            .collect();
        if active.is_empty() {
            return Schedule::idle(node, total_vehicles);
        }

        // Descending demand; the stable sort keeps canonical order on ties.
        let mut by_demand = active.clone();
        by_demand.sort_by_key(|&p| Reverse(phase_demand[p]));

        let usable = self.config.usable_green(active.len() as u32);
        let mut seconds = split(&phase_demand, usable, self.config.min_green);
        reconcile(&mut seconds, &by_demand, usable, self.config.min_green);

        let allowed = self.pressure.resolve(topology, demand, node);
        let mut blocked = PhaseMap::splat(false);
        for &p in &active {
            blocked[p] = !p.movements().any(|m| allowed[m]);
        }

        let dropped_green = donate_blocked(&mut seconds, &phase_demand, &blocked, &by_demand);
        if dropped_green > 0 {
            log::warn!(
                "{node}: every active phase is back-pressured, {dropped_green}s of green unused"
            );
        }

        let used = seconds.sum() + active.len() as u32 * self.config.clearance;
        assert!(
            used <= self.config.cycle_length,
            "{node}: plan uses {used}s of a {}s cycle (seconds {:?}, demand {:?})",
            self.config.cycle_length,
            seconds,
            phase_demand,
        );

        let timeline = timeline(&seconds, self.config.clearance);
        log::debug!(
            "{node}: demand {:?} → green {:?}, blocked {:?}",
            phase_demand.0, seconds.0, blocked.0
        );

        Schedule {
            node,
            phase_demand,
            phase_seconds: seconds,
            blocked,
            allowed,
            timeline,
            dropped_green,
            total_vehicles,
        }
    }
}

// ── Pipeline steps ────────────────────────────────────────────────────────────

/// Queued vehicles per phase.  Illegal movements always read zero.
pub fn aggregate(matrix: &DemandMatrix) -> PhaseMap<u64> {
    let mut out = PhaseMap::splat(0);
    for p in Phase::ALL {
        out[p] = p
            .movements()
            .filter(|&m| matrix.is_legal(m))
            .map(|m| u64::from(matrix.get(m)))
            .sum();
    }
    out
}

/// Demand-proportional split of `usable`, rounded half-up and floored at
/// `min_green` for every phase with demand.
fn split(demand: &PhaseMap<u64>, usable: u32, min_green: u32) -> PhaseMap<u32> {
    let total: u128 = demand.0.iter().map(|&d| u128::from(d)).sum();
    let mut out = PhaseMap::splat(0);
    if total == 0 {
        return out;
    }
    for p in Phase::ALL {
        let d = u128::from(demand[p]);
        if d == 0 {
            continue;
        }
        // share ≤ 1, so the quotient never exceeds `usable`.
        let rounded = (2 * d * u128::from(usable) + total) / (2 * total);
        out[p] = (rounded as u32).max(min_green);
    }
    out
}

/// Nudge `seconds` one at a time, cycling through `order`, until they sum
/// to `usable`.
fn reconcile(seconds: &mut PhaseMap<u32>, order: &[Phase], usable: u32, min_green: u32) {
    let mut allocated = seconds.sum();

    while allocated > usable {
        let mut progressed = false;
        for &p in order {
            if allocated == usable {
                break;
            }
            if seconds[p] > min_green {
                seconds[p] -= 1;
                allocated -= 1;
                progressed = true;
            }
        }
        // Every phase sits at min_green: the budget cannot be met.  The
        // caller's budget assertion reports it.
        if !progressed {
            break;
        }
    }

    while allocated < usable {
        for &p in order {
            if allocated == usable {
                break;
            }
            seconds[p] += 1;
            allocated += 1;
        }
    }
}

/// Move blocked phases' seconds to served phases in proportion to demand.
/// Returns the seconds that had no recipient.
fn donate_blocked(
    seconds: &mut PhaseMap<u32>,
    demand:  &PhaseMap<u64>,
    blocked: &PhaseMap<bool>,
    order:   &[Phase],
) -> u32 {
    let pool: u32 = Phase::ALL
        .into_iter()
        .filter(|&p| blocked[p])
        .map(|p| std::mem::take(&mut seconds[p]))
        .sum();
    if pool == 0 {
        return 0;
    }

    let recipients: Vec<Phase> = order
        .iter()
        .copied()
        .filter(|&p| !blocked[p] && seconds[p] > 0)
        .collect();
    let recipient_demand: u128 = recipients.iter().map(|&p| u128::from(demand[p])).sum();
    if recipient_demand == 0 {
        return pool;
    }

    // Largest-remainder apportionment so the pool is handed out exactly.
    let mut remainders: Vec<(Phase, u128)> = Vec::with_capacity(recipients.len());
    let mut handed_out = 0u32;
    for &p in &recipients {
        let numerator = u128::from(demand[p]) * u128::from(pool);
        let share = (numerator / recipient_demand) as u32;
        seconds[p] += share;
        handed_out += share;
        remainders.push((p, numerator % recipient_demand));
    }
    remainders.sort_by_key(|&(p, r)| (Reverse(r), p));
    for &(p, _) in remainders.iter().take((pool - handed_out) as usize) {
        seconds[p] += 1;
    }
    0
}

/// Lay served phases end to end in canonical order, `clearance` apart.
fn timeline(seconds: &PhaseMap<u32>, clearance: u32) -> Vec<Interval> {
    let mut cursor = 0;
    let mut out = Vec::new();
    for (phase, green) in seconds.iter() {
        if green == 0 {
            continue;
        }
        out.push(Interval { phase, start: cursor, end: cursor + green });
        cursor += green + clearance;
    }
    out
}
