//! Integration tests for gs-sim.

use std::io::Cursor;

use gs_core::{Direction, FlowConfig, Movement, NodeId, SignalConfig, Tick, Turn};
use gs_grid::{matrices_for, BoundaryPolicy, DemandMatrix, Topology};
use gs_signal::Schedule;

use crate::{load_demand_reader, NoopDemand, Sim, SimBuilder, SimConfig, SimError};

// ── Helpers ───────────────────────────────────────────────────────────────────

fn test_config(total_ticks: u64) -> SimConfig {
    SimConfig {
        total_ticks,
        seed: 42,
        start_unix_secs: 1_700_000_000,
        output_interval_ticks: 1,
        ..SimConfig::default()
    }
}

fn allocation_only(total_ticks: u64) -> SimConfig {
    SimConfig { flow: None, ..test_config(total_ticks) }
}

fn mv(from: Direction, turn: Turn) -> Movement {
    Movement::new(from, turn)
}

fn grid(rows: u32, cols: u32) -> Topology {
    Topology::grid(rows, cols).unwrap()
}

/// Build a noop-demand sim over `topology` with `seed` applied to fresh
/// matrices.
fn seeded_sim(
    config:   SimConfig,
    topology: Topology,
    seed:     impl FnOnce(&mut [DemandMatrix]),
) -> Sim<NoopDemand> {
    let mut demand = matrices_for(&topology, config.boundary);
    seed(&mut demand);
    SimBuilder::new(config, topology, NoopDemand)
        .initial_demand(demand)
        .build()
        .unwrap()
}

// ── SimBuilder validation ─────────────────────────────────────────────────────

#[cfg(test)]
mod builder_tests {
    use super::*;

    #[test]
    fn builds_successfully_with_defaults() {
        let sim = SimBuilder::new(test_config(10), grid(2, 2), NoopDemand)
            .build()
            .unwrap();
        assert_eq!(sim.demand.len(), 4);
        assert!(sim.demand.iter().all(|m| m.total() == 0));
        assert!(sim.flow.is_some());
        assert_eq!(sim.clock.current_tick, Tick(0));
        assert_eq!(sim.clock.tick_duration_secs, 120);
    }

    #[test]
    fn demand_count_mismatch_errors() {
        let topology = grid(2, 2);
        let short = vec![DemandMatrix::open(); 3];
        let result = SimBuilder::new(test_config(10), topology, NoopDemand)
            .initial_demand(short)
            .build();
        assert!(matches!(
            result,
            Err(SimError::NodeCountMismatch { expected: 4, got: 3, .. })
        ));
    }

    #[test]
    fn invalid_signal_config_rejected() {
        let mut config = test_config(10);
        // 4 × (40 + 3) > 120: minimum greens can never all fit.
        config.signal = SignalConfig { min_green: 40, ..SignalConfig::default() };
        let result = SimBuilder::new(config, grid(1, 1), NoopDemand).build();
        assert!(matches!(result, Err(SimError::Config(_))));
    }

    #[test]
    fn invalid_flow_config_rejected() {
        let mut config = test_config(10);
        config.flow = Some(FlowConfig { saturation_rate: -1.0, ..FlowConfig::default() });
        let result = SimBuilder::new(config, grid(1, 1), NoopDemand).build();
        assert!(matches!(result, Err(SimError::Config(_))));
    }

    #[test]
    fn flow_can_be_disabled() {
        let sim = SimBuilder::new(allocation_only(10), grid(1, 1), NoopDemand)
            .build()
            .unwrap();
        assert!(sim.flow.is_none());
    }
}

// ── Basic run ─────────────────────────────────────────────────────────────────

#[cfg(test)]
mod run_tests {
    use super::*;
    use crate::NoopObserver;

    #[test]
    fn noop_runs_to_end_tick() {
        let mut sim = SimBuilder::new(test_config(10), grid(3, 3), NoopDemand)
            .build()
            .unwrap();
        sim.run(&mut NoopObserver).unwrap();
        assert_eq!(sim.clock.current_tick, Tick(10));
    }

    #[test]
    fn run_ticks_ignores_end_tick() {
        let mut sim = SimBuilder::new(test_config(2), grid(1, 1), NoopDemand)
            .build()
            .unwrap();
        sim.run_ticks(5, &mut NoopObserver).unwrap();
        assert_eq!(sim.clock.current_tick, Tick(5));
    }

    #[test]
    fn step_reports_tick_and_wall_time() {
        let mut sim = SimBuilder::new(test_config(10), grid(1, 1), NoopDemand)
            .build()
            .unwrap();
        let first = sim.step().unwrap();
        let second = sim.step().unwrap();
        assert_eq!(first.tick, Tick(0));
        assert_eq!(second.tick, Tick(1));
        assert_eq!(first.unix_time_secs, 1_700_000_000);
        assert_eq!(second.unix_time_secs, 1_700_000_120);
    }

    #[test]
    fn idle_grid_yields_idle_schedules() {
        let mut sim = SimBuilder::new(test_config(1), grid(2, 3), NoopDemand)
            .build()
            .unwrap();
        let outcome = sim.step().unwrap();
        assert_eq!(outcome.schedules.len(), 6);
        assert!(outcome.schedules.iter().all(Schedule::is_idle));
        assert_eq!(outcome.total_vehicles(), 0);
        assert_eq!(outcome.vehicles_served(), 0);
    }
}

// ── Step semantics ────────────────────────────────────────────────────────────

#[cfg(test)]
mod step_tests {
    use gs_signal::Phase;

    use super::*;
    use crate::plan_tick;
    use crate::{DemandSource, RandomDemand};

    #[test]
    fn single_node_queue_exits_the_grid() {
        let mut sim = seeded_sim(test_config(3), grid(1, 1), |d| {
            d[0].set(mv(Direction::N, Turn::Straight), 10).unwrap();
        });

        let outcome = sim.step().unwrap();
        assert_eq!(outcome.schedules[0].phase_seconds[Phase::NsMain], 117);
        let report = outcome.flow.unwrap();
        assert_eq!(report.served, 10);
        assert_eq!(report.exited, 10);
        assert_eq!(sim.demand[0].total(), 0);

        let next = sim.step().unwrap();
        assert!(next.schedules[0].is_idle());
    }

    #[test]
    fn without_flow_queues_persist() {
        let mut sim = seeded_sim(allocation_only(3), grid(1, 1), |d| {
            d[0].set(mv(Direction::N, Turn::Straight), 10).unwrap();
        });
        let a = sim.step().unwrap();
        let b = sim.step().unwrap();
        assert!(a.flow.is_none());
        assert_eq!(sim.demand[0].total(), 10);
        assert_eq!(a.schedules, b.schedules);
    }

    #[test]
    fn discharge_arrives_at_the_neighbor() {
        // A ─ B: westbound-origin straight traffic at A heads east into B.
        let mut sim = seeded_sim(test_config(3), grid(1, 2), |d| {
            d[0].set(mv(Direction::W, Turn::Straight), 10).unwrap();
        });

        let report = sim.step().unwrap().flow.unwrap();
        assert_eq!(report.served, 10);
        assert_eq!(report.arrived, 10);
        assert_eq!(report.exited, 0);
        assert_eq!(sim.demand[0].total(), 0);
        // Arrivals enter B from its west side: 6 straight, 2 left, 2 right.
        assert_eq!(sim.demand[1].get(mv(Direction::W, Turn::Straight)), 6);
        assert_eq!(sim.demand[1].get(mv(Direction::W, Turn::Left)), 2);
        assert_eq!(sim.demand[1].get(mv(Direction::W, Turn::Right)), 2);
    }

    #[test]
    fn saturated_neighbor_holds_upstream_queue() {
        let mut sim = seeded_sim(test_config(3), grid(1, 2), |d| {
            d[0].set(mv(Direction::W, Turn::Straight), 5).unwrap();
            d[1].set(mv(Direction::W, Turn::Straight), 10).unwrap();
        });

        let outcome = sim.step().unwrap();
        let a = &outcome.schedules[0];
        assert!(a.blocked[Phase::EwMain]);
        assert_eq!(a.dropped_green, 117);
        assert_eq!(outcome.blocked_phases(), 1);

        // A held red; B's eastbound traffic leaves the grid.
        assert_eq!(sim.demand[0].get(mv(Direction::W, Turn::Straight)), 5);
        assert_eq!(sim.demand[1].total(), 0);
        assert_eq!(outcome.flow.unwrap().exited, 10);
    }

    #[test]
    fn planning_ignores_node_order() {
        let topology = grid(3, 3);
        let mut demand = matrices_for(&topology, BoundaryPolicy::Exit);
        RandomDemand::replace(9, 20)
            .refresh(Tick(0), &topology, &mut demand)
            .unwrap();
        let sim = SimBuilder::new(test_config(1), topology, NoopDemand)
            .initial_demand(demand)
            .build()
            .unwrap();

        let forward = plan_tick(&sim.allocator, &sim.topology, &sim.demand);
        let mut backward: Vec<Schedule> = (0..9u32)
            .rev()
            .map(|i| sim.allocator.allocate(&sim.topology, &sim.demand, NodeId(i)))
            .collect();
        backward.reverse();
        assert_eq!(forward, backward);
    }

    #[test]
    fn every_plan_fits_the_cycle() {
        let config = test_config(5);
        let signal = config.signal.clone();
        let mut sim = SimBuilder::new(config, grid(4, 4), RandomDemand::replace(3, 20))
            .build()
            .unwrap();
        let mut served_plans = 0;
        for _ in 0..5 {
            let outcome = sim.step().unwrap();
            for s in &outcome.schedules {
                let used = s.cycle_used(signal.clearance);
                assert!(used <= signal.cycle_length, "{}: over budget", s.node);

                let served: Vec<_> = s.active_phases().filter(|&p| !s.blocked[p]).collect();
                for &p in &served {
                    assert!(
                        s.seconds(p) >= signal.min_green,
                        "{}: {p} got {}s, below min green", s.node, s.seconds(p),
                    );
                }
                let usable = signal.usable_green(s.active_phase_count());
                if !served.is_empty() && usable > 0 {
                    assert_eq!(used, signal.cycle_length, "{}: cycle not filled", s.node);
                    served_plans += 1;
                }
            }
        }
        assert!(served_plans > 0);
    }
}

// ── Demand sources ────────────────────────────────────────────────────────────

#[cfg(test)]
mod demand_tests {
    use super::*;
    use crate::{DemandSource, RandomDemand};

    fn refreshed(source: &mut RandomDemand, topology: &Topology, ticks: u64) -> Vec<DemandMatrix> {
        let mut demand = matrices_for(topology, BoundaryPolicy::Exit);
        for t in 0..ticks {
            source.refresh(Tick(t), topology, &mut demand).unwrap();
        }
        demand
    }

    #[test]
    fn same_seed_same_demand() {
        let topology = grid(4, 4);
        let a = refreshed(&mut RandomDemand::replace(7, 20), &topology, 1);
        let b = refreshed(&mut RandomDemand::replace(7, 20), &topology, 1);
        assert_eq!(a, b);
    }

    #[test]
    fn different_seeds_differ() {
        let topology = grid(4, 4);
        let a = refreshed(&mut RandomDemand::replace(7, 20), &topology, 1);
        let b = refreshed(&mut RandomDemand::replace(8, 20), &topology, 1);
        assert_ne!(a, b);
    }

    #[test]
    fn replace_stays_within_bound() {
        let topology = grid(4, 4);
        let demand = refreshed(&mut RandomDemand::replace(1, 20), &topology, 3);
        for matrix in &demand {
            assert!(matrix.iter().all(|(_, v)| v <= 20));
        }
    }

    #[test]
    fn add_mode_accumulates() {
        let topology = grid(2, 2);
        let once = refreshed(&mut RandomDemand::arrivals(5, 20), &topology, 1);
        let twice = refreshed(&mut RandomDemand::arrivals(5, 20), &topology, 2);
        for (a, b) in once.iter().zip(&twice) {
            for m in Movement::all() {
                assert!(b.get(m) >= a.get(m));
            }
        }
    }

    #[test]
    fn closed_boundary_never_drawn() {
        let topology = grid(2, 2);
        let mut demand = matrices_for(&topology, BoundaryPolicy::Closed);
        RandomDemand::replace(11, 20)
            .refresh(Tick(0), &topology, &mut demand)
            .unwrap();
        for matrix in &demand {
            for m in Movement::all().filter(|&m| !matrix.is_legal(m)) {
                assert_eq!(matrix.get(m), 0);
            }
        }
    }

    #[test]
    fn seeded_runs_are_reproducible() {
        let run = || {
            let mut sim = SimBuilder::new(test_config(5), grid(4, 4), RandomDemand::arrivals(42, 20))
                .build()
                .unwrap();
            let outcomes: Vec<_> = (0..5).map(|_| sim.step().unwrap().schedules).collect();
            (outcomes, sim.demand)
        };
        assert_eq!(run(), run());
    }
}

// ── CSV replay ────────────────────────────────────────────────────────────────

#[cfg(test)]
mod loader_tests {
    use super::*;
    use crate::{DemandSource, NodeRef};

    const REPLAY: &str = "\
tick,node,from,to,vehicles
0,A,N,S,12
0,1,W,E,7
2,A,N,S,0
";

    #[test]
    fn parses_labels_and_ids() {
        let replay = load_demand_reader(Cursor::new(REPLAY)).unwrap();
        assert_eq!(replay.ticks().collect::<Vec<_>>(), vec![Tick(0), Tick(2)]);

        let first = replay.entries(Tick(0));
        assert_eq!(first.len(), 2);
        assert_eq!(first[0].node, NodeRef::Label("A".into()));
        assert_eq!(first[0].movement, mv(Direction::N, Turn::Straight));
        assert_eq!(first[0].vehicles, 12);
        assert_eq!(first[1].node, NodeRef::Id(NodeId(1)));
        assert!(replay.entries(Tick(1)).is_empty());
    }

    #[test]
    fn replays_listed_ticks_only() {
        let replay = load_demand_reader(Cursor::new(REPLAY)).unwrap();
        let mut sim = SimBuilder::new(allocation_only(3), grid(1, 2), replay)
            .build()
            .unwrap();
        let ns = mv(Direction::N, Turn::Straight);

        sim.step().unwrap();
        assert_eq!(sim.demand[0].get(ns), 12);
        assert_eq!(sim.demand[1].get(mv(Direction::W, Turn::Straight)), 7);

        sim.step().unwrap();
        assert_eq!(sim.demand[0].get(ns), 12);

        sim.step().unwrap();
        assert_eq!(sim.demand[0].get(ns), 0);
    }

    #[test]
    fn u_turn_rejected() {
        let csv = "tick,node,from,to,vehicles\n0,A,N,N,3\n";
        assert!(matches!(load_demand_reader(Cursor::new(csv)), Err(SimError::Load(_))));
    }

    #[test]
    fn bad_direction_rejected() {
        let csv = "tick,node,from,to,vehicles\n0,A,X,S,3\n";
        assert!(matches!(load_demand_reader(Cursor::new(csv)), Err(SimError::Load(_))));
    }

    #[test]
    fn negative_count_rejected() {
        let csv = "tick,node,from,to,vehicles\n0,A,N,S,-3\n";
        assert!(matches!(load_demand_reader(Cursor::new(csv)), Err(SimError::Load(_))));
    }

    #[test]
    fn unknown_label_fails_on_refresh() {
        let csv = "tick,node,from,to,vehicles\n0,ZZ,N,S,3\n";
        let mut replay = load_demand_reader(Cursor::new(csv)).unwrap();
        let topology = grid(1, 1);
        let mut demand = matrices_for(&topology, BoundaryPolicy::Exit);
        let err = replay.refresh(Tick(0), &topology, &mut demand).unwrap_err();
        assert!(matches!(err, SimError::Load(_)));
    }

    #[test]
    fn unknown_id_fails_on_refresh() {
        let csv = "tick,node,from,to,vehicles\n0,9,N,S,3\n";
        let mut replay = load_demand_reader(Cursor::new(csv)).unwrap();
        let topology = grid(1, 1);
        let mut demand = matrices_for(&topology, BoundaryPolicy::Exit);
        let err = replay.refresh(Tick(0), &topology, &mut demand).unwrap_err();
        assert!(matches!(err, SimError::Topology(_)));
    }

    #[test]
    fn closed_boundary_movement_fails_on_refresh() {
        let csv = "tick,node,from,to,vehicles\n0,A,N,S,3\n";
        let mut replay = load_demand_reader(Cursor::new(csv)).unwrap();
        let topology = grid(1, 1);
        let mut demand = matrices_for(&topology, BoundaryPolicy::Closed);
        let err = replay.refresh(Tick(0), &topology, &mut demand).unwrap_err();
        assert!(matches!(err, SimError::Demand(_)));
    }
}

// ── Observer ──────────────────────────────────────────────────────────────────

#[cfg(test)]
mod observer_tests {
    use gs_flow::FlowReport;

    use super::*;
    use crate::{SimObserver, StepOutcome};

    #[derive(Default)]
    struct Counter {
        starts:    u64,
        schedules: Vec<Tick>,
        flows:     u64,
        ends:      u64,
        sim_end:   Option<Tick>,
        sizes:     Vec<(usize, usize)>,
    }

    impl SimObserver for Counter {
        fn on_tick_start(&mut self, _tick: Tick) {
            self.starts += 1;
        }

        fn on_schedules(
            &mut self,
            tick:      Tick,
            _topology: &Topology,
            demand:    &[DemandMatrix],
            schedules: &[Schedule],
        ) {
            self.schedules.push(tick);
            self.sizes.push((demand.len(), schedules.len()));
        }

        fn on_flow(&mut self, _tick: Tick, _report: &FlowReport) {
            self.flows += 1;
        }

        fn on_tick_end(&mut self, _tick: Tick, _outcome: &StepOutcome) {
            self.ends += 1;
        }

        fn on_sim_end(&mut self, final_tick: Tick) {
            self.sim_end = Some(final_tick);
        }
    }

    #[test]
    fn hooks_fire_per_tick() {
        let mut config = test_config(5);
        config.output_interval_ticks = 2;
        let mut sim = SimBuilder::new(config, grid(2, 2), NoopDemand).build().unwrap();
        let mut counter = Counter::default();
        sim.run(&mut counter).unwrap();

        assert_eq!(counter.starts, 5);
        assert_eq!(counter.ends, 5);
        assert_eq!(counter.flows, 5);
        assert_eq!(counter.schedules, vec![Tick(0), Tick(2), Tick(4)]);
        assert!(counter.sizes.iter().all(|&s| s == (4, 4)));
        assert_eq!(counter.sim_end, Some(Tick(5)));
    }

    #[test]
    fn no_flow_hook_without_flow() {
        let mut sim = SimBuilder::new(allocation_only(3), grid(1, 1), NoopDemand)
            .build()
            .unwrap();
        let mut counter = Counter::default();
        sim.run(&mut counter).unwrap();
        assert_eq!(counter.flows, 0);
        assert_eq!(counter.ends, 3);
    }

    #[test]
    fn zero_interval_never_reports_schedules() {
        let mut config = test_config(3);
        config.output_interval_ticks = 0;
        let mut sim = SimBuilder::new(config, grid(1, 1), NoopDemand).build().unwrap();
        let mut counter = Counter::default();
        sim.run(&mut counter).unwrap();
        assert!(counter.schedules.is_empty());
    }

    #[test]
    fn run_ticks_skips_sim_end() {
        let mut sim = SimBuilder::new(test_config(5), grid(1, 1), NoopDemand).build().unwrap();
        let mut counter = Counter::default();
        sim.run_ticks(2, &mut counter).unwrap();
        assert_eq!(counter.starts, 2);
        assert_eq!(counter.sim_end, None);
    }
}

// ── JSON configuration ────────────────────────────────────────────────────────

#[cfg(test)]
mod config_tests {
    use super::*;

    #[test]
    fn partial_json_takes_defaults() {
        let json = r#"{ "total_ticks": 3, "flow": null, "boundary": "closed",
                        "signal": { "cycle_length": 90 } }"#;
        let config: SimConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.total_ticks, 3);
        assert!(config.flow.is_none());
        assert_eq!(config.boundary, BoundaryPolicy::Closed);
        assert_eq!(config.signal.cycle_length, 90);
        assert_eq!(config.signal.min_green, 15);
        assert_eq!(config.seed, 42);
    }

    #[test]
    fn config_survives_json() {
        let config = test_config(7);
        let text = serde_json::to_string(&config).unwrap();
        let back: SimConfig = serde_json::from_str(&text).unwrap();
        assert_eq!(back, config);
    }

    #[test]
    fn end_tick_is_total_ticks() {
        assert_eq!(test_config(12).end_tick(), Tick(12));
    }
}
