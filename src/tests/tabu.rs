use std::time::Duration;

use approx::assert_relative_eq;

use super::{square, square_with_bottleneck, top_and_bottom_demands};
use crate::{
    algorithms::{Link, Topology, INFINITE_DISTANCE},
    demands::Demands,
    setting::Setting,
    simulators::FlowSimulator,
    solvers::{Solver, SolverRegistry, TabuConfig, TabuIgpwo},
};

fn bottleneck_setting() -> Setting {
    let topo = square_with_bottleneck();
    let demands = top_and_bottom_demands(&topo, 2.0, 1.0);
    Setting::new(topo, demands).unwrap()
}

fn solver(seed: u64) -> TabuIgpwo {
    let mut config = TabuConfig::default();
    config.seed(seed).max_weight(20);
    TabuIgpwo::new(config).unwrap()
}

#[test]
fn relieves_the_bottleneck() {
    let mut setting = bottleneck_setting();
    let mut sim = FlowSimulator::new();
    sim.compute_flows(&setting);
    assert_relative_eq!(sim.max_utilization(), 2.0);

    let mut tabu = solver(42);
    tabu.solve(&mut setting, Duration::from_millis(1000)).unwrap();

    let best = tabu.best_score().unwrap();
    assert!(best <= 1.0 + 1e-9, "best score is {best}");
    sim.compute_flows(&setting);
    assert_relative_eq!(sim.max_utilization(), best, epsilon = 1e-9);
    assert!(tabu.solve_time() > Duration::ZERO);
}

#[test]
fn weights_stay_in_range() {
    let mut setting = bottleneck_setting();
    let dc = setting.topology().edge_id("dc").unwrap();
    setting.topology_mut().fail_edge(dc).unwrap();
    let original = setting.clone();

    let mut tabu = solver(7);
    tabu.solve(&mut setting, Duration::from_millis(300)).unwrap();

    let topo = setting.topology();
    for e in topo.edge_indices() {
        if topo.edge_label(e) == "dc" {
            assert_eq!(topo.weight(e), INFINITE_DISTANCE);
        } else {
            assert!((1..=20).contains(&topo.weight(e)));
        }
    }
    // the clone is not affected by the optimization
    assert!(original.topology().weights().iter().all(|w| *w == 1 || *w == INFINITE_DISTANCE));
}

#[test]
fn reset_to_best_state() {
    let mut setting = bottleneck_setting();
    let mut config = TabuConfig::default();
    config
        .seed(3)
        .max_weight(4)
        .tabu_size(2)
        .reset_state_when_reset_tabu(true);
    let mut tabu = TabuIgpwo::new(config).unwrap();
    tabu.solve(&mut setting, Duration::from_millis(300)).unwrap();

    // a tabu table with four entries runs out of allowed moves quickly
    assert!(tabu.num_resets() > 0);
    let best = tabu.best_score().unwrap();
    assert!(best < 2.0, "best score is {best}");
    assert!(setting.topology().weights().iter().all(|w| (1..=4).contains(w)));

    // the weights written back are the best state, not the state after the last reset
    let mut sim = FlowSimulator::new();
    sim.compute_flows(&setting);
    assert_eq!(sim.max_utilization(), best);
}

#[test]
fn nothing_to_optimize() {
    let topo = Topology::new(["a", "b"], Vec::<(usize, usize, Link)>::new()).unwrap();
    let demands = Demands::new(&topo, Vec::new()).unwrap();
    let mut setting = Setting::new(topo, demands).unwrap();
    let mut tabu = solver(0);
    tabu.solve(&mut setting, Duration::from_millis(100)).unwrap();
    assert_eq!(tabu.best_score(), Some(0.0));
}

#[test]
fn solve_through_registry() {
    let topo = square();
    let demands = top_and_bottom_demands(&topo, 1.0, 1.0);
    let mut setting = Setting::new(topo, demands).unwrap();
    let mut solver = SolverRegistry::with_defaults().create("tabu-igpwo").unwrap();
    solver.solve(&mut setting, Duration::from_millis(100)).unwrap();
    assert!(solver.solve_time() >= Duration::from_millis(100));
}
