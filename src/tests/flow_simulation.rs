use approx::assert_relative_eq;
use proptest::prelude::*;

use super::{bottom_demand, diagonal_demands, square};
use crate::{
    algorithms::{EdgeId, Topology},
    demands::Demands,
    paths::SrPaths,
    setting::Setting,
    simulators::{EcmpFlowSimulator, FlowSimulator},
};

fn assert_flows(topo: &Topology, sim: &FlowSimulator, expected: &[(&str, f64)]) {
    for e in topo.edge_indices() {
        let want = expected
            .iter()
            .find(|(l, _)| *l == topo.edge_label(e))
            .map(|(_, f)| *f)
            .unwrap_or(0.0);
        assert_relative_eq!(sim.flow_on_edge(e), want, epsilon = 1e-9);
    }
}

fn edges(topo: &Topology, labels: &[&str]) -> Vec<EdgeId> {
    labels.iter().map(|l| topo.edge_id(l).unwrap()).collect()
}

#[test]
fn explicit_path() {
    let topo = square();
    let demands = bottom_demand(&topo);
    let mut setting = Setting::new(topo.clone(), demands).unwrap();
    setting
        .set_explicit_path(0, edges(&topo, &["ca", "ab", "bd"]))
        .unwrap();

    let mut sim = FlowSimulator::new();
    sim.compute_flows(&setting);
    assert_flows(&topo, &sim, &[("ca", 1.0), ("ab", 1.0), ("bd", 1.0)]);
    assert_eq!(sim.simulated_demands().len(), 1);
    assert_relative_eq!(sim.max_utilization(), 1.0);
}

#[test]
fn no_paths_means_ecmp() {
    let topo = square();
    let demands = bottom_demand(&topo);
    let setting = Setting::new(topo.clone(), demands).unwrap();
    let mut sim = FlowSimulator::new();
    sim.compute_flows(&setting);
    assert_flows(&topo, &sim, &[("cd", 1.0)]);
}

#[test]
fn explicit_and_ecmp() {
    let topo = square();
    let demands = diagonal_demands(&topo);
    let mut setting = Setting::new(topo.clone(), demands).unwrap();
    setting
        .set_explicit_path(0, edges(&topo, &["ca", "ab"]))
        .unwrap();

    let mut sim = FlowSimulator::new();
    sim.compute_flows(&setting);
    assert_flows(
        &topo,
        &sim,
        &[
            ("ab", 1.5),
            ("ca", 1.0),
            ("ac", 0.5),
            ("cd", 0.5),
            ("bd", 0.5),
        ],
    );
    assert_relative_eq!(sim.max_utilization(), 1.5);
    assert_relative_eq!(sim.utilization(topo.edge_id("ab").unwrap()), 1.5);
}

#[test]
fn default_sr_paths_equal_ecmp() {
    let topo = square();
    let demands = diagonal_demands(&topo);
    let mut setting = Setting::new(topo, demands).unwrap();

    let mut ecmp = FlowSimulator::with_simulators(vec![Box::new(EcmpFlowSimulator)]);
    let expected = ecmp.compute_flows(&setting).clone();

    setting.set_sr_paths(SrPaths::new(setting.demands())).unwrap();
    let mut sim = FlowSimulator::new();
    assert_eq!(sim.compute_flows(&setting), &expected);
}

#[test]
fn sr_waypoint() {
    let mut topo = square();
    topo.set_weight_by_label("cd", 2).unwrap();
    topo.set_weight_by_label("dc", 2).unwrap();
    let demands = bottom_demand(&topo);
    let mut setting = Setting::new(topo.clone(), demands).unwrap();

    let mut sim = FlowSimulator::new();
    sim.compute_flows(&setting);
    assert_flows(&topo, &sim, &[("cd", 1.0)]);

    let [b, c, d] = ["b", "c", "d"].map(|l| topo.node_id(l).unwrap());
    setting.set_sr_path(0, vec![c, b, d]).unwrap();
    sim.compute_flows(&setting);
    assert_flows(&topo, &sim, &[("ca", 1.0), ("ab", 1.0), ("bd", 1.0)]);
}

#[test]
fn zero_capacity() {
    let topo = Topology::from_arrays(
        &["a", "b"],
        &["ab", "ba"],
        &[0, 1],
        &[1, 0],
        &[1, 1],
        &[0.0, 1.0],
        &[1, 1],
    )
    .unwrap();
    let demands = Demands::from_arrays(&topo, &["demand_ab"], &[0], &[1], &[1.0]).unwrap();
    let setting = Setting::new(topo, demands).unwrap();
    let mut sim = FlowSimulator::new();
    sim.compute_flows(&setting);
    assert_eq!(sim.max_utilization(), f64::INFINITY);
}

#[test]
fn next_hops_are_grouped_by_priority() {
    let topo = square();
    let demands = bottom_demand(&topo);
    let setting = Setting::new(topo, demands).unwrap();
    let mut sim = FlowSimulator::new();
    sim.compute_flows(&setting);
    let next_hops = sim.next_hops();
    assert!(next_hops.contains("***Next hops priority 1 (explicit paths)***"));
    assert!(next_hops.contains("***Next hops priority 2 (SR paths)***"));
    assert!(next_hops.contains("***Next hops priority 3 (ECMP paths)***"));

    sim.record_next_hops(false).compute_flows(&setting);
    assert!(sim.next_hops().is_empty());
}

#[test]
fn sr_trace_lists_waypoints() {
    let topo = square();
    let demands = diagonal_demands(&topo);
    let mut setting = Setting::new(topo.clone(), demands).unwrap();
    let [a, b, c, d] = ["a", "b", "c", "d"].map(|l| topo.node_id(l).unwrap());
    setting.set_sr_path(0, vec![c, d, b]).unwrap();
    setting.set_sr_path(1, vec![a, c, d]).unwrap();
    // demand 0 is routed explicitly and must not show up in the SR section
    setting
        .set_explicit_path(0, edges(&topo, &["ca", "ab"]))
        .unwrap();

    let mut sim = FlowSimulator::new();
    sim.compute_flows(&setting);
    let sr_section = sim
        .next_hops()
        .split("***Next hops priority 2 (SR paths)***\n")
        .nth(1)
        .and_then(|s| s.split("***").next())
        .unwrap();
    assert_eq!(sr_section, "demand_ad: a -> c -> d\n");
}

proptest! {
    #[test]
    fn ecmp_conserves_flow(
        amounts in prop::collection::vec(0.0f64..10.0, 16),
        weights in prop::collection::vec(1u64..5, 8),
    ) {
        let mut topo = square();
        topo.set_weights(&weights).unwrap();
        let (src, dst): (Vec<usize>, Vec<usize>) =
            (0..16).map(|i| (i / 4, i % 4)).unzip();
        let labels: Vec<String> = (0..16).map(|i| format!("demand_{i}")).collect();
        let demands = Demands::from_arrays(&topo, &labels, &src, &dst, &amounts).unwrap();
        let setting = Setting::new(topo.clone(), demands).unwrap();

        let mut sim = FlowSimulator::new();
        sim.compute_flows(&setting);

        for n in topo.node_indices() {
            let out: f64 = topo.out_edges(n).map(|e| sim.flow_on_edge(e)).sum();
            let inc: f64 = topo.in_edges(n).map(|e| sim.flow_on_edge(e)).sum();
            let injected: f64 = (0..16)
                .filter(|i| src[*i] == n.index() && dst[*i] != n.index())
                .map(|i| amounts[i])
                .sum();
            let absorbed: f64 = (0..16)
                .filter(|i| dst[*i] == n.index() && src[*i] != n.index())
                .map(|i| amounts[i])
                .sum();
            prop_assert!((out - inc - injected + absorbed).abs() < 1e-6);
        }
    }
}
