//! Optimize the link weights of a synthetic grid network.

#![deny(missing_docs, missing_debug_implementations)]

use std::time::Duration;

use anyhow::Context;
use log::info;
use tesim::{
    scenario::{ScenarioBuilder, ScenarioTopo},
    simulators::FlowSimulator,
    solvers::{Solver, TabuConfig, TabuIgpwo},
};

fn main() -> anyhow::Result<()> {
    pretty_env_logger::init();

    let mut setting = ScenarioBuilder::new(ScenarioTopo::Grid(4, 5))
        .seed(2)
        .weights(1, 10)
        .capacities(10.0, 20.0)
        .demands(60)
        .amounts(0.5, 2.0)
        .build()
        .context("Generating the scenario")?;

    let topo = setting.topology();
    info!(
        "Network with {} nodes, {} edges and {} demands (total {:.1})",
        topo.num_nodes(),
        topo.num_edges(),
        setting.demands().len(),
        setting.demands().total_amount()
    );

    let mut sim = FlowSimulator::new();
    sim.record_next_hops(false);
    let before = sim.compute_flows(&setting).clone();
    let mlu_before = sim.max_utilization();

    let mut config = TabuConfig::default();
    config.seed(1).max_weight(30).show_progress(true);
    let mut solver = TabuIgpwo::new(config).context("Configure the solver")?;
    solver
        .solve(&mut setting, Duration::from_secs(5))
        .context("Optimize the link weights")?;

    sim.compute_flows(&setting);
    let topo = setting.topology();

    println!("{:<12} {:>8} {:>10} {:>10}", "edge", "weight", "before", "after");
    for e in topo.edge_indices() {
        println!(
            "{:<12} {:>8} {:>9.1}% {:>9.1}%",
            topo.edge_label(e),
            topo.weight(e),
            100.0 * before[e] / topo.capacity(e),
            100.0 * sim.utilization(e),
        );
    }
    println!();
    println!("Solver:              {}", solver.name());
    println!("Solve time:          {:?}", solver.solve_time());
    println!("Max utilization:     {:.3} -> {:.3}", mlu_before, sim.max_utilization());

    Ok(())
}
