//! Equal-cost multi-path simulation along the shortest-path DAGs.

use std::collections::BTreeSet;

use log::trace;

use super::{SimulatedFlows, SpecializedFlowSimulator};
use crate::{
    algorithms::{EdgeList, EdgeLoads, ShortestPaths, Topology},
    demands::{DemandId, TrafficMatrix},
    setting::Setting,
};

/// Route every demand with ECMP on the IGP shortest paths.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EcmpFlowSimulator;

impl SpecializedFlowSimulator for EcmpFlowSimulator {
    fn name(&self) -> &'static str {
        "ECMP"
    }

    fn description(&self) -> &'static str {
        "Traffic towards each destination is split evenly among all shortest next-hops"
    }

    fn compute_flows(
        &self,
        setting: &Setting,
        ignored: &BTreeSet<DemandId>,
        trace: bool,
    ) -> SimulatedFlows {
        let topo = setting.topology();
        let demands = setting.demands();
        let sp = ShortestPaths::new(topo);
        let traffic = demands.traffic_matrix(topo.num_nodes(), ignored);

        SimulatedFlows {
            flow: distribute(topo, &sp, &traffic),
            simulated: (0..demands.len()).filter(|d| !ignored.contains(d)).collect(),
            next_hops: if trace { sp.next_hops(topo) } else { String::new() },
        }
    }
}

/// Push the traffic matrix along the shortest-path DAGs. Destinations are processed one by one;
/// for each, the nodes are visited from the furthest to the closest, and the traffic at each node
/// (its own demand plus what it received) is split evenly among all its next-hops. Traffic at a
/// node that cannot reach the destination is dropped.
pub fn distribute(topo: &Topology, sp: &ShortestPaths, traffic: &TrafficMatrix) -> EdgeLoads {
    let mut flow: EdgeLoads = EdgeList::from_fn(topo.graph(), |_| 0.0);
    let mut to_route = vec![0.0; topo.num_nodes()];

    for dest in topo.node_indices() {
        let column = traffic.column(dest.index());
        if column.iter().all(|x| *x == 0.0) {
            continue;
        }
        to_route
            .iter_mut()
            .zip(column.iter())
            .for_each(|(r, t)| *r = *t);

        for node in sp.toposort(dest) {
            let amount = to_route[node.index()];
            if node == dest || amount == 0.0 {
                continue;
            }
            let next = sp.next(node, dest);
            if next.is_empty() {
                trace!(
                    "Dropping {amount} units at {}: {} is unreachable",
                    topo.node_label(node),
                    topo.node_label(dest)
                );
                continue;
            }
            let share = amount / next.len() as f64;
            for (succ, e) in next {
                flow[e] += share;
                to_route[succ.index()] += share;
            }
        }
    }

    flow
}
