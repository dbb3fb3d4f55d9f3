//! Per-edge ECMP forwarding ratios of all source-destination pairs.

use std::borrow::Borrow;

use super::{EdgeId, EdgeList, EdgeLoads, NodeId, ShortestPaths, Topology, TopologyType};
use crate::demands::TrafficMatrix;

/// For every edge, the list of `(source, destination, ratio)`: routing one unit of traffic from
/// `source` to `destination` with ECMP puts `ratio` units on that edge.
#[derive(Debug, Clone, PartialEq)]
pub struct EcmpRatios {
    ratios: EdgeList<Vec<(NodeId, NodeId, f64)>, TopologyType>,
}

impl EcmpRatios {
    /// Compute the forwarding ratios from the shortest-path DAGs of `topo`.
    pub fn new(topo: &Topology, sp: &ShortestPaths) -> Self {
        let mut ratios: EdgeList<Vec<(NodeId, NodeId, f64)>, TopologyType> =
            EdgeList::from_fn(topo.graph(), |_| Vec::new());
        let mut fraction = vec![0.0; topo.num_nodes()];

        for dest in topo.node_indices() {
            for source in topo.node_indices().filter(|s| *s != dest) {
                let order = sp.toposort_between(source, dest);
                order.iter().for_each(|n| fraction[n.index()] = 0.0);
                fraction[source.index()] = 1.0;

                for node in order {
                    let next = sp.next(node, dest);
                    if node == dest || next.is_empty() {
                        continue;
                    }
                    let share = fraction[node.index()] / next.len() as f64;
                    for (succ, e) in next {
                        fraction[succ.index()] += share;
                        ratios[e].push((source, dest, share));
                    }
                }
            }
        }

        Self { ratios }
    }

    /// Get the ratios of a single edge.
    pub fn ratios(&self, e: impl Borrow<EdgeId>) -> &[(NodeId, NodeId, f64)] {
        &self.ratios[e]
    }

    /// Compute the load on every edge for a traffic matrix.
    pub fn load(&self, traffic: &TrafficMatrix) -> EdgeLoads {
        self.ratios
            .iter()
            .map(|r| {
                r.iter()
                    .map(|(s, t, ratio)| traffic[[s.index(), t.index()]] * ratio)
                    .sum()
            })
            .collect::<Vec<f64>>()
            .into()
    }
}
