//! Re-implementation of the dijkstra algorithm that keeps all equal-cost next-hops.

use std::{cmp::Ordering, collections::BinaryHeap};

use petgraph::{
    prelude::*,
    visit::{VisitMap, Visitable},
};

use super::{shortest_paths::DagNode, NodeId, Topology, INFINITE_DISTANCE};

/// Compute the shortest-path DAG towards destination `root`, writing the result into `d` (one
/// element per node). The algorithm runs on the reversed graph, i.e., it walks the incoming edges
/// of each node popped from the queue. All next-hops on a shortest path are kept. Absent edges are
/// ignored, and nodes whose cost would reach [`INFINITE_DISTANCE`] are considered unreachable.
pub fn shortest_path_dag(topo: &Topology, root: NodeId, d: &mut [DagNode]) {
    d.iter_mut().for_each(|n| {
        n.next.clear();
        n.prev.clear();
        n.cost = INFINITE_DISTANCE;
    });

    let mut visited = topo.graph().visit_map();
    let mut visit_next = BinaryHeap::new();
    d[root.index()].cost = 0;
    visit_next.push(MinScored(0u64, root));

    while let Some(MinScored(node_score, node)) = visit_next.pop() {
        if visited.is_visited(&node) {
            continue;
        }
        // walk the incoming edges
        for edge in topo.edges_directed(node, Direction::Incoming) {
            let weight = edge.weight().weight;
            if weight >= INFINITE_DISTANCE {
                continue;
            }
            let next = edge.source();
            if visited.is_visited(&next) {
                continue;
            }
            let next_cost = node_score + weight;
            if next_cost >= INFINITE_DISTANCE {
                continue;
            }
            let cur = &mut d[next.index()];
            match next_cost.cmp(&cur.cost) {
                Ordering::Less => {
                    cur.cost = next_cost;
                    cur.next.clear();
                    cur.next.push((node, edge.id()));
                    visit_next.push(MinScored(next_cost, next));
                }
                Ordering::Equal => cur.next.push((node, edge.id())),
                Ordering::Greater => {}
            }
        }
        visited.visit(node);
    }
}

/// Queue entry of the dijkstra algorithm. Compares in reverse order of the cost, so that a
/// `BinaryHeap` pops the entry with the lowest cost first.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct MinScored(pub u64, pub NodeId);

impl PartialOrd for MinScored {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for MinScored {
    fn cmp(&self, other: &Self) -> Ordering {
        other.0.cmp(&self.0).then_with(|| self.1.cmp(&other.1))
    }
}
