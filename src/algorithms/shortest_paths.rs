//! All-destination shortest-path DAGs, stored in a flat arena indexed by (destination, node).

use std::{collections::VecDeque, fmt::Write};

use fixedbitset::FixedBitSet;
use itertools::Itertools;
use smallvec::SmallVec;

use super::{dijkstra, EdgeId, NodeId, Topology, INFINITE_DISTANCE};

/// A next-hop (or previous-hop) on a shortest path, together with the edge leading there.
pub type Hop = (NodeId, EdgeId);

/// Data kept for each (destination, node) pair.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DagNode {
    /// Next-hops from the node on its shortest paths towards the destination.
    pub next: SmallVec<[Hop; 4]>,
    /// Nodes that have this node as next-hop towards the destination.
    pub prev: SmallVec<[Hop; 4]>,
    /// Cost of the node to reach the destination.
    pub cost: u64,
}

impl Default for DagNode {
    fn default() -> Self {
        Self {
            next: SmallVec::new(),
            prev: SmallVec::new(),
            cost: INFINITE_DISTANCE,
        }
    }
}

/// Shortest-path DAGs towards every destination of a topology.
///
/// The result is computed once from a topology and never patched. Whenever the link weights
/// change, a new `ShortestPaths` must be built.
#[derive(Debug, Clone, PartialEq)]
pub struct ShortestPaths {
    n: usize,
    d: Vec<DagNode>,
}

impl ShortestPaths {
    /// Run the reverse Dijkstra algorithm once for every destination.
    pub fn new(topo: &Topology) -> Self {
        let n = topo.num_nodes();
        let mut d = vec![DagNode::default(); n * n];

        for dest in topo.node_indices() {
            let base = dest.index() * n;
            let dag = &mut d[base..base + n];
            dijkstra::shortest_path_dag(topo, dest, dag);

            // derive the previous hops by inverting the next-hop relation
            for node in 0..n {
                for i in 0..dag[node].next.len() {
                    let (succ, e) = dag[node].next[i];
                    dag[succ.index()].prev.push((NodeId::new(node), e));
                }
            }
        }

        Self { n, d }
    }

    #[inline]
    fn get(&self, node: NodeId, dest: NodeId) -> &DagNode {
        assert!(node.index() < self.n && dest.index() < self.n);
        &self.d[dest.index() * self.n + node.index()]
    }

    /// Number of nodes in the topology.
    pub fn num_nodes(&self) -> usize {
        self.n
    }

    /// Get the next-hops of `node` along all shortest paths towards `dest`.
    pub fn next(&self, node: NodeId, dest: NodeId) -> &[Hop] {
        &self.get(node, dest).next
    }

    /// Get all nodes that use `node` as a next-hop towards `dest`.
    pub fn prev(&self, node: NodeId, dest: NodeId) -> &[Hop] {
        &self.get(node, dest).prev
    }

    /// Cost of the shortest path from `node` to `dest`, or [`INFINITE_DISTANCE`] if `dest` cannot be
    /// reached.
    pub fn distance(&self, node: NodeId, dest: NodeId) -> u64 {
        self.get(node, dest).cost
    }

    /// Returns `true` if any node cannot reach any other node.
    pub fn is_graph_disconnected(&self) -> bool {
        self.d.iter().any(|x| x.cost >= INFINITE_DISTANCE)
    }

    /// Topological order of the shortest-path DAG towards `dest`, starting with the nodes furthest
    /// away from `dest` and ending with `dest`. Every node is listed after all nodes that use it
    /// as a next-hop. Unreachable nodes are included as well.
    pub fn toposort(&self, dest: NodeId) -> Vec<NodeId> {
        // number of next-hops that were not yet placed in the order
        let mut remaining: Vec<usize> = (0..self.n)
            .map(|v| self.next(NodeId::new(v), dest).len())
            .collect();
        let mut queue: VecDeque<NodeId> = VecDeque::with_capacity(self.n);
        queue.push_back(dest);
        queue.extend(
            (0..self.n)
                .map(NodeId::new)
                .filter(|v| *v != dest && remaining[v.index()] == 0),
        );

        let mut order = Vec::with_capacity(self.n);
        while let Some(v) = queue.pop_front() {
            order.push(v);
            for (p, _) in self.prev(v, dest) {
                remaining[p.index()] -= 1;
                if remaining[p.index()] == 0 {
                    queue.push_back(*p);
                }
            }
        }

        order.reverse();
        order
    }

    /// Topological order of the nodes on the shortest paths from `source` to `dest`, starting at
    /// `source`. The traversal is an iterative depth-first search.
    pub fn toposort_between(&self, source: NodeId, dest: NodeId) -> Vec<NodeId> {
        let mut visited = FixedBitSet::with_capacity(self.n);
        let mut order = Vec::new();
        let mut stack: Vec<(NodeId, usize)> = vec![(source, 0)];
        visited.insert(source.index());

        while let Some(&(node, i)) = stack.last() {
            match self.next(node, dest).get(i) {
                Some((succ, _)) => {
                    let top = stack.len() - 1;
                    stack[top].1 += 1;
                    if !visited.put(succ.index()) {
                        stack.push((*succ, 0));
                    }
                }
                None => {
                    // all successors are done
                    order.push(node);
                    stack.pop();
                }
            }
        }

        order.reverse();
        order
    }

    /// Human-readable listing of all next-hops, grouped by destination.
    pub fn next_hops(&self, topo: &Topology) -> String {
        let mut s = String::new();
        for dest in topo.node_indices() {
            let _ = writeln!(s, "Destination {}", topo.node_label(dest));
            for node in topo.node_indices().filter(|n| *n != dest) {
                let _ = writeln!(
                    s,
                    "node: {}, next hops: [{}]",
                    topo.node_label(node),
                    self.next(node, dest)
                        .iter()
                        .map(|(n, _)| topo.node_label(n))
                        .join(", ")
                );
            }
        }
        s
    }
}
