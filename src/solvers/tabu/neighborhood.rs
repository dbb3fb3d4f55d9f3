//! Neighborhoods of the weight vector, explored by random sampling.

use rand::{Rng, RngCore};

use super::state::State;
use crate::{
    algorithms::{NodeId, ShortestPaths, Topology},
    Error,
};

/// A neighborhood generates random moves from the current weight vector.
pub trait Neighborhood: std::fmt::Debug {
    /// Short name
    fn name(&self) -> &'static str;

    /// Size of the sampling universe.
    fn size(&self) -> usize;

    /// Apply a random move to `state`. The changes are not saved. A move may leave the state
    /// unchanged.
    fn apply_random(&mut self, state: &mut State, rng: &mut dyn RngCore);

    /// Inform the neighborhood that the weights of `topo` are the new baseline of the search.
    fn rebase(&mut self, _topo: &Topology) {}
}

/// Change the weight of a single random edge to a random, different value in `1..=max_weight`.
/// Absent edges are never changed.
#[derive(Debug, Clone)]
pub struct SingleWeightChange {
    edges: Vec<usize>,
    max_weight: u64,
}

impl SingleWeightChange {
    /// Create the neighborhood over all edges of `topo` that are not absent. There must be at
    /// least two weights to choose from, i.e., `max_weight >= 2`.
    pub fn new(topo: &Topology, max_weight: u64) -> Result<Self, Error> {
        if max_weight < 2 {
            return Err(Error::InvalidConfig(format!(
                "max_weight must be at least 2, found {max_weight}"
            )));
        }
        Ok(Self {
            edges: topo
                .edge_indices()
                .filter(|e| !topo.is_absent(e))
                .map(|e| e.index())
                .collect(),
            max_weight,
        })
    }
}

impl Neighborhood for SingleWeightChange {
    fn name(&self) -> &'static str {
        "single weight change"
    }

    fn size(&self) -> usize {
        self.edges.len() * self.max_weight as usize
    }

    fn apply_random(&mut self, state: &mut State, rng: &mut dyn RngCore) {
        if self.edges.is_empty() {
            return;
        }
        let edge = self.edges[rng.gen_range(0..self.edges.len())];
        let mut weight = rng.gen_range(1..self.max_weight);
        if weight == state.get(edge) {
            weight = self.max_weight;
        }
        state.set(edge, weight);
    }
}

/// Pick a random node and destination, and set the weights of all outgoing edges of that node such
/// that all of them lie on a shortest path towards the destination (Fortz and Thorup). Each edge is
/// randomly made one unit longer to explore uneven splits. The move is dropped if any weight would
/// exceed `max_weight`.
#[derive(Debug, Clone)]
pub struct EvenlyBalancingFlows {
    sp: ShortestPaths,
    out_edges: Vec<Vec<(usize, NodeId)>>,
    max_weight: u64,
}

impl EvenlyBalancingFlows {
    /// Create the neighborhood based on the current weights of `topo`.
    pub fn new(topo: &Topology, max_weight: u64) -> Self {
        let out_edges: Vec<Vec<(usize, NodeId)>> = topo
            .node_indices()
            .map(|n| {
                topo.out_edges(n)
                    .filter(|e| !topo.is_absent(e))
                    .map(|e| (e.index(), topo.dst(e)))
                    .collect()
            })
            .collect();
        Self {
            sp: ShortestPaths::new(topo),
            out_edges,
            max_weight,
        }
    }

    /// Balance the outgoing edges of `node` towards `dest`.
    pub(crate) fn balance(
        &self,
        state: &mut State,
        node: NodeId,
        dest: NodeId,
        rng: &mut dyn RngCore,
    ) {
        let out = &self.out_edges[node.index()];
        let max_distance = out
            .iter()
            .map(|(_, succ)| self.sp.distance(*succ, dest))
            .max()
            .unwrap_or(0);

        for (edge, succ) in out {
            let extra = u64::from(!rng.gen_bool(0.5));
            let weight = max_distance + 1 - self.sp.distance(*succ, dest) + extra;
            if weight > self.max_weight {
                state.restore();
                return;
            }
            state.set(*edge, weight);
        }
    }
}

impl Neighborhood for EvenlyBalancingFlows {
    fn name(&self) -> &'static str {
        "evenly balancing flows"
    }

    fn size(&self) -> usize {
        self.out_edges.len() * self.out_edges.len()
    }

    fn apply_random(&mut self, state: &mut State, rng: &mut dyn RngCore) {
        let n = self.out_edges.len();
        if n == 0 {
            return;
        }
        let dest = NodeId::new(rng.gen_range(0..n));
        let node = NodeId::new(rng.gen_range(0..n));
        if node != dest {
            self.balance(state, node, dest, rng);
        }
    }

    fn rebase(&mut self, topo: &Topology) {
        self.sp = ShortestPaths::new(topo);
    }
}
