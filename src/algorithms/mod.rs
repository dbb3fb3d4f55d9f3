//! Module that contains the graph algorithms and the typed containers they operate on.

use std::{borrow::Borrow, marker::PhantomData};

use petgraph::{algo::floyd_warshall, graph::IndexType, prelude::*, EdgeType};

pub mod dijkstra;
pub mod forwarding_graphs;
pub mod shortest_paths;
pub mod topology;

pub use forwarding_graphs::EcmpRatios;
pub use shortest_paths::ShortestPaths;
pub use topology::{EdgeId, Link, NodeId, Topology, TopologyType, INFINITE_DISTANCE};

/// Load (in traffic units) carried by every edge of a topology.
pub type EdgeLoads = EdgeList<f64, TopologyType>;

/// Compute the all-pairs shortest-path costs with Floyd-Warshall. Edges that are absent (weight
/// equal to [`INFINITE_DISTANCE`]) never carry a shortest path, and unreachable pairs have cost
/// [`INFINITE_DISTANCE`].
pub fn apsp(topo: &Topology) -> NodeList<NodeList<u64, TopologyType>, TopologyType> {
    let g = topo.graph();
    let mut result: NodeList<NodeList<u64, TopologyType>, TopologyType> =
        NodeList::from_fn(g, |_| NodeList::from_fn(g, |_| INFINITE_DISTANCE));
    if let Ok(dist) = floyd_warshall(g, |e| e.weight().weight) {
        dist.into_iter().for_each(|((s, t), w)| result[s][t] = w.min(INFINITE_DISTANCE));
    }
    result
}

/// Datastructure storing type `T` for each edge in a graph.
#[derive(Clone, Debug, PartialEq)]
pub struct EdgeList<T, Ix> {
    d: Vec<T>,
    ix: PhantomData<Ix>,
}

/// Datastructure storing type `T` for each node in a graph.
#[derive(Clone, Debug, PartialEq)]
pub struct NodeList<T, Ix> {
    d: Vec<T>,
    ix: PhantomData<Ix>,
}

impl<T, Ix> From<Vec<T>> for EdgeList<T, Ix> {
    fn from(d: Vec<T>) -> Self {
        Self { d, ix: PhantomData }
    }
}

impl<I, T, Ix> std::ops::Index<I> for EdgeList<T, Ix>
where
    I: Borrow<EdgeIndex<Ix>>,
    Ix: IndexType,
{
    type Output = T;

    fn index(&self, idx: I) -> &Self::Output {
        &self.d[idx.borrow().index()]
    }
}

impl<I, T, Ix> std::ops::IndexMut<I> for EdgeList<T, Ix>
where
    I: Borrow<EdgeIndex<Ix>>,
    Ix: IndexType,
{
    fn index_mut(&mut self, idx: I) -> &mut Self::Output {
        &mut self.d[idx.borrow().index()]
    }
}

impl<I, T, Ix> std::ops::Index<I> for NodeList<T, Ix>
where
    I: Borrow<NodeIndex<Ix>>,
    Ix: IndexType,
{
    type Output = T;

    fn index(&self, idx: I) -> &Self::Output {
        &self.d[idx.borrow().index()]
    }
}

impl<I, T, Ix> std::ops::IndexMut<I> for NodeList<T, Ix>
where
    I: Borrow<NodeIndex<Ix>>,
    Ix: IndexType,
{
    fn index_mut(&mut self, idx: I) -> &mut Self::Output {
        &mut self.d[idx.borrow().index()]
    }
}

impl<T, Ix> EdgeList<T, Ix> {
    /// Get the number of elements in the list
    pub fn len(&self) -> usize {
        self.d.len()
    }

    /// Returns `true` if the edge list is empty
    pub fn is_empty(&self) -> bool {
        self.d.is_empty()
    }

    /// Create a new `EdgeList` by calling `f` for each edge in the graph.
    pub fn from_fn<N, E, D, F>(graph: &Graph<N, E, D, Ix>, f: F) -> Self
    where
        F: FnMut(EdgeIndex<Ix>) -> T,
        D: EdgeType,
        Ix: IndexType,
    {
        Self {
            d: graph.edge_indices().map(f).collect(),
            ix: PhantomData,
        }
    }

    /// create an iterator over pairs of `EdgeList`s.
    pub fn zip<'a, U>(
        &'a self,
        other: &'a EdgeList<U, Ix>,
    ) -> impl Iterator<Item = (&'a T, &'a U)> {
        self.d.iter().zip(other.d.iter())
    }

    /// Update every element of `self` with the corresponding element of `other`.
    pub fn zip_mut<'b, U, F>(&mut self, other: &'b EdgeList<U, Ix>, mut f: F)
    where
        F: FnMut(&mut T, &'b U),
    {
        self.d.iter_mut().zip(other.d.iter()).for_each(|(t, u)| f(t, u))
    }

    /// Iterate over all elements in the `EdgeList`.
    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.d.iter()
    }

    /// Iterate over all elements in the `EdgeList`, along with the `EdgeIndex`.
    pub fn idx_iter(&self) -> impl Iterator<Item = (EdgeIndex<Ix>, &T)>
    where
        Ix: IndexType,
    {
        self.d.iter().enumerate().map(|(i, t)| (EdgeIndex::<Ix>::new(i), t))
    }
}

impl<T, Ix> NodeList<T, Ix> {
    /// Get the number of elements in the list
    pub fn len(&self) -> usize {
        self.d.len()
    }

    /// Returns `true` if `self` is empty.
    pub fn is_empty(&self) -> bool {
        self.d.is_empty()
    }

    /// Create a new `NodeList` by calling `f` for each node in the graph.
    pub fn from_fn<N, E, D, F>(graph: &Graph<N, E, D, Ix>, f: F) -> Self
    where
        D: EdgeType,
        F: FnMut(NodeIndex<Ix>) -> T,
        Ix: IndexType,
    {
        Self {
            d: graph.node_indices().map(f).collect(),
            ix: PhantomData,
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::tests::square;

    #[test]
    fn apsp_of_square() {
        let mut topo = square();
        let a = topo.node_id("a").unwrap();
        let d = topo.node_id("d").unwrap();
        let dist = apsp(&topo);
        assert_eq!(dist.len(), 4);
        assert_eq!(dist[a][d], 2);
        assert_eq!(dist[d][d], 0);

        for e in topo.out_edges(a).collect::<Vec<_>>() {
            topo.fail_edge(e).unwrap();
        }
        assert_eq!(apsp(&topo)[a][d], INFINITE_DISTANCE);
    }

    #[test]
    fn edge_list_indexing() {
        let topo = square();
        let mut loads: EdgeLoads = EdgeList::from_fn(topo.graph(), |e| e.index() as f64);
        let cd = topo.edge_id("cd").unwrap();
        loads[cd] += 0.5;
        assert_eq!(loads[cd], 6.5);
        assert_eq!(loads.len(), topo.num_edges());
        let ones: EdgeLoads = vec![1.0; topo.num_edges()].into();
        loads.zip_mut(&ones, |l, o| *l -= *o);
        assert_eq!(loads.idx_iter().find(|(e, _)| *e == cd).map(|(_, l)| *l), Some(5.5));
    }
}
