//! Module that stores the physical network as a directed graph and operates on it.

use std::{borrow::Borrow, collections::BTreeSet};

use bimap::BiHashMap;
use itertools::Itertools;
use petgraph::prelude::*;
use serde::{Deserialize, Serialize};

use super::EdgeList;
use crate::Error;

/// The topology type for representing networks as graphs.
pub type TopologyType = u32;
/// The ID of a node within the graph.
pub type NodeId = NodeIndex<TopologyType>;
/// The ID of an edge within the graph.
pub type EdgeId = EdgeIndex<TopologyType>;

/// Distance of unreachable nodes. An edge with this weight is logically absent and never carries
/// any shortest path.
pub const INFINITE_DISTANCE: u64 = 1_000_000_000;

/// Attributes of a single directed edge.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Link {
    /// Human-readable name of the edge.
    pub label: String,
    /// IGP weight, in `1..=INFINITE_DISTANCE`.
    pub weight: u64,
    /// Capacity of the edge (non-negative).
    pub capacity: f64,
    /// Propagation delay of the edge.
    pub latency: u64,
}

impl Link {
    /// Create a new link with zero latency.
    pub fn new(label: impl Into<String>, weight: u64, capacity: f64) -> Self {
        Self {
            label: label.into(),
            weight,
            capacity,
            latency: 0,
        }
    }

    /// Set the latency of the link.
    pub fn with_latency(mut self, latency: u64) -> Self {
        self.latency = latency;
        self
    }
}

/// Physical topology, represented as a directed multigraph. Node weights are the node labels.
///
/// The structure (nodes and edges) never changes after construction. Only the link weights can be
/// modified; removing edges creates a new, independent topology.
#[derive(Debug, Clone)]
pub struct Topology {
    graph: Graph<String, Link, Directed, TopologyType>,
    lut: BiHashMap<String, NodeId>,
}

impl std::ops::Deref for Topology {
    type Target = Graph<String, Link, Directed, TopologyType>;

    fn deref(&self) -> &Self::Target {
        &self.graph
    }
}

fn check_weight(edge: usize, weight: u64) -> Result<(), Error> {
    if (1..=INFINITE_DISTANCE).contains(&weight) {
        Ok(())
    } else {
        Err(Error::InvalidWeight {
            edge,
            weight,
            max: INFINITE_DISTANCE,
        })
    }
}

impl Topology {
    /// Create a new topology from a list of node labels and a list of links `(src, dst, link)`,
    /// where `src` and `dst` are indices into `nodes`. Edge `i` of the topology is the `i`-th
    /// element of `links`.
    pub fn new<S, I, J>(nodes: I, links: J) -> Result<Self, Error>
    where
        S: Into<String>,
        I: IntoIterator<Item = S>,
        J: IntoIterator<Item = (usize, usize, Link)>,
    {
        let mut graph = Graph::default();
        let mut lut = BiHashMap::new();

        for label in nodes {
            let label: String = label.into();
            if lut.contains_left(&label) {
                return Err(Error::DuplicateNode(label));
            }
            let id = graph.add_node(label.clone());
            lut.insert(label, id);
        }

        let num_nodes = graph.node_count();
        for (edge, (src, dst, link)) in links.into_iter().enumerate() {
            for node in [src, dst] {
                if node >= num_nodes {
                    return Err(Error::NodeOutOfRange {
                        node,
                        nodes: num_nodes,
                    });
                }
            }
            check_weight(edge, link.weight)?;
            if !link.capacity.is_finite() || link.capacity < 0.0 {
                return Err(Error::InvalidCapacity {
                    edge,
                    capacity: link.capacity,
                });
            }
            graph.add_edge(NodeId::new(src), NodeId::new(dst), link);
        }

        Ok(Self { graph, lut })
    }

    /// Create a topology from parallel arrays, one entry per edge.
    #[allow(clippy::too_many_arguments)]
    pub fn from_arrays<S: AsRef<str>>(
        node_labels: &[S],
        edge_labels: &[S],
        src: &[usize],
        dst: &[usize],
        weight: &[u64],
        capacity: &[f64],
        latency: &[u64],
    ) -> Result<Self, Error> {
        let num_edges = edge_labels.len();
        for (what, len) in [
            ("edge sources", src.len()),
            ("edge destinations", dst.len()),
            ("edge weights", weight.len()),
            ("edge capacities", capacity.len()),
            ("edge latencies", latency.len()),
        ] {
            if len != num_edges {
                return Err(Error::LengthMismatch {
                    what,
                    expected: num_edges,
                    found: len,
                });
            }
        }

        let links = (0..num_edges).map(|e| {
            (
                src[e],
                dst[e],
                Link::new(edge_labels[e].as_ref(), weight[e], capacity[e]).with_latency(latency[e]),
            )
        });
        Self::new(node_labels.iter().map(|l| l.as_ref().to_string()), links)
    }

    /// Get a reference to the underlying graph.
    pub fn graph(&self) -> &Graph<String, Link, Directed, TopologyType> {
        &self.graph
    }

    /// Number of nodes
    pub fn num_nodes(&self) -> usize {
        self.graph.node_count()
    }

    /// Number of directed edges
    pub fn num_edges(&self) -> usize {
        self.graph.edge_count()
    }

    /// Lookup the label of a node.
    pub fn node_label(&self, id: impl Borrow<NodeId>) -> &str {
        self.graph[*id.borrow()].as_str()
    }

    /// Lookup the node with the given label.
    pub fn node_id(&self, label: &str) -> Result<NodeId, Error> {
        self.lut
            .get_by_left(label)
            .copied()
            .ok_or_else(|| Error::UnknownNode(label.to_string()))
    }

    /// Lookup the first edge with the given label.
    pub fn edge_id(&self, label: &str) -> Result<EdgeId, Error> {
        self.graph
            .edge_references()
            .find(|e| e.weight().label == label)
            .map(|e| e.id())
            .ok_or_else(|| Error::UnknownEdge(label.to_string()))
    }

    /// Get the label of an edge.
    pub fn edge_label(&self, e: impl Borrow<EdgeId>) -> &str {
        self.graph[*e.borrow()].label.as_str()
    }

    /// Get all attributes of an edge.
    pub fn link(&self, e: impl Borrow<EdgeId>) -> &Link {
        &self.graph[*e.borrow()]
    }

    /// Source node of an edge.
    pub fn src(&self, e: impl Borrow<EdgeId>) -> NodeId {
        self.endpoints(e).0
    }

    /// Destination node of an edge.
    pub fn dst(&self, e: impl Borrow<EdgeId>) -> NodeId {
        self.endpoints(e).1
    }

    fn endpoints(&self, e: impl Borrow<EdgeId>) -> (NodeId, NodeId) {
        let e = *e.borrow();
        self.graph
            .edge_endpoints(e)
            .unwrap_or_else(|| panic!("edge {} does not exist", e.index()))
    }

    /// IGP weight of an edge.
    pub fn weight(&self, e: impl Borrow<EdgeId>) -> u64 {
        self.graph[*e.borrow()].weight
    }

    /// Capacity of an edge.
    pub fn capacity(&self, e: impl Borrow<EdgeId>) -> f64 {
        self.graph[*e.borrow()].capacity
    }

    /// Latency of an edge.
    pub fn latency(&self, e: impl Borrow<EdgeId>) -> u64 {
        self.graph[*e.borrow()].latency
    }

    /// Returns `true` if the edge is logically absent (its weight is [`INFINITE_DISTANCE`]).
    pub fn is_absent(&self, e: impl Borrow<EdgeId>) -> bool {
        self.weight(e) >= INFINITE_DISTANCE
    }

    /// Get the weight vector, indexed by edge.
    pub fn weights(&self) -> Vec<u64> {
        self.graph.raw_edges().iter().map(|e| e.weight.weight).collect()
    }

    /// Get the capacity of all edges.
    pub fn capacities(&self) -> EdgeList<f64, TopologyType> {
        EdgeList::from_fn(&self.graph, |e| self.graph[e].capacity)
    }

    fn check_edge(&self, e: EdgeId) -> Result<(), Error> {
        if e.index() < self.graph.edge_count() {
            Ok(())
        } else {
            Err(Error::EdgeOutOfRange {
                edge: e.index(),
                edges: self.graph.edge_count(),
            })
        }
    }

    /// Change the weight of an edge. Setting it to [`INFINITE_DISTANCE`] removes the edge from all
    /// shortest paths.
    pub fn set_weight(&mut self, e: impl Borrow<EdgeId>, weight: u64) -> Result<(), Error> {
        let e = *e.borrow();
        self.check_edge(e)?;
        check_weight(e.index(), weight)?;
        self.graph[e].weight = weight;
        Ok(())
    }

    /// Change the weight of the edge with the given label.
    pub fn set_weight_by_label(&mut self, label: &str, weight: u64) -> Result<(), Error> {
        let e = self.edge_id(label)?;
        self.set_weight(e, weight)
    }

    /// Replace the whole weight vector. Nothing is modified if any weight is invalid.
    pub fn set_weights(&mut self, weights: &[u64]) -> Result<(), Error> {
        if weights.len() != self.graph.edge_count() {
            return Err(Error::LengthMismatch {
                what: "edge weights",
                expected: self.graph.edge_count(),
                found: weights.len(),
            });
        }
        for (edge, w) in weights.iter().enumerate() {
            check_weight(edge, *w)?;
        }
        self.graph
            .edge_weights_mut()
            .zip(weights)
            .for_each(|(link, w)| link.weight = *w);
        Ok(())
    }

    /// Mark an edge as failed by raising its weight to [`INFINITE_DISTANCE`].
    pub fn fail_edge(&mut self, e: impl Borrow<EdgeId>) -> Result<(), Error> {
        self.set_weight(e, INFINITE_DISTANCE)
    }

    /// Iterate over all outgoing edges of a node.
    pub fn out_edges(&self, n: NodeId) -> impl Iterator<Item = EdgeId> + '_ {
        self.graph.edges_directed(n, Direction::Outgoing).map(|e| e.id())
    }

    /// Iterate over all incoming edges of a node.
    pub fn in_edges(&self, n: NodeId) -> impl Iterator<Item = EdgeId> + '_ {
        self.graph.edges_directed(n, Direction::Incoming).map(|e| e.id())
    }

    /// Lookup the edge connecting `a` to `b` with the smallest index.
    pub fn edge_between(&self, a: NodeId, b: NodeId) -> Option<EdgeId> {
        self.graph.edges_connecting(a, b).map(|e| e.id()).min()
    }

    /// Translate a path (list of nodes) to a list of edges.
    pub fn path<I: IntoIterator<Item = R>, R: Borrow<NodeId>>(
        &self,
        path: I,
    ) -> Option<Vec<EdgeId>> {
        path.into_iter()
            .map(|r| *r.borrow())
            .tuple_windows()
            .map(|(a, b)| self.edge_between(a, b))
            .collect()
    }

    /// Find the edge going in the opposite direction of `e`.
    pub fn find_symmetric_edge(&self, e: impl Borrow<EdgeId>) -> Option<EdgeId> {
        let (a, b) = self.endpoints(e);
        self.edge_between(b, a)
    }

    /// Iterate over all links (i.e., pairs of edges). Each iteration will yield two edges that have
    /// the same endpoint (but go in opposite direction)
    pub fn links(&self) -> Vec<[EdgeId; 2]> {
        self.graph
            .edge_indices()
            .filter_map(|e| self.find_symmetric_edge(e).map(|s| [e, s]))
            .filter(|[e, s]| e < s)
            .collect()
    }

    /// Create a new topology without the given edges. Nodes keep their indices; the remaining edges
    /// are renumbered in their original order.
    pub fn remove_edges(&self, edges: &BTreeSet<EdgeId>) -> Result<Topology, Error> {
        for e in edges {
            self.check_edge(*e)?;
        }
        let graph = self.graph.filter_map(
            |_, label| Some(label.clone()),
            |e, link| (!edges.contains(&e)).then(|| link.clone()),
        );
        Ok(Topology {
            graph,
            lut: self.lut.clone(),
        })
    }

    /// Create a new topology without the edge `e`.
    pub fn remove_directed_edge(&self, e: impl Borrow<EdgeId>) -> Result<Topology, Error> {
        self.remove_edges(&BTreeSet::from([*e.borrow()]))
    }

    /// Create a new topology without `e` and its symmetric edge (if it exists).
    pub fn remove_undirected_edge(&self, e: impl Borrow<EdgeId>) -> Result<Topology, Error> {
        let e = *e.borrow();
        self.check_edge(e)?;
        let mut edges = BTreeSet::from([e]);
        edges.extend(self.find_symmetric_edge(e));
        self.remove_edges(&edges)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::tests::square;

    #[test]
    fn lookup() {
        let topo = square();
        let c = topo.node_id("c").unwrap();
        let cd = topo.edge_id("cd").unwrap();
        assert_eq!(topo.node_label(c), "c");
        assert_eq!(topo.src(cd), c);
        assert_eq!(topo.node_label(topo.dst(cd)), "d");
        assert_eq!(topo.out_edges(c).count(), 2);
        assert_eq!(topo.in_edges(c).count(), 2);
        assert!(matches!(topo.node_id("x"), Err(Error::UnknownNode(_))));
        assert!(matches!(topo.edge_id("xy"), Err(Error::UnknownEdge(_))));
    }

    #[test]
    fn symmetric_edge() {
        let topo = square();
        assert_eq!(topo.find_symmetric_edge(EdgeId::new(2)), Some(EdgeId::new(3)));
        assert_eq!(topo.find_symmetric_edge(EdgeId::new(3)), Some(EdgeId::new(2)));
        assert_eq!(topo.links().len(), 4);
    }

    #[test]
    fn remove_undirected_edge() {
        let topo = square();
        let removed = topo.remove_undirected_edge(EdgeId::new(2)).unwrap();
        assert_eq!(removed.num_edges(), topo.num_edges() - 2);
        assert_eq!(removed.num_nodes(), topo.num_nodes());
        assert!(removed.edge_id("ac").is_err());
        assert!(removed.edge_id("ca").is_err());
        // the original is untouched
        assert_eq!(topo.num_edges(), 8);
        assert_eq!(removed.edge_label(EdgeId::new(2)), "bd");
    }

    #[test]
    fn remove_directed_edge() {
        let topo = square();
        let removed = topo.remove_directed_edge(EdgeId::new(0)).unwrap();
        assert_eq!(removed.num_edges(), 7);
        assert!(removed.edge_id("ab").is_err());
        assert!(removed.edge_id("ba").is_ok());
        assert!(topo.remove_directed_edge(EdgeId::new(8)).is_err());
    }

    #[test]
    fn invalid_construction() {
        let res = Topology::new(["a", "b"], [(0, 1, Link::new("ab", 0, 1.0))]);
        assert!(matches!(res, Err(Error::InvalidWeight { edge: 0, weight: 0, .. })));
        let res = Topology::new(["a", "b"], [(0, 1, Link::new("ab", 1, -1.0))]);
        assert!(matches!(res, Err(Error::InvalidCapacity { edge: 0, .. })));
        let res = Topology::new(["a", "b"], [(0, 2, Link::new("ab", 1, 1.0))]);
        assert!(matches!(res, Err(Error::NodeOutOfRange { node: 2, nodes: 2 })));
        let res = Topology::new(["a", "a"], Vec::new());
        assert!(matches!(res, Err(Error::DuplicateNode(_))));
        let res = Topology::from_arrays(&["a", "b"], &["ab"], &[0], &[1], &[1, 1], &[1.0], &[0]);
        assert!(matches!(res, Err(Error::LengthMismatch { found: 2, .. })));
    }

    #[test]
    fn set_weights() {
        let mut topo = square();
        let clone = topo.clone();
        topo.set_weight_by_label("cd", 5).unwrap();
        assert_eq!(topo.weight(topo.edge_id("cd").unwrap()), 5);
        assert_eq!(clone.weight(clone.edge_id("cd").unwrap()), 1);

        assert!(topo.set_weight(EdgeId::new(0), 0).is_err());
        assert!(topo.set_weight(EdgeId::new(8), 1).is_err());
        assert!(topo.set_weights(&[1, 2, 3]).is_err());

        let before = topo.weights();
        let mut invalid = vec![2; 8];
        invalid[7] = INFINITE_DISTANCE + 1;
        assert!(topo.set_weights(&invalid).is_err());
        assert_eq!(topo.weights(), before);

        topo.set_weights(&[2; 8]).unwrap();
        assert_eq!(topo.weights(), vec![2; 8]);

        topo.fail_edge(EdgeId::new(0)).unwrap();
        assert!(topo.is_absent(EdgeId::new(0)));
        assert!(!topo.is_absent(EdgeId::new(1)));
    }

    #[test]
    fn path() {
        let topo = square();
        let [a, b, c, d] = ["a", "b", "c", "d"].map(|l| topo.node_id(l).unwrap());
        let path = topo.path([c, a, b, d]).unwrap();
        let labels: Vec<_> = path.iter().map(|e| topo.edge_label(e)).collect();
        assert_eq!(labels, vec!["ca", "ab", "bd"]);
        assert_eq!(topo.path([a, d]), None);
    }
}
