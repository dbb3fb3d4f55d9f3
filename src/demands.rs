//! Point-to-point traffic demands and their aggregation into a traffic matrix.

use std::collections::BTreeSet;

use ndarray::Array2;
use serde::{Deserialize, Serialize};

use crate::{
    algorithms::{NodeId, Topology},
    Error,
};

/// Identifier of a demand, i.e., its position in [`Demands`].
pub type DemandId = usize;

/// Dense traffic matrix. Entry `[[s, t]]` is the traffic from node `s` to node `t`.
pub type TrafficMatrix = Array2<f64>;

/// A single traffic demand.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Demand {
    /// Human-readable name of the demand
    pub label: String,
    /// Source node
    pub src: NodeId,
    /// Destination node
    pub dst: NodeId,
    /// Volume of the demand
    pub amount: f64,
}

impl Demand {
    /// Create a new demand.
    pub fn new(label: impl Into<String>, src: NodeId, dst: NodeId, amount: f64) -> Self {
        Self {
            label: label.into(),
            src,
            dst,
            amount,
        }
    }
}

/// The list of demands of a scenario. It cannot be modified after construction.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Demands {
    d: Vec<Demand>,
}

impl Demands {
    /// Create the list of demands, checking that all endpoints exist in `topo` and that all
    /// amounts are finite and non-negative.
    pub fn new(topo: &Topology, demands: Vec<Demand>) -> Result<Self, Error> {
        let demands = Self { d: demands };
        demands.check(topo)?;
        Ok(demands)
    }

    /// Create the list of demands from parallel arrays.
    pub fn from_arrays<S: AsRef<str>>(
        topo: &Topology,
        labels: &[S],
        src: &[usize],
        dst: &[usize],
        amount: &[f64],
    ) -> Result<Self, Error> {
        for (what, len) in [
            ("demand sources", src.len()),
            ("demand destinations", dst.len()),
            ("demand amounts", amount.len()),
        ] {
            if len != labels.len() {
                return Err(Error::LengthMismatch {
                    what,
                    expected: labels.len(),
                    found: len,
                });
            }
        }
        let d = (0..labels.len())
            .map(|i| {
                Demand::new(
                    labels[i].as_ref(),
                    NodeId::new(src[i]),
                    NodeId::new(dst[i]),
                    amount[i],
                )
            })
            .collect();
        Self::new(topo, d)
    }

    /// Check that all demands are valid in `topo`.
    pub(crate) fn check(&self, topo: &Topology) -> Result<(), Error> {
        let nodes = topo.num_nodes();
        for (i, demand) in self.d.iter().enumerate() {
            for node in [demand.src, demand.dst] {
                if node.index() >= nodes {
                    return Err(Error::NodeOutOfRange {
                        node: node.index(),
                        nodes,
                    });
                }
            }
            if !demand.amount.is_finite() || demand.amount < 0.0 {
                return Err(Error::InvalidAmount {
                    demand: i,
                    amount: demand.amount,
                });
            }
        }
        Ok(())
    }

    /// Number of demands
    pub fn len(&self) -> usize {
        self.d.len()
    }

    /// Returns `true` if there are no demands.
    pub fn is_empty(&self) -> bool {
        self.d.is_empty()
    }

    /// Get a demand.
    pub fn get(&self, id: DemandId) -> Option<&Demand> {
        self.d.get(id)
    }

    /// Iterate over all demands.
    pub fn iter(&self) -> impl ExactSizeIterator<Item = &Demand> {
        self.d.iter()
    }

    /// Iterate over all demands, along with their identifier.
    pub fn idx_iter(&self) -> impl ExactSizeIterator<Item = (DemandId, &Demand)> {
        self.d.iter().enumerate()
    }

    /// Find the first demand with the given label.
    pub fn demand_id(&self, label: &str) -> Option<DemandId> {
        self.d.iter().position(|d| d.label == label)
    }

    /// Sum of all demand volumes.
    pub fn total_amount(&self) -> f64 {
        self.d.iter().map(|d| d.amount).sum()
    }

    /// Aggregate all demands, except those in `ignored`, into a `num_nodes x num_nodes` traffic
    /// matrix.
    pub fn traffic_matrix(&self, num_nodes: usize, ignored: &BTreeSet<DemandId>) -> TrafficMatrix {
        let mut tm = TrafficMatrix::zeros((num_nodes, num_nodes));
        for (_, d) in self.idx_iter().filter(|(i, _)| !ignored.contains(i)) {
            tm[[d.src.index(), d.dst.index()]] += d.amount;
        }
        tm
    }
}

impl std::ops::Index<DemandId> for Demands {
    type Output = Demand;

    fn index(&self, index: DemandId) -> &Self::Output {
        &self.d[index]
    }
}

#[cfg(test)]
mod test {
    use maplit::btreeset;

    use super::*;
    use crate::tests::{square, top_and_bottom_demands};

    #[test]
    fn traffic_matrix() {
        let topo = square();
        let demands = top_and_bottom_demands(&topo, 1.0, 2.0);
        assert_eq!(demands.len(), 2);
        assert_eq!(demands.demand_id("demand_ab"), Some(1));
        assert_eq!(demands.total_amount(), 3.0);

        let tm = demands.traffic_matrix(4, &BTreeSet::new());
        assert_eq!(tm[[2, 3]], 1.0);
        assert_eq!(tm[[0, 1]], 2.0);
        assert_eq!(tm.sum(), 3.0);

        let tm = demands.traffic_matrix(4, &btreeset! {0});
        assert_eq!(tm[[2, 3]], 0.0);
        assert_eq!(tm[[0, 1]], 2.0);
    }

    #[test]
    fn invalid() {
        let topo = square();
        let res = Demands::from_arrays(&topo, &["x"], &[0], &[4], &[1.0]);
        assert!(matches!(res, Err(Error::NodeOutOfRange { node: 4, nodes: 4 })));
        let res = Demands::from_arrays(&topo, &["x"], &[0], &[1], &[-1.0]);
        assert!(matches!(res, Err(Error::InvalidAmount { demand: 0, .. })));
        let res = Demands::from_arrays(&topo, &["x"], &[0], &[1], &[]);
        assert!(matches!(res, Err(Error::LengthMismatch { .. })));
    }
}
