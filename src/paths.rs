//! Per-demand path overlays: segment-routing waypoints and explicit edge sequences.

use std::{collections::BTreeMap, fmt::Write};

use itertools::Itertools;
use serde::{Deserialize, Serialize};

use crate::{
    algorithms::{EdgeId, NodeId, Topology},
    demands::{DemandId, Demands},
    Error,
};

/// Segment-routing paths: for every demand, the ordered list of waypoints its traffic visits. By
/// default, the path of a demand is `[src, dst]`, which is equivalent to plain ECMP routing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SrPaths {
    paths: Vec<Vec<NodeId>>,
}

impl SrPaths {
    /// Create the default paths `[src, dst]` for all demands.
    pub fn new(demands: &Demands) -> Self {
        Self {
            paths: demands.iter().map(|d| vec![d.src, d.dst]).collect(),
        }
    }

    /// Number of demands covered.
    pub fn len(&self) -> usize {
        self.paths.len()
    }

    /// Returns `true` if no demand is covered.
    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    /// Get the waypoints of a demand, including its source and destination.
    pub fn path(&self, demand: DemandId) -> Option<&[NodeId]> {
        self.paths.get(demand).map(|p| p.as_slice())
    }

    /// Iterate over all paths
    pub fn iter(&self) -> impl Iterator<Item = (DemandId, &[NodeId])> {
        self.paths.iter().enumerate().map(|(i, p)| (i, p.as_slice()))
    }

    /// Set the waypoints of a demand. The path must start at the source of the demand, end at its
    /// destination, and only contain nodes of `topo`.
    pub fn set_path(
        &mut self,
        topo: &Topology,
        demands: &Demands,
        demand: DemandId,
        path: Vec<NodeId>,
    ) -> Result<(), Error> {
        if demand >= self.paths.len() {
            return Err(Error::DemandOutOfRange {
                demand,
                demands: self.paths.len(),
            });
        }
        check_sr_path(topo, demands, demand, &path)?;
        self.paths[demand] = path;
        Ok(())
    }

    /// Check that there is one path per demand and that every path is valid in `topo`.
    pub fn check(&self, topo: &Topology, demands: &Demands) -> Result<(), Error> {
        if self.paths.len() != demands.len() {
            return Err(Error::LengthMismatch {
                what: "segment-routing paths",
                expected: demands.len(),
                found: self.paths.len(),
            });
        }
        self.iter()
            .try_for_each(|(d, path)| check_sr_path(topo, demands, d, path))
    }

    /// Reset the path of a demand to `[src, dst]`.
    pub fn reset_path(&mut self, demands: &Demands, demand: DemandId) {
        if let (Some(d), Some(p)) = (demands.get(demand), self.paths.get_mut(demand)) {
            *p = vec![d.src, d.dst];
        }
    }

    /// Iterate over all paths that visit at least one intermediate waypoint.
    pub fn paths_with_intermediate_segments(
        &self,
    ) -> impl Iterator<Item = (DemandId, &[NodeId])> {
        self.iter().filter(|(_, p)| p.len() > 2)
    }

    /// Human-readable listing of all paths with intermediate waypoints.
    pub fn describe(&self, topo: &Topology, demands: &Demands) -> String {
        let mut s = String::new();
        for (d, path) in self.paths_with_intermediate_segments() {
            let _ = writeln!(
                s,
                "{}: {}",
                demands[d].label,
                path.iter().map(|n| topo.node_label(n)).join(" -> ")
            );
        }
        s
    }
}

/// Explicit paths: demands mapped to a fixed sequence of edges. Demands without an entry are not
/// routed explicitly.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExplicitPaths {
    paths: BTreeMap<DemandId, Vec<EdgeId>>,
}

impl ExplicitPaths {
    /// Create an empty set of explicit paths.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of demands with an explicit path.
    pub fn len(&self) -> usize {
        self.paths.len()
    }

    /// Returns `true` if no demand has an explicit path.
    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    /// Get the explicit path of a demand.
    pub fn path(&self, demand: DemandId) -> Option<&[EdgeId]> {
        self.paths.get(&demand).map(|p| p.as_slice())
    }

    /// Iterate over all explicit paths.
    pub fn iter(&self) -> impl Iterator<Item = (DemandId, &[EdgeId])> {
        self.paths.iter().map(|(d, p)| (*d, p.as_slice()))
    }

    /// Set the explicit path of a demand. The edges must exist, be contiguous, and lead from the
    /// source of the demand to its destination.
    pub fn set_path(
        &mut self,
        topo: &Topology,
        demands: &Demands,
        demand: DemandId,
        path: Vec<EdgeId>,
    ) -> Result<(), Error> {
        check_explicit_path(topo, demands, demand, &path)?;
        self.paths.insert(demand, path);
        Ok(())
    }

    /// Check that every path refers to an existing demand and is valid in `topo`.
    pub fn check(&self, topo: &Topology, demands: &Demands) -> Result<(), Error> {
        self.iter()
            .try_for_each(|(d, path)| check_explicit_path(topo, demands, d, path))
    }

    /// Remove the explicit path of a demand, returning it.
    pub fn remove_path(&mut self, demand: DemandId) -> Option<Vec<EdgeId>> {
        self.paths.remove(&demand)
    }
}

fn check_sr_path(
    topo: &Topology,
    demands: &Demands,
    demand: DemandId,
    path: &[NodeId],
) -> Result<(), Error> {
    let d = demands.get(demand).ok_or(Error::DemandOutOfRange {
        demand,
        demands: demands.len(),
    })?;
    let invalid = |reason: String| Error::InvalidSrPath { demand, reason };
    if path.len() < 2 {
        return Err(invalid(format!("{} waypoints given, need at least 2", path.len())));
    }
    if let Some(n) = path.iter().find(|n| n.index() >= topo.num_nodes()) {
        return Err(invalid(format!("node {} does not exist", n.index())));
    }
    if path.first() != Some(&d.src) {
        return Err(invalid("path does not start at the source".to_string()));
    }
    if path.last() != Some(&d.dst) {
        return Err(invalid("path does not end at the destination".to_string()));
    }
    Ok(())
}

fn check_explicit_path(
    topo: &Topology,
    demands: &Demands,
    demand: DemandId,
    path: &[EdgeId],
) -> Result<(), Error> {
    let d = demands.get(demand).ok_or(Error::DemandOutOfRange {
        demand,
        demands: demands.len(),
    })?;
    let invalid = |reason: String| Error::InvalidExplicitPath { demand, reason };
    let (first, last) = match (path.first(), path.last()) {
        (Some(first), Some(last)) => (*first, *last),
        _ => return Err(invalid("the path is empty".to_string())),
    };
    if let Some(e) = path.iter().find(|e| e.index() >= topo.num_edges()) {
        return Err(invalid(format!("edge {} does not exist", e.index())));
    }
    if let Some((a, b)) = path
        .iter()
        .tuple_windows()
        .find(|(a, b)| topo.dst(*a) != topo.src(*b))
    {
        return Err(invalid(format!(
            "edge {} is not followed by edge {}",
            topo.edge_label(a),
            topo.edge_label(b)
        )));
    }
    if topo.src(first) != d.src {
        return Err(invalid("path does not start at the source".to_string()));
    }
    if topo.dst(last) != d.dst {
        return Err(invalid("path does not end at the destination".to_string()));
    }
    Ok(())
}
