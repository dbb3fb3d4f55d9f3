//! A complete problem instance: topology, demands and the routing configuration.

use crate::{
    algorithms::{EdgeId, NodeId, Topology},
    demands::{DemandId, Demands},
    paths::{ExplicitPaths, SrPaths},
    Error,
};

/// Optional per-demand path overlays. Demands without an overlay are routed with ECMP. The
/// overlays can only be changed through [`Setting`], which validates them against its topology
/// and demands.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RoutingConfiguration {
    sr_paths: Option<SrPaths>,
    explicit_paths: Option<ExplicitPaths>,
}

impl RoutingConfiguration {
    /// Segment-routing waypoints
    pub fn sr_paths(&self) -> Option<&SrPaths> {
        self.sr_paths.as_ref()
    }

    /// Explicit edge sequences
    pub fn explicit_paths(&self) -> Option<&ExplicitPaths> {
        self.explicit_paths.as_ref()
    }
}

/// A problem instance. Cloning a setting creates an independent deep copy.
#[derive(Debug, Clone)]
pub struct Setting {
    topology: Topology,
    demands: Demands,
    config: RoutingConfiguration,
}

impl Setting {
    /// Create a new setting without any path overlays.
    pub fn new(topology: Topology, demands: Demands) -> Result<Self, Error> {
        demands.check(&topology)?;
        Ok(Self {
            topology,
            demands,
            config: RoutingConfiguration::default(),
        })
    }

    /// Get the topology
    pub fn topology(&self) -> &Topology {
        &self.topology
    }

    /// Get a mutable reference to the topology. Only the link weights can be changed through it.
    pub fn topology_mut(&mut self) -> &mut Topology {
        &mut self.topology
    }

    /// Get the demands
    pub fn demands(&self) -> &Demands {
        &self.demands
    }

    /// Get the routing configuration
    pub fn config(&self) -> &RoutingConfiguration {
        &self.config
    }

    /// Replace the segment-routing paths. They must contain one valid path per demand.
    pub fn set_sr_paths(&mut self, paths: SrPaths) -> Result<(), Error> {
        paths.check(&self.topology, &self.demands)?;
        self.config.sr_paths = Some(paths);
        Ok(())
    }

    /// Remove the segment-routing paths, returning them.
    pub fn clear_sr_paths(&mut self) -> Option<SrPaths> {
        self.config.sr_paths.take()
    }

    /// Replace the explicit paths. Every path must be valid for its demand.
    pub fn set_explicit_paths(&mut self, paths: ExplicitPaths) -> Result<(), Error> {
        paths.check(&self.topology, &self.demands)?;
        self.config.explicit_paths = Some(paths);
        Ok(())
    }

    /// Remove the explicit path of a single demand, returning it.
    pub fn remove_explicit_path(&mut self, demand: DemandId) -> Option<Vec<EdgeId>> {
        self.config.explicit_paths.as_mut()?.remove_path(demand)
    }

    /// Remove all explicit paths, returning them.
    pub fn clear_explicit_paths(&mut self) -> Option<ExplicitPaths> {
        self.config.explicit_paths.take()
    }

    /// Set the segment-routing path of a demand, creating the default paths for all other demands
    /// if there were none.
    pub fn set_sr_path(&mut self, demand: DemandId, path: Vec<NodeId>) -> Result<(), Error> {
        let demands = &self.demands;
        self.config
            .sr_paths
            .get_or_insert_with(|| SrPaths::new(demands))
            .set_path(&self.topology, demands, demand, path)
    }

    /// Set the explicit path of a demand.
    pub fn set_explicit_path(&mut self, demand: DemandId, path: Vec<EdgeId>) -> Result<(), Error> {
        self.config
            .explicit_paths
            .get_or_insert_with(ExplicitPaths::new)
            .set_path(&self.topology, &self.demands, demand, path)
    }
}
