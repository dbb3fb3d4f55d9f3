//! Flow simulation: compute the load of every edge for a given setting.
//!
//! Three specialized simulators exist, one per forwarding mechanism. The [`FlowSimulator`] runs
//! them in priority order (explicit paths, then segment routing, then ECMP). Every demand is
//! simulated by the first simulator that handles it, and ignored by all later ones.

use std::{borrow::Borrow, collections::BTreeSet, fmt::Write};

use crate::{
    algorithms::{EdgeId, EdgeList, EdgeLoads, Topology, TopologyType},
    demands::DemandId,
    setting::Setting,
};

pub mod ecmp;
pub mod explicit;
pub mod segment_routing;

pub use ecmp::EcmpFlowSimulator;
pub use explicit::ExplicitPathFlowSimulator;
pub use segment_routing::SegmentRoutingFlowSimulator;

/// Result of a single specialized simulator.
#[derive(Debug, Clone, PartialEq)]
pub struct SimulatedFlows {
    /// Load placed on every edge
    pub flow: EdgeLoads,
    /// Demands routed by the simulator
    pub simulated: BTreeSet<DemandId>,
    /// Human-readable next-hops (empty if not requested)
    pub next_hops: String,
}

impl SimulatedFlows {
    /// No flow on any edge, and no demand simulated.
    pub fn empty(topo: &Topology) -> Self {
        Self {
            flow: EdgeList::from_fn(topo.graph(), |_| 0.0),
            simulated: BTreeSet::new(),
            next_hops: String::new(),
        }
    }
}

/// A simulator for a single forwarding mechanism.
pub trait SpecializedFlowSimulator: std::fmt::Debug {
    /// Short name of the simulator
    fn name(&self) -> &'static str;

    /// Description of the forwarding mechanism
    fn description(&self) -> &'static str;

    /// Simulate all demands of `setting` handled by this mechanism, except those in `ignored`.
    /// If `trace` is set, the next-hops used are written to [`SimulatedFlows::next_hops`].
    fn compute_flows(
        &self,
        setting: &Setting,
        ignored: &BTreeSet<DemandId>,
        trace: bool,
    ) -> SimulatedFlows;
}

/// Utilization of an edge. An edge without capacity that carries traffic is infinitely utilized.
pub fn utilization(load: f64, capacity: f64) -> f64 {
    if capacity > 0.0 {
        load / capacity
    } else if load > 0.0 {
        f64::INFINITY
    } else {
        0.0
    }
}

/// Maximum utilization over all edges of `topo`.
pub fn max_utilization(flow: &EdgeLoads, topo: &Topology) -> f64 {
    flow.idx_iter()
        .map(|(e, load)| utilization(*load, topo.capacity(e)))
        .fold(0.0, f64::max)
}

/// Composition of specialized simulators in priority order.
#[derive(Debug)]
pub struct FlowSimulator {
    simulators: Vec<Box<dyn SpecializedFlowSimulator>>,
    flow: EdgeLoads,
    capacities: EdgeList<f64, TopologyType>,
    simulated: BTreeSet<DemandId>,
    next_hops: String,
    trace: bool,
}

impl Default for FlowSimulator {
    fn default() -> Self {
        Self::new()
    }
}

impl FlowSimulator {
    /// Create the default simulator: explicit paths, then segment routing, then ECMP.
    pub fn new() -> Self {
        Self::with_simulators(vec![
            Box::new(ExplicitPathFlowSimulator),
            Box::new(SegmentRoutingFlowSimulator),
            Box::new(EcmpFlowSimulator),
        ])
    }

    /// Create a simulator with custom priorities. The first simulator has the highest priority.
    pub fn with_simulators(simulators: Vec<Box<dyn SpecializedFlowSimulator>>) -> Self {
        Self {
            simulators,
            flow: Vec::new().into(),
            capacities: Vec::new().into(),
            simulated: BTreeSet::new(),
            next_hops: String::new(),
            trace: true,
        }
    }

    /// Enable or disable recording the next-hops. Disable it when computing flows in a hot loop.
    pub fn record_next_hops(&mut self, trace: bool) -> &mut Self {
        self.trace = trace;
        self
    }

    /// The specialized simulators, in priority order.
    pub fn simulators(&self) -> &[Box<dyn SpecializedFlowSimulator>] {
        &self.simulators
    }

    /// Reset all results and prepare for simulating `setting`.
    pub fn setup(&mut self, setting: &Setting) {
        let topo = setting.topology();
        self.flow = EdgeList::from_fn(topo.graph(), |_| 0.0);
        self.capacities = topo.capacities();
        self.simulated.clear();
        self.next_hops.clear();
    }

    /// Compute the flows of all demands in `setting`, returning the load of every edge.
    pub fn compute_flows(&mut self, setting: &Setting) -> &EdgeLoads {
        self.setup(setting);
        for (i, sim) in self.simulators.iter().enumerate() {
            let result = sim.compute_flows(setting, &self.simulated, self.trace);
            self.flow.zip_mut(&result.flow, |f, r| *f += *r);
            self.simulated.extend(result.simulated);
            if self.trace {
                let _ = writeln!(
                    self.next_hops,
                    "***Next hops priority {} ({} paths)***",
                    i + 1,
                    sim.name()
                );
                self.next_hops.push_str(&result.next_hops);
            }
        }
        &self.flow
    }

    /// Load on every edge, computed by the last call to [`FlowSimulator::compute_flows`].
    pub fn flow(&self) -> &EdgeLoads {
        &self.flow
    }

    /// Load on a single edge.
    pub fn flow_on_edge(&self, e: impl Borrow<EdgeId>) -> f64 {
        self.flow[e]
    }

    /// Utilization of a single edge.
    pub fn utilization(&self, e: impl Borrow<EdgeId>) -> f64 {
        let e = *e.borrow();
        utilization(self.flow[e], self.capacities[e])
    }

    /// Maximum utilization over all edges.
    pub fn max_utilization(&self) -> f64 {
        self.flow
            .zip(&self.capacities)
            .map(|(load, cap)| utilization(*load, *cap))
            .fold(0.0, f64::max)
    }

    /// Demands routed during the last computation.
    pub fn simulated_demands(&self) -> &BTreeSet<DemandId> {
        &self.simulated
    }

    /// Next-hops used during the last computation, grouped by simulator.
    pub fn next_hops(&self) -> &str {
        &self.next_hops
    }
}
