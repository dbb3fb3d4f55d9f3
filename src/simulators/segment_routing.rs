//! Segment-routing simulation: ECMP between consecutive waypoints.

use std::{collections::BTreeSet, fmt::Write};

use itertools::Itertools;
use log::debug;

use super::{ecmp::distribute, SimulatedFlows, SpecializedFlowSimulator};
use crate::{
    algorithms::ShortestPaths,
    demands::{DemandId, TrafficMatrix},
    setting::Setting,
};

/// Route demands along their segment-routing waypoints. Only demands of a setting with configured
/// [`SrPaths`](crate::paths::SrPaths) are handled.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SegmentRoutingFlowSimulator;

impl SpecializedFlowSimulator for SegmentRoutingFlowSimulator {
    fn name(&self) -> &'static str {
        "SR"
    }

    fn description(&self) -> &'static str {
        "Traffic visits a list of waypoints and uses ECMP between consecutive waypoints"
    }

    fn compute_flows(
        &self,
        setting: &Setting,
        ignored: &BTreeSet<DemandId>,
        trace: bool,
    ) -> SimulatedFlows {
        let topo = setting.topology();
        let Some(sr_paths) = setting.config().sr_paths() else {
            debug!("No segment-routing paths configured");
            return SimulatedFlows::empty(topo);
        };

        let n = topo.num_nodes();
        let mut traffic = TrafficMatrix::zeros((n, n));
        let mut simulated = BTreeSet::new();
        for (d, demand) in setting.demands().idx_iter() {
            if ignored.contains(&d) {
                continue;
            }
            let Some(path) = sr_paths.path(d) else {
                continue;
            };
            for (a, b) in path.iter().tuple_windows() {
                traffic[[a.index(), b.index()]] += demand.amount;
            }
            simulated.insert(d);
        }

        let mut next_hops = String::new();
        if trace {
            for (d, path) in sr_paths.paths_with_intermediate_segments() {
                if simulated.contains(&d) {
                    let _ = writeln!(
                        next_hops,
                        "{}: {}",
                        setting.demands()[d].label,
                        path.iter().map(|n| topo.node_label(n)).join(" -> ")
                    );
                }
            }
        }

        let sp = ShortestPaths::new(topo);
        SimulatedFlows {
            flow: distribute(topo, &sp, &traffic),
            simulated,
            next_hops,
        }
    }
}
