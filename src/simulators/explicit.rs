//! Explicit-path simulation: the whole demand follows a fixed sequence of edges.

use std::{collections::BTreeSet, fmt::Write};

use itertools::Itertools;
use log::debug;

use super::{SimulatedFlows, SpecializedFlowSimulator};
use crate::{demands::DemandId, setting::Setting};

/// Route demands along their explicit paths, without any splitting.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExplicitPathFlowSimulator;

impl SpecializedFlowSimulator for ExplicitPathFlowSimulator {
    fn name(&self) -> &'static str {
        "explicit"
    }

    fn description(&self) -> &'static str {
        "Traffic follows a fixed sequence of edges"
    }

    fn compute_flows(
        &self,
        setting: &Setting,
        ignored: &BTreeSet<DemandId>,
        trace: bool,
    ) -> SimulatedFlows {
        let topo = setting.topology();
        let mut result = SimulatedFlows::empty(topo);
        let Some(paths) = setting.config().explicit_paths() else {
            debug!("No explicit paths configured");
            return result;
        };

        let demands = setting.demands();
        for (d, path) in paths.iter() {
            if ignored.contains(&d) || path.is_empty() {
                continue;
            }
            let amount = demands[d].amount;
            for e in path {
                result.flow[e] += amount;
            }
            result.simulated.insert(d);
            if trace {
                let _ = writeln!(
                    result.next_hops,
                    "{}: {}",
                    demands[d].label,
                    path.iter().map(|e| topo.edge_label(e)).join(", ")
                );
            }
        }

        result
    }
}
