//! Toy networks shared by the unit tests.
//!
//! ```text
//!  a ---- b
//!  |      |
//!  c ---- d
//! ```

use crate::{algorithms::Topology, demands::Demands};

mod flow_simulation;
mod tabu;

const NODES: [&str; 4] = ["a", "b", "c", "d"];
const EDGES: [&str; 8] = ["ab", "ba", "ac", "ca", "bd", "db", "cd", "dc"];
const SRC: [usize; 8] = [0, 1, 0, 2, 1, 3, 2, 3];
const DST: [usize; 8] = [1, 0, 2, 0, 3, 1, 3, 2];

fn square_with_capacities(capacity: [f64; 8]) -> Topology {
    Topology::from_arrays(&NODES, &EDGES, &SRC, &DST, &[1; 8], &capacity, &[1; 8]).unwrap()
}

/// Square with unit weights and unit capacities.
pub(crate) fn square() -> Topology {
    square_with_capacities([1.0; 8])
}

/// Square with unit weights, where the bottom link `c-d` has capacity 1 and all others 2.
pub(crate) fn square_with_bottleneck() -> Topology {
    square_with_capacities([2.0, 2.0, 2.0, 2.0, 2.0, 2.0, 1.0, 1.0])
}

/// A single demand of 1 from `c` to `d`.
pub(crate) fn bottom_demand(topo: &Topology) -> Demands {
    Demands::from_arrays(topo, &["demand_cd"], &[2], &[3], &[1.0]).unwrap()
}

/// Demand `c -> d` with amount `cd` and demand `a -> b` with amount `ab`.
pub(crate) fn top_and_bottom_demands(topo: &Topology, cd: f64, ab: f64) -> Demands {
    Demands::from_arrays(
        topo,
        &["demand_cd", "demand_ab"],
        &[2, 0],
        &[3, 1],
        &[cd, ab],
    )
    .unwrap()
}

/// Demands `c -> b` and `a -> d`, both with amount 1.
pub(crate) fn diagonal_demands(topo: &Topology) -> Demands {
    Demands::from_arrays(
        topo,
        &["demand_cb", "demand_ad"],
        &[2, 0],
        &[1, 3],
        &[1.0, 1.0],
    )
    .unwrap()
}
