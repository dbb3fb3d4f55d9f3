//! Module to create scenarios on the fly

use anyhow::{bail, ensure, Context};
use rand::prelude::*;
use rand_distr::Uniform;

use crate::{
    algorithms::{Link, NodeId, Topology, INFINITE_DISTANCE},
    demands::{Demand, Demands},
    setting::Setting,
};

/// The topology description for the scenario. All links are bidirectional.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScenarioTopo {
    /// Four nodes `a`, `b`, `c`, `d` connected as `a-b`, `a-c`, `b-d`, `c-d`.
    Square,
    /// A cycle of the given number of nodes (at least 3)
    Ring(usize),
    /// A grid with the given number of rows and columns
    Grid(usize, usize),
    /// A complete graph
    Complete(usize),
}

impl ScenarioTopo {
    /// Node labels and undirected links.
    fn shape(&self) -> anyhow::Result<(Vec<String>, Vec<(usize, usize)>)> {
        Ok(match *self {
            ScenarioTopo::Square => (
                ["a", "b", "c", "d"].map(String::from).to_vec(),
                vec![(0, 1), (0, 2), (1, 3), (2, 3)],
            ),
            ScenarioTopo::Ring(n) => {
                ensure!(n >= 3, "A ring needs at least 3 nodes, got {n}");
                (
                    (0..n).map(|i| format!("r{i}")).collect(),
                    (0..n).map(|i| (i, (i + 1) % n)).collect(),
                )
            }
            ScenarioTopo::Grid(rows, cols) => {
                ensure!(rows > 0 && cols > 0, "Empty grid {rows}x{cols}");
                let id = |r: usize, c: usize| r * cols + c;
                let mut links = Vec::new();
                for r in 0..rows {
                    for c in 0..cols {
                        if c + 1 < cols {
                            links.push((id(r, c), id(r, c + 1)));
                        }
                        if r + 1 < rows {
                            links.push((id(r, c), id(r + 1, c)));
                        }
                    }
                }
                (
                    (0..rows)
                        .flat_map(|r| (0..cols).map(move |c| format!("g{r}_{c}")))
                        .collect(),
                    links,
                )
            }
            ScenarioTopo::Complete(n) => {
                ensure!(n >= 2, "A complete graph needs at least 2 nodes, got {n}");
                (
                    (0..n).map(|i| format!("k{i}")).collect(),
                    (0..n)
                        .flat_map(|a| ((a + 1)..n).map(move |b| (a, b)))
                        .collect(),
                )
            }
        })
    }
}

/// Builder pattern to create a scenario
#[derive(Debug, Clone)]
pub struct ScenarioBuilder {
    /// The chosen topology
    topo: ScenarioTopo,
    /// Seed for the RNG
    seed: Option<u64>,
    /// Inclusive range of link weights
    weights: (u64, u64),
    /// Range of link capacities
    capacities: (f64, f64),
    /// Number of demands
    num_demands: usize,
    /// Range of demand amounts
    amounts: (f64, f64),
}

impl ScenarioBuilder {
    /// Create a new scenario builder with the following default values:
    ///
    /// - Unit link weights
    /// - Unit link capacities
    /// - 10 demands of amount between 0.1 and 1.0
    /// - Randomized seed.
    pub fn new(topo: ScenarioTopo) -> Self {
        Self {
            topo,
            seed: None,
            weights: (1, 1),
            capacities: (1.0, 1.0),
            num_demands: 10,
            amounts: (0.1, 1.0),
        }
    }

    /// Set the random seed for the generation
    pub fn seed(&mut self, seed: u64) -> &mut Self {
        self.seed = Some(seed);
        self
    }

    /// Draw link weights uniformly from `low..=high`. Both directions of a link get the same weight.
    pub fn weights(&mut self, low: u64, high: u64) -> &mut Self {
        self.weights = (low, high);
        self
    }

    /// Draw link capacities uniformly from `low..=high`.
    /// Both directions of a link get the same capacity.
    pub fn capacities(&mut self, low: f64, high: f64) -> &mut Self {
        self.capacities = (low, high);
        self
    }

    /// Set the number of demands to generate. The default value is 10.
    pub fn demands(&mut self, num: usize) -> &mut Self {
        self.num_demands = num;
        self
    }

    /// Draw demand amounts uniformly from `low..=high`.
    pub fn amounts(&mut self, low: f64, high: f64) -> &mut Self {
        self.amounts = (low, high);
        self
    }

    /// Build the scenario, returning a setting without any path overlays.
    pub fn build(&self) -> anyhow::Result<Setting> {
        let (w_low, w_high) = self.weights;
        ensure!(
            1 <= w_low && w_low <= w_high && w_high < INFINITE_DISTANCE,
            "Invalid weight range {w_low}..={w_high}"
        );
        let capacity = real_distr(self.capacities, "capacity")?;
        let amount = real_distr(self.amounts, "demand amount")?;
        let weight = Uniform::new_inclusive(w_low, w_high);

        let mut rng = if let Some(seed) = self.seed {
            StdRng::seed_from_u64(seed)
        } else {
            StdRng::from_entropy()
        };

        let (nodes, links) = self.topo.shape()?;
        let mut edges = Vec::with_capacity(2 * links.len());
        for (a, b) in links {
            let w = weight.sample(&mut rng);
            let c = capacity.sample(&mut rng);
            for (x, y) in [(a, b), (b, a)] {
                let label = format!("{}-{}", nodes[x], nodes[y]);
                edges.push((x, y, Link::new(label, w, c)));
            }
        }
        let topo = Topology::new(nodes, edges).context("Create the topology")?;

        let n = topo.num_nodes();
        if self.num_demands > 0 && n < 2 {
            bail!("Cannot generate demands on a topology with {n} nodes");
        }
        let node = Uniform::new(0, n.max(1));
        let demands = (0..self.num_demands)
            .map(|i| {
                let src = node.sample(&mut rng);
                let dst = loop {
                    let dst = node.sample(&mut rng);
                    if dst != src {
                        break dst;
                    }
                };
                Demand::new(
                    format!("demand_{i}"),
                    NodeId::new(src),
                    NodeId::new(dst),
                    amount.sample(&mut rng),
                )
            })
            .collect();
        let demands = Demands::new(&topo, demands).context("Create the demands")?;

        Setting::new(topo, demands).context("Create the setting")
    }
}

/// Uniform distribution over `low..=high`.
fn real_distr((low, high): (f64, f64), what: &str) -> anyhow::Result<Uniform<f64>> {
    ensure!(
        low.is_finite() && high.is_finite() && 0.0 <= low && low <= high,
        "Invalid {what} range {low}..={high}"
    );
    Ok(Uniform::new_inclusive(low, high))
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::simulators::FlowSimulator;

    #[test]
    fn shapes() {
        for (topo, nodes, edges) in [
            (ScenarioTopo::Square, 4, 8),
            (ScenarioTopo::Ring(5), 5, 10),
            (ScenarioTopo::Grid(3, 4), 12, 34),
            (ScenarioTopo::Complete(4), 4, 12),
        ] {
            let setting = ScenarioBuilder::new(topo).seed(1).build().unwrap();
            assert_eq!(setting.topology().num_nodes(), nodes);
            assert_eq!(setting.topology().num_edges(), edges);
            assert_eq!(setting.demands().len(), 10);
            for e in setting.topology().edge_indices() {
                assert!(setting.topology().find_symmetric_edge(e).is_some());
            }
        }
    }

    #[test]
    fn seeded() {
        let mut builder = ScenarioBuilder::new(ScenarioTopo::Grid(3, 3));
        builder
            .seed(42)
            .weights(1, 10)
            .capacities(5.0, 10.0)
            .demands(20)
            .amounts(1.0, 2.0);
        let a = builder.build().unwrap();
        let b = builder.build().unwrap();
        assert_eq!(a.topology().weights(), b.topology().weights());
        assert_eq!(a.demands().total_amount(), b.demands().total_amount());
        let topo = a.topology();
        for e in topo.edge_indices() {
            assert!((1..=10).contains(&topo.weight(e)));
            assert!((5.0..=10.0).contains(&topo.capacity(e)));
        }
        for d in a.demands().iter() {
            assert_ne!(d.src, d.dst);
            assert!((1.0..=2.0).contains(&d.amount));
        }
        let mut sim = FlowSimulator::new();
        sim.compute_flows(&a);
        assert!(sim.max_utilization() > 0.0);
    }

    #[test]
    fn invalid() {
        assert!(ScenarioBuilder::new(ScenarioTopo::Ring(2)).build().is_err());
        assert!(ScenarioBuilder::new(ScenarioTopo::Grid(0, 3)).build().is_err());
        assert!(ScenarioBuilder::new(ScenarioTopo::Square)
            .weights(0, 3)
            .build()
            .is_err());
        assert!(ScenarioBuilder::new(ScenarioTopo::Square)
            .capacities(2.0, 1.0)
            .build()
            .is_err());
    }
}
