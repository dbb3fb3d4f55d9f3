//! IGP weight optimization with tabu search, following "B. Fortz and M. Thorup. Internet traffic
//! engineering by optimizing OSPF weights. In INFOCOM, 2000."
//!
//! The search keeps a current weight vector as a [`State`]. Each iteration samples a fraction of
//! every [`Neighborhood`] and moves to the best sampled vector that is not forbidden by the tabu
//! memories, even if it is worse than the current one. The best vector ever seen is written back
//! into the setting once the time budget is exhausted.

use std::time::{Duration, Instant};

use log::*;
use rand::{rngs::SmallRng, Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use super::{Objective, Solver};
use crate::{
    algorithms::INFINITE_DISTANCE, my_spinner, setting::Setting, simulators::FlowSimulator, Error,
};

pub mod neighborhood;
pub mod state;
pub mod tabu_table;

pub use neighborhood::{EvenlyBalancingFlows, Neighborhood, SingleWeightChange};
pub use state::State;
pub use tabu_table::{ScoreTabu, TabuTable, WeightVectorTabu};

/// Parameters of the tabu search.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TabuConfig {
    /// Largest weight assigned by the search.
    pub max_weight: u64,
    /// Fraction of each neighborhood sampled per iteration.
    pub sampling_rate: f64,
    /// The weight-vector tabu table has `1 << tabu_size` entries.
    pub tabu_size: u32,
    /// Number of accepted moves during which an accepted score stays forbidden.
    pub score_ttl: u64,
    /// When no allowed move is found, jump back to the best state (or, with probability 1/5, to
    /// random weights).
    pub reset_state_when_reset_tabu: bool,
    /// Seed of the random number generator. Use entropy if unset.
    pub seed: Option<u64>,
    /// Show a progress spinner.
    pub show_progress: bool,
}

impl Default for TabuConfig {
    fn default() -> Self {
        Self {
            max_weight: 100,
            sampling_rate: 0.2,
            tabu_size: 16,
            score_ttl: 2,
            reset_state_when_reset_tabu: false,
            seed: None,
            show_progress: false,
        }
    }
}

impl TabuConfig {
    /// Set the largest weight assigned by the search. The default value is 100.
    pub fn max_weight(&mut self, max_weight: u64) -> &mut Self {
        self.max_weight = max_weight;
        self
    }

    /// Set the fraction of each neighborhood that is sampled. The default value is 0.2.
    pub fn sampling_rate(&mut self, rate: f64) -> &mut Self {
        self.sampling_rate = rate;
        self
    }

    /// Set the number of bits of the weight-vector hash. The default value is 16.
    pub fn tabu_size(&mut self, bits: u32) -> &mut Self {
        self.tabu_size = bits;
        self
    }

    /// Set the time-to-live of forbidden scores. The default value is 2.
    pub fn score_ttl(&mut self, ttl: u64) -> &mut Self {
        self.score_ttl = ttl;
        self
    }

    /// Jump to the best (or a random) state whenever the weight tabu table is reset.
    pub fn reset_state_when_reset_tabu(&mut self, reset: bool) -> &mut Self {
        self.reset_state_when_reset_tabu = reset;
        self
    }

    /// Set the random seed
    pub fn seed(&mut self, seed: u64) -> &mut Self {
        self.seed = Some(seed);
        self
    }

    /// Show a progress spinner while searching.
    pub fn show_progress(&mut self, show: bool) -> &mut Self {
        self.show_progress = show;
        self
    }

    /// Check that all parameters are in range.
    pub fn validate(&self) -> Result<(), Error> {
        if self.max_weight < 2 || self.max_weight >= INFINITE_DISTANCE {
            return Err(Error::InvalidConfig(format!(
                "max_weight must be in 2..{INFINITE_DISTANCE}, found {}",
                self.max_weight
            )));
        }
        if !self.sampling_rate.is_finite() || self.sampling_rate <= 0.0 {
            return Err(Error::InvalidConfig(format!(
                "sampling_rate must be positive, found {}",
                self.sampling_rate
            )));
        }
        if !(1..=30).contains(&self.tabu_size) {
            return Err(Error::InvalidConfig(format!(
                "tabu_size must be in 1..=30, found {}",
                self.tabu_size
            )));
        }
        Ok(())
    }
}

/// Tabu search minimizing the maximum link utilization by changing IGP weights.
#[derive(Debug, Clone, Default)]
pub struct TabuIgpwo {
    config: TabuConfig,
    solve_time: Duration,
    best_score: Option<f64>,
    num_resets: usize,
}

impl TabuIgpwo {
    /// Name under which the solver is registered.
    pub const NAME: &'static str = "tabu-igpwo";

    /// Create a new solver with the given parameters.
    pub fn new(config: TabuConfig) -> Result<Self, Error> {
        config.validate()?;
        Ok(Self {
            config,
            ..Default::default()
        })
    }

    /// Get the parameters.
    pub fn config(&self) -> &TabuConfig {
        &self.config
    }

    /// Maximum link utilization of the weights written back by the last call to
    /// [`Solver::solve`].
    pub fn best_score(&self) -> Option<f64> {
        self.best_score
    }

    /// Number of times the weight tabu table was cleared during the last call to
    /// [`Solver::solve`].
    pub fn num_resets(&self) -> usize {
        self.num_resets
    }

    fn optimize(&mut self, setting: &mut Setting, budget: Duration) -> Result<f64, Error> {
        let start = Instant::now();
        self.num_resets = 0;
        let deadline = start.checked_add(budget);
        let config = self.config.clone();

        let mut rng = match config.seed {
            Some(seed) => SmallRng::seed_from_u64(seed),
            None => SmallRng::from_entropy(),
        };

        let topo = setting.topology();
        let mutable: Vec<usize> = topo
            .edge_indices()
            .filter(|e| !topo.is_absent(e))
            .map(|e| e.index())
            .collect();
        let mut neighborhoods: Vec<Box<dyn Neighborhood>> = vec![
            Box::new(SingleWeightChange::new(topo, config.max_weight)?),
            Box::new(EvenlyBalancingFlows::new(topo, config.max_weight)),
        ];
        let weights = topo.weights();
        let tabu_weights = WeightVectorTabu::new(weights.len(), config.tabu_size, &mut rng);

        let mut search = Search {
            setting,
            sim: FlowSimulator::new(),
            current: State::new(weights.clone()),
            best_delta: State::new(weights.clone()),
            tabu_weights,
            tabu_score: ScoreTabu::new(config.score_ttl),
            rng,
        };
        search.sim.record_next_hops(false);

        let mut current_score = search.evaluate()?;
        let mut best_score = current_score;
        let mut best_state = State::new(weights);

        if mutable.is_empty() {
            info!("No edge weight can be changed");
            return Ok(best_score);
        }

        let progress = my_spinner("Optimizing link weights", false, config.show_progress);
        let mut num_moves: usize = 0;
        let mut iteration: usize = 0;

        'search: loop {
            iteration += 1;
            for i in 0..neighborhoods.len() {
                if deadline.is_some_and(|d| Instant::now() >= d) {
                    break 'search;
                }
                let nb = neighborhoods[i].as_mut();
                let trials = ((config.sampling_rate * nb.size() as f64).round() as usize).max(1);
                num_moves += trials;

                match search.explore(nb, trials)? {
                    Some(score) => {
                        search.accept(score);
                        current_score = score;
                    }
                    None => {
                        debug!(
                            "Clearing the tabu table, no allowed move in {} at iteration {iteration}",
                            neighborhoods[i].name()
                        );
                        self.num_resets += 1;
                        match search.reset(
                            config.reset_state_when_reset_tabu,
                            &best_state,
                            best_score,
                            &mutable,
                            config.max_weight,
                        )? {
                            Some(score) => current_score = score,
                            None => continue,
                        }
                    }
                }

                // the current weights are the new baseline of the neighborhoods
                search.sync()?;
                for nb in neighborhoods.iter_mut() {
                    nb.rebase(search.setting.topology());
                }

                if current_score < best_score {
                    best_state.copy_from(&search.current);
                    best_score = current_score;
                    info!(
                        "Current best is {best_score} in {}ms",
                        start.elapsed().as_millis()
                    );
                }
            }
            progress.inc(1);
        }
        progress.finish_and_clear();

        search.setting.topology_mut().set_weights(best_state.values())?;

        let total = start.elapsed();
        info!(
            "{:.1} moves/ms, {num_moves} moves in {} iterations and {}ms",
            num_moves as f64 / total.as_secs_f64().max(1e-9) / 1000.0,
            iteration,
            total.as_millis()
        );

        Ok(best_score)
    }
}

impl Solver for TabuIgpwo {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn description(&self) -> &'static str {
        "An IGP weight optimizer inspired by \"B. Fortz and M. Thorup. Internet traffic engineering \
         by optimizing OSPF weights. In INFOCOM, 2000.\""
    }

    fn objective(&self) -> Objective {
        Objective::MaxLinkUtilization
    }

    fn solve(&mut self, setting: &mut Setting, budget: Duration) -> Result<(), Error> {
        self.config.validate()?;
        let start = Instant::now();
        let result = self.optimize(setting, budget);
        self.solve_time = start.elapsed();
        self.best_score = Some(result?);
        Ok(())
    }

    fn solve_time(&self) -> Duration {
        self.solve_time
    }
}

/// Mutable data of a single optimization run.
#[derive(Debug)]
struct Search<'a> {
    setting: &'a mut Setting,
    sim: FlowSimulator,
    current: State,
    best_delta: State,
    tabu_weights: WeightVectorTabu,
    tabu_score: ScoreTabu,
    rng: SmallRng,
}

impl Search<'_> {
    /// Write the current weights into the topology.
    fn sync(&mut self) -> Result<(), Error> {
        self.setting.topology_mut().set_weights(self.current.values())
    }

    /// Maximum link utilization with the current weights.
    fn evaluate(&mut self) -> Result<f64, Error> {
        self.sync()?;
        self.sim.compute_flows(&*self.setting);
        Ok(self.sim.max_utilization())
    }

    /// Sample `trials` moves of the neighborhood. Returns the best allowed score, with the
    /// corresponding delta stored in `best_delta`. The current state is left unchanged.
    fn explore(&mut self, nb: &mut dyn Neighborhood, trials: usize) -> Result<Option<f64>, Error> {
        let mut round_best: Option<f64> = None;

        for _ in 0..trials {
            nb.apply_random(&mut self.current, &mut self.rng);
            if self.current.delta_size() > 0 && self.tabu_weights.is_allowed(self.current.values())
            {
                let score = self.evaluate()?;
                self.tabu_weights.forbid(self.current.values(), false);

                if round_best.map_or(true, |b| score < b) && self.tabu_score.is_allowed(&score) {
                    self.best_delta.restore();
                    self.current.apply_delta_to(&mut self.best_delta);
                    round_best = Some(score);
                }
            }
            self.current.restore();
        }

        Ok(round_best)
    }

    /// Clear the weight tabu table. If `jump` is set, also move the current state, either back to
    /// `best` (with probability 4/5) or to random weights on the `mutable` edges. Returns the
    /// score of the new current state, or `None` if it was kept.
    fn reset(
        &mut self,
        jump: bool,
        best: &State,
        best_score: f64,
        mutable: &[usize],
        max_weight: u64,
    ) -> Result<Option<f64>, Error> {
        self.tabu_weights.reset();
        if !jump {
            return Ok(None);
        }
        let score = if self.rng.gen_range(0..5) != 0 {
            self.current.copy_from(best);
            best_score
        } else {
            for &e in mutable {
                let w = self.rng.gen_range(1..=max_weight);
                self.current.set(e, w);
            }
            self.current.save();
            self.evaluate()?
        };
        self.best_delta.copy_from(&self.current);
        Ok(Some(score))
    }

    /// Move to the candidate stored in `best_delta`.
    fn accept(&mut self, score: f64) {
        self.best_delta.apply_delta_to(&mut self.current);
        self.tabu_weights.forbid(self.current.values(), true);
        self.tabu_score.forbid(&score, true);
        self.current.save();
        self.best_delta.save();
    }
}
