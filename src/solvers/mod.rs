//! Solvers that modify the routing configuration of a setting.

use std::{collections::BTreeMap, time::Duration};

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

use crate::{setting::Setting, Error};

pub mod tabu;

pub use tabu::{TabuConfig, TabuIgpwo};

/// The quantity a solver minimizes.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Display,
    EnumIter,
    EnumString,
    Serialize,
    Deserialize,
)]
pub enum Objective {
    /// Maximum utilization over all edges
    #[strum(serialize = "max-link-utilization")]
    MaxLinkUtilization,
}

/// A solver modifies the link weights and/or the path overlays of a setting in place.
pub trait Solver: std::fmt::Debug {
    /// Short name of the solver
    fn name(&self) -> &'static str;

    /// Description of the solver
    fn description(&self) -> &'static str;

    /// The objective the solver minimizes
    fn objective(&self) -> Objective;

    /// Improve the configuration of `setting` within the wall-clock `budget`.
    fn solve(&mut self, setting: &mut Setting, budget: Duration) -> Result<(), Error>;

    /// Wall-clock time spent during the last call to [`Solver::solve`].
    fn solve_time(&self) -> Duration;
}

/// Function creating a new solver.
pub type SolverFactory = fn() -> Box<dyn Solver>;

/// Explicit map from solver names to their factories.
#[derive(Debug, Clone, Default)]
pub struct SolverRegistry {
    factories: BTreeMap<&'static str, SolverFactory>,
}

impl SolverRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry with all solvers of this crate.
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register(TabuIgpwo::NAME, || Box::<TabuIgpwo>::default());
        registry
    }

    /// Register a solver, replacing any previous solver with the same name.
    pub fn register(&mut self, name: &'static str, factory: SolverFactory) -> &mut Self {
        self.factories.insert(name, factory);
        self
    }

    /// Create the solver registered under `name`.
    pub fn create(&self, name: &str) -> Result<Box<dyn Solver>, Error> {
        self.factories
            .get(name)
            .map(|f| f())
            .ok_or_else(|| Error::UnknownSolver(name.to_string()))
    }

    /// Iterate over the names of all registered solvers.
    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.factories.keys().copied()
    }
}
