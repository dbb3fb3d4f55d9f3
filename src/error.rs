//! Error type shared by the data model, the simulators and the solvers.

use thiserror::Error;

/// Configuration errors. They are raised when constructing or modifying a topology, a set of
/// demands, a routing configuration or a solver.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Error {
    /// The weight of an edge must be a positive integer, at most `max`.
    #[error("Edge {edge} has invalid weight {weight} (must be in 1..={max})")]
    InvalidWeight {
        /// Index of the edge
        edge: usize,
        /// The rejected weight
        weight: u64,
        /// The largest weight accepted
        max: u64,
    },
    /// The capacity of an edge must be finite and non-negative.
    #[error("Edge {edge} has invalid capacity {capacity}")]
    InvalidCapacity {
        /// Index of the edge
        edge: usize,
        /// The rejected capacity
        capacity: f64,
    },
    /// A node index does not exist in the topology.
    #[error("Node {node} does not exist (the topology has {nodes} nodes)")]
    NodeOutOfRange {
        /// The requested node
        node: usize,
        /// Number of nodes in the topology
        nodes: usize,
    },
    /// An edge index does not exist in the topology.
    #[error("Edge {edge} does not exist (the topology has {edges} edges)")]
    EdgeOutOfRange {
        /// The requested edge
        edge: usize,
        /// Number of edges in the topology
        edges: usize,
    },
    /// Parallel arrays must have the same length.
    #[error("Expected {expected} values for {what}, found {found}")]
    LengthMismatch {
        /// The name of the array
        what: &'static str,
        /// Expected length
        expected: usize,
        /// Actual length
        found: usize,
    },
    /// Demand volumes must be finite and non-negative.
    #[error("Demand {demand} has invalid amount {amount}")]
    InvalidAmount {
        /// Index of the demand
        demand: usize,
        /// The rejected amount
        amount: f64,
    },
    /// No node is known under that label.
    #[error("Unknown node {0}")]
    UnknownNode(String),
    /// No edge is known under that label.
    #[error("Unknown edge {0}")]
    UnknownEdge(String),
    /// A demand index does not exist.
    #[error("Demand {demand} does not exist ({demands} demands)")]
    DemandOutOfRange {
        /// The requested demand
        demand: usize,
        /// Number of demands
        demands: usize,
    },
    /// Two nodes use the same label.
    #[error("Node label {0} is used twice")]
    DuplicateNode(String),
    /// A segment-routing path is malformed.
    #[error("Invalid segment-routing path for demand {demand}: {reason}")]
    InvalidSrPath {
        /// Index of the demand
        demand: usize,
        /// What is wrong with the path
        reason: String,
    },
    /// An explicit path is malformed.
    #[error("Invalid explicit path for demand {demand}: {reason}")]
    InvalidExplicitPath {
        /// Index of the demand
        demand: usize,
        /// What is wrong with the path
        reason: String,
    },
    /// A solver parameter is out of range.
    #[error("Invalid solver configuration: {0}")]
    InvalidConfig(String),
    /// No solver is registered under that name.
    #[error("Unknown solver {0}")]
    UnknownSolver(String),
}
