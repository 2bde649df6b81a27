//! Core type definitions for the classifier

use serde::{Deserialize, Serialize};

/// How the per-sample loss derivative enters the gradient
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum DerivativeWeighting {
    /// Scale each derivative by |resp_i|, matching the value function exactly
    #[default]
    Weighted,
    /// Use the bare loss derivative, ignoring the response magnitude
    ///
    /// Only the missing |resp_i| scaling is the legacy behaviour; the loss
    /// derivatives themselves are the corrected ones from `MarginLoss`.
    Unweighted,
}

/// Configuration for the limited-memory quasi-Newton solver
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SolverConfig {
    /// Maximum number of outer iterations
    pub max_iterations: usize,
    /// Number of (s, y) correction pairs kept
    pub memory: usize,
    /// Gradient tolerance: stop when |g| < epsilon
    pub epsilon: f64,
    /// Stop when the objective changes by less than this between iterations
    pub cost_tolerance: f64,
    /// Sufficient decrease constant of the line search
    pub armijo: f64,
    /// Curvature constant of the line search
    pub curvature: f64,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            max_iterations: 1000,
            memory: 5,
            epsilon: 1e-5,
            cost_tolerance: f64::EPSILON,
            armijo: 1e-4,
            curvature: 0.9,
        }
    }
}

/// Configuration for the angle-based classifier
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassifierConfig {
    /// Robustness constant of the margin loss (must be positive)
    pub c: f64,
    /// Regularization weight; recorded but not used by the loss
    pub lambda: f64,
    /// Kernel configuration string, e.g. "RBF 1.0" or "POLY 1.0 2"
    pub kernel: String,
    /// Requested worker count, clamped to the hardware parallelism
    pub threads: usize,
    /// Derivative scaling used by the gradient pass
    pub derivative_weighting: DerivativeWeighting,
    /// Solver settings
    pub solver: SolverConfig,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            c: 1.0,
            lambda: 1.0,
            kernel: "RBF 1.0".to_string(),
            threads: crate::parallel::available_threads(),
            derivative_weighting: DerivativeWeighting::default(),
            solver: SolverConfig::default(),
        }
    }
}
