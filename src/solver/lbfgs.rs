//! Limited-memory BFGS minimizer backed by `argmin`
//!
//! Any `Objective` is adapted to argmin's `CostFunction` and `Gradient`
//! with `Vec<f64>` parameters and solved by `LBFGS` with a More-Thuente
//! line search. The final argmin state is mapped onto `SolverReport`.

use crate::core::{ABCError, Objective, Result, SolverConfig};
use argmin::core::{
    CostFunction, Error as ArgminError, Executor, Gradient, State, TerminationReason,
    TerminationStatus,
};
use argmin::solver::linesearch::MoreThuenteLineSearch;
use argmin::solver::quasinewton::LBFGS;
use log::{debug, info, warn};

/// Why the solver stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SolverStatus {
    /// Gradient norm or objective change fell below its tolerance
    Converged,
    /// Iteration cap reached
    MaxIterations,
    /// The solver terminated for any other reason
    Stopped,
}

/// Final state of a solve
#[derive(Debug, Clone)]
pub struct SolverReport {
    /// Final point
    pub x: Vec<f64>,
    /// Objective value at `x`
    pub value: f64,
    /// Euclidean norm of the gradient at `x`
    pub gradient_norm: f64,
    /// Number of completed iterations
    pub iterations: usize,
    pub status: SolverStatus,
}

/// Borrowed objective seen through argmin's problem traits
struct Problem<'a, O: ?Sized> {
    objective: &'a O,
}

impl<O: Objective + ?Sized> CostFunction for Problem<'_, O> {
    type Param = Vec<f64>;
    type Output = f64;

    fn cost(&self, x: &Self::Param) -> std::result::Result<Self::Output, ArgminError> {
        Ok(self.objective.value(x)?)
    }
}

impl<O: Objective + ?Sized> Gradient for Problem<'_, O> {
    type Param = Vec<f64>;
    type Gradient = Vec<f64>;

    fn gradient(&self, x: &Self::Param) -> std::result::Result<Self::Gradient, ArgminError> {
        let mut g = vec![0.0; x.len()];
        self.objective.gradient(x, &mut g)?;
        Ok(g)
    }
}

/// Recover our own error if the objective raised it, otherwise wrap
/// argmin's message
fn from_argmin(e: ArgminError) -> ABCError {
    match e.downcast::<ABCError>() {
        Ok(inner) => inner,
        Err(other) => ABCError::OptimizationError(other.to_string()),
    }
}

pub struct LbfgsSolver {
    config: SolverConfig,
}

impl LbfgsSolver {
    /// Create a solver, validating the configuration
    pub fn new(config: SolverConfig) -> Result<Self> {
        if config.memory == 0 {
            return Err(ABCError::InvalidParameter(
                "Solver memory must be at least 1".to_string(),
            ));
        }
        if config.epsilon.is_nan() || config.epsilon <= 0.0 {
            return Err(ABCError::InvalidParameter(format!(
                "Tolerance must be positive, got {}",
                config.epsilon
            )));
        }
        if config.cost_tolerance.is_nan() || config.cost_tolerance < 0.0 {
            return Err(ABCError::InvalidParameter(format!(
                "Cost tolerance must be non-negative, got {}",
                config.cost_tolerance
            )));
        }
        if !(config.armijo > 0.0 && config.armijo < config.curvature && config.curvature < 1.0) {
            return Err(ABCError::InvalidParameter(format!(
                "Line search constants must satisfy 0 < armijo < curvature < 1, got {} and {}",
                config.armijo, config.curvature
            )));
        }
        Ok(Self { config })
    }

    pub fn config(&self) -> &SolverConfig {
        &self.config
    }

    /// Minimize `objective` starting from `x0`
    pub fn minimize<O: Objective + ?Sized>(
        &self,
        objective: &O,
        x0: Vec<f64>,
    ) -> Result<SolverReport> {
        let dim = objective.dimension();
        if x0.len() != dim {
            return Err(ABCError::DimensionMismatch {
                expected: dim,
                actual: x0.len(),
            });
        }

        let mut g = vec![0.0; dim];
        let f = objective.value_and_gradient(&x0, &mut g)?;
        if !f.is_finite() {
            return Err(ABCError::OptimizationError(format!(
                "Objective is not finite at the starting point: {f}"
            )));
        }

        let gnorm = norm(&g);
        info!(
            "L-BFGS start: dim={dim}, m={}, f={f:.6e}, |g|={gnorm:.3e}",
            self.config.memory
        );
        if gnorm < self.config.epsilon {
            info!("L-BFGS start point already satisfies the gradient tolerance");
            return Ok(SolverReport {
                x: x0,
                value: f,
                gradient_norm: gnorm,
                iterations: 0,
                status: SolverStatus::Converged,
            });
        }

        let linesearch: MoreThuenteLineSearch<Vec<f64>, Vec<f64>, f64> =
            MoreThuenteLineSearch::new()
                .with_c(self.config.armijo, self.config.curvature)
                .map_err(from_argmin)?;
        let solver = LBFGS::new(linesearch, self.config.memory)
            .with_tolerance_grad(self.config.epsilon)
            .map_err(from_argmin)?
            .with_tolerance_cost(self.config.cost_tolerance)
            .map_err(from_argmin)?;

        let max_iters = self.config.max_iterations as u64;
        let result = Executor::new(Problem { objective }, solver)
            .configure(|state| state.param(x0).max_iters(max_iters))
            .run()
            .map_err(from_argmin)?;

        let state = result.state();
        let x = state
            .get_best_param()
            .cloned()
            .ok_or_else(|| ABCError::OptimizationError("Solver returned no point".to_string()))?;
        let iterations = state.get_iter() as usize;
        let status = match state.get_termination_status() {
            TerminationStatus::Terminated(TerminationReason::SolverConverged)
            | TerminationStatus::Terminated(TerminationReason::TargetCostReached) => {
                SolverStatus::Converged
            }
            TerminationStatus::Terminated(TerminationReason::MaxItersReached) => {
                SolverStatus::MaxIterations
            }
            other => {
                debug!("L-BFGS terminated with {other:?}");
                SolverStatus::Stopped
            }
        };

        let value = objective.value_and_gradient(&x, &mut g)?;
        let gradient_norm = norm(&g);
        match status {
            SolverStatus::MaxIterations => warn!(
                "L-BFGS reached {iterations} iterations without converging, |g|={gradient_norm:.3e}"
            ),
            _ => info!(
                "L-BFGS finished after {iterations} iterations ({status:?}), f={value:.6e}"
            ),
        }

        Ok(SolverReport {
            x,
            value,
            gradient_norm,
            iterations,
            status,
        })
    }
}

fn norm(a: &[f64]) -> f64 {
    a.iter().map(|v| v * v).sum::<f64>().sqrt()
}
