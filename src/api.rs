//! High-level classifier interface
//!
//! Wires the objective, a dataset registry and the L-BFGS solver together.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use rabc::api::AngleBasedClassifier;
//! use rabc::ColumnDataset;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let data = ColumnDataset::new(vec![1.0; 4], vec![1.0; 4], vec![0, 0, 1, 1])
//!     .with_continuous(vec![0.0, 0.2, 1.0, 1.2]);
//!
//! let mut abc = AngleBasedClassifier::builder()
//!     .with_kernel("RBF 0.5")
//!     .with_max_iterations(200)
//!     .build()?;
//! let index = abc.add_dataset(data);
//! abc.bind(index)?;
//! let value = abc.run()?.value;
//! println!("f = {:.6}, {} coefficients", value, abc.parameters().len());
//! # Ok(())
//! # }
//! ```

use crate::core::{
    ABCError, ClassifierConfig, Dataset, DerivativeWeighting, Objective, Result, SolverConfig,
};
use crate::objective::AngleObjective;
use crate::solver::{LbfgsSolver, SolverReport};
use log::info;
use std::sync::Arc;

/// Builder for `AngleBasedClassifier`
#[derive(Debug, Clone, Default)]
pub struct ClassifierBuilder {
    config: ClassifierConfig,
}

impl ClassifierBuilder {
    /// Set robustness constant c
    pub fn with_c(mut self, c: f64) -> Self {
        self.config.c = c;
        self
    }

    /// Set regularization weight
    pub fn with_lambda(mut self, lambda: f64) -> Self {
        self.config.lambda = lambda;
        self
    }

    /// Set kernel configuration string
    pub fn with_kernel(mut self, kernel: &str) -> Self {
        self.config.kernel = kernel.to_string();
        self
    }

    /// Set requested worker count
    pub fn with_threads(mut self, threads: usize) -> Self {
        self.config.threads = threads;
        self
    }

    /// Set maximum number of iterations
    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.config.solver.max_iterations = max_iterations;
        self
    }

    /// Set solver memory size m
    pub fn with_memory(mut self, memory: usize) -> Self {
        self.config.solver.memory = memory;
        self
    }

    /// Set convergence tolerance
    pub fn with_epsilon(mut self, epsilon: f64) -> Self {
        self.config.solver.epsilon = epsilon;
        self
    }

    /// Set derivative weighting of the gradient
    pub fn with_derivative_weighting(mut self, weighting: DerivativeWeighting) -> Self {
        self.config.derivative_weighting = weighting;
        self
    }

    /// Replace the solver configuration wholesale
    pub fn with_solver_config(mut self, solver: SolverConfig) -> Self {
        self.config.solver = solver;
        self
    }

    pub fn config(&self) -> &ClassifierConfig {
        &self.config
    }

    pub fn build(self) -> Result<AngleBasedClassifier> {
        AngleBasedClassifier::from_config(self.config)
    }
}

/// Kernel angle-based classifier: bind a dataset, run, read parameters
pub struct AngleBasedClassifier {
    config: ClassifierConfig,
    objective: AngleObjective,
    solver: LbfgsSolver,
    datasets: Vec<Arc<dyn Dataset>>,
    bound_index: Option<usize>,
    beta: Vec<f64>,
    report: Option<SolverReport>,
}

impl AngleBasedClassifier {
    /// Create a classifier from the positional parameters
    ///
    /// # Errors
    /// Configuration errors (kernel string, c, worker count, solver
    /// settings) surface here.
    pub fn new(
        c: f64,
        lambda: f64,
        kernel: &str,
        max_iterations: usize,
        memory: usize,
        epsilon: f64,
        threads: usize,
    ) -> Result<Self> {
        Self::builder()
            .with_c(c)
            .with_lambda(lambda)
            .with_kernel(kernel)
            .with_max_iterations(max_iterations)
            .with_memory(memory)
            .with_epsilon(epsilon)
            .with_threads(threads)
            .build()
    }

    pub fn builder() -> ClassifierBuilder {
        ClassifierBuilder::default()
    }

    pub fn from_config(config: ClassifierConfig) -> Result<Self> {
        let objective = AngleObjective::from_config(&config)?;
        let solver = LbfgsSolver::new(config.solver.clone())?;
        Ok(Self {
            config,
            objective,
            solver,
            datasets: Vec::new(),
            bound_index: None,
            beta: Vec::new(),
            report: None,
        })
    }

    /// Register a dataset; returns the index to pass to `bind`
    pub fn add_dataset<D: Dataset + 'static>(&mut self, data: D) -> usize {
        self.add_shared_dataset(Arc::new(data))
    }

    /// Register an already shared dataset
    pub fn add_shared_dataset(&mut self, data: Arc<dyn Dataset>) -> usize {
        self.datasets.push(data);
        self.datasets.len() - 1
    }

    pub fn n_datasets(&self) -> usize {
        self.datasets.len()
    }

    /// Bind dataset `index` and reset the solution to zeros
    pub fn bind(&mut self, index: usize) -> Result<()> {
        let data = self
            .datasets
            .get(index)
            .ok_or(ABCError::DatasetIndexOutOfRange {
                index,
                len: self.datasets.len(),
            })?;

        self.objective.bind(data.as_ref())?;
        self.bound_index = Some(index);
        self.beta = vec![0.0; self.objective.dimension()];
        self.report = None;
        info!(
            "Bound dataset {index}: dimension {}",
            self.objective.dimension()
        );
        Ok(())
    }

    /// Minimize the bound objective from the zero vector
    pub fn run(&mut self) -> Result<&SolverReport> {
        if !self.objective.is_bound() {
            return Err(ABCError::NotBound);
        }

        let start = vec![0.0; self.objective.dimension()];
        let report = self.solver.minimize(&self.objective, start)?;
        info!(
            "Solve finished: status {:?}, {} iterations, f={:.6e}",
            report.status, report.iterations, report.value
        );

        self.beta = report.x.clone();
        Ok(&*self.report.insert(report))
    }

    /// Solved coefficients, length (n+1)(k-1); zeros before `run`
    pub fn parameters(&self) -> &[f64] {
        &self.beta
    }

    /// Report of the last `run`, if any
    pub fn report(&self) -> Option<&SolverReport> {
        self.report.as_ref()
    }

    /// Index of the bound dataset
    pub fn bound_index(&self) -> Option<usize> {
        self.bound_index
    }

    /// Sorted raw labels of the bound dataset
    pub fn categories(&self) -> Result<&[i32]> {
        self.objective.categories()
    }

    pub fn objective(&self) -> &AngleObjective {
        &self.objective
    }

    pub fn config(&self) -> &ClassifierConfig {
        &self.config
    }
}
