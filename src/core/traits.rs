//! Core traits: the dataset provider and the objective contract

use crate::core::Result;

/// Column-wise dataset provider consumed by the objective
///
/// Every column and every per-sample array has length `nsample()`.
pub trait Dataset: Send + Sync {
    /// Number of samples
    fn nsample(&self) -> usize;

    /// Number of continuous feature columns
    fn ncont(&self) -> usize;

    /// Number of ordinal feature columns
    fn nord(&self) -> usize;

    /// Number of nominal feature columns
    fn nnom(&self) -> usize;

    /// Continuous column `i`
    ///
    /// # Panics
    /// Panics if i >= ncont()
    fn cont(&self, i: usize) -> &[f64];

    /// Ordinal column `i`
    ///
    /// # Panics
    /// Panics if i >= nord()
    fn ord(&self, i: usize) -> &[i32];

    /// Nominal column `i`
    ///
    /// # Panics
    /// Panics if i >= nnom()
    fn nom(&self, i: usize) -> &[i32];

    /// Raw response values
    fn resp(&self) -> &[f64];

    /// Raw inclusion probabilities
    fn prob(&self) -> &[f64];

    /// Raw category labels
    fn act(&self) -> &[i32];

    /// Total number of feature columns
    fn nvar(&self) -> usize {
        self.ncont() + self.nord() + self.nnom()
    }

    /// Check if the dataset is empty
    fn is_empty(&self) -> bool {
        self.nsample() == 0
    }
}

/// Differentiable objective consumed by the solver
///
/// Every `x` passed in must have length `dimension()`.
pub trait Objective: Send + Sync {
    /// Number of optimization variables
    fn dimension(&self) -> usize;

    /// Objective value at `x`
    fn value(&self, x: &[f64]) -> Result<f64>;

    /// Write the gradient at `x` into `g`
    fn gradient(&self, x: &[f64], g: &mut [f64]) -> Result<()>;

    /// Value and gradient from a single pass
    fn value_and_gradient(&self, x: &[f64], g: &mut [f64]) -> Result<f64>;
}
