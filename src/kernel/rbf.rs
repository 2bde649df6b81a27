//! RBF (Radial Basis Function) kernel implementation
//!
//! K(a, b) = exp(coef * (Σ_numeric (a_k - b_k)² + Σ_nominal 1[a_k = b_k]))
//! with coef = -1 / (2σ²).

use crate::core::{ABCError, Result};
use crate::kernel::traits::{nominal_matches, Kernel};

/// RBF kernel parameterised by its bandwidth σ
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RBFKernel {
    sigma: f64,
    coef: f64,
}

impl RBFKernel {
    /// Create a new RBF kernel with bandwidth `sigma`
    ///
    /// # Errors
    /// Returns `InvalidKernelParameter` if sigma is zero or not finite
    pub fn new(sigma: f64) -> Result<Self> {
        if !sigma.is_finite() || sigma == 0.0 {
            return Err(ABCError::InvalidKernelParameter {
                kernel: "RBF".to_string(),
                reason: format!("sigma must be finite and non-zero, got {sigma}"),
            });
        }

        Ok(Self {
            sigma,
            coef: -1.0 / 2.0 / sigma / sigma,
        })
    }

    /// Get the bandwidth
    pub fn sigma(&self) -> f64 {
        self.sigma
    }

    /// Get the exponent scale -1/(2σ²)
    pub fn coef(&self) -> f64 {
        self.coef
    }
}

impl Kernel for RBFKernel {
    fn compute(&self, a: &[f64], b: &[f64], ncomp: usize) -> f64 {
        let (a_num, a_nom) = a.split_at(ncomp);
        let (b_num, b_nom) = b.split_at(ncomp);

        let squared_distance: f64 = a_num
            .iter()
            .zip(b_num)
            .map(|(x, y)| (x - y) * (x - y))
            .sum();

        ((squared_distance + nominal_matches(a_nom, b_nom)) * self.coef).exp()
    }
}
