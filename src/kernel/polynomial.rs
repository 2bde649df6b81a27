//! Polynomial Kernel Implementation
//!
//! K(a, b) = (<a, b>_numeric + Σ_nominal 1[a_k = b_k] + shift)^degree
//!
//! The degree is a real exponent; integral degrees are the usual choice.

use crate::core::{ABCError, Result};
use crate::kernel::traits::{nominal_matches, Kernel};

/// Polynomial kernel with a shift and a degree
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PolynomialKernel {
    /// Constant added to the inner product
    pub shift: f64,
    /// Exponent
    pub degree: f64,
}

impl PolynomialKernel {
    /// Creates a new polynomial kernel
    ///
    /// # Errors
    /// Returns `InvalidKernelParameter` if either parameter is not finite
    pub fn new(shift: f64, degree: f64) -> Result<Self> {
        if !shift.is_finite() || !degree.is_finite() {
            return Err(ABCError::InvalidKernelParameter {
                kernel: "POLY".to_string(),
                reason: format!("shift and degree must be finite, got {shift} and {degree}"),
            });
        }
        Ok(Self { shift, degree })
    }
}

impl Kernel for PolynomialKernel {
    fn compute(&self, a: &[f64], b: &[f64], ncomp: usize) -> f64 {
        let (a_num, a_nom) = a.split_at(ncomp);
        let (b_num, b_nom) = b.split_at(ncomp);

        let dot: f64 = a_num.iter().zip(b_num).map(|(x, y)| x * y).sum();
        (dot + nominal_matches(a_nom, b_nom) + self.shift).powf(self.degree)
    }
}
