//! Kernel selection from a configuration string
//!
//! Grammar (case-insensitive, whitespace separated):
//!
//! ```text
//! RBF  <sigma>
//! POLY <shift> <degree>
//! ```

use crate::core::{ABCError, Result};
use crate::kernel::{Kernel, PolynomialKernel, RBFKernel};
use std::fmt;
use std::str::FromStr;

/// The closed set of supported kernels, chosen once at construction
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum KernelSpec {
    Rbf(RBFKernel),
    Polynomial(PolynomialKernel),
}

fn parse_number(kernel: &str, name: &str, token: Option<&str>) -> Result<f64> {
    let token = token.ok_or_else(|| ABCError::InvalidKernelParameter {
        kernel: kernel.to_string(),
        reason: format!("missing {name}"),
    })?;
    token
        .parse::<f64>()
        .map_err(|_| ABCError::InvalidKernelParameter {
            kernel: kernel.to_string(),
            reason: format!("cannot parse {name} from '{token}'"),
        })
}

impl FromStr for KernelSpec {
    type Err = ABCError;

    fn from_str(s: &str) -> Result<Self> {
        let upper = s.to_uppercase();
        let mut tokens = upper.split_whitespace();

        match tokens.next() {
            Some("RBF") => {
                let sigma = parse_number("RBF", "sigma", tokens.next())?;
                Ok(KernelSpec::Rbf(RBFKernel::new(sigma)?))
            }
            Some("POLY") => {
                let shift = parse_number("POLY", "shift", tokens.next())?;
                let degree = parse_number("POLY", "degree", tokens.next())?;
                Ok(KernelSpec::Polynomial(PolynomialKernel::new(shift, degree)?))
            }
            Some(other) => Err(ABCError::UnsupportedKernel(other.to_string())),
            None => Err(ABCError::UnsupportedKernel(String::new())),
        }
    }
}

impl fmt::Display for KernelSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KernelSpec::Rbf(k) => write!(f, "RBF {}", k.sigma()),
            KernelSpec::Polynomial(k) => write!(f, "POLY {} {}", k.shift, k.degree),
        }
    }
}

impl Kernel for KernelSpec {
    #[inline]
    fn compute(&self, a: &[f64], b: &[f64], ncomp: usize) -> f64 {
        match self {
            KernelSpec::Rbf(k) => k.compute(a, b, ncomp),
            KernelSpec::Polynomial(k) => k.compute(a, b, ncomp),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_rbf() {
        let spec: KernelSpec = "RBF 0.5".parse().unwrap();
        assert_eq!(spec, KernelSpec::Rbf(RBFKernel::new(0.5).unwrap()));
    }

    #[test]
    fn test_parse_poly() {
        let spec: KernelSpec = "POLY 1.0 2".parse().unwrap();
        match spec {
            KernelSpec::Polynomial(k) => {
                assert_eq!(k.shift, 1.0);
                assert_eq!(k.degree, 2.0);
            }
            other => panic!("unexpected kernel {other:?}"),
        }
    }

    #[test]
    fn test_parse_is_case_insensitive() {
        assert!("rbf 2".parse::<KernelSpec>().is_ok());
        assert!("  Poly\t0 3  ".parse::<KernelSpec>().is_ok());
    }

    #[test]
    fn test_unsupported_kernel_name() {
        match "GAUSS 1.0".parse::<KernelSpec>() {
            Err(ABCError::UnsupportedKernel(name)) => assert_eq!(name, "GAUSS"),
            other => panic!("expected UnsupportedKernel, got {other:?}"),
        }
        assert!(matches!(
            "".parse::<KernelSpec>(),
            Err(ABCError::UnsupportedKernel(_))
        ));
    }

    #[test]
    fn test_bad_kernel_parameters() {
        for text in ["RBF", "RBF abc", "RBF 0", "POLY 1.0", "POLY x 2"] {
            assert!(
                matches!(
                    text.parse::<KernelSpec>(),
                    Err(ABCError::InvalidKernelParameter { .. })
                ),
                "{text} should be rejected"
            );
        }
    }

    #[test]
    fn test_display_roundtrip() {
        for text in ["RBF 0.25", "POLY 1 3"] {
            let spec: KernelSpec = text.parse().unwrap();
            let again: KernelSpec = spec.to_string().parse().unwrap();
            assert_eq!(spec, again);
        }
    }
}
