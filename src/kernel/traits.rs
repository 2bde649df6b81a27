//! Kernel trait definition

/// Kernel function over two rows of the assembled feature matrix
///
/// Each row holds `ncomp` numeric (continuous then ordinal) entries
/// followed by the nominal codes cast to `f64`. Nominal entries never
/// enter a numeric distance; they contribute through equality only.
pub trait Kernel: Send + Sync {
    /// Compute kernel value K(a, b)
    fn compute(&self, a: &[f64], b: &[f64], ncomp: usize) -> f64;
}

/// Number of nominal positions where `a` and `b` carry the same code
pub(crate) fn nominal_matches(a: &[f64], b: &[f64]) -> f64 {
    a.iter().zip(b).filter(|(x, y)| x == y).count() as f64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nominal_matches() {
        assert_eq!(nominal_matches(&[1.0, 2.0, 3.0], &[1.0, 0.0, 3.0]), 2.0);
        assert_eq!(nominal_matches(&[], &[]), 0.0);
    }
}
