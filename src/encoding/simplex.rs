//! Regular simplex vertex encoding of class ranks
//!
//! Class rank `r` of `k` is represented by vertex `r` of a centred regular
//! (k-1)-simplex with unit-norm vertices:
//!
//! - vertex 0 = c1 * 1
//! - vertex j = c2 * 1 + c3 * e_{j-1}, for j = 1..k-1
//!
//! with c1 = 1/sqrt(k-1), c2 = -(1+sqrt(k)) * c1^3, c3 = sqrt(k) * c1.
//!
//! Two layouts are kept. `w` is k x (k-1), one vertex per row, and is used
//! to read out a sample's projection. `wt` is its (k-1) x k transpose, one
//! simplex axis per row, and is used when accumulating the gradient.

use crate::core::{ABCError, Result};

/// Vertex matrices for `k` classes
#[derive(Debug, Clone, PartialEq)]
pub struct SimplexVertices {
    k: usize,
    w: Vec<f64>,
    wt: Vec<f64>,
}

impl SimplexVertices {
    /// Build both layouts for `k >= 2` classes
    pub fn new(k: usize) -> Result<Self> {
        if k < 2 {
            return Err(ABCError::InvalidParameter(format!(
                "At least 2 categories are required, got {k}"
            )));
        }

        let kf = k as f64;
        let c1 = 1.0 / (kf - 1.0).sqrt();
        let c2 = -(1.0 + kf.sqrt()) * c1.powf(3.0);
        let c3 = kf.sqrt() * c1;

        let size = k * (k - 1);

        let mut w = vec![c2; size];
        w[..k - 1].fill(c1);
        for j in 1..k {
            // row j, column j - 1
            w[j * k - 1] += c3;
        }

        let mut wt = vec![c2; size];
        for j in 0..k - 1 {
            wt[j * k] = c1;
            wt[j * k + j + 1] += c3;
        }

        Ok(Self { k, w, wt })
    }

    /// Number of classes
    pub fn k(&self) -> usize {
        self.k
    }

    /// Dimension of the simplex, k - 1
    pub fn naxis(&self) -> usize {
        self.k - 1
    }

    /// Coordinates of the vertex for class `rank` (length k - 1)
    pub fn vertex(&self, rank: usize) -> &[f64] {
        let d = self.k - 1;
        &self.w[rank * d..(rank + 1) * d]
    }

    /// Coordinate `axis` of every vertex, indexed by rank (length k)
    pub fn axis(&self, axis: usize) -> &[f64] {
        &self.wt[axis * self.k..(axis + 1) * self.k]
    }

    /// Row-major k x (k-1) vertex matrix
    pub fn w(&self) -> &[f64] {
        &self.w
    }

    /// Row-major (k-1) x k companion matrix
    pub fn wt(&self) -> &[f64] {
        &self.wt
    }
}
