//! Feature assembly and parallel Gram matrix construction
//!
//! The upper triangle (diagonal included) has n(n+1)/2 cells. They are
//! ranked row by row: cell (i, j), j >= i, has rank
//! `row_offset(i) + (j - i)` where `row_offset(i) = i*n - i*(i-1)/2`.
//! Workers fill contiguous rank ranges of a packed triangle buffer, then a
//! second pass mirrors the packed values into the dense n x n matrix.

use crate::core::{ABCError, Dataset, Result};
use crate::kernel::Kernel;
use crate::parallel::ParallelExecutor;
use log::debug;

/// Row-major n x m feature matrix
///
/// Columns are continuous, then ordinal, then nominal. The first `ncomp`
/// columns are numeric; the remaining ones are nominal codes.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureMatrix {
    nsample: usize,
    nvar: usize,
    ncomp: usize,
    data: Vec<f64>,
}

impl FeatureMatrix {
    /// Transpose the column-wise dataset into row-major storage
    ///
    /// No normalization is applied.
    pub fn from_dataset<D: Dataset + ?Sized>(data: &D) -> Self {
        let nsample = data.nsample();
        let (ncont, nord, nnom) = (data.ncont(), data.nord(), data.nnom());
        let nvar = ncont + nord + nnom;
        let mut values = vec![0.0; nsample * nvar];

        for c in 0..ncont {
            for (j, &v) in data.cont(c).iter().enumerate() {
                values[j * nvar + c] = v;
            }
        }
        for c in 0..nord {
            for (j, &v) in data.ord(c).iter().enumerate() {
                values[j * nvar + ncont + c] = f64::from(v);
            }
        }
        for c in 0..nnom {
            for (j, &v) in data.nom(c).iter().enumerate() {
                values[j * nvar + ncont + nord + c] = f64::from(v);
            }
        }

        Self {
            nsample,
            nvar,
            ncomp: ncont + nord,
            data: values,
        }
    }

    /// Build directly from row-major values, the first `ncomp` columns
    /// of each row numeric and the rest nominal codes
    pub fn from_rows(nsample: usize, nvar: usize, ncomp: usize, data: Vec<f64>) -> Result<Self> {
        if data.len() != nsample * nvar {
            return Err(ABCError::InvalidDataset(format!(
                "{} feature values for {nsample} rows of {nvar} columns",
                data.len()
            )));
        }
        if ncomp > nvar {
            return Err(ABCError::InvalidDataset(format!(
                "{ncomp} numeric columns exceed {nvar} columns"
            )));
        }
        Ok(Self {
            nsample,
            nvar,
            ncomp,
            data,
        })
    }

    pub fn nsample(&self) -> usize {
        self.nsample
    }

    pub fn nvar(&self) -> usize {
        self.nvar
    }

    /// Number of numeric (continuous + ordinal) columns
    pub fn ncomp(&self) -> usize {
        self.ncomp
    }

    /// Features of sample `i`
    pub fn row(&self, i: usize) -> &[f64] {
        &self.data[i * self.nvar..(i + 1) * self.nvar]
    }
}

/// Dense symmetric n x n kernel matrix, immutable once built
#[derive(Debug, Clone, PartialEq)]
pub struct GramMatrix {
    n: usize,
    data: Vec<f64>,
}

impl GramMatrix {
    /// Evaluate `kernel` over every pair of samples in parallel
    pub fn build<K: Kernel + ?Sized>(
        features: &FeatureMatrix,
        kernel: &K,
        executor: &ParallelExecutor,
    ) -> Self {
        let n = features.nsample();
        let ncomp = features.ncomp();
        let total = triangle_size(n);
        debug!(
            "Building {n}x{n} Gram matrix ({total} cells) on {} workers",
            executor.threads()
        );

        let mut packed = vec![0.0; total];
        executor.for_each_range(&mut packed, |range, cells| {
            let (mut i, mut j) = triangle_coords(range.start, n);
            for cell in cells.iter_mut() {
                *cell = kernel.compute(features.row(i), features.row(j), ncomp);
                j += 1;
                if j == n {
                    i += 1;
                    j = i;
                }
            }
        });

        let mut data = vec![0.0; n * n];
        executor.for_each_range(&mut data, |range, cells| {
            for (cell, idx) in cells.iter_mut().zip(range) {
                let (i, j) = (idx / n, idx % n);
                let (lo, hi) = if i <= j { (i, j) } else { (j, i) };
                *cell = packed[triangle_rank(lo, hi, n)];
            }
        });

        Self { n, data }
    }

    /// Number of samples
    pub fn n(&self) -> usize {
        self.n
    }

    /// K[i, j]
    pub fn get(&self, i: usize, j: usize) -> f64 {
        self.data[i * self.n + j]
    }

    /// Row `i` of the matrix
    pub fn row(&self, i: usize) -> &[f64] {
        &self.data[i * self.n..(i + 1) * self.n]
    }

    /// Row-major storage
    pub fn as_slice(&self) -> &[f64] {
        &self.data
    }
}

/// Number of cells in the upper triangle of an n x n matrix
pub fn triangle_size(n: usize) -> usize {
    n * (n + 1) / 2
}

/// First rank of row `i` in the upper triangle
fn row_offset(i: usize, n: usize) -> usize {
    i * n - i * i.saturating_sub(1) / 2
}

/// Rank of upper-triangle cell (i, j), j >= i
pub fn triangle_rank(i: usize, j: usize, n: usize) -> usize {
    debug_assert!(i <= j && j < n);
    row_offset(i, n) + (j - i)
}

/// Recover (row, col) of an upper-triangle rank by walking row boundaries
///
/// A rank equal to `triangle_size(n)` maps to (n, n), one past the end.
pub fn triangle_coords(rank: usize, n: usize) -> (usize, usize) {
    let mut first = 0;
    for i in 0..n {
        let len = n - i;
        if rank < first + len {
            return (i, i + rank - first);
        }
        first += len;
    }
    (n, n)
}
