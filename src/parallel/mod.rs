//! Range partitioning and the worker pool shared by every parallel pass
//!
//! Work is always a flat index space `[0, total)` split into `nthreads`
//! contiguous ranges. The first `total % nthreads` ranges get one extra
//! unit, so the ranges tile the space exactly, in order, with no gaps or
//! overlaps. Workers receive the matching disjoint `&mut` slice of the
//! output buffer, which is what makes the hot loops lock-free.

use crate::core::{ABCError, Result};
use log::{debug, warn};
use rayon::{ThreadPool, ThreadPoolBuilder};
use std::ops::Range;

/// Hardware parallelism, or 1 when it cannot be queried
pub fn available_threads() -> usize {
    std::thread::available_parallelism()
        .map(|p| p.get())
        .unwrap_or(1)
}

/// Split `[0, total)` into `nworkers` contiguous ranges
///
/// Worker `tid` gets `total / nworkers` units, plus one more if
/// `tid < total % nworkers`. When `nworkers > total` the trailing ranges
/// are empty. A worker count of zero is treated as one.
pub fn partition(total: usize, nworkers: usize) -> Vec<Range<usize>> {
    let nworkers = nworkers.max(1);
    let per_worker = total / nworkers;
    let remainder = total % nworkers;

    (0..nworkers)
        .map(|tid| {
            if tid < remainder {
                let first = (per_worker + 1) * tid;
                first..first + per_worker + 1
            } else {
                let first = per_worker * tid + remainder;
                first..first + per_worker
            }
        })
        .collect()
}

/// Fixed-size worker pool, built once and reused by every evaluation
pub struct ParallelExecutor {
    pool: ThreadPool,
    nthreads: usize,
}

impl ParallelExecutor {
    /// Create a pool with `min(requested, available_threads())` workers
    pub fn new(requested: usize) -> Result<Self> {
        if requested == 0 {
            return Err(ABCError::InvalidParameter(
                "Worker count must be at least 1".to_string(),
            ));
        }

        let hardware = available_threads();
        let nthreads = requested.min(hardware);
        if nthreads < requested {
            warn!("Requested {requested} workers, clamped to hardware parallelism {hardware}");
        }

        let pool = ThreadPoolBuilder::new()
            .num_threads(nthreads)
            .thread_name(|i| format!("rabc-worker-{i}"))
            .build()
            .map_err(|e| ABCError::OptimizationError(format!("thread pool: {e}")))?;

        debug!("Worker pool ready with {nthreads} threads");
        Ok(Self { pool, nthreads })
    }

    /// Number of workers in the pool
    pub fn threads(&self) -> usize {
        self.nthreads
    }

    /// Partition `out` into per-worker slices and run `f` on each
    ///
    /// `f` receives the global index range of its slice and the slice
    /// itself. Returns once every worker has finished. A panic inside a
    /// worker is re-raised here after the others complete.
    pub fn for_each_range<T, F>(&self, out: &mut [T], f: F)
    where
        T: Send,
        F: Fn(Range<usize>, &mut [T]) + Sync,
    {
        let ranges = partition(out.len(), self.nthreads);
        let f = &f;

        self.pool.scope(|s| {
            let mut rest = out;
            for range in ranges {
                let (chunk, tail) = std::mem::take(&mut rest).split_at_mut(range.len());
                rest = tail;
                if chunk.is_empty() {
                    continue;
                }
                s.spawn(move |_| f(range, chunk));
            }
        });
    }
}

impl std::fmt::Debug for ParallelExecutor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ParallelExecutor")
            .field("nthreads", &self.nthreads)
            .finish()
    }
}
