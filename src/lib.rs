//! Kernel angle-based multicategory classification
//!
//! Classes are encoded as vertices of a centred regular simplex and a
//! smooth margin loss is minimized over kernel-expanded coefficients with
//! a limited-memory quasi-Newton solver. The Gram matrix, loss and gradient
//! passes run on a fixed worker pool over disjoint index ranges.

pub mod api;
pub mod core;
pub mod data;
pub mod encoding;
pub mod kernel;
pub mod loss;
pub mod objective;
pub mod parallel;
pub mod persistence;
pub mod solver;

// Re-export main types for convenience
pub use crate::api::{AngleBasedClassifier, ClassifierBuilder};
pub use crate::core::traits::*;
pub use crate::core::types::*;
pub use crate::core::{ABCError, Result};
pub use crate::data::ColumnDataset;
pub use crate::encoding::{LabelEncoder, SimplexVertices};
pub use crate::kernel::{GramMatrix, Kernel, KernelSpec};
pub use crate::loss::MarginLoss;
pub use crate::objective::AngleObjective;
pub use crate::parallel::{partition, ParallelExecutor};
pub use crate::solver::{LbfgsSolver, SolverReport, SolverStatus};

// Version info
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
