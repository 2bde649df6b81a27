//! Error types for the angle-based classifier

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ABCError {
    #[error("Unsupported kernel type: {0}")]
    UnsupportedKernel(String),

    #[error("Invalid {kernel} kernel parameter: {reason}")]
    InvalidKernelParameter { kernel: String, reason: String },

    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("Dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("No dataset bound to the objective")]
    NotBound,

    #[error("Invalid dataset: {0}")]
    InvalidDataset(String),

    #[error("Empty dataset")]
    EmptyDataset,

    #[error("Dataset index {index} out of range (have {len})")]
    DatasetIndexOutOfRange { index: usize, len: usize },

    #[error("Optimization failed: {0}")]
    OptimizationError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

pub type Result<T> = std::result::Result<T, ABCError>;
