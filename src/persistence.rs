//! Solution serialization and persistence
//!
//! Saves the solved coefficient vector together with what is needed to
//! interpret it (category labels, sample count, kernel) for use by the CLI.

use crate::api::AngleBasedClassifier;
use crate::core::{ABCError, Result};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;

/// Serializable representation of a solved classifier
#[derive(Debug, Serialize, Deserialize)]
pub struct SerializableSolution {
    /// Flattened (n+1) x (k-1) coefficients, one block per simplex axis
    pub coefficients: Vec<f64>,
    /// Sorted raw category labels; position = rank
    pub categories: Vec<i32>,
    /// Number of training samples
    pub nsample: usize,
    /// Kernel configuration string
    pub kernel: String,
    /// Solution metadata
    pub metadata: SolutionMetadata,
}

/// Solution metadata for tracking and validation
#[derive(Debug, Serialize, Deserialize)]
pub struct SolutionMetadata {
    /// Library version used to create the solution
    pub library_version: String,
    /// Solver iterations
    pub iterations: usize,
    /// Final objective value
    pub objective_value: f64,
    /// Solver stop reason
    pub status: String,
    /// Training parameters used
    pub training_params: TrainingParams,
    /// Creation timestamp
    pub created_at: String,
}

/// Training parameters for reference
#[derive(Debug, Serialize, Deserialize)]
pub struct TrainingParams {
    pub c: f64,
    pub lambda: f64,
    pub epsilon: f64,
    pub max_iterations: usize,
    pub memory: usize,
}

impl SerializableSolution {
    /// Capture the state of a classifier after `run`
    pub fn from_classifier(abc: &AngleBasedClassifier) -> Result<Self> {
        let report = abc.report().ok_or_else(|| {
            ABCError::OptimizationError("Classifier has not been run".to_string())
        })?;
        let config = abc.config();
        let objective = abc.objective();

        Ok(Self {
            coefficients: abc.parameters().to_vec(),
            categories: objective.categories()?.to_vec(),
            nsample: objective.nsample()?,
            kernel: objective.kernel().to_string(),
            metadata: SolutionMetadata {
                library_version: crate::VERSION.to_string(),
                iterations: report.iterations,
                objective_value: report.value,
                status: format!("{:?}", report.status),
                training_params: TrainingParams {
                    c: config.c,
                    lambda: config.lambda,
                    epsilon: config.solver.epsilon,
                    max_iterations: config.solver.max_iterations,
                    memory: config.solver.memory,
                },
                created_at: chrono::Utc::now().to_rfc3339(),
            },
        })
    }

    /// Number of categories
    pub fn k(&self) -> usize {
        self.categories.len()
    }

    /// Check that the coefficient count matches (n+1)(k-1)
    pub fn validate(&self) -> Result<()> {
        let expected = (self.nsample + 1) * self.k().saturating_sub(1);
        if self.coefficients.len() != expected {
            return Err(ABCError::DimensionMismatch {
                expected,
                actual: self.coefficients.len(),
            });
        }
        Ok(())
    }

    /// Save solution to file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let file = File::create(path).map_err(ABCError::IoError)?;
        let writer = BufWriter::new(file);
        serde_json::to_writer_pretty(writer, self)
            .map_err(|e| ABCError::SerializationError(e.to_string()))?;
        Ok(())
    }

    /// Load solution from file
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(path).map_err(ABCError::IoError)?;
        let reader = BufReader::new(file);
        let solution: Self = serde_json::from_reader(reader)
            .map_err(|e| ABCError::SerializationError(e.to_string()))?;
        solution.validate()?;
        Ok(solution)
    }

    /// Print solution summary
    pub fn print_summary(&self) {
        println!("=== Angle-Based Classifier Solution ===");
        println!("Kernel: {}", self.kernel);
        println!("Categories: {:?}", self.categories);
        println!("Samples: {}", self.nsample);
        println!("Coefficients: {}", self.coefficients.len());
        println!("Objective: {:.6e}", self.metadata.objective_value);
        println!(
            "Solver: {} after {} iterations",
            self.metadata.status, self.metadata.iterations
        );
        println!("Library Version: {}", self.metadata.library_version);
        println!("Created: {}", self.metadata.created_at);
        println!("Training Parameters:");
        println!("  c: {}", self.metadata.training_params.c);
        println!("  lambda: {}", self.metadata.training_params.lambda);
        println!("  epsilon: {}", self.metadata.training_params.epsilon);
        println!(
            "  Max Iterations: {}",
            self.metadata.training_params.max_iterations
        );
        println!("  Memory: {}", self.metadata.training_params.memory);
    }
}
