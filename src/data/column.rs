//! In-memory column store implementing the Dataset trait

use crate::core::{ABCError, Dataset, Result};
use serde::{Deserialize, Serialize};

/// Column-wise dataset with continuous, ordinal and nominal features
///
/// The struct is (de)serialisable so it can be handed to the CLI as JSON.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ColumnDataset {
    #[serde(default)]
    pub continuous: Vec<Vec<f64>>,
    #[serde(default)]
    pub ordinal: Vec<Vec<i32>>,
    #[serde(default)]
    pub nominal: Vec<Vec<i32>>,
    /// Raw outcome per sample; its sign selects the target side
    pub response: Vec<f64>,
    /// Inclusion probability per sample
    pub probability: Vec<f64>,
    /// Raw category label per sample
    pub category: Vec<i32>,
}

impl ColumnDataset {
    /// Create a dataset with no feature columns yet
    pub fn new(response: Vec<f64>, probability: Vec<f64>, category: Vec<i32>) -> Self {
        Self {
            response,
            probability,
            category,
            ..Self::default()
        }
    }

    /// Append a continuous column
    pub fn with_continuous(mut self, column: Vec<f64>) -> Self {
        self.continuous.push(column);
        self
    }

    /// Append an ordinal column
    pub fn with_ordinal(mut self, column: Vec<i32>) -> Self {
        self.ordinal.push(column);
        self
    }

    /// Append a nominal column
    pub fn with_nominal(mut self, column: Vec<i32>) -> Self {
        self.nominal.push(column);
        self
    }

    /// Check shape and value constraints
    pub fn validate(&self) -> Result<()> {
        validate_dataset(self)
    }
}

/// Check that every column has `nsample` entries and that the response
/// weights resp / prob are well defined
pub fn validate_dataset<D: Dataset + ?Sized>(data: &D) -> Result<()> {
    let n = data.nsample();
    if n == 0 {
        return Err(ABCError::EmptyDataset);
    }

    let check = |what: &str, len: usize| {
        if len == n {
            Ok(())
        } else {
            Err(ABCError::InvalidDataset(format!(
                "{what} has {len} entries, expected {n}"
            )))
        }
    };

    check("response", data.resp().len())?;
    check("probability", data.prob().len())?;
    check("category", data.act().len())?;
    for i in 0..data.ncont() {
        check(&format!("continuous column {i}"), data.cont(i).len())?;
    }
    for i in 0..data.nord() {
        check(&format!("ordinal column {i}"), data.ord(i).len())?;
    }
    for i in 0..data.nnom() {
        check(&format!("nominal column {i}"), data.nom(i).len())?;
    }

    if let Some((i, p)) = data
        .prob()
        .iter()
        .enumerate()
        .find(|(_, p)| !p.is_finite() || **p == 0.0)
    {
        return Err(ABCError::InvalidDataset(format!(
            "inclusion probability of sample {i} must be finite and non-zero, got {p}"
        )));
    }

    if let Some((i, r)) = data.resp().iter().enumerate().find(|(_, r)| !r.is_finite()) {
        return Err(ABCError::InvalidDataset(format!(
            "response of sample {i} is not finite: {r}"
        )));
    }

    Ok(())
}

impl Dataset for ColumnDataset {
    fn nsample(&self) -> usize {
        self.response.len()
    }

    fn ncont(&self) -> usize {
        self.continuous.len()
    }

    fn nord(&self) -> usize {
        self.ordinal.len()
    }

    fn nnom(&self) -> usize {
        self.nominal.len()
    }

    fn cont(&self, i: usize) -> &[f64] {
        &self.continuous[i]
    }

    fn ord(&self, i: usize) -> &[i32] {
        &self.ordinal[i]
    }

    fn nom(&self, i: usize) -> &[i32] {
        &self.nominal[i]
    }

    fn resp(&self) -> &[f64] {
        &self.response
    }

    fn prob(&self) -> &[f64] {
        &self.probability
    }

    fn act(&self) -> &[i32] {
        &self.category
    }
}
