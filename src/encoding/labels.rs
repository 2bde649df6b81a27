//! Dense rank encoding of raw category labels

use crate::core::{ABCError, Result};
use std::collections::BTreeSet;

/// Maps raw integer labels onto contiguous ranks `0..k`
///
/// Ranks follow the natural order of the distinct raw values, so the
/// encoding only depends on the set of labels observed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabelEncoder {
    categories: Vec<i32>,
}

impl LabelEncoder {
    /// Collect the distinct values of `raw` in ascending order
    pub fn fit(raw: &[i32]) -> Self {
        let unique: BTreeSet<i32> = raw.iter().copied().collect();
        Self {
            categories: unique.into_iter().collect(),
        }
    }

    /// Number of distinct categories
    pub fn k(&self) -> usize {
        self.categories.len()
    }

    /// Sorted distinct raw labels; index = rank
    pub fn categories(&self) -> &[i32] {
        &self.categories
    }

    /// Rank of a raw label, if it was seen by `fit`
    pub fn rank(&self, raw: i32) -> Option<usize> {
        self.categories.binary_search(&raw).ok()
    }

    /// Map every raw label to its rank
    pub fn transform(&self, raw: &[i32]) -> Result<Vec<usize>> {
        raw.iter()
            .map(|&v| {
                self.rank(v).ok_or_else(|| {
                    ABCError::InvalidDataset(format!("Unknown category label: {v}"))
                })
            })
            .collect()
    }
}
