//! Label remapping and training-input validation.
//!
//! Arbitrary integer class labels are remapped to a dense contiguous index
//! space `[0, class_count)` in first-seen order; the inverse map translates
//! dense predictions back to the original label space.

use std::collections::HashMap;

use ndarray::Array2;

use crate::error::ModelError;

/// Insertion-ordered bijection between observed labels and dense indices.
///
/// Only valid for the training set it was fitted on; adapters rebuild it on
/// every retrain.
#[derive(Debug, Clone, Default)]
pub struct LabelMap {
    forward: HashMap<i32, usize>,
    inverse: Vec<i32>,
}

impl LabelMap {
    /// Assign dense indices to labels in first-seen order.
    pub fn fit(labels: &[i32]) -> Self {
        let mut forward = HashMap::new();
        let mut inverse = Vec::new();
        for &label in labels {
            if !forward.contains_key(&label) {
                forward.insert(label, inverse.len());
                inverse.push(label);
            }
        }
        LabelMap { forward, inverse }
    }

    pub fn class_count(&self) -> usize {
        self.inverse.len()
    }

    pub fn index_of(&self, label: i32) -> Option<usize> {
        self.forward.get(&label).copied()
    }

    /// Original label for a dense index. Panics if `index` is out of range;
    /// dense indices produced by the solver are always in `[0, class_count)`.
    pub fn original(&self, index: usize) -> i32 {
        self.inverse[index]
    }

    /// Observed labels in insertion order.
    pub fn labels(&self) -> &[i32] {
        &self.inverse
    }

    /// Translate a label slice into dense indices. Labels not seen during
    /// `fit` are absent from the map, so this is only called on the fitted
    /// training labels.
    pub fn remap(&self, labels: &[i32]) -> Vec<usize> {
        labels.iter().map(|l| self.forward[l]).collect()
    }
}

/// Fail-fast checks shared by all adapters. Returns the feature dimension.
pub fn check_training_input(x: &Array2<f64>, y: &[i32]) -> Result<usize, ModelError> {
    if x.nrows() == 0 {
        return Err(ModelError::EmptyTrainingSet);
    }
    if y.len() != x.nrows() {
        return Err(ModelError::LabelCountMismatch {
            samples: x.nrows(),
            labels: y.len(),
        });
    }
    Ok(x.ncols())
}
