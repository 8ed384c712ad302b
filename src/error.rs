use std::error::Error;
use std::fmt;

/// Errors reported by model training, prediction and tuning.
#[derive(Debug, Clone, PartialEq)]
pub enum ModelError {
    /// `train` was called with zero samples.
    EmptyTrainingSet,
    /// The label slice does not match the number of samples.
    LabelCountMismatch { samples: usize, labels: usize },
    /// A query sample's dimensionality differs from the training set's.
    DimensionMismatch { expected: usize, got: usize },
    /// `predict`/`predict_scores` called before a successful `train`.
    NotTrained,
    /// The underlying solver produced an unusable result.
    Solver(String),
}

impl fmt::Display for ModelError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ModelError::EmptyTrainingSet => write!(f, "training set is empty"),
            ModelError::LabelCountMismatch { samples, labels } => write!(
                f,
                "got {} labels for {} samples; lengths must match",
                labels, samples
            ),
            ModelError::DimensionMismatch { expected, got } => write!(
                f,
                "sample has {} features but the model was trained on {}",
                got, expected
            ),
            ModelError::NotTrained => write!(f, "model has not been trained"),
            ModelError::Solver(msg) => write!(f, "solver failure: {}", msg),
        }
    }
}

impl Error for ModelError {}
