use ndarray::Array2;

use crate::error::ModelError;

/// Uniform contract for trainable models: train on a sample matrix with one
/// integer label per row, then answer per-sample queries. Adapters own their
/// model exclusively and replace it wholesale on retrain; callers serialize
/// access when sharing an adapter across threads.
pub trait Classifier {
    /// Fit the model. Fails fast on an empty sample set or a label/sample
    /// length mismatch. Destructive: a prior model is replaced, not restored
    /// on failure of a later training stage.
    fn train(&mut self, x: &Array2<f64>, y: &[i32]) -> Result<(), ModelError>;

    /// Predict a single value for one sample: the original-space class label
    /// for classifiers, the raw decision output for regressor-like models.
    /// Errors with `NotTrained` before a successful `train` and with
    /// `DimensionMismatch` on a wrong sample length.
    fn predict(&self, sample: &[f64]) -> Result<f64, ModelError>;

    /// Per-class decision scores. With exactly two classes this collapses to
    /// a single-element vector equal to `predict`'s output.
    fn predict_scores(&self, sample: &[f64]) -> Result<Vec<f64>, ModelError>;

    /// Multi-line human-readable summary of the trained model, `None` when
    /// untrained.
    fn info(&self) -> Option<String>;

    /// Optional human readable name for the model.
    fn name(&self) -> &str {
        "classifier"
    }
}
