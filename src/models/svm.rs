use log::info;
use ndarray::Array2;

use crate::config::{KernelFamily, SvmConfig};
use crate::data::{check_training_input, LabelMap};
use crate::error::ModelError;
use crate::models::classifier_trait::Classifier;
use crate::svm::{SvmModel, SvmProblem};
use crate::tuning::{self, TuneReport};

/// SVM adapter: dense label remap, one-vs-one training via the SMO solver,
/// optional kernel hyperparameter tuning after the initial fit.
pub struct SvmClassifier {
    config: SvmConfig,
    model: Option<SvmModel>,
    labels: LabelMap,
    dim: usize,
    tune_report: Option<TuneReport>,
}

impl SvmClassifier {
    pub fn new(config: SvmConfig) -> Self {
        SvmClassifier {
            config,
            model: None,
            labels: LabelMap::default(),
            dim: 0,
            tune_report: None,
        }
    }

    /// Assign regularization and kernel parameters. Values are taken as
    /// given, without validation; each kernel family reads only its own
    /// fields. Does not retrain.
    pub fn set_params(&mut self, c: f64, kernel: KernelFamily) {
        self.config.c = c;
        self.config.kernel = kernel;
    }

    pub fn config(&self) -> &SvmConfig {
        &self.config
    }

    /// What the tuner did during the last `train`, if tuning was enabled.
    pub fn tune_report(&self) -> Option<&TuneReport> {
        self.tune_report.as_ref()
    }

    /// Dual objective of the current model, the tuner's quality score.
    pub fn dual_objective(&self) -> Option<f64> {
        self.model.as_ref().map(|m| m.dual_objective())
    }

    /// Train with a cancellation hook polled between tuner evaluations. The
    /// initial fit itself is not interruptible; a cancelled tuning pass
    /// leaves the freshly fitted model in place and reports `Aborted`.
    pub fn train_with_cancel<C>(
        &mut self,
        x: &Array2<f64>,
        y: &[i32],
        cancel: C,
    ) -> Result<(), ModelError>
    where
        C: FnMut() -> bool,
    {
        let dim = check_training_input(x, y)?;
        let labels = LabelMap::fit(y);
        let dense = labels.remap(y);
        let problem = SvmProblem::new(x, dense, labels.class_count());

        let mut model = SvmModel::train(&problem, &self.config);
        self.tune_report = None;
        if self.config.optimize {
            let outcome = tuning::tune(&problem, &self.config, cancel);
            if let Some((kernel, tuned)) = outcome.adopted {
                self.config.kernel = kernel;
                model = tuned;
            }
            self.tune_report = Some(outcome.report);
        }

        info!(
            "trained SVM on {} samples: {} classes, {} support vectors",
            x.nrows(),
            labels.class_count(),
            model.support_count()
        );

        self.model = Some(model);
        self.labels = labels;
        self.dim = dim;
        Ok(())
    }

    fn check_sample(&self, sample: &[f64]) -> Result<&SvmModel, ModelError> {
        let model = self.model.as_ref().ok_or(ModelError::NotTrained)?;
        if sample.len() != self.dim {
            return Err(ModelError::DimensionMismatch {
                expected: self.dim,
                got: sample.len(),
            });
        }
        Ok(model)
    }
}

impl Classifier for SvmClassifier {
    fn train(&mut self, x: &Array2<f64>, y: &[i32]) -> Result<(), ModelError> {
        self.train_with_cancel(x, y, || false)
    }

    fn predict(&self, sample: &[f64]) -> Result<f64, ModelError> {
        let model = self.check_sample(sample)?;
        let dense = model.predict(sample);
        Ok(self.labels.original(dense) as f64)
    }

    /// Scores indexed by original label value, length `max_observed_label + 1`.
    /// Slots for unobserved labels stay zero; negative labels cannot be
    /// scattered and are skipped. Two-class models collapse to a single
    /// element equal to `predict`'s output.
    fn predict_scores(&self, sample: &[f64]) -> Result<Vec<f64>, ModelError> {
        let model = self.check_sample(sample)?;
        if model.class_count() == 2 {
            return Ok(vec![self.predict(sample)?]);
        }

        let max_label = self.labels.labels().iter().copied().max().unwrap_or(0);
        let mut scores = vec![0.0; max_label.max(0) as usize + 1];
        for (dense, &v) in model.votes(sample).iter().enumerate() {
            let original = self.labels.original(dense);
            if original >= 0 {
                scores[original as usize] = v;
            }
        }
        Ok(scores)
    }

    fn info(&self) -> Option<String> {
        let model = self.model.as_ref()?;
        let mut text = String::from("C-SVM\n");
        match &self.config.kernel {
            KernelFamily::Linear => text.push_str("Kernel: linear\n"),
            KernelFamily::Polynomial {
                degree,
                gamma,
                coef0,
            } => text.push_str(&format!(
                "Kernel: polynomial (deg: {} bias: {:.3} width: {:.6})\n",
                degree.round() as i64,
                coef0,
                gamma
            )),
            KernelFamily::Rbf { gamma } => {
                text.push_str(&format!("Kernel: rbf (gamma: {:.6})\n", gamma))
            }
            KernelFamily::Sigmoid { gamma, coef0 } => {
                text.push_str(&format!("Kernel: sigmoid ({:.6} {:.6})\n", gamma, coef0))
            }
            KernelFamily::RbfWeighted { gamma, weights } => text.push_str(&format!(
                "Kernel: weighted rbf (gamma: {:.6}, {} weights)\n",
                gamma,
                weights.len()
            )),
        }
        text.push_str(&format!("C: {:.6}\n", self.config.c));
        text.push_str(&format!("Classes: {}\n", model.class_count()));
        text.push_str(&format!("Support Vectors: {}\n", model.support_count()));
        Some(text)
    }

    fn name(&self) -> &str {
        "svm"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    fn two_cluster_data() -> (Array2<f64>, Vec<i32>) {
        (
            array![[0.0, 0.0], [1.0, 1.0], [5.0, 5.0], [6.0, 6.0]],
            vec![0, 0, 1, 1],
        )
    }

    #[test]
    fn rbf_default_separates_two_clusters() {
        let (x, y) = two_cluster_data();
        let mut clf = SvmClassifier::new(SvmConfig::default());
        clf.train(&x, &y).unwrap();

        assert_eq!(clf.predict(&[0.1, 0.1]).unwrap(), 0.0);
        assert_eq!(clf.predict(&[5.9, 5.9]).unwrap(), 1.0);
    }

    #[test]
    fn untrained_queries_error_instead_of_guessing() {
        let clf = SvmClassifier::new(SvmConfig::default());
        assert_eq!(clf.predict(&[0.0, 0.0]), Err(ModelError::NotTrained));
        assert_eq!(clf.predict_scores(&[0.0, 0.0]), Err(ModelError::NotTrained));
        assert_eq!(clf.info(), None);
    }

    #[test]
    fn dimension_mismatch_is_rejected() {
        let (x, y) = two_cluster_data();
        let mut clf = SvmClassifier::new(SvmConfig::default());
        clf.train(&x, &y).unwrap();
        assert_eq!(
            clf.predict(&[1.0]),
            Err(ModelError::DimensionMismatch {
                expected: 2,
                got: 1
            })
        );
    }

    #[test]
    fn predictions_return_original_label_space() {
        let x = array![[0.0, 0.0], [1.0, 1.0], [5.0, 5.0], [6.0, 6.0]];
        let y = vec![4, 4, 9, 9];
        let mut clf = SvmClassifier::new(SvmConfig::default());
        clf.train(&x, &y).unwrap();

        assert_eq!(clf.predict(&[0.1, 0.1]).unwrap(), 4.0);
        assert_eq!(clf.predict(&[5.9, 5.9]).unwrap(), 9.0);
    }
}
