use crate::config::ModelConfig;
use crate::models::classifier_trait::Classifier;
use crate::models::mlp::MlpClassifier;
use crate::models::svm::SvmClassifier;

/// Build a boxed model from a `ModelConfig`. Variants are registered here
/// explicitly; there is no runtime plugin discovery.
pub fn build_model(config: ModelConfig) -> Box<dyn Classifier> {
    match config {
        ModelConfig::Svm(cfg) => Box::new(SvmClassifier::new(cfg)),
        ModelConfig::Mlp(cfg) => Box::new(MlpClassifier::new(cfg)),
    }
}
