//! sketchlearn: trainable model adapters for interactive ML visualization.
//!
//! This crate provides the model layer behind a sample-sketching front end:
//! a uniform `Classifier` contract (train / predict / per-class scores /
//! info), an SVM adapter over an in-crate SMO solver with one-vs-one
//! multi-class voting and a dense label remap, a kernel hyperparameter tuner
//! driven by a bounded derivative-free search over the solver's dual
//! objective, an MLP adapter over a small feedforward network, and a factory
//! over serde-friendly model configurations.
//!
//! The design favors small, testable modules; models are owned exclusively
//! by their adapter and replaced wholesale on retrain.
pub mod config;
pub mod data;
pub mod error;
pub mod logging;
pub mod models;
pub mod nn;
pub mod optimize;
pub mod svm;
pub mod tuning;

pub use config::{
    Activation, KernelFamily, MlpConfig, ModelConfig, SvmConfig, TrainMethod, TuningConfig,
};
pub use error::ModelError;
pub use models::classifier_trait::Classifier;
pub use tuning::TuneReport;
