use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Kernel similarity function used by the SVM solver.
///
/// Parameter assignment is deliberately unvalidated: callers (and the tuner)
/// are free to set any values, and each family only reads its own fields.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub enum KernelFamily {
    Linear,
    /// `(gamma * <a, b> + coef0) ^ degree`. `degree` is kept as f64 so the
    /// tuner can move it continuously; evaluation rounds it.
    Polynomial { degree: f64, gamma: f64, coef0: f64 },
    /// `exp(-gamma * ||a - b||^2)`
    Rbf { gamma: f64 },
    /// `tanh(gamma * <a, b> + coef0)`
    Sigmoid { gamma: f64, coef0: f64 },
    /// RBF with a per-dimension weight on the squared distance. Missing
    /// weights default to 1.
    RbfWeighted { gamma: f64, weights: Vec<f64> },
}

/// Budget and tolerances for the kernel hyperparameter search.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct TuningConfig {
    /// Maximum number of objective evaluations (each one is a full retrain).
    pub max_evals: usize,
    /// Absolute per-dimension step tolerance for convergence.
    pub x_tol: f64,
    /// Lower bound for scale-like parameters, kept above zero to avoid
    /// degenerate kernel scales.
    pub lower_bound: f64,
    /// Initial per-dimension search step.
    pub initial_step: f64,
}

impl Default for TuningConfig {
    fn default() -> Self {
        TuningConfig {
            max_evals: 100,
            x_tol: 0.001,
            lower_bound: 0.001,
            initial_step: 0.1,
        }
    }
}

/// Configuration for the SVM adapter.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct SvmConfig {
    /// Regularization constant.
    pub c: f64,
    pub kernel: KernelFamily,
    /// KKT violation tolerance for the SMO solver.
    pub tol: f64,
    /// Iteration cap for a single binary subproblem.
    pub max_iter: usize,
    /// Run the kernel hyperparameter tuner after the initial fit.
    pub optimize: bool,
    pub tuning: TuningConfig,
}

impl Default for SvmConfig {
    fn default() -> Self {
        SvmConfig {
            c: 100.0,
            kernel: KernelFamily::Rbf { gamma: 0.1 },
            tol: 1e-3,
            max_iter: 10_000,
            optimize: false,
            tuning: TuningConfig::default(),
        }
    }
}

/// Activation function for the MLP, with its two shape parameters.
#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq)]
pub enum Activation {
    Identity,
    /// `beta * (1 - exp(-alpha * x)) / (1 + exp(-alpha * x))`
    Sigmoid { alpha: f64, beta: f64 },
    /// `beta * exp(-alpha * x * x)`
    Gaussian { alpha: f64, beta: f64 },
}

/// Weight update rule for MLP training.
#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq)]
pub enum TrainMethod {
    Backprop {
        learning_rate: f64,
    },
    Rprop {
        dw0: f64,
        dw_plus: f64,
        dw_minus: f64,
        dw_min: f64,
        dw_max: f64,
    },
}

impl TrainMethod {
    pub fn rprop_defaults() -> Self {
        TrainMethod::Rprop {
            dw0: 0.1,
            dw_plus: 1.2,
            dw_minus: 0.8,
            dw_min: 1e-4,
            dw_max: 1000.0,
        }
    }
}

/// Configuration for the MLP adapter.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct MlpConfig {
    pub activation: Activation,
    /// Neurons per hidden layer. A value below 2, or zero layers, collapses
    /// the network to a single linear input-to-output layer.
    pub neurons: usize,
    pub layers: usize,
    pub training: TrainMethod,
    /// Epoch cap.
    pub max_iter: usize,
    /// Weight-change tolerance for early stopping.
    pub epsilon: f64,
    /// Seed for the per-epoch sample order shuffle and weight init.
    pub seed: u64,
}

impl Default for MlpConfig {
    fn default() -> Self {
        MlpConfig {
            activation: Activation::Sigmoid {
                alpha: 1.0,
                beta: 1.0,
            },
            neurons: 8,
            layers: 1,
            training: TrainMethod::rprop_defaults(),
            max_iter: 1000,
            epsilon: 1e-4,
            seed: 42,
        }
    }
}

/// Top-level model selection, one variant per adapter.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub enum ModelConfig {
    Svm(SvmConfig),
    Mlp(MlpConfig),
}

impl Default for ModelConfig {
    fn default() -> Self {
        ModelConfig::Svm(SvmConfig::default())
    }
}

impl FromStr for ModelConfig {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "svm" => Ok(ModelConfig::Svm(SvmConfig::default())),
            "mlp" => Ok(ModelConfig::Mlp(MlpConfig::default())),
            _ => Err(format!(
                "Unknown model type: {}. Valid options are: svm, mlp",
                s
            )),
        }
    }
}
