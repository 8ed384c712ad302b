//! Kernel hyperparameter tuning for the SVM adapter.
//!
//! Given a trained configuration and its training problem, search a small
//! kernel-parameter space for the point maximizing the solver's dual
//! objective. Every evaluation retrains a fresh model, so the search runs
//! under a strict evaluation budget. Failure never damages the caller's
//! state: the pre-tuning model and parameters are kept and the abandonment
//! is reported.

use log::{debug, warn};

use crate::config::{KernelFamily, SvmConfig};
use crate::error::ModelError;
use crate::optimize::{maximize, Outcome, SearchSpec};
use crate::svm::{SvmModel, SvmProblem};

/// What the tuner did, surfaced to the caller instead of being swallowed.
#[derive(Debug, Clone, PartialEq)]
pub enum TuneReport {
    /// A better parameter point was found and adopted; the model was
    /// retrained there.
    Adopted {
        kernel: KernelFamily,
        objective: f64,
        evaluations: usize,
    },
    /// Nothing to tune, zero budget, or no improving point found.
    Unchanged,
    /// The search failed or was cancelled; prior state retained.
    Aborted { reason: String },
}

pub(crate) struct TuneOutcome {
    pub report: TuneReport,
    /// Tuned kernel and the model retrained at it, when adopted.
    pub adopted: Option<(KernelFamily, SvmModel)>,
}

impl TuneOutcome {
    fn unchanged() -> Self {
        TuneOutcome {
            report: TuneReport::Unchanged,
            adopted: None,
        }
    }

    fn aborted(reason: &str) -> Self {
        warn!("kernel tuning abandoned: {}", reason);
        TuneOutcome {
            report: TuneReport::Aborted {
                reason: reason.to_string(),
            },
            adopted: None,
        }
    }
}

/// Search-vector layout per kernel family. Scale-like parameters enter as
/// inverse gamma ("kernel width") so the lower bound keeps them positive.
fn search_point(kernel: &KernelFamily) -> Option<Vec<f64>> {
    match kernel {
        KernelFamily::Linear => None,
        KernelFamily::Rbf { gamma } => Some(vec![1.0 / gamma]),
        KernelFamily::Sigmoid { coef0, .. } => Some(vec![*coef0]),
        KernelFamily::Polynomial {
            degree,
            gamma,
            coef0,
        } => Some(vec![*degree, 1.0 / gamma, *coef0]),
        KernelFamily::RbfWeighted { gamma, weights } => {
            let mut x = Vec::with_capacity(weights.len() + 1);
            x.push(1.0 / gamma);
            x.extend_from_slice(weights);
            Some(x)
        }
    }
}

/// Inverse of [`search_point`]: rebuild a kernel of the same family at `x`.
fn kernel_at(kernel: &KernelFamily, x: &[f64]) -> KernelFamily {
    match kernel {
        KernelFamily::Linear => KernelFamily::Linear,
        KernelFamily::Rbf { .. } => KernelFamily::Rbf { gamma: 1.0 / x[0] },
        KernelFamily::Sigmoid { gamma, .. } => KernelFamily::Sigmoid {
            gamma: *gamma,
            coef0: x[0],
        },
        KernelFamily::Polynomial { .. } => KernelFamily::Polynomial {
            degree: x[0],
            gamma: 1.0 / x[1],
            coef0: x[2],
        },
        KernelFamily::RbfWeighted { .. } => KernelFamily::RbfWeighted {
            gamma: 1.0 / x[0],
            weights: x[1..].to_vec(),
        },
    }
}

pub(crate) fn tune<C>(problem: &SvmProblem, config: &SvmConfig, cancel: C) -> TuneOutcome
where
    C: FnMut() -> bool,
{
    let x0 = match search_point(&config.kernel) {
        Some(x0) => x0,
        None => return TuneOutcome::unchanged(),
    };
    if config.tuning.max_evals == 0 {
        return TuneOutcome::unchanged();
    }
    if x0.iter().any(|v| !v.is_finite()) {
        return TuneOutcome::aborted("non-finite starting parameters");
    }

    let n = x0.len();
    let mut lower_bounds = vec![config.tuning.lower_bound; n];
    let mut initial_step = vec![config.tuning.initial_step; n];
    if let KernelFamily::Polynomial { .. } = config.kernel {
        // The degree moves on an integer-like scale.
        lower_bounds[0] = 1.0;
        initial_step[0] = 1.0;
    }
    let spec = SearchSpec {
        lower_bounds,
        initial_step,
        max_evals: config.tuning.max_evals,
        x_tol: config.tuning.x_tol,
    };

    let objective = |x: &[f64]| -> Result<f64, ModelError> {
        let mut candidate = config.clone();
        candidate.kernel = kernel_at(&config.kernel, x);
        let model = SvmModel::train(problem, &candidate);
        let value = model.dual_objective();
        if !value.is_finite() {
            return Err(ModelError::Solver(
                "non-finite dual objective".to_string(),
            ));
        }
        debug!("tuning objective {} at {:?}", value, x);
        Ok(value)
    };

    let result = maximize(objective, &x0, &spec, cancel);
    match result.outcome {
        Outcome::Aborted => TuneOutcome::aborted("objective failure or cancellation"),
        Outcome::Converged | Outcome::BudgetExhausted => {
            if result.evaluations == 0 || result.point == x0 {
                return TuneOutcome::unchanged();
            }
            let kernel = kernel_at(&config.kernel, &result.point);
            let mut tuned = config.clone();
            tuned.kernel = kernel.clone();
            let model = SvmModel::train(problem, &tuned);
            debug!(
                "adopting tuned kernel after {} evaluations, objective {}",
                result.evaluations, result.value
            );
            TuneOutcome {
                report: TuneReport::Adopted {
                    kernel: kernel.clone(),
                    objective: result.value,
                    evaluations: result.evaluations,
                },
                adopted: Some((kernel, model)),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn search_point_dimensions_follow_kernel_family() {
        assert_eq!(search_point(&KernelFamily::Linear), None);
        assert_eq!(
            search_point(&KernelFamily::Rbf { gamma: 0.5 }),
            Some(vec![2.0])
        );
        assert_eq!(
            search_point(&KernelFamily::Polynomial {
                degree: 3.0,
                gamma: 0.5,
                coef0: 1.5
            }),
            Some(vec![3.0, 2.0, 1.5])
        );
        assert_eq!(
            search_point(&KernelFamily::RbfWeighted {
                gamma: 1.0,
                weights: vec![1.0, 2.0]
            })
            .map(|x| x.len()),
            Some(3)
        );
    }

    #[test]
    fn kernel_at_inverts_search_point() {
        let kernels = [
            KernelFamily::Rbf { gamma: 0.25 },
            KernelFamily::Sigmoid {
                gamma: 0.1,
                coef0: 0.7,
            },
            KernelFamily::Polynomial {
                degree: 2.0,
                gamma: 0.5,
                coef0: 0.3,
            },
            KernelFamily::RbfWeighted {
                gamma: 0.5,
                weights: vec![1.0, 0.5],
            },
        ];
        for kernel in &kernels {
            let x = search_point(kernel).unwrap();
            assert_eq!(&kernel_at(kernel, &x), kernel);
        }
    }
}
