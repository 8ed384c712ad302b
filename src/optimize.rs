//! Bounded derivative-free maximization.
//!
//! A compass (coordinate pattern) search over a lower-bounded box: probe each
//! dimension in both directions with a per-dimension step, move on
//! improvement, halve the steps when a full probe round fails, and stop when
//! every step drops below the absolute tolerance, the evaluation budget runs
//! out, or the caller cancels. Each objective evaluation may be arbitrarily
//! expensive (the kernel tuner retrains a model per call), so the budget is
//! counted in evaluations and the cancellation hook is polled before every
//! one of them.

use log::warn;

use crate::error::ModelError;

/// Search-space description for [`maximize`].
#[derive(Debug, Clone)]
pub struct SearchSpec {
    /// Per-dimension lower bounds; candidates are clamped, never rejected.
    pub lower_bounds: Vec<f64>,
    /// Per-dimension initial probe steps.
    pub initial_step: Vec<f64>,
    /// Maximum number of objective evaluations.
    pub max_evals: usize,
    /// Convergence: all probe steps below this absolute tolerance.
    pub x_tol: f64,
}

/// How the search ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// All probe steps shrank below the tolerance.
    Converged,
    /// The evaluation budget ran out; the best point so far is returned.
    BudgetExhausted,
    /// The objective failed or the caller cancelled; the caller should keep
    /// its prior state.
    Aborted,
}

/// Best point found, its value, and how the search ended.
#[derive(Debug, Clone)]
pub struct SearchResult {
    pub point: Vec<f64>,
    pub value: f64,
    pub evaluations: usize,
    pub outcome: Outcome,
}

enum Stop {
    Budget,
    Cancelled,
    Failed,
}

/// Maximize `objective` starting from `start`.
///
/// With a zero budget nothing is evaluated and the start point is returned
/// unchanged (`value` is NaN). The returned value never decreases relative
/// to the start point's objective: candidates are only adopted on strict
/// improvement.
pub fn maximize<F, C>(
    mut objective: F,
    start: &[f64],
    spec: &SearchSpec,
    mut cancel: C,
) -> SearchResult
where
    F: FnMut(&[f64]) -> Result<f64, ModelError>,
    C: FnMut() -> bool,
{
    let n = start.len();
    debug_assert_eq!(spec.lower_bounds.len(), n);
    debug_assert_eq!(spec.initial_step.len(), n);

    let mut best: Vec<f64> = start
        .iter()
        .zip(&spec.lower_bounds)
        .map(|(&v, &lo)| v.max(lo))
        .collect();

    if spec.max_evals == 0 || n == 0 {
        return SearchResult {
            point: best,
            value: f64::NAN,
            evaluations: 0,
            outcome: Outcome::BudgetExhausted,
        };
    }

    let mut evaluations = 0usize;
    let mut eval = |x: &[f64], evaluations: &mut usize| -> Result<f64, Stop> {
        if cancel() {
            return Err(Stop::Cancelled);
        }
        if *evaluations >= spec.max_evals {
            return Err(Stop::Budget);
        }
        *evaluations += 1;
        objective(x).map_err(|e| {
            warn!("objective evaluation failed: {}", e);
            Stop::Failed
        })
    };

    let mut best_value = match eval(&best, &mut evaluations) {
        Ok(v) => v,
        Err(stop) => {
            return SearchResult {
                point: best,
                value: f64::NAN,
                evaluations,
                outcome: stop_outcome(stop),
            }
        }
    };

    let mut step = spec.initial_step.clone();
    loop {
        let mut improved = false;
        for d in 0..n {
            for sign in [1.0, -1.0] {
                let mut cand = best.clone();
                cand[d] = (cand[d] + sign * step[d]).max(spec.lower_bounds[d]);
                if cand[d] == best[d] {
                    continue;
                }
                match eval(&cand, &mut evaluations) {
                    Ok(v) if v > best_value => {
                        best = cand;
                        best_value = v;
                        improved = true;
                        break;
                    }
                    Ok(_) => {}
                    Err(stop) => {
                        return SearchResult {
                            point: best,
                            value: best_value,
                            evaluations,
                            outcome: stop_outcome(stop),
                        }
                    }
                }
            }
        }

        if !improved {
            for s in step.iter_mut() {
                *s /= 2.0;
            }
            if step.iter().all(|s| *s < spec.x_tol) {
                return SearchResult {
                    point: best,
                    value: best_value,
                    evaluations,
                    outcome: Outcome::Converged,
                };
            }
        }
    }
}

fn stop_outcome(stop: Stop) -> Outcome {
    match stop {
        Stop::Budget => Outcome::BudgetExhausted,
        Stop::Cancelled | Stop::Failed => Outcome::Aborted,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spec(n: usize, max_evals: usize) -> SearchSpec {
        SearchSpec {
            lower_bounds: vec![0.001; n],
            initial_step: vec![0.1; n],
            max_evals,
            x_tol: 0.001,
        }
    }

    #[test]
    fn finds_a_quadratic_maximum() {
        let result = maximize(
            |x| Ok(-(x[0] - 3.0) * (x[0] - 3.0)),
            &[0.5],
            &spec(1, 200),
            || false,
        );
        assert_eq!(result.outcome, Outcome::Converged);
        assert!((result.point[0] - 3.0).abs() < 0.05);
        assert!(result.value > -0.01);
    }

    #[test]
    fn respects_lower_bounds() {
        // Maximum at -1 is outside the box; the search must stay at the bound.
        let result = maximize(
            |x| Ok(-(x[0] + 1.0) * (x[0] + 1.0)),
            &[0.5],
            &spec(1, 200),
            || false,
        );
        assert!(result.point[0] >= 0.001);
    }

    #[test]
    fn zero_budget_is_a_no_op() {
        let mut calls = 0;
        let result = maximize(
            |_| {
                calls += 1;
                Ok(0.0)
            },
            &[1.0, 2.0],
            &spec(2, 0),
            || false,
        );
        assert_eq!(calls, 0);
        assert_eq!(result.evaluations, 0);
        assert_eq!(result.outcome, Outcome::BudgetExhausted);
        assert_eq!(result.point, vec![1.0, 2.0]);
    }

    #[test]
    fn budget_exhaustion_returns_best_so_far() {
        let result = maximize(|x| Ok(-x[0] * x[0]), &[5.0], &spec(1, 3), || false);
        assert_eq!(result.outcome, Outcome::BudgetExhausted);
        assert_eq!(result.evaluations, 3);
        assert!(result.point[0] <= 5.0);
    }

    #[test]
    fn cancellation_aborts_between_evaluations() {
        let mut budget = 2;
        let result = maximize(
            |x| Ok(x[0]),
            &[1.0],
            &spec(1, 100),
            move || {
                if budget == 0 {
                    true
                } else {
                    budget -= 1;
                    false
                }
            },
        );
        assert_eq!(result.outcome, Outcome::Aborted);
        assert!(result.evaluations <= 2);
    }

    #[test]
    fn objective_failure_aborts() {
        let result = maximize(
            |_| Err(ModelError::Solver("boom".to_string())),
            &[1.0],
            &spec(1, 100),
            || false,
        );
        assert_eq!(result.outcome, Outcome::Aborted);
        assert_eq!(result.evaluations, 1);
    }

    #[test]
    fn never_returns_worse_than_the_start_point() {
        // Objective decreasing away from the start: search must stay put.
        let result = maximize(
            |x| Ok(-(x[0] - 1.0).abs()),
            &[1.0],
            &spec(1, 100),
            || false,
        );
        assert_eq!(result.outcome, Outcome::Converged);
        assert_eq!(result.point, vec![1.0]);
        assert_eq!(result.value, 0.0);
    }
}
