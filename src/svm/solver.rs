//! Binary soft-margin SMO solver.
//!
//! Sequential minimal optimization over one binary subproblem: labels are
//! +1/-1, the kernel matrix is precomputed (canvas-scale training sets), and
//! a decision-function cache keeps pair updates O(n). The solver is fully
//! deterministic so retraining at identical parameters reproduces the same
//! model.

use log::trace;

use crate::config::KernelFamily;

/// Result of one binary subproblem.
#[derive(Debug, Clone)]
pub struct Solution {
    pub alpha: Vec<f64>,
    pub b: f64,
    pub iterations: usize,
    /// Dual objective `W(alpha) = sum(alpha) - 1/2 sum_ij a_i a_j y_i y_j K_ij`,
    /// the quantity the hyperparameter tuner maximizes.
    pub dual_objective: f64,
}

/// Number of full sweeps without an update before declaring convergence.
const MAX_STILL_PASSES: usize = 5;
const ALPHA_EPS: f64 = 1e-12;

pub fn solve(
    x: &[&[f64]],
    y: &[f64],
    kernel: &KernelFamily,
    c: f64,
    tol: f64,
    max_iter: usize,
) -> Solution {
    let n = x.len();
    if n == 0 {
        return Solution {
            alpha: Vec::new(),
            b: 0.0,
            iterations: 0,
            dual_objective: 0.0,
        };
    }

    let k: Vec<Vec<f64>> = (0..n)
        .map(|i| (0..n).map(|j| kernel.eval(x[i], x[j])).collect())
        .collect();

    let mut alpha = vec![0.0; n];
    let mut b = 0.0;
    // f[i] = sum_j alpha_j y_j K_ij, maintained incrementally.
    let mut f = vec![0.0; n];

    let mut iterations = 0;
    let mut still_passes = 0;
    while still_passes < MAX_STILL_PASSES && iterations < max_iter {
        let mut changed = 0;
        for i in 0..n {
            let e_i = f[i] + b - y[i];
            let violates = (y[i] * e_i < -tol && alpha[i] < c - ALPHA_EPS)
                || (y[i] * e_i > tol && alpha[i] > ALPHA_EPS);
            if !violates {
                continue;
            }

            // Second-choice heuristic: maximize |E_i - E_j|, deterministic
            // tie-breaking on the lowest index.
            let mut j = usize::MAX;
            let mut best_gap = -1.0;
            for cand in 0..n {
                if cand == i {
                    continue;
                }
                let gap = (e_i - (f[cand] + b - y[cand])).abs();
                if gap > best_gap {
                    best_gap = gap;
                    j = cand;
                }
            }
            if j == usize::MAX {
                continue;
            }
            let e_j = f[j] + b - y[j];

            let (lo, hi) = if y[i] == y[j] {
                ((alpha[i] + alpha[j] - c).max(0.0), (alpha[i] + alpha[j]).min(c))
            } else {
                ((alpha[j] - alpha[i]).max(0.0), (c + alpha[j] - alpha[i]).min(c))
            };
            if hi - lo < ALPHA_EPS {
                continue;
            }

            let eta = 2.0 * k[i][j] - k[i][i] - k[j][j];
            if eta >= 0.0 {
                continue;
            }

            let mut a_j = alpha[j] - y[j] * (e_i - e_j) / eta;
            a_j = a_j.clamp(lo, hi);
            let d_j = a_j - alpha[j];
            if d_j.abs() < 1e-8 {
                continue;
            }
            let d_i = -y[i] * y[j] * d_j;
            let a_i = alpha[i] + d_i;

            let b1 = b - e_i - y[i] * d_i * k[i][i] - y[j] * d_j * k[i][j];
            let b2 = b - e_j - y[i] * d_i * k[i][j] - y[j] * d_j * k[j][j];
            b = if a_i > ALPHA_EPS && a_i < c - ALPHA_EPS {
                b1
            } else if a_j > ALPHA_EPS && a_j < c - ALPHA_EPS {
                b2
            } else {
                (b1 + b2) / 2.0
            };

            alpha[i] = a_i;
            alpha[j] = a_j;
            for m in 0..n {
                f[m] += y[i] * d_i * k[i][m] + y[j] * d_j * k[j][m];
            }
            changed += 1;
        }

        if changed == 0 {
            still_passes += 1;
        } else {
            still_passes = 0;
        }
        iterations += 1;
    }
    if iterations >= max_iter {
        trace!("SMO hit the iteration cap ({} sweeps)", max_iter);
    }

    let mut objective: f64 = alpha.iter().sum();
    for i in 0..n {
        if alpha[i] < ALPHA_EPS {
            continue;
        }
        for j in 0..n {
            if alpha[j] < ALPHA_EPS {
                continue;
            }
            objective -= 0.5 * alpha[i] * alpha[j] * y[i] * y[j] * k[i][j];
        }
    }

    Solution {
        alpha,
        b,
        iterations,
        dual_objective: objective,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn decision(sol: &Solution, x: &[&[f64]], y: &[f64], kernel: &KernelFamily, s: &[f64]) -> f64 {
        let mut v = sol.b;
        for i in 0..x.len() {
            v += sol.alpha[i] * y[i] * kernel.eval(x[i], s);
        }
        v
    }

    #[test]
    fn separates_a_linear_problem() {
        let rows: Vec<Vec<f64>> = vec![vec![-2.0], vec![-1.5], vec![1.5], vec![2.0]];
        let x: Vec<&[f64]> = rows.iter().map(|r| r.as_slice()).collect();
        let y = [-1.0, -1.0, 1.0, 1.0];
        let kernel = KernelFamily::Linear;

        let sol = solve(&x, &y, &kernel, 1.0, 1e-3, 1000);
        assert!(decision(&sol, &x, &y, &kernel, &[1.8]) > 0.0);
        assert!(decision(&sol, &x, &y, &kernel, &[-1.8]) < 0.0);
        assert!(sol.alpha.iter().any(|&a| a > 0.0));
    }

    #[test]
    fn dual_objective_is_positive_on_separable_data() {
        let rows: Vec<Vec<f64>> = vec![vec![0.0, 0.0], vec![1.0, 1.0], vec![5.0, 5.0], vec![6.0, 6.0]];
        let x: Vec<&[f64]> = rows.iter().map(|r| r.as_slice()).collect();
        let y = [1.0, 1.0, -1.0, -1.0];
        let kernel = KernelFamily::Rbf { gamma: 0.1 };

        let sol = solve(&x, &y, &kernel, 100.0, 1e-3, 10_000);
        assert!(sol.dual_objective > 0.0);
        assert!(sol.dual_objective.is_finite());
    }

    #[test]
    fn empty_problem_yields_empty_solution() {
        let sol = solve(&[], &[], &KernelFamily::Linear, 1.0, 1e-3, 100);
        assert!(sol.alpha.is_empty());
        assert_eq!(sol.dual_objective, 0.0);
    }

    #[test]
    fn retraining_is_deterministic() {
        let rows: Vec<Vec<f64>> = vec![vec![0.0], vec![1.0], vec![3.0], vec![4.0]];
        let x: Vec<&[f64]> = rows.iter().map(|r| r.as_slice()).collect();
        let y = [1.0, 1.0, -1.0, -1.0];
        let kernel = KernelFamily::Rbf { gamma: 0.5 };

        let a = solve(&x, &y, &kernel, 10.0, 1e-3, 10_000);
        let b = solve(&x, &y, &kernel, 10.0, 1e-3, 10_000);
        assert_eq!(a.alpha, b.alpha);
        assert_eq!(a.b, b.b);
        assert_eq!(a.dual_objective, b.dual_objective);
    }
}
