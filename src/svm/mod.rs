//! In-crate SVM training and inference.
//!
//! Multi-class classification is one-vs-one: each pair of dense classes gets
//! its own binary SMO subproblem (trained in parallel), and prediction is a
//! majority vote over the pairwise decisions. The summed dual objective of
//! the binary subproblems is the quality score used by the hyperparameter
//! tuner.

pub mod kernel;
pub mod solver;

use log::debug;
use ndarray::Array2;
use rayon::prelude::*;

use crate::config::{KernelFamily, SvmConfig};

/// A training problem in solver-ready form: dense rows plus dense class
/// indices in `[0, class_count)`.
#[derive(Debug, Clone)]
pub struct SvmProblem {
    pub rows: Vec<Vec<f64>>,
    pub targets: Vec<usize>,
    pub class_count: usize,
    pub dim: usize,
}

impl SvmProblem {
    pub fn new(x: &Array2<f64>, targets: Vec<usize>, class_count: usize) -> Self {
        let rows: Vec<Vec<f64>> = x.rows().into_iter().map(|r| r.to_vec()).collect();
        SvmProblem {
            rows,
            targets,
            class_count,
            dim: x.ncols(),
        }
    }
}

/// One binary one-vs-one submodel. A non-negative decision value votes for
/// `pos`, a negative one for `neg`.
#[derive(Debug, Clone)]
struct PairModel {
    pos: usize,
    neg: usize,
    support: Vec<Vec<f64>>,
    /// `alpha_i * y_i` per support vector.
    coeff: Vec<f64>,
    /// Indices into the training problem, kept for unique support counting.
    sv_indices: Vec<usize>,
    b: f64,
    dual_objective: f64,
}

impl PairModel {
    fn decision(&self, kernel: &KernelFamily, sample: &[f64]) -> f64 {
        let mut value = self.b;
        for (sv, coeff) in self.support.iter().zip(&self.coeff) {
            value += coeff * kernel.eval(sv, sample);
        }
        value
    }
}

/// A trained model. Owned exclusively by its adapter and replaced wholesale
/// on retrain.
#[derive(Debug, Clone)]
pub struct SvmModel {
    kernel: KernelFamily,
    class_count: usize,
    pairs: Vec<PairModel>,
}

impl SvmModel {
    /// Train a model on a dense problem with the given configuration. The
    /// `optimize` flag is ignored here; tuning is driven by the adapter.
    pub fn train(problem: &SvmProblem, config: &SvmConfig) -> SvmModel {
        let mut class_pairs = Vec::new();
        for a in 0..problem.class_count {
            for b in (a + 1)..problem.class_count {
                class_pairs.push((a, b));
            }
        }

        let pairs: Vec<PairModel> = class_pairs
            .par_iter()
            .map(|&(a, b)| train_pair(problem, config, a, b))
            .collect();

        debug!(
            "trained {} one-vs-one subproblems over {} classes",
            pairs.len(),
            problem.class_count
        );

        SvmModel {
            kernel: config.kernel.clone(),
            class_count: problem.class_count,
            pairs,
        }
    }

    pub fn class_count(&self) -> usize {
        self.class_count
    }

    /// Per-dense-class one-vs-one vote tally.
    pub fn votes(&self, sample: &[f64]) -> Vec<f64> {
        let mut votes = vec![0.0; self.class_count];
        for pair in &self.pairs {
            if pair.decision(&self.kernel, sample) >= 0.0 {
                votes[pair.pos] += 1.0;
            } else {
                votes[pair.neg] += 1.0;
            }
        }
        votes
    }

    /// Majority-vote prediction as a dense class index. Ties resolve to the
    /// lowest index, matching the vote-scan order of the original solver.
    pub fn predict(&self, sample: &[f64]) -> usize {
        if self.pairs.is_empty() {
            return 0;
        }
        let votes = self.votes(sample);
        let mut best = 0;
        for (i, &v) in votes.iter().enumerate() {
            if v > votes[best] {
                best = i;
            }
        }
        best
    }

    /// Margin of the single binary subproblem. Only meaningful for two-class
    /// models.
    pub fn decision_value(&self, sample: &[f64]) -> f64 {
        match self.pairs.first() {
            Some(pair) => pair.decision(&self.kernel, sample),
            None => 0.0,
        }
    }

    /// Summed dual objective over the binary subproblems; the tuner's target.
    pub fn dual_objective(&self) -> f64 {
        self.pairs.iter().map(|p| p.dual_objective).sum()
    }

    /// Number of distinct training samples acting as support vectors.
    pub fn support_count(&self) -> usize {
        let mut seen = std::collections::BTreeSet::new();
        for pair in &self.pairs {
            seen.extend(pair.sv_indices.iter().copied());
        }
        seen.len()
    }
}

fn train_pair(problem: &SvmProblem, config: &SvmConfig, pos: usize, neg: usize) -> PairModel {
    let mut x: Vec<&[f64]> = Vec::new();
    let mut y: Vec<f64> = Vec::new();
    let mut idx: Vec<usize> = Vec::new();
    for (i, &t) in problem.targets.iter().enumerate() {
        if t == pos || t == neg {
            x.push(problem.rows[i].as_slice());
            y.push(if t == pos { 1.0 } else { -1.0 });
            idx.push(i);
        }
    }

    let sol = solver::solve(&x, &y, &config.kernel, config.c, config.tol, config.max_iter);

    let mut support = Vec::new();
    let mut coeff = Vec::new();
    let mut sv_indices = Vec::new();
    for (i, &a) in sol.alpha.iter().enumerate() {
        if a > 1e-8 {
            support.push(x[i].to_vec());
            coeff.push(a * y[i]);
            sv_indices.push(idx[i]);
        }
    }

    PairModel {
        pos,
        neg,
        support,
        coeff,
        sv_indices,
        b: sol.b,
        dual_objective: sol.dual_objective,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    fn two_class_problem() -> SvmProblem {
        let x = array![[0.0, 0.0], [1.0, 1.0], [5.0, 5.0], [6.0, 6.0]];
        SvmProblem::new(&x, vec![0, 0, 1, 1], 2)
    }

    #[test]
    fn two_class_model_votes_and_predicts() {
        let problem = two_class_problem();
        let model = SvmModel::train(&problem, &SvmConfig::default());

        assert_eq!(model.predict(&[0.1, 0.1]), 0);
        assert_eq!(model.predict(&[5.9, 5.9]), 1);
        assert_eq!(model.votes(&[0.1, 0.1]), vec![1.0, 0.0]);
        assert!(model.support_count() > 0);
    }

    #[test]
    fn three_class_votes_sum_to_pair_count() {
        let x = array![
            [0.0, 0.0],
            [0.5, 0.0],
            [10.0, 0.0],
            [10.5, 0.0],
            [0.0, 10.0],
            [0.5, 10.0]
        ];
        let problem = SvmProblem::new(&x, vec![0, 0, 1, 1, 2, 2], 3);
        let model = SvmModel::train(&problem, &SvmConfig::default());

        let votes = model.votes(&[0.1, 0.1]);
        assert_eq!(votes.len(), 3);
        assert_eq!(votes.iter().sum::<f64>(), 3.0);
        assert_eq!(model.predict(&[0.1, 0.1]), 0);
        assert_eq!(model.predict(&[10.2, 0.0]), 1);
        assert_eq!(model.predict(&[0.2, 10.2]), 2);
    }

    #[test]
    fn single_class_model_is_degenerate_but_safe() {
        let x = array![[1.0], [2.0]];
        let problem = SvmProblem::new(&x, vec![0, 0], 1);
        let model = SvmModel::train(&problem, &SvmConfig::default());

        assert_eq!(model.predict(&[1.5]), 0);
        assert_eq!(model.dual_objective(), 0.0);
        assert_eq!(model.support_count(), 0);
    }
}
