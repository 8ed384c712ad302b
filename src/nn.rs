//! Small feedforward network backing the MLP adapter.
//!
//! Dense layers with a configurable activation (two shape parameters) on the
//! hidden layers and a linear output, trained on squared loss either by
//! per-sample backprop SGD or by full-batch resilient backprop. Weight
//! initialization and the per-epoch sample order are driven by a seeded RNG
//! so training is reproducible.

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::Rng;

use crate::config::{Activation, TrainMethod};

impl Activation {
    fn apply(&self, x: f64) -> f64 {
        match self {
            Activation::Identity => x,
            Activation::Sigmoid { alpha, beta } => {
                let e = (-alpha * x).exp();
                beta * (1.0 - e) / (1.0 + e)
            }
            Activation::Gaussian { alpha, beta } => beta * (-alpha * x * x).exp(),
        }
    }

    fn derive(&self, x: f64) -> f64 {
        match self {
            Activation::Identity => 1.0,
            Activation::Sigmoid { alpha, beta } => {
                let e = (-alpha * x).exp();
                let denom = (1.0 + e) * (1.0 + e);
                2.0 * alpha * beta * e / denom
            }
            Activation::Gaussian { alpha, beta } => {
                -2.0 * alpha * x * beta * (-alpha * x * x).exp()
            }
        }
    }
}

struct Layer {
    /// `w[out][in]`
    w: Vec<Vec<f64>>,
    b: Vec<f64>,
}

/// Per-layer gradient buffers, same shapes as the layers.
struct Grad {
    w: Vec<Vec<Vec<f64>>>,
    b: Vec<Vec<f64>>,
}

pub struct Network {
    layers: Vec<Layer>,
    activation: Activation,
}

impl Network {
    /// Build a network with the given layer sizes (`sizes[0]` inputs, last
    /// entry outputs). Weights start uniform in `±1/sqrt(fan_in)`.
    pub fn new(sizes: &[usize], activation: Activation, rng: &mut StdRng) -> Self {
        let mut layers = Vec::new();
        for pair in sizes.windows(2) {
            let (fan_in, fan_out) = (pair[0], pair[1]);
            let scale = 1.0 / (fan_in.max(1) as f64).sqrt();
            let w = (0..fan_out)
                .map(|_| (0..fan_in).map(|_| rng.gen_range(-scale..scale)).collect())
                .collect();
            let b = vec![0.0; fan_out];
            layers.push(Layer { w, b });
        }
        Network { layers, activation }
    }

    pub fn input_size(&self) -> usize {
        self.layers.first().map_or(0, |l| l.w[0].len())
    }

    /// Single-output forward pass.
    pub fn output(&self, input: &[f64]) -> f64 {
        let (activations, _) = self.forward_trace(input);
        activations.last().map_or(0.0, |a| a[0])
    }

    /// Activations per layer (index 0 is the input) and pre-activations per
    /// layer. The final layer is linear.
    fn forward_trace(&self, input: &[f64]) -> (Vec<Vec<f64>>, Vec<Vec<f64>>) {
        let mut activations = vec![input.to_vec()];
        let mut pre = Vec::new();
        let last = self.layers.len().saturating_sub(1);
        for (l, layer) in self.layers.iter().enumerate() {
            let prev = activations.last().expect("input activation present");
            let z: Vec<f64> = layer
                .w
                .iter()
                .zip(&layer.b)
                .map(|(row, b)| row.iter().zip(prev).map(|(w, a)| w * a).sum::<f64>() + b)
                .collect();
            let a = if l == last {
                z.clone()
            } else {
                z.iter().map(|&v| self.activation.apply(v)).collect()
            };
            pre.push(z);
            activations.push(a);
        }
        (activations, pre)
    }

    /// Per-layer deltas for a single sample with squared loss.
    fn deltas(&self, activations: &[Vec<f64>], pre: &[Vec<f64>], target: f64) -> Vec<Vec<f64>> {
        let depth = self.layers.len();
        let mut deltas = vec![Vec::new(); depth];
        let output = activations[depth][0];
        deltas[depth - 1] = vec![output - target];
        for l in (0..depth.saturating_sub(1)).rev() {
            let next = &self.layers[l + 1];
            let next_delta = &deltas[l + 1];
            let delta: Vec<f64> = (0..self.layers[l].b.len())
                .map(|j| {
                    let back: f64 = next
                        .w
                        .iter()
                        .zip(next_delta)
                        .map(|(row, d)| row[j] * d)
                        .sum();
                    back * self.activation.derive(pre[l][j])
                })
                .collect();
            deltas[l] = delta;
        }
        deltas
    }

    fn zero_grad(&self) -> Grad {
        Grad {
            w: self
                .layers
                .iter()
                .map(|l| l.w.iter().map(|row| vec![0.0; row.len()]).collect())
                .collect(),
            b: self.layers.iter().map(|l| vec![0.0; l.b.len()]).collect(),
        }
    }

    fn accumulate(&self, grad: &mut Grad, sample: &[f64], target: f64) {
        let (activations, pre) = self.forward_trace(sample);
        let deltas = self.deltas(&activations, &pre, target);
        for l in 0..self.layers.len() {
            for (j, &d) in deltas[l].iter().enumerate() {
                for (i, &a) in activations[l].iter().enumerate() {
                    grad.w[l][j][i] += d * a;
                }
                grad.b[l][j] += d;
            }
        }
    }

    /// Train until the epoch cap or until the largest weight update in an
    /// epoch drops below `epsilon`.
    pub fn train(
        &mut self,
        x: &[Vec<f64>],
        targets: &[f64],
        method: &TrainMethod,
        max_iter: usize,
        epsilon: f64,
        rng: &mut StdRng,
    ) {
        match *method {
            TrainMethod::Backprop { learning_rate } => {
                self.train_backprop(x, targets, learning_rate, max_iter, epsilon, rng)
            }
            TrainMethod::Rprop {
                dw0,
                dw_plus,
                dw_minus,
                dw_min,
                dw_max,
            } => self.train_rprop(x, targets, dw0, dw_plus, dw_minus, dw_min, dw_max, max_iter, epsilon),
        }
    }

    fn train_backprop(
        &mut self,
        x: &[Vec<f64>],
        targets: &[f64],
        learning_rate: f64,
        max_iter: usize,
        epsilon: f64,
        rng: &mut StdRng,
    ) {
        let mut order: Vec<usize> = (0..x.len()).collect();
        for _ in 0..max_iter {
            order.shuffle(rng);
            let mut max_update: f64 = 0.0;
            for &s in &order {
                let mut grad = self.zero_grad();
                self.accumulate(&mut grad, &x[s], targets[s]);
                for l in 0..self.layers.len() {
                    for j in 0..self.layers[l].b.len() {
                        for i in 0..self.layers[l].w[j].len() {
                            let update = learning_rate * grad.w[l][j][i];
                            self.layers[l].w[j][i] -= update;
                            max_update = max_update.max(update.abs());
                        }
                        let update = learning_rate * grad.b[l][j];
                        self.layers[l].b[j] -= update;
                        max_update = max_update.max(update.abs());
                    }
                }
            }
            if max_update < epsilon {
                break;
            }
        }
    }

    #[allow(clippy::too_many_arguments)]
    fn train_rprop(
        &mut self,
        x: &[Vec<f64>],
        targets: &[f64],
        dw0: f64,
        dw_plus: f64,
        dw_minus: f64,
        dw_min: f64,
        dw_max: f64,
        max_iter: usize,
        epsilon: f64,
    ) {
        let mut step_w: Vec<Vec<Vec<f64>>> = self
            .layers
            .iter()
            .map(|l| l.w.iter().map(|row| vec![dw0; row.len()]).collect())
            .collect();
        let mut step_b: Vec<Vec<f64>> = self.layers.iter().map(|l| vec![dw0; l.b.len()]).collect();
        let mut prev = self.zero_grad();

        for _ in 0..max_iter {
            let mut grad = self.zero_grad();
            for (sample, &target) in x.iter().zip(targets) {
                self.accumulate(&mut grad, sample, target);
            }

            let mut max_update: f64 = 0.0;
            for l in 0..self.layers.len() {
                for j in 0..self.layers[l].b.len() {
                    for i in 0..self.layers[l].w[j].len() {
                        let update = rprop_step(
                            grad.w[l][j][i],
                            &mut prev.w[l][j][i],
                            &mut step_w[l][j][i],
                            dw_plus,
                            dw_minus,
                            dw_min,
                            dw_max,
                        );
                        self.layers[l].w[j][i] -= update;
                        max_update = max_update.max(update.abs());
                    }
                    let update = rprop_step(
                        grad.b[l][j],
                        &mut prev.b[l][j],
                        &mut step_b[l][j],
                        dw_plus,
                        dw_minus,
                        dw_min,
                        dw_max,
                    );
                    self.layers[l].b[j] -= update;
                    max_update = max_update.max(update.abs());
                }
            }
            if max_update < epsilon {
                break;
            }
        }
    }
}

/// One iRPROP- style update: grow the step while the gradient keeps its sign,
/// shrink and skip on a sign flip. Returns the signed weight update.
fn rprop_step(
    grad: f64,
    prev: &mut f64,
    step: &mut f64,
    dw_plus: f64,
    dw_minus: f64,
    dw_min: f64,
    dw_max: f64,
) -> f64 {
    let s = grad * *prev;
    if s > 0.0 {
        *step = (*step * dw_plus).min(dw_max);
        *prev = grad;
        grad.signum() * *step
    } else if s < 0.0 {
        *step = (*step * dw_minus).max(dw_min);
        *prev = 0.0;
        0.0
    } else {
        *prev = grad;
        if grad == 0.0 {
            0.0
        } else {
            grad.signum() * *step
        }
    }
}
