use log::info;
use ndarray::Array2;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

use crate::config::{Activation, MlpConfig};
use crate::data::check_training_input;
use crate::error::ModelError;
use crate::models::classifier_trait::Classifier;
use crate::nn::Network;

/// MLP adapter over the in-crate feedforward network. Labels are used as raw
/// regression targets and `predict` returns the raw network output, so the
/// decision boundary for binary +/-1 labels is the output's sign.
pub struct MlpClassifier {
    config: MlpConfig,
    net: Option<Network>,
    dim: usize,
}

impl MlpClassifier {
    pub fn new(config: MlpConfig) -> Self {
        MlpClassifier {
            config,
            net: None,
            dim: 0,
        }
    }

    pub fn config(&self) -> &MlpConfig {
        &self.config
    }

    fn topology(&self, dim: usize) -> Vec<usize> {
        // A degenerate configuration collapses to one linear layer.
        if self.config.layers == 0 || self.config.neurons < 2 {
            return vec![dim, 1];
        }
        let mut sizes = vec![dim];
        sizes.extend(std::iter::repeat(self.config.neurons).take(self.config.layers));
        sizes.push(1);
        sizes
    }

    fn check_sample(&self, sample: &[f64]) -> Result<&Network, ModelError> {
        let net = self.net.as_ref().ok_or(ModelError::NotTrained)?;
        if sample.len() != self.dim {
            return Err(ModelError::DimensionMismatch {
                expected: self.dim,
                got: sample.len(),
            });
        }
        Ok(net)
    }
}

impl Classifier for MlpClassifier {
    fn train(&mut self, x: &Array2<f64>, y: &[i32]) -> Result<(), ModelError> {
        let dim = check_training_input(x, y)?;
        let mut rng = StdRng::seed_from_u64(self.config.seed);

        // Shuffle the presentation order once up front, as the original
        // trainer did with its random permutation.
        let mut order: Vec<usize> = (0..x.nrows()).collect();
        order.shuffle(&mut rng);
        let samples: Vec<Vec<f64>> = order.iter().map(|&i| x.row(i).to_vec()).collect();
        let targets: Vec<f64> = order.iter().map(|&i| y[i] as f64).collect();

        let mut net = Network::new(&self.topology(dim), self.config.activation, &mut rng);
        net.train(
            &samples,
            &targets,
            &self.config.training,
            self.config.max_iter,
            self.config.epsilon,
            &mut rng,
        );

        info!(
            "trained MLP on {} samples: {} hidden layers of {} neurons",
            x.nrows(),
            self.config.layers,
            self.config.neurons
        );

        self.net = Some(net);
        self.dim = dim;
        Ok(())
    }

    fn predict(&self, sample: &[f64]) -> Result<f64, ModelError> {
        Ok(self.check_sample(sample)?.output(sample))
    }

    fn predict_scores(&self, sample: &[f64]) -> Result<Vec<f64>, ModelError> {
        Ok(vec![self.predict(sample)?])
    }

    fn info(&self) -> Option<String> {
        self.net.as_ref()?;
        let mut text = String::from("Multi-Layer Perceptron\n");
        text.push_str(&format!("Layers: {}\n", self.config.layers));
        text.push_str(&format!("Neurons: {}\n", self.config.neurons));
        text.push_str("Activation Function: ");
        match self.config.activation {
            Activation::Identity => text.push_str("identity\n"),
            Activation::Sigmoid { alpha, beta } => text.push_str(&format!(
                "sigmoid (alpha: {:.6} beta: {:.6})\n\tbeta*(1-exp(-alpha*x)) / (1 + exp(-alpha*x))\n",
                alpha, beta
            )),
            Activation::Gaussian { alpha, beta } => text.push_str(&format!(
                "gaussian (alpha: {:.6} beta: {:.6})\n\tbeta*exp(-alpha*x*x)\n",
                alpha, beta
            )),
        }
        Some(text)
    }

    fn name(&self) -> &str {
        "mlp"
    }
}
