//! Kernel evaluation for the SMO solver.

use crate::config::KernelFamily;

impl KernelFamily {
    /// Evaluate the kernel on two dense feature vectors of equal length.
    pub fn eval(&self, a: &[f64], b: &[f64]) -> f64 {
        match self {
            KernelFamily::Linear => dot(a, b),
            KernelFamily::Polynomial {
                degree,
                gamma,
                coef0,
            } => {
                let d = degree.round().max(1.0) as i32;
                (gamma * dot(a, b) + coef0).powi(d)
            }
            KernelFamily::Rbf { gamma } => {
                let mut dist = 0.0;
                for (x, y) in a.iter().zip(b) {
                    let d = x - y;
                    dist += d * d;
                }
                (-gamma * dist).exp()
            }
            KernelFamily::Sigmoid { gamma, coef0 } => (gamma * dot(a, b) + coef0).tanh(),
            KernelFamily::RbfWeighted { gamma, weights } => {
                let mut dist = 0.0;
                for (i, (x, y)) in a.iter().zip(b).enumerate() {
                    let w = weights.get(i).copied().unwrap_or(1.0);
                    let d = x - y;
                    dist += w * d * d;
                }
                (-gamma * dist).exp()
            }
        }
    }
}

fn dot(a: &[f64], b: &[f64]) -> f64 {
    a.iter().zip(b).map(|(x, y)| x * y).sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    const A: [f64; 2] = [1.0, 2.0];
    const B: [f64; 2] = [3.0, -1.0];

    #[test]
    fn linear_is_dot_product() {
        assert_eq!(KernelFamily::Linear.eval(&A, &B), 1.0);
    }

    #[test]
    fn polynomial_rounds_degree() {
        let k = KernelFamily::Polynomial {
            degree: 2.4,
            gamma: 1.0,
            coef0: 1.0,
        };
        // (1*1 + 1)^2
        assert_eq!(k.eval(&A, &B), 4.0);
    }

    #[test]
    fn rbf_is_one_at_zero_distance() {
        let k = KernelFamily::Rbf { gamma: 0.5 };
        assert_eq!(k.eval(&A, &A), 1.0);
        assert!(k.eval(&A, &B) < 1.0);
    }

    #[test]
    fn weighted_rbf_defaults_missing_weights_to_one() {
        let plain = KernelFamily::Rbf { gamma: 0.5 };
        let weighted = KernelFamily::RbfWeighted {
            gamma: 0.5,
            weights: vec![1.0],
        };
        assert!((plain.eval(&A, &B) - weighted.eval(&A, &B)).abs() < 1e-12);
    }
}
