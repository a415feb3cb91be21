//! Adam with L2 weight decay.

use ndarray::{ArrayD, Zip};

use crate::layers::Parameterized;

/// Adam optimiser.  Weight decay is added to the gradient (`g + λθ`) before
/// the moment updates.
#[derive(Clone, Debug)]
pub struct Adam {
    pub learning_rate: f64,
    pub beta1:         f64,
    pub beta2:         f64,
    pub epsilon:       f64,
    pub weight_decay:  f64,
    step:              i32,
    m:                 Vec<ArrayD<f64>>,
    v:                 Vec<ArrayD<f64>>,
}

impl Adam {
    pub fn new(learning_rate: f64, weight_decay: f64) -> Self {
        Self {
            learning_rate,
            beta1: 0.9,
            beta2: 0.999,
            epsilon: 1e-8,
            weight_decay,
            step: 0,
            m: Vec::new(),
            v: Vec::new(),
        }
    }

    /// Number of updates applied so far.
    pub fn steps(&self) -> i32 {
        self.step
    }

    /// Apply one update to `params` using `grads` (same structure).
    pub fn step<P: Parameterized>(&mut self, params: &mut P, grads: &P) {
        let grads = grads.tensors();
        if self.m.len() != grads.len() {
            self.m = grads.iter().map(|g| ArrayD::zeros(g.raw_dim())).collect();
            self.v = grads.iter().map(|g| ArrayD::zeros(g.raw_dim())).collect();
            self.step = 0;
        }

        self.step += 1;
        let (b1, b2, eps, lr, wd) = (self.beta1, self.beta2, self.epsilon, self.learning_rate, self.weight_decay);
        let bias1 = 1.0 - b1.powi(self.step);
        let bias2 = 1.0 - b2.powi(self.step);

        let params = params.tensors_mut();
        for (((theta, g), m), v) in params.into_iter().zip(&grads).zip(&mut self.m).zip(&mut self.v) {
            Zip::from(theta).and(g).and(m).and(v).for_each(|theta, &g, m, v| {
                let g = g + wd * *theta;
                *m = b1 * *m + (1.0 - b1) * g;
                *v = b2 * *v + (1.0 - b2) * g * g;
                let m_hat = *m / bias1;
                let v_hat = *v / bias2;
                *theta -= lr * m_hat / (v_hat.sqrt() + eps);
            });
        }
    }
}
