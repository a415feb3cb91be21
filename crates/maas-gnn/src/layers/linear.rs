//! Fully connected output projection.

use ndarray::{Array1, Array2, ArrayViewD, ArrayViewMutD, Axis};
use serde::{Deserialize, Serialize};

use maas_core::SimRng;

use super::{glorot, zeros_like1, zeros_like2, Parameterized};

/// `y = x · W + b`.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Linear {
    /// `[in, out]`.
    pub weight: Array2<f64>,
    /// `[out]`.
    pub bias:   Array1<f64>,
}

impl Linear {
    pub fn new(input: usize, output: usize, rng: &mut SimRng) -> Self {
        Self {
            weight: glorot((input, output), (input, output), rng),
            bias:   Array1::zeros(output),
        }
    }

    pub fn forward(&self, x: &Array2<f64>) -> Array2<f64> {
        x.dot(&self.weight) + &self.bias
    }

    /// Accumulate parameter gradients into `grads` and return `dL/dx`.
    pub fn backward(&self, x: &Array2<f64>, dy: &Array2<f64>, grads: &mut Linear) -> Array2<f64> {
        grads.weight += &x.t().dot(dy);
        grads.bias += &dy.sum_axis(Axis(0));
        dy.dot(&self.weight.t())
    }
}

impl Parameterized for Linear {
    fn tensors(&self) -> Vec<ArrayViewD<'_, f64>> {
        vec![self.weight.view().into_dyn(), self.bias.view().into_dyn()]
    }

    fn tensors_mut(&mut self) -> Vec<ArrayViewMutD<'_, f64>> {
        vec![self.weight.view_mut().into_dyn(), self.bias.view_mut().into_dyn()]
    }

    fn zeros_like(&self) -> Self {
        Self { weight: zeros_like2(&self.weight), bias: zeros_like1(&self.bias) }
    }
}
