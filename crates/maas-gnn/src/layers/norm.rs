//! Graph normalisation with a learnable mean shift.

use ndarray::{Array1, Array2, ArrayViewD, ArrayViewMutD, Axis};
use serde::{Deserialize, Serialize};

use super::{zeros_like1, Parameterized};

const EPS: f64 = 1e-5;

/// Per-channel, over all nodes of the graph:
///
/// ```text
/// o = x - α · mean(x)
/// y = γ · o / sqrt(mean(o²) + ε) + β
/// ```
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct GraphNorm {
    /// γ.
    pub weight:     Array1<f64>,
    /// β.
    pub bias:       Array1<f64>,
    /// α.
    pub mean_scale: Array1<f64>,
}

#[derive(Clone, Debug)]
pub struct NormCache {
    mean:    Array1<f64>,
    std:     Array1<f64>,
    shifted: Array2<f64>,
    normed:  Array2<f64>,
}

impl GraphNorm {
    pub fn new(channels: usize) -> Self {
        Self {
            weight:     Array1::ones(channels),
            bias:       Array1::zeros(channels),
            mean_scale: Array1::ones(channels),
        }
    }

    pub fn forward(&self, x: &Array2<f64>) -> (Array2<f64>, NormCache) {
        let n = x.nrows().max(1) as f64;
        let mean = x.sum_axis(Axis(0)) / n;
        let shifted = x - &(&self.mean_scale * &mean);
        let var = (&shifted * &shifted).sum_axis(Axis(0)) / n;
        let std = var.mapv(|v| (v + EPS).sqrt());
        let normed = &shifted / &std;
        let y = &normed * &self.weight + &self.bias;
        (y, NormCache { mean, std, shifted, normed })
    }

    /// Accumulate parameter gradients into `grads` and return `dL/dx`.
    pub fn backward(&self, cache: &NormCache, dy: &Array2<f64>, grads: &mut GraphNorm) -> Array2<f64> {
        let n = dy.nrows().max(1) as f64;
        grads.weight += &(dy * &cache.normed).sum_axis(Axis(0));
        grads.bias += &dy.sum_axis(Axis(0));

        // Through y = γ·o/s with s = sqrt(mean(o²) + ε).
        let dnormed = dy * &self.weight;
        let dot = (&dnormed * &cache.shifted).sum_axis(Axis(0));
        let std3 = cache.std.mapv(|s| s * s * s);
        let dshifted = &dnormed / &cache.std - &cache.shifted * &(dot / (std3 * n));

        // Through o = x - α·mean(x).
        let dshift_sum = dshifted.sum_axis(Axis(0));
        grads.mean_scale -= &(&cache.mean * &dshift_sum);
        dshifted - &(&self.mean_scale * &(dshift_sum / n))
    }
}

impl Parameterized for GraphNorm {
    fn tensors(&self) -> Vec<ArrayViewD<'_, f64>> {
        vec![
            self.weight.view().into_dyn(),
            self.bias.view().into_dyn(),
            self.mean_scale.view().into_dyn(),
        ]
    }

    fn tensors_mut(&mut self) -> Vec<ArrayViewMutD<'_, f64>> {
        vec![
            self.weight.view_mut().into_dyn(),
            self.bias.view_mut().into_dyn(),
            self.mean_scale.view_mut().into_dyn(),
        ]
    }

    fn zeros_like(&self) -> Self {
        Self {
            weight:     zeros_like1(&self.weight),
            bias:       zeros_like1(&self.bias),
            mean_scale: zeros_like1(&self.mean_scale),
        }
    }
}
