//! Mean-aggregation neighbourhood convolution.

use ndarray::{Array1, Array2, ArrayViewD, ArrayViewMutD, Axis};
use serde::{Deserialize, Serialize};

use maas_core::SimRng;

use super::{glorot, zeros_like1, zeros_like2, Parameterized};
use crate::message::MessageGraph;

/// `y_i = W_l · mean_{j -> i} x_j + b + W_r · x_i`.
///
/// Nodes with no incoming edge aggregate to zero and keep only their root
/// term.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SageConv {
    /// `[in, out]`, applied to the neighbour mean.
    pub lin_l: Array2<f64>,
    pub bias:  Array1<f64>,
    /// `[in, out]`, applied to the node itself.
    pub lin_r: Array2<f64>,
}

/// Forward-pass intermediates needed by [`SageConv::backward`].
#[derive(Clone, Debug)]
pub struct SageCache {
    pub input:     Array2<f64>,
    pub aggregate: Array2<f64>,
}

impl SageConv {
    pub fn new(input: usize, output: usize, rng: &mut SimRng) -> Self {
        Self {
            lin_l: glorot((input, output), (input, output), rng),
            bias:  Array1::zeros(output),
            lin_r: glorot((input, output), (input, output), rng),
        }
    }

    pub fn forward(&self, x: &Array2<f64>, graph: &MessageGraph) -> (Array2<f64>, SageCache) {
        let mut aggregate = Array2::<f64>::zeros(x.raw_dim());
        for (&s, &d) in graph.src.iter().zip(&graph.dst) {
            let row = x.row(s);
            aggregate.row_mut(d).scaled_add(1.0, &row);
        }
        for (i, &deg) in graph.in_degree.iter().enumerate() {
            if deg > 1 {
                aggregate.row_mut(i).mapv_inplace(|v| v / deg as f64);
            }
        }

        let y = aggregate.dot(&self.lin_l) + &self.bias + x.dot(&self.lin_r);
        (y, SageCache { input: x.clone(), aggregate })
    }

    /// Accumulate parameter gradients.  The input is raw node features, so
    /// no input gradient is produced.
    pub fn backward(&self, cache: &SageCache, dy: &Array2<f64>, grads: &mut SageConv) {
        grads.lin_l += &cache.aggregate.t().dot(dy);
        grads.bias += &dy.sum_axis(Axis(0));
        grads.lin_r += &cache.input.t().dot(dy);
    }
}

impl Parameterized for SageConv {
    fn tensors(&self) -> Vec<ArrayViewD<'_, f64>> {
        vec![
            self.lin_l.view().into_dyn(),
            self.bias.view().into_dyn(),
            self.lin_r.view().into_dyn(),
        ]
    }

    fn tensors_mut(&mut self) -> Vec<ArrayViewMutD<'_, f64>> {
        vec![
            self.lin_l.view_mut().into_dyn(),
            self.bias.view_mut().into_dyn(),
            self.lin_r.view_mut().into_dyn(),
        ]
    }

    fn zeros_like(&self) -> Self {
        Self {
            lin_l: zeros_like2(&self.lin_l),
            bias:  zeros_like1(&self.bias),
            lin_r: zeros_like2(&self.lin_r),
        }
    }
}
