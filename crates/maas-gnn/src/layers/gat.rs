//! Multi-head graph attention with edge attributes.

use ndarray::{s, Array1, Array2, ArrayViewD, ArrayViewMutD, Axis};
use serde::{Deserialize, Serialize};

use maas_core::SimRng;

use super::{glorot, zeros_like1, zeros_like2, Parameterized};
use crate::message::MessageGraph;

/// Attention convolution over the self-looped edge set of a
/// [`MessageGraph`].
///
/// For head `k`, with `z = h · W` split into `heads` blocks of `channels`
/// columns and `ze = attr · W_e` likewise:
///
/// ```text
/// logit(j -> i) = leaky_relu(z_j·a_src + z_i·a_dst + ze_(j,i)·a_edge)
/// α(j -> i)     = softmax over all edges arriving at i
/// out_i         = Σ_j α(j -> i) · z_j
/// ```
///
/// Heads are concatenated, then a bias is added.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct GatConv {
    pub heads:          usize,
    pub channels:       usize,
    pub negative_slope: f64,
    /// `[in, heads · channels]`.
    pub lin:            Array2<f64>,
    /// `[heads, channels]`.
    pub att_src:        Array2<f64>,
    /// `[heads, channels]`.
    pub att_dst:        Array2<f64>,
    /// `[heads, channels]`.
    pub att_edge:       Array2<f64>,
    /// `[edge_dim, heads · channels]`.
    pub lin_edge:       Array2<f64>,
    /// `[heads · channels]`.
    pub bias:           Array1<f64>,
}

#[derive(Clone, Debug)]
pub struct GatCache {
    input:  Array2<f64>,
    z:      Array2<f64>,
    ze:     Array2<f64>,
    /// Pre-activation logits, `[E_att, heads]`.
    logits: Array2<f64>,
    /// Attention weights, `[E_att, heads]`.
    alpha:  Array2<f64>,
}

impl GatCache {
    /// Attention weights per attention edge and head.
    pub fn attention(&self) -> &Array2<f64> {
        &self.alpha
    }
}

impl GatConv {
    pub fn new(input: usize, channels: usize, heads: usize, edge_dim: usize, rng: &mut SimRng) -> Self {
        let width = heads * channels;
        Self {
            heads,
            channels,
            negative_slope: 0.2,
            lin:            glorot((input, width), (input, width), rng),
            att_src:        glorot((heads, channels), (heads, channels), rng),
            att_dst:        glorot((heads, channels), (heads, channels), rng),
            att_edge:       glorot((heads, channels), (heads, channels), rng),
            lin_edge:       glorot((edge_dim, width), (edge_dim, width), rng),
            bias:           Array1::zeros(width),
        }
    }

    fn leaky(&self, v: f64) -> f64 {
        if v > 0.0 { v } else { v * self.negative_slope }
    }

    pub fn forward(&self, h: &Array2<f64>, graph: &MessageGraph) -> (Array2<f64>, GatCache) {
        let (heads, c) = (self.heads, self.channels);
        let m = graph.num_attention_edges();

        let z = h.dot(&self.lin);
        let ze = graph.att_attr.dot(&self.lin_edge);
        let score_src = head_scores(&z, &self.att_src, heads, c);
        let score_dst = head_scores(&z, &self.att_dst, heads, c);
        let score_edge = head_scores(&ze, &self.att_edge, heads, c);

        let logits = Array2::from_shape_fn((m, heads), |(e, k)| {
            score_src[[graph.att_src[e], k]] + score_dst[[graph.att_dst[e], k]] + score_edge[[e, k]]
        });

        let mut alpha = Array2::<f64>::zeros((m, heads));
        for edges in &graph.incoming {
            for k in 0..heads {
                let max = edges
                    .iter()
                    .map(|&e| self.leaky(logits[[e, k]]))
                    .fold(f64::NEG_INFINITY, f64::max);
                let mut sum = 0.0;
                for &e in edges {
                    let w = (self.leaky(logits[[e, k]]) - max).exp();
                    alpha[[e, k]] = w;
                    sum += w;
                }
                for &e in edges {
                    alpha[[e, k]] /= sum;
                }
            }
        }

        let mut out = Array2::<f64>::zeros((h.nrows(), heads * c));
        for e in 0..m {
            let (src, dst) = (graph.att_src[e], graph.att_dst[e]);
            for k in 0..heads {
                let cols = k * c..(k + 1) * c;
                let message = z.slice(s![src, cols.clone()]);
                out.slice_mut(s![dst, cols]).scaled_add(alpha[[e, k]], &message);
            }
        }
        out += &self.bias;

        (out, GatCache { input: h.clone(), z, ze, logits, alpha })
    }

    /// Accumulate parameter gradients into `grads` and return `dL/dh`.
    pub fn backward(
        &self,
        cache: &GatCache,
        dy:    &Array2<f64>,
        graph: &MessageGraph,
        grads: &mut GatConv,
    ) -> Array2<f64> {
        let (heads, c) = (self.heads, self.channels);
        let m = graph.num_attention_edges();
        let n = cache.z.nrows();

        grads.bias += &dy.sum_axis(Axis(0));

        // ── Weighted sum ──────────────────────────────────────────────────────
        let mut dz = Array2::<f64>::zeros(cache.z.raw_dim());
        let mut dalpha = Array2::<f64>::zeros((m, heads));
        for e in 0..m {
            let (src, dst) = (graph.att_src[e], graph.att_dst[e]);
            for k in 0..heads {
                let cols = k * c..(k + 1) * c;
                let dout = dy.slice(s![dst, cols.clone()]);
                dalpha[[e, k]] = dout.dot(&cache.z.slice(s![src, cols.clone()]));
                dz.slice_mut(s![src, cols]).scaled_add(cache.alpha[[e, k]], &dout);
            }
        }

        // ── Softmax and leaky ReLU ────────────────────────────────────────────
        let mut dlogit = Array2::<f64>::zeros((m, heads));
        for edges in &graph.incoming {
            for k in 0..heads {
                let weighted: f64 = edges.iter().map(|&e| cache.alpha[[e, k]] * dalpha[[e, k]]).sum();
                for &e in edges {
                    let dpre = cache.alpha[[e, k]] * (dalpha[[e, k]] - weighted);
                    let slope = if cache.logits[[e, k]] > 0.0 { 1.0 } else { self.negative_slope };
                    dlogit[[e, k]] = dpre * slope;
                }
            }
        }

        // ── Attention scores ──────────────────────────────────────────────────
        let mut dscore_src = Array2::<f64>::zeros((n, heads));
        let mut dscore_dst = Array2::<f64>::zeros((n, heads));
        for e in 0..m {
            for k in 0..heads {
                dscore_src[[graph.att_src[e], k]] += dlogit[[e, k]];
                dscore_dst[[graph.att_dst[e], k]] += dlogit[[e, k]];
            }
        }

        let mut dze = Array2::<f64>::zeros(cache.ze.raw_dim());
        for k in 0..heads {
            let cols = k * c..(k + 1) * c;
            let z_k = cache.z.slice(s![.., cols.clone()]);
            let ze_k = cache.ze.slice(s![.., cols.clone()]);
            grads.att_src.row_mut(k).scaled_add(1.0, &dscore_src.column(k).dot(&z_k));
            grads.att_dst.row_mut(k).scaled_add(1.0, &dscore_dst.column(k).dot(&z_k));
            grads.att_edge.row_mut(k).scaled_add(1.0, &dlogit.column(k).dot(&ze_k));

            let mut dz_k = dz.slice_mut(s![.., cols.clone()]);
            for j in 0..n {
                dz_k.row_mut(j).scaled_add(dscore_src[[j, k]], &self.att_src.row(k));
                dz_k.row_mut(j).scaled_add(dscore_dst[[j, k]], &self.att_dst.row(k));
            }
            let mut dze_k = dze.slice_mut(s![.., cols]);
            for e in 0..m {
                dze_k.row_mut(e).scaled_add(dlogit[[e, k]], &self.att_edge.row(k));
            }
        }

        // ── Projections ───────────────────────────────────────────────────────
        grads.lin_edge += &graph.att_attr.t().dot(&dze);
        grads.lin += &cache.input.t().dot(&dz);
        dz.dot(&self.lin.t())
    }
}

/// Per-row, per-head dot product of a `[rows, heads · channels]` matrix with
/// the matching row of a `[heads, channels]` attention vector.
fn head_scores(z: &Array2<f64>, att: &Array2<f64>, heads: usize, channels: usize) -> Array2<f64> {
    Array2::from_shape_fn((z.nrows(), heads), |(r, k)| {
        z.slice(s![r, k * channels..(k + 1) * channels]).dot(&att.row(k))
    })
}

impl Parameterized for GatConv {
    fn tensors(&self) -> Vec<ArrayViewD<'_, f64>> {
        vec![
            self.lin.view().into_dyn(),
            self.att_src.view().into_dyn(),
            self.att_dst.view().into_dyn(),
            self.att_edge.view().into_dyn(),
            self.lin_edge.view().into_dyn(),
            self.bias.view().into_dyn(),
        ]
    }

    fn tensors_mut(&mut self) -> Vec<ArrayViewMutD<'_, f64>> {
        vec![
            self.lin.view_mut().into_dyn(),
            self.att_src.view_mut().into_dyn(),
            self.att_dst.view_mut().into_dyn(),
            self.att_edge.view_mut().into_dyn(),
            self.lin_edge.view_mut().into_dyn(),
            self.bias.view_mut().into_dyn(),
        ]
    }

    fn zeros_like(&self) -> Self {
        Self {
            heads:          self.heads,
            channels:       self.channels,
            negative_slope: self.negative_slope,
            lin:            zeros_like2(&self.lin),
            att_src:        zeros_like2(&self.att_src),
            att_dst:        zeros_like2(&self.att_dst),
            att_edge:       zeros_like2(&self.att_edge),
            lin_edge:       zeros_like2(&self.lin_edge),
            bias:           zeros_like1(&self.bias),
        }
    }
}
