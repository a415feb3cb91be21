//! The two-stage traffic network and its fleet-impact head.

use ndarray::{Array2, ArrayViewD, ArrayViewMutD, Axis};
use serde::{Deserialize, Serialize};

use maas_core::SimRng;
use maas_graph::{GraphTensors, EDGE_FEATURES};

use crate::layers::activation::{dropout_mask, elu, elu_backward, relu, relu_backward};
use crate::layers::gat::{GatCache, GatConv};
use crate::layers::linear::Linear;
use crate::layers::norm::{GraphNorm, NormCache};
use crate::layers::sage::{SageCache, SageConv};
use crate::layers::Parameterized;
use crate::message::MessageGraph;
use crate::{GnnError, GnnResult};

/// Output column holding the fleet-allocation score.
pub const FLEET_CHANNEL: usize = 2;

/// Architecture hyper-parameters.  Persisted next to the weights so a
/// parameter file can be checked against the network that loads it.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NetworkConfig {
    pub in_channels:     usize,
    pub hidden_channels: usize,
    pub heads:           usize,
    pub out_channels:    usize,
    pub edge_dim:        usize,
    /// Dropout probability after the first stage, training only.
    pub dropout:         f64,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            in_channels:     5,
            hidden_channels: 32,
            heads:           4,
            out_channels:    3,
            edge_dim:        EDGE_FEATURES,
            dropout:         0.1,
        }
    }
}

// ── Parameters ────────────────────────────────────────────────────────────────

/// Every learnable tensor of the network.  Also used as the gradient
/// accumulator (see [`Parameterized::zeros_like`]).
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct NetworkParams {
    pub sage:     SageConv,
    pub norm1:    GraphNorm,
    pub gat:      GatConv,
    pub norm2:    GraphNorm,
    pub out_proj: Linear,
}

impl NetworkParams {
    pub fn init(config: &NetworkConfig, rng: &mut SimRng) -> Self {
        let hidden = config.hidden_channels;
        let wide = hidden * config.heads;
        Self {
            sage:     SageConv::new(config.in_channels, hidden, rng),
            norm1:    GraphNorm::new(hidden),
            gat:      GatConv::new(hidden, hidden, config.heads, config.edge_dim, rng),
            norm2:    GraphNorm::new(wide),
            out_proj: Linear::new(wide, config.out_channels, rng),
        }
    }

    /// Describe the first tensor whose shape disagrees with `config`.
    pub fn shape_mismatch(&self, config: &NetworkConfig) -> Option<String> {
        let (i, h, k, o, e) = (
            config.in_channels,
            config.hidden_channels,
            config.heads,
            config.out_channels,
            config.edge_dim,
        );
        let checks: [(&str, &[usize], Vec<usize>); 15] = [
            ("sage.lin_l",      self.sage.lin_l.shape(),      vec![i, h]),
            ("sage.bias",       self.sage.bias.shape(),       vec![h]),
            ("sage.lin_r",      self.sage.lin_r.shape(),      vec![i, h]),
            ("norm1.weight",    self.norm1.weight.shape(),    vec![h]),
            ("norm1.bias",      self.norm1.bias.shape(),      vec![h]),
            ("norm1.mean_scale", self.norm1.mean_scale.shape(), vec![h]),
            ("gat.lin",         self.gat.lin.shape(),         vec![h, k * h]),
            ("gat.att_src",     self.gat.att_src.shape(),     vec![k, h]),
            ("gat.att_dst",     self.gat.att_dst.shape(),     vec![k, h]),
            ("gat.att_edge",    self.gat.att_edge.shape(),    vec![k, h]),
            ("gat.lin_edge",    self.gat.lin_edge.shape(),    vec![e, k * h]),
            ("gat.bias",        self.gat.bias.shape(),        vec![k * h]),
            ("norm2",           self.norm2.weight.shape(),    vec![k * h]),
            ("out_proj.weight", self.out_proj.weight.shape(), vec![k * h, o]),
            ("out_proj.bias",   self.out_proj.bias.shape(),   vec![o]),
        ];
        for (name, got, expected) in checks {
            if got != expected.as_slice() {
                return Some(format!("{name} has shape {got:?}, expected {expected:?}"));
            }
        }
        if self.gat.heads != k || self.gat.channels != h {
            return Some(format!(
                "attention layer declares {}x{} heads/channels, expected {k}x{h}",
                self.gat.heads, self.gat.channels
            ));
        }
        if self.norm2.bias.len() != k * h || self.norm2.mean_scale.len() != k * h {
            return Some(format!("norm2 vectors must all have length {}", k * h));
        }
        None
    }
}

impl Parameterized for NetworkParams {
    fn tensors(&self) -> Vec<ArrayViewD<'_, f64>> {
        let mut t = self.sage.tensors();
        t.extend(self.norm1.tensors());
        t.extend(self.gat.tensors());
        t.extend(self.norm2.tensors());
        t.extend(self.out_proj.tensors());
        t
    }

    fn tensors_mut(&mut self) -> Vec<ArrayViewMutD<'_, f64>> {
        let mut t = self.sage.tensors_mut();
        t.extend(self.norm1.tensors_mut());
        t.extend(self.gat.tensors_mut());
        t.extend(self.norm2.tensors_mut());
        t.extend(self.out_proj.tensors_mut());
        t
    }

    fn zeros_like(&self) -> Self {
        Self {
            sage:     self.sage.zeros_like(),
            norm1:    self.norm1.zeros_like(),
            gat:      self.gat.zeros_like(),
            norm2:    self.norm2.zeros_like(),
            out_proj: self.out_proj.zeros_like(),
        }
    }
}

// ── Forward cache ─────────────────────────────────────────────────────────────

/// Intermediates of one training-mode forward pass.
pub struct ForwardCache {
    sage:       SageCache,
    norm1:      NormCache,
    norm1_out:  Array2<f64>,
    mask:       Option<Array2<f64>>,
    gat:        GatCache,
    norm2:      NormCache,
    norm2_out:  Array2<f64>,
    hidden:     Array2<f64>,
    projection: Array2<f64>,
}

impl ForwardCache {
    pub fn attention(&self) -> &Array2<f64> {
        self.gat.attention()
    }
}

// ── Network ───────────────────────────────────────────────────────────────────

/// Maps per-node features to `[predicted_flow, optimal_eta,
/// fleet_allocation_score]`, all non-negative.
///
/// ```text
/// x ─ SAGE ─ GraphNorm ─ ELU ─ dropout ─ GAT(heads, edge attrs)
///   ─ GraphNorm ─ ELU ─ Linear ─ ReLU
/// ```
///
/// Inference takes `&self`, so one trained network can be shared across
/// threads behind an `Arc`.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct MaasGraphNetwork {
    pub config: NetworkConfig,
    pub params: NetworkParams,
}

impl MaasGraphNetwork {
    /// Freshly initialised (untrained) network.
    pub fn new(config: NetworkConfig, rng: &mut SimRng) -> Self {
        let params = NetworkParams::init(&config, rng);
        Self { config, params }
    }

    /// Validate `tensors` against this network and precompute its message
    /// structure.
    pub fn prepare(&self, tensors: &GraphTensors) -> GnnResult<MessageGraph> {
        let width = tensors.features.ncols();
        if width != self.config.in_channels {
            return Err(GnnError::FeatureWidth { expected: self.config.in_channels, got: width });
        }
        if tensors.edge_attr.ncols() != self.config.edge_dim {
            return Err(GnnError::FeatureWidth { expected: self.config.edge_dim, got: tensors.edge_attr.ncols() });
        }
        Ok(MessageGraph::new(tensors))
    }

    /// Inference-mode forward pass (dropout disabled).
    pub fn forward(&self, tensors: &GraphTensors) -> GnnResult<Array2<f64>> {
        let graph = self.prepare(tensors)?;
        Ok(self.run(&tensors.features, &graph, None).0)
    }

    /// Inference on a prepared graph.
    pub fn predict(&self, features: &Array2<f64>, graph: &MessageGraph) -> GnnResult<Array2<f64>> {
        self.check_input(features, graph)?;
        Ok(self.run(features, graph, None).0)
    }

    /// Training-mode forward pass: dropout masks are drawn from `rng`.
    pub fn forward_train(
        &self,
        features: &Array2<f64>,
        graph:    &MessageGraph,
        rng:      &mut SimRng,
    ) -> GnnResult<(Array2<f64>, ForwardCache)> {
        self.check_input(features, graph)?;
        Ok(self.run(features, graph, Some(rng)))
    }

    fn run(
        &self,
        x:           &Array2<f64>,
        graph:       &MessageGraph,
        dropout_rng: Option<&mut SimRng>,
    ) -> (Array2<f64>, ForwardCache) {
        let p = &self.params;

        let (h, sage) = p.sage.forward(x, graph);
        let (norm1_out, norm1) = p.norm1.forward(&h);
        let mut h = elu(&norm1_out);
        let mask = dropout_rng.map(|rng| dropout_mask(h.dim(), self.config.dropout, rng));
        if let Some(mask) = &mask {
            h *= mask;
        }

        let (h, gat) = p.gat.forward(&h, graph);
        let (norm2_out, norm2) = p.norm2.forward(&h);
        let hidden = elu(&norm2_out);
        let projection = p.out_proj.forward(&hidden);
        let out = relu(&projection);

        let cache = ForwardCache { sage, norm1, norm1_out, mask, gat, norm2, norm2_out, hidden, projection };
        (out, cache)
    }

    /// Gradients of the loss with respect to every parameter, given
    /// `dL/d(output)`.
    pub fn backward(&self, cache: &ForwardCache, graph: &MessageGraph, grad_output: &Array2<f64>) -> NetworkParams {
        let p = &self.params;
        let mut grads = p.zeros_like();

        let d = relu_backward(&cache.projection, grad_output);
        let d = p.out_proj.backward(&cache.hidden, &d, &mut grads.out_proj);
        let d = elu_backward(&cache.norm2_out, &d);
        let d = p.norm2.backward(&cache.norm2, &d, &mut grads.norm2);
        let mut d = p.gat.backward(&cache.gat, &d, graph, &mut grads.gat);
        if let Some(mask) = &cache.mask {
            d *= mask;
        }
        let d = elu_backward(&cache.norm1_out, &d);
        let d = p.norm1.backward(&cache.norm1, &d, &mut grads.norm1);
        p.sage.backward(&cache.sage, &d, &mut grads.sage);

        grads
    }

    /// Predicted fleet utilisation in `[0, 1]` after removing
    /// `reduction_pct` of the vehicle fleet.  See [`impact_from_predictions`].
    pub fn fleet_reduction_impact(&self, tensors: &GraphTensors, reduction_pct: f64) -> GnnResult<f64> {
        let predictions = self.forward(tensors)?;
        Ok(impact_from_predictions(&predictions, reduction_pct))
    }
}

/// `min(mean(fleet_allocation_score) · (1 + 0.5 · ln(reduction_pct + 1)), 1)`.
///
/// The score is averaged over all nodes.  Negative reductions are treated as
/// zero, and a graph with no nodes has zero utilisation.
pub fn impact_from_predictions(predictions: &Array2<f64>, reduction_pct: f64) -> f64 {
    if predictions.nrows() == 0 || predictions.ncols() <= FLEET_CHANNEL {
        return 0.0;
    }
    let base = predictions.column(FLEET_CHANNEL).mean().unwrap_or(0.0).max(0.0);
    let adjustment = 1.0 + 0.5 * (reduction_pct.max(0.0) + 1.0).ln();
    (base * adjustment).min(1.0)
}

/// Mean of each output column.
pub fn column_means(predictions: &Array2<f64>) -> Vec<f64> {
    predictions
        .mean_axis(Axis(0))
        .map(|m| m.to_vec())
        .unwrap_or_else(|| vec![0.0; predictions.ncols()])
}

impl MaasGraphNetwork {
    fn check_input(&self, features: &Array2<f64>, graph: &MessageGraph) -> GnnResult<()> {
        if features.ncols() != self.config.in_channels {
            return Err(GnnError::FeatureWidth { expected: self.config.in_channels, got: features.ncols() });
        }
        if features.nrows() != graph.num_nodes {
            return Err(GnnError::RowMismatch {
                what:     "node features",
                expected: graph.num_nodes,
                got:      features.nrows(),
            });
        }
        Ok(())
    }
}
