//! Precomputed message-passing structure for one graph.
//!
//! Built once per [`GraphTensors`] and reused by every layer of the forward
//! and backward pass (and by every epoch of full-batch training).

use ndarray::Array2;

use maas_graph::{GraphTensors, EDGE_FEATURES};

/// Connectivity views needed by the aggregation and attention stages.
#[derive(Clone, Debug)]
pub struct MessageGraph {
    pub num_nodes: usize,

    // ── Aggregation stage: the input edges as given ───────────────────────
    pub src:       Vec<usize>,
    pub dst:       Vec<usize>,
    /// Number of input edges arriving at each node.
    pub in_degree: Vec<usize>,

    // ── Attention stage ───────────────────────────────────────────────────
    // Input edges minus self-loops, then one self-loop per node carrying the
    // mean attribute of the node's other incoming edges (zero if none).
    pub att_src:   Vec<usize>,
    pub att_dst:   Vec<usize>,
    /// `[E_att, EDGE_FEATURES]`.
    pub att_attr:  Array2<f64>,
    /// Attention edge ids grouped by target node.  Never empty.
    pub incoming:  Vec<Vec<usize>>,
}

impl MessageGraph {
    pub fn new(tensors: &GraphTensors) -> Self {
        let n = tensors.num_nodes();

        let mut src = Vec::with_capacity(tensors.num_edges());
        let mut dst = Vec::with_capacity(tensors.num_edges());
        let mut in_degree = vec![0usize; n];
        for (s, d) in tensors.edge_pairs() {
            src.push(s);
            dst.push(d);
            in_degree[d] += 1;
        }

        let mut att_src = Vec::with_capacity(src.len() + n);
        let mut att_dst = Vec::with_capacity(src.len() + n);
        let mut attrs: Vec<[f64; EDGE_FEATURES]> = Vec::with_capacity(src.len() + n);
        let mut loop_sum = vec![[0.0; EDGE_FEATURES]; n];
        let mut loop_cnt = vec![0usize; n];

        for (e, (&s, &d)) in src.iter().zip(&dst).enumerate() {
            if s == d {
                continue;
            }
            let mut a = [0.0; EDGE_FEATURES];
            for (k, slot) in a.iter_mut().enumerate() {
                *slot = tensors.edge_attr[[e, k]];
                loop_sum[d][k] += *slot;
            }
            loop_cnt[d] += 1;
            att_src.push(s);
            att_dst.push(d);
            attrs.push(a);
        }
        for i in 0..n {
            let mut a = loop_sum[i];
            if loop_cnt[i] > 0 {
                a.iter_mut().for_each(|v| *v /= loop_cnt[i] as f64);
            }
            att_src.push(i);
            att_dst.push(i);
            attrs.push(a);
        }

        let mut incoming = vec![Vec::new(); n];
        for (e, &d) in att_dst.iter().enumerate() {
            incoming[d].push(e);
        }

        let att_attr = Array2::from_shape_fn((attrs.len(), EDGE_FEATURES), |(r, c)| attrs[r][c]);

        Self { num_nodes: n, src, dst, in_degree, att_src, att_dst, att_attr, incoming }
    }

    pub fn num_attention_edges(&self) -> usize {
        self.att_src.len()
    }
}
