//! Numeric graph tensors consumed by the network.

use ndarray::Array2;

use maas_core::NodeId;

use crate::{GraphError, GraphResult};

/// Width of the per-edge attribute vector: `[length, speed_indicator]`.
pub const EDGE_FEATURES: usize = 2;

/// Connectivity as a `[2, E]` array: row 0 holds sources, row 1 targets.
pub type EdgeIndex = Array2<usize>;

/// Node features, connectivity, and edge attributes for one forward pass.
///
/// Construction through [`GraphTensors::new`] guarantees the three arrays
/// agree with each other, so downstream code can index without checks.
#[derive(Clone, Debug)]
pub struct GraphTensors {
    /// `[N, F]` node feature matrix.
    pub features:   Array2<f64>,
    /// `[2, E]` edge index.
    pub edge_index: EdgeIndex,
    /// `[E, EDGE_FEATURES]` edge attributes.
    pub edge_attr:  Array2<f64>,
}

impl GraphTensors {
    pub fn new(
        features:   Array2<f64>,
        edge_index: EdgeIndex,
        edge_attr:  Array2<f64>,
    ) -> GraphResult<Self> {
        let num_nodes = features.nrows();
        let num_edges = edge_index.ncols();

        if edge_index.nrows() != 2 {
            return Err(GraphError::ShapeMismatch {
                what:     "edge index",
                expected: (2, num_edges),
                got:      edge_index.dim(),
            });
        }
        if edge_attr.dim() != (num_edges, EDGE_FEATURES) {
            return Err(GraphError::ShapeMismatch {
                what:     "edge attributes",
                expected: (num_edges, EDGE_FEATURES),
                got:      edge_attr.dim(),
            });
        }
        for e in 0..num_edges {
            let (src, dst) = (edge_index[[0, e]], edge_index[[1, e]]);
            if src >= num_nodes || dst >= num_nodes {
                return Err(GraphError::EdgeOutOfRange {
                    from:       NodeId(src as u32),
                    to:         NodeId(dst as u32),
                    node_count: num_nodes,
                });
            }
        }

        Ok(Self { features, edge_index, edge_attr })
    }

    pub fn num_nodes(&self) -> usize {
        self.features.nrows()
    }

    pub fn num_edges(&self) -> usize {
        self.edge_index.ncols()
    }

    /// Iterator over `(source, target)` row indices of every edge.
    pub fn edge_pairs(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        (0..self.num_edges()).map(|e| (self.edge_index[[0, e]], self.edge_index[[1, e]]))
    }
}
