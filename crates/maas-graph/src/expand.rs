//! Undirected adjacency expansion.
//!
//! The dataset stores each physical road once.  Message passing needs both
//! directions, and both the training loader and the scenario engine go
//! through [`expand_undirected`] so the two never disagree on ordering or
//! attribute duplication.

use ndarray::Array2;

use maas_core::EdgeId;

use crate::tensors::{EdgeIndex, EDGE_FEATURES};
use crate::RoadNetwork;

/// Materialise both directions of every stored edge.
///
/// Stored edge `e = (u, v)` contributes `(u, v)` immediately followed by
/// `(v, u)`, both carrying the attributes returned by `attr_of(e)`.
/// Self-loops are emitted once.
///
/// `attr_of` is called exactly once per stored edge, in `EdgeId` order, so a
/// stochastic attribute function yields the same value for both directions.
pub fn expand_undirected<F>(network: &RoadNetwork, mut attr_of: F) -> (EdgeIndex, Array2<f64>)
where
    F: FnMut(EdgeId) -> [f64; EDGE_FEATURES],
{
    let mut sources = Vec::with_capacity(network.edge_count() * 2);
    let mut targets = Vec::with_capacity(network.edge_count() * 2);
    let mut attrs: Vec<[f64; EDGE_FEATURES]> = Vec::with_capacity(network.edge_count() * 2);

    for edge in network.edges() {
        let (u, v) = network.endpoints(edge);
        let a = attr_of(edge);

        sources.push(u.index());
        targets.push(v.index());
        attrs.push(a);

        if u != v {
            sources.push(v.index());
            targets.push(u.index());
            attrs.push(a);
        }
    }

    let num_edges = sources.len();
    let edge_index = Array2::from_shape_fn((2, num_edges), |(row, col)| {
        if row == 0 { sources[col] } else { targets[col] }
    });
    let edge_attr = Array2::from_shape_fn((num_edges, EDGE_FEATURES), |(row, col)| attrs[row][col]);
    (edge_index, edge_attr)
}
