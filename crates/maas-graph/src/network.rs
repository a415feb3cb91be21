//! Road network representation and builder.
//!
//! # Data layout
//!
//! Outgoing edges are kept in **Compressed Sparse Row (CSR)** form.  Given a
//! `NodeId n`, its stored outgoing edges occupy the `EdgeId` range:
//!
//! ```text
//! node_out_start[n] .. node_out_start[n+1]
//! ```
//!
//! All edge arrays are sorted by source node (stable, so edges sharing a
//! source keep their dataset order) and indexed by `EdgeId`.
//!
//! Node ids are dense and zero-based: `NodeId(i)` is row `i` of every
//! per-node tensor built from this network.

use maas_core::{EdgeId, GeoPoint, NodeId};

use crate::{GraphError, GraphResult};

/// Road-class tag used for nodes when the dataset gives none.
pub const DEFAULT_NODE_TAG: &str = "standard";

// ── Attribute bundles ─────────────────────────────────────────────────────────

/// Attributes of one node as supplied to the builder.
#[derive(Clone, Debug, PartialEq)]
pub struct NodeAttrs {
    pub pos:                GeoPoint,
    /// Classification tag (`"standard"`, `"primary"`, …).
    pub highway:            String,
    /// Normalised population density; clamped to [0, 1] on insertion.
    pub population_density: f64,
    pub ward_name:          String,
}

impl NodeAttrs {
    /// Convenience for tests and synthetic networks: a `standard` node with
    /// the given density at `pos`.
    pub fn with_density(pos: GeoPoint, population_density: f64) -> Self {
        Self {
            pos,
            highway: DEFAULT_NODE_TAG.to_string(),
            population_density,
            ward_name: String::new(),
        }
    }
}

/// Attributes of one stored edge.
#[derive(Clone, Debug, PartialEq)]
pub struct EdgeAttrs {
    /// Physical length in metres.
    pub length_m:  f64,
    /// Road-class tag (`"residential"`, `"primary"`, `"motorway"`, …).
    pub highway:   String,
    /// Numeric speed limit with any unit suffix already stripped.
    pub speed_kph: f64,
    pub name:      String,
}

impl EdgeAttrs {
    pub fn new(length_m: f64, speed_kph: f64) -> Self {
        Self {
            length_m,
            highway: "residential".to_string(),
            speed_kph,
            name: String::new(),
        }
    }
}

// ── RoadNetwork ───────────────────────────────────────────────────────────────

/// Directed road graph in CSR format.
///
/// All fields are `pub` for direct indexed access.  Do not construct
/// directly; use [`RoadNetworkBuilder`].
#[derive(Clone, Debug)]
pub struct RoadNetwork {
    // ── Node data (indexed by NodeId) ─────────────────────────────────────
    pub node_pos:        Vec<GeoPoint>,
    pub node_highway:    Vec<String>,
    pub node_density:    Vec<f64>,
    pub node_ward:       Vec<String>,

    // ── CSR edge adjacency ────────────────────────────────────────────────
    /// Length = `node_count + 1`.
    pub node_out_start:  Vec<u32>,

    // ── Edge data (indexed by EdgeId) ─────────────────────────────────────
    pub edge_from:       Vec<NodeId>,
    pub edge_to:         Vec<NodeId>,
    pub edge_length_m:   Vec<f64>,
    pub edge_highway:    Vec<String>,
    pub edge_speed_kph:  Vec<f64>,
    pub edge_name:       Vec<String>,
}

impl RoadNetwork {
    pub fn node_count(&self) -> usize {
        self.node_pos.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edge_to.len()
    }

    pub fn is_empty(&self) -> bool {
        self.node_pos.is_empty()
    }

    /// Iterator over every node id, in index order.
    pub fn nodes(&self) -> impl Iterator<Item = NodeId> {
        (0..self.node_count() as u32).map(NodeId)
    }

    /// Iterator over every stored edge id, in CSR order.
    pub fn edges(&self) -> impl Iterator<Item = EdgeId> {
        (0..self.edge_count() as u32).map(EdgeId)
    }

    /// Iterator over the `EdgeId`s of all stored outgoing edges from `node`.
    #[inline]
    pub fn out_edges(&self, node: NodeId) -> impl Iterator<Item = EdgeId> + '_ {
        let start = self.node_out_start[node.index()];
        let end   = self.node_out_start[node.index() + 1];
        (start..end).map(EdgeId)
    }

    #[inline]
    pub fn out_degree(&self, node: NodeId) -> usize {
        let start = self.node_out_start[node.index()] as usize;
        let end   = self.node_out_start[node.index() + 1] as usize;
        end - start
    }

    /// `(source, target)` of a stored edge.
    #[inline]
    pub fn endpoints(&self, edge: EdgeId) -> (NodeId, NodeId) {
        (self.edge_from[edge.index()], self.edge_to[edge.index()])
    }

    /// Re-assemble the attribute bundle of a node.
    pub fn node_attrs(&self, node: NodeId) -> NodeAttrs {
        let i = node.index();
        NodeAttrs {
            pos:                self.node_pos[i],
            highway:            self.node_highway[i].clone(),
            population_density: self.node_density[i],
            ward_name:          self.node_ward[i].clone(),
        }
    }

    /// Re-assemble the attribute bundle of a stored edge.
    pub fn edge_attrs(&self, edge: EdgeId) -> EdgeAttrs {
        let i = edge.index();
        EdgeAttrs {
            length_m:  self.edge_length_m[i],
            highway:   self.edge_highway[i].clone(),
            speed_kph: self.edge_speed_kph[i],
            name:      self.edge_name[i].clone(),
        }
    }
}

// ── RoadNetworkBuilder ────────────────────────────────────────────────────────

/// Construct a [`RoadNetwork`] incrementally, then call [`build`](Self::build).
///
/// # Example
///
/// ```
/// use maas_core::GeoPoint;
/// use maas_graph::{EdgeAttrs, NodeAttrs, RoadNetworkBuilder};
///
/// let mut b = RoadNetworkBuilder::new();
/// let a = b.add_node(NodeAttrs::with_density(GeoPoint::new(18.93, 72.83), 0.4));
/// let c = b.add_node(NodeAttrs::with_density(GeoPoint::new(18.94, 72.83), 0.9));
/// b.add_edge(a, c, EdgeAttrs::new(120.0, 50.0));
/// let net = b.build().unwrap();
/// assert_eq!(net.node_count(), 2);
/// assert_eq!(net.edge_count(), 1); // stored direction only
/// ```
pub struct RoadNetworkBuilder {
    nodes:     Vec<NodeAttrs>,
    raw_edges: Vec<RawEdge>,
}

struct RawEdge {
    from:  NodeId,
    to:    NodeId,
    attrs: EdgeAttrs,
}

impl RoadNetworkBuilder {
    pub fn new() -> Self {
        Self { nodes: Vec::new(), raw_edges: Vec::new() }
    }

    pub fn with_capacity(nodes: usize, edges: usize) -> Self {
        Self {
            nodes:     Vec::with_capacity(nodes),
            raw_edges: Vec::with_capacity(edges),
        }
    }

    /// Add a node and return its `NodeId` (sequential from 0).
    pub fn add_node(&mut self, mut attrs: NodeAttrs) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        if !(0.0..=1.0).contains(&attrs.population_density) {
            log::debug!(
                "clamping population density {} of {id} into [0, 1]",
                attrs.population_density
            );
            attrs.population_density = if attrs.population_density.is_nan() {
                0.0
            } else {
                attrs.population_density.clamp(0.0, 1.0)
            };
        }
        self.nodes.push(attrs);
        id
    }

    /// Add a stored (single-direction) edge from `from` to `to`.
    pub fn add_edge(&mut self, from: NodeId, to: NodeId, attrs: EdgeAttrs) {
        self.raw_edges.push(RawEdge { from, to, attrs });
    }

    pub fn node_count(&self) -> usize { self.nodes.len() }
    pub fn edge_count(&self) -> usize { self.raw_edges.len() }

    /// Consume the builder and produce a [`RoadNetwork`].
    ///
    /// Fails with [`GraphError::EdgeOutOfRange`] if any edge references a node
    /// that was never added.
    pub fn build(self) -> GraphResult<RoadNetwork> {
        let node_count = self.nodes.len();
        let edge_count = self.raw_edges.len();

        if let Some(bad) = self
            .raw_edges
            .iter()
            .find(|e| e.from.index() >= node_count || e.to.index() >= node_count)
        {
            return Err(GraphError::EdgeOutOfRange {
                from: bad.from,
                to:   bad.to,
                node_count,
            });
        }

        // Stable sort keeps dataset order among edges with the same source.
        let mut raw = self.raw_edges;
        raw.sort_by_key(|e| e.from.0);

        let mut node_out_start = vec![0u32; node_count + 1];
        for e in &raw {
            node_out_start[e.from.index() + 1] += 1;
        }
        for i in 1..=node_count {
            node_out_start[i] += node_out_start[i - 1];
        }
        debug_assert_eq!(node_out_start[node_count] as usize, edge_count);

        let mut edge_from      = Vec::with_capacity(edge_count);
        let mut edge_to        = Vec::with_capacity(edge_count);
        let mut edge_length_m  = Vec::with_capacity(edge_count);
        let mut edge_highway   = Vec::with_capacity(edge_count);
        let mut edge_speed_kph = Vec::with_capacity(edge_count);
        let mut edge_name      = Vec::with_capacity(edge_count);
        for e in raw {
            edge_from.push(e.from);
            edge_to.push(e.to);
            edge_length_m.push(e.attrs.length_m);
            edge_highway.push(e.attrs.highway);
            edge_speed_kph.push(e.attrs.speed_kph);
            edge_name.push(e.attrs.name);
        }

        let mut node_pos     = Vec::with_capacity(node_count);
        let mut node_highway = Vec::with_capacity(node_count);
        let mut node_density = Vec::with_capacity(node_count);
        let mut node_ward    = Vec::with_capacity(node_count);
        for n in self.nodes {
            node_pos.push(n.pos);
            node_highway.push(n.highway);
            node_density.push(n.population_density);
            node_ward.push(n.ward_name);
        }

        Ok(RoadNetwork {
            node_pos,
            node_highway,
            node_density,
            node_ward,
            node_out_start,
            edge_from,
            edge_to,
            edge_length_m,
            edge_highway,
            edge_speed_kph,
            edge_name,
        })
    }
}

impl Default for RoadNetworkBuilder {
    fn default() -> Self {
        Self::new()
    }
}
