//! JSON road-network dataset: schema, loader, and writer.
//!
//! # Format
//!
//! ```text
//! {
//!   "metadata": { "source": "...", "nodes_count": N, "edges_count": E },
//!   "nodes": [ { "id", "y", "x", "highway", "population_density", "ward_name" } ],
//!   "edges": [ { "source", "target", "length", "highway", "maxspeed", "name" } ]
//! }
//! ```
//!
//! Map extracts are inconsistent, so every optional field has a fallback:
//! missing `length` becomes [`DEFAULT_LENGTH_M`], a missing or unparseable
//! `maxspeed` becomes [`DEFAULT_SPEED_KPH`], and a missing
//! `population_density` becomes [`DEFAULT_POPULATION_DENSITY`].  Tags and
//! speeds that arrive as lists contribute their first element.

use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

use serde::{Deserialize, Serialize};

use maas_core::{GeoPoint, NodeId};

use crate::network::{EdgeAttrs, NodeAttrs, RoadNetwork, RoadNetworkBuilder, DEFAULT_NODE_TAG};
use crate::{GraphError, GraphResult};

pub const DEFAULT_LENGTH_M: f64 = 100.0;
pub const DEFAULT_SPEED_KPH: f64 = 50.0;
pub const DEFAULT_POPULATION_DENSITY: f64 = 0.5;
const DEFAULT_EDGE_TAG: &str = "residential";
const DEFAULT_ROAD_NAME: &str = "Unnamed Road";

// ── Schema ────────────────────────────────────────────────────────────────────

/// The dataset document exactly as it appears on disk.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct RawDataset {
    #[serde(default)]
    pub metadata: DatasetMetadata,
    pub nodes:    Vec<RawNode>,
    pub edges:    Vec<RawEdge>,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct DatasetMetadata {
    #[serde(default)]
    pub source:      String,
    #[serde(default)]
    pub nodes_count: usize,
    #[serde(default)]
    pub edges_count: usize,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RawNode {
    pub id: u32,
    /// Latitude.
    #[serde(default)]
    pub y: f64,
    /// Longitude.
    #[serde(default)]
    pub x: f64,
    #[serde(default)]
    pub highway: Option<TagValue>,
    #[serde(default)]
    pub population_density: Option<f64>,
    #[serde(default)]
    pub ward_name: Option<String>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RawEdge {
    pub source: u32,
    pub target: u32,
    #[serde(default)]
    pub length: Option<f64>,
    #[serde(default)]
    pub highway: Option<TagValue>,
    #[serde(default)]
    pub maxspeed: Option<SpeedValue>,
    #[serde(default)]
    pub name: Option<TagValue>,
}

/// A string tag, or a list of tags of which the first one counts.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TagValue {
    One(String),
    Many(Vec<String>),
}

impl TagValue {
    pub fn first(&self) -> Option<&str> {
        match self {
            TagValue::One(s)   => Some(s.as_str()),
            TagValue::Many(v)  => v.first().map(String::as_str),
        }
    }
}

/// A speed limit as found in map extracts: a number, a string with an
/// optional unit suffix (`"50"`, `"30 mph"`, `"60km/h"`), or a list of
/// either.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SpeedValue {
    Number(f64),
    Text(String),
    Many(Vec<SpeedValue>),
}

impl SpeedValue {
    /// The numeric speed, or `None` if nothing parseable is present.
    pub fn numeric(&self) -> Option<f64> {
        match self {
            SpeedValue::Number(v) if v.is_finite() => Some(*v),
            SpeedValue::Number(_)                  => None,
            SpeedValue::Text(s)                    => parse_speed(s),
            SpeedValue::Many(v)                    => v.first().and_then(SpeedValue::numeric),
        }
    }
}

/// Normalise a speed string to a number.
///
/// Whitespace and the `mph` / `km/h` / `kmh` / `kph` suffixes are removed;
/// multi-valued tags (`"50;30"`) keep the first value.  The number is kept
/// as written: no unit conversion is applied.
pub fn parse_speed(text: &str) -> Option<f64> {
    let cleaned: String = text
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect::<String>()
        .to_ascii_lowercase();
    let first = cleaned.split([';', '|', ',']).next().unwrap_or("");
    let numeric = first
        .trim_end_matches("mph")
        .trim_end_matches("km/h")
        .trim_end_matches("kmh")
        .trim_end_matches("kph");
    numeric.parse::<f64>().ok().filter(|v| v.is_finite())
}

// ── Loading ───────────────────────────────────────────────────────────────────

/// Read the raw dataset document.
///
/// # Errors
///
/// [`GraphError::Unavailable`] if the file cannot be opened,
/// [`GraphError::Malformed`] if it is not a dataset document.
pub fn read_dataset(path: &Path) -> GraphResult<RawDataset> {
    let file = File::open(path).map_err(|source| GraphError::Unavailable {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_reader(BufReader::new(file)).map_err(|source| GraphError::Malformed {
        path: path.to_path_buf(),
        source,
    })
}

/// Load a dataset file into a [`RoadNetwork`].
pub fn load_network(path: &Path) -> GraphResult<RoadNetwork> {
    let raw = read_dataset(path)?;
    let network = raw.to_network()?;
    log::info!(
        "loaded road network from {}: {} nodes, {} edges",
        path.display(),
        network.node_count(),
        network.edge_count()
    );
    Ok(network)
}

impl RawDataset {
    /// Convert to a [`RoadNetwork`], substituting defaults for missing
    /// optional fields.
    ///
    /// Nodes may appear in any order, but their ids must be exactly
    /// `0..N-1`.
    pub fn to_network(&self) -> GraphResult<RoadNetwork> {
        let mut nodes: Vec<&RawNode> = self.nodes.iter().collect();
        nodes.sort_by_key(|n| n.id);
        for (expected, node) in nodes.iter().enumerate() {
            if node.id as usize != expected {
                return Err(GraphError::NonContiguousIds {
                    expected: expected as u32,
                    found:    node.id,
                });
            }
        }

        let mut b = RoadNetworkBuilder::with_capacity(nodes.len(), self.edges.len());
        for node in nodes {
            b.add_node(NodeAttrs {
                pos:                GeoPoint::new(node.y, node.x),
                highway:            node
                    .highway
                    .as_ref()
                    .and_then(TagValue::first)
                    .unwrap_or(DEFAULT_NODE_TAG)
                    .to_string(),
                population_density: node
                    .population_density
                    .unwrap_or(DEFAULT_POPULATION_DENSITY),
                ward_name:          node.ward_name.clone().unwrap_or_default(),
            });
        }

        let mut defaulted_speeds = 0usize;
        for edge in &self.edges {
            let speed_kph = match edge.maxspeed.as_ref().and_then(SpeedValue::numeric) {
                Some(v) => v,
                None => {
                    defaulted_speeds += 1;
                    DEFAULT_SPEED_KPH
                }
            };
            b.add_edge(
                NodeId(edge.source),
                NodeId(edge.target),
                EdgeAttrs {
                    length_m: edge
                        .length
                        .filter(|v| v.is_finite())
                        .unwrap_or(DEFAULT_LENGTH_M),
                    highway: edge
                        .highway
                        .as_ref()
                        .and_then(TagValue::first)
                        .unwrap_or(DEFAULT_EDGE_TAG)
                        .to_string(),
                    speed_kph,
                    name: edge
                        .name
                        .as_ref()
                        .and_then(TagValue::first)
                        .unwrap_or(DEFAULT_ROAD_NAME)
                        .to_string(),
                },
            );
        }
        if defaulted_speeds > 0 {
            log::debug!("{defaulted_speeds} edges had no usable maxspeed; using {DEFAULT_SPEED_KPH}");
        }

        b.build()
    }

    /// Build the on-disk document for `network`.
    pub fn from_network(network: &RoadNetwork, source: &str) -> Self {
        let nodes = network
            .nodes()
            .map(|n| {
                let a = network.node_attrs(n);
                RawNode {
                    id:                 n.0,
                    y:                  a.pos.lat,
                    x:                  a.pos.lon,
                    highway:            Some(TagValue::One(a.highway)),
                    population_density: Some(a.population_density),
                    ward_name:          Some(a.ward_name),
                }
            })
            .collect::<Vec<_>>();

        let edges = network
            .edges()
            .map(|e| {
                let (from, to) = network.endpoints(e);
                let a = network.edge_attrs(e);
                RawEdge {
                    source:   from.0,
                    target:   to.0,
                    length:   Some(a.length_m),
                    highway:  Some(TagValue::One(a.highway)),
                    maxspeed: Some(SpeedValue::Text(format!("{}", a.speed_kph))),
                    name:     Some(TagValue::One(a.name)),
                }
            })
            .collect::<Vec<_>>();

        RawDataset {
            metadata: DatasetMetadata {
                source:      source.to_string(),
                nodes_count: nodes.len(),
                edges_count: edges.len(),
            },
            nodes,
            edges,
        }
    }
}

/// Write a dataset document as JSON.
pub fn write_dataset(path: &Path, dataset: &RawDataset) -> GraphResult<()> {
    let mut writer = BufWriter::new(File::create(path)?);
    serde_json::to_writer(&mut writer, dataset)?;
    writer.flush()?;
    Ok(())
}
