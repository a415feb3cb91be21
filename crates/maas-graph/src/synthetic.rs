//! Synthetic Erdős–Rényi road networks.
//!
//! Used to produce a dataset when no map extract is at hand, and by tests
//! that need a graph larger than a hand-built one.  Node positions fall in a
//! configurable bounding box (South Mumbai by default).

use maas_core::{GeoPoint, NodeId, SimRng};

use crate::network::{EdgeAttrs, NodeAttrs, RoadNetwork, RoadNetworkBuilder, DEFAULT_NODE_TAG};
use crate::GraphResult;

/// Road classes drawn for synthetic edges, with the default speed the map
/// fetcher assigns when a road carries no explicit `maxspeed`.
const ROAD_CLASSES: [(&str, f64); 4] = [
    ("residential", 30.0),
    ("secondary",   50.0),
    ("primary",     50.0),
    ("trunk",       80.0),
];

/// Parameters of a synthetic network.
#[derive(Clone, Debug)]
pub struct SyntheticSpec {
    pub num_nodes:        usize,
    /// Probability that any unordered node pair is joined by a road.
    pub edge_probability: f64,
    /// `(south, west)` corner of the bounding box.
    pub south_west:       GeoPoint,
    /// `(north, east)` corner of the bounding box.
    pub north_east:       GeoPoint,
    /// Probability that a node is tagged `primary`.
    pub primary_node_probability: f64,
}

impl Default for SyntheticSpec {
    fn default() -> Self {
        Self {
            num_nodes:        500,
            edge_probability: 0.02,
            south_west:       GeoPoint::new(18.90, 72.80),
            north_east:       GeoPoint::new(18.98, 72.85),
            primary_node_probability: 0.05,
        }
    }
}

impl SyntheticSpec {
    /// Sample a network.  Each unordered pair `(i, j)`, `i < j`, is stored as
    /// a single edge `i -> j` with probability `edge_probability`.
    pub fn generate(&self, rng: &mut SimRng) -> GraphResult<RoadNetwork> {
        let expected_edges =
            (self.num_nodes * self.num_nodes.saturating_sub(1)) as f64 * self.edge_probability / 2.0;
        let mut b = RoadNetworkBuilder::with_capacity(self.num_nodes, expected_edges as usize);

        for i in 0..self.num_nodes {
            let lat = lerp(self.south_west.lat, self.north_east.lat, rng.random::<f64>());
            let lon = lerp(self.south_west.lon, self.north_east.lon, rng.random::<f64>());
            let highway = if rng.gen_bool(self.primary_node_probability) {
                "primary"
            } else {
                DEFAULT_NODE_TAG
            };
            b.add_node(NodeAttrs {
                pos:                GeoPoint::new(lat, lon),
                highway:            highway.to_string(),
                population_density: round3(rng.gen_range(0.25..=1.0)),
                ward_name:          format!("Synthetic ward {}", i % 5),
            });
        }

        for i in 0..self.num_nodes {
            for j in (i + 1)..self.num_nodes {
                if !rng.gen_bool(self.edge_probability) {
                    continue;
                }
                let (class, speed) = *rng.choose(&ROAD_CLASSES).unwrap_or(&ROAD_CLASSES[0]);
                b.add_edge(
                    NodeId(i as u32),
                    NodeId(j as u32),
                    EdgeAttrs {
                        length_m:  round1(rng.gen_range(40.0..600.0)),
                        highway:   class.to_string(),
                        speed_kph: speed,
                        name:      format!("Road {i}-{j}"),
                    },
                );
            }
        }

        b.build()
    }
}

fn lerp(a: f64, b: f64, t: f64) -> f64 {
    a + (b - a) * t
}

fn round1(v: f64) -> f64 {
    (v * 10.0).round() / 10.0
}

fn round3(v: f64) -> f64 {
    (v * 1_000.0).round() / 1_000.0
}
