//! Which nodes are motorway hubs and which edges are motorway-class.
//!
//! Designation is not a property of the static road network; a policy
//! decides it for each scenario run.  [`Resampled`] re-rolls every call, so
//! two runs of the same scenario see different fast-lane layouts.
//! [`Pinned`] fixes one layout for every call.

use maas_core::SimRng;
use maas_graph::RoadNetwork;

use crate::{SimError, SimResult};

/// Per-node hub flags and per-stored-edge motorway flags.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Designation {
    pub hubs:           Vec<bool>,
    pub motorway_edges: Vec<bool>,
}

impl Designation {
    /// Nothing designated.
    pub fn none(network: &RoadNetwork) -> Self {
        Self {
            hubs:           vec![false; network.node_count()],
            motorway_edges: vec![false; network.edge_count()],
        }
    }

    pub fn hub_count(&self) -> usize {
        self.hubs.iter().filter(|h| **h).count()
    }

    pub fn motorway_edge_count(&self) -> usize {
        self.motorway_edges.iter().filter(|m| **m).count()
    }
}

/// Decides the fast-lane layout for one scenario run.
///
/// Implementations must return [`Designation::none`] when `use_motorways` is
/// false.
pub trait DesignationPolicy: Send + Sync {
    fn designate(&self, network: &RoadNetwork, use_motorways: bool, rng: &mut SimRng) -> SimResult<Designation>;
}

/// Independent Bernoulli draws on every call.
#[derive(Clone, Debug)]
pub struct Resampled {
    pub hub_probability:           f64,
    pub motorway_edge_probability: f64,
}

impl Default for Resampled {
    fn default() -> Self {
        Self { hub_probability: 0.1, motorway_edge_probability: 0.15 }
    }
}

impl DesignationPolicy for Resampled {
    fn designate(&self, network: &RoadNetwork, use_motorways: bool, rng: &mut SimRng) -> SimResult<Designation> {
        if !use_motorways {
            return Ok(Designation::none(network));
        }
        let hubs = network.nodes().map(|_| rng.gen_bool(self.hub_probability)).collect();
        let motorway_edges = network.edges().map(|_| rng.gen_bool(self.motorway_edge_probability)).collect();
        Ok(Designation { hubs, motorway_edges })
    }
}

/// The same designation on every call.
#[derive(Clone, Debug)]
pub struct Pinned(pub Designation);

impl Pinned {
    /// Draw one designation with `policy` and keep it.
    pub fn sample_once(policy: &Resampled, network: &RoadNetwork, rng: &mut SimRng) -> SimResult<Self> {
        Ok(Pinned(policy.designate(network, true, rng)?))
    }
}

impl DesignationPolicy for Pinned {
    fn designate(&self, network: &RoadNetwork, use_motorways: bool, _rng: &mut SimRng) -> SimResult<Designation> {
        if self.0.hubs.len() != network.node_count() {
            return Err(SimError::DesignationMismatch {
                what:     "nodes",
                expected: network.node_count(),
                got:      self.0.hubs.len(),
            });
        }
        if self.0.motorway_edges.len() != network.edge_count() {
            return Err(SimError::DesignationMismatch {
                what:     "edges",
                expected: network.edge_count(),
                got:      self.0.motorway_edges.len(),
            });
        }
        if !use_motorways {
            return Ok(Designation::none(network));
        }
        Ok(self.0.clone())
    }
}
