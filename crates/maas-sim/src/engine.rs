//! The scenario engine: scenario config in, city-wide metrics out.

use std::sync::Arc;

use ndarray::Array2;
use serde::{Deserialize, Serialize};

use maas_core::{EdgeId, SimRng};
use maas_features::{features_to_array, FeatureVector};
use maas_gnn::{column_means, impact_from_predictions, MaasGraphNetwork};
use maas_graph::{expand_undirected, GraphTensors, RoadNetwork};

use crate::designation::{Designation, DesignationPolicy, Resampled};
use crate::{ScenarioConfig, SimError, SimResult};

/// Normalised speed of hub nodes and motorway edges.
const FAST_LANE_SPEED: f64 = 1.0;
/// Normalised speed of every other node and edge.
const MIXED_TRAFFIC_SPEED: f64 = 0.3;

/// The three city-wide metrics of one simulation step.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct SimulationMetrics {
    /// In `[0, 100]`, one decimal.
    pub fleet_utilization_pct: f64,
    /// In `[0, 100]`, two decimals.
    pub conflict_density:      f64,
    /// Non-negative, one decimal.
    pub avg_travel_time_mins:  f64,
}

/// Rebuilds model inputs for one scenario over a fixed road network and
/// reduces model outputs to [`SimulationMetrics`].
///
/// The engine holds no mutable state: every call to
/// [`run_simulation_step`](Self::run_simulation_step) draws fresh traffic,
/// demand, and (with the default [`Resampled`] policy) fast-lane layout from
/// the supplied generator.  Results therefore differ between calls unless
/// the caller passes identically seeded generators.
pub struct ScenarioEngine {
    network: Arc<RoadNetwork>,
    config:  ScenarioConfig,
    policy:  Box<dyn DesignationPolicy>,
}

impl ScenarioEngine {
    pub fn new(network: Arc<RoadNetwork>, config: ScenarioConfig) -> SimResult<Self> {
        config.validate()?;
        if network.is_empty() {
            return Err(SimError::EmptyNetwork);
        }
        Ok(Self { network, config, policy: Box::new(Resampled::default()) })
    }

    /// Replace the default [`Resampled`] designation policy.
    pub fn with_policy<P: DesignationPolicy + 'static>(mut self, policy: P) -> Self {
        self.policy = Box::new(policy);
        self
    }

    pub fn config(&self) -> &ScenarioConfig {
        &self.config
    }

    pub fn network(&self) -> &RoadNetwork {
        &self.network
    }

    /// Per-node scenario inputs for a given designation:
    ///
    /// - `traffic_volume` ~ U(0.7, 1.0) × density × reduction factor
    /// - `normalized_speed` 1.0 at hubs, 0.3 elsewhere
    /// - `pending_requests` ~ U(1, 5) × density
    pub fn scenario_features(&self, designation: &Designation, rng: &mut SimRng) -> Vec<FeatureVector> {
        let reduction = self.config.reduction_factor();
        self.network
            .nodes()
            .map(|n| {
                let density = self.network.node_density[n.index()];
                let hub = designation.hubs[n.index()];
                FeatureVector {
                    population_density: density,
                    traffic_volume:     rng.gen_range(0.7..=1.0) * density * reduction,
                    normalized_speed:   if hub { FAST_LANE_SPEED } else { MIXED_TRAFFIC_SPEED },
                    is_motorway_hub:    if hub { 1.0 } else { 0.0 },
                    pending_requests:   rng.gen_range(1.0..=5.0) * density,
                }
            })
            .collect()
    }

    /// Scenario inputs with a designation drawn from the engine's policy.
    /// Edges appear in both directions with `[length, 1.0 | 0.3]`
    /// attributes.
    pub fn build_scenario_tensors(&self, rng: &mut SimRng) -> SimResult<GraphTensors> {
        let designation = self.policy.designate(&self.network, self.config.use_motorways, rng)?;
        self.tensors_for(&designation, rng)
    }

    fn tensors_for(&self, designation: &Designation, rng: &mut SimRng) -> SimResult<GraphTensors> {
        let features = self.scenario_features(designation, rng);
        let (edge_index, edge_attr) = expand_undirected(&self.network, |e: EdgeId| {
            let speed = if designation.motorway_edges[e.index()] { FAST_LANE_SPEED } else { MIXED_TRAFFIC_SPEED };
            [self.network.edge_length_m[e.index()], speed]
        });
        log::debug!(
            "scenario tensors: {} hubs, {} motorway edges",
            designation.hub_count(),
            designation.motorway_edge_count()
        );
        Ok(GraphTensors::new(features_to_array(&features), edge_index, edge_attr)?)
    }

    /// One inference pass over freshly built scenario tensors.
    pub fn run_simulation_step(&self, model: &MaasGraphNetwork, rng: &mut SimRng) -> SimResult<SimulationMetrics> {
        let tensors = self.build_scenario_tensors(rng)?;
        let predictions = model.forward(&tensors)?;
        Ok(metrics_from_predictions(&predictions, &self.config))
    }
}

/// Reduce `[N, 3]` predictions to city-wide metrics.
///
/// ```text
/// fleet_utilization_pct = impact(pct / 100) × 100
/// conflict_density      = min(mean(flow) × 2 × rf × mm × 100, 100)
/// avg_travel_time_mins  = mean(eta) × max(0.3, rf × mm) × 100
/// ```
///
/// where `rf` is the reduction factor and `mm` the motorway multiplier of
/// `config`.
pub fn metrics_from_predictions(predictions: &Array2<f64>, config: &ScenarioConfig) -> SimulationMetrics {
    let means = column_means(predictions);
    let mean_flow = means.first().copied().unwrap_or(0.0).max(0.0);
    let mean_eta = means.get(1).copied().unwrap_or(0.0).max(0.0);

    let utilisation = impact_from_predictions(predictions, config.fleet_reduction_percentage / 100.0);
    let scale = config.reduction_factor() * config.motorway_multiplier();
    let conflict = (mean_flow * 2.0 * scale * 100.0).min(100.0);
    let travel = mean_eta * scale.max(0.3) * 100.0;

    SimulationMetrics {
        fleet_utilization_pct: round_to(utilisation * 100.0, 1),
        conflict_density:      round_to(conflict, 2),
        avg_travel_time_mins:  round_to(travel, 1),
    }
}

pub(crate) fn round_to(value: f64, decimals: i32) -> f64 {
    let scale = 10f64.powi(decimals);
    (value * scale).round() / scale
}
