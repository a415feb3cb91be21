//! Training feature sampling, target synthesis, and smoothing.

use std::path::Path;

use ndarray::Array2;

use maas_core::{EdgeId, SimRng};
use maas_graph::{expand_undirected, load_network, EdgeIndex, GraphTensors, RoadNetwork};

use crate::vector::{features_to_array, targets_to_array, FeatureVector, TargetVector};
use crate::{FeatureError, FeatureResult};

/// Share of a predecessor's target added to its successor.
pub const SMOOTHING_WEIGHT: f64 = 0.1;

/// Normalised speed levels drawn for training nodes (30, 50, 80 km/h).
const SPEED_LEVELS: [f64; 3] = [0.30, 0.50, 0.80];

/// Node tag that marks a training node as a motorway hub.
const HUB_TAG: &str = "primary";

/// Full-batch training data: inputs and labels for every node.
#[derive(Clone, Debug)]
pub struct TrainingSet {
    pub tensors: GraphTensors,
    /// `[N, TARGETS]` smoothed labels.
    pub targets: Array2<f64>,
}

/// Draw one training feature vector per node.
///
/// - `traffic_volume` ~ U(0.1, 1.0) × density
/// - `normalized_speed` drawn from {0.30, 0.50, 0.80}
/// - `is_motorway_hub` = 1 for nodes tagged `primary`
/// - `pending_requests` ~ U(0, 5) × density
pub fn sample_training_features(network: &RoadNetwork, rng: &mut SimRng) -> Vec<FeatureVector> {
    network
        .nodes()
        .map(|n| {
            let density = network.node_density[n.index()];
            let traffic_volume = rng.gen_range(0.1..=1.0) * density;
            let normalized_speed = *rng.choose(&SPEED_LEVELS).unwrap_or(&SPEED_LEVELS[1]);
            let is_motorway_hub = if network.node_highway[n.index()] == HUB_TAG { 1.0 } else { 0.0 };
            let pending_requests = rng.gen_range(0.0..=5.0) * density;
            FeatureVector {
                population_density: density,
                traffic_volume,
                normalized_speed,
                is_motorway_hub,
                pending_requests,
            }
        })
        .collect()
}

/// Unsmoothed label for one node.
///
/// Flow and ETA rise with demand and fall with speed; the allocation score
/// tracks pending requests.
pub fn synthesize_target(f: &FeatureVector) -> TargetVector {
    TargetVector {
        predicted_flow:         f.traffic_volume * (1.2 - f.normalized_speed) + f.pending_requests * 0.05,
        optimal_eta:            (1.0 - f.normalized_speed) + f.traffic_volume * 0.5,
        fleet_allocation_score: f.pending_requests / 5.0,
    }
}

/// One smoothing pass over the stored edges: for every edge `src -> dst`,
/// `target[dst] += target[src] * SMOOTHING_WEIGHT`.
///
/// The right-hand side always reads the unsmoothed snapshot, so the result
/// is independent of edge order and a chain `a -> b -> c` only moves `a`'s
/// contribution one hop.
pub fn smooth_targets(network: &RoadNetwork, targets: &mut [TargetVector]) {
    let snapshot = targets.to_vec();
    for src in network.nodes() {
        for edge in network.out_edges(src) {
            let dst = network.edge_to[edge.index()].index();
            targets[dst] = targets[dst].add_scaled(snapshot[src.index()], SMOOTHING_WEIGHT);
        }
    }
}

/// Bidirectional connectivity with `[length, maxspeed / 100]` attributes.
pub fn training_edge_tensors(network: &RoadNetwork) -> (EdgeIndex, Array2<f64>) {
    expand_undirected(network, |e: EdgeId| {
        [network.edge_length_m[e.index()], network.edge_speed_kph[e.index()] / 100.0]
    })
}

/// Sample features, synthesise and smooth labels, and assemble tensors.
pub fn build_training_set(network: &RoadNetwork, rng: &mut SimRng) -> FeatureResult<TrainingSet> {
    if network.is_empty() {
        return Err(FeatureError::EmptyNetwork);
    }

    let features = sample_training_features(network, rng);
    let mut targets: Vec<TargetVector> = features.iter().map(synthesize_target).collect();
    smooth_targets(network, &mut targets);

    let (edge_index, edge_attr) = training_edge_tensors(network);
    let tensors = GraphTensors::new(features_to_array(&features), edge_index, edge_attr)?;
    log::debug!(
        "training set: {} nodes, {} directed edges",
        tensors.num_nodes(),
        tensors.num_edges()
    );

    Ok(TrainingSet { tensors, targets: targets_to_array(&targets) })
}

/// Load a dataset file and turn it into a [`TrainingSet`].
pub fn load(path: &Path, rng: &mut SimRng) -> FeatureResult<TrainingSet> {
    let network = load_network(path)?;
    build_training_set(&network, rng)
}
