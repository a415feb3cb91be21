//! Typed per-node feature and target vectors.

use ndarray::Array2;

/// Width of [`FeatureVector`].
pub const NODE_FEATURES: usize = 5;
/// Width of [`TargetVector`].
pub const TARGETS: usize = 3;

/// Model input for one node.
///
/// `population_density` lies in [0, 1] and `is_motorway_hub` is 0 or 1; the
/// remaining components are not clamped but stay roughly within [0, 5].
#[derive(Copy, Clone, Debug, PartialEq, Default)]
pub struct FeatureVector {
    pub population_density: f64,
    pub traffic_volume:     f64,
    pub normalized_speed:   f64,
    pub is_motorway_hub:    f64,
    pub pending_requests:   f64,
}

impl FeatureVector {
    /// Column order of the feature tensor.
    pub fn to_array(self) -> [f64; NODE_FEATURES] {
        [
            self.population_density,
            self.traffic_volume,
            self.normalized_speed,
            self.is_motorway_hub,
            self.pending_requests,
        ]
    }
}

/// Training label for one node.
#[derive(Copy, Clone, Debug, PartialEq, Default)]
pub struct TargetVector {
    pub predicted_flow:         f64,
    pub optimal_eta:            f64,
    pub fleet_allocation_score: f64,
}

impl TargetVector {
    pub fn to_array(self) -> [f64; TARGETS] {
        [self.predicted_flow, self.optimal_eta, self.fleet_allocation_score]
    }

    /// `self + other * weight`, component-wise.
    pub fn add_scaled(self, other: TargetVector, weight: f64) -> TargetVector {
        TargetVector {
            predicted_flow:         self.predicted_flow + other.predicted_flow * weight,
            optimal_eta:            self.optimal_eta + other.optimal_eta * weight,
            fleet_allocation_score: self.fleet_allocation_score + other.fleet_allocation_score * weight,
        }
    }
}

/// Stack feature vectors into an `[N, NODE_FEATURES]` tensor.
pub fn features_to_array(features: &[FeatureVector]) -> Array2<f64> {
    Array2::from_shape_fn((features.len(), NODE_FEATURES), |(i, j)| features[i].to_array()[j])
}

/// Stack target vectors into an `[N, TARGETS]` tensor.
pub fn targets_to_array(targets: &[TargetVector]) -> Array2<f64> {
    Array2::from_shape_fn((targets.len(), TARGETS), |(i, j)| targets[i].to_array()[j])
}
