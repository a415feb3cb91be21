//! `maas-features`: node features and synthetic training labels.
//!
//! # Pipeline
//!
//! ```text
//! RoadNetwork ─▶ sample_training_features ─▶ [FeatureVector; N]
//!                                              │
//!                        synthesize_target ◀───┘
//!                                │
//!                        smooth_targets (one pass over stored edges)
//!                                │
//!                          TrainingSet { tensors, targets }
//! ```
//!
//! Labels are a deterministic function of the features plus one hop of
//! graph smoothing, so a node's target depends on its predecessors.  They
//! are illustrative, not calibrated against observed traffic.

pub mod error;
pub mod synthesis;
pub mod vector;

#[cfg(test)]
mod tests;

pub use error::{FeatureError, FeatureResult};
pub use synthesis::{
    build_training_set, load, sample_training_features, smooth_targets, synthesize_target,
    training_edge_tensors, TrainingSet, SMOOTHING_WEIGHT,
};
pub use vector::{features_to_array, targets_to_array, FeatureVector, TargetVector, NODE_FEATURES, TARGETS};
