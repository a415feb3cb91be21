//! `maas-train`: fixed-budget, full-batch training for the MaaS network.
//!
//! # Crate layout
//!
//! | Module       | Contents                                             |
//! |--------------|------------------------------------------------------|
//! | [`config`]   | `TrainConfig` (serde defaults, TOML loading)         |
//! | [`trainer`]  | `Trainer::fit`, `train`, `train_and_save`            |
//! | [`observer`] | `TrainObserver`, `LogObserver`, `LossHistory`        |
//! | [`error`]    | `TrainError`, `TrainResult<T>`                       |

pub mod config;
pub mod error;
pub mod observer;
pub mod trainer;

#[cfg(test)]
mod tests;

pub use config::{TrainConfig, DEFAULT_DATASET_PATH, DEFAULT_WEIGHTS_PATH};
pub use error::{TrainError, TrainResult};
pub use observer::{LogObserver, LossHistory, NoopObserver, TrainObserver};
pub use trainer::{TrainReport, Trainer};
