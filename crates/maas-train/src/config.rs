//! Training configuration.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use maas_core::{load_toml, MaasError, MaasResult};
use maas_gnn::NetworkConfig;

/// Default location of the learned parameter file.
pub const DEFAULT_WEIGHTS_PATH: &str = "models/maas_gnn_weights.json";

/// Default location of the road-network dataset.
pub const DEFAULT_DATASET_PATH: &str = "data/mumbai_network.json";

/// Parameters of one training run.  Every field has a default, so a TOML
/// file only needs the keys it overrides:
///
/// ```toml
/// epochs = 200
/// seed = 7
///
/// [network]
/// dropout = 0.2
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrainConfig {
    pub epochs:        usize,
    pub learning_rate: f64,
    pub weight_decay:  f64,
    /// Report the loss every this many epochs.
    pub log_interval:  usize,
    /// Seed for feature sampling, initialisation and dropout.  `None` draws
    /// one from the OS.
    pub seed:          Option<u64>,
    pub dataset_path:  PathBuf,
    pub weights_path:  PathBuf,
    pub network:       NetworkConfig,
}

impl Default for TrainConfig {
    fn default() -> Self {
        Self {
            epochs:        500,
            learning_rate: 0.01,
            weight_decay:  5e-4,
            log_interval:  10,
            seed:          None,
            dataset_path:  PathBuf::from(DEFAULT_DATASET_PATH),
            weights_path:  PathBuf::from(DEFAULT_WEIGHTS_PATH),
            network:       NetworkConfig::default(),
        }
    }
}

impl TrainConfig {
    /// Load from a TOML file and validate.
    pub fn from_toml(path: &Path) -> MaasResult<Self> {
        let config: Self = load_toml(path)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> MaasResult<()> {
        if self.epochs == 0 {
            return Err(MaasError::Config("epochs must be at least 1".into()));
        }
        if !(self.learning_rate > 0.0 && self.learning_rate.is_finite()) {
            return Err(MaasError::Config(format!("learning_rate must be positive, got {}", self.learning_rate)));
        }
        if !(self.weight_decay >= 0.0 && self.weight_decay.is_finite()) {
            return Err(MaasError::Config(format!("weight_decay must be non-negative, got {}", self.weight_decay)));
        }
        if self.log_interval == 0 {
            return Err(MaasError::Config("log_interval must be at least 1".into()));
        }
        if !(0.0..1.0).contains(&self.network.dropout) {
            return Err(MaasError::Config(format!("dropout must be in [0, 1), got {}", self.network.dropout)));
        }
        if self.network.hidden_channels == 0 || self.network.heads == 0 {
            return Err(MaasError::Config("hidden_channels and heads must be at least 1".into()));
        }
        Ok(())
    }
}
