//! Scenario configuration.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use maas_core::load_toml;

use crate::{SimError, SimResult};

/// Floor on the residual private-vehicle share, even at maximal reduction.
pub const MIN_REDUCTION_FACTOR: f64 = 0.05;

/// One simulation request.  Immutable once handed to a
/// [`ScenarioEngine`][crate::ScenarioEngine].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScenarioConfig {
    /// Share of private-vehicle traffic removed, in percent (0 to 100).
    pub fleet_reduction_percentage: f64,
    /// Whether dedicated fast lanes (motorway hubs and edges) exist.
    pub use_motorways:              bool,
    /// Rider tier mix in percent.  Carried through to reports; the engine
    /// does not use it numerically.
    pub maas_tier_distribution:     BTreeMap<String, u32>,
    /// Carried through to reports; the engine does not use it numerically.
    pub eliminate_parking:          bool,
}

impl Default for ScenarioConfig {
    fn default() -> Self {
        let tiers = [("platinum", 10), ("gold", 20), ("silver", 40), ("economy", 30)];
        Self {
            fleet_reduction_percentage: 90.0,
            use_motorways:              true,
            maas_tier_distribution:     tiers.into_iter().map(|(k, v)| (k.to_string(), v)).collect(),
            eliminate_parking:          true,
        }
    }
}

impl ScenarioConfig {
    pub fn from_toml(path: &Path) -> SimResult<Self> {
        let config: Self = load_toml(path)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> SimResult<()> {
        let pct = self.fleet_reduction_percentage;
        if !pct.is_finite() || !(0.0..=100.0).contains(&pct) {
            return Err(SimError::InvalidConfig(format!(
                "fleet_reduction_percentage must be within 0..=100, got {pct}"
            )));
        }
        Ok(())
    }

    /// Remaining private-vehicle share: `max(0.05, (100 - pct) / 100)`.
    pub fn reduction_factor(&self) -> f64 {
        ((100.0 - self.fleet_reduction_percentage) / 100.0).max(MIN_REDUCTION_FACTOR)
    }

    /// 0.7 with dedicated lanes, 1.3 without.
    pub fn motorway_multiplier(&self) -> f64 {
        if self.use_motorways { 0.7 } else { 1.3 }
    }
}
