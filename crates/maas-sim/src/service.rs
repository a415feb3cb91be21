//! Request-level entry points with structured results.
//!
//! Everything a serving layer needs: status, the baseline mock, scenario
//! simulation, and the raw graph document.  Scenario failures of any kind
//! come back as [`SimulationReport::Failure`] instead of an `Err`.

use std::path::PathBuf;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use maas_core::SimRng;
use maas_graph::{load_network, read_dataset, RawDataset, RoadNetwork};

use crate::baseline::{baseline_metrics, BASELINE_SCENARIO};
use crate::{ModelRegistry, ScenarioConfig, ScenarioEngine, SimResult, SimulationMetrics};

pub const SCENARIO_LABEL: &str = "ULTRA (MaaS Movement)";
pub const FAILURE_MESSAGE: &str = "GNN Engine failed to run.";
const STATUS_MESSAGE: &str = "GNN Mobility Simulation API is running.";

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StatusReport {
    pub status:  String,
    pub message: String,
    /// Whether trained parameters were loaded at startup.
    pub trained: bool,
}

/// Metrics labelled with the scenario that produced them.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ScenarioOutcome {
    pub scenario:       String,
    #[serde(flatten)]
    pub metrics:        SimulationMetrics,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub config_applied: Option<ScenarioConfig>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EngineFailure {
    pub error:   String,
    pub message: String,
}

/// Result of one scenario request.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SimulationReport {
    Success(ScenarioOutcome),
    Failure(EngineFailure),
}

impl SimulationReport {
    pub fn is_success(&self) -> bool {
        matches!(self, SimulationReport::Success(_))
    }
}

/// Where the road network comes from.
#[derive(Clone, Debug)]
pub enum GraphSource {
    /// Re-read on every request.
    File(PathBuf),
    /// Loaded once and shared.
    Memory(Arc<RoadNetwork>),
}

pub struct ScenarioService {
    registry: ModelRegistry,
    graph:    GraphSource,
}

impl ScenarioService {
    pub fn new(registry: ModelRegistry, graph: GraphSource) -> Self {
        Self { registry, graph }
    }

    pub fn status(&self) -> StatusReport {
        StatusReport {
            status:  "ok".to_string(),
            message: STATUS_MESSAGE.to_string(),
            trained: self.registry.is_trained(),
        }
    }

    /// Mock private-vehicle metrics.  The config is accepted for symmetry
    /// with [`simulate_scenario`](Self::simulate_scenario) and ignored.
    pub fn simulate_baseline(&self, _config: &ScenarioConfig, rng: &mut SimRng) -> ScenarioOutcome {
        ScenarioOutcome {
            scenario:       BASELINE_SCENARIO.to_string(),
            metrics:        baseline_metrics(rng),
            config_applied: None,
        }
    }

    /// Run one simulation step for `config`.
    pub fn simulate_scenario(&self, config: &ScenarioConfig, rng: &mut SimRng) -> SimulationReport {
        match self.try_simulate(config, rng) {
            Ok(metrics) => SimulationReport::Success(ScenarioOutcome {
                scenario:       SCENARIO_LABEL.to_string(),
                metrics,
                config_applied: Some(config.clone()),
            }),
            Err(err) => {
                log::error!("scenario simulation failed: {err}");
                SimulationReport::Failure(EngineFailure {
                    error:   err.to_string(),
                    message: FAILURE_MESSAGE.to_string(),
                })
            }
        }
    }

    fn try_simulate(&self, config: &ScenarioConfig, rng: &mut SimRng) -> SimResult<SimulationMetrics> {
        let network = self.network()?;
        let engine = ScenarioEngine::new(network, config.clone())?;
        engine.run_simulation_step(self.registry.model(), rng)
    }

    fn network(&self) -> SimResult<Arc<RoadNetwork>> {
        match &self.graph {
            GraphSource::File(path) => Ok(Arc::new(load_network(path)?)),
            GraphSource::Memory(net) => Ok(Arc::clone(net)),
        }
    }

    /// The raw dataset document backing this service.
    pub fn graph_data(&self) -> SimResult<RawDataset> {
        match &self.graph {
            GraphSource::File(path) => Ok(read_dataset(path)?),
            GraphSource::Memory(net) => Ok(RawDataset::from_network(net, "in-memory")),
        }
    }
}
