//! `maas-sim`: the scenario engine.
//!
//! # Crate layout
//!
//! | Module          | Contents                                               |
//! |-----------------|--------------------------------------------------------|
//! | [`config`]      | `ScenarioConfig` (request defaults, validation)        |
//! | [`designation`] | `DesignationPolicy`, `Resampled`, `Pinned`             |
//! | [`engine`]      | `ScenarioEngine::build_scenario_tensors`,              |
//! |                 | `run_simulation_step`, `metrics_from_predictions`      |
//! | [`baseline`]    | Mock private-vehicle metrics                           |
//! | [`registry`]    | `ModelRegistry`: the shared, read-only inference model |
//! | [`service`]     | `ScenarioService` with structured success/failure      |
//! | [`error`]       | `SimError`, `SimResult<T>`                             |
//!
//! # Example
//!
//! ```rust,ignore
//! let registry = ModelRegistry::load_or_init(weights, &NetworkConfig::default(), &mut rng);
//! let engine = ScenarioEngine::new(network, ScenarioConfig::default())?;
//! let metrics = engine.run_simulation_step(registry.model(), &mut rng)?;
//! ```

pub mod baseline;
pub mod config;
pub mod designation;
pub mod engine;
pub mod error;
pub mod registry;
pub mod service;


pub use baseline::{baseline_metrics, BASELINE_SCENARIO};
pub use config::ScenarioConfig;
pub use designation::{Designation, DesignationPolicy, Pinned, Resampled};
pub use engine::{metrics_from_predictions, ScenarioEngine, SimulationMetrics};
pub use error::{SimError, SimResult};
pub use registry::ModelRegistry;
pub use service::{
    EngineFailure, GraphSource, ScenarioOutcome, ScenarioService, SimulationReport, StatusReport,
    FAILURE_MESSAGE, SCENARIO_LABEL,
};
