//! Process-wide model handle.

use std::path::Path;
use std::sync::Arc;

use maas_core::SimRng;
use maas_gnn::{MaasGraphNetwork, NetworkConfig, ParamSource};

/// The inference model, created once at startup and shared read-only by
/// every request.
///
/// Cloning is cheap; all clones share one network.
#[derive(Clone, Debug)]
pub struct ModelRegistry {
    model:  Arc<MaasGraphNetwork>,
    source: ParamSource,
}

impl ModelRegistry {
    /// Load trained parameters from `path`, or fall back to a freshly
    /// initialised network.  Never fails.
    pub fn load_or_init(path: &Path, config: &NetworkConfig, rng: &mut SimRng) -> Self {
        let (model, source) = MaasGraphNetwork::load_or_init(path, config, rng);
        Self { model: Arc::new(model), source }
    }

    pub fn from_model(model: MaasGraphNetwork, source: ParamSource) -> Self {
        Self { model: Arc::new(model), source }
    }

    pub fn model(&self) -> &MaasGraphNetwork {
        &self.model
    }

    pub fn source(&self) -> &ParamSource {
        &self.source
    }

    pub fn is_trained(&self) -> bool {
        self.source.is_trained()
    }
}
