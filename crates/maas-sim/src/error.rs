//! Error types for maas-sim.

use thiserror::Error;

use maas_core::MaasError;
use maas_gnn::GnnError;
use maas_graph::GraphError;

#[derive(Debug, Error)]
pub enum SimError {
    #[error("invalid scenario config: {0}")]
    InvalidConfig(String),

    #[error("road network has no nodes")]
    EmptyNetwork,

    #[error("pinned designation covers {got} {what}, network has {expected}")]
    DesignationMismatch {
        what:     &'static str,
        expected: usize,
        got:      usize,
    },

    #[error(transparent)]
    Config(#[from] MaasError),

    #[error(transparent)]
    Graph(#[from] GraphError),

    #[error(transparent)]
    Model(#[from] GnnError),
}

impl SimError {
    /// `true` if the road-network dataset could not be read or parsed.
    pub fn is_dataset_unavailable(&self) -> bool {
        matches!(self, SimError::Graph(e) if e.is_unavailable())
    }
}

pub type SimResult<T> = Result<T, SimError>;
