use maas_graph::GraphError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum FeatureError {
    #[error("network has no nodes; nothing to train on")]
    EmptyNetwork,

    #[error(transparent)]
    Graph(#[from] GraphError),
}

impl FeatureError {
    /// `true` if the underlying dataset could not be read or parsed.
    pub fn is_dataset_unavailable(&self) -> bool {
        matches!(self, FeatureError::Graph(e) if e.is_unavailable())
    }
}

pub type FeatureResult<T> = Result<T, FeatureError>;
