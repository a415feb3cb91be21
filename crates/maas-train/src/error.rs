//! Error types for maas-train.

use std::path::PathBuf;

use thiserror::Error;

use maas_core::MaasError;
use maas_features::FeatureError;
use maas_gnn::GnnError;

#[derive(Debug, Error)]
pub enum TrainError {
    /// The loss stopped being a finite number.
    #[error("training diverged at epoch {epoch}: loss is {loss}")]
    Diverged { epoch: usize, loss: f64 },

    /// An update left a NaN or infinite parameter.
    #[error("parameters became non-finite after the update at epoch {epoch}")]
    NonFiniteParameters { epoch: usize },

    /// Training finished but the parameters could not be written.
    #[error("trained parameters could not be saved to {path}: {source}")]
    Persist {
        path:   PathBuf,
        #[source]
        source: GnnError,
    },

    #[error("targets have shape {got:?}, expected {expected:?}")]
    TargetShape {
        expected: (usize, usize),
        got:      (usize, usize),
    },

    #[error("invalid training config: {0}")]
    Config(#[from] MaasError),

    #[error(transparent)]
    Features(#[from] FeatureError),

    #[error(transparent)]
    Model(#[from] GnnError),
}

impl TrainError {
    /// `true` if the training dataset could not be read or parsed.
    pub fn is_dataset_unavailable(&self) -> bool {
        matches!(self, TrainError::Features(e) if e.is_dataset_unavailable())
    }
}

pub type TrainResult<T> = Result<T, TrainError>;
