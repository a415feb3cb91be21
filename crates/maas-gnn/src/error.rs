//! Error types for maas-gnn.

use std::path::PathBuf;

use thiserror::Error;

/// Errors produced by the graph network.
#[derive(Debug, Error)]
pub enum GnnError {
    #[error("node features have width {got}, network expects {expected}")]
    FeatureWidth { expected: usize, got: usize },

    #[error("{what} has {got} rows, expected {expected}")]
    RowMismatch {
        what:     &'static str,
        expected: usize,
        got:      usize,
    },

    #[error("refusing to save non-finite parameters to {path}")]
    NonFinite { path: PathBuf },

    #[error("parameters in {path} are incompatible: {reason}")]
    Incompatible { path: PathBuf, reason: String },

    #[error("failed to read parameters from {path}: {source}")]
    Read {
        path:   PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to decode parameters from {path}: {source}")]
    Decode {
        path:   PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to write parameters to {path}: {source}")]
    Write {
        path:   PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to encode parameters: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Alias for `Result<T, GnnError>`.
pub type GnnResult<T> = Result<T, GnnError>;
