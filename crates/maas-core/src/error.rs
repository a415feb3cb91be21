//! Shared error type.
//!
//! Sub-crates define their own error enums and wrap `MaasError` as one
//! variant where they surface configuration or I/O failures from here.

use std::path::PathBuf;

use thiserror::Error;

/// The top-level error type for `maas-core`.
#[derive(Debug, Error)]
pub enum MaasError {
    #[error("configuration error: {0}")]
    Config(String),

    #[error("failed to parse {path}: {source}")]
    Toml {
        path:   PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Shorthand result type for `maas-core`.
pub type MaasResult<T> = Result<T, MaasError>;
