//! Graph-subsystem error type.

use std::path::PathBuf;

use thiserror::Error;

use maas_core::NodeId;

/// Errors produced by `maas-graph`.
#[derive(Debug, Error)]
pub enum GraphError {
    #[error("dataset {path} unavailable: {source}")]
    Unavailable {
        path:   PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("dataset {path} is malformed: {source}")]
    Malformed {
        path:   PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("node ids must be dense and zero-based: expected {expected}, found {found}")]
    NonContiguousIds { expected: u32, found: u32 },

    #[error("edge {from} -> {to} references a node outside 0..{node_count}")]
    EdgeOutOfRange {
        from:       NodeId,
        to:         NodeId,
        node_count: usize,
    },

    #[error("{what} has shape {got:?}, expected {expected:?}")]
    ShapeMismatch {
        what:     &'static str,
        expected: (usize, usize),
        got:      (usize, usize),
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl GraphError {
    /// `true` for the "dataset unavailable" class: the file could not be read
    /// or is not a valid dataset document.
    pub fn is_unavailable(&self) -> bool {
        matches!(self, GraphError::Unavailable { .. } | GraphError::Malformed { .. })
    }
}

pub type GraphResult<T> = Result<T, GraphError>;
