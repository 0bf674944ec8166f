//! Error types for the CRDT handle layer.

use crate::types::{Kind, Path};
use thiserror::Error;

/// Errors reported by a [`Backend`](crate::backend::Backend) implementation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BackendError {
    /// The submitted causal context no longer matches server state.
    #[error("stale causal context: {0}")]
    StaleContext(String),

    /// Transport-level failure: connection refused, timeout, node down.
    #[error("backend unavailable: {0}")]
    Unavailable(String),

    /// The backend understood the request and refused it.
    #[error("request rejected: {0}")]
    Rejected(String),
}

/// Errors surfaced to callers of handle operations
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CrdtError {
    #[error("Stale causal context, re-fetch and resubmit: {0}")]
    StaleContext(String),

    #[error("Type mismatch at {path}: expected {expected}, found {found}")]
    TypeMismatch {
        path: Path,
        expected: Kind,
        found: Kind,
    },

    #[error("Counter delta at {path} is out of range")]
    CounterOverflow { path: Path },

    #[error("Batch misuse: {0}")]
    BatchMisuse(String),

    #[error("Backend unavailable: {0}")]
    BackendUnavailable(String),

    #[error("Backend rejected request: {0}")]
    Rejected(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, CrdtError>;

impl From<BackendError> for CrdtError {
    fn from(err: BackendError) -> Self {
        match err {
            BackendError::StaleContext(msg) => CrdtError::StaleContext(msg),
            BackendError::Unavailable(msg) => CrdtError::BackendUnavailable(msg),
            BackendError::Rejected(msg) => CrdtError::Rejected(msg),
        }
    }
}

impl From<config::ConfigError> for CrdtError {
    fn from(err: config::ConfigError) -> Self {
        CrdtError::Config(err.to_string())
    }
}
