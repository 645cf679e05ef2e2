//! Error types for the data model.

use thiserror::Error;

/// Errors from data-model operations.
#[derive(Debug, Error)]
pub enum PlanError {
    /// JSON encoding or decoding failed.
    #[error("plan serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type for data-model operations.
pub type PlanResult<T> = Result<T, PlanError>;
