//! Error types for run placement.

use plan_types::{RunId, ShellId};
use thiserror::Error;

/// Errors from run placement.
#[derive(Debug, Error)]
pub enum RunError {
    /// The path has fewer than two points or no length.
    #[error("run {run} has a degenerate path")]
    DegeneratePath {
        /// The affected run.
        run: RunId,
    },

    /// The spacing policy carries a non-positive spacing or width.
    #[error("run {run} has an invalid spacing policy: {details}")]
    InvalidPolicy {
        /// The affected run.
        run: RunId,
        /// What is invalid.
        details: String,
    },

    /// The run's shell binding no longer resolves. The run is orphaned and
    /// should be deleted by the session.
    #[error("run {run} is bound to missing shell {shell}")]
    UnboundPath {
        /// The affected run.
        run: RunId,
        /// The dangling shell id.
        shell: ShellId,
    },
}

/// Result type for run placement.
pub type RunResult<T> = Result<T, RunError>;
