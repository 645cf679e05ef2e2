//! Error types for mesh generation.

use plan_types::SegmentId;
use thiserror::Error;

/// Errors from mesh generation.
#[derive(Debug, Error)]
pub enum MeshError {
    /// The segment itself is unusable (non-positive dimensions or zero
    /// length). Recoverable: reject the segment upstream.
    #[error("invalid segment {segment}: {details}")]
    InvalidSegment {
        /// The offending segment.
        segment: SegmentId,
        /// What is wrong with it.
        details: String,
    },

    /// The kernel was handed openings that violate the opening manager's
    /// guarantees (out of bounds or overlapping). This indicates a bug in
    /// the validation layer, not a user error; it must be surfaced, never
    /// swallowed.
    #[error("internal invariant violation on segment {segment}: {details}")]
    InvariantViolation {
        /// The offending segment.
        segment: SegmentId,
        /// The violated invariant.
        details: String,
    },
}

/// Result type for mesh generation.
pub type MeshResult<T> = Result<T, MeshError>;
