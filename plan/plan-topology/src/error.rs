//! Error types for topology operations.

use plan_types::{JointId, OpeningId, SegmentId, ShellId};
use thiserror::Error;

/// Errors from topology operations.
///
/// Every variant is recoverable: the plan is left untouched when an
/// operation is rejected.
#[derive(Debug, Error)]
pub enum TopologyError {
    /// Target shell does not exist.
    #[error("unknown shell {id}")]
    UnknownShell {
        /// The shell id.
        id: ShellId,
    },

    /// Target segment does not exist.
    #[error("unknown segment {id}")]
    UnknownSegment {
        /// The segment id.
        id: SegmentId,
    },

    /// Target joint does not exist.
    #[error("unknown joint {id}")]
    UnknownJoint {
        /// The joint id.
        id: JointId,
    },

    /// The operation would produce a segment shorter than the configured
    /// minimum.
    #[error("segment would degenerate: length {length:.4} m < minimum {min:.4} m")]
    DegenerateSegment {
        /// Resulting length.
        length: f64,
        /// Configured minimum length.
        min: f64,
    },

    /// Segment dimensions must be strictly positive.
    #[error("invalid segment dimensions: thickness {thickness:.4} m, height {height:.4} m")]
    InvalidDimensions {
        /// Proposed thickness.
        thickness: f64,
        /// Proposed height.
        height: f64,
    },

    /// A new segment must continue the shell's chain.
    #[error("segment does not continue the chain of shell {shell}")]
    ChainBroken {
        /// The shell whose chain would break.
        shell: ShellId,
    },

    /// The new segment would cross an existing one away from a shared
    /// endpoint.
    #[error("segment would intersect segment {other}")]
    WouldIntersect {
        /// The segment crossed.
        other: SegmentId,
    },

    /// A split position falls inside an opening's footprint.
    #[error("split position falls inside opening {opening}")]
    SplitInsideOpening {
        /// The opening occupying the split position.
        opening: OpeningId,
    },
}

/// Result type for topology operations.
pub type TopologyResult<T> = Result<T, TopologyError>;
