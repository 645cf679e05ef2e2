//! Error types for opening validation.

use plan_types::{CatalogId, OpeningId, SegmentId};
use thiserror::Error;

/// Errors from opening operations.
///
/// All variants are recoverable validation failures: the plan is unchanged
/// when one is returned.
#[derive(Debug, Error)]
pub enum OpeningError {
    /// Target segment does not exist.
    #[error("unknown segment {id}")]
    UnknownSegment {
        /// The segment id.
        id: SegmentId,
    },

    /// Target opening does not exist.
    #[error("unknown opening {id}")]
    UnknownOpening {
        /// The opening id.
        id: OpeningId,
    },

    /// The catalog id did not resolve.
    #[error("unknown catalog definition {id}")]
    UnknownDefinition {
        /// The failing catalog id.
        id: CatalogId,
    },

    /// The definition is not wall-hosted.
    #[error("catalog definition {id} cannot be hosted by a wall")]
    NotWallHosted {
        /// The offending catalog id.
        id: CatalogId,
    },

    /// The opening footprint leaves the segment's length bounds.
    #[error(
        "opening footprint [{start:.3}, {end:.3}] m exceeds segment length {length:.3} m"
    )]
    OutOfBounds {
        /// Footprint near edge.
        start: f64,
        /// Footprint far edge.
        end: f64,
        /// Host segment length.
        length: f64,
    },

    /// The opening leaves the segment's height range.
    #[error("opening spans {sill:.3}..{head:.3} m but the wall is {wall_height:.3} m tall")]
    HeightOutOfRange {
        /// Lower edge above the segment base.
        sill: f64,
        /// Upper edge above the segment base.
        head: f64,
        /// Host segment height.
        wall_height: f64,
    },

    /// Minimum clearance against another opening is violated.
    #[error("opening would come within {clearance:.3} m of opening {other}")]
    ClearanceViolation {
        /// The opening that is too close.
        other: OpeningId,
        /// The configured minimum clearance.
        clearance: f64,
    },
}

/// Result type for opening operations.
pub type OpeningResult<T> = Result<T, OpeningError>;
