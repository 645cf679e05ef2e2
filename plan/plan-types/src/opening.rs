//! Door and window openings.

use serde::{Deserialize, Serialize};

use crate::ids::{CatalogId, OpeningId};

/// A door or window instance hosted by a wall segment.
///
/// The opening references an external catalog definition but records the
/// resolved width and height at placement time, so geometry generation never
/// has to consult the catalog service. `offset` is the distance from the
/// segment start to the opening's near edge, measured along the segment
/// axis; `sill` is the height of the opening's lower edge above the
/// segment's base.
///
/// Openings on one segment must be pairwise non-overlapping with a minimum
/// clearance and fully contained in the segment's length and height range.
/// The opening manager enforces this; an opening whose host no longer fits
/// it is flagged [`orphaned`](Self::orphaned) and excluded from mesh
/// generation until it fits again or an author removes it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Opening {
    /// Unique id.
    pub id: OpeningId,
    /// The catalog definition this opening instantiates.
    pub def: CatalogId,
    /// Distance from segment start to the opening's near edge, in meters.
    pub offset: f64,
    /// Height of the lower edge above the segment base, in meters.
    /// Zero for doors.
    pub sill: f64,
    /// Resolved opening width, in meters.
    pub width: f64,
    /// Resolved opening height, in meters.
    pub height: f64,
    /// Rotation around the vertical axis, in degrees. Flips which side a
    /// door leaf swings toward; has no effect on the cutout itself.
    pub rotation_deg: f64,
    /// Set when the host segment no longer fits this opening.
    ///
    /// Orphaned openings keep their authored parameters and are skipped by
    /// the geometry kernel. The flag clears automatically once a later host
    /// change makes the opening fit again.
    #[serde(default)]
    pub orphaned: bool,
}

impl Opening {
    /// Create an opening with a fresh id.
    #[must_use]
    pub fn new(def: CatalogId, offset: f64, sill: f64, width: f64, height: f64) -> Self {
        Self {
            id: OpeningId::new(),
            def,
            offset,
            sill,
            width,
            height,
            rotation_deg: 0.0,
            orphaned: false,
        }
    }

    /// Set the rotation, builder style.
    #[must_use]
    pub fn with_rotation(mut self, rotation_deg: f64) -> Self {
        self.rotation_deg = rotation_deg;
        self
    }

    /// The opening's footprint along the segment axis.
    #[must_use]
    pub fn extent(&self) -> OpeningExtent {
        OpeningExtent {
            start: self.offset,
            end: self.offset + self.width,
        }
    }

    /// The far edge of the opening along the segment axis.
    #[must_use]
    pub fn end_offset(&self) -> f64 {
        self.offset + self.width
    }

    /// The top of the opening above the segment base.
    #[must_use]
    pub fn head(&self) -> f64 {
        self.sill + self.height
    }
}

/// A closed interval along a segment axis occupied by an opening.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OpeningExtent {
    /// Near edge, distance from segment start.
    pub start: f64,
    /// Far edge, distance from segment start.
    pub end: f64,
}

impl OpeningExtent {
    /// Whether two extents overlap when each is grown by `clearance / 2`.
    ///
    /// Touching extents at exactly the clearance distance do not overlap.
    #[must_use]
    pub fn overlaps_with_clearance(&self, other: &Self, clearance: f64) -> bool {
        self.start - other.end < clearance && other.start - self.end < clearance
    }

    /// Whether a position along the segment falls inside the extent.
    #[must_use]
    pub fn contains(&self, position: f64) -> bool {
        position > self.start && position < self.end
    }
}
