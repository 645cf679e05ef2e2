//! Wall segments.

use nalgebra::{Point2, Vector2};
use serde::{Deserialize, Serialize};

use crate::ids::{OpeningId, SegmentId};
use crate::opening::Opening;

/// A straight wall between two plan-space endpoints.
///
/// The segment owns its openings, kept ordered by offset along the axis.
/// Height is a range: the wall slab spans `base_z .. base_z + height`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WallSegment {
    /// Unique id.
    pub id: SegmentId,
    /// Start endpoint in plan space.
    pub start: Point2<f64>,
    /// End endpoint in plan space.
    pub end: Point2<f64>,
    /// Wall thickness in meters. Always > 0.
    pub thickness: f64,
    /// Bottom of the wall slab, world Z in meters.
    #[serde(default)]
    pub base_z: f64,
    /// Wall height in meters. Always > 0.
    pub height: f64,
    /// Optional skirting-board profile applied to both wall faces.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub skirting: Option<SkirtingProfile>,
    /// Openings hosted by this segment, ordered by offset.
    #[serde(default)]
    pub openings: Vec<Opening>,
}

impl WallSegment {
    /// Create a segment with a fresh id and no openings.
    #[must_use]
    pub fn new(start: Point2<f64>, end: Point2<f64>, thickness: f64, height: f64) -> Self {
        Self {
            id: SegmentId::new(),
            start,
            end,
            thickness,
            base_z: 0.0,
            height,
            skirting: None,
            openings: Vec::new(),
        }
    }

    /// Set the skirting profile, builder style.
    #[must_use]
    pub fn with_skirting(mut self, skirting: SkirtingProfile) -> Self {
        self.skirting = Some(skirting);
        self
    }

    /// Segment length in meters.
    #[must_use]
    pub fn length(&self) -> f64 {
        (self.end - self.start).norm()
    }

    /// Unit direction from start to end.
    ///
    /// Falls back to +X for degenerate (zero-length) segments; topology
    /// validation rejects those before they reach geometry.
    #[must_use]
    pub fn direction(&self) -> Vector2<f64> {
        (self.end - self.start)
            .try_normalize(f64::EPSILON)
            .unwrap_or_else(Vector2::x)
    }

    /// Left-hand unit normal (direction rotated 90 degrees CCW).
    #[must_use]
    pub fn left_normal(&self) -> Vector2<f64> {
        let d = self.direction();
        Vector2::new(-d.y, d.x)
    }

    /// Point on the centerline at `t` meters from the start.
    #[must_use]
    pub fn point_at(&self, t: f64) -> Point2<f64> {
        self.start + self.direction() * t
    }

    /// Find an opening by id.
    #[must_use]
    pub fn opening(&self, id: OpeningId) -> Option<&Opening> {
        self.openings.iter().find(|o| o.id == id)
    }

    /// Find an opening by id, mutably.
    pub fn opening_mut(&mut self, id: OpeningId) -> Option<&mut Opening> {
        self.openings.iter_mut().find(|o| o.id == id)
    }

    /// Openings that participate in geometry: not orphaned.
    pub fn active_openings(&self) -> impl Iterator<Item = &Opening> {
        self.openings.iter().filter(|o| !o.orphaned)
    }

    /// Restore the offset ordering invariant after an edit.
    pub fn sort_openings(&mut self) {
        self.openings
            .sort_by(|a, b| a.offset.total_cmp(&b.offset));
    }
}

/// Skirting-board profile for a wall segment.
///
/// Recovered from the original wall mesher; rendered as closed boxes along
/// the solid intervals at the base of each face, interrupted by door
/// openings.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SkirtingProfile {
    /// Board height above the wall base, in meters.
    pub height: f64,
    /// Board thickness out from the wall face, in meters.
    pub thickness: f64,
}

impl SkirtingProfile {
    /// A common 8 cm x 1.5 cm profile.
    #[must_use]
    pub const fn standard() -> Self {
        Self {
            height: 0.08,
            thickness: 0.015,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::CatalogId;
    use approx::assert_relative_eq;

    #[test]
    fn length_and_direction() {
        let seg = WallSegment::new(Point2::new(1.0, 1.0), Point2::new(4.0, 5.0), 0.2, 2.7);
        assert_relative_eq!(seg.length(), 5.0);
        assert_relative_eq!(seg.direction().x, 0.6);
        assert_relative_eq!(seg.direction().y, 0.8);
    }

    #[test]
    fn left_normal_is_ccw() {
        let seg = WallSegment::new(Point2::new(0.0, 0.0), Point2::new(2.0, 0.0), 0.2, 2.7);
        let n = seg.left_normal();
        assert_relative_eq!(n.x, 0.0);
        assert_relative_eq!(n.y, 1.0);
    }

    #[test]
    fn point_at_interpolates() {
        let seg = WallSegment::new(Point2::new(0.0, 0.0), Point2::new(10.0, 0.0), 0.2, 2.7);
        let p = seg.point_at(2.5);
        assert_relative_eq!(p.x, 2.5);
        assert_relative_eq!(p.y, 0.0);
    }

    #[test]
    fn sort_openings_orders_by_offset() {
        let mut seg = WallSegment::new(Point2::new(0.0, 0.0), Point2::new(10.0, 0.0), 0.2, 2.7);
        seg.openings.push(Opening::new(CatalogId::new("w"), 6.0, 0.9, 1.2, 1.2));
        seg.openings.push(Opening::new(CatalogId::new("d"), 1.0, 0.0, 0.9, 2.1));
        seg.sort_openings();
        assert!(seg.openings[0].offset < seg.openings[1].offset);
    }

    #[test]
    fn active_openings_skip_orphans() {
        let mut seg = WallSegment::new(Point2::new(0.0, 0.0), Point2::new(10.0, 0.0), 0.2, 2.7);
        let mut op = Opening::new(CatalogId::new("d"), 1.0, 0.0, 0.9, 2.1);
        op.orphaned = true;
        seg.openings.push(op);
        seg.openings.push(Opening::new(CatalogId::new("d"), 4.0, 0.0, 0.9, 2.1));
        assert_eq!(seg.active_openings().count(), 1);
    }
}
