//! Snap and proximity queries over a plan.
//!
//! The index caches segment endpoints, midpoints, and the segments
//! themselves; tools query it for snapping candidates and hit testing
//! while placing openings and runs. It is rebuilt from the plan whenever
//! the plan changes and is **never authoritative**: validation always runs
//! against the plan itself at the authority.
//!
//! # Example
//!
//! ```
//! use pf_spatial::{SnapIndex, SnapKind};
//! use plan_types::{Plan, Point2, Shell, WallSegment};
//!
//! let mut plan = Plan::new();
//! let mut shell = Shell::new_open();
//! shell.segments.push(WallSegment::new(
//!     Point2::new(0.0, 0.0),
//!     Point2::new(4.0, 0.0),
//!     0.2,
//!     2.7,
//! ));
//! plan.shells.push(shell);
//!
//! let index = SnapIndex::build(&plan);
//! let snap = index.query_snap(&Point2::new(0.05, 0.1), 0.5).unwrap();
//! assert_eq!(snap.kind, SnapKind::Endpoint);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]

use nalgebra::Point2;

use plan_types::{EntityRef, Plan, SegmentId};

/// What a snap candidate is anchored to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SnapKind {
    /// A segment endpoint.
    Endpoint,
    /// A segment midpoint.
    Midpoint,
    /// The closest point on a segment's centerline.
    OnSegment,
}

/// A resolved snap candidate.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SnapResult {
    /// The snapped position.
    pub position: Point2<f64>,
    /// Distance from the query position.
    pub distance: f64,
    /// What the snap anchors to.
    pub kind: SnapKind,
    /// The entity providing the anchor.
    pub entity: EntityRef,
}

#[derive(Debug, Clone)]
struct SnapPoint {
    position: Point2<f64>,
    kind: SnapKind,
    entity: EntityRef,
}

#[derive(Debug, Clone)]
struct IndexedSegment {
    id: SegmentId,
    a: Point2<f64>,
    b: Point2<f64>,
}

/// Cached spatial index over one plan.
#[derive(Debug, Clone, Default)]
pub struct SnapIndex {
    points: Vec<SnapPoint>,
    segments: Vec<IndexedSegment>,
}

impl SnapIndex {
    /// Build the index from a plan's current state.
    #[must_use]
    pub fn build(plan: &Plan) -> Self {
        let mut points = Vec::new();
        let mut segments = Vec::new();

        for segment in plan.segments() {
            let entity = EntityRef::Segment(segment.id);
            points.push(SnapPoint {
                position: segment.start,
                kind: SnapKind::Endpoint,
                entity,
            });
            points.push(SnapPoint {
                position: segment.end,
                kind: SnapKind::Endpoint,
                entity,
            });
            points.push(SnapPoint {
                position: segment.point_at(segment.length() * 0.5),
                kind: SnapKind::Midpoint,
                entity,
            });
            segments.push(IndexedSegment {
                id: segment.id,
                a: segment.start,
                b: segment.end,
            });
        }

        Self { points, segments }
    }

    /// Number of indexed segments.
    #[must_use]
    pub fn segment_count(&self) -> usize {
        self.segments.len()
    }

    /// Entities within `radius` of a position.
    ///
    /// Segment proximity is measured to the centerline. Results are
    /// deduplicated and unordered.
    #[must_use]
    pub fn query_nearby(&self, position: &Point2<f64>, radius: f64) -> Vec<EntityRef> {
        let mut found = Vec::new();
        for segment in &self.segments {
            let d = distance_to_segment(position, &segment.a, &segment.b);
            if d <= radius {
                let entity = EntityRef::Segment(segment.id);
                if !found.contains(&entity) {
                    found.push(entity);
                }
            }
        }
        found
    }

    /// Best snap candidate within `radius` of a position.
    ///
    /// Endpoints and midpoints win over plain on-segment projections at
    /// equal distance; otherwise the closest candidate wins.
    #[must_use]
    pub fn query_snap(&self, position: &Point2<f64>, radius: f64) -> Option<SnapResult> {
        let mut best: Option<SnapResult> = None;

        let mut consider = |candidate: SnapResult| {
            let better = match &best {
                None => true,
                Some(current) => {
                    let priority = |k: SnapKind| matches!(k, SnapKind::OnSegment);
                    match (priority(candidate.kind), priority(current.kind)) {
                        (false, true) => candidate.distance <= current.distance + radius * 0.25,
                        (true, false) => candidate.distance + radius * 0.25 < current.distance,
                        _ => candidate.distance < current.distance,
                    }
                }
            };
            if better {
                best = Some(candidate);
            }
        };

        for point in &self.points {
            let distance = (position - point.position).norm();
            if distance <= radius {
                consider(SnapResult {
                    position: point.position,
                    distance,
                    kind: point.kind,
                    entity: point.entity,
                });
            }
        }

        for segment in &self.segments {
            let projected = closest_on_segment(position, &segment.a, &segment.b);
            let distance = (position - projected).norm();
            if distance <= radius {
                consider(SnapResult {
                    position: projected,
                    distance,
                    kind: SnapKind::OnSegment,
                    entity: EntityRef::Segment(segment.id),
                });
            }
        }

        best
    }

    /// The closest segment within `tolerance` of a position, for
    /// selection hit testing.
    #[must_use]
    pub fn hit_test_segment(&self, position: &Point2<f64>, tolerance: f64) -> Option<SegmentId> {
        let mut best: Option<(f64, SegmentId)> = None;
        for segment in &self.segments {
            let d = distance_to_segment(position, &segment.a, &segment.b);
            if d <= tolerance && best.is_none_or(|(bd, _)| d < bd) {
                best = Some((d, segment.id));
            }
        }
        best.map(|(_, id)| id)
    }
}

fn closest_on_segment(p: &Point2<f64>, a: &Point2<f64>, b: &Point2<f64>) -> Point2<f64> {
    let ab = b - a;
    let len_sq = ab.norm_squared();
    if len_sq < f64::EPSILON {
        return *a;
    }
    let t = ((p - a).dot(&ab) / len_sq).clamp(0.0, 1.0);
    a + ab * t
}

fn distance_to_segment(p: &Point2<f64>, a: &Point2<f64>, b: &Point2<f64>) -> f64 {
    (p - closest_on_segment(p, a, b)).norm()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use plan_types::{Shell, WallSegment};

    fn indexed_plan() -> (Plan, SnapIndex) {
        let mut plan = Plan::new();
        let mut shell = Shell::new_open();
        shell.segments.push(WallSegment::new(
            Point2::new(0.0, 0.0),
            Point2::new(4.0, 0.0),
            0.2,
            2.7,
        ));
        shell.segments.push(WallSegment::new(
            Point2::new(4.0, 0.0),
            Point2::new(4.0, 3.0),
            0.2,
            2.7,
        ));
        plan.shells.push(shell);
        let index = SnapIndex::build(&plan);
        (plan, index)
    }

    #[test]
    fn endpoint_snap_beats_projection() {
        let (_, index) = indexed_plan();
        let snap = index
            .query_snap(&Point2::new(3.9, 0.15), 0.5)
            .expect("snap");
        assert_eq!(snap.kind, SnapKind::Endpoint);
        assert_relative_eq!(snap.position.x, 4.0);
        assert_relative_eq!(snap.position.y, 0.0);
    }

    #[test]
    fn projection_snap_on_open_wall() {
        let (_, index) = indexed_plan();
        let snap = index
            .query_snap(&Point2::new(1.0, 0.2), 0.3)
            .expect("snap");
        assert_eq!(snap.kind, SnapKind::OnSegment);
        assert_relative_eq!(snap.position.y, 0.0);
    }

    #[test]
    fn nothing_within_radius() {
        let (_, index) = indexed_plan();
        assert!(index.query_snap(&Point2::new(50.0, 50.0), 1.0).is_none());
    }

    #[test]
    fn query_nearby_finds_both_walls_at_the_corner() {
        let (_, index) = indexed_plan();
        let found = index.query_nearby(&Point2::new(4.0, 0.0), 0.5);
        assert_eq!(found.len(), 2);
    }

    #[test]
    fn hit_test_picks_the_closest_wall() {
        let (plan, index) = indexed_plan();
        let expected = plan.shells[0].segments[0].id;
        let hit = index.hit_test_segment(&Point2::new(2.0, 0.05), 0.2);
        assert_eq!(hit, Some(expected));
    }
}
