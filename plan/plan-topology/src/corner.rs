//! Corner resolution at joints.

use nalgebra::Point2;
use serde::{Deserialize, Serialize};

use plan_types::WallSegment;

use crate::geom::line_intersection;

/// Resolved corner geometry at a joint.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum CornerGeometry {
    /// Mitered corner between exactly two segments: the intersection points
    /// of the offset boundary lines on each side of the wall pair.
    Miter {
        /// Corner point on the left boundary (relative to the incoming
        /// segment's direction).
        left: Point2<f64>,
        /// Corner point on the right boundary.
        right: Point2<f64>,
    },
    /// Each segment end is capped flat. Used for joints with three or more
    /// adjacent segments, for free chain ends, and for near-collinear pairs
    /// where the miter point is unstable.
    Butt,
}

/// Resolve the corner where `incoming` ends and `outgoing` starts.
///
/// Both offset boundary lines of each segment (at half thickness to either
/// side of the centerline) are intersected; near-parallel pairs fall back
/// to [`CornerGeometry::Butt`].
#[must_use]
pub fn resolve_corner(
    incoming: &WallSegment,
    outgoing: &WallSegment,
    epsilon: f64,
) -> CornerGeometry {
    let dir_in = incoming.direction();
    let dir_out = outgoing.direction();

    // Near-collinear: the offset lines are parallel, no stable miter point.
    let cross = dir_in.x * dir_out.y - dir_in.y * dir_out.x;
    if cross.abs() < epsilon {
        return CornerGeometry::Butt;
    }

    let left_in = incoming.left_normal() * (incoming.thickness * 0.5);
    let left_out = outgoing.left_normal() * (outgoing.thickness * 0.5);

    let left = line_intersection(
        &(incoming.start + left_in),
        &dir_in,
        &(outgoing.start + left_out),
        &dir_out,
        epsilon,
    );
    let right = line_intersection(
        &(incoming.start - left_in),
        &dir_in,
        &(outgoing.start - left_out),
        &dir_out,
        epsilon,
    );

    match (left, right) {
        (Some(left), Some(right)) => CornerGeometry::Miter { left, right },
        _ => CornerGeometry::Butt,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use plan_types::Point2;

    #[test]
    fn right_angle_miter() {
        // Two 0.2 m walls meeting at (5, 0) in an L.
        let incoming =
            WallSegment::new(Point2::new(0.0, 0.0), Point2::new(5.0, 0.0), 0.2, 2.7);
        let outgoing =
            WallSegment::new(Point2::new(5.0, 0.0), Point2::new(5.0, 3.0), 0.2, 2.7);

        match resolve_corner(&incoming, &outgoing, 1e-9) {
            CornerGeometry::Miter { left, right } => {
                // Inner corner at (4.9, 0.1), outer at (5.1, -0.1).
                assert_relative_eq!(left.x, 4.9, epsilon = 1e-9);
                assert_relative_eq!(left.y, 0.1, epsilon = 1e-9);
                assert_relative_eq!(right.x, 5.1, epsilon = 1e-9);
                assert_relative_eq!(right.y, -0.1, epsilon = 1e-9);
            }
            CornerGeometry::Butt => panic!("expected a miter"),
        }
    }

    #[test]
    fn collinear_pair_falls_back_to_butt() {
        let incoming =
            WallSegment::new(Point2::new(0.0, 0.0), Point2::new(5.0, 0.0), 0.2, 2.7);
        let outgoing =
            WallSegment::new(Point2::new(5.0, 0.0), Point2::new(10.0, 0.0), 0.2, 2.7);
        assert_eq!(resolve_corner(&incoming, &outgoing, 1e-9), CornerGeometry::Butt);
    }

    #[test]
    fn mixed_thickness_miter_is_asymmetric() {
        let incoming =
            WallSegment::new(Point2::new(0.0, 0.0), Point2::new(5.0, 0.0), 0.4, 2.7);
        let outgoing =
            WallSegment::new(Point2::new(5.0, 0.0), Point2::new(5.0, 3.0), 0.2, 2.7);

        match resolve_corner(&incoming, &outgoing, 1e-9) {
            CornerGeometry::Miter { left, right } => {
                assert_relative_eq!(left.x, 4.9, epsilon = 1e-9);
                assert_relative_eq!(left.y, 0.2, epsilon = 1e-9);
                assert_relative_eq!(right.x, 5.1, epsilon = 1e-9);
                assert_relative_eq!(right.y, -0.2, epsilon = 1e-9);
            }
            CornerGeometry::Butt => panic!("expected a miter"),
        }
    }
}
