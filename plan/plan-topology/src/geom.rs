//! 2D geometric helpers for plan-space segments.

use nalgebra::{Point2, Vector2};

/// Closest point on segment `ab` to point `p`.
#[must_use]
pub fn closest_point_on_segment(
    p: &Point2<f64>,
    a: &Point2<f64>,
    b: &Point2<f64>,
) -> Point2<f64> {
    let ab = b - a;
    let length_sq = ab.norm_squared();
    if length_sq < f64::EPSILON {
        return *a;
    }
    let t = ((p - a).dot(&ab) / length_sq).clamp(0.0, 1.0);
    a + ab * t
}

/// Distance from point `p` to segment `ab`.
#[must_use]
pub fn distance_point_to_segment(p: &Point2<f64>, a: &Point2<f64>, b: &Point2<f64>) -> f64 {
    (p - closest_point_on_segment(p, a, b)).norm()
}

/// Left and right unit normals for a wall from `a` to `b`.
///
/// Left is +90 degrees (CCW), right is -90 degrees (CW).
#[must_use]
pub fn wall_normals(a: &Point2<f64>, b: &Point2<f64>) -> (Vector2<f64>, Vector2<f64>) {
    let d = (b - a).try_normalize(f64::EPSILON).unwrap_or_else(Vector2::x);
    (Vector2::new(-d.y, d.x), Vector2::new(d.y, -d.x))
}

/// Intersection of the infinite lines through `a1 + t * d1` and
/// `a2 + s * d2`. `None` when the lines are (near) parallel.
#[must_use]
pub fn line_intersection(
    a1: &Point2<f64>,
    d1: &Vector2<f64>,
    a2: &Point2<f64>,
    d2: &Vector2<f64>,
    epsilon: f64,
) -> Option<Point2<f64>> {
    let det = d1.x * d2.y - d2.x * d1.y;
    if det.abs() < epsilon {
        return None;
    }
    let delta = a2 - a1;
    let t = (delta.x * d2.y - d2.x * delta.y) / det;
    Some(a1 + d1 * t)
}

/// Intersection of bounded segments `a1b1` and `a2b2`.
///
/// Endpoint contact counts as an intersection. Parameter undershoots within
/// `epsilon` of an endpoint are snapped onto it so that T-junctions do not
/// produce microscopic ghost segments; overshoots are not snapped.
#[must_use]
pub fn segment_intersection(
    a1: &Point2<f64>,
    b1: &Point2<f64>,
    a2: &Point2<f64>,
    b2: &Point2<f64>,
    epsilon: f64,
) -> Option<Point2<f64>> {
    let det = (b1.x - a1.x) * (b2.y - a2.y) - (b2.x - a2.x) * (b1.y - a1.y);
    if det.abs() < epsilon {
        return None; // Parallel
    }

    let mut lambda =
        ((b2.y - a2.y) * (b2.x - a1.x) + (a2.x - b2.x) * (b2.y - a1.y)) / det;
    let gamma = ((a1.y - b1.y) * (b2.x - a1.x) + (b1.x - a1.x) * (b2.y - a1.y)) / det;

    if !(-epsilon..=1.0 + epsilon).contains(&lambda)
        || !(-epsilon..=1.0 + epsilon).contains(&gamma)
    {
        return None;
    }

    // Snap undershoots to the endpoint; overshoots stay untouched.
    if lambda > 0.0 && lambda < epsilon {
        lambda = 0.0;
    } else if lambda < 1.0 && lambda > 1.0 - epsilon {
        lambda = 1.0;
    }

    Some(a1 + (b1 - a1) * lambda)
}

/// Whether bounded segments `a1b1` and `a2b2` intersect.
#[must_use]
pub fn segments_intersect(
    a1: &Point2<f64>,
    b1: &Point2<f64>,
    a2: &Point2<f64>,
    b2: &Point2<f64>,
    epsilon: f64,
) -> bool {
    segment_intersection(a1, b1, a2, b2, epsilon).is_some()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn closest_point_clamps_to_endpoints() {
        let a = Point2::new(0.0, 0.0);
        let b = Point2::new(10.0, 0.0);

        let mid = closest_point_on_segment(&Point2::new(5.0, 3.0), &a, &b);
        assert_relative_eq!(mid.x, 5.0);
        assert_relative_eq!(mid.y, 0.0);

        let before = closest_point_on_segment(&Point2::new(-2.0, 1.0), &a, &b);
        assert_relative_eq!(before.x, 0.0);
    }

    #[test]
    fn wall_normals_are_perpendicular() {
        let (left, right) = wall_normals(&Point2::new(0.0, 0.0), &Point2::new(1.0, 0.0));
        assert_relative_eq!(left.y, 1.0);
        assert_relative_eq!(right.y, -1.0);
    }

    #[test]
    fn crossing_segments_intersect() {
        let p = segment_intersection(
            &Point2::new(0.0, 0.0),
            &Point2::new(2.0, 2.0),
            &Point2::new(0.0, 2.0),
            &Point2::new(2.0, 0.0),
            1e-9,
        );
        let p = p.unwrap();
        assert_relative_eq!(p.x, 1.0);
        assert_relative_eq!(p.y, 1.0);
    }

    #[test]
    fn parallel_segments_do_not_intersect() {
        assert!(!segments_intersect(
            &Point2::new(0.0, 0.0),
            &Point2::new(2.0, 0.0),
            &Point2::new(0.0, 1.0),
            &Point2::new(2.0, 1.0),
            1e-9,
        ));
    }

    #[test]
    fn t_junction_touch_counts() {
        // Second segment ends exactly on the first.
        assert!(segments_intersect(
            &Point2::new(0.0, 0.0),
            &Point2::new(4.0, 0.0),
            &Point2::new(2.0, 2.0),
            &Point2::new(2.0, 0.0),
            1e-9,
        ));
    }

    #[test]
    fn disjoint_segments_do_not_intersect() {
        assert!(!segments_intersect(
            &Point2::new(0.0, 0.0),
            &Point2::new(1.0, 0.0),
            &Point2::new(3.0, 1.0),
            &Point2::new(3.0, -1.0),
            1e-9,
        ));
    }

    #[test]
    fn line_intersection_ignores_bounds() {
        let p = line_intersection(
            &Point2::new(0.0, 0.0),
            &nalgebra::Vector2::new(1.0, 0.0),
            &Point2::new(5.0, -3.0),
            &nalgebra::Vector2::new(0.0, 1.0),
            1e-12,
        );
        let p = p.unwrap();
        assert_relative_eq!(p.x, 5.0);
        assert_relative_eq!(p.y, 0.0);
    }
}
