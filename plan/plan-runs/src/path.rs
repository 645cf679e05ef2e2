//! Polyline arc-length parameterization.

use nalgebra::{Point2, Vector2};

use plan_types::{Plan, Run, RunPath};

/// A polyline with precomputed cumulative arc lengths.
#[derive(Debug, Clone)]
pub struct Polyline {
    points: Vec<Point2<f64>>,
    cumulative: Vec<f64>,
}

impl Polyline {
    /// Build from a point sequence. Consecutive duplicate points are
    /// tolerated (they contribute zero length).
    #[must_use]
    pub fn new(points: Vec<Point2<f64>>) -> Self {
        let mut cumulative = Vec::with_capacity(points.len());
        let mut total = 0.0;
        cumulative.push(0.0);
        for pair in points.windows(2) {
            total += (pair[1] - pair[0]).norm();
            cumulative.push(total);
        }
        Self { points, cumulative }
    }

    /// Total arc length.
    #[must_use]
    pub fn total_length(&self) -> f64 {
        self.cumulative.last().copied().unwrap_or(0.0)
    }

    /// Whether the polyline can carry placements.
    #[must_use]
    pub fn is_degenerate(&self) -> bool {
        self.points.len() < 2 || self.total_length() <= f64::EPSILON
    }

    /// Point and unit tangent at `distance` along the path, clamped to the
    /// path's ends.
    #[must_use]
    pub fn sample(&self, distance: f64) -> (Point2<f64>, Vector2<f64>) {
        if self.points.len() < 2 {
            let origin = self.points.first().copied().unwrap_or_else(Point2::origin);
            return (origin, Vector2::x());
        }

        let total = self.total_length();
        let d = distance.clamp(0.0, total);

        // Index of the span containing d.
        let mut span = self.points.len() - 2;
        for i in 0..self.cumulative.len() - 1 {
            if d <= self.cumulative[i + 1] {
                span = i;
                break;
            }
        }

        let a = self.points[span];
        let b = self.points[span + 1];
        let span_len = self.cumulative[span + 1] - self.cumulative[span];
        let tangent = (b - a)
            .try_normalize(f64::EPSILON)
            .unwrap_or_else(Vector2::x);
        if span_len <= f64::EPSILON {
            return (a, tangent);
        }
        let t = (d - self.cumulative[span]) / span_len;
        (a + (b - a) * t, tangent)
    }
}

/// Resolve a run's path binding against a plan.
///
/// Explicit point paths are returned as-is. Shell bindings take the
/// shell's centerline, closed back on itself for loops. `None` when the
/// bound shell no longer exists and the run is orphaned.
#[must_use]
pub fn bound_path(plan: &Plan, run: &Run) -> Option<Vec<Point2<f64>>> {
    match &run.path {
        RunPath::Points(points) => Some(points.clone()),
        RunPath::Shell(shell_id) => {
            let shell = plan.shell(*shell_id)?;
            let mut points = shell.centerline();
            if shell.closed {
                if let Some(first) = points.first().copied() {
                    points.push(first);
                }
            }
            Some(points)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn l_path() -> Polyline {
        Polyline::new(vec![
            Point2::new(0.0, 0.0),
            Point2::new(4.0, 0.0),
            Point2::new(4.0, 3.0),
        ])
    }

    #[test]
    fn total_length_sums_spans() {
        assert_relative_eq!(l_path().total_length(), 7.0);
    }

    #[test]
    fn sample_within_first_span() {
        let (p, t) = l_path().sample(2.0);
        assert_relative_eq!(p.x, 2.0);
        assert_relative_eq!(p.y, 0.0);
        assert_relative_eq!(t.x, 1.0);
    }

    #[test]
    fn sample_across_the_corner() {
        let (p, t) = l_path().sample(5.0);
        assert_relative_eq!(p.x, 4.0);
        assert_relative_eq!(p.y, 1.0);
        assert_relative_eq!(t.y, 1.0);
    }

    #[test]
    fn sample_clamps_to_the_ends() {
        let (p, _) = l_path().sample(100.0);
        assert_relative_eq!(p.x, 4.0);
        assert_relative_eq!(p.y, 3.0);

        let (p, _) = l_path().sample(-5.0);
        assert_relative_eq!(p.x, 0.0);
    }

    #[test]
    fn single_point_is_degenerate() {
        assert!(Polyline::new(vec![Point2::new(1.0, 1.0)]).is_degenerate());
        assert!(Polyline::new(vec![]).is_degenerate());
    }
}
