//! Shells: chains and loops of wall segments.

use serde::{Deserialize, Serialize};

use crate::ids::{SegmentId, ShellId};
use crate::segment::WallSegment;

/// An ordered sequence of wall segments forming an open chain or a closed
/// loop.
///
/// Consecutive segments share an endpoint (a joint): segment `i`'s `end`
/// coincides with segment `i + 1`'s `start`. In a closed shell the sequence
/// is cyclic, so the last segment's `end` also coincides with the first
/// segment's `start`. The topology manager maintains this invariant; the
/// data type only records it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Shell {
    /// Unique id.
    pub id: ShellId,
    /// Segments in chain order.
    pub segments: Vec<WallSegment>,
    /// Whether the chain closes back on itself.
    pub closed: bool,
}

impl Shell {
    /// Create an empty open chain.
    #[must_use]
    pub fn new_open() -> Self {
        Self {
            id: ShellId::new(),
            segments: Vec::new(),
            closed: false,
        }
    }

    /// Create an empty closed loop.
    #[must_use]
    pub fn new_closed() -> Self {
        Self {
            id: ShellId::new(),
            segments: Vec::new(),
            closed: true,
        }
    }

    /// Number of joints in the shell.
    ///
    /// A closed loop of `n` segments has `n` joints; an open chain of `n`
    /// segments has `n + 1` endpoints of which `n - 1` are interior joints.
    #[must_use]
    pub fn joint_count(&self) -> usize {
        if self.segments.is_empty() {
            0
        } else if self.closed {
            self.segments.len()
        } else {
            self.segments.len() + 1
        }
    }

    /// Find a segment by id.
    #[must_use]
    pub fn segment(&self, id: SegmentId) -> Option<&WallSegment> {
        self.segments.iter().find(|s| s.id == id)
    }

    /// Find a segment by id, mutably.
    pub fn segment_mut(&mut self, id: SegmentId) -> Option<&mut WallSegment> {
        self.segments.iter_mut().find(|s| s.id == id)
    }

    /// Index of a segment in chain order.
    #[must_use]
    pub fn segment_index(&self, id: SegmentId) -> Option<usize> {
        self.segments.iter().position(|s| s.id == id)
    }

    /// The segments adjacent to the joint at `joint_index`.
    ///
    /// Joint `i` sits between segment `i - 1` and segment `i` (cyclically
    /// for closed shells). Returns the indices of the incoming and outgoing
    /// segments; either may be absent at the free ends of an open chain.
    #[must_use]
    pub fn segments_at_joint(&self, joint_index: usize) -> (Option<usize>, Option<usize>) {
        let n = self.segments.len();
        if n == 0 || joint_index >= self.joint_count() {
            return (None, None);
        }
        if self.closed {
            let incoming = (joint_index + n - 1) % n;
            (Some(incoming), Some(joint_index))
        } else {
            let incoming = joint_index.checked_sub(1);
            let outgoing = if joint_index < n { Some(joint_index) } else { None };
            (incoming, outgoing)
        }
    }

    /// Centerline polyline of the shell, one point per joint.
    ///
    /// For closed shells the first point is not repeated at the end; path
    /// consumers decide whether to close the loop.
    #[must_use]
    pub fn centerline(&self) -> Vec<nalgebra::Point2<f64>> {
        let mut points: Vec<nalgebra::Point2<f64>> =
            self.segments.iter().map(|s| s.start).collect();
        if !self.closed {
            if let Some(last) = self.segments.last() {
                points.push(last.end);
            }
        }
        points
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::Point2;

    fn rect_loop() -> Shell {
        let mut shell = Shell::new_closed();
        let corners = [
            Point2::new(0.0, 0.0),
            Point2::new(5.0, 0.0),
            Point2::new(5.0, 3.0),
            Point2::new(0.0, 3.0),
        ];
        for i in 0..4 {
            shell
                .segments
                .push(WallSegment::new(corners[i], corners[(i + 1) % 4], 0.2, 2.7));
        }
        shell
    }

    #[test]
    fn closed_loop_joint_count() {
        assert_eq!(rect_loop().joint_count(), 4);
    }

    #[test]
    fn open_chain_joint_count() {
        let mut shell = Shell::new_open();
        shell.segments.push(WallSegment::new(
            Point2::new(0.0, 0.0),
            Point2::new(5.0, 0.0),
            0.2,
            2.7,
        ));
        shell.segments.push(WallSegment::new(
            Point2::new(5.0, 0.0),
            Point2::new(5.0, 3.0),
            0.2,
            2.7,
        ));
        assert_eq!(shell.joint_count(), 3);
    }

    #[test]
    fn joint_adjacency_wraps_on_closed_loops() {
        let shell = rect_loop();
        assert_eq!(shell.segments_at_joint(0), (Some(3), Some(0)));
        assert_eq!(shell.segments_at_joint(2), (Some(1), Some(2)));
    }

    #[test]
    fn joint_adjacency_clamps_on_open_chains() {
        let mut shell = rect_loop();
        shell.closed = false;
        assert_eq!(shell.segments_at_joint(0), (None, Some(0)));
        assert_eq!(shell.segments_at_joint(4), (Some(3), None));
    }

    #[test]
    fn centerline_of_closed_loop_has_one_point_per_joint() {
        let shell = rect_loop();
        assert_eq!(shell.centerline().len(), 4);
    }
}
