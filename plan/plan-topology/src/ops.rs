//! Topology operations and invalidation tracking.

use nalgebra::Point2;
use tracing::debug;

use plan_types::{JointId, Plan, SegmentId, Shell, ShellId, WallSegment};

use crate::error::{TopologyError, TopologyResult};
use crate::geom::segment_intersection;
use crate::joints::{Joint, JointTable, SegmentEnd};

/// Deterministic id for the second half of a split: every replica
/// applying the same split mints the same segment id.
fn derive_split_id(parent: SegmentId, at: f64) -> SegmentId {
    let mut bytes = [0u8; 24];
    bytes[..16].copy_from_slice(parent.as_uuid().as_bytes());
    bytes[16..].copy_from_slice(&at.to_bits().to_le_bytes());
    SegmentId::from_uuid(uuid::Uuid::new_v5(&uuid::Uuid::NAMESPACE_OID, &bytes))
}

/// Deterministic id for the tail shell created by an interior removal.
fn derive_tail_shell_id(shell: ShellId, removed: SegmentId) -> ShellId {
    let mut bytes = [0u8; 32];
    bytes[..16].copy_from_slice(shell.as_uuid().as_bytes());
    bytes[16..].copy_from_slice(removed.as_uuid().as_bytes());
    ShellId::from_uuid(uuid::Uuid::new_v5(&uuid::Uuid::NAMESPACE_OID, &bytes))
}

/// Tuning for topology operations.
#[derive(Debug, Clone, Copy)]
pub struct TopologyConfig {
    /// Endpoints within this distance are considered coincident, in meters.
    pub snap_epsilon: f64,
    /// Minimum segment length any operation may produce, in meters.
    pub min_segment_length: f64,
}

impl Default for TopologyConfig {
    fn default() -> Self {
        Self {
            snap_epsilon: 1e-4,
            min_segment_length: 0.05,
        }
    }
}

/// Entities invalidated by a topology operation.
///
/// Segments listed here need remeshing and opening revalidation; joints
/// have had their corners recomputed; shells have changed shape, so runs
/// bound to them need re-resolution.
#[derive(Debug, Clone, Default)]
pub struct Invalidated {
    /// Segments needing remesh and opening revalidation.
    pub segments: Vec<SegmentId>,
    /// Joints whose corner geometry was recomputed.
    pub joints: Vec<JointId>,
    /// Shells whose centerline changed.
    pub shells: Vec<ShellId>,
}

impl Invalidated {
    /// Record a segment, without duplicates.
    pub fn push_segment(&mut self, id: SegmentId) {
        if !self.segments.contains(&id) {
            self.segments.push(id);
        }
    }

    /// Record a joint, without duplicates.
    pub fn push_joint(&mut self, id: JointId) {
        if !self.joints.contains(&id) {
            self.joints.push(id);
        }
    }

    /// Record a shell, without duplicates.
    pub fn push_shell(&mut self, id: ShellId) {
        if !self.shells.contains(&id) {
            self.shells.push(id);
        }
    }

    /// Fold another invalidation set into this one.
    pub fn merge(&mut self, other: Self) {
        for id in other.segments {
            self.push_segment(id);
        }
        for id in other.joints {
            self.push_joint(id);
        }
        for id in other.shells {
            self.push_shell(id);
        }
    }

    /// Whether nothing was invalidated.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty() && self.joints.is_empty() && self.shells.is_empty()
    }
}

/// The shell topology manager.
///
/// Owns the derived joint table and applies all structural mutations to a
/// plan's shells. The plan itself stays plain data; every operation
/// validates fully before mutating (all-or-nothing) and returns the
/// invalidated entity set.
#[derive(Debug, Default)]
pub struct ShellTopology {
    config: TopologyConfig,
    joints: JointTable,
}

impl ShellTopology {
    /// Create a manager with the given configuration.
    #[must_use]
    pub fn new(config: TopologyConfig) -> Self {
        Self {
            config,
            joints: JointTable::new(),
        }
    }

    /// The active configuration.
    #[must_use]
    pub const fn config(&self) -> &TopologyConfig {
        &self.config
    }

    /// Rebuild the joint table from scratch, e.g. after loading a plan.
    pub fn rebuild(&mut self, plan: &Plan) {
        self.joints.rebuild(plan, self.config.snap_epsilon);
    }

    /// Look up a joint by id.
    #[must_use]
    pub fn joint(&self, id: JointId) -> Option<&Joint> {
        self.joints.joint(id)
    }

    /// All joints.
    pub fn joints(&self) -> impl Iterator<Item = &Joint> {
        self.joints.iter()
    }

    /// The joint a given segment end participates in, if any.
    #[must_use]
    pub fn joint_of_end(&self, segment: SegmentId, end: SegmentEnd) -> Option<&Joint> {
        self.joints.joint_of_end(segment, end)
    }

    /// Append a segment to a shell's chain.
    ///
    /// The segment must continue the chain: its start is snapped onto the
    /// current chain end when within the snap epsilon. Appending a segment
    /// whose end lands on the chain start closes the shell.
    ///
    /// # Errors
    ///
    /// [`TopologyError::UnknownShell`], [`TopologyError::InvalidDimensions`],
    /// [`TopologyError::DegenerateSegment`], [`TopologyError::ChainBroken`]
    /// (also when appending to an already-closed shell), or
    /// [`TopologyError::WouldIntersect`] when the segment would cross an
    /// existing wall away from a shared endpoint.
    pub fn add_segment(
        &mut self,
        plan: &mut Plan,
        shell_id: ShellId,
        mut segment: WallSegment,
    ) -> TopologyResult<Invalidated> {
        let eps = self.config.snap_epsilon;

        let shell = plan
            .shell(shell_id)
            .ok_or(TopologyError::UnknownShell { id: shell_id })?;

        if segment.thickness <= 0.0 || segment.height <= 0.0 {
            return Err(TopologyError::InvalidDimensions {
                thickness: segment.thickness,
                height: segment.height,
            });
        }

        let mut closes_loop = false;
        if let Some(last) = shell.segments.last() {
            if shell.closed {
                return Err(TopologyError::ChainBroken { shell: shell_id });
            }
            if (segment.start - last.end).norm() > eps {
                return Err(TopologyError::ChainBroken { shell: shell_id });
            }
            segment.start = last.end;

            if let Some(first) = shell.segments.first() {
                if (segment.end - first.start).norm() <= eps {
                    segment.end = first.start;
                    closes_loop = true;
                }
            }
        }

        let length = segment.length();
        if length < self.config.min_segment_length {
            return Err(TopologyError::DegenerateSegment {
                length,
                min: self.config.min_segment_length,
            });
        }

        self.check_crossings(plan, &segment)?;

        let prev_id = shell.segments.last().map(|s| s.id);
        let first_id = shell.segments.first().map(|s| s.id);
        let new_id = segment.id;

        debug!(shell = %shell_id, segment = %new_id, closes_loop, "add segment");

        let shell = plan
            .shell_mut(shell_id)
            .ok_or(TopologyError::UnknownShell { id: shell_id })?;
        shell.segments.push(segment);
        if closes_loop {
            shell.closed = true;
        }

        self.joints.rebuild(plan, eps);

        let mut invalidated = Invalidated::default();
        invalidated.push_segment(new_id);
        if let Some(prev) = prev_id {
            invalidated.push_segment(prev);
        }
        if closes_loop {
            if let Some(first) = first_id {
                invalidated.push_segment(first);
            }
        }
        for joint in self.joints.joints_of_segments(&invalidated.segments) {
            invalidated.push_joint(joint);
        }
        invalidated.push_shell(shell_id);
        Ok(invalidated)
    }

    /// Split a segment at `at` meters from its start.
    ///
    /// Openings keep their authored placement: those entirely before the
    /// split stay on the first half, those entirely after move to the new
    /// second half with shifted offsets.
    ///
    /// # Errors
    ///
    /// [`TopologyError::UnknownSegment`], [`TopologyError::DegenerateSegment`]
    /// when either half would be shorter than the minimum, or
    /// [`TopologyError::SplitInsideOpening`] when the position falls inside
    /// an opening's footprint.
    pub fn split_segment(
        &mut self,
        plan: &mut Plan,
        segment_id: SegmentId,
        at: f64,
    ) -> TopologyResult<(SegmentId, Invalidated)> {
        let (shell_id, segment) = plan
            .segment(segment_id)
            .ok_or(TopologyError::UnknownSegment { id: segment_id })?;

        let length = segment.length();
        let shorter = at.min(length - at);
        if shorter < self.config.min_segment_length {
            return Err(TopologyError::DegenerateSegment {
                length: shorter,
                min: self.config.min_segment_length,
            });
        }

        if let Some(opening) = segment.openings.iter().find(|o| o.extent().contains(at)) {
            return Err(TopologyError::SplitInsideOpening {
                opening: opening.id,
            });
        }

        let split_point = segment.point_at(at);

        let shell = plan
            .shell_mut(shell_id)
            .ok_or(TopologyError::UnknownShell { id: shell_id })?;
        let index = shell
            .segment_index(segment_id)
            .ok_or(TopologyError::UnknownSegment { id: segment_id })?;

        let first = &mut shell.segments[index];
        let mut second = WallSegment::new(split_point, first.end, first.thickness, first.height);
        // The new half's id derives from the parent and the split position
        // so every replica applying this split mints the same id.
        second.id = derive_split_id(segment_id, at);
        second.base_z = first.base_z;
        second.skirting = first.skirting;

        // Partition openings across the halves.
        let mut moved = Vec::new();
        first.openings.retain(|o| {
            if o.end_offset() <= at {
                true
            } else {
                let mut o = o.clone();
                o.offset -= at;
                moved.push(o);
                false
            }
        });
        second.openings = moved;
        second.sort_openings();

        first.end = split_point;
        let second_id = second.id;
        shell.segments.insert(index + 1, second);

        debug!(segment = %segment_id, new = %second_id, at, "split segment");

        self.joints.rebuild(plan, self.config.snap_epsilon);

        let mut invalidated = Invalidated::default();
        invalidated.push_segment(segment_id);
        invalidated.push_segment(second_id);
        for joint in self.joints.joints_of_segments(&invalidated.segments) {
            invalidated.push_joint(joint);
        }
        invalidated.push_shell(shell_id);
        Ok((second_id, invalidated))
    }

    /// Move a joint to a new position, dragging every adjacent segment
    /// endpoint with it.
    ///
    /// # Errors
    ///
    /// [`TopologyError::UnknownJoint`], or
    /// [`TopologyError::DegenerateSegment`] when any adjacent segment would
    /// shrink below the minimum length. Nothing is mutated on rejection.
    pub fn move_joint(
        &mut self,
        plan: &mut Plan,
        joint_id: JointId,
        to: Point2<f64>,
    ) -> TopologyResult<Invalidated> {
        let joint = self
            .joints
            .joint(joint_id)
            .ok_or(TopologyError::UnknownJoint { id: joint_id })?;
        let ends = joint.ends.clone();

        // Validate every adjacent segment against the proposed position
        // before touching anything.
        for (segment_id, end) in &ends {
            let (_, segment) = plan
                .segment(*segment_id)
                .ok_or(TopologyError::UnknownSegment { id: *segment_id })?;
            let other = match end {
                SegmentEnd::Start => segment.end,
                SegmentEnd::End => segment.start,
            };
            let length = (other - to).norm();
            if length < self.config.min_segment_length {
                return Err(TopologyError::DegenerateSegment {
                    length,
                    min: self.config.min_segment_length,
                });
            }
        }

        debug!(joint = %joint_id, x = to.x, y = to.y, "move joint");

        let mut invalidated = Invalidated::default();
        for (segment_id, end) in &ends {
            if let Some(segment) = plan.segment_mut(*segment_id) {
                match end {
                    SegmentEnd::Start => segment.start = to,
                    SegmentEnd::End => segment.end = to,
                }
            }
            invalidated.push_segment(*segment_id);
            if let Some(shell_id) = plan.shell_of_segment(*segment_id) {
                invalidated.push_shell(shell_id);
            }
        }

        self.joints.rebuild(plan, self.config.snap_epsilon);
        for joint in self.joints.joints_of_segments(&invalidated.segments) {
            invalidated.push_joint(joint);
        }
        Ok(invalidated)
    }

    /// Remove a segment, repairing the owning shell's chain.
    ///
    /// Removing from a closed loop opens it; removing an interior segment
    /// of an open chain splits the shell in two; a shell left with no
    /// segments is removed from the plan.
    ///
    /// # Errors
    ///
    /// [`TopologyError::UnknownSegment`].
    pub fn remove_segment(
        &mut self,
        plan: &mut Plan,
        segment_id: SegmentId,
    ) -> TopologyResult<Invalidated> {
        let (shell_id, _) = plan
            .segment(segment_id)
            .ok_or(TopologyError::UnknownSegment { id: segment_id })?;

        // Neighbors lose a joint member; they need new corners and remesh.
        let neighbor_segments: Vec<SegmentId> = self
            .joints
            .iter()
            .filter(|j| j.touches(segment_id))
            .flat_map(|j| j.ends.iter().map(|(id, _)| *id))
            .filter(|id| *id != segment_id)
            .collect();

        let mut invalidated = Invalidated::default();
        invalidated.push_shell(shell_id);

        let shell = plan
            .shell_mut(shell_id)
            .ok_or(TopologyError::UnknownShell { id: shell_id })?;
        let index = shell
            .segment_index(segment_id)
            .ok_or(TopologyError::UnknownSegment { id: segment_id })?;

        shell.segments.remove(index);

        if shell.closed {
            // The loop opens; restart the chain just past the gap.
            if !shell.segments.is_empty() {
                let mid = index % shell.segments.len();
                shell.segments.rotate_left(mid);
            }
            shell.closed = false;
        } else if index > 0 && index < shell.segments.len() {
            // Interior removal splits the chain in two shells. The tail
            // shell's id derives from the removed segment so replicas
            // agree on it.
            let tail = shell.segments.split_off(index);
            let mut new_shell = Shell::new_open();
            new_shell.id = derive_tail_shell_id(shell_id, segment_id);
            new_shell.segments = tail;
            let new_shell_id = new_shell.id;
            plan.shells.push(new_shell);
            invalidated.push_shell(new_shell_id);
        }

        if let Some(shell) = plan.shell(shell_id) {
            if shell.segments.is_empty() {
                plan.shells.retain(|s| s.id != shell_id);
            }
        }

        debug!(segment = %segment_id, shell = %shell_id, "remove segment");

        self.joints.rebuild(plan, self.config.snap_epsilon);

        for id in neighbor_segments {
            invalidated.push_segment(id);
        }
        for joint in self.joints.joints_of_segments(&invalidated.segments) {
            invalidated.push_joint(joint);
        }
        Ok(invalidated)
    }

    /// Change a segment's thickness and height.
    ///
    /// Corners at both ends depend on thickness, so the adjacent joints and
    /// their other segments are invalidated too.
    ///
    /// # Errors
    ///
    /// [`TopologyError::UnknownSegment`] or
    /// [`TopologyError::InvalidDimensions`].
    pub fn resize_segment(
        &mut self,
        plan: &mut Plan,
        segment_id: SegmentId,
        thickness: f64,
        height: f64,
    ) -> TopologyResult<Invalidated> {
        if thickness <= 0.0 || height <= 0.0 {
            return Err(TopologyError::InvalidDimensions { thickness, height });
        }

        let segment = plan
            .segment_mut(segment_id)
            .ok_or(TopologyError::UnknownSegment { id: segment_id })?;
        segment.thickness = thickness;
        segment.height = height;

        let mut invalidated = Invalidated::default();
        invalidated.push_segment(segment_id);
        // Neighbors share a corner whose miter depends on this thickness.
        let neighbors: Vec<SegmentId> = self
            .joints
            .iter()
            .filter(|j| j.touches(segment_id))
            .flat_map(|j| j.ends.iter().map(|(id, _)| *id))
            .filter(|id| *id != segment_id)
            .collect();
        for id in neighbors {
            invalidated.push_segment(id);
        }

        self.joints.rebuild(plan, self.config.snap_epsilon);
        for joint in self.joints.joints_of_segments(&invalidated.segments) {
            invalidated.push_joint(joint);
        }
        if let Some(shell_id) = plan.shell_of_segment(segment_id) {
            invalidated.push_shell(shell_id);
        }
        Ok(invalidated)
    }

    /// Reject segments crossing existing walls away from shared endpoints.
    fn check_crossings(&self, plan: &Plan, candidate: &WallSegment) -> TopologyResult<()> {
        let eps = self.config.snap_epsilon;
        for other in plan.segments() {
            if other.id == candidate.id {
                continue;
            }
            if let Some(hit) = segment_intersection(
                &candidate.start,
                &candidate.end,
                &other.start,
                &other.end,
                eps,
            ) {
                let touches_endpoint = [candidate.start, candidate.end, other.start, other.end]
                    .iter()
                    .any(|p| (p - hit).norm() <= eps);
                if !touches_endpoint {
                    return Err(TopologyError::WouldIntersect { other: other.id });
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use plan_types::{CatalogId, Opening};

    fn rect_plan() -> (Plan, ShellTopology, ShellId) {
        let mut plan = Plan::new();
        let shell = Shell::new_open();
        let shell_id = shell.id;
        plan.shells.push(shell);

        let mut topology = ShellTopology::new(TopologyConfig::default());
        let corners = [
            Point2::new(0.0, 0.0),
            Point2::new(5.0, 0.0),
            Point2::new(5.0, 3.0),
            Point2::new(0.0, 3.0),
            Point2::new(0.0, 0.0),
        ];
        for window in corners.windows(2) {
            let seg = WallSegment::new(window[0], window[1], 0.2, 2.7);
            topology
                .add_segment(&mut plan, shell_id, seg)
                .expect("add segment");
        }
        (plan, topology, shell_id)
    }

    #[test]
    fn rectangle_closes_into_a_loop() {
        let (plan, topology, shell_id) = rect_plan();
        let shell = plan.shell(shell_id).expect("shell");
        assert!(shell.closed);
        assert_eq!(shell.segments.len(), 4);
        // Four corner joints, each with two members.
        assert_eq!(topology.joints().count(), 4);
        assert!(topology.joints().all(|j| j.ends.len() == 2));
    }

    #[test]
    fn add_rejects_chain_breaks() {
        let mut plan = Plan::new();
        let shell = Shell::new_open();
        let shell_id = shell.id;
        plan.shells.push(shell);
        let mut topology = ShellTopology::new(TopologyConfig::default());

        topology
            .add_segment(
                &mut plan,
                shell_id,
                WallSegment::new(Point2::new(0.0, 0.0), Point2::new(5.0, 0.0), 0.2, 2.7),
            )
            .expect("first segment");

        let detached =
            WallSegment::new(Point2::new(9.0, 9.0), Point2::new(12.0, 9.0), 0.2, 2.7);
        assert!(matches!(
            topology.add_segment(&mut plan, shell_id, detached),
            Err(TopologyError::ChainBroken { .. })
        ));
    }

    #[test]
    fn add_rejects_crossings() {
        let (mut plan, mut topology, _) = rect_plan();
        let shell = Shell::new_open();
        let shell_id = shell.id;
        plan.shells.push(shell);

        // A wall slicing straight through the rectangle.
        let crossing =
            WallSegment::new(Point2::new(2.5, -1.0), Point2::new(2.5, 4.0), 0.2, 2.7);
        assert!(matches!(
            topology.add_segment(&mut plan, shell_id, crossing),
            Err(TopologyError::WouldIntersect { .. })
        ));
    }

    #[test]
    fn split_partitions_openings() {
        let (mut plan, mut topology, shell_id) = rect_plan();
        let seg_id = plan.shell(shell_id).expect("shell").segments[0].id;

        {
            let segment = plan.segment_mut(seg_id).expect("segment");
            segment
                .openings
                .push(Opening::new(CatalogId::new("door"), 0.5, 0.0, 0.9, 2.1));
            segment
                .openings
                .push(Opening::new(CatalogId::new("window"), 3.5, 0.9, 1.0, 1.2));
        }

        let (second_id, invalidated) = topology
            .split_segment(&mut plan, seg_id, 2.0)
            .expect("split");

        let (_, first) = plan.segment(seg_id).expect("first");
        let (_, second) = plan.segment(second_id).expect("second");
        assert_eq!(first.openings.len(), 1);
        assert_eq!(second.openings.len(), 1);
        // Moved opening re-bases its offset on the new segment.
        assert!((second.openings[0].offset - 1.5).abs() < 1e-12);
        assert!(invalidated.segments.contains(&seg_id));
        assert!(invalidated.segments.contains(&second_id));
    }

    #[test]
    fn split_inside_opening_is_a_conflict() {
        let (mut plan, mut topology, shell_id) = rect_plan();
        let seg_id = plan.shell(shell_id).expect("shell").segments[0].id;
        plan.segment_mut(seg_id)
            .expect("segment")
            .openings
            .push(Opening::new(CatalogId::new("door"), 2.0, 0.0, 1.0, 2.1));

        assert!(matches!(
            topology.split_segment(&mut plan, seg_id, 2.5),
            Err(TopologyError::SplitInsideOpening { .. })
        ));
        // Plan untouched.
        assert_eq!(plan.shell(shell_id).expect("shell").segments.len(), 4);
    }

    #[test]
    fn move_joint_drags_both_segments() {
        let (mut plan, mut topology, shell_id) = rect_plan();
        let seg0 = plan.shell(shell_id).expect("shell").segments[0].id;
        let joint_id = topology
            .joint_of_end(seg0, SegmentEnd::End)
            .map(|j| j.id)
            .expect("corner joint");

        let invalidated = topology
            .move_joint(&mut plan, joint_id, Point2::new(6.0, 0.5))
            .expect("move");

        assert_eq!(invalidated.segments.len(), 2);
        let (_, seg) = plan.segment(seg0).expect("segment");
        assert!((seg.end.x - 6.0).abs() < 1e-12);
        // The moved joint keeps its id and position.
        let joint = topology.joint(joint_id).expect("joint");
        assert!((joint.position.x - 6.0).abs() < 1e-12);
    }

    #[test]
    fn move_joint_rejects_degenerate_results() {
        let (mut plan, mut topology, shell_id) = rect_plan();
        let seg0 = plan.shell(shell_id).expect("shell").segments[0].id;
        let joint_id = topology
            .joint_of_end(seg0, SegmentEnd::End)
            .map(|j| j.id)
            .expect("corner joint");

        // Collapse onto the segment's start.
        let err = topology.move_joint(&mut plan, joint_id, Point2::new(0.0, 0.0));
        assert!(matches!(err, Err(TopologyError::DegenerateSegment { .. })));
        // All-or-nothing: nothing moved.
        let (_, seg) = plan.segment(seg0).expect("segment");
        assert!((seg.end.x - 5.0).abs() < 1e-12);
    }

    #[test]
    fn remove_from_loop_opens_it() {
        let (mut plan, mut topology, shell_id) = rect_plan();
        let seg_id = plan.shell(shell_id).expect("shell").segments[1].id;

        topology
            .remove_segment(&mut plan, seg_id)
            .expect("remove");

        let shell = plan.shell(shell_id).expect("shell");
        assert!(!shell.closed);
        assert_eq!(shell.segments.len(), 3);
        // Chain invariant holds across the remaining segments.
        for pair in shell.segments.windows(2) {
            assert!((pair[0].end - pair[1].start).norm() < 1e-9);
        }
    }

    #[test]
    fn interior_removal_splits_open_chain() {
        let mut plan = Plan::new();
        let shell = Shell::new_open();
        let shell_id = shell.id;
        plan.shells.push(shell);
        let mut topology = ShellTopology::new(TopologyConfig::default());

        let points = [
            Point2::new(0.0, 0.0),
            Point2::new(2.0, 0.0),
            Point2::new(4.0, 0.0),
            Point2::new(4.0, 2.0),
        ];
        for window in points.windows(2) {
            topology
                .add_segment(
                    &mut plan,
                    shell_id,
                    WallSegment::new(window[0], window[1], 0.2, 2.7),
                )
                .expect("add");
        }
        let middle = plan.shell(shell_id).expect("shell").segments[1].id;

        let invalidated = topology
            .remove_segment(&mut plan, middle)
            .expect("remove");

        assert_eq!(plan.shells.len(), 2);
        assert_eq!(invalidated.shells.len(), 2);
        assert!(plan.shells.iter().all(|s| s.segments.len() == 1));
    }

    #[test]
    fn resize_invalidates_neighbors() {
        let (mut plan, mut topology, shell_id) = rect_plan();
        let seg_id = plan.shell(shell_id).expect("shell").segments[0].id;

        let invalidated = topology
            .resize_segment(&mut plan, seg_id, 0.3, 2.7)
            .expect("resize");

        // Both neighbors share a mitered corner with the resized wall.
        assert_eq!(invalidated.segments.len(), 3);
        let (_, seg) = plan.segment(seg_id).expect("segment");
        assert!((seg.thickness - 0.3).abs() < 1e-12);
    }
}
