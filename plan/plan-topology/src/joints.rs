//! Joint table: shared segment endpoints and their resolved corners.

use hashbrown::HashMap;
use nalgebra::Point2;
use serde::{Deserialize, Serialize};

use plan_types::{JointId, Plan, SegmentId};

use crate::corner::{resolve_corner, CornerGeometry};

/// Which endpoint of a segment participates in a joint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum SegmentEnd {
    /// The segment's `start` point.
    Start,
    /// The segment's `end` point.
    End,
}

/// A shared endpoint of one or more segments, with its resolved corner.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Joint {
    /// Id derived from the member segment ends: identical on every replica
    /// and stable across moves.
    pub id: JointId,
    /// Position in plan space.
    pub position: Point2<f64>,
    /// The segment ends meeting here.
    pub ends: Vec<(SegmentId, SegmentEnd)>,
    /// Resolved corner geometry.
    pub corner: CornerGeometry,
}

impl Joint {
    /// Whether the given segment participates in this joint.
    #[must_use]
    pub fn touches(&self, segment: SegmentId) -> bool {
        self.ends.iter().any(|(id, _)| *id == segment)
    }
}

/// Derived joint table over a plan.
///
/// The table is owned by the topology manager, not by the plan: joints are
/// derived state, recomputed whenever an adjacent segment's endpoint or
/// thickness changes. A joint's id is derived deterministically from the
/// set of segment ends meeting at it, so the authority's table and every
/// client replica's agree on joint identity without any coordination, and
/// a joint keeps its id across moves.
#[derive(Debug, Clone, Default)]
pub struct JointTable {
    joints: HashMap<JointId, Joint>,
}

/// Deterministic joint id from the member segment ends.
fn derive_joint_id(ends: &[(SegmentId, SegmentEnd)]) -> JointId {
    let mut keys: Vec<[u8; 17]> = ends
        .iter()
        .map(|(segment, end)| {
            let mut key = [0u8; 17];
            key[..16].copy_from_slice(segment.as_uuid().as_bytes());
            key[16] = match end {
                SegmentEnd::Start => 0,
                SegmentEnd::End => 1,
            };
            key
        })
        .collect();
    keys.sort_unstable();

    let mut bytes = Vec::with_capacity(keys.len() * 17);
    for key in &keys {
        bytes.extend_from_slice(key);
    }
    JointId::from_uuid(uuid::Uuid::new_v5(&uuid::Uuid::NAMESPACE_OID, &bytes))
}

impl JointTable {
    /// Create an empty table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up a joint by id.
    #[must_use]
    pub fn joint(&self, id: JointId) -> Option<&Joint> {
        self.joints.get(&id)
    }

    /// All joints.
    pub fn iter(&self) -> impl Iterator<Item = &Joint> {
        self.joints.values()
    }

    /// Number of joints.
    #[must_use]
    pub fn len(&self) -> usize {
        self.joints.len()
    }

    /// Whether the table is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.joints.is_empty()
    }

    /// The joint a given segment end participates in, if any.
    #[must_use]
    pub fn joint_of_end(&self, segment: SegmentId, end: SegmentEnd) -> Option<&Joint> {
        self.joints
            .values()
            .find(|j| j.ends.contains(&(segment, end)))
    }

    /// Joints touching any of the given segments.
    #[must_use]
    pub fn joints_of_segments(&self, segments: &[SegmentId]) -> Vec<JointId> {
        self.joints
            .values()
            .filter(|j| segments.iter().any(|s| j.touches(*s)))
            .map(|j| j.id)
            .collect()
    }

    /// Rebuild the table from the current plan.
    ///
    /// Endpoints within `snap_epsilon` of each other cluster into one
    /// joint. Because ids derive from the member ends, a joint whose
    /// membership is unchanged keeps its id, and every replica derives the
    /// same ids from the same plan.
    pub fn rebuild(&mut self, plan: &Plan, snap_epsilon: f64) {
        // Cluster endpoints on a quantized grid. The grid cell is the snap
        // epsilon, so ends meant to coincide land in the same cell.
        #[allow(clippy::cast_possible_truncation)]
        fn quantize(p: &Point2<f64>, cell: f64) -> (i64, i64) {
            ((p.x / cell).round() as i64, (p.y / cell).round() as i64)
        }

        let mut clusters: HashMap<(i64, i64), Vec<(SegmentId, SegmentEnd, Point2<f64>)>> =
            HashMap::new();
        for segment in plan.segments() {
            clusters
                .entry(quantize(&segment.start, snap_epsilon))
                .or_default()
                .push((segment.id, SegmentEnd::Start, segment.start));
            clusters
                .entry(quantize(&segment.end, snap_epsilon))
                .or_default()
                .push((segment.id, SegmentEnd::End, segment.end));
        }

        let mut rebuilt: HashMap<JointId, Joint> = HashMap::new();
        for members in clusters.into_values() {
            let position = members[0].2;
            let mut ends: Vec<(SegmentId, SegmentEnd)> =
                members.iter().map(|(id, end, _)| (*id, *end)).collect();
            ends.sort_unstable();

            let id = derive_joint_id(&ends);
            let corner = Self::corner_for(plan, &ends, snap_epsilon);
            rebuilt.insert(
                id,
                Joint {
                    id,
                    position,
                    ends,
                    corner,
                },
            );
        }

        self.joints = rebuilt;
    }

    /// Recompute corner geometry for one joint in place.
    pub fn recompute_corner(&mut self, plan: &Plan, id: JointId, snap_epsilon: f64) {
        if let Some(joint) = self.joints.get_mut(&id) {
            joint.corner = Self::corner_for(plan, &joint.ends, snap_epsilon);
        }
    }

    fn corner_for(
        plan: &Plan,
        ends: &[(SegmentId, SegmentEnd)],
        epsilon: f64,
    ) -> CornerGeometry {
        // Miter only for the plain two-wall corner: one segment ending,
        // one starting. Everything else butt-joins.
        if ends.len() != 2 {
            return CornerGeometry::Butt;
        }
        let incoming = ends
            .iter()
            .find(|(_, e)| *e == SegmentEnd::End)
            .and_then(|(id, _)| plan.segment(*id).map(|(_, s)| s));
        let outgoing = ends
            .iter()
            .find(|(_, e)| *e == SegmentEnd::Start)
            .and_then(|(id, _)| plan.segment(*id).map(|(_, s)| s));
        match (incoming, outgoing) {
            (Some(incoming), Some(outgoing)) => resolve_corner(incoming, outgoing, epsilon),
            _ => CornerGeometry::Butt,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use plan_types::{Shell, WallSegment};

    fn l_plan() -> Plan {
        let mut plan = Plan::new();
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
        plan.shells.push(shell);
        plan
    }

    #[test]
    fn rebuild_clusters_shared_endpoints() {
        let plan = l_plan();
        let mut table = JointTable::new();
        table.rebuild(&plan, 1e-6);

        // Three joints: two free ends plus the shared corner.
        assert_eq!(table.len(), 3);

        let corner = table
            .iter()
            .find(|j| j.ends.len() == 2)
            .expect("shared joint");
        assert!(matches!(corner.corner, CornerGeometry::Miter { .. }));
    }

    #[test]
    fn free_ends_are_butt() {
        let plan = l_plan();
        let mut table = JointTable::new();
        table.rebuild(&plan, 1e-6);

        for joint in table.iter().filter(|j| j.ends.len() == 1) {
            assert_eq!(joint.corner, CornerGeometry::Butt);
        }
    }

    #[test]
    fn rebuild_preserves_joint_ids() {
        let mut plan = l_plan();
        let mut table = JointTable::new();
        table.rebuild(&plan, 1e-6);

        let seg0 = plan.shells[0].segments[0].id;
        let corner_id = table
            .joint_of_end(seg0, SegmentEnd::End)
            .map(|j| j.id)
            .expect("corner joint");

        // Nudge the corner; the joint must keep its id.
        plan.shells[0].segments[0].end = Point2::new(5.0, 0.5);
        plan.shells[0].segments[1].start = Point2::new(5.0, 0.5);
        table.rebuild(&plan, 1e-6);

        let moved = table
            .joint_of_end(seg0, SegmentEnd::End)
            .expect("corner joint after move");
        assert_eq!(moved.id, corner_id);
        assert!((moved.position.y - 0.5).abs() < 1e-12);
    }

    #[test]
    fn joint_ids_are_replica_deterministic() {
        // Two tables built independently from the same plan agree on ids,
        // the property client replicas rely on.
        let plan = l_plan();
        let mut a = JointTable::new();
        let mut b = JointTable::new();
        a.rebuild(&plan, 1e-6);
        b.rebuild(&plan, 1e-6);

        let mut ids_a: Vec<JointId> = a.iter().map(|j| j.id).collect();
        let mut ids_b: Vec<JointId> = b.iter().map(|j| j.id).collect();
        ids_a.sort_unstable();
        ids_b.sort_unstable();
        assert_eq!(ids_a, ids_b);
    }

    #[test]
    fn three_way_joint_is_butt() {
        let mut plan = l_plan();
        // A third segment starting at the corner.
        let mut shell = Shell::new_open();
        shell.segments.push(WallSegment::new(
            Point2::new(5.0, 0.0),
            Point2::new(8.0, 0.0),
            0.2,
            2.7,
        ));
        plan.shells.push(shell);

        let mut table = JointTable::new();
        table.rebuild(&plan, 1e-6);

        let joint = table
            .iter()
            .find(|j| j.ends.len() == 3)
            .expect("three-way joint");
        assert_eq!(joint.corner, CornerGeometry::Butt);
    }
}
