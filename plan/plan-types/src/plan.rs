//! The plan root aggregate.

use serde::{Deserialize, Serialize};

use crate::error::PlanResult;
use crate::ids::{OpeningId, PlanId, RunId, SegmentId, ShellId};
use crate::run::Run;
use crate::segment::WallSegment;
use crate::shell::Shell;
use crate::version::PlanVersion;

/// Root aggregate: shells, runs, and the plan version.
///
/// A plan is plain data. All mutation goes through the topology/opening/run
/// services driven by the session authority; the version is bumped once per
/// committed edit. Serializing a plan captures the full authored graph;
/// derived caches (mesh patches, placed instances) are never part of it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Plan {
    /// Unique id.
    pub id: PlanId,
    /// Wall shells.
    pub shells: Vec<Shell>,
    /// Fixture runs.
    pub runs: Vec<Run>,
    /// Optimistic-concurrency version counter.
    pub version: PlanVersion,
}

impl Plan {
    /// Create an empty plan at version zero.
    #[must_use]
    pub fn new() -> Self {
        Self {
            id: PlanId::new(),
            shells: Vec::new(),
            runs: Vec::new(),
            version: PlanVersion::ZERO,
        }
    }

    /// Find a shell by id.
    #[must_use]
    pub fn shell(&self, id: ShellId) -> Option<&Shell> {
        self.shells.iter().find(|s| s.id == id)
    }

    /// Find a shell by id, mutably.
    pub fn shell_mut(&mut self, id: ShellId) -> Option<&mut Shell> {
        self.shells.iter_mut().find(|s| s.id == id)
    }

    /// Find a segment anywhere in the plan, with its owning shell id.
    #[must_use]
    pub fn segment(&self, id: SegmentId) -> Option<(ShellId, &WallSegment)> {
        self.shells.iter().find_map(|shell| {
            shell.segment(id).map(|segment| (shell.id, segment))
        })
    }

    /// Find a segment anywhere in the plan, mutably.
    pub fn segment_mut(&mut self, id: SegmentId) -> Option<&mut WallSegment> {
        self.shells
            .iter_mut()
            .find_map(|shell| shell.segment_mut(id))
    }

    /// The shell owning a segment.
    #[must_use]
    pub fn shell_of_segment(&self, id: SegmentId) -> Option<ShellId> {
        self.segment(id).map(|(shell_id, _)| shell_id)
    }

    /// Find the segment hosting an opening.
    #[must_use]
    pub fn host_of_opening(&self, id: OpeningId) -> Option<&WallSegment> {
        self.shells
            .iter()
            .flat_map(|shell| shell.segments.iter())
            .find(|segment| segment.opening(id).is_some())
    }

    /// Find the segment hosting an opening, mutably.
    pub fn host_of_opening_mut(&mut self, id: OpeningId) -> Option<&mut WallSegment> {
        self.shells
            .iter_mut()
            .flat_map(|shell| shell.segments.iter_mut())
            .find(|segment| segment.opening(id).is_some())
    }

    /// Find a run by id.
    #[must_use]
    pub fn run(&self, id: RunId) -> Option<&Run> {
        self.runs.iter().find(|r| r.id == id)
    }

    /// Find a run by id, mutably.
    pub fn run_mut(&mut self, id: RunId) -> Option<&mut Run> {
        self.runs.iter_mut().find(|r| r.id == id)
    }

    /// All segments in the plan.
    pub fn segments(&self) -> impl Iterator<Item = &WallSegment> {
        self.shells.iter().flat_map(|shell| shell.segments.iter())
    }

    /// Serialize the full authored graph to JSON.
    ///
    /// # Errors
    ///
    /// Returns [`PlanError::Serialization`](crate::PlanError) if encoding
    /// fails.
    pub fn to_json(&self) -> PlanResult<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Restore a plan from JSON produced by [`to_json`](Self::to_json).
    ///
    /// # Errors
    ///
    /// Returns [`PlanError::Serialization`](crate::PlanError) on malformed
    /// input.
    pub fn from_json(json: &str) -> PlanResult<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

impl Default for Plan {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{CatalogId, Opening, RunPath, SpacingPolicy};
    use nalgebra::Point2;

    fn sample_plan() -> Plan {
        let mut plan = Plan::new();
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
        shell.segments[0]
            .openings
            .push(Opening::new(CatalogId::new("door"), 2.0, 0.0, 1.0, 2.1));
        let shell_id = shell.id;
        plan.shells.push(shell);
        plan.runs.push(Run::new(
            CatalogId::new("downlight"),
            RunPath::Shell(shell_id),
            SpacingPolicy::FixedSpacing {
                spacing: 1.2,
                absorb_remainder: false,
            },
        ));
        plan
    }

    #[test]
    fn segment_lookup_reports_owning_shell() {
        let plan = sample_plan();
        let shell_id = plan.shells[0].id;
        let seg_id = plan.shells[0].segments[2].id;
        let (owner, segment) = plan.segment(seg_id).unwrap();
        assert_eq!(owner, shell_id);
        assert_eq!(segment.id, seg_id);
    }

    #[test]
    fn opening_host_lookup() {
        let plan = sample_plan();
        let opening_id = plan.shells[0].segments[0].openings[0].id;
        let host = plan.host_of_opening(opening_id).unwrap();
        assert_eq!(host.id, plan.shells[0].segments[0].id);
    }

    #[test]
    fn json_roundtrip_preserves_graph_and_version() {
        let mut plan = sample_plan();
        plan.version = plan.version.next().next();

        let json = plan.to_json().unwrap();
        let back = Plan::from_json(&json).unwrap();

        assert_eq!(back, plan);
        assert_eq!(back.version.get(), 2);
    }

    #[test]
    fn from_json_rejects_garbage() {
        assert!(Plan::from_json("{not json").is_err());
    }
}
