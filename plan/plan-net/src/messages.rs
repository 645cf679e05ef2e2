//! Message types crossing the session channel.

use nalgebra::Point2;
use serde::{Deserialize, Serialize};

use plan_types::{
    AuthorId, CatalogId, IntentId, JointId, OpeningId, PlanVersion, Run, RunId, SegmentId, Shell,
    ShellId, WallSegment,
};

/// A requested mutation, one of the operations the engine supports.
///
/// New entities (segments, shells, runs) carry ids generated by the
/// requesting client, so the speculative local copy and the authoritative
/// one agree on identity without waiting for the round trip.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum EditOp {
    /// Create an empty shell.
    AddShell {
        /// The shell to create (normally empty of segments).
        shell: Shell,
    },
    /// Remove a shell and everything it owns.
    RemoveShell {
        /// Target shell.
        shell: ShellId,
    },
    /// Append a segment to a shell's chain.
    AddSegment {
        /// Target shell.
        shell: ShellId,
        /// The segment to append.
        segment: WallSegment,
    },
    /// Split a segment at a distance from its start.
    SplitSegment {
        /// Target segment.
        segment: SegmentId,
        /// Split position, meters from the segment start.
        at: f64,
    },
    /// Move a joint, dragging all adjacent segment endpoints.
    MoveJoint {
        /// Target joint.
        joint: JointId,
        /// New position in plan space.
        to: Point2<f64>,
    },
    /// Remove a segment, repairing the shell chain.
    RemoveSegment {
        /// Target segment.
        segment: SegmentId,
    },
    /// Change a segment's thickness and height.
    ResizeSegment {
        /// Target segment.
        segment: SegmentId,
        /// New thickness, meters.
        thickness: f64,
        /// New height, meters.
        height: f64,
    },
    /// Place an opening from a catalog definition.
    PlaceOpening {
        /// Client-generated id for the new opening.
        opening: OpeningId,
        /// Host segment.
        segment: SegmentId,
        /// Catalog definition to instantiate.
        def: CatalogId,
        /// Distance from segment start to the near edge, meters.
        offset: f64,
        /// Sill height above the segment base, meters.
        sill: f64,
    },
    /// Move an opening along its host.
    MoveOpening {
        /// Target opening.
        opening: OpeningId,
        /// New offset, meters.
        offset: f64,
        /// New sill height, meters.
        sill: f64,
    },
    /// Resize an opening.
    ResizeOpening {
        /// Target opening.
        opening: OpeningId,
        /// New width, meters.
        width: f64,
        /// New height, meters.
        height: f64,
    },
    /// Remove an opening.
    RemoveOpening {
        /// Target opening.
        opening: OpeningId,
    },
    /// Create a run.
    AddRun {
        /// The run to create.
        run: Run,
    },
    /// Replace a run's definition (path, policy, offsets).
    UpdateRun {
        /// The new definition; matched by `run.id`.
        run: Run,
    },
    /// Remove a run.
    RemoveRun {
        /// Target run.
        run: RunId,
    },
}

/// An immutable edit request submitted by a client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EditIntent {
    /// Client-generated idempotency id. Resubmitting an intent that was
    /// already applied is a no-op.
    pub intent_id: IntentId,
    /// The submitting author.
    pub author: AuthorId,
    /// The plan version this intent was issued against.
    pub based_on: PlanVersion,
    /// The requested operation.
    pub op: EditOp,
}

impl EditIntent {
    /// Create an intent with a fresh idempotency id.
    #[must_use]
    pub fn new(author: AuthorId, based_on: PlanVersion, op: EditOp) -> Self {
        Self {
            intent_id: IntentId::new(),
            author,
            based_on,
            op,
        }
    }
}

/// Why the authority rejected an intent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum RejectReason {
    /// The plan version advanced since the intent was issued. Resync to
    /// the carried current version and resubmit.
    StaleVersion,
    /// Parameter validation failed (bounds, clearance, dimensions).
    Validation {
        /// Human-readable reason.
        message: String,
    },
    /// The topology operation would produce invalid geometry.
    GeometryConflict {
        /// Human-readable reason.
        message: String,
    },
    /// A referenced entity does not exist at the authority.
    UnknownEntity {
        /// Human-readable reason.
        message: String,
    },
    /// The engine hit an internal invariant violation. Indicates a bug;
    /// surfaced for diagnostics.
    Internal {
        /// Human-readable reason.
        message: String,
    },
}

/// The authority's verdict on one intent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum IntentDisposition {
    /// The mutation was applied at this new plan version.
    Applied {
        /// The version the plan advanced to.
        version: PlanVersion,
    },
    /// The mutation was rejected; the plan is unchanged.
    Rejected {
        /// Why.
        reason: RejectReason,
        /// The authoritative version at rejection time, for resync.
        current_version: PlanVersion,
    },
}

/// Authority reply for one intent, addressed to its author.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IntentOutcome {
    /// The intent this answers.
    pub intent_id: IntentId,
    /// The author that submitted it.
    pub author: AuthorId,
    /// The verdict.
    pub disposition: IntentDisposition,
}

/// One entity-level change inside a version delta.
///
/// Deltas are shell-granular: a shell snapshot carries its segments with
/// their openings and flags, which is what the renderer and replicas
/// reconcile against.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum EntityChange {
    /// A shell was created or modified; full snapshot.
    ShellUpserted {
        /// The new state.
        shell: Shell,
    },
    /// A shell was removed.
    ShellRemoved {
        /// The removed shell.
        shell: ShellId,
    },
    /// A run was created or modified; full snapshot.
    RunUpserted {
        /// The new state.
        run: Run,
    },
    /// A run was removed (deleted by an author, or orphaned by its path's
    /// deletion).
    RunRemoved {
        /// The removed run.
        run: RunId,
    },
}

/// Broadcast to every session member after a committed mutation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VersionDelta {
    /// The version the plan advanced to. Strictly monotonic per plan.
    pub version: PlanVersion,
    /// The intent that caused the change.
    pub source_intent: IntentId,
    /// The author of that intent.
    pub author: AuthorId,
    /// Entity-level changes.
    pub changes: Vec<EntityChange>,
}

/// Everything the authority sends toward clients.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ServerMessage {
    /// Per-intent reply to the submitting author.
    Outcome(IntentOutcome),
    /// Committed-change broadcast to all members.
    Delta(VersionDelta),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn intent_serde_roundtrip() {
        let intent = EditIntent::new(
            AuthorId::new(),
            PlanVersion::from_raw(7),
            EditOp::MoveJoint {
                joint: JointId::new(),
                to: Point2::new(1.5, -2.0),
            },
        );
        let json = serde_json::to_string(&intent).unwrap();
        let back: EditIntent = serde_json::from_str(&json).unwrap();
        assert_eq!(back, intent);
    }

    #[test]
    fn outcome_serde_roundtrip() {
        let outcome = IntentOutcome {
            intent_id: IntentId::new(),
            author: AuthorId::new(),
            disposition: IntentDisposition::Rejected {
                reason: RejectReason::StaleVersion,
                current_version: PlanVersion::from_raw(9),
            },
        };
        let json = serde_json::to_string(&outcome).unwrap();
        let back: IntentOutcome = serde_json::from_str(&json).unwrap();
        assert_eq!(back, outcome);
    }
}
