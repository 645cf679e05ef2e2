//! End-to-end session behavior: the rectangle scenario, optimistic
//! concurrency, idempotency, reconciliation, and mesh publish gating.

use std::sync::Arc;

use plan_catalog::{CatalogDefinition, HostKind, StaticCatalog};
use plan_mesh::{compute_segment_mesh, validate_patch, MeshConfig};
use plan_net::{
    AuthorityChannel, ClientChannel, EditIntent, EditOp, IntentDisposition, RejectReason,
    ServerMessage,
};
use plan_session::{ClientSession, PlanAuthority, SessionConfig};
use plan_topology::SegmentEnd;
use plan_types::{
    AuthorId, CatalogId, OpeningId, Plan, PlanVersion, Point2, Run, RunPath, SegmentId, Shell,
    ShellId, SpacingPolicy, WallSegment,
};

fn catalog() -> Arc<StaticCatalog> {
    Arc::new(StaticCatalog::from_definitions(vec![
        CatalogDefinition::new("door", 1.0, 2.1).with_host(HostKind::Wall),
        CatalogDefinition::new("window", 1.2, 1.2).with_host(HostKind::Wall),
    ]))
}

fn authority_with_empty_plan() -> PlanAuthority {
    PlanAuthority::new(Plan::new(), catalog(), SessionConfig::default())
}

/// Drive an authority through intents from one author, panicking on
/// rejection. Returns the version after the last apply.
fn apply_all(authority: &mut PlanAuthority, author: AuthorId, ops: Vec<EditOp>) -> PlanVersion {
    let mut version = authority.version();
    for op in ops {
        let intent = EditIntent::new(author, version, op);
        let outcome = authority.submit(&intent);
        match outcome.disposition {
            IntentDisposition::Applied { version: v } => version = v,
            IntentDisposition::Rejected { reason, .. } => {
                panic!("setup intent rejected: {reason:?}")
            }
        }
    }
    version
}

/// The 5 m / 3 m rectangular loop from four chained segments.
fn rectangle_ops(shell: &Shell) -> Vec<EditOp> {
    let corners = [
        Point2::new(0.0, 0.0),
        Point2::new(5.0, 0.0),
        Point2::new(5.0, 3.0),
        Point2::new(0.0, 3.0),
        Point2::new(0.0, 0.0),
    ];
    let shell_id = shell.id;
    let mut ops = vec![EditOp::AddShell {
        shell: shell.clone(),
    }];
    for window in corners.windows(2) {
        ops.push(EditOp::AddSegment {
            shell: shell_id,
            segment: WallSegment::new(window[0], window[1], 0.2, 2.7),
        });
    }
    ops
}

fn setup_rectangle() -> (PlanAuthority, AuthorId, ShellId, SegmentId, PlanVersion) {
    let mut authority = authority_with_empty_plan();
    let author = AuthorId::new();
    authority.subscribe(author);

    let shell = Shell::new_open();
    let shell_id = shell.id;
    let version = apply_all(&mut authority, author, rectangle_ops(&shell));

    let first_segment = authority
        .plan()
        .shell(shell_id)
        .expect("shell")
        .segments[0]
        .id;
    (authority, author, shell_id, first_segment, version)
}

#[test]
fn rectangle_scenario_door_overlap_and_orphan() {
    let (mut authority, author, shell_id, bottom_wall, version) = setup_rectangle();
    assert!(authority.plan().shell(shell_id).expect("shell").closed);

    // A 1 m door at offset 2 m on the 5 m wall succeeds.
    let door = OpeningId::new();
    let outcome = authority.submit(&EditIntent::new(
        author,
        version,
        EditOp::PlaceOpening {
            opening: door,
            segment: bottom_wall,
            def: CatalogId::new("door"),
            offset: 2.0,
            sill: 0.0,
        },
    ));
    let version = match outcome.disposition {
        IntentDisposition::Applied { version } => version,
        IntentDisposition::Rejected { reason, .. } => panic!("door rejected: {reason:?}"),
    };

    // A second 1 m door at offset 2.4 m violates clearance.
    let outcome = authority.submit(&EditIntent::new(
        author,
        version,
        EditOp::PlaceOpening {
            opening: OpeningId::new(),
            segment: bottom_wall,
            def: CatalogId::new("door"),
            offset: 2.4,
            sill: 0.0,
        },
    ));
    match outcome.disposition {
        IntentDisposition::Rejected {
            reason: RejectReason::Validation { .. },
            current_version,
        } => assert_eq!(current_version, version),
        other => panic!("expected validation rejection, got {other:?}"),
    }

    // Shrinking the wall to 2.5 m orphans the door instead of deleting it.
    let joint = authority
        .topology()
        .joint_of_end(bottom_wall, SegmentEnd::End)
        .map(|j| j.id)
        .expect("corner joint");
    let outcome = authority.submit(&EditIntent::new(
        author,
        version,
        EditOp::MoveJoint {
            joint,
            to: Point2::new(2.5, 0.0),
        },
    ));
    assert!(matches!(
        outcome.disposition,
        IntentDisposition::Applied { .. }
    ));

    let (_, segment) = authority.plan().segment(bottom_wall).expect("segment");
    assert_eq!(segment.openings.len(), 1);
    assert!(segment.openings[0].orphaned);
    assert_eq!(segment.active_openings().count(), 0);
}

#[test]
fn concurrent_intents_exactly_one_applies() {
    let (mut authority, author_a, _, bottom_wall, version) = setup_rectangle();
    let author_b = AuthorId::new();
    authority.subscribe(author_b);

    // Both authors target the same wall against the same version.
    let intent_a = EditIntent::new(
        author_a,
        version,
        EditOp::ResizeSegment {
            segment: bottom_wall,
            thickness: 0.3,
            height: 2.7,
        },
    );
    let intent_b = EditIntent::new(
        author_b,
        version,
        EditOp::ResizeSegment {
            segment: bottom_wall,
            thickness: 0.15,
            height: 2.4,
        },
    );

    let first = authority.submit(&intent_a);
    let second = authority.submit(&intent_b);

    assert!(matches!(
        first.disposition,
        IntentDisposition::Applied { .. }
    ));
    match second.disposition {
        IntentDisposition::Rejected {
            reason: RejectReason::StaleVersion,
            current_version,
        } => assert_eq!(current_version, authority.version()),
        other => panic!("expected stale rejection, got {other:?}"),
    }

    // The loser resubmits against the new version and wins.
    let retry = EditIntent::new(author_b, authority.version(), intent_b.op.clone());
    assert!(matches!(
        authority.submit(&retry).disposition,
        IntentDisposition::Applied { .. }
    ));
}

#[test]
fn duplicate_intent_is_a_no_op() {
    let (mut authority, author, _, bottom_wall, version) = setup_rectangle();

    let intent = EditIntent::new(
        author,
        version,
        EditOp::PlaceOpening {
            opening: OpeningId::new(),
            segment: bottom_wall,
            def: CatalogId::new("window"),
            offset: 1.0,
            sill: 0.9,
        },
    );

    let first = authority.submit(&intent);
    let version_after = authority.version();
    let state_after = authority.plan().clone();

    // Late duplicate delivery: same idempotency id.
    let replay = authority.submit(&intent);

    assert_eq!(replay.disposition, first.disposition);
    assert_eq!(authority.version(), version_after);
    assert_eq!(authority.plan(), &state_after);
}

#[test]
fn deltas_reach_all_members_including_the_author() {
    let (mut authority, author, _, bottom_wall, version) = setup_rectangle();
    let other = AuthorId::new();
    authority.subscribe(other);

    // Drain queues from setup.
    while authority.poll_message(author).is_some() {}
    while authority.poll_message(other).is_some() {}

    authority.submit(&EditIntent::new(
        author,
        version,
        EditOp::ResizeSegment {
            segment: bottom_wall,
            thickness: 0.25,
            height: 2.7,
        },
    ));

    let to_author: Vec<ServerMessage> =
        std::iter::from_fn(|| authority.poll_message(author)).collect();
    let to_other: Vec<ServerMessage> =
        std::iter::from_fn(|| authority.poll_message(other)).collect();

    // The author gets the delta and its outcome; the other member just
    // the delta.
    assert!(to_author
        .iter()
        .any(|m| matches!(m, ServerMessage::Delta(_))));
    assert!(to_author
        .iter()
        .any(|m| matches!(m, ServerMessage::Outcome(_))));
    assert_eq!(to_other.len(), 1);
    assert!(matches!(to_other[0], ServerMessage::Delta(_)));
}

#[test]
fn client_prediction_and_reconciliation_converge() {
    let (mut authority, _, _, bottom_wall, _) = setup_rectangle();

    let author = AuthorId::new();
    authority.subscribe(author);
    let mut client = ClientSession::new(
        authority.plan().clone(),
        author,
        catalog(),
        SessionConfig::default(),
    );

    // Speculative edit shows up immediately on the replica.
    let intent = client
        .submit(
            EditOp::PlaceOpening {
                opening: OpeningId::new(),
                segment: bottom_wall,
                def: CatalogId::new("door"),
                offset: 0.5,
                sill: 0.0,
            },
            1_000,
        )
        .expect("speculative apply");
    let (_, replica_wall) = client.plan().segment(bottom_wall).expect("segment");
    assert_eq!(replica_wall.openings.len(), 1);

    // Round trip through the authority.
    authority.submit(&intent);
    let mut confirmed = false;
    while let Some(message) = authority.poll_message(author) {
        let report = client.on_message(&message);
        confirmed |= !report.confirmed.is_empty();
    }

    assert!(confirmed);
    assert!(client.pending().is_empty());
    assert_eq!(client.plan(), authority.plan());
    assert_eq!(client.base_version(), authority.version());
}

#[test]
fn rejected_speculation_rolls_back() {
    let (mut authority, _, _, bottom_wall, _) = setup_rectangle();

    let alice = AuthorId::new();
    let bob = AuthorId::new();
    authority.subscribe(alice);
    authority.subscribe(bob);

    let mut alice_session = ClientSession::new(
        authority.plan().clone(),
        alice,
        catalog(),
        SessionConfig::default(),
    );
    let mut bob_session = ClientSession::new(
        authority.plan().clone(),
        bob,
        catalog(),
        SessionConfig::default(),
    );

    // Both speculate against the same version.
    let alice_intent = alice_session
        .submit(
            EditOp::ResizeSegment {
                segment: bottom_wall,
                thickness: 0.3,
                height: 2.7,
            },
            0,
        )
        .expect("alice speculation");
    let bob_intent = bob_session
        .submit(
            EditOp::ResizeSegment {
                segment: bottom_wall,
                thickness: 0.1,
                height: 2.0,
            },
            0,
        )
        .expect("bob speculation");

    // Alice reaches the authority first.
    authority.submit(&alice_intent);
    authority.submit(&bob_intent);

    let mut bob_rejections = 0;
    while let Some(message) = authority.poll_message(bob) {
        let report = bob_session.on_message(&message);
        bob_rejections += report.rejected.len();
    }
    while let Some(message) = authority.poll_message(alice) {
        alice_session.on_message(&message);
    }

    // Bob's speculation was rolled back to the authoritative state.
    assert_eq!(bob_rejections, 1);
    assert!(bob_session.pending().is_empty());
    assert_eq!(bob_session.plan(), authority.plan());
    assert_eq!(alice_session.plan(), authority.plan());
    let (_, wall) = authority.plan().segment(bottom_wall).expect("segment");
    assert!((wall.thickness - 0.3).abs() < 1e-12);
}

#[test]
fn intents_flow_over_a_loopback_channel() {
    let (mut authority, _, _, bottom_wall, _) = setup_rectangle();
    let author = AuthorId::new();
    authority.subscribe(author);

    let (client_end, authority_end) = plan_net::loopback();
    let mut client = ClientSession::new(
        authority.plan().clone(),
        author,
        catalog(),
        SessionConfig::default(),
    );

    let intent = client
        .submit(
            EditOp::ResizeSegment {
                segment: bottom_wall,
                thickness: 0.22,
                height: 2.7,
            },
            0,
        )
        .expect("speculative apply");
    client_end.send_intent(intent).expect("send");

    // Authority-side pump: drain intents, push replies.
    while let Some(incoming) = authority_end.poll_intent() {
        authority.submit(&incoming);
    }
    while let Some(message) = authority.poll_message(author) {
        authority_end.push_message(message).expect("push");
    }

    // Client-side pump.
    while let Some(message) = client_end.poll_message() {
        client.on_message(&message);
    }

    assert_eq!(client.plan(), authority.plan());
}

#[test]
fn timed_out_intent_is_locally_rejected() {
    let (authority, _, _, bottom_wall, _) = setup_rectangle();
    let author = AuthorId::new();
    let mut client = ClientSession::new(
        authority.plan().clone(),
        author,
        catalog(),
        SessionConfig::default(),
    );

    let intent = client
        .submit(
            EditOp::ResizeSegment {
                segment: bottom_wall,
                thickness: 0.4,
                height: 2.7,
            },
            1_000,
        )
        .expect("speculative apply");

    // No reply ever arrives; past the timeout the edit is dropped locally.
    let expired = client.expire(1_000 + 6_000);
    assert_eq!(expired, vec![intent.intent_id]);
    assert!(client.pending().is_empty());
    let (_, wall) = client.plan().segment(bottom_wall).expect("segment");
    assert!((wall.thickness - 0.2).abs() < 1e-12);
}

#[test]
fn orphaned_run_is_deleted_with_its_shell() {
    let (mut authority, author, shell_id, _, version) = setup_rectangle();

    let run = Run::new(
        CatalogId::new("window"),
        RunPath::Shell(shell_id),
        SpacingPolicy::FixedSpacing {
            spacing: 1.0,
            absorb_remainder: false,
        },
    );
    let run_id = run.id;
    let outcome = authority.submit(&EditIntent::new(
        author,
        version,
        EditOp::AddRun { run },
    ));
    let version = match outcome.disposition {
        IntentDisposition::Applied { version } => version,
        other => panic!("run rejected: {other:?}"),
    };
    assert!(authority.resolve_run(run_id).is_ok());

    let outcome = authority.submit(&EditIntent::new(
        author,
        version,
        EditOp::RemoveShell { shell: shell_id },
    ));
    assert!(matches!(
        outcome.disposition,
        IntentDisposition::Applied { .. }
    ));
    assert!(authority.plan().run(run_id).is_none());
    assert!(authority.resolve_run(run_id).is_err());
}

#[test]
fn mesh_publishing_discards_stale_patches() {
    let (mut authority, author, _, bottom_wall, version) = setup_rectangle();

    // Compute a patch from the current state, then change the wall while
    // the patch is "in flight".
    let (_, segment) = authority.plan().segment(bottom_wall).expect("segment");
    let stale_patch =
        compute_segment_mesh(segment, &MeshConfig::default()).expect("mesh");

    authority.submit(&EditIntent::new(
        author,
        version,
        EditOp::ResizeSegment {
            segment: bottom_wall,
            thickness: 0.35,
            height: 2.7,
        },
    ));

    assert!(!authority.try_publish(stale_patch));
    assert!(authority.mesh_patch(bottom_wall).is_none());

    // A fresh pass regenerates and publishes everything dirty.
    let outcome = authority.regenerate_meshes();
    assert!(outcome.failures.is_empty());
    assert!(outcome.published.iter().any(|p| p.segment == bottom_wall));
    let published = authority.mesh_patch(bottom_wall).expect("patch");
    assert_eq!(published.version, authority.version());
    assert!(validate_patch(published).is_valid());
}

#[test]
fn plan_persistence_roundtrip_through_a_session() {
    let (mut authority, author, _, bottom_wall, version) = setup_rectangle();
    authority.submit(&EditIntent::new(
        author,
        version,
        EditOp::PlaceOpening {
            opening: OpeningId::new(),
            segment: bottom_wall,
            def: CatalogId::new("window"),
            offset: 3.2,
            sill: 0.9,
        },
    ));

    let json = authority.plan().to_json().expect("serialize");
    let restored = Plan::from_json(&json).expect("deserialize");
    assert_eq!(&restored, authority.plan());

    // A new authority over the restored plan carries on at the same
    // version.
    let resumed = PlanAuthority::new(restored, catalog(), SessionConfig::default());
    assert_eq!(resumed.version(), authority.version());
}
