//! Shared edit-op application.
//!
//! The authority and every client replica run edits through the same code
//! path, so a speculative local apply and the authoritative apply of the
//! same op against the same plan state produce the same result.

use plan_catalog::CatalogSource;
use plan_mesh::MeshConfig;
use plan_net::EditOp;
use plan_openings::{OpeningConfig, OpeningOps};
use plan_runs::resolve_for_plan;
use plan_topology::{Invalidated, ShellTopology, TopologyConfig};
use plan_types::{Plan, RunId, RunPath, ShellId};

use crate::error::{SessionError, SessionResult};

/// Session-wide tuning, shared by authority and clients.
#[derive(Debug, Clone, Copy)]
pub struct SessionConfig {
    /// Topology operation tuning.
    pub topology: TopologyConfig,
    /// Opening validation tuning.
    pub openings: OpeningConfig,
    /// Geometry kernel tuning.
    pub mesh: MeshConfig,
    /// Advisory `EditingBy` tag lifetime, milliseconds.
    pub lock_ttl_ms: u64,
    /// How long a client waits for an authority verdict before treating an
    /// intent as rejected locally, milliseconds.
    pub intent_timeout_ms: u64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            topology: TopologyConfig::default(),
            openings: OpeningConfig::default(),
            mesh: MeshConfig::default(),
            lock_ttl_ms: 15_000,
            intent_timeout_ms: 5_000,
        }
    }
}

/// What applying one op changed.
#[derive(Debug, Clone, Default)]
pub struct ApplyEffect {
    /// Entities needing remesh, corner recompute, or run re-resolution.
    pub invalidated: Invalidated,
    /// Shells removed by the op (including shells emptied by segment
    /// removal).
    pub removed_shells: Vec<ShellId>,
    /// Runs removed by the op, or deleted because their bound shell is
    /// gone.
    pub removed_runs: Vec<RunId>,
    /// Runs created or redefined by the op.
    pub upserted_runs: Vec<RunId>,
}

/// Apply one edit operation to a plan.
///
/// All-or-nothing: on `Err` the plan is unchanged. On success the plan has
/// mutated, openings on affected segments are revalidated (orphan flags
/// updated), and runs whose bound shell disappeared are deleted.
pub(crate) fn apply_op(
    plan: &mut Plan,
    topology: &mut ShellTopology,
    openings: &OpeningOps,
    catalog: &dyn CatalogSource,
    op: &EditOp,
) -> SessionResult<ApplyEffect> {
    let mut effect = ApplyEffect::default();

    match op {
        EditOp::AddShell { shell } => {
            if plan.shell(shell.id).is_some() {
                return Err(SessionError::DuplicateEntity(format!("shell {}", shell.id)));
            }
            effect.invalidated.push_shell(shell.id);
            plan.shells.push(shell.clone());
            topology.rebuild(plan);
        }
        EditOp::RemoveShell { shell } => {
            if plan.shell(*shell).is_none() {
                return Err(SessionError::UnknownEntity(format!("shell {shell}")));
            }
            plan.shells.retain(|s| s.id != *shell);
            topology.rebuild(plan);
            effect.removed_shells.push(*shell);
        }
        EditOp::AddSegment { shell, segment } => {
            if plan.segment(segment.id).is_some() {
                return Err(SessionError::DuplicateEntity(format!(
                    "segment {}",
                    segment.id
                )));
            }
            let invalidated = topology.add_segment(plan, *shell, segment.clone())?;
            effect.invalidated.merge(invalidated);
        }
        EditOp::SplitSegment { segment, at } => {
            let (_, invalidated) = topology.split_segment(plan, *segment, *at)?;
            effect.invalidated.merge(invalidated);
        }
        EditOp::MoveJoint { joint, to } => {
            let invalidated = topology.move_joint(plan, *joint, *to)?;
            for segment in &invalidated.segments {
                openings.revalidate_segment(plan, *segment)?;
            }
            effect.invalidated.merge(invalidated);
        }
        EditOp::RemoveSegment { segment } => {
            let owner = plan
                .shell_of_segment(*segment)
                .ok_or_else(|| SessionError::UnknownEntity(format!("segment {segment}")))?;
            let invalidated = topology.remove_segment(plan, *segment)?;
            effect.invalidated.merge(invalidated);
            if plan.shell(owner).is_none() {
                effect.removed_shells.push(owner);
            }
        }
        EditOp::ResizeSegment {
            segment,
            thickness,
            height,
        } => {
            let invalidated = topology.resize_segment(plan, *segment, *thickness, *height)?;
            openings.revalidate_segment(plan, *segment)?;
            effect.invalidated.merge(invalidated);
        }
        EditOp::PlaceOpening {
            opening,
            segment,
            def,
            offset,
            sill,
        } => {
            openings.place_as(plan, catalog, *segment, def, *offset, *sill, *opening)?;
            touch_host(plan, &mut effect, *segment)?;
        }
        EditOp::MoveOpening {
            opening,
            offset,
            sill,
        } => {
            openings.move_opening(plan, *opening, *offset, *sill)?;
            let host = host_of(plan, *opening)?;
            touch_host(plan, &mut effect, host)?;
        }
        EditOp::ResizeOpening {
            opening,
            width,
            height,
        } => {
            openings.resize(plan, *opening, *width, *height)?;
            let host = host_of(plan, *opening)?;
            touch_host(plan, &mut effect, host)?;
        }
        EditOp::RemoveOpening { opening } => {
            let host = host_of(plan, *opening)?;
            openings.remove(plan, *opening)?;
            touch_host(plan, &mut effect, host)?;
        }
        EditOp::AddRun { run } => {
            if plan.run(run.id).is_some() {
                return Err(SessionError::DuplicateEntity(format!("run {}", run.id)));
            }
            resolve_for_plan_or_reject(plan, run)?;
            plan.runs.push(run.clone());
            effect.upserted_runs.push(run.id);
        }
        EditOp::UpdateRun { run } => {
            if plan.run(run.id).is_none() {
                return Err(SessionError::UnknownEntity(format!("run {}", run.id)));
            }
            resolve_for_plan_or_reject(plan, run)?;
            if let Some(existing) = plan.run_mut(run.id) {
                *existing = run.clone();
            }
            effect.upserted_runs.push(run.id);
        }
        EditOp::RemoveRun { run } => {
            if plan.run(*run).is_none() {
                return Err(SessionError::UnknownEntity(format!("run {run}")));
            }
            plan.runs.retain(|r| r.id != *run);
            effect.removed_runs.push(*run);
        }
    }

    // Runs bound to a shell that no longer exists are orphaned; they are
    // deleted, not kept around half-alive.
    let dangling: Vec<RunId> = plan
        .runs
        .iter()
        .filter(|run| match &run.path {
            RunPath::Shell(shell) => plan.shell(*shell).is_none(),
            RunPath::Points(_) => false,
        })
        .map(|run| run.id)
        .collect();
    for run in dangling {
        plan.runs.retain(|r| r.id != run);
        effect.removed_runs.push(run);
    }

    Ok(effect)
}

/// Validate a run definition by resolving it once against the plan.
fn resolve_for_plan_or_reject(plan: &Plan, run: &plan_types::Run) -> SessionResult<()> {
    // The run is not in the plan yet; resolve against a binding lookup on
    // the current plan.
    resolve_for_plan(plan, run).map(|_| ()).map_err(Into::into)
}

fn host_of(plan: &Plan, opening: plan_types::OpeningId) -> SessionResult<plan_types::SegmentId> {
    plan.host_of_opening(opening)
        .map(|segment| segment.id)
        .ok_or_else(|| SessionError::UnknownEntity(format!("opening {opening}")))
}

/// Record an opening-level change as its host segment and shell.
fn touch_host(
    plan: &Plan,
    effect: &mut ApplyEffect,
    segment: plan_types::SegmentId,
) -> SessionResult<()> {
    let shell = plan
        .shell_of_segment(segment)
        .ok_or_else(|| SessionError::UnknownEntity(format!("segment {segment}")))?;
    effect.invalidated.push_segment(segment);
    effect.invalidated.push_shell(shell);
    Ok(())
}
