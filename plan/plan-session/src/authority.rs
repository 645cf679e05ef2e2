//! The authoritative session instance.

use std::collections::VecDeque;
use std::sync::Arc;

use hashbrown::HashMap;
use tracing::{debug, error, info, warn};

use plan_catalog::CatalogSource;
use plan_mesh::{compute_patches, segment_content_hash, MeshError, MeshPatch};
use plan_net::{
    EditIntent, EntityChange, IntentDisposition, IntentOutcome, ServerMessage, VersionDelta,
};
use plan_openings::OpeningOps;
use plan_runs::{resolve_for_plan, PlacedInstance};
use plan_topology::ShellTopology;
use plan_types::{AuthorId, EntityRef, IntentId, Plan, RunId, SegmentId};

use crate::apply::{apply_op, ApplyEffect, SessionConfig};
use crate::error::SessionResult;
use crate::locks::{EditingTag, LockTable};

/// Result of one mesh regeneration pass.
#[derive(Debug, Default)]
pub struct RegenerateOutcome {
    /// Patches whose content hash still matched at publish time. Stamped
    /// with the plan version they were published under.
    pub published: Vec<MeshPatch>,
    /// Patches discarded because their inputs changed while they were in
    /// flight. Harmless; the segment stays dirty and regenerates next
    /// pass.
    pub discarded: usize,
    /// Kernel failures. Invariant violations land here and are logged as
    /// errors; they indicate a validation bug, not bad user input.
    pub failures: Vec<MeshError>,
}

/// The single authoritative instance for one plan.
///
/// All validating mutation is serialized through [`submit`](Self::submit):
/// intents are checked against the current plan version (optimistic
/// concurrency), applied all-or-nothing, and answered with an
/// [`IntentOutcome`]. Committed changes go to every subscriber's delta
/// queue, the author's included.
///
/// The authority may live embedded in a host process or behind a network
/// channel; it never touches a transport itself.
pub struct PlanAuthority {
    plan: Plan,
    topology: ShellTopology,
    openings: OpeningOps,
    catalog: Arc<dyn CatalogSource + Send + Sync>,
    config: SessionConfig,
    ledger: HashMap<IntentId, IntentDisposition>,
    locks: LockTable,
    mesh_cache: HashMap<SegmentId, MeshPatch>,
    dirty: Vec<SegmentId>,
    subscribers: HashMap<AuthorId, VecDeque<ServerMessage>>,
}

impl PlanAuthority {
    /// Take authority over a plan.
    ///
    /// Every existing segment starts dirty so the first
    /// [`regenerate_meshes`](Self::regenerate_meshes) pass produces the
    /// full set of patches.
    #[must_use]
    pub fn new(
        plan: Plan,
        catalog: Arc<dyn CatalogSource + Send + Sync>,
        config: SessionConfig,
    ) -> Self {
        let mut topology = ShellTopology::new(config.topology);
        topology.rebuild(&plan);
        let dirty: Vec<SegmentId> = plan.segments().map(|s| s.id).collect();
        info!(plan = %plan.id, version = %plan.version, segments = dirty.len(), "authority started");
        Self {
            plan,
            topology,
            openings: OpeningOps::new(config.openings),
            catalog,
            config,
            ledger: HashMap::new(),
            locks: LockTable::new(),
            mesh_cache: HashMap::new(),
            dirty,
            subscribers: HashMap::new(),
        }
    }

    /// The authoritative plan state.
    #[must_use]
    pub fn plan(&self) -> &Plan {
        &self.plan
    }

    /// The current plan version.
    #[must_use]
    pub fn version(&self) -> plan_types::PlanVersion {
        self.plan.version
    }

    /// The topology manager (joint lookups for tools).
    #[must_use]
    pub fn topology(&self) -> &ShellTopology {
        &self.topology
    }

    /// Register a session member. Deltas accumulate in a per-member queue
    /// until polled.
    pub fn subscribe(&mut self, author: AuthorId) {
        self.subscribers.entry(author).or_default();
    }

    /// Remove a member and its queue.
    pub fn unsubscribe(&mut self, author: AuthorId) {
        self.subscribers.remove(&author);
    }

    /// Take the next queued message for a member, if any.
    pub fn poll_message(&mut self, author: AuthorId) -> Option<ServerMessage> {
        self.subscribers.get_mut(&author)?.pop_front()
    }

    /// Validate and apply one intent.
    ///
    /// The outcome is also queued to the submitting author if subscribed;
    /// the returned value serves embedded (in-process) callers.
    pub fn submit(&mut self, intent: &EditIntent) -> IntentOutcome {
        // Idempotency: a duplicate or late-delivered resubmission returns
        // the recorded verdict and changes nothing.
        if let Some(disposition) = self.ledger.get(&intent.intent_id) {
            debug!(intent = %intent.intent_id, "duplicate intent, replaying recorded outcome");
            let outcome = IntentOutcome {
                intent_id: intent.intent_id,
                author: intent.author,
                disposition: disposition.clone(),
            };
            self.queue_outcome(&outcome);
            return outcome;
        }

        // Optimistic concurrency: the intent must have been issued against
        // the version we are still at.
        if intent.based_on != self.plan.version {
            warn!(
                intent = %intent.intent_id,
                based_on = %intent.based_on,
                current = %self.plan.version,
                "stale intent rejected"
            );
            return self.settle_rejection(intent, plan_net::RejectReason::StaleVersion);
        }

        let effect = match apply_op(
            &mut self.plan,
            &mut self.topology,
            &self.openings,
            self.catalog.as_ref(),
            &intent.op,
        ) {
            Ok(effect) => effect,
            Err(err) => {
                debug!(intent = %intent.intent_id, error = %err, "intent rejected");
                return self.settle_rejection(intent, err.reject_reason());
            }
        };

        self.plan.version = self.plan.version.next();
        let version = self.plan.version;
        debug!(intent = %intent.intent_id, version = %version, "intent applied");

        // Invalidated segments need remesh; entries for segments that no
        // longer exist are dropped from the cache.
        for segment in &effect.invalidated.segments {
            if self.plan.segment(*segment).is_some() && !self.dirty.contains(segment) {
                self.dirty.push(*segment);
            }
        }
        self.mesh_cache
            .retain(|segment, _| self.plan.segment(*segment).is_some());

        let delta = VersionDelta {
            version,
            source_intent: intent.intent_id,
            author: intent.author,
            changes: self.build_changes(&effect),
        };
        for queue in self.subscribers.values_mut() {
            queue.push_back(ServerMessage::Delta(delta.clone()));
        }

        let disposition = IntentDisposition::Applied { version };
        self.ledger.insert(intent.intent_id, disposition.clone());
        let outcome = IntentOutcome {
            intent_id: intent.intent_id,
            author: intent.author,
            disposition,
        };
        self.queue_outcome(&outcome);
        outcome
    }

    /// Regenerate meshes for every dirty segment, in parallel, publishing
    /// only patches whose inputs did not change while the computation was
    /// in flight.
    pub fn regenerate_meshes(&mut self) -> RegenerateOutcome {
        let dirty = std::mem::take(&mut self.dirty);
        if dirty.is_empty() {
            return RegenerateOutcome::default();
        }

        let results = compute_patches(&self.plan, &dirty, &self.config.mesh);

        let mut outcome = RegenerateOutcome::default();
        for (segment, result) in results {
            match result {
                Ok(patch) => {
                    if self.try_publish(patch) {
                        if let Some(published) = self.mesh_cache.get(&segment) {
                            outcome.published.push(published.clone());
                        }
                    } else {
                        outcome.discarded += 1;
                        // Inputs moved under the computation; remesh again.
                        if !self.dirty.contains(&segment) {
                            self.dirty.push(segment);
                        }
                    }
                }
                Err(err) => {
                    error!(segment = %segment, error = %err, "mesh generation failed");
                    outcome.failures.push(err);
                }
            }
        }
        outcome
    }

    /// Publish a patch if its content hash still matches the live segment.
    ///
    /// Returns `false`, dropping the patch, when the segment changed or
    /// disappeared while the patch was being computed. Never publishes out
    /// of order.
    pub fn try_publish(&mut self, mut patch: MeshPatch) -> bool {
        let Some((_, segment)) = self.plan.segment(patch.segment) else {
            return false;
        };
        if segment_content_hash(segment) != patch.content_hash {
            return false;
        }
        patch.version = self.plan.version;
        self.mesh_cache.insert(patch.segment, patch);
        true
    }

    /// The current published patch for a segment, if any.
    #[must_use]
    pub fn mesh_patch(&self, segment: SegmentId) -> Option<&MeshPatch> {
        self.mesh_cache.get(&segment)
    }

    /// Resolve a run's placed instances on demand.
    ///
    /// # Errors
    ///
    /// [`SessionError`](crate::SessionError) when the run is unknown or
    /// fails to resolve.
    pub fn resolve_run(&self, run: RunId) -> SessionResult<Vec<PlacedInstance>> {
        let run = self
            .plan
            .run(run)
            .ok_or_else(|| crate::SessionError::UnknownEntity(format!("run {run}")))?;
        Ok(resolve_for_plan(&self.plan, run)?)
    }

    /// Try to place an advisory `EditingBy` tag for an author.
    ///
    /// # Errors
    ///
    /// The blocking tag when another author holds the entity. Advisory
    /// only: submission never consults tags.
    pub fn try_lock(
        &mut self,
        entity: EntityRef,
        author: AuthorId,
        now_ms: u64,
    ) -> Result<(), EditingTag> {
        self.locks
            .try_tag(entity, author, now_ms, self.config.lock_ttl_ms)
    }

    /// Release an author's advisory tag.
    pub fn release_lock(&mut self, entity: EntityRef, author: AuthorId) {
        self.locks.release(entity, author);
    }

    /// The unexpired advisory tag on an entity, for UI highlighting.
    #[must_use]
    pub fn lock_holder(&self, entity: EntityRef, now_ms: u64) -> Option<EditingTag> {
        self.locks.holder(entity, now_ms)
    }

    fn settle_rejection(
        &mut self,
        intent: &EditIntent,
        reason: plan_net::RejectReason,
    ) -> IntentOutcome {
        let disposition = IntentDisposition::Rejected {
            reason,
            current_version: self.plan.version,
        };
        self.ledger.insert(intent.intent_id, disposition.clone());
        let outcome = IntentOutcome {
            intent_id: intent.intent_id,
            author: intent.author,
            disposition,
        };
        self.queue_outcome(&outcome);
        outcome
    }

    fn queue_outcome(&mut self, outcome: &IntentOutcome) {
        if let Some(queue) = self.subscribers.get_mut(&outcome.author) {
            queue.push_back(ServerMessage::Outcome(outcome.clone()));
        }
    }

    fn build_changes(&self, effect: &ApplyEffect) -> Vec<EntityChange> {
        let mut changes = Vec::new();
        let mut removed_emitted: Vec<plan_types::ShellId> = Vec::new();

        for shell_id in &effect.invalidated.shells {
            if let Some(shell) = self.plan.shell(*shell_id) {
                changes.push(EntityChange::ShellUpserted {
                    shell: shell.clone(),
                });
            } else if !removed_emitted.contains(shell_id) {
                removed_emitted.push(*shell_id);
                changes.push(EntityChange::ShellRemoved { shell: *shell_id });
            }
        }
        for shell_id in &effect.removed_shells {
            if !removed_emitted.contains(shell_id) {
                removed_emitted.push(*shell_id);
                changes.push(EntityChange::ShellRemoved { shell: *shell_id });
            }
        }
        for run_id in &effect.upserted_runs {
            if let Some(run) = self.plan.run(*run_id) {
                changes.push(EntityChange::RunUpserted { run: run.clone() });
            }
        }
        for run_id in &effect.removed_runs {
            changes.push(EntityChange::RunRemoved { run: *run_id });
        }
        changes
    }
}

impl std::fmt::Debug for PlanAuthority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PlanAuthority")
            .field("plan", &self.plan.id)
            .field("version", &self.plan.version)
            .field("subscribers", &self.subscribers.len())
            .field("dirty", &self.dirty.len())
            .finish_non_exhaustive()
    }
}
