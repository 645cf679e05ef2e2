//! Client-side session: speculative edits and reconciliation.

use std::sync::Arc;

use tracing::{debug, warn};

use plan_catalog::CatalogSource;
use plan_net::{
    EditIntent, EditOp, EntityChange, IntentDisposition, RejectReason, ServerMessage, VersionDelta,
};
use plan_openings::OpeningOps;
use plan_topology::ShellTopology;
use plan_types::{AuthorId, IntentId, Plan, PlanVersion};

use crate::apply::{apply_op, SessionConfig};
use crate::error::SessionResult;
use crate::state::IntentState;

/// One in-flight intent on the client.
#[derive(Debug, Clone)]
pub struct PendingIntent {
    /// The submitted intent.
    pub intent: EditIntent,
    /// Lifecycle state.
    pub state: IntentState,
    /// Submission time, session milliseconds.
    pub submitted_at_ms: u64,
}

/// What one reconciliation step did to the local replica.
#[derive(Debug, Clone, Default)]
pub struct ReconcileReport {
    /// Intents the authority confirmed.
    pub confirmed: Vec<IntentId>,
    /// Intents the authority rejected, with the reason.
    pub rejected: Vec<(IntentId, RejectReason)>,
    /// Pending intents dropped because they no longer apply cleanly after
    /// a resync. The caller decides whether to resubmit.
    pub dropped: Vec<IntentId>,
    /// Whether the visible replica changed beyond confirming our own
    /// speculation (i.e. a rollback or a foreign edit landed).
    pub replica_changed: bool,
}

impl ReconcileReport {
    fn merge(&mut self, other: Self) {
        self.confirmed.extend(other.confirmed);
        self.rejected.extend(other.rejected);
        self.dropped.extend(other.dropped);
        self.replica_changed |= other.replica_changed;
    }
}

/// A session member's local, predictive view of the plan.
///
/// Edits apply speculatively to the replica without waiting for the
/// authority; the intent to send comes back to the caller, which owns the
/// transport. Incoming outcomes and deltas reconcile the replica: the base
/// plan follows the authoritative deltas, and remaining speculative edits
/// are re-applied on top, dropping whatever no longer fits.
pub struct ClientSession {
    author: AuthorId,
    base: Plan,
    replica: Plan,
    topology: ShellTopology,
    openings: OpeningOps,
    catalog: Arc<dyn CatalogSource + Send + Sync>,
    config: SessionConfig,
    pending: Vec<PendingIntent>,
}

impl ClientSession {
    /// Join a session from an authoritative plan snapshot.
    #[must_use]
    pub fn new(
        base: Plan,
        author: AuthorId,
        catalog: Arc<dyn CatalogSource + Send + Sync>,
        config: SessionConfig,
    ) -> Self {
        let replica = base.clone();
        let mut topology = ShellTopology::new(config.topology);
        topology.rebuild(&replica);
        Self {
            author,
            base,
            replica,
            topology,
            openings: OpeningOps::new(config.openings),
            catalog,
            config,
            pending: Vec::new(),
        }
    }

    /// This member's author id.
    #[must_use]
    pub fn author(&self) -> AuthorId {
        self.author
    }

    /// The speculative local view: authoritative base plus in-flight
    /// edits. This is what the UI renders.
    #[must_use]
    pub fn plan(&self) -> &Plan {
        &self.replica
    }

    /// The last authoritative version this replica has seen.
    #[must_use]
    pub fn base_version(&self) -> PlanVersion {
        self.base.version
    }

    /// The in-flight intents.
    #[must_use]
    pub fn pending(&self) -> &[PendingIntent] {
        &self.pending
    }

    /// Apply an edit speculatively and produce the intent to send.
    ///
    /// The op runs against the local replica first; a local validation
    /// failure returns the error and sends nothing. On success the caller
    /// must forward the returned intent to the authority, while the user
    /// already sees the edit locally.
    ///
    /// # Errors
    ///
    /// Whatever the op's validation reports. The replica is unchanged on
    /// error.
    pub fn submit(&mut self, op: EditOp, now_ms: u64) -> SessionResult<EditIntent> {
        apply_op(
            &mut self.replica,
            &mut self.topology,
            &self.openings,
            self.catalog.as_ref(),
            &op,
        )?;

        // Predict the version our intent will land on: the base version
        // advanced by our own in-flight edits. Interleaved foreign edits
        // surface as a stale rejection and a resync.
        let based_on = PlanVersion::from_raw(self.base.version.get() + self.pending.len() as u64);
        self.replica.version = based_on.next();

        let intent = EditIntent::new(self.author, based_on, op);
        debug!(intent = %intent.intent_id, based_on = %based_on, "speculative edit applied");
        self.pending.push(PendingIntent {
            intent: intent.clone(),
            state: IntentState::PendingApply,
            submitted_at_ms: now_ms,
        });
        Ok(intent)
    }

    /// Feed one authority message into reconciliation.
    pub fn on_message(&mut self, message: &ServerMessage) -> ReconcileReport {
        match message {
            ServerMessage::Outcome(outcome) => match &outcome.disposition {
                IntentDisposition::Applied { .. } => {
                    // The delta carrying this intent does the real work;
                    // the outcome alone just settles the state early.
                    if let Some(pending) = self
                        .pending
                        .iter_mut()
                        .find(|p| p.intent.intent_id == outcome.intent_id)
                    {
                        pending.state = IntentState::Applied;
                    }
                    ReconcileReport::default()
                }
                IntentDisposition::Rejected { reason, .. } => {
                    let mut report = ReconcileReport::default();
                    if self.take_pending(outcome.intent_id).is_some() {
                        report.rejected.push((outcome.intent_id, reason.clone()));
                        report.merge(self.rebuild_replica());
                    }
                    report
                }
            },
            ServerMessage::Delta(delta) => self.on_delta(delta),
        }
    }

    /// Treat intents older than the configured timeout as locally
    /// rejected. Resubmission is the caller's decision; there is no
    /// implicit retry.
    pub fn expire(&mut self, now_ms: u64) -> Vec<IntentId> {
        let timeout = self.config.intent_timeout_ms;
        let expired: Vec<IntentId> = self
            .pending
            .iter()
            .filter(|p| now_ms.saturating_sub(p.submitted_at_ms) >= timeout)
            .map(|p| p.intent.intent_id)
            .collect();
        if !expired.is_empty() {
            warn!(count = expired.len(), "intents timed out locally");
            self.pending
                .retain(|p| !expired.contains(&p.intent.intent_id));
            self.rebuild_replica();
        }
        expired
    }

    fn on_delta(&mut self, delta: &VersionDelta) -> ReconcileReport {
        if delta.version.get() != self.base.version.get() + 1 {
            // The channel contract is reliable-ordered delivery; a gap
            // means the transport broke that contract.
            warn!(
                delta = %delta.version,
                base = %self.base.version,
                "non-consecutive delta applied"
            );
        }

        apply_delta(&mut self.base, delta);

        let mut report = ReconcileReport::default();
        if self.take_pending(delta.source_intent).is_some() {
            report.confirmed.push(delta.source_intent);
        }
        report.merge(self.rebuild_replica());
        report
    }

    /// Rebuild the speculative replica: authoritative base plus surviving
    /// pending edits, dropping those that no longer apply.
    fn rebuild_replica(&mut self) -> ReconcileReport {
        let before = std::mem::replace(&mut self.replica, self.base.clone());
        self.topology.rebuild(&self.replica);

        let mut report = ReconcileReport::default();
        let pending = std::mem::take(&mut self.pending);
        for mut entry in pending {
            let applied = apply_op(
                &mut self.replica,
                &mut self.topology,
                &self.openings,
                self.catalog.as_ref(),
                &entry.intent.op,
            );
            match applied {
                Ok(_) => {
                    entry.state = IntentState::PendingApply;
                    self.pending.push(entry);
                }
                Err(err) => {
                    debug!(
                        intent = %entry.intent.intent_id,
                        error = %err,
                        "speculative edit dropped after resync"
                    );
                    report.dropped.push(entry.intent.intent_id);
                }
            }
        }
        self.replica.version =
            PlanVersion::from_raw(self.base.version.get() + self.pending.len() as u64);

        report.replica_changed = self.replica != before;
        report
    }

    fn take_pending(&mut self, intent_id: IntentId) -> Option<PendingIntent> {
        let index = self
            .pending
            .iter()
            .position(|p| p.intent.intent_id == intent_id)?;
        Some(self.pending.remove(index))
    }
}

/// Apply an authoritative delta to the base plan.
fn apply_delta(base: &mut Plan, delta: &VersionDelta) {
    for change in &delta.changes {
        match change {
            EntityChange::ShellUpserted { shell } => {
                if let Some(existing) = base.shell_mut(shell.id) {
                    *existing = shell.clone();
                } else {
                    base.shells.push(shell.clone());
                }
            }
            EntityChange::ShellRemoved { shell } => {
                base.shells.retain(|s| s.id != *shell);
            }
            EntityChange::RunUpserted { run } => {
                if let Some(existing) = base.run_mut(run.id) {
                    *existing = run.clone();
                } else {
                    base.runs.push(run.clone());
                }
            }
            EntityChange::RunRemoved { run } => {
                base.runs.retain(|r| r.id != *run);
            }
        }
    }
    base.version = delta.version;
}

impl std::fmt::Debug for ClientSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientSession")
            .field("author", &self.author)
            .field("base_version", &self.base.version)
            .field("pending", &self.pending.len())
            .finish_non_exhaustive()
    }
}
