//! Edit session coordination for PlanForge.
//!
//! One [`PlanAuthority`] per plan performs every validating mutation,
//! serialized: intents arrive, are checked against the *current* plan
//! version (optimistic concurrency, not locking), and either commit, in
//! which case the version increments and a
//! [`VersionDelta`](plan_net::VersionDelta) goes to every subscriber, the
//! author included, or come back
//! [`Rejected`](plan_net::IntentDisposition::Rejected) with the current
//! version so the client can resync and resubmit.
//!
//! [`ClientSession`] is the other half: it applies edits speculatively
//! against a local replica without waiting for the round trip, and
//! reconciles when outcomes and deltas arrive, rolling back whatever the
//! authority refused.
//!
//! Everything is driven explicitly: time is a millisecond tick the host
//! passes in, messages are polled from queues, and mesh regeneration is a
//! method the host calls when it wants patches. No global state, no event
//! bus, no background threads besides rayon's fan-out inside
//! [`PlanAuthority::regenerate_meshes`].

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]

mod apply;
mod authority;
mod client;
mod error;
mod locks;
mod state;

pub use apply::{ApplyEffect, SessionConfig};
pub use authority::{PlanAuthority, RegenerateOutcome};
pub use client::{ClientSession, PendingIntent, ReconcileReport};
pub use error::{SessionError, SessionResult};
pub use locks::{EditingTag, LockTable};
pub use state::IntentState;
