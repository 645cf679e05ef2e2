//! Channel seam and in-memory loopback implementation.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use thiserror::Error;

use crate::messages::{EditIntent, ServerMessage};

/// Errors from channel operations.
#[derive(Debug, Error)]
pub enum NetError {
    /// The other end of the channel is gone.
    #[error("channel disconnected")]
    Disconnected,
}

/// Result type for channel operations.
pub type NetResult<T> = Result<T, NetError>;

/// The client-facing side of a per-plan channel.
///
/// Delivery must be reliable and ordered: version deltas arrive in version
/// order, outcomes in submission order.
pub trait ClientChannel {
    /// Send an intent toward the authority.
    ///
    /// # Errors
    ///
    /// [`NetError::Disconnected`] when the authority end is gone.
    fn send_intent(&self, intent: EditIntent) -> NetResult<()>;

    /// Take the next pending message from the authority, if any.
    fn poll_message(&self) -> Option<ServerMessage>;
}

/// The authority-facing side of a per-plan channel.
pub trait AuthorityChannel {
    /// Take the next pending intent, if any.
    fn poll_intent(&self) -> Option<EditIntent>;

    /// Push a message toward this channel's client.
    ///
    /// # Errors
    ///
    /// [`NetError::Disconnected`] when the client end is gone.
    fn push_message(&self, message: ServerMessage) -> NetResult<()>;
}

#[derive(Debug, Default)]
struct Queues {
    to_authority: VecDeque<EditIntent>,
    to_client: VecDeque<ServerMessage>,
}

/// In-memory reliable-ordered channel for embedded sessions and tests.
///
/// Both halves of [`loopback`] share the same FIFO queues, so ordering is
/// trivially preserved. Cloning a half is cheap and shares the queues.
#[derive(Debug, Clone, Default)]
pub struct LoopbackChannel {
    queues: Arc<Mutex<Queues>>,
}

impl LoopbackChannel {
    /// Number of intents waiting at the authority end.
    #[must_use]
    pub fn pending_intents(&self) -> usize {
        self.queues.lock().map(|q| q.to_authority.len()).unwrap_or(0)
    }

    /// Number of messages waiting at the client end.
    #[must_use]
    pub fn pending_messages(&self) -> usize {
        self.queues.lock().map(|q| q.to_client.len()).unwrap_or(0)
    }
}

impl ClientChannel for LoopbackChannel {
    fn send_intent(&self, intent: EditIntent) -> NetResult<()> {
        let mut queues = self.queues.lock().map_err(|_| NetError::Disconnected)?;
        queues.to_authority.push_back(intent);
        Ok(())
    }

    fn poll_message(&self) -> Option<ServerMessage> {
        self.queues.lock().ok()?.to_client.pop_front()
    }
}

impl AuthorityChannel for LoopbackChannel {
    fn poll_intent(&self) -> Option<EditIntent> {
        self.queues.lock().ok()?.to_authority.pop_front()
    }

    fn push_message(&self, message: ServerMessage) -> NetResult<()> {
        let mut queues = self.queues.lock().map_err(|_| NetError::Disconnected)?;
        queues.to_client.push_back(message);
        Ok(())
    }
}

/// Create a connected loopback pair: the same channel viewed from both
/// sides.
#[must_use]
pub fn loopback() -> (LoopbackChannel, LoopbackChannel) {
    let channel = LoopbackChannel::default();
    (channel.clone(), channel)
}
