//! Dialogue port - where accepted user turns go.

use thiserror::Error;
use tokio::sync::mpsc;

use crate::domain::UserTurn;

/// Errors returned by a [`DialogueSink`].
#[derive(Debug, Error)]
pub enum DispatchError {
    /// The consumer has shut down and will never read the turn.
    #[error("Dialogue consumer is closed")]
    ConsumerClosed,

    /// The consumer refused the turn.
    #[error("Dialogue consumer rejected the turn: {0}")]
    Rejected(String),
}

/// Consumer of dispatched user turns (the dialogue/LLM layer).
///
/// `dispatch` hands the turn over and returns; it must not wait for the
/// consumer to produce a reply.
pub trait DialogueSink: Send + Sync {
    fn dispatch(&self, turn: UserTurn) -> Result<(), DispatchError>;
}

/// Dialogue sink backed by an unbounded tokio channel.
///
/// The receiving half is handed to whatever task generates replies.
#[derive(Debug, Clone)]
pub struct ChannelDialogue {
    tx: mpsc::UnboundedSender<UserTurn>,
}

impl ChannelDialogue {
    /// Create the sink and the receiver the dialogue task reads from.
    #[must_use]
    pub fn new() -> (Self, mpsc::UnboundedReceiver<UserTurn>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }
}

impl DialogueSink for ChannelDialogue {
    fn dispatch(&self, turn: UserTurn) -> Result<(), DispatchError> {
        self.tx.send(turn).map_err(|_| DispatchError::ConsumerClosed)
    }
}
