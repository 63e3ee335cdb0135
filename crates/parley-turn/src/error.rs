//! Session error types.

/// Errors surfaced by an [`ArbiterSession`](crate::session::ArbiterSession) handle.
///
/// Arbitration itself never fails; these only describe the plumbing around it.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// The session task has stopped and accepts no more utterances.
    #[error("Arbiter session is closed")]
    Closed,

    /// The session queue is full (only returned by `try_submit`).
    #[error("Arbiter session queue is full")]
    Busy,

    /// The session task panicked or was aborted.
    #[error("Arbiter session task failed: {0}")]
    TaskFailed(String),
}
