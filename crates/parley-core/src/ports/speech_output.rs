//! Speech output port - the synthesis pipeline as seen by the arbiter.

use thiserror::Error;

/// Errors reported by a [`SpeechOutput`] when asked to stop.
///
/// The arbiter logs these and carries on; a failed stop never blocks a user
/// turn from being dispatched.
#[derive(Debug, Error)]
pub enum OutputError {
    /// The output pipeline is gone (device lost, pipeline torn down).
    #[error("Speech output unavailable: {0}")]
    Unavailable(String),

    /// The stop command was issued but the pipeline reported a fault.
    #[error("Failed to stop speech output: {0}")]
    StopFailed(String),
}

/// Synthesized-speech output pipeline.
///
/// Implementations own the actual audio sink. The pipeline is also expected
/// to report its lifecycle through an `OutputTracker` (`notify_started`,
/// `notify_completed`, `notify_interrupted`) as it streams replies.
pub trait SpeechOutput: Send + Sync {
    /// Issue a stop command for whatever is currently playing.
    ///
    /// Must return promptly (flushing may continue in the background) and
    /// must be safe to call when nothing is playing.
    fn stop_output(&self) -> Result<(), OutputError>;
}

/// A speech output that has nothing to stop.
///
/// Useful for tests and for text-only sessions without a synthesis pipeline.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopSpeechOutput;

impl NoopSpeechOutput {
    pub const fn new() -> Self {
        Self
    }
}

impl SpeechOutput for NoopSpeechOutput {
    fn stop_output(&self) -> Result<(), OutputError> {
        Ok(())
    }
}
