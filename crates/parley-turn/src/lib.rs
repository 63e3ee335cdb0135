//! Turn arbitration for spoken-dialogue agents.
//!
//! Given a stream of speech-recognition events and the agent's speech-output
//! state, decide for each event whether to drop it, let the user keep
//! talking, or stop the agent and hand the floor to the user.
//!
//! - [`registry`]: who is speaking (source id → participant identity)
//! - [`classifier`]: meaningful vs. filler vs. noise
//! - [`tracker`]: idle / speaking / interrupted output state
//! - [`arbiter`]: the decision state machine
//! - [`session`]: one arbiter on its own task with an ordered queue

#![deny(unused_crate_dependencies)]

// Dev-dependencies exercised only by the integration tests
#[cfg(test)]
use mockall as _;
#[cfg(test)]
use tokio_test as _;

pub mod arbiter;
pub mod classifier;
pub mod error;
pub mod registry;
pub mod session;
pub mod tracker;

// Re-export key types for convenience
pub use arbiter::{TurnArbiter, TurnContext};
pub use classifier::TokenClassifier;
pub use error::SessionError;
pub use registry::SpeakerRegistry;
pub use session::{ArbiterSession, SessionHandle, SessionStats, UtteranceSubmitter};
pub use tracker::{OutputCounters, OutputTracker};
