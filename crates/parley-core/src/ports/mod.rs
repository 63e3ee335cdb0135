//! Port definitions (trait abstractions) for the arbiter's collaborators.
//!
//! # Design Rules
//!
//! - Ports are synchronous and must not block: the arbiter issues a command
//!   and moves on to the next utterance.
//! - Only domain types cross the boundary; no audio or transport types.

pub mod dialogue;
pub mod speech_output;

pub use dialogue::{ChannelDialogue, DialogueSink, DispatchError};
pub use speech_output::{NoopSpeechOutput, OutputError, SpeechOutput};
