//! Core domain types and port definitions for parley.
//!
//! parley decides, for every speech-recognition event in a conversational
//! session, whether it is noise, a continuation of what the user is already
//! saying, or a genuine interruption that must silence the agent and open a
//! new user turn. This crate holds the vocabulary shared by the arbiter and
//! its adapters:
//!
//! - [`domain`]: utterances, tokens, verdicts, decisions, output state
//! - [`settings`]: the configuration surface and its validation
//! - [`ports`]: traits for the speech-output and dialogue collaborators
//! - [`events`]: observer events published by a running session

#![deny(unused_crate_dependencies)]

pub mod domain;
pub mod events;
pub mod ports;
pub mod settings;

// Re-export commonly used types for convenience
pub use domain::{
    DEFAULT_CONFIDENCE, Decision, DiscardReason, EmptyReason, OutputState, Token, TokenClass,
    UserTurn, Utterance, Verdict,
};
pub use events::ArbiterEvent;
pub use ports::{
    ChannelDialogue, DialogueSink, DispatchError, NoopSpeechOutput, OutputError, SpeechOutput,
};
pub use settings::{
    ArbiterConfig, ArbiterSettings, ArbiterSettingsUpdate, DEFAULT_FILLER_WORDS,
    DEFAULT_MIN_CONFIDENCE, DEFAULT_MIN_MEANINGFUL_TOKENS, DEFAULT_NOISE_TOKEN_CLASSES,
    DEFAULT_PAUSE_WINDOW_SECONDS, DEFAULT_SESSION_QUEUE_CAPACITY, DEFAULT_WAKE_PHRASES,
    SettingsError, validate_settings,
};
