//! Arbitration outcomes and the payload handed to the dialogue consumer.

use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::utterance::Token;
use super::verdict::EmptyReason;

/// A user turn forwarded to the dialogue layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserTurn {
    /// Resolved participant identity, if attribution succeeded.
    pub speaker: Option<String>,

    /// Working text (case-folded, token-rebuilt when tokens were supplied).
    pub text: String,

    /// Transcript exactly as the recogniser delivered it.
    pub original_text: String,

    /// Effective recogniser confidence.
    pub confidence: f32,

    /// Audio source the transcript came from.
    pub source_id: Option<String>,

    /// Word-level annotations exactly as the recogniser delivered them.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tokens: Vec<Token>,

    /// When the utterance reached the arbiter.
    pub received_at: DateTime<Utc>,

    /// A wake phrase forced this turn through.
    pub via_wake_phrase: bool,

    /// Speech output was stopped to make room for this turn.
    pub interrupted_output: bool,

    pub dispatched_at: DateTime<Utc>,
}

/// Why an utterance was dropped without a turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiscardReason {
    Blank,
    LowConfidence,
    NoMeaningfulTokens,
    /// Filler while the agent holds the floor; the agent keeps talking.
    FillerWhileSpeaking,
}

impl From<EmptyReason> for DiscardReason {
    fn from(reason: EmptyReason) -> Self {
        match reason {
            EmptyReason::Blank => Self::Blank,
            EmptyReason::LowConfidence => Self::LowConfidence,
            EmptyReason::NoMeaningfulTokens => Self::NoMeaningfulTokens,
        }
    }
}

/// What the arbiter did with one utterance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum Decision {
    /// Dropped; nothing dispatched, output untouched.
    Discard { reason: DiscardReason },

    /// Meaningful speech arrived inside the pause window while the agent was
    /// speaking: treated as the tail of an ongoing breath, not a new turn.
    Defer {
        #[serde(with = "duration_millis")]
        elapsed: Duration,
    },

    /// New turn while the agent was silent.
    Dispatch { turn: UserTurn },

    /// Output was stopped and the turn dispatched.
    Interrupt { turn: UserTurn },
}

impl Decision {
    /// The dispatched turn, for `Dispatch` and `Interrupt`.
    pub const fn turn(&self) -> Option<&UserTurn> {
        match self {
            Self::Dispatch { turn } | Self::Interrupt { turn } => Some(turn),
            Self::Discard { .. } | Self::Defer { .. } => None,
        }
    }

    pub const fn is_discard(&self) -> bool {
        matches!(self, Self::Discard { .. })
    }

    pub const fn label(&self) -> &'static str {
        match self {
            Self::Discard { .. } => "discard",
            Self::Defer { .. } => "defer",
            Self::Dispatch { .. } => "dispatch",
            Self::Interrupt { .. } => "interrupt",
        }
    }
}

mod duration_millis {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    #[allow(clippy::cast_possible_truncation)]
    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(value.as_millis() as u64)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        u64::deserialize(deserializer).map(Duration::from_millis)
    }
}
