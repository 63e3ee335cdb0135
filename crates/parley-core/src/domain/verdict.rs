//! Classifier verdicts.

use serde::{Deserialize, Serialize};

/// Why an utterance carried no usable content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EmptyReason {
    /// Transcript was empty or whitespace only.
    Blank,
    /// Recogniser confidence fell below the configured floor.
    LowConfidence,
    /// Token annotations were present but too few survived noise filtering.
    NoMeaningfulTokens,
}

/// Outcome of classifying a single utterance.
///
/// Non-empty verdicts carry the *working text*: the trimmed, case-folded
/// transcript, or the transcript rebuilt from the surviving tokens.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Verdict {
    /// Real content that deserves a turn.
    Meaningful {
        text: String,
        /// `true` when a wake phrase forced this verdict.
        via_wake_phrase: bool,
    },
    /// Every word is a disposable filler.
    FillerOnly { text: String },
    /// Nothing usable.
    Empty { reason: EmptyReason },
}

impl Verdict {
    /// Working text, if the verdict has any.
    pub fn text(&self) -> Option<&str> {
        match self {
            Self::Meaningful { text, .. } | Self::FillerOnly { text } => Some(text),
            Self::Empty { .. } => None,
        }
    }

    pub const fn is_empty(&self) -> bool {
        matches!(self, Self::Empty { .. })
    }

    pub const fn is_wake(&self) -> bool {
        matches!(
            self,
            Self::Meaningful {
                via_wake_phrase: true,
                ..
            }
        )
    }

    /// Short label for structured logs.
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Meaningful {
                via_wake_phrase: true,
                ..
            } => "wake",
            Self::Meaningful { .. } => "meaningful",
            Self::FillerOnly { .. } => "filler_only",
            Self::Empty { .. } => "empty",
        }
    }
}
