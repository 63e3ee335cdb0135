//! Utterance events as delivered by the speech-recognition collaborator.
//!
//! An [`Utterance`] is immutable once built: the arbiter reads it, derives a
//! verdict, and never writes back. Word-level [`Token`]s are optional because
//! many ASR backends only report a flat transcript.

use std::fmt;
use std::time::Instant;

use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// Confidence assumed when the recogniser does not report one.
pub const DEFAULT_CONFIDENCE: f32 = 1.0;

// ── Token classes ──────────────────────────────────────────────────

/// Acoustic/lexical class attached to a single recognised token.
///
/// Unrecognised labels deserialize to [`TokenClass::Unknown`] rather than
/// failing, so a backend that invents new classes never breaks arbitration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenClass {
    /// A lexical word.
    #[default]
    Word,
    /// Disfluency such as "uh" or "umm".
    Filler,
    /// Background noise picked up as a token.
    Noise,
    /// Laughter.
    Laugh,
    /// Audible breath.
    Breath,
    /// Anything the backend labelled with a class we do not know.
    Unknown,
}

impl TokenClass {
    /// Parse a backend label (case-insensitive). Never fails.
    #[must_use]
    pub fn from_label(label: &str) -> Self {
        match label.trim().to_ascii_lowercase().as_str() {
            "word" => Self::Word,
            "filler" => Self::Filler,
            "noise" => Self::Noise,
            "laugh" => Self::Laugh,
            "breath" => Self::Breath,
            _ => Self::Unknown,
        }
    }

    /// Lowercase label used on the wire and in logs.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Word => "word",
            Self::Filler => "filler",
            Self::Noise => "noise",
            Self::Laugh => "laugh",
            Self::Breath => "breath",
            Self::Unknown => "unknown",
        }
    }
}

impl fmt::Display for TokenClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for TokenClass {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let label = String::deserialize(deserializer)?;
        Ok(Self::from_label(&label))
    }
}

// ── Token ──────────────────────────────────────────────────────────

/// One word-level annotation inside an utterance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Token {
    /// Surface text of the token.
    pub text: String,

    /// Token class. Backends disagree on the key name, so `type` and
    /// `token_type` are accepted as well. A missing class means a plain word.
    #[serde(default, alias = "type", alias = "token_type")]
    pub class: TokenClass,
}

impl Token {
    pub fn new(text: impl Into<String>, class: TokenClass) -> Self {
        Self {
            text: text.into(),
            class,
        }
    }

    pub fn word(text: impl Into<String>) -> Self {
        Self::new(text, TokenClass::Word)
    }

    pub fn filler(text: impl Into<String>) -> Self {
        Self::new(text, TokenClass::Filler)
    }
}

// ── Utterance ──────────────────────────────────────────────────────

/// A single ASR callback: partial or final, the arbiter does not care.
#[derive(Debug, Clone)]
pub struct Utterance {
    text: String,
    confidence: Option<f32>,
    tokens: Vec<Token>,
    source_id: Option<String>,
    received_at: Instant,
    received_time: DateTime<Utc>,
}

impl Utterance {
    /// Create an utterance stamped with the current instant.
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            confidence: None,
            tokens: Vec::new(),
            source_id: None,
            received_at: Instant::now(),
            received_time: Utc::now(),
        }
    }

    /// Attach a recogniser confidence.
    ///
    /// Values are clamped into `[0, 1]`; `NaN` is treated as zero confidence.
    #[must_use]
    pub fn with_confidence(mut self, confidence: f32) -> Self {
        let confidence = if confidence.is_nan() {
            0.0
        } else {
            confidence.clamp(0.0, 1.0)
        };
        self.confidence = Some(confidence);
        self
    }

    #[must_use]
    pub fn with_tokens(mut self, tokens: impl IntoIterator<Item = Token>) -> Self {
        self.tokens = tokens.into_iter().collect();
        self
    }

    /// Attach the audio source (track) the transcript came from.
    #[must_use]
    pub fn with_source(mut self, source_id: impl Into<String>) -> Self {
        self.source_id = Some(source_id.into());
        self
    }

    /// Override the arrival instant (replayed or buffered events).
    ///
    /// The wall-clock arrival time moves with it.
    #[must_use]
    pub fn received_at(mut self, at: Instant) -> Self {
        let now = Instant::now();
        let shift = |d| TimeDelta::from_std(d).unwrap_or(TimeDelta::zero());
        self.received_time = if at <= now {
            Utc::now() - shift(now.duration_since(at))
        } else {
            Utc::now() + shift(at.duration_since(now))
        };
        self.received_at = at;
        self
    }

    /// Raw transcript exactly as delivered.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Effective confidence, [`DEFAULT_CONFIDENCE`] when none was reported.
    pub fn confidence(&self) -> f32 {
        self.confidence.unwrap_or(DEFAULT_CONFIDENCE)
    }

    /// Confidence as reported, without defaulting.
    pub const fn reported_confidence(&self) -> Option<f32> {
        self.confidence
    }

    /// Word-level tokens; empty when the backend supplied none.
    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    pub fn source_id(&self) -> Option<&str> {
        self.source_id.as_deref()
    }

    pub const fn arrived_at(&self) -> Instant {
        self.received_at
    }

    /// Wall-clock arrival time, forwarded on dispatched turns.
    pub const fn received_time(&self) -> DateTime<Utc> {
        self.received_time
    }

    /// Whether the transcript is empty after trimming.
    pub fn is_blank(&self) -> bool {
        self.text.trim().is_empty()
    }
}
