//! Arbiter settings: the configuration surface, its validation, and the
//! resolved [`ArbiterConfig`] the arbiter actually runs on.
//!
//! [`ArbiterSettings`] is the wire/file shape. Every field is optional so a
//! settings file only has to name what it overrides. [`ArbiterConfig`] is the
//! resolved, normalised form: defaults applied, phrases case-folded, the
//! pause window converted to a [`Duration`].

use std::collections::HashSet;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::domain::TokenClass;

/// Minimum recogniser confidence for non-wake utterances.
pub const DEFAULT_MIN_CONFIDENCE: f32 = 0.55;

/// Spacing below which consecutive speech events count as one breath.
pub const DEFAULT_PAUSE_WINDOW_SECONDS: f64 = 0.7;

/// Tokens that must survive noise filtering for an annotated utterance.
pub const DEFAULT_MIN_MEANINGFUL_TOKENS: u32 = 1;

/// Bound on queued utterances per session before `submit` waits.
pub const DEFAULT_SESSION_QUEUE_CAPACITY: usize = 64;

/// Disposable words that never warrant interrupting the agent.
pub const DEFAULT_FILLER_WORDS: &[&str] = &["uh", "um", "umm", "hmm", "haan", "like", "mm"];

/// Phrases that always interrupt, whatever the confidence.
pub const DEFAULT_WAKE_PHRASES: &[&str] = &["hey agent", "listen", "stop", "cancel"];

/// Token classes dropped before judging content.
pub const DEFAULT_NOISE_TOKEN_CLASSES: &[TokenClass] = &[
    TokenClass::Filler,
    TokenClass::Noise,
    TokenClass::Laugh,
    TokenClass::Breath,
    TokenClass::Unknown,
];

const MAX_PAUSE_WINDOW_SECONDS: f64 = 60.0;
const MAX_MIN_MEANINGFUL_TOKENS: u32 = 64;
const MAX_SESSION_QUEUE_CAPACITY: usize = 4096;

/// Arbiter settings as read from a file, environment, or flags.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ArbiterSettings {
    /// Confidence floor (0.0–1.0) below which non-wake speech is dropped.
    pub min_confidence: Option<f32>,

    /// Pause window in seconds.
    pub pause_window_seconds: Option<f64>,

    /// Minimum surviving tokens (0 disables the minimum).
    pub min_meaningful_tokens: Option<u32>,

    pub filler_words: Option<Vec<String>>,

    pub wake_phrases: Option<Vec<String>>,

    pub noise_token_classes: Option<Vec<TokenClass>>,

    /// Per-session event queue capacity (1–4096).
    pub session_queue_capacity: Option<usize>,
}

impl ArbiterSettings {
    /// Create settings with every field set to its default.
    #[must_use]
    pub fn with_defaults() -> Self {
        Self {
            min_confidence: Some(DEFAULT_MIN_CONFIDENCE),
            pause_window_seconds: Some(DEFAULT_PAUSE_WINDOW_SECONDS),
            min_meaningful_tokens: Some(DEFAULT_MIN_MEANINGFUL_TOKENS),
            filler_words: Some(to_strings(DEFAULT_FILLER_WORDS)),
            wake_phrases: Some(to_strings(DEFAULT_WAKE_PHRASES)),
            noise_token_classes: Some(DEFAULT_NOISE_TOKEN_CLASSES.to_vec()),
            session_queue_capacity: Some(DEFAULT_SESSION_QUEUE_CAPACITY),
        }
    }

    /// Fill every `None` with its default, keeping explicit values.
    #[must_use]
    pub fn resolved(&self) -> Self {
        let defaults = Self::with_defaults();
        Self {
            min_confidence: self.min_confidence.or(defaults.min_confidence),
            pause_window_seconds: self.pause_window_seconds.or(defaults.pause_window_seconds),
            min_meaningful_tokens: self.min_meaningful_tokens.or(defaults.min_meaningful_tokens),
            filler_words: self.filler_words.clone().or(defaults.filler_words),
            wake_phrases: self.wake_phrases.clone().or(defaults.wake_phrases),
            noise_token_classes: self
                .noise_token_classes
                .clone()
                .or(defaults.noise_token_classes),
            session_queue_capacity: self
                .session_queue_capacity
                .or(defaults.session_queue_capacity),
        }
    }

    /// Merge a partial update into this one, only touching fields that are `Some`.
    pub fn merge(&mut self, other: &ArbiterSettingsUpdate) {
        if let Some(value) = other.min_confidence {
            self.min_confidence = value;
        }
        if let Some(value) = other.pause_window_seconds {
            self.pause_window_seconds = value;
        }
        if let Some(value) = other.min_meaningful_tokens {
            self.min_meaningful_tokens = value;
        }
        if let Some(ref value) = other.filler_words {
            self.filler_words.clone_from(value);
        }
        if let Some(ref value) = other.wake_phrases {
            self.wake_phrases.clone_from(value);
        }
        if let Some(ref value) = other.noise_token_classes {
            self.noise_token_classes.clone_from(value);
        }
        if let Some(value) = other.session_queue_capacity {
            self.session_queue_capacity = value;
        }
    }
}

/// Partial settings update.
///
/// Each field is `Option<Option<T>>`:
/// - `None` = don't change this field
/// - `Some(None)` = reset the field to its default
/// - `Some(Some(value))` = set field to value
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ArbiterSettingsUpdate {
    pub min_confidence: Option<Option<f32>>,
    pub pause_window_seconds: Option<Option<f64>>,
    pub min_meaningful_tokens: Option<Option<u32>>,
    pub filler_words: Option<Option<Vec<String>>>,
    pub wake_phrases: Option<Option<Vec<String>>>,
    pub noise_token_classes: Option<Option<Vec<TokenClass>>>,
    pub session_queue_capacity: Option<Option<usize>>,
}

/// Settings validation error.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SettingsError {
    #[error("Minimum confidence must be between 0.0 and 1.0, got {0}")]
    InvalidConfidence(f32),

    #[error("Pause window must be between 0 and 60 seconds, got {0}")]
    InvalidPauseWindow(f64),

    #[error("Minimum meaningful tokens must be between 0 and 64, got {0}")]
    InvalidTokenMinimum(u32),

    #[error("Session queue capacity must be between 1 and 4096, got {0}")]
    InvalidQueueCapacity(usize),

    #[error("Wake phrases cannot be blank")]
    BlankWakePhrase,

    #[error("Filler words cannot be blank")]
    BlankFillerWord,
}

/// Validate settings values.
pub fn validate_settings(settings: &ArbiterSettings) -> Result<(), SettingsError> {
    if let Some(confidence) = settings.min_confidence {
        if !(0.0..=1.0).contains(&confidence) {
            return Err(SettingsError::InvalidConfidence(confidence));
        }
    }

    if let Some(window) = settings.pause_window_seconds {
        if !window.is_finite() || !(0.0..=MAX_PAUSE_WINDOW_SECONDS).contains(&window) {
            return Err(SettingsError::InvalidPauseWindow(window));
        }
    }

    if let Some(minimum) = settings.min_meaningful_tokens {
        if minimum > MAX_MIN_MEANINGFUL_TOKENS {
            return Err(SettingsError::InvalidTokenMinimum(minimum));
        }
    }

    if let Some(capacity) = settings.session_queue_capacity {
        if !(1..=MAX_SESSION_QUEUE_CAPACITY).contains(&capacity) {
            return Err(SettingsError::InvalidQueueCapacity(capacity));
        }
    }

    if settings
        .wake_phrases
        .as_ref()
        .is_some_and(|phrases| phrases.iter().any(|p| p.trim().is_empty()))
    {
        return Err(SettingsError::BlankWakePhrase);
    }

    if settings
        .filler_words
        .as_ref()
        .is_some_and(|words| words.iter().any(|w| w.trim().is_empty()))
    {
        return Err(SettingsError::BlankFillerWord);
    }

    Ok(())
}

// ── Resolved config ────────────────────────────────────────────────

/// Resolved arbiter configuration.
///
/// Wake phrases and filler words are stored trimmed and lowercased so the
/// classifier can compare against case-folded transcripts directly.
#[derive(Debug, Clone, PartialEq)]
pub struct ArbiterConfig {
    min_confidence: f32,
    pause_window: Duration,
    min_meaningful_tokens: usize,
    filler_words: HashSet<String>,
    wake_phrases: Vec<String>,
    noise_token_classes: HashSet<TokenClass>,
    session_queue_capacity: usize,
}

impl ArbiterConfig {
    /// Validate `settings` and resolve it, falling back to defaults for unset fields.
    pub fn from_settings(settings: &ArbiterSettings) -> Result<Self, SettingsError> {
        validate_settings(settings)?;

        let min_confidence = settings.min_confidence.unwrap_or(DEFAULT_MIN_CONFIDENCE);
        let pause_window = Duration::from_secs_f64(
            settings
                .pause_window_seconds
                .unwrap_or(DEFAULT_PAUSE_WINDOW_SECONDS),
        );
        let min_meaningful_tokens = settings
            .min_meaningful_tokens
            .unwrap_or(DEFAULT_MIN_MEANINGFUL_TOKENS) as usize;

        let filler_words = settings.filler_words.as_ref().map_or_else(
            || normalise_set(DEFAULT_FILLER_WORDS.iter().copied()),
            |words| normalise_set(words.iter().map(String::as_str)),
        );
        let wake_phrases = settings.wake_phrases.as_ref().map_or_else(
            || normalise_list(DEFAULT_WAKE_PHRASES.iter().copied()),
            |phrases| normalise_list(phrases.iter().map(String::as_str)),
        );
        let noise_token_classes = settings.noise_token_classes.as_ref().map_or_else(
            || DEFAULT_NOISE_TOKEN_CLASSES.iter().copied().collect(),
            |classes| classes.iter().copied().collect(),
        );

        Ok(Self {
            min_confidence,
            pause_window,
            min_meaningful_tokens,
            filler_words,
            wake_phrases,
            noise_token_classes,
            session_queue_capacity: settings
                .session_queue_capacity
                .unwrap_or(DEFAULT_SESSION_QUEUE_CAPACITY),
        })
    }

    /// Replace the wake phrases (normalised like the settings path).
    #[must_use]
    pub fn with_wake_phrases<I, S>(mut self, phrases: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let owned: Vec<S> = phrases.into_iter().collect();
        self.wake_phrases = normalise_list(owned.iter().map(AsRef::as_ref));
        self
    }

    #[must_use]
    pub fn with_filler_words<I, S>(mut self, words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let owned: Vec<S> = words.into_iter().collect();
        self.filler_words = normalise_set(owned.iter().map(AsRef::as_ref));
        self
    }

    #[must_use]
    pub const fn with_pause_window(mut self, window: Duration) -> Self {
        self.pause_window = window;
        self
    }

    #[must_use]
    pub const fn with_min_confidence(mut self, min_confidence: f32) -> Self {
        self.min_confidence = min_confidence;
        self
    }

    #[must_use]
    pub const fn with_min_meaningful_tokens(mut self, minimum: usize) -> Self {
        self.min_meaningful_tokens = minimum;
        self
    }

    pub const fn min_confidence(&self) -> f32 {
        self.min_confidence
    }

    pub const fn pause_window(&self) -> Duration {
        self.pause_window
    }

    pub const fn min_meaningful_tokens(&self) -> usize {
        self.min_meaningful_tokens
    }

    pub const fn filler_words(&self) -> &HashSet<String> {
        &self.filler_words
    }

    /// Wake phrases in configured order, deduplicated.
    pub fn wake_phrases(&self) -> &[String] {
        &self.wake_phrases
    }

    pub const fn noise_token_classes(&self) -> &HashSet<TokenClass> {
        &self.noise_token_classes
    }

    pub const fn session_queue_capacity(&self) -> usize {
        self.session_queue_capacity
    }

    pub fn is_noise_class(&self, class: TokenClass) -> bool {
        self.noise_token_classes.contains(&class)
    }
}

impl Default for ArbiterConfig {
    fn default() -> Self {
        Self {
            min_confidence: DEFAULT_MIN_CONFIDENCE,
            pause_window: Duration::from_secs_f64(DEFAULT_PAUSE_WINDOW_SECONDS),
            min_meaningful_tokens: DEFAULT_MIN_MEANINGFUL_TOKENS as usize,
            filler_words: normalise_set(DEFAULT_FILLER_WORDS.iter().copied()),
            wake_phrases: normalise_list(DEFAULT_WAKE_PHRASES.iter().copied()),
            noise_token_classes: DEFAULT_NOISE_TOKEN_CLASSES.iter().copied().collect(),
            session_queue_capacity: DEFAULT_SESSION_QUEUE_CAPACITY,
        }
    }
}

fn to_strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|v| (*v).to_string()).collect()
}

fn normalise_set<'a>(values: impl Iterator<Item = &'a str>) -> HashSet<String> {
    values
        .map(|v| v.trim().to_lowercase())
        .filter(|v| !v.is_empty())
        .collect()
}

fn normalise_list<'a>(values: impl Iterator<Item = &'a str>) -> Vec<String> {
    let mut seen = HashSet::new();
    values
        .map(|v| v.trim().to_lowercase())
        .filter(|v| !v.is_empty() && seen.insert(v.clone()))
        .collect()
}
