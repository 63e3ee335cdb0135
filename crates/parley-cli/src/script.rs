//! Replay scripts: one JSON event per line.
//!
//! ```text
//! {"event": "track", "atMs": 0, "sourceId": "TR_1", "identity": "alice"}
//! {"event": "output", "atMs": 0, "signal": "started"}
//! {"event": "utterance", "atMs": 400, "text": "umm uh", "confidence": 0.98,
//!  "sourceId": "TR_1", "tokens": [{"text": "umm", "type": "filler"}]}
//! ```
//!
//! Blank lines and lines starting with `#` are skipped. Offsets must not go
//! backwards.

use std::io::BufRead;
use std::time::{Duration, Instant};

use parley_core::{Token, Utterance};
use serde::Deserialize;

use crate::error::CliError;

/// Lifecycle signal a script can inject as if it came from synthesis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputSignal {
    Started,
    Completed,
    Interrupted,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(
    tag = "event",
    rename_all = "snake_case",
    rename_all_fields = "camelCase"
)]
pub enum ScriptEvent {
    Utterance {
        at_ms: u64,
        text: String,
        #[serde(default)]
        confidence: Option<f32>,
        #[serde(default)]
        tokens: Vec<Token>,
        #[serde(default)]
        source_id: Option<String>,
    },
    Track {
        at_ms: u64,
        source_id: String,
        identity: String,
    },
    Output {
        at_ms: u64,
        signal: OutputSignal,
    },
}

impl ScriptEvent {
    pub const fn at_ms(&self) -> u64 {
        match self {
            Self::Utterance { at_ms, .. }
            | Self::Track { at_ms, .. }
            | Self::Output { at_ms, .. } => *at_ms,
        }
    }

    pub fn offset(&self) -> Duration {
        Duration::from_millis(self.at_ms())
    }
}

/// Build the utterance for an `utterance` event, stamped at `base + atMs`.
pub fn to_utterance(
    base: Instant,
    at_ms: u64,
    text: &str,
    confidence: Option<f32>,
    tokens: &[Token],
    source_id: Option<&str>,
) -> Utterance {
    let mut utterance = Utterance::new(text)
        .with_tokens(tokens.iter().cloned())
        .received_at(base + Duration::from_millis(at_ms));
    if let Some(confidence) = confidence {
        utterance = utterance.with_confidence(confidence);
    }
    if let Some(source_id) = source_id {
        utterance = utterance.with_source(source_id);
    }
    utterance
}

/// Parse a whole script.
pub fn parse_script(reader: impl BufRead) -> Result<Vec<ScriptEvent>, CliError> {
    let mut events: Vec<ScriptEvent> = Vec::new();

    for (index, line) in reader.lines().enumerate() {
        let number = index + 1;
        let line = line.map_err(|e| CliError::Script {
            line: number,
            message: e.to_string(),
        })?;
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }

        let event: ScriptEvent = serde_json::from_str(trimmed).map_err(|e| CliError::Script {
            line: number,
            message: e.to_string(),
        })?;

        if let Some(previous) = events.last() {
            if event.at_ms() < previous.at_ms() {
                return Err(CliError::Script {
                    line: number,
                    message: format!(
                        "atMs {} goes backwards (previous event at {})",
                        event.at_ms(),
                        previous.at_ms()
                    ),
                });
            }
        }
        events.push(event);
    }

    Ok(events)
}
