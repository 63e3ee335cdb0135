//! Main CLI parser and top-level argument handling.
//!
//! Settings are layered: built-in defaults, then the optional `--config`
//! JSON file, then these flags (each of which can also come from a
//! `PARLEY_*` environment variable or a `.env` file).

use std::path::PathBuf;

use clap::{Args, Parser};
use parley_core::{ArbiterSettingsUpdate, TokenClass};

use crate::commands::Commands;

/// Command-line interface for the parley turn arbiter.
#[derive(Parser)]
#[command(name = "parley")]
#[command(about = "Turn-taking arbitration for spoken-dialogue agents")]
#[command(version)]
pub struct Cli {
    /// JSON settings file (camelCase keys, e.g. {"minConfidence": 0.6})
    #[arg(long = "config", global = true, env = "PARLEY_CONFIG")]
    pub config: Option<PathBuf>,

    /// Enable verbose/debug output
    #[arg(short = 'v', long = "verbose", global = true)]
    pub verbose: bool,

    #[command(flatten)]
    pub overrides: SettingsArgs,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Per-invocation settings overrides.
#[derive(Args, Debug, Default, Clone)]
pub struct SettingsArgs {
    /// Confidence floor for non-wake speech (0.0-1.0)
    #[arg(long, global = true, env = "PARLEY_MIN_CONFIDENCE")]
    pub min_confidence: Option<f32>,

    /// Pause window in seconds
    #[arg(long, global = true, env = "PARLEY_PAUSE_WINDOW")]
    pub pause_window: Option<f64>,

    /// Minimum meaningful tokens when token annotations are present (0 disables)
    #[arg(long, global = true, env = "PARLEY_MIN_MEANINGFUL_TOKENS")]
    pub min_meaningful_tokens: Option<u32>,

    /// Comma-separated wake phrases (replaces the defaults)
    #[arg(long, global = true, value_delimiter = ',', env = "PARLEY_WAKE_PHRASES")]
    pub wake_phrases: Option<Vec<String>>,

    /// Comma-separated filler words (replaces the defaults)
    #[arg(long, global = true, value_delimiter = ',', env = "PARLEY_FILLER_WORDS")]
    pub filler_words: Option<Vec<String>>,

    /// Comma-separated token classes treated as noise (replaces the defaults)
    #[arg(
        long,
        global = true,
        value_delimiter = ',',
        value_parser = parse_token_class,
        env = "PARLEY_NOISE_TOKEN_CLASSES"
    )]
    pub noise_token_classes: Option<Vec<TokenClass>>,

    /// Per-session utterance queue capacity
    #[arg(long, global = true, env = "PARLEY_QUEUE_CAPACITY")]
    pub queue_capacity: Option<usize>,
}

impl SettingsArgs {
    /// The overrides as a partial settings update.
    pub fn to_update(&self) -> ArbiterSettingsUpdate {
        ArbiterSettingsUpdate {
            min_confidence: self.min_confidence.map(Some),
            pause_window_seconds: self.pause_window.map(Some),
            min_meaningful_tokens: self.min_meaningful_tokens.map(Some),
            filler_words: self.filler_words.clone().map(Some),
            wake_phrases: self.wake_phrases.clone().map(Some),
            noise_token_classes: self.noise_token_classes.clone().map(Some),
            session_queue_capacity: self.queue_capacity.map(Some),
        }
    }
}

/// Unrecognised labels are accepted and map to `unknown`.
#[allow(clippy::unnecessary_wraps)]
fn parse_token_class(label: &str) -> Result<TokenClass, String> {
    Ok(TokenClass::from_label(label))
}
