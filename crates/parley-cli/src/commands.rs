//! Subcommands for the parley CLI.

use std::path::PathBuf;

use clap::Subcommand;

/// Available commands.
#[derive(Subcommand)]
pub enum Commands {
    /// Replay a JSON-lines ASR script through a live arbiter session
    Replay {
        /// Script file (one JSON event per line; `#` comments allowed)
        script: PathBuf,
        /// How long the simulated agent speaks each reply, in milliseconds
        #[arg(long, default_value_t = 1500)]
        reply_ms: u64,
        /// Print every session event as JSON instead of a transcript
        #[arg(long)]
        json: bool,
    },

    /// Classify a single utterance without running a session
    Classify {
        /// Transcript text
        text: String,
        /// Recognizer confidence (0.0-1.0); omitted means fully confident
        #[arg(short, long)]
        confidence: Option<f32>,
        /// Word annotations as `text[:class]` pairs, comma-separated (e.g. "umm:filler,play")
        #[arg(short, long, value_delimiter = ',')]
        tokens: Vec<String>,
        /// Print the verdict as JSON
        #[arg(long)]
        json: bool,
    },

    /// Inspect arbiter settings
    Config {
        #[command(subcommand)]
        command: ConfigCommand,
    },
}

/// Settings inspection commands.
#[derive(Subcommand)]
pub enum ConfigCommand {
    /// Show the effective settings after all layers are applied
    Show {
        /// Print as JSON (usable as a `--config` file)
        #[arg(long)]
        json: bool,
    },
    /// Validate a settings file without running anything
    Check {
        /// Path to the JSON settings file
        path: PathBuf,
    },
}
