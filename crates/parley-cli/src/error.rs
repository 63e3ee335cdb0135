//! CLI-specific error types.

use std::path::PathBuf;

use parley_core::SettingsError;
use parley_turn::SessionError;
use thiserror::Error;

/// CLI-specific error type.
#[derive(Debug, Error)]
pub enum CliError {
    /// Settings file could not be read.
    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Settings file is not valid JSON for the settings schema.
    #[error("Invalid settings file {path}: {source}")]
    SettingsFile {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// Effective settings failed validation.
    #[error("Configuration error: {0}")]
    Config(#[from] SettingsError),

    /// A replay script line could not be parsed.
    #[error("Script line {line}: {message}")]
    Script { line: usize, message: String },

    /// Invalid command-line input.
    #[error("Invalid arguments: {0}")]
    Arguments(String),

    /// The arbiter session failed.
    #[error("Session error: {0}")]
    Session(#[from] SessionError),
}

impl CliError {
    /// Map error to an exit code (sysexits.h where one fits).
    pub const fn exit_code(&self) -> i32 {
        match self {
            // clap's usage status
            Self::Arguments(_) => 2,
            // EX_DATAERR
            Self::Script { .. } => 65,
            // EX_IOERR
            Self::Io { .. } => 74,
            // EX_CONFIG
            Self::SettingsFile { .. } | Self::Config(_) => 78,
            // EX_SOFTWARE
            Self::Session(_) => 70,
        }
    }
}
