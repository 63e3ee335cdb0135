//! Command-line harness for the parley turn arbiter.
//!
//! `parley replay` runs a scripted conversation through a real session with
//! a simulated agent, `parley classify` runs the token classifier on one
//! utterance, and `parley config` shows or checks the layered settings.

#![deny(unsafe_code)]
#![deny(unused_crate_dependencies)]

#[cfg(test)]
use tokio_test as _;

// Used by the binary only
use dotenvy as _;
use tracing_subscriber as _;

pub mod commands;
pub mod config;
pub mod echo;
pub mod error;
pub mod handlers;
pub mod parser;
pub mod script;

pub use commands::{Commands, ConfigCommand};
pub use error::CliError;
pub use parser::{Cli, SettingsArgs};
