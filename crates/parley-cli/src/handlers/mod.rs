//! Command handlers.
//!
//! Handlers are thin: parse CLI-specific input, call into `parley-turn`,
//! and format output for the terminal. Settings are resolved by the caller.

pub mod classify;
pub mod config;
pub mod replay;
