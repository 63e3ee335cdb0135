//! Config command handler.

use std::path::Path;

use anyhow::Result;
use parley_core::{ArbiterSettings, ArbiterSettingsUpdate, validate_settings};

use crate::commands::ConfigCommand;
use crate::config::{load_settings, read_settings_file};

/// Execute the config command.
pub fn execute(
    command: ConfigCommand,
    file: Option<&Path>,
    overrides: &ArbiterSettingsUpdate,
) -> Result<()> {
    match command {
        ConfigCommand::Show { json } => {
            let settings = load_settings(file, overrides)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&settings)?);
            } else {
                print_settings(&settings, file);
            }
            Ok(())
        }
        ConfigCommand::Check { path } => {
            let settings = read_settings_file(&path)?;
            validate_settings(&settings)?;
            println!("✓ {} is valid", path.display());
            Ok(())
        }
    }
}

fn print_settings(settings: &ArbiterSettings, file: Option<&Path>) {
    match file {
        Some(path) => println!("Effective settings (file: {}):", path.display()),
        None => println!("Effective settings (defaults):"),
    }
    println!("  minConfidence:        {:?}", settings.min_confidence);
    println!("  pauseWindowSeconds:   {:?}", settings.pause_window_seconds);
    println!("  minMeaningfulTokens:  {:?}", settings.min_meaningful_tokens);
    println!(
        "  wakePhrases:          {}",
        join_or_none(settings.wake_phrases.as_deref())
    );
    println!(
        "  fillerWords:          {}",
        join_or_none(settings.filler_words.as_deref())
    );
    let classes = settings.noise_token_classes.as_ref().map(|classes| {
        classes
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
    });
    println!("  noiseTokenClasses:    {}", join_or_none(classes.as_deref()));
    println!(
        "  sessionQueueCapacity: {:?}",
        settings.session_queue_capacity
    );
}

fn join_or_none(values: Option<&[String]>) -> String {
    values.map_or_else(|| "None".to_string(), |values| values.join(", "))
}
