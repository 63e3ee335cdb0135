//! Layered settings loading.
//!
//! Precedence, lowest first: built-in defaults, the JSON settings file,
//! command-line/environment overrides. The merged result is validated once.

use std::path::Path;

use parley_core::{ArbiterConfig, ArbiterSettings, ArbiterSettingsUpdate, validate_settings};

use crate::error::CliError;

/// Read a settings file. Absent keys stay `None`.
pub fn read_settings_file(path: &Path) -> Result<ArbiterSettings, CliError> {
    let raw = std::fs::read_to_string(path).map_err(|source| CliError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&raw).map_err(|source| CliError::SettingsFile {
        path: path.to_path_buf(),
        source,
    })
}

/// Resolve the effective settings for this invocation.
pub fn load_settings(
    file: Option<&Path>,
    overrides: &ArbiterSettingsUpdate,
) -> Result<ArbiterSettings, CliError> {
    let mut settings = ArbiterSettings::with_defaults();

    if let Some(path) = file {
        let from_file = read_settings_file(path)?;
        settings.merge(&as_update(&from_file));
        tracing::debug!(path = %path.display(), "Loaded settings file");
    }

    settings.merge(overrides);
    let settings = settings.resolved();
    validate_settings(&settings)?;
    Ok(settings)
}

/// Resolve settings straight into an arbiter configuration.
pub fn load_config(
    file: Option<&Path>,
    overrides: &ArbiterSettingsUpdate,
) -> Result<ArbiterConfig, CliError> {
    let settings = load_settings(file, overrides)?;
    Ok(ArbiterConfig::from_settings(&settings)?)
}

/// Treat every field present in `settings` as an explicit update.
fn as_update(settings: &ArbiterSettings) -> ArbiterSettingsUpdate {
    ArbiterSettingsUpdate {
        min_confidence: settings.min_confidence.map(Some),
        pause_window_seconds: settings.pause_window_seconds.map(Some),
        min_meaningful_tokens: settings.min_meaningful_tokens.map(Some),
        filler_words: settings.filler_words.clone().map(Some),
        wake_phrases: settings.wake_phrases.clone().map(Some),
        noise_token_classes: settings.noise_token_classes.clone().map(Some),
        session_queue_capacity: settings.session_queue_capacity.map(Some),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parley_core::{DEFAULT_MIN_CONFIDENCE, SettingsError, TokenClass};
    use std::io::Write;
    use std::time::Duration;
    use tempfile::NamedTempFile;

    fn settings_file(json: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(json.as_bytes()).unwrap();
        file
    }

    #[test]
    fn defaults_without_file_or_overrides() {
        let settings = load_settings(None, &ArbiterSettingsUpdate::default()).unwrap();
        assert_eq!(settings, ArbiterSettings::with_defaults());
    }

    #[test]
    fn file_values_override_defaults() {
        let file = settings_file(r#"{"pauseWindowSeconds": 1.2, "noiseTokenClasses": ["noise"]}"#);
        let settings = load_settings(Some(file.path()), &ArbiterSettingsUpdate::default()).unwrap();

        assert_eq!(settings.pause_window_seconds, Some(1.2));
        assert_eq!(settings.noise_token_classes, Some(vec![TokenClass::Noise]));
        assert_eq!(settings.min_confidence, Some(DEFAULT_MIN_CONFIDENCE));
    }

    #[test]
    fn overrides_beat_file_values() {
        let file = settings_file(r#"{"minConfidence": 0.8, "wakePhrases": ["computer"]}"#);
        let overrides = ArbiterSettingsUpdate {
            min_confidence: Some(Some(0.3)),
            ..Default::default()
        };

        let config = load_config(Some(file.path()), &overrides).unwrap();

        assert!((config.min_confidence() - 0.3).abs() < f32::EPSILON);
        assert_eq!(config.wake_phrases(), ["computer".to_string()]);
        assert_eq!(config.pause_window(), Duration::from_millis(700));
    }

    #[test]
    fn out_of_range_file_value_is_rejected() {
        let file = settings_file(r#"{"minConfidence": 2.0}"#);
        let err = load_settings(Some(file.path()), &ArbiterSettingsUpdate::default()).unwrap_err();
        assert!(matches!(
            err,
            CliError::Config(SettingsError::InvalidConfidence(_))
        ));
    }

    #[test]
    fn malformed_file_is_reported_with_path() {
        let file = settings_file("{ not json");
        let err = read_settings_file(file.path()).unwrap_err();
        assert!(matches!(err, CliError::SettingsFile { .. }));
        assert!(err.to_string().contains(&file.path().display().to_string()));
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = read_settings_file(&dir.path().join("absent.json")).unwrap_err();
        assert_eq!(err.exit_code(), 74);
    }
}
