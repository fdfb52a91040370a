//! Configuration loader
//!
//! Reads a YAML narrative configuration, fills unspecified fields with the
//! stock defaults, and validates the cross-field constraints the recognizers
//! depend on.

use std::path::Path;

use tracing::debug;

use crate::config::schema::NarrativeConfig;
use crate::error::ConfigError;

/// Loads and validates a configuration file.
///
/// # Errors
///
/// Returns `ConfigError::MissingFile` if `path` does not exist,
/// `ConfigError::Io` if it cannot be read, `ConfigError::ParseError` for
/// malformed YAML, and
/// `ConfigError::InvalidValue` if validation fails.
pub fn load(path: &Path) -> Result<NarrativeConfig, ConfigError> {
    let text = std::fs::read_to_string(path).map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound => ConfigError::MissingFile {
            path: path.to_path_buf(),
        },
        _ => ConfigError::Io {
            path: path.to_path_buf(),
            source: e,
        },
    })?;
    let config = parse(&text, path)?;
    debug!(path = %path.display(), "loaded narrative configuration");
    Ok(config)
}

/// Loads `path` when given, otherwise returns the validated defaults.
///
/// # Errors
///
/// Propagates any error from [`load`].
pub fn load_or_default(path: Option<&Path>) -> Result<NarrativeConfig, ConfigError> {
    path.map_or_else(|| Ok(NarrativeConfig::default()), load)
}

/// Parses YAML text into a validated configuration.
///
/// `origin` is only used for error messages.
///
/// # Errors
///
/// Returns `ConfigError::ParseError` or `ConfigError::InvalidValue`.
pub fn parse(text: &str, origin: &Path) -> Result<NarrativeConfig, ConfigError> {
    // An empty document deserializes as unit, not as an empty mapping.
    let config: NarrativeConfig = if text.trim().is_empty() {
        NarrativeConfig::default()
    } else {
        serde_yaml::from_str(text).map_err(|e| ConfigError::ParseError {
            path: origin.to_path_buf(),
            line: e.location().map(|loc| loc.line()),
            message: e.to_string(),
        })?
    };
    validate(&config)?;
    Ok(config)
}

/// Checks the constraints that deserialization cannot express.
///
/// # Errors
///
/// Returns `ConfigError::InvalidValue` naming the first offending field.
pub fn validate(config: &NarrativeConfig) -> Result<(), ConfigError> {
    if config.storage_key.is_empty() {
        return Err(ConfigError::invalid("storage_key", "", "a non-empty key"));
    }
    if config.action_log_capacity == 0 {
        return Err(ConfigError::invalid("action_log_capacity", 0, ">= 1"));
    }

    let clicks = &config.clicks;
    if clicks.threshold == 0 {
        return Err(ConfigError::invalid("clicks.threshold", 0, ">= 1"));
    }
    if clicks.feedback_from >= clicks.threshold {
        return Err(ConfigError::invalid(
            "clicks.feedback_from",
            clicks.feedback_from,
            format!("less than clicks.threshold ({})", clicks.threshold),
        ));
    }

    let keys = &config.keys;
    let word_len = keys.secret_word.chars().count();
    if word_len == 0 {
        return Err(ConfigError::invalid(
            "keys.secret_word",
            "",
            "a non-empty word",
        ));
    }
    // Truncation must never cut into a match in progress.
    if keys.truncate_to < word_len {
        return Err(ConfigError::invalid(
            "keys.truncate_to",
            keys.truncate_to,
            format!("at least the secret word length ({word_len})"),
        ));
    }
    if keys.truncate_to >= keys.buffer_cap {
        return Err(ConfigError::invalid(
            "keys.truncate_to",
            keys.truncate_to,
            format!("less than keys.buffer_cap ({})", keys.buffer_cap),
        ));
    }

    let glitch = &config.glitch;
    for (field, value) in [
        ("glitch.flash_interval", glitch.flash_interval),
        ("glitch.text_interval", glitch.text_interval),
        ("glitch.hint_interval", glitch.hint_interval),
        ("finale.reveal_cadence", config.finale.reveal_cadence),
    ] {
        if value.is_zero() {
            return Err(ConfigError::invalid(field, "0s", "a non-zero duration"));
        }
    }

    Ok(())
}
