//! Error types for `sanctuary`
//!
//! The narrative engine itself never surfaces errors: storage failures are
//! absorbed by the store and mismatched triggers are no-ops. The types here
//! cover the edges that can fail loudly: configuration loading, storage
//! backends (reported to the store, which logs and swallows them) and the
//! command-line script driver.

use std::path::PathBuf;
use thiserror::Error;

// ============================================================================
// Exit Codes
// ============================================================================

/// Exit codes for `sanctuary` CLI operations.
pub struct ExitCode;

impl ExitCode {
    /// Successful execution
    pub const SUCCESS: i32 = 0;

    /// General error
    pub const ERROR: i32 = 1;

    /// Configuration error (invalid YAML, validation failure)
    pub const CONFIG_ERROR: i32 = 2;

    /// I/O error (file not found, permission denied)
    pub const IO_ERROR: i32 = 3;

    /// Session script error (unknown command, bad argument)
    pub const SCRIPT_ERROR: i32 = 4;

    /// Usage error (invalid arguments, missing required options)
    pub const USAGE_ERROR: i32 = 64;

    /// Interrupted by SIGINT (Ctrl+C)
    pub const INTERRUPTED: i32 = 130;
}

// ============================================================================
// Top-Level Error
// ============================================================================

/// Top-level error type for `sanctuary` operations.
#[derive(Debug, Error)]
pub enum SanctuaryError {
    /// Configuration loading or validation error
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Storage backend error surfaced by an explicit CLI operation
    #[error(transparent)]
    Store(#[from] StoreError),

    /// Session script error
    #[error(transparent)]
    Script(#[from] ScriptError),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl SanctuaryError {
    /// Returns the appropriate exit code for this error.
    #[must_use]
    pub const fn exit_code(&self) -> i32 {
        match self {
            Self::Config(_) => ExitCode::CONFIG_ERROR,
            Self::Store(_) | Self::Io(_) => ExitCode::IO_ERROR,
            Self::Script(_) => ExitCode::SCRIPT_ERROR,
            Self::Json(_) => ExitCode::ERROR,
        }
    }
}

// ============================================================================
// Configuration Errors
// ============================================================================

/// Configuration loading and validation errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// YAML parsing failed
    #[error("parse error in {path}: {message}")]
    ParseError {
        /// Path to the configuration file
        path: PathBuf,
        /// Line number where the error occurred (if available)
        line: Option<usize>,
        /// Error message from the parser
        message: String,
    },

    /// Referenced configuration file not found
    #[error("file not found: {path}")]
    MissingFile {
        /// Path to the missing file
        path: PathBuf,
    },

    /// Configuration file exists but could not be read
    #[error("failed to read {path}: {source}")]
    Io {
        /// Path to the configuration file
        path: PathBuf,
        /// Underlying I/O error
        source: std::io::Error,
    },

    /// Field has an invalid value
    #[error("invalid value for '{field}': got '{value}', expected {expected}")]
    InvalidValue {
        /// Name of the field with invalid value
        field: String,
        /// The actual value provided
        value: String,
        /// Description of what was expected
        expected: String,
    },
}

impl ConfigError {
    /// Builds an [`ConfigError::InvalidValue`] from displayable parts.
    pub fn invalid(
        field: impl Into<String>,
        value: impl std::fmt::Display,
        expected: impl Into<String>,
    ) -> Self {
        Self::InvalidValue {
            field: field.into(),
            value: value.to_string(),
            expected: expected.into(),
        }
    }
}

// ============================================================================
// Storage Errors
// ============================================================================

/// Failures reported by a [`StorageBackend`](crate::store::StorageBackend).
///
/// The state store logs these and falls back to its last-known state; they
/// only reach a caller through explicit CLI operations such as `state reset`.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Storage is disabled or not reachable
    #[error("storage unavailable: {0}")]
    Unavailable(String),

    /// Writing the record would exceed the backend's quota
    #[error("storage quota exceeded: {needed} bytes needed, {quota} allowed")]
    QuotaExceeded {
        /// Bytes the backend would hold after the write
        needed: usize,
        /// Configured quota in bytes
        quota: usize,
    },

    /// Underlying file I/O failed
    #[error("storage I/O error: {0}")]
    Io(#[from] std::io::Error),
}

// ============================================================================
// Script Errors
// ============================================================================

/// Errors raised while parsing a `play` session script.
#[derive(Debug, Error)]
pub enum ScriptError {
    /// Line could not be split into words (unbalanced quotes)
    #[error("line {line}: cannot split '{text}'")]
    Unparseable {
        /// 1-based line number
        line: usize,
        /// Raw line text
        text: String,
    },

    /// Command word is not recognized
    #[error("line {line}: unknown command '{command}'")]
    UnknownCommand {
        /// 1-based line number
        line: usize,
        /// The unrecognized command
        command: String,
    },

    /// Command is missing an argument or has an invalid one
    #[error("line {line}: {message}")]
    InvalidArgument {
        /// 1-based line number
        line: usize,
        /// Description of the problem
        message: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exit_codes_by_variant() {
        let config = SanctuaryError::from(ConfigError::invalid("clicks.threshold", 0, ">= 1"));
        assert_eq!(config.exit_code(), ExitCode::CONFIG_ERROR);

        let store = SanctuaryError::from(StoreError::Unavailable("disabled".into()));
        assert_eq!(store.exit_code(), ExitCode::IO_ERROR);

        let script = SanctuaryError::from(ScriptError::UnknownCommand {
            line: 3,
            command: "jump".into(),
        });
        assert_eq!(script.exit_code(), ExitCode::SCRIPT_ERROR);
    }

    #[test]
    fn invalid_value_message() {
        let err = ConfigError::invalid("keys.secret_word", "", "a non-empty word");
        assert_eq!(
            err.to_string(),
            "invalid value for 'keys.secret_word': got '', expected a non-empty word"
        );
    }

    #[test]
    fn quota_message_names_sizes() {
        let err = StoreError::QuotaExceeded {
            needed: 120,
            quota: 64,
        };
        assert!(err.to_string().contains("120 bytes needed"));
        assert!(err.to_string().contains("64 allowed"));
    }
}
