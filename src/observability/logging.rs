//! Diagnostic logging on stderr.
//!
//! Stdout belongs to the event stream, so every log line goes to stderr.
//! `-v` flags raise the level of this crate only; dependencies stay at
//! `warn` unless `SANCTUARY_LOG_LEVEL` says otherwise.

use std::io::IsTerminal;
use tracing_subscriber::EnvFilter;

use crate::cli::args::ColorChoice;

/// Environment variable holding an `EnvFilter` directive that overrides `-v`.
pub const LOG_LEVEL_ENV: &str = "SANCTUARY_LOG_LEVEL";

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum LogFormat {
    /// Human-readable format with optional ANSI colors.
    #[default]
    Human,
    /// Newline-delimited JSON for machine consumption.
    Json,
}

/// Builds the filter directive for `verbosity` (the number of `-v` flags).
///
/// Zero keeps everything at `warn`. Each flag raises `sanctuary` one level,
/// saturating at `trace`.
#[must_use]
pub fn directive_for(verbosity: u8) -> String {
    let level = match verbosity {
        0 => return "warn".to_owned(),
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    format!("warn,sanctuary={level}")
}

/// Decides whether log lines carry ANSI colors.
///
/// `Auto` colors only a terminal, and honors `NO_COLOR`.
#[must_use]
pub fn use_ansi(color: ColorChoice, stderr_is_terminal: bool) -> bool {
    match color {
        ColorChoice::Always => true,
        ColorChoice::Never => false,
        ColorChoice::Auto => stderr_is_terminal && std::env::var_os("NO_COLOR").is_none(),
    }
}

/// Installs the global subscriber.
///
/// Safe to call twice; the second call is ignored.
pub fn init_logging(format: LogFormat, verbosity: u8, color: ColorChoice) {
    let filter = EnvFilter::try_from_env(LOG_LEVEL_ENV)
        .unwrap_or_else(|_| EnvFilter::new(directive_for(verbosity)));
    // Module paths only help once someone is debugging.
    let show_target = verbosity >= 2;

    let installed = match format {
        LogFormat::Human => tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_ansi(use_ansi(color, std::io::stderr().is_terminal()))
            .with_target(show_target)
            .with_writer(std::io::stderr)
            .try_init(),
        LogFormat::Json => tracing_subscriber::fmt()
            .with_env_filter(filter)
            .json()
            .with_target(show_target)
            .with_writer(std::io::stderr)
            .try_init(),
    };
    if installed.is_err() {
        tracing::debug!("global subscriber already installed");
    }
}
