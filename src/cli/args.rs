//! CLI argument definitions
//!
//! All Clap derive structs for `sanctuary` command-line parsing.

use std::path::PathBuf;
use std::time::Duration;

use clap::{ArgAction, Args, Parser, Subcommand, ValueEnum};

use crate::observability::LogFormat;

// ============================================================================
// Root CLI
// ============================================================================

/// Headless driver for the BAR Sanctuary narrative engine.
#[derive(Parser, Debug)]
#[command(name = "sanctuary", author, version, about)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,

    /// Increase verbosity (-v info, -vv debug, -vvv trace).
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all non-error output.
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Color output control.
    #[arg(long, default_value = "auto", global = true, env = "SANCTUARY_COLOR")]
    pub color: ColorChoice,

    /// Log line format on stderr.
    #[arg(long, default_value = "human", global = true, env = "SANCTUARY_LOG_FORMAT")]
    pub log_format: LogFormat,
}

// ============================================================================
// Top-Level Commands
// ============================================================================

/// Top-level subcommands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Load a page and play a session script against it.
    Play(PlayArgs),

    /// Inspect or clear the stored session record.
    State(StateCommand),

    /// Display version information.
    Version(VersionArgs),
}

// ============================================================================
// Shared Arguments
// ============================================================================

/// Where the session record lives and how the narrative is configured.
#[derive(Args, Debug, Clone)]
pub struct SessionArgs {
    /// Directory holding the session record.
    #[arg(long, env = "SANCTUARY_STATE_DIR")]
    pub state_dir: PathBuf,

    /// Path to a YAML narrative configuration file.
    #[arg(short, long, env = "SANCTUARY_CONFIG")]
    pub config: Option<PathBuf>,
}

// ============================================================================
// Play Command
// ============================================================================

/// Arguments for `play`.
#[derive(Args, Debug)]
pub struct PlayArgs {
    /// Storage and configuration.
    #[command(flatten)]
    pub session: SessionArgs,

    /// Location path of the page to load.
    #[arg(long, default_value = "/index.html")]
    pub page: String,

    /// Document title of the page to load.
    #[arg(long, default_value = "BAR Sanctuary")]
    pub title: String,

    /// Session script to play (`-` reads stdin). Without one, only the
    /// page load runs.
    #[arg(short, long)]
    pub script: Option<PathBuf>,

    /// Keep the page alive this long after the script so scheduled effects
    /// can fire.
    #[arg(long, default_value = "0s", value_parser = humantime::parse_duration)]
    pub linger: Duration,

    /// Write the JSONL event stream to this file instead of stdout.
    #[arg(long)]
    pub events: Option<PathBuf>,
}

// ============================================================================
// State Command
// ============================================================================

/// Session record management.
#[derive(Args, Debug)]
pub struct StateCommand {
    /// State subcommand.
    #[command(subcommand)]
    pub subcommand: StateSubcommand,
}

/// State subcommands.
#[derive(Subcommand, Debug)]
pub enum StateSubcommand {
    /// Print the stored session record as JSON.
    Show(SessionArgs),

    /// Remove the stored session record.
    Reset(SessionArgs),
}

// ============================================================================
// Version
// ============================================================================

/// Arguments for version display.
#[derive(Args, Debug)]
pub struct VersionArgs {
    /// Output format.
    #[arg(short, long, default_value = "human")]
    pub format: OutputFormat,
}

// ============================================================================
// CLI-Local Enums
// ============================================================================

/// Color output choice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum ColorChoice {
    /// Auto-detect terminal support.
    #[default]
    Auto,
    /// Always use color.
    Always,
    /// Never use color.
    Never,
}

/// Output format for structured output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable output.
    #[default]
    Human,
    /// JSON output.
    Json,
}

// ============================================================================
// Tests
// ============================================================================
