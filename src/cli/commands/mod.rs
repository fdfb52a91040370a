//! CLI command dispatch and handlers
//!
//! Routes parsed CLI arguments to the appropriate command handler.

pub mod play;
pub mod state;
pub mod version;

use std::path::Path;

use crate::cli::args::{Cli, Commands, StateSubcommand};
use crate::config::{self, NarrativeConfig};
use crate::error::SanctuaryError;

/// Dispatch a parsed CLI invocation to the appropriate command handler.
///
/// # Errors
///
/// Returns an error if the dispatched command handler fails.
pub async fn dispatch(cli: Cli) -> Result<(), SanctuaryError> {
    match cli.command {
        Commands::Play(args) => play::run(&args).await,
        Commands::State(cmd) => match cmd.subcommand {
            StateSubcommand::Show(args) => state::show(&args),
            StateSubcommand::Reset(args) => state::reset(&args),
        },
        Commands::Version(args) => {
            version::run(&args);
            Ok(())
        }
    }
}

/// Loads and validates the narrative configuration, or the defaults.
fn load_config(path: Option<&Path>) -> Result<NarrativeConfig, SanctuaryError> {
    let config = config::load_or_default(path)?;
    config::validate(&config)?;
    Ok(config)
}
