//! `state show` and `state reset`
//!
//! Operator access to the stored session record. Unlike the engine, these
//! commands report storage and parse failures instead of recovering.

use std::sync::Arc;

use tracing::info;

use crate::cli::args::SessionArgs;
use crate::clock::SystemClock;
use crate::error::SanctuaryError;
use crate::store::{FileBackend, SessionState, StateStore, StorageBackend};

/// Prints the stored record as pretty JSON, or `null` when there is none.
///
/// # Errors
///
/// Returns an error if the configuration is invalid, the record cannot be
/// read, or it is not a valid session record.
pub fn show(args: &SessionArgs) -> Result<(), SanctuaryError> {
    let config = super::load_config(args.config.as_deref())?;
    let backend = FileBackend::new(&args.state_dir);

    match backend.get_item(&config.storage_key)? {
        Some(raw) => {
            let state: SessionState = serde_json::from_str(&raw)?;
            println!("{}", serde_json::to_string_pretty(&state)?);
        }
        None => println!("null"),
    }
    Ok(())
}

/// Removes the stored record.
///
/// # Errors
///
/// Returns an error if the configuration is invalid or the record cannot
/// be removed.
pub fn reset(args: &SessionArgs) -> Result<(), SanctuaryError> {
    let config = super::load_config(args.config.as_deref())?;
    let store = StateStore::new(
        Arc::new(FileBackend::new(&args.state_dir)),
        config.storage_key,
        Arc::new(SystemClock),
    );
    store.try_clear()?;
    info!(dir = %args.state_dir.display(), "session record cleared");
    Ok(())
}
