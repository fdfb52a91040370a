//! Persisted session state
//!
//! One [`SessionState`] record per browsing session, held under a single key
//! in a [`StorageBackend`]. [`StateStore::update`] is the only mutation path
//! the engine uses; there is no locking, so two pages writing the same key
//! resolve as last-writer-wins.
//!
//! Storage failures never escape this module. A record that is missing or
//! unreadable reads back as the defaults, and a failed write leaves the
//! in-memory copy authoritative until a later write succeeds.

pub mod backend;
pub mod journal;

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, PoisonError};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::clock::Clock;
use crate::error::StoreError;
use crate::observability::metrics;
use crate::phase::Phase;

pub use backend::{FileBackend, MemoryBackend};
pub use journal::ActionLog;

/// Key/value storage holding serialized session records.
///
/// Mirrors the shape of browser storage: string keys, string values.
pub trait StorageBackend: Send + Sync {
    /// Returns the value stored under `key`, or `None` if absent.
    ///
    /// # Errors
    ///
    /// Returns a `StoreError` if the storage cannot be read.
    fn get_item(&self, key: &str) -> Result<Option<String>, StoreError>;

    /// Stores `value` under `key`, replacing any previous value.
    ///
    /// # Errors
    ///
    /// Returns a `StoreError` if the value cannot be written.
    fn set_item(&self, key: &str, value: &str) -> Result<(), StoreError>;

    /// Removes `key`. Removing an absent key is not an error.
    ///
    /// # Errors
    ///
    /// Returns a `StoreError` if the storage cannot be modified.
    fn remove_item(&self, key: &str) -> Result<(), StoreError>;
}

/// The persisted progression record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionState {
    /// Current phase; never decreases within a session.
    pub phase: Phase,

    /// Timestamped action log, oldest first.
    #[serde(default)]
    pub actions: VecDeque<String>,

    /// Clicks in the current burst.
    #[serde(default)]
    pub logo_clicks: u32,

    /// Time of the most recent logo click.
    #[serde(
        default,
        with = "chrono::serde::ts_milliseconds_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub last_click_time: Option<DateTime<Utc>>,

    /// When the session record was created.
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub start_time: DateTime<Utc>,
}

impl SessionState {
    /// Creates a fresh record starting at `start_time`.
    #[must_use]
    pub const fn new(start_time: DateTime<Utc>) -> Self {
        Self {
            phase: Phase::Normal,
            actions: VecDeque::new(),
            logo_clicks: 0,
            last_click_time: None,
            start_time,
        }
    }
}

/// In-memory copies the store falls back on when the backend misbehaves.
#[derive(Debug, Default)]
struct Cache {
    /// Record whose last write failed; served instead of the backend.
    unsaved: Option<SessionState>,
    /// Last record read or written successfully; served when a read fails.
    last_known: Option<SessionState>,
}

/// Access point for the session record.
pub struct StateStore {
    backend: Arc<dyn StorageBackend>,
    key: String,
    clock: Arc<dyn Clock>,
    cache: Mutex<Cache>,
}

impl std::fmt::Debug for StateStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StateStore")
            .field("key", &self.key)
            .finish_non_exhaustive()
    }
}

impl StateStore {
    /// Creates a store for `key` on `backend`.
    pub fn new(
        backend: Arc<dyn StorageBackend>,
        key: impl Into<String>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            backend,
            key: key.into(),
            clock,
            cache: Mutex::new(Cache::default()),
        }
    }

    /// Returns the clock used for new records and log timestamps.
    #[must_use]
    pub fn clock(&self) -> &dyn Clock {
        self.clock.as_ref()
    }

    /// Reads the current record.
    ///
    /// Falls back to a fresh record when nothing is stored or the stored
    /// value cannot be parsed. When the backend itself fails, the last record
    /// this store saw is served instead, so a transient outage never restarts
    /// the session.
    #[must_use]
    pub fn get(&self) -> SessionState {
        let mut cache = self.cache();
        if let Some(unsaved) = &cache.unsaved {
            return unsaved.clone();
        }

        let state = match self.backend.get_item(&self.key) {
            Ok(Some(raw)) => match serde_json::from_str(&raw) {
                Ok(state) => state,
                Err(e) => {
                    warn!(
                        key = %self.key,
                        error = %e,
                        "stored session record is corrupt; using defaults"
                    );
                    self.fresh()
                }
            },
            Ok(None) => {
                debug!(key = %self.key, "no stored session record");
                self.fresh()
            }
            Err(e) => {
                metrics::record_storage_failure("read");
                if let Some(known) = &cache.last_known {
                    warn!(
                        key = %self.key,
                        error = %e,
                        "session storage unreadable; using last known record"
                    );
                    return known.clone();
                }
                warn!(key = %self.key, error = %e, "session storage unreadable; using defaults");
                return self.fresh();
            }
        };
        cache.last_known = Some(state.clone());
        state
    }

    /// Writes `state`, best-effort.
    ///
    /// On failure the record is kept in memory and served by [`get`](Self::get)
    /// for the rest of this store's lifetime, or until a write succeeds.
    pub fn save(&self, state: &SessionState) {
        let result = serde_json::to_string(state)
            .map_err(|e| StoreError::Unavailable(e.to_string()))
            .and_then(|raw| self.backend.set_item(&self.key, &raw));

        let mut cache = self.cache();
        match result {
            Ok(()) => cache.unsaved = None,
            Err(e) => {
                warn!(key = %self.key, error = %e, "failed to persist session record");
                metrics::record_storage_failure("write");
                cache.unsaved = Some(state.clone());
            }
        }
        cache.last_known = Some(state.clone());
    }

    /// Reads the record, applies `f`, writes it back and returns `f`'s result.
    ///
    /// The closure mutates the record in place; return whatever the caller
    /// needs from inside the update (a trigger outcome, a snapshot, `()`).
    pub fn update<R>(&self, f: impl FnOnce(&mut SessionState) -> R) -> R {
        let mut state = self.get();
        let out = f(&mut state);
        self.save(&state);
        out
    }

    /// Replaces the record wholesale and returns it.
    pub fn replace(&self, state: SessionState) -> SessionState {
        self.save(&state);
        state
    }

    /// Removes the record, restarting the session.
    pub fn clear(&self) {
        *self.cache() = Cache::default();
        if let Err(e) = self.backend.remove_item(&self.key) {
            warn!(key = %self.key, error = %e, "failed to clear session record");
            metrics::record_storage_failure("clear");
        }
    }

    /// Removes the record, reporting backend failures.
    ///
    /// Used by explicit operator commands where silence would hide a problem.
    ///
    /// # Errors
    ///
    /// Returns the backend's `StoreError`.
    pub fn try_clear(&self) -> Result<(), StoreError> {
        *self.cache() = Cache::default();
        self.backend.remove_item(&self.key)
    }

    fn fresh(&self) -> SessionState {
        SessionState::new(self.clock.now())
    }

    fn cache(&self) -> std::sync::MutexGuard<'_, Cache> {
        self.cache.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
