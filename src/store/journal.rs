//! Bounded action log kept inside the session record.

use super::StateStore;

/// Appends `[HH:MM:SS] message` entries to the session record.
///
/// Timestamps are UTC wall-clock time from the store's clock. When the log
/// is full the oldest entry is evicted before appending.
#[derive(Debug, Clone, Copy)]
pub struct ActionLog<'a> {
    store: &'a StateStore,
    capacity: usize,
}

impl<'a> ActionLog<'a> {
    /// Creates a log over `store` holding at most `capacity` entries.
    #[must_use]
    pub const fn new(store: &'a StateStore, capacity: usize) -> Self {
        Self { store, capacity }
    }

    /// Records `message`.
    pub fn log(&self, message: &str) {
        let stamp = self.store.clock().now().format("%H:%M:%S");
        let entry = format!("[{stamp}] {message}");
        let capacity = self.capacity.max(1);
        self.store.update(|s| {
            while s.actions.len() >= capacity {
                s.actions.pop_front();
            }
            s.actions.push_back(entry);
        });
    }
}
