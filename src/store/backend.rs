//! Storage backends: in-memory and file-backed.

use std::collections::HashMap;
use std::io::Write;
use std::path::PathBuf;
use std::sync::{Arc, Mutex, PoisonError};

use crate::error::StoreError;

use super::StorageBackend;

// ---------------------------------------------------------------------------
// Memory
// ---------------------------------------------------------------------------

#[derive(Debug, Default)]
struct MemoryInner {
    items: HashMap<String, String>,
    quota: Option<usize>,
    unavailable: bool,
}

/// Shared in-memory storage.
///
/// Clones share the same map, so a clone handed to a second page sees the
/// first page's writes, like two loads against the same browser storage.
#[derive(Debug, Clone, Default)]
pub struct MemoryBackend {
    inner: Arc<Mutex<MemoryInner>>,
}

impl MemoryBackend {
    /// Creates an empty, unlimited backend.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a backend that rejects writes once stored values would exceed
    /// `quota` bytes in total.
    #[must_use]
    pub fn with_quota(quota: usize) -> Self {
        let backend = Self::default();
        backend.lock().quota = Some(quota);
        backend
    }

    /// Makes every operation fail, simulating disabled storage.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.lock().unavailable = unavailable;
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, MemoryInner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl StorageBackend for MemoryBackend {
    fn get_item(&self, key: &str) -> Result<Option<String>, StoreError> {
        let inner = self.lock();
        if inner.unavailable {
            return Err(StoreError::Unavailable("memory backend disabled".into()));
        }
        Ok(inner.items.get(key).cloned())
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let mut inner = self.lock();
        if inner.unavailable {
            return Err(StoreError::Unavailable("memory backend disabled".into()));
        }
        if let Some(quota) = inner.quota {
            let others: usize = inner
                .items
                .iter()
                .filter(|(k, _)| k.as_str() != key)
                .map(|(_, v)| v.len())
                .sum();
            let needed = others + value.len();
            if needed > quota {
                return Err(StoreError::QuotaExceeded { needed, quota });
            }
        }
        inner.items.insert(key.to_owned(), value.to_owned());
        Ok(())
    }

    fn remove_item(&self, key: &str) -> Result<(), StoreError> {
        let mut inner = self.lock();
        if inner.unavailable {
            return Err(StoreError::Unavailable("memory backend disabled".into()));
        }
        inner.items.remove(key);
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// File
// ---------------------------------------------------------------------------

/// Directory-backed storage: one `<key>.json` file per key.
///
/// Writes go through a temp file in the same directory and are renamed into
/// place, so a concurrent reader sees either the old record or the new one.
#[derive(Debug, Clone)]
pub struct FileBackend {
    dir: PathBuf,
}

impl FileBackend {
    /// Creates a backend rooted at `dir`. The directory is created on first write.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Returns the file that holds `key`.
    #[must_use]
    pub fn path_for(&self, key: &str) -> PathBuf {
        let name: String = key
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
            .collect();
        self.dir.join(format!("{name}.json"))
    }
}

impl StorageBackend for FileBackend {
    fn get_item(&self, key: &str) -> Result<Option<String>, StoreError> {
        match std::fs::read_to_string(self.path_for(key)) {
            Ok(contents) => Ok(Some(contents)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), StoreError> {
        std::fs::create_dir_all(&self.dir)?;
        let mut tmp = tempfile::NamedTempFile::new_in(&self.dir)?;
        tmp.write_all(value.as_bytes())?;
        tmp.flush()?;
        tmp.persist(self.path_for(key)).map_err(|e| e.error)?;
        Ok(())
    }

    fn remove_item(&self, key: &str) -> Result<(), StoreError> {
        match std::fs::remove_file(self.path_for(key)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_clones_share_items() {
        let a = MemoryBackend::new();
        let b = a.clone();
        a.set_item("k", "v").unwrap();
        assert_eq!(b.get_item("k").unwrap().as_deref(), Some("v"));
        b.remove_item("k").unwrap();
        assert_eq!(a.get_item("k").unwrap(), None);
    }

    #[test]
    fn memory_quota_counts_replacement_once() {
        let backend = MemoryBackend::with_quota(8);
        backend.set_item("k", "12345678").unwrap();
        // Replacing the same key does not double-count the old value.
        backend.set_item("k", "87654321").unwrap();
        let err = backend.set_item("other", "x").unwrap_err();
        assert!(matches!(err, StoreError::QuotaExceeded { needed: 9, quota: 8 }));
    }

    #[test]
    fn memory_unavailable_fails_everything() {
        let backend = MemoryBackend::new();
        backend.set_unavailable(true);
        assert!(backend.get_item("k").is_err());
        assert!(backend.set_item("k", "v").is_err());
        assert!(backend.remove_item("k").is_err());
    }

    #[test]
    fn file_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let backend = FileBackend::new(dir.path().join("state"));
        assert_eq!(backend.get_item("bar_sanctuary_state").unwrap(), None);

        backend.set_item("bar_sanctuary_state", "{\"phase\":1}").unwrap();
        assert_eq!(
            backend.get_item("bar_sanctuary_state").unwrap().as_deref(),
            Some("{\"phase\":1}")
        );
        assert!(backend.path_for("bar_sanctuary_state").exists());

        backend.remove_item("bar_sanctuary_state").unwrap();
        assert_eq!(backend.get_item("bar_sanctuary_state").unwrap(), None);
        // Removing twice is fine.
        backend.remove_item("bar_sanctuary_state").unwrap();
    }

    #[test]
    fn file_key_is_sanitized() {
        let backend = FileBackend::new("/tmp/x");
        assert_eq!(
            backend.path_for("../escape/key"),
            PathBuf::from("/tmp/x/___escape_key.json")
        );
    }

    #[test]
    fn file_overwrite_leaves_no_temp_files() {
        let dir = tempfile::tempdir().unwrap();
        let backend = FileBackend::new(dir.path());
        backend.set_item("k", "first").unwrap();
        backend.set_item("k", "second").unwrap();
        let entries: Vec<_> = std::fs::read_dir(dir.path()).unwrap().collect();
        assert_eq!(entries.len(), 1);
        assert_eq!(backend.get_item("k").unwrap().as_deref(), Some("second"));
    }
}
