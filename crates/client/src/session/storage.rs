//! Durable key-value storage backing the session.
//!
//! [`FileStore`] keeps every key in one JSON object on disk and replaces
//! the whole file on each write. [`MemoryStore`] is the same map without
//! persistence.

use std::collections::BTreeMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use thiserror::Error;
use tracing::{debug, warn};

/// Storage operation errors.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

/// String-keyed storage with whole-record writes.
pub trait KeyValueStore: Send + Sync {
    /// Read a key; `None` when absent.
    ///
    /// # Errors
    ///
    /// Returns error if the underlying medium cannot be read.
    fn get(&self, key: &str) -> StorageResult<Option<String>>;

    /// Write a key, replacing any previous value.
    ///
    /// # Errors
    ///
    /// Returns error if the write cannot be persisted.
    fn set(&self, key: &str, value: &str) -> StorageResult<()>;

    /// Write several keys in a single write.
    ///
    /// # Errors
    ///
    /// Returns error if the write cannot be persisted; no key is written.
    fn set_all(&self, entries: &[(&str, &str)]) -> StorageResult<()>;

    /// Remove several keys in a single write.
    ///
    /// # Errors
    ///
    /// Returns error if the write cannot be persisted.
    fn remove_all(&self, keys: &[&str]) -> StorageResult<()>;
}

// =============================================================================
// MemoryStore
// =============================================================================

/// Non-persistent storage, used by tests and one-shot runs.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<BTreeMap<String, String>>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> StorageResult<Option<String>> {
        let entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(entries.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> StorageResult<()> {
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        entries.insert(key.to_owned(), value.to_owned());
        Ok(())
    }

    fn set_all(&self, pairs: &[(&str, &str)]) -> StorageResult<()> {
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        for (key, value) in pairs {
            entries.insert((*key).to_owned(), (*value).to_owned());
        }
        Ok(())
    }

    fn remove_all(&self, keys: &[&str]) -> StorageResult<()> {
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        for key in keys {
            entries.remove(*key);
        }
        Ok(())
    }
}

// =============================================================================
// FileStore
// =============================================================================

/// JSON-file storage.
///
/// The file holds a flat `{ "key": "value" }` object. Writes go to a
/// sibling temp file that is then renamed over the original, so readers
/// never observe a half-written map.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    lock: Mutex<()>,
}

impl FileStore {
    /// Create storage at `path`. The file and its parent directory are
    /// created on first write.
    pub fn with_path(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    /// Location of the backing file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_map(&self) -> StorageResult<BTreeMap<String, String>> {
        match fs::read_to_string(&self.path) {
            Ok(content) if content.trim().is_empty() => Ok(BTreeMap::new()),
            Ok(content) => Ok(serde_json::from_str(&content)?),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(BTreeMap::new()),
            Err(e) => Err(e.into()),
        }
    }

    fn write_map(&self, map: &BTreeMap<String, String>) -> StorageResult<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }

        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, serde_json::to_string_pretty(map)?)?;
        fs::rename(&tmp, &self.path)?;

        debug!(path = ?self.path, keys = map.len(), "Saved local storage");
        Ok(())
    }

    fn update(&self, f: impl FnOnce(&mut BTreeMap<String, String>)) -> StorageResult<()> {
        let _guard = self.lock.lock().unwrap_or_else(PoisonError::into_inner);
        let mut map = match self.read_map() {
            Ok(map) => map,
            Err(StorageError::Serialization(e)) => {
                warn!(path = ?self.path, error = %e, "Discarding unreadable local storage");
                BTreeMap::new()
            }
            Err(e) => return Err(e),
        };
        f(&mut map);
        self.write_map(&map)
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> StorageResult<Option<String>> {
        let _guard = self.lock.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(self.read_map()?.remove(key))
    }

    fn set(&self, key: &str, value: &str) -> StorageResult<()> {
        self.update(|map| {
            map.insert(key.to_owned(), value.to_owned());
        })
    }

    fn set_all(&self, entries: &[(&str, &str)]) -> StorageResult<()> {
        self.update(|map| {
            for (key, value) in entries {
                map.insert((*key).to_owned(), (*value).to_owned());
            }
        })
    }

    fn remove_all(&self, keys: &[&str]) -> StorageResult<()> {
        self.update(|map| {
            for key in keys {
                map.remove(*key);
            }
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir()
            .join(format!("food-delivery-storage-{}-{name}", std::process::id()))
            .join("local-storage.json")
    }

    #[test]
    fn test_memory_store_set_get_remove() {
        let store = MemoryStore::new();
        assert_eq!(store.get("sessionId").unwrap(), None);

        store.set("sessionId", "abc").unwrap();
        store.set("other", "x").unwrap();
        assert_eq!(store.get("sessionId").unwrap().as_deref(), Some("abc"));

        store.remove_all(&["sessionId", "missing"]).unwrap();
        assert_eq!(store.get("sessionId").unwrap(), None);
        assert_eq!(store.get("other").unwrap().as_deref(), Some("x"));
    }

    #[test]
    fn test_file_store_persists_across_instances() {
        let path = temp_path("persist");
        let _ = fs::remove_file(&path);

        FileStore::with_path(&path).set("sessionId", "s-1").unwrap();

        let reopened = FileStore::with_path(&path);
        assert_eq!(reopened.get("sessionId").unwrap().as_deref(), Some("s-1"));

        reopened.remove_all(&["sessionId"]).unwrap();
        assert_eq!(FileStore::with_path(&path).get("sessionId").unwrap(), None);

        let _ = fs::remove_dir_all(path.parent().unwrap());
    }

    #[test]
    fn test_file_store_missing_file_is_empty() {
        let store = FileStore::with_path(temp_path("missing"));
        assert_eq!(store.get("currentUser").unwrap(), None);
    }

    #[test]
    fn test_file_store_corrupt_file_is_error() {
        let path = temp_path("corrupt");
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, "not json").unwrap();

        let store = FileStore::with_path(&path);
        assert!(matches!(
            store.get("sessionId"),
            Err(StorageError::Serialization(_))
        ));

        let _ = fs::remove_dir_all(path.parent().unwrap());
    }

    #[test]
    fn test_file_store_overwrites_corrupt_file() {
        let path = temp_path("recover");
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, "{garbage").unwrap();

        let store = FileStore::with_path(&path);
        store.set("sessionId", "s-2").unwrap();
        assert_eq!(store.get("sessionId").unwrap().as_deref(), Some("s-2"));

        fs::write(&path, "{garbage").unwrap();
        store.remove_all(&["sessionId", "currentUser"]).unwrap();
        assert_eq!(store.get("sessionId").unwrap(), None);

        let _ = fs::remove_dir_all(path.parent().unwrap());
    }

    #[test]
    fn test_set_all_writes_every_key() {
        let path = temp_path("set-all");
        let _ = fs::remove_file(&path);

        let pairs = [("sessionId", "s-3"), ("currentUser", "{}")];
        FileStore::with_path(&path).set_all(&pairs).unwrap();
        let memory = MemoryStore::new();
        memory.set_all(&pairs).unwrap();

        let reopened = FileStore::with_path(&path);
        for (key, value) in pairs {
            assert_eq!(reopened.get(key).unwrap().as_deref(), Some(value));
            assert_eq!(memory.get(key).unwrap().as_deref(), Some(value));
        }

        let _ = fs::remove_dir_all(path.parent().unwrap());
    }
}
