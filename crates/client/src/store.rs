//! Pluggable key-value persistence.
//!
//! Every client service writes through a [`KeyValueStore`] so the same
//! logic runs against browser-style storage, a file on disk, or plain
//! memory in tests. Stores are string-to-string; callers serialize.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Mutex;

use thiserror::Error;

/// Storage failure modes.
///
/// `QuotaExceeded` is the one callers branch on: the product cache clears
/// itself and retries a write once when it hits the quota.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Storage quota exceeded")]
    QuotaExceeded,
    #[error("Storage I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// String key-value storage with prefix listing.
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&self, key: &str, value: &str) -> Result<(), StoreError>;
    fn remove(&self, key: &str);
    /// All stored keys starting with `prefix`.
    fn keys_with_prefix(&self, prefix: &str) -> Vec<String>;
}

/// In-memory store. An optional byte capacity makes `set` fail with
/// `QuotaExceeded` once the total stored size would exceed it.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, String>>,
    capacity: Option<usize>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            capacity: Some(capacity),
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<String, String>> {
        match self.entries.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.lock().get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let mut entries = self.lock();
        if let Some(capacity) = self.capacity {
            let current: usize = entries
                .iter()
                .filter(|(k, _)| k.as_str() != key)
                .map(|(k, v)| k.len() + v.len())
                .sum();
            if current + key.len() + value.len() > capacity {
                return Err(StoreError::QuotaExceeded);
            }
        }
        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) {
        self.lock().remove(key);
    }

    fn keys_with_prefix(&self, prefix: &str) -> Vec<String> {
        self.lock()
            .keys()
            .filter(|k| k.starts_with(prefix))
            .cloned()
            .collect()
    }
}

/// One file per key under a directory. Keys are used as file names
/// directly, so callers must stick to the `sparkle_*` key convention.
#[derive(Debug)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(key)
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Option<String> {
        std::fs::read_to_string(self.path_for(key)).ok()
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        std::fs::create_dir_all(&self.dir)?;
        std::fs::write(self.path_for(key), value)?;
        Ok(())
    }

    fn remove(&self, key: &str) {
        if let Err(e) = std::fs::remove_file(self.path_for(key)) {
            if e.kind() != std::io::ErrorKind::NotFound {
                tracing::warn!(key, error = %e, "Failed to remove stored key");
            }
        }
    }

    fn keys_with_prefix(&self, prefix: &str) -> Vec<String> {
        let Ok(entries) = std::fs::read_dir(&self.dir) else {
            return Vec::new();
        };
        entries
            .filter_map(|entry| {
                let name = entry.ok()?.file_name().into_string().ok()?;
                name.starts_with(prefix).then_some(name)
            })
            .collect()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn memory_store_round_trips() {
        let store = MemoryStore::new();
        store.set("sparkle_cart", "[]").unwrap();
        assert_eq!(store.get("sparkle_cart").as_deref(), Some("[]"));
        store.remove("sparkle_cart");
        assert!(store.get("sparkle_cart").is_none());
    }

    #[test]
    fn memory_store_enforces_capacity() {
        let store = MemoryStore::with_capacity(20);
        store.set("a", "short").unwrap();
        let err = store.set("b", "a much longer value that will not fit");
        assert!(matches!(err, Err(StoreError::QuotaExceeded)));
        // Overwriting an existing key within capacity still works
        store.set("a", "tiny").unwrap();
    }

    #[test]
    fn memory_store_lists_prefixed_keys() {
        let store = MemoryStore::new();
        store.set("sparkle_products_cache_all", "{}").unwrap();
        store.set("sparkle_products_cache_timestamp_all", "1").unwrap();
        store.set("sparkle_cart", "[]").unwrap();

        let mut keys = store.keys_with_prefix("sparkle_products_cache");
        keys.sort();
        assert_eq!(
            keys,
            vec![
                "sparkle_products_cache_all",
                "sparkle_products_cache_timestamp_all"
            ]
        );
    }

    #[test]
    fn file_store_persists_across_instances() {
        let dir = tempfile::tempdir().unwrap();
        {
            let store = FileStore::new(dir.path());
            store.set("sparkle_user", r#"{"email":"a@b.c"}"#).unwrap();
        }
        let store = FileStore::new(dir.path());
        assert_eq!(
            store.get("sparkle_user").as_deref(),
            Some(r#"{"email":"a@b.c"}"#)
        );
        assert!(store.get("missing").is_none());
    }
}
