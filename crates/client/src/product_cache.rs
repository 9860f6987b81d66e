//! Persistent product cache.
//!
//! Snapshots of product listings are stored per query key with a version
//! tag and a write timestamp. Entries older than the hard expiry (24 h) or
//! written by a different cache version are dropped on read; entries older
//! than the soft expiry (6 h) are still served but flagged for refresh.
//!
//! All reads and writes take the current time in epoch milliseconds so the
//! expiry logic is deterministic under test.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use sparkle_core::types::Product;

use crate::store::{KeyValueStore, StoreError};

/// Bump to invalidate every existing cache entry on rollout.
pub const CACHE_VERSION: &str = "1.0.0";

/// Entries older than this are dropped on read.
pub const HARD_EXPIRY_MS: i64 = 24 * 60 * 60 * 1000;

/// Entries older than this are served but should be refreshed.
pub const SOFT_EXPIRY_MS: i64 = 6 * 60 * 60 * 1000;

const KEY_PREFIX: &str = "sparkle_products_cache_";
const TIMESTAMP_PREFIX: &str = "sparkle_products_cache_timestamp_";

#[derive(Debug, Serialize, Deserialize)]
struct CacheData {
    products: Vec<Product>,
    timestamp: i64,
    version: String,
}

/// Debug summary of one cache entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheInfo {
    pub count: usize,
    pub age_ms: i64,
    pub version: String,
}

#[derive(Clone)]
pub struct ProductCache {
    store: Arc<dyn KeyValueStore>,
}

impl ProductCache {
    #[must_use]
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    fn data_key(key: &str) -> String {
        format!("{KEY_PREFIX}{key}")
    }

    fn timestamp_key(key: &str) -> String {
        format!("{TIMESTAMP_PREFIX}{key}")
    }

    /// Cached products for `key`, or `None` when the entry is missing,
    /// corrupt, version-mismatched, or past the hard expiry. Unusable
    /// entries are cleared on the way out.
    #[must_use]
    pub fn get(&self, key: &str, now_ms: i64) -> Option<Vec<Product>> {
        let raw = self.store.get(&Self::data_key(key))?;
        let data: CacheData = match serde_json::from_str(&raw) {
            Ok(data) => data,
            Err(e) => {
                tracing::warn!(key, error = %e, "Corrupt product cache entry, clearing");
                self.clear(Some(key));
                return None;
            }
        };

        if data.version != CACHE_VERSION {
            tracing::info!(key, version = %data.version, "Cache version mismatch, clearing");
            self.clear(Some(key));
            return None;
        }
        if now_ms - data.timestamp > HARD_EXPIRY_MS {
            tracing::info!(key, "Product cache entry expired, clearing");
            self.clear(Some(key));
            return None;
        }

        Some(data.products)
    }

    /// Store a snapshot. On quota exhaustion every product cache entry is
    /// cleared and the write retried once; a second failure is logged and
    /// swallowed, the cache is best-effort.
    pub fn set(&self, key: &str, products: &[Product], now_ms: i64) {
        let data = CacheData {
            products: products.to_vec(),
            timestamp: now_ms,
            version: CACHE_VERSION.to_string(),
        };
        let Ok(serialized) = serde_json::to_string(&data) else {
            return;
        };

        match self.write_entry(key, &serialized, now_ms) {
            Ok(()) => {}
            Err(StoreError::QuotaExceeded) => {
                tracing::warn!(key, "Storage quota exceeded, clearing product cache");
                self.clear(None);
                if let Err(e) = self.write_entry(key, &serialized, now_ms) {
                    tracing::warn!(key, error = %e, "Product cache write failed after clearing");
                }
            }
            Err(e) => tracing::warn!(key, error = %e, "Product cache write failed"),
        }
    }

    fn write_entry(&self, key: &str, serialized: &str, now_ms: i64) -> Result<(), StoreError> {
        self.store.set(&Self::data_key(key), serialized)?;
        self.store
            .set(&Self::timestamp_key(key), &now_ms.to_string())?;
        Ok(())
    }

    /// Whether the entry is past the soft expiry. Missing or unreadable
    /// timestamps count as stale.
    #[must_use]
    pub fn should_refresh(&self, key: &str, now_ms: i64) -> bool {
        self.store
            .get(&Self::timestamp_key(key))
            .and_then(|raw| raw.parse::<i64>().ok())
            .is_none_or(|timestamp| now_ms - timestamp > SOFT_EXPIRY_MS)
    }

    /// Clear one entry, or every product cache entry when `key` is `None`.
    pub fn clear(&self, key: Option<&str>) {
        match key {
            Some(key) => {
                self.store.remove(&Self::data_key(key));
                self.store.remove(&Self::timestamp_key(key));
            }
            None => {
                for stored in self.store.keys_with_prefix(KEY_PREFIX) {
                    self.store.remove(&stored);
                }
            }
        }
    }

    /// Debug summary of one entry, `None` when absent or unreadable.
    #[must_use]
    pub fn cache_info(&self, key: &str, now_ms: i64) -> Option<CacheInfo> {
        let raw = self.store.get(&Self::data_key(key))?;
        let data: CacheData = serde_json::from_str(&raw).ok()?;
        Some(CacheInfo {
            count: data.products.len(),
            age_ms: now_ms - data.timestamp,
            version: data.version,
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    fn sample_products(n: usize) -> Vec<Product> {
        (0..n)
            .map(|i| Product {
                id: format!("gid://shopify/Product/{i}"),
                title: format!("Product {i}"),
                price: 100.0,
                ..Product::default()
            })
            .collect()
    }

    fn cache() -> ProductCache {
        ProductCache::new(Arc::new(MemoryStore::new()))
    }

    #[test]
    fn fresh_entry_is_served() {
        let cache = cache();
        cache.set("all", &sample_products(3), 1_000);
        let products = cache.get("all", 2_000).unwrap();
        assert_eq!(products.len(), 3);
        assert!(!cache.should_refresh("all", 2_000));
    }

    #[test]
    fn entry_past_hard_expiry_is_cleared() {
        let cache = cache();
        cache.set("all", &sample_products(1), 0);
        assert!(cache.get("all", HARD_EXPIRY_MS + 1).is_none());
        // The clear is persistent, not just a filtered read
        assert!(cache.cache_info("all", HARD_EXPIRY_MS + 1).is_none());
    }

    #[test]
    fn entry_past_soft_expiry_is_served_but_stale() {
        let cache = cache();
        cache.set("all", &sample_products(1), 0);
        let now = SOFT_EXPIRY_MS + 1;
        assert!(cache.get("all", now).is_some());
        assert!(cache.should_refresh("all", now));
    }

    #[test]
    fn corrupt_entry_is_cleared() {
        let store = Arc::new(MemoryStore::new());
        store.set("sparkle_products_cache_all", "not json").unwrap();
        let cache = ProductCache::new(store);
        assert!(cache.get("all", 0).is_none());
        assert!(cache.cache_info("all", 0).is_none());
    }

    #[test]
    fn version_mismatch_clears_entry() {
        let store = Arc::new(MemoryStore::new());
        store
            .set(
                "sparkle_products_cache_all",
                r#"{"products":[],"timestamp":0,"version":"0.9.0"}"#,
            )
            .unwrap();
        let cache = ProductCache::new(store);
        assert!(cache.get("all", 0).is_none());
    }

    #[test]
    fn quota_exceeded_clears_and_retries_once() {
        // Capacity fits one snapshot but not two; the 2000-char descriptions
        // dominate the entry size
        let store = Arc::new(MemoryStore::with_capacity(6_000));
        let cache = ProductCache::new(Arc::clone(&store) as Arc<dyn KeyValueStore>);

        let mut products = sample_products(2);
        for product in &mut products {
            product.description = "x".repeat(2_000);
        }

        cache.set("all", &products, 0);
        assert!(cache.get("all", 1).is_some());

        cache.set("cat:tools", &products, 0);
        // The older entry was evicted to make room
        assert!(cache.get("cat:tools", 1).is_some());
        assert!(cache.get("all", 1).is_none());
    }

    #[test]
    fn clear_all_removes_every_entry() {
        let cache = cache();
        cache.set("all", &sample_products(1), 0);
        cache.set("cat:tools", &sample_products(1), 0);
        cache.clear(None);
        assert!(cache.get("all", 1).is_none());
        assert!(cache.get("cat:tools", 1).is_none());
        assert!(cache.should_refresh("all", 1));
    }

    #[test]
    fn cache_info_reports_age_and_count() {
        let cache = cache();
        cache.set("all", &sample_products(5), 1_000);
        let info = cache.cache_info("all", 6_000).unwrap();
        assert_eq!(info.count, 5);
        assert_eq!(info.age_ms, 5_000);
        assert_eq!(info.version, CACHE_VERSION);
    }
}
