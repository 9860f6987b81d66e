//! Stale-while-revalidate read path over the product cache.
//!
//! A cache entry moves through four states: empty, fresh (within the soft
//! expiry), stale (served, but refetched in the background), and expired
//! (refetched before serving). Background refetches are fire-and-forget;
//! if two race, the last write wins and both wrote the same upstream data.

use chrono::Utc;
use sparkle_core::types::Product;

use crate::api::{ApiClient, ProductQuery};
use crate::error::{ClientError, Result};
use crate::product_cache::{CACHE_VERSION, HARD_EXPIRY_MS, ProductCache, SOFT_EXPIRY_MS};

/// Lifecycle state of one cache entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheState {
    Empty,
    Fresh,
    Stale,
    Expired,
}

/// Cached product reads backed by the proxy.
#[derive(Clone)]
pub struct CatalogCache {
    cache: ProductCache,
    api: ApiClient,
}

impl CatalogCache {
    #[must_use]
    pub fn new(cache: ProductCache, api: ApiClient) -> Self {
        Self { cache, api }
    }

    #[must_use]
    pub fn cache(&self) -> &ProductCache {
        &self.cache
    }

    /// State of the entry for `key` at `now_ms`.
    #[must_use]
    pub fn state(&self, key: &str, now_ms: i64) -> CacheState {
        match self.cache.cache_info(key, now_ms) {
            None => CacheState::Empty,
            Some(info) if info.version != CACHE_VERSION || info.age_ms > HARD_EXPIRY_MS => {
                CacheState::Expired
            }
            Some(info) if info.age_ms > SOFT_EXPIRY_MS => CacheState::Stale,
            Some(_) => CacheState::Fresh,
        }
    }

    /// Products for `query`, served from cache when possible.
    ///
    /// Fresh entries are returned as-is. Stale entries are returned
    /// immediately while a background task refetches. Empty or expired
    /// entries block on the fetch.
    pub async fn products(&self, query: &ProductQuery) -> Result<Vec<Product>> {
        let key = query.cache_key();
        let now_ms = Utc::now().timestamp_millis();

        match self.state(&key, now_ms) {
            CacheState::Fresh => {
                if let Some(products) = self.cache.get(&key, now_ms) {
                    tracing::debug!(key, "Serving fresh cached products");
                    return Ok(products);
                }
                self.fetch_and_store(query).await
            }
            CacheState::Stale => {
                let Some(products) = self.cache.get(&key, now_ms) else {
                    return self.fetch_and_store(query).await;
                };
                tracing::debug!(key, "Serving stale products, refreshing in background");
                let this = self.clone();
                let query = query.clone();
                tokio::spawn(async move {
                    if let Err(e) = this.fetch_and_store(&query).await {
                        tracing::warn!(error = %e, "Background product refresh failed");
                    }
                });
                Ok(products)
            }
            CacheState::Empty | CacheState::Expired => self.fetch_and_store(query).await,
        }
    }

    /// Fetch from the proxy and overwrite the cache entry.
    pub async fn fetch_and_store(&self, query: &ProductQuery) -> Result<Vec<Product>> {
        let response = self.api.products(query).await?;
        if !response.success {
            return Err(ClientError::Api(
                response
                    .error
                    .unwrap_or_else(|| "Product fetch failed".to_string()),
            ));
        }

        let now_ms = Utc::now().timestamp_millis();
        self.cache.set(&query.cache_key(), &response.products, now_ms);
        Ok(response.products)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::store::{KeyValueStore, MemoryStore};

    fn catalog() -> CatalogCache {
        CatalogCache::new(
            ProductCache::new(Arc::new(MemoryStore::new())),
            ApiClient::new("http://localhost:3001"),
        )
    }

    #[test]
    fn state_tracks_entry_lifecycle() {
        let catalog = catalog();
        assert_eq!(catalog.state("all", 0), CacheState::Empty);

        catalog.cache().set("all", &[], 0);
        assert_eq!(catalog.state("all", 1), CacheState::Fresh);
        assert_eq!(catalog.state("all", SOFT_EXPIRY_MS + 1), CacheState::Stale);
        assert_eq!(catalog.state("all", HARD_EXPIRY_MS + 1), CacheState::Expired);

        catalog.cache().clear(Some("all"));
        assert_eq!(catalog.state("all", 1), CacheState::Empty);
    }

    #[test]
    fn version_mismatch_counts_as_expired() {
        let store = Arc::new(MemoryStore::new());
        store
            .set(
                "sparkle_products_cache_all",
                r#"{"products":[],"timestamp":0,"version":"0.9.0"}"#,
            )
            .unwrap();
        let catalog = CatalogCache::new(
            ProductCache::new(store),
            ApiClient::new("http://localhost:3001"),
        );
        assert_eq!(catalog.state("all", 1), CacheState::Expired);
    }
}
