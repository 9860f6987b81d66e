//! Product catalog with a server-side cache.
//!
//! The whole catalog is fetched in one paginated sweep and cached for 30
//! minutes with `moka`; category, subcategory, and search filters are
//! applied in memory on the cached snapshot.

pub mod classifier;
pub mod fetcher;

use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache;
use sparkle_core::{CollectionRef, Product};

use crate::shopify::{ShopifyError, StorefrontClient};

/// Cache TTL for the product snapshot.
const CACHE_TTL: Duration = Duration::from_secs(30 * 60);

/// Default cap on the number of products fetched.
pub const DEFAULT_MAX_PRODUCTS: usize = 2000;

const SNAPSHOT_KEY: &str = "all";

/// Filters applied to the cached snapshot.
#[derive(Debug, Clone, Default)]
pub struct ProductFilter {
    pub category: Option<String>,
    pub subcategory: Option<String>,
    pub search: Option<String>,
}

impl ProductFilter {
    fn matches(&self, product: &Product) -> bool {
        if let Some(category) = &self.category
            && category != "all"
            && product.category != *category
        {
            return false;
        }
        if let Some(subcategory) = &self.subcategory
            && product.subcategory != *subcategory
        {
            return false;
        }
        if let Some(search) = &self.search {
            let query = search.to_lowercase();
            let in_title = product.title.to_lowercase().contains(&query);
            let in_description = product.description.to_lowercase().contains(&query);
            let in_tags = product
                .tags
                .iter()
                .any(|t| t.to_lowercase().contains(&query));
            if !(in_title || in_description || in_tags) {
                return false;
            }
        }
        true
    }
}

/// The catalog service: cached product snapshot plus pass-through lookups.
#[derive(Clone)]
pub struct CatalogService {
    client: StorefrontClient,
    cache: Cache<&'static str, Arc<Vec<Product>>>,
}

impl CatalogService {
    #[must_use]
    pub fn new(client: StorefrontClient) -> Self {
        let cache = Cache::builder()
            .max_capacity(4)
            .time_to_live(CACHE_TTL)
            .build();
        Self { client, cache }
    }

    /// Get the filtered product list plus whether it was served from cache.
    ///
    /// # Errors
    ///
    /// Returns `ShopifyError` as a string if the snapshot has to be fetched
    /// and the upstream call fails.
    pub async fn products(
        &self,
        max_products: usize,
        filter: &ProductFilter,
    ) -> Result<(Vec<Product>, bool), String> {
        let cached = self.cache.contains_key(SNAPSHOT_KEY);
        if !cached {
            tracing::info!("Fetching fresh products from Shopify");
        }

        let snapshot = self
            .cache
            .try_get_with(SNAPSHOT_KEY, async {
                fetcher::fetch_all(&self.client, max_products)
                    .await
                    .map(Arc::new)
            })
            .await
            .map_err(|e: Arc<ShopifyError>| e.to_string())?;

        let products: Vec<Product> = snapshot
            .iter()
            .filter(|p| filter.matches(p))
            .cloned()
            .collect();

        tracing::debug!(
            total = snapshot.len(),
            returned = products.len(),
            cached,
            "Catalog query"
        );
        Ok((products, cached))
    }

    /// Look up a single product by id, bypassing the snapshot cache.
    ///
    /// # Errors
    ///
    /// Returns `ShopifyError` if the upstream call fails.
    pub async fn product_by_id(&self, id: &str) -> Result<Option<Product>, ShopifyError> {
        fetcher::fetch_by_id(&self.client, id).await
    }

    /// Look up a collection's products by handle.
    ///
    /// # Errors
    ///
    /// Returns `ShopifyError` if the upstream call fails.
    pub async fn collection(
        &self,
        handle: &str,
        first: i64,
    ) -> Result<Option<(CollectionRef, Vec<Product>)>, ShopifyError> {
        fetcher::fetch_collection(&self.client, handle, first).await
    }

    /// Drop the cached snapshot so the next request fetches fresh data.
    pub async fn invalidate(&self) {
        self.cache.invalidate(SNAPSHOT_KEY).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(category: &str, subcategory: &str, title: &str, tags: &[&str]) -> Product {
        Product {
            title: title.to_string(),
            category: category.to_string(),
            subcategory: subcategory.to_string(),
            tags: tags.iter().map(ToString::to_string).collect(),
            ..Product::default()
        }
    }

    #[test]
    fn filter_by_category_ignores_all() {
        let product = sample("cleaning-chemicals", "floor-cleaner", "Floor Cleaner", &[]);

        let all = ProductFilter {
            category: Some("all".to_string()),
            ..ProductFilter::default()
        };
        assert!(all.matches(&product));

        let other = ProductFilter {
            category: Some("cleaning-equipment".to_string()),
            ..ProductFilter::default()
        };
        assert!(!other.matches(&product));
    }

    #[test]
    fn filter_search_covers_title_description_tags() {
        let mut product = sample("cleaning-chemicals", "multi-purpose", "All Purpose", &["citrus"]);
        product.description = "Lemon scented".to_string();

        let by_tag = ProductFilter {
            search: Some("CITRUS".to_string()),
            ..ProductFilter::default()
        };
        assert!(by_tag.matches(&product));

        let by_description = ProductFilter {
            search: Some("lemon".to_string()),
            ..ProductFilter::default()
        };
        assert!(by_description.matches(&product));

        let miss = ProductFilter {
            search: Some("bleach".to_string()),
            ..ProductFilter::default()
        };
        assert!(!miss.matches(&product));
    }

    #[test]
    fn filter_combines_conjunctively() {
        let product = sample("dishwashing", "dish-wash", "Dish Wash", &[]);
        let filter = ProductFilter {
            category: Some("dishwashing".to_string()),
            subcategory: Some("dish-wash".to_string()),
            search: Some("dish".to_string()),
        };
        assert!(filter.matches(&product));

        let wrong_sub = ProductFilter {
            subcategory: Some("bathroom-cleaner".to_string()),
            ..filter
        };
        assert!(!wrong_sub.matches(&product));
    }
}
