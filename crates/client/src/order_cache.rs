//! Persistent order history cache.
//!
//! Single-entry variant of the product cache: one snapshot of the current
//! user's orders. The entry is bound to the user's email, so a different
//! logged-in user gets a clean miss instead of someone else's history.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use sparkle_core::types::Order;

use crate::product_cache::{CACHE_VERSION, HARD_EXPIRY_MS, SOFT_EXPIRY_MS};
use crate::store::KeyValueStore;

const DATA_KEY: &str = "sparkle_orders_cache";
const TIMESTAMP_KEY: &str = "sparkle_orders_cache_timestamp";

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct OrderCacheData {
    orders: Vec<Order>,
    user_email: String,
    timestamp: i64,
    version: String,
}

#[derive(Clone)]
pub struct OrderCache {
    store: Arc<dyn KeyValueStore>,
}

impl OrderCache {
    #[must_use]
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    /// Cached orders for `user_email`. A snapshot belonging to another
    /// user, a version mismatch, or an entry past the hard expiry clears
    /// the cache and misses.
    #[must_use]
    pub fn get(&self, user_email: &str, now_ms: i64) -> Option<Vec<Order>> {
        let raw = self.store.get(DATA_KEY)?;
        let data: OrderCacheData = match serde_json::from_str(&raw) {
            Ok(data) => data,
            Err(e) => {
                tracing::warn!(error = %e, "Corrupt order cache entry, clearing");
                self.clear();
                return None;
            }
        };

        if data.version != CACHE_VERSION || data.user_email != user_email {
            self.clear();
            return None;
        }
        if now_ms - data.timestamp > HARD_EXPIRY_MS {
            tracing::info!("Order cache expired, clearing");
            self.clear();
            return None;
        }

        Some(data.orders)
    }

    pub fn set(&self, orders: &[Order], user_email: &str, now_ms: i64) {
        let data = OrderCacheData {
            orders: orders.to_vec(),
            user_email: user_email.to_string(),
            timestamp: now_ms,
            version: CACHE_VERSION.to_string(),
        };
        let Ok(serialized) = serde_json::to_string(&data) else {
            return;
        };
        if let Err(e) = self.store.set(DATA_KEY, &serialized) {
            tracing::warn!(error = %e, "Order cache write failed");
            return;
        }
        if let Err(e) = self.store.set(TIMESTAMP_KEY, &now_ms.to_string()) {
            tracing::warn!(error = %e, "Order cache timestamp write failed");
        }
    }

    /// Prepend a freshly placed order to the cached snapshot. No-op when
    /// the cache misses for this user.
    pub fn add_order(&self, order: &Order, user_email: &str, now_ms: i64) {
        if let Some(mut orders) = self.get(user_email, now_ms) {
            orders.insert(0, order.clone());
            self.set(&orders, user_email, now_ms);
        }
    }

    /// Replace the cached order with the same id, if present.
    pub fn update_order(&self, order: &Order, user_email: &str, now_ms: i64) {
        if let Some(mut orders) = self.get(user_email, now_ms) {
            let mut changed = false;
            for cached in &mut orders {
                if cached.id == order.id {
                    *cached = order.clone();
                    changed = true;
                }
            }
            if changed {
                self.set(&orders, user_email, now_ms);
            }
        }
    }

    /// Whether the snapshot is past the soft expiry. The user binding is
    /// checked on read, not here.
    #[must_use]
    pub fn should_refresh(&self, now_ms: i64) -> bool {
        self.store
            .get(TIMESTAMP_KEY)
            .and_then(|raw| raw.parse::<i64>().ok())
            .is_none_or(|timestamp| now_ms - timestamp > SOFT_EXPIRY_MS)
    }

    pub fn clear(&self) {
        self.store.remove(DATA_KEY);
        self.store.remove(TIMESTAMP_KEY);
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    fn order(id: &str, number: &str) -> Order {
        Order {
            id: id.to_string(),
            order_number: number.to_string(),
            customer_email: "user@example.com".to_string(),
            ..Order::default()
        }
    }

    fn cache() -> OrderCache {
        OrderCache::new(Arc::new(MemoryStore::new()))
    }

    #[test]
    fn snapshot_round_trips_for_same_user() {
        let cache = cache();
        cache.set(&[order("1", "SP100001123")], "user@example.com", 0);
        let orders = cache.get("user@example.com", 1_000).unwrap();
        assert_eq!(orders.len(), 1);
        assert!(!cache.should_refresh(1_000));
    }

    #[test]
    fn different_user_clears_and_misses() {
        let cache = cache();
        cache.set(&[order("1", "SP100001123")], "user@example.com", 0);
        assert!(cache.get("other@example.com", 1_000).is_none());
        // Cleared, the original user misses too now
        assert!(cache.get("user@example.com", 1_000).is_none());
    }

    #[test]
    fn add_order_prepends() {
        let cache = cache();
        cache.set(&[order("1", "SP100001123")], "user@example.com", 0);
        cache.add_order(&order("2", "SP100002456"), "user@example.com", 1);
        let orders = cache.get("user@example.com", 2).unwrap();
        assert_eq!(orders.first().unwrap().id, "2");
        assert_eq!(orders.len(), 2);
    }

    #[test]
    fn update_order_replaces_by_id() {
        let cache = cache();
        cache.set(&[order("1", "SP100001123")], "user@example.com", 0);

        let mut updated = order("1", "SP100001123");
        updated.status = sparkle_core::types::OrderStatus::Delivered;
        cache.update_order(&updated, "user@example.com", 1);

        let orders = cache.get("user@example.com", 2).unwrap();
        assert_eq!(
            orders.first().unwrap().status,
            sparkle_core::types::OrderStatus::Delivered
        );
    }

    #[test]
    fn expired_snapshot_misses() {
        let cache = cache();
        cache.set(&[order("1", "SP100001123")], "user@example.com", 0);
        assert!(cache.get("user@example.com", HARD_EXPIRY_MS + 1).is_none());
    }
}
