//! Daily cache invalidation at local midnight.
//!
//! One background task sleeps until the next local midnight, clears the
//! product and order caches, broadcasts [`CacheEvent::Cleared`] so the UI
//! can refetch, and re-arms for the next day.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Local, TimeZone};
use tokio::sync::broadcast;

use crate::order_cache::OrderCache;
use crate::product_cache::ProductCache;

/// Broadcast to subscribers when the caches are wiped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheEvent {
    Cleared,
}

struct Inner {
    product_cache: ProductCache,
    order_cache: OrderCache,
    tx: broadcast::Sender<CacheEvent>,
}

pub struct MidnightScheduler {
    inner: Arc<Inner>,
    task: tokio::task::JoinHandle<()>,
}

impl MidnightScheduler {
    /// Arm the scheduler. Must be called inside a tokio runtime.
    #[must_use]
    pub fn new(product_cache: ProductCache, order_cache: OrderCache) -> Self {
        let (tx, _) = broadcast::channel(16);
        let inner = Arc::new(Inner {
            product_cache,
            order_cache,
            tx,
        });

        let worker = Arc::clone(&inner);
        let task = tokio::spawn(async move {
            loop {
                let delay = until_next_midnight(Local::now());
                tracing::debug!(seconds = delay.as_secs(), "Armed midnight cache clear");
                tokio::time::sleep(delay).await;
                clear_and_notify(&worker);
            }
        });

        Self { inner, task }
    }

    /// Events fire on every clear, scheduled or forced.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<CacheEvent> {
        self.inner.tx.subscribe()
    }

    /// Clear both caches and notify subscribers immediately.
    pub fn force_refresh(&self) {
        clear_and_notify(&self.inner);
    }
}

impl Drop for MidnightScheduler {
    fn drop(&mut self) {
        self.task.abort();
    }
}

fn clear_and_notify(inner: &Inner) {
    inner.product_cache.clear(None);
    inner.order_cache.clear();
    // No subscribers is fine
    let _ = inner.tx.send(CacheEvent::Cleared);
    tracing::info!("Cleared product and order caches");
}

/// Time until the next local midnight, strictly positive and at most 24 h.
fn until_next_midnight(now: DateTime<Local>) -> Duration {
    const DAY: Duration = Duration::from_secs(24 * 60 * 60);

    let Some(next) = now
        .date_naive()
        .succ_opt()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .and_then(|naive| Local.from_local_datetime(&naive).earliest())
    else {
        return DAY;
    };

    (next - now).to_std().map_or(DAY, |d| d.min(DAY))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::store::MemoryStore;

    #[test]
    fn delay_is_positive_and_bounded() {
        let delay = until_next_midnight(Local::now());
        assert!(delay > Duration::ZERO);
        assert!(delay <= Duration::from_secs(24 * 60 * 60));
    }

    #[tokio::test]
    async fn force_refresh_clears_and_broadcasts() {
        let store: Arc<MemoryStore> = Arc::new(MemoryStore::new());
        let product_cache = ProductCache::new(Arc::clone(&store) as _);
        let order_cache = OrderCache::new(Arc::clone(&store) as _);
        product_cache.set("all", &[], 0);

        let scheduler = MidnightScheduler::new(product_cache.clone(), order_cache);
        let mut events = scheduler.subscribe();

        scheduler.force_refresh();
        assert_eq!(events.recv().await.unwrap(), CacheEvent::Cleared);
        assert!(product_cache.get("all", 1).is_none());
    }

    #[tokio::test]
    async fn clearing_empty_storage_is_a_noop() {
        let store: Arc<MemoryStore> = Arc::new(MemoryStore::new());
        let scheduler = MidnightScheduler::new(
            ProductCache::new(Arc::clone(&store) as _),
            OrderCache::new(store as _),
        );
        scheduler.force_refresh();
    }
}
