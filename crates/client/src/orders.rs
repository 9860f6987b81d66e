//! Order placement and history.
//!
//! Orders are written locally first and then created upstream through the
//! proxy. When the upstream call fails the order stays local-only and
//! pending, so nothing the customer did is lost. History merges local and
//! upstream orders, deduplicated by order number with upstream winning.

use std::sync::Arc;

use chrono::Utc;
use rand::Rng;
use sparkle_core::api::{CreateOrderRequest, OrderItemInput};
use sparkle_core::types::{CartItem, Order, OrderStatus, PaymentMethod};
use tokio::sync::broadcast;

use crate::api::ApiClient;
use crate::auth::AuthStore;
use crate::order_cache::OrderCache;
use crate::store::KeyValueStore;

const ORDERS_KEY: &str = "sparkle_orders";

/// Checkout form details for a new order.
#[derive(Debug, Clone)]
pub struct CustomerInfo {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub address: String,
    pub city: String,
}

#[derive(Clone)]
pub struct OrderService {
    store: Arc<dyn KeyValueStore>,
    api: ApiClient,
    auth: AuthStore,
    cache: OrderCache,
    tx: broadcast::Sender<Vec<Order>>,
}

impl OrderService {
    #[must_use]
    pub fn new(
        store: Arc<dyn KeyValueStore>,
        api: ApiClient,
        auth: AuthStore,
        cache: OrderCache,
    ) -> Self {
        let (tx, _) = broadcast::channel(16);
        Self {
            store,
            api,
            auth,
            cache,
            tx,
        }
    }

    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<Vec<Order>> {
        self.tx.subscribe()
    }

    /// `SP` + the last six digits of the epoch-millisecond clock + three
    /// random digits. Unique enough for a human-facing reference.
    #[must_use]
    pub fn generate_order_number(now_ms: i64) -> String {
        let millis = format!("{now_ms}");
        let tail = millis
            .get(millis.len().saturating_sub(6)..)
            .unwrap_or(&millis);
        let suffix: u32 = rand::rng().random_range(0..1000);
        format!("SP{tail}{suffix:03}")
    }

    /// Place an order for `items`.
    ///
    /// The order is persisted locally, then created upstream. Upstream
    /// failure is logged and leaves the order pending and local-only.
    pub async fn place_order(
        &self,
        items: Vec<CartItem>,
        customer: CustomerInfo,
        delivery_charge: f64,
        payment_method: PaymentMethod,
    ) -> Order {
        let now = Utc::now();
        let subtotal: f64 = items.iter().map(CartItem::line_total).sum();

        let mut order = Order {
            id: now.timestamp_millis().to_string(),
            order_number: Self::generate_order_number(now.timestamp_millis()),
            customer_name: customer.name,
            customer_email: customer.email,
            customer_phone: customer.phone,
            customer_address: customer.address,
            city: customer.city,
            items,
            subtotal,
            delivery_charge,
            total: subtotal + delivery_charge,
            payment_method,
            status: OrderStatus::Pending,
            created_at: now.to_rfc3339(),
            ..Order::default()
        };

        match self.create_upstream(&order).await {
            Some((draft_order_id, order_id)) => {
                order.shopify_draft_order_id = Some(draft_order_id);
                if let Some(order_id) = order_id {
                    order.shopify_order_id = Some(order_id);
                    order.status = OrderStatus::Processing;
                }
                tracing::info!(order_number = %order.order_number, "Order created upstream");
            }
            None => {
                tracing::warn!(
                    order_number = %order.order_number,
                    "Upstream order creation failed, keeping order local-only"
                );
            }
        }

        let mut orders = self.local_orders();
        orders.insert(0, order.clone());
        self.persist(&orders);
        self.cache
            .add_order(&order, &order.customer_email, now.timestamp_millis());

        order
    }

    /// (draft order id, completed order id) on success, `None` on any
    /// upstream failure.
    async fn create_upstream(&self, order: &Order) -> Option<(String, Option<String>)> {
        let request = CreateOrderRequest {
            order_number: order.order_number.clone(),
            customer_name: order.customer_name.clone(),
            customer_email: order.customer_email.clone(),
            customer_phone: order.customer_phone.clone(),
            customer_address: order.customer_address.clone(),
            city: order.city.clone(),
            items: order
                .items
                .iter()
                .map(|item| OrderItemInput {
                    variant_id: item.product.variant_id.clone(),
                    quantity: item.quantity,
                    title: item.product.title.clone(),
                    price: item.product.price,
                })
                .collect(),
            subtotal: order.subtotal,
            delivery_charge: order.delivery_charge,
            total: order.total,
            payment_method: match order.payment_method {
                PaymentMethod::CashOnDelivery => "cod".to_string(),
                PaymentMethod::BankTransfer => "bank-transfer".to_string(),
            },
        };

        match self.api.create_order(&request).await {
            Ok(response) if response.success => {
                response.draft_order_id.map(|id| (id, response.order_id))
            }
            Ok(response) => {
                tracing::warn!(error = ?response.error, "Order creation rejected");
                None
            }
            Err(e) => {
                tracing::warn!(error = %e, "Order creation request failed");
                None
            }
        }
    }

    /// Orders stored on this device, newest first.
    #[must_use]
    pub fn local_orders(&self) -> Vec<Order> {
        self.store
            .get(ORDERS_KEY)
            .and_then(|raw| serde_json::from_str(&raw).ok())
            .unwrap_or_default()
    }

    /// Combined history for the logged-in user: local orders merged with
    /// upstream ones, deduplicated by order number (upstream wins), newest
    /// first. Empty while logged out.
    pub async fn user_orders(&self) -> Vec<Order> {
        let Some(user) = self.auth.current_user() else {
            return Vec::new();
        };
        let now_ms = Utc::now().timestamp_millis();

        if !self.cache.should_refresh(now_ms) {
            if let Some(cached) = self.cache.get(&user.email, now_ms) {
                tracing::debug!(count = cached.len(), "Serving cached orders");
                return cached;
            }
        }

        let local: Vec<Order> = self
            .local_orders()
            .into_iter()
            .filter(|order| order.customer_email == user.email)
            .collect();

        let upstream = match self.api.customer_orders(&user.access_token).await {
            Ok(response) if response.success => response.orders,
            Ok(response) => {
                tracing::warn!(error = ?response.error, "Upstream order fetch rejected");
                Vec::new()
            }
            Err(e) => {
                tracing::warn!(error = %e, "Upstream order fetch failed");
                Vec::new()
            }
        };

        let merged = merge_orders(local, upstream);
        self.cache.set(&merged, &user.email, now_ms);
        let _ = self.tx.send(merged.clone());
        merged
    }

    fn persist(&self, orders: &[Order]) {
        match serde_json::to_string(orders) {
            Ok(serialized) => {
                if let Err(e) = self.store.set(ORDERS_KEY, &serialized) {
                    tracing::warn!(error = %e, "Failed to persist orders");
                }
                let _ = self.tx.send(orders.to_vec());
            }
            Err(e) => tracing::warn!(error = %e, "Failed to serialize orders"),
        }
    }
}

/// Merge local and upstream orders by order number, upstream winning,
/// sorted newest first.
fn merge_orders(local: Vec<Order>, upstream: Vec<Order>) -> Vec<Order> {
    let mut merged = upstream;
    for order in local {
        if !merged.iter().any(|o| o.order_number == order.order_number) {
            merged.push(order);
        }
    }
    merged.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    merged
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn order(number: &str, created_at: &str, status: OrderStatus) -> Order {
        Order {
            id: number.to_string(),
            order_number: number.to_string(),
            customer_email: "user@example.com".to_string(),
            created_at: created_at.to_string(),
            status,
            ..Order::default()
        }
    }

    #[test]
    fn order_numbers_have_fixed_shape() {
        let number = OrderService::generate_order_number(1_724_000_123_456);
        assert_eq!(number.len(), 11);
        assert!(number.starts_with("SP123456"));
        assert!(number.chars().skip(2).all(|c| c.is_ascii_digit()));
    }

    #[test]
    fn merge_prefers_upstream_and_sorts_newest_first() {
        let local = vec![
            order("SP100", "2026-01-01T00:00:00Z", OrderStatus::Pending),
            order("SP200", "2026-01-03T00:00:00Z", OrderStatus::Pending),
        ];
        let upstream = vec![order("SP100", "2026-01-02T00:00:00Z", OrderStatus::Delivered)];

        let merged = merge_orders(local, upstream);
        assert_eq!(merged.len(), 2);
        assert_eq!(merged.first().unwrap().order_number, "SP200");
        let sp100 = merged.iter().find(|o| o.order_number == "SP100").unwrap();
        assert_eq!(sp100.status, OrderStatus::Delivered);
    }
}
