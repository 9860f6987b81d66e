//! Persistent shopping cart and checkout handoff.
//!
//! The cart lives entirely client-side until checkout, when the line items
//! are posted to the proxy and the returned checkout id is kept for
//! follow-up calls. Any cart mutation invalidates that id, since the
//! upstream cart no longer matches.

use std::sync::Arc;

use serde_json::Value;
use sparkle_core::api::{CheckoutLineInput, CreateCheckoutRequest};
use sparkle_core::types::{CartItem, Checkout, Product};
use tokio::sync::broadcast;

use crate::api::ApiClient;
use crate::error::{ClientError, Result};
use crate::store::KeyValueStore;

const CART_KEY: &str = "sparkle_cart";
const CHECKOUT_ID_KEY: &str = "sparkle_checkout_id";

#[derive(Clone)]
pub struct CartService {
    store: Arc<dyn KeyValueStore>,
    api: ApiClient,
    tx: broadcast::Sender<Vec<CartItem>>,
}

impl CartService {
    #[must_use]
    pub fn new(store: Arc<dyn KeyValueStore>, api: ApiClient) -> Self {
        let (tx, _) = broadcast::channel(16);
        Self { store, api, tx }
    }

    /// Receives the full item list after every change.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<Vec<CartItem>> {
        self.tx.subscribe()
    }

    /// Current cart contents.
    ///
    /// Entries that no longer parse, have a zero quantity, or lost their
    /// variant id are dropped, and the cleaned list is written back so the
    /// migration happens once.
    #[must_use]
    pub fn items(&self) -> Vec<CartItem> {
        let Some(raw) = self.store.get(CART_KEY) else {
            return Vec::new();
        };
        let Ok(entries) = serde_json::from_str::<Vec<Value>>(&raw) else {
            tracing::warn!("Corrupt cart storage, resetting");
            self.store.remove(CART_KEY);
            return Vec::new();
        };

        let total = entries.len();
        let items: Vec<CartItem> = entries
            .into_iter()
            .filter_map(|entry| serde_json::from_value::<CartItem>(entry).ok())
            .filter(|item| item.quantity > 0 && !item.product.variant_id.is_empty())
            .collect();

        if items.len() != total {
            tracing::info!(
                dropped = total - items.len(),
                "Dropped invalid cart entries"
            );
            self.persist(&items);
        }
        items
    }

    pub fn add(&self, product: Product, quantity: u32) {
        if quantity == 0 {
            return;
        }
        let mut items = self.items();
        if let Some(existing) = items.iter_mut().find(|item| item.product.id == product.id) {
            existing.quantity += quantity;
        } else {
            items.push(CartItem { product, quantity });
        }
        self.mutate(&items);
    }

    /// Set the quantity for a product; zero removes it.
    pub fn update_quantity(&self, product_id: &str, quantity: u32) {
        let mut items = self.items();
        if quantity == 0 {
            items.retain(|item| item.product.id != product_id);
        } else if let Some(item) = items.iter_mut().find(|item| item.product.id == product_id) {
            item.quantity = quantity;
        } else {
            return;
        }
        self.mutate(&items);
    }

    pub fn remove(&self, product_id: &str) {
        let mut items = self.items();
        let before = items.len();
        items.retain(|item| item.product.id != product_id);
        if items.len() != before {
            self.mutate(&items);
        }
    }

    pub fn clear(&self) {
        self.mutate(&[]);
    }

    /// Total number of units across all lines.
    #[must_use]
    pub fn item_count(&self) -> u32 {
        self.items().iter().map(|item| item.quantity).sum()
    }

    #[must_use]
    pub fn total(&self) -> f64 {
        self.items().iter().map(CartItem::line_total).sum()
    }

    #[must_use]
    pub fn checkout_id(&self) -> Option<String> {
        self.store.get(CHECKOUT_ID_KEY)
    }

    /// Create an upstream checkout from the current cart.
    ///
    /// The checkout id is stored for follow-up calls. When an access token
    /// is given the customer is associated best-effort; a failure there
    /// does not fail the checkout.
    pub async fn create_checkout(
        &self,
        email: Option<String>,
        access_token: Option<&str>,
    ) -> Result<Checkout> {
        let items = self.items();
        if items.is_empty() {
            return Err(ClientError::EmptyCart);
        }

        let request = CreateCheckoutRequest {
            line_items: items
                .iter()
                .map(|item| CheckoutLineInput {
                    variant_id: item.product.variant_id.clone(),
                    quantity: item.quantity.max(1),
                })
                .collect(),
            email,
            note: None,
        };

        let response = self.api.create_checkout(&request).await?;
        let checkout = response.checkout.filter(|_| response.success).ok_or_else(|| {
            ClientError::Api(
                response
                    .error
                    .unwrap_or_else(|| "Checkout creation failed".to_string()),
            )
        })?;

        if let Err(e) = self.store.set(CHECKOUT_ID_KEY, &checkout.id) {
            tracing::warn!(error = %e, "Failed to persist checkout id");
        }

        if let Some(token) = access_token {
            match self.api.associate_customer(&checkout.id, token).await {
                Ok(response) if response.success => {
                    tracing::debug!("Associated customer with checkout");
                }
                Ok(response) => {
                    tracing::warn!(error = ?response.error, "Customer association rejected");
                }
                Err(e) => tracing::warn!(error = %e, "Customer association failed"),
            }
        }

        Ok(checkout)
    }

    /// Attach a shipping address to the stored checkout. Best-effort:
    /// returns `None` when there is no stored checkout or upstream fails.
    pub async fn update_shipping_address(
        &self,
        address: sparkle_core::api::AddressInput,
    ) -> Option<Checkout> {
        let checkout_id = self.checkout_id()?;
        match self.api.update_shipping_address(&checkout_id, address).await {
            Ok(response) if response.success => response.checkout,
            Ok(response) => {
                tracing::warn!(error = ?response.error, "Shipping address update rejected");
                None
            }
            Err(e) => {
                tracing::warn!(error = %e, "Shipping address update failed");
                None
            }
        }
    }

    fn mutate(&self, items: &[CartItem]) {
        self.persist(items);
        // The upstream cart no longer matches
        self.store.remove(CHECKOUT_ID_KEY);
        let _ = self.tx.send(items.to_vec());
    }

    fn persist(&self, items: &[CartItem]) {
        match serde_json::to_string(items) {
            Ok(serialized) => {
                if let Err(e) = self.store.set(CART_KEY, &serialized) {
                    tracing::warn!(error = %e, "Failed to persist cart");
                }
            }
            Err(e) => tracing::warn!(error = %e, "Failed to serialize cart"),
        }
    }
}
