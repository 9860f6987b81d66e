//! Wire contract between the proxy and its consumers.
//!
//! Every endpoint returns an envelope with a `success` flag plus either its
//! payload or a human-readable `error` string. The same structs are used by
//! the server to serialize responses and by the client to parse them.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::types::{Checkout, CollectionRef, Order, Product};

// =============================================================================
// Requests
// =============================================================================

/// A line item for checkout creation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutLineInput {
    pub variant_id: String,
    pub quantity: u32,
}

/// Body of `POST /api/cart/checkout`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateCheckoutRequest {
    #[serde(default)]
    pub line_items: Vec<CheckoutLineInput>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

/// Body of `PUT /api/cart/checkout/{id}/customer`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssociateCustomerRequest {
    #[serde(default)]
    pub access_token: String,
}

/// A shipping address as entered at checkout.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct AddressInput {
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub address1: String,
    #[serde(default)]
    pub address2: String,
    #[serde(default)]
    pub city: String,
    #[serde(default)]
    pub province: String,
    #[serde(default)]
    pub country: String,
    #[serde(default)]
    pub zip: String,
    #[serde(default)]
    pub phone: String,
}

impl AddressInput {
    /// An address is usable only with a street line, city and country.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        !self.address1.is_empty() && !self.city.is_empty() && !self.country.is_empty()
    }
}

/// Body of `PUT /api/cart/checkout/{id}/shipping-address`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateShippingAddressRequest {
    pub address: AddressInput,
}

/// A line item for upstream order creation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderItemInput {
    pub variant_id: String,
    pub quantity: u32,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub price: f64,
}

/// Body of `POST /api/shopify/create-order`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrderRequest {
    #[serde(default)]
    pub order_number: String,
    #[serde(default)]
    pub customer_name: String,
    #[serde(default)]
    pub customer_email: String,
    #[serde(default)]
    pub customer_phone: String,
    #[serde(default)]
    pub customer_address: String,
    #[serde(default)]
    pub city: String,
    #[serde(default)]
    pub items: Vec<OrderItemInput>,
    #[serde(default)]
    pub subtotal: f64,
    #[serde(default)]
    pub delivery_charge: f64,
    #[serde(default)]
    pub total: f64,
    #[serde(default)]
    pub payment_method: String,
}

impl CreateOrderRequest {
    /// Name of the first empty required field, if any.
    #[must_use]
    pub fn missing_field(&self) -> Option<&'static str> {
        if self.order_number.is_empty() {
            return Some("orderNumber");
        }
        if self.customer_name.is_empty() {
            return Some("customerName");
        }
        if self.customer_email.is_empty() {
            return Some("customerEmail");
        }
        if self.customer_phone.is_empty() {
            return Some("customerPhone");
        }
        if self.customer_address.is_empty() {
            return Some("customerAddress");
        }
        if self.city.is_empty() {
            return Some("city");
        }
        if self.payment_method.is_empty() {
            return Some("paymentMethod");
        }
        None
    }
}

/// Body of `POST /api/notifications/register`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterDeviceRequest {
    #[serde(default)]
    pub token: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub platform: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
}

/// Body of the notification send endpoints.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct SendNotificationRequest {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub body: String,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
}

// =============================================================================
// Responses
// =============================================================================

/// Response of `GET /api/products`.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ProductsResponse {
    pub success: bool,
    #[serde(default)]
    pub products: Vec<Product>,
    #[serde(default)]
    pub total: usize,
    #[serde(default)]
    pub cached: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Response of `GET /api/products/{id}`.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ProductResponse {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub product: Option<Product>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Response of `GET /api/products/collection/{handle}`.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct CollectionProductsResponse {
    pub success: bool,
    #[serde(default)]
    pub products: Vec<Product>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub collection: Option<CollectionRef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Response of the cart/checkout endpoints.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct CheckoutResponse {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub checkout: Option<Checkout>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Response of `GET /api/orders`.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct OrdersResponse {
    pub success: bool,
    #[serde(default)]
    pub orders: Vec<Order>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Response of `POST /api/shopify/create-order`.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrderResponse {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub draft_order_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Response of `POST /api/notifications/register`.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct RegisterDeviceResponse {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default)]
    pub device_count: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Response of the notification send endpoints.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct SendNotificationResponse {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default)]
    pub sent_count: usize,
    #[serde(default)]
    pub failed_count: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}
