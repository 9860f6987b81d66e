//! HTTP route handlers for the proxy API.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health                                       - Health check with subsystem summary
//!
//! # Products
//! GET  /api/products                                 - Product listing (category/subcategory/search/limit)
//! GET  /api/products/{id}                            - Single product by id
//! GET  /api/products/collection/{handle}             - Products in a collection
//!
//! # Cart (Checkout-shaped responses over the Cart API)
//! POST /api/cart/checkout                            - Create a cart
//! GET  /api/cart/checkout/{id}                       - Get cart details
//! PUT  /api/cart/checkout/{id}/customer              - Associate a customer
//! PUT  /api/cart/checkout/{id}/shipping-address      - Set delivery address preference
//!
//! # Orders
//! GET  /api/orders                                   - Customer orders (Bearer access token)
//! POST /api/shopify/create-order                     - Create a draft order (Admin API)
//!
//! # Notifications
//! POST   /api/notifications/register                 - Register a device token
//! DELETE /api/notifications/unregister               - Remove a device token
//! POST   /api/notifications/send                     - Send to all (or one user's) devices
//! POST   /api/notifications/send-to-user             - Send to one user's devices
//! POST   /api/notifications/send-to-token            - Send to one token
//! POST   /api/notifications/store-received           - Record a client-received notification
//! GET    /api/notifications/history?token=           - History for a token
//! GET    /api/notifications/user-notifications?userId= - History for a user
//! GET    /api/notifications/devices                  - Registered device listing
//! GET    /api/notifications/status                   - Subsystem status
//! ```

pub mod cart;
pub mod notifications;
pub mod orders;
pub mod products;
pub mod shopify_orders;

use axum::{
    Router,
    routing::{delete, get, post, put},
};

use crate::state::AppState;

/// Create the full API router.
pub fn routes() -> Router<AppState> {
    Router::new()
        .nest("/api/products", product_routes())
        .nest("/api/cart", cart_routes())
        .nest("/api/orders", order_routes())
        .nest("/api/shopify", shopify_order_routes())
        .nest("/api/notifications", notification_routes())
}

fn product_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(products::index))
        .route("/collection/{handle}", get(products::collection))
        .route("/{id}", get(products::show))
}

fn cart_routes() -> Router<AppState> {
    Router::new()
        .route("/checkout", post(cart::create_checkout))
        .route("/checkout/{checkout_id}", get(cart::get_checkout))
        .route(
            "/checkout/{checkout_id}/customer",
            put(cart::associate_customer),
        )
        .route(
            "/checkout/{checkout_id}/shipping-address",
            put(cart::update_shipping_address),
        )
}

fn order_routes() -> Router<AppState> {
    Router::new().route("/", get(orders::index))
}

fn shopify_order_routes() -> Router<AppState> {
    Router::new().route("/create-order", post(shopify_orders::create_order))
}

fn notification_routes() -> Router<AppState> {
    Router::new()
        .route("/register", post(notifications::register))
        .route("/unregister", delete(notifications::unregister))
        .route("/send", post(notifications::send))
        .route("/send-to-user", post(notifications::send_to_user))
        .route("/send-to-token", post(notifications::send_to_token))
        .route("/store-received", post(notifications::store_received))
        .route("/history", get(notifications::history))
        .route("/user-notifications", get(notifications::user_notifications))
        .route("/devices", get(notifications::devices))
        .route("/status", get(notifications::status))
}
