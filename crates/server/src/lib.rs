//! Sparkle proxy server.
//!
//! A thin backend between the Sparkle shop app and its upstreams:
//!
//! - Shopify Storefront API for products, carts, and customer orders
//! - Shopify Admin API for draft order creation
//! - FCM for push notification delivery
//!
//! The server owns no database. Its only durable state is the device token
//! registry and notification history, persisted as JSON files under the
//! data directory. Missing upstream credentials degrade the affected
//! endpoints instead of preventing startup.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod catalog;
pub mod config;
pub mod error;
pub mod notifications;
pub mod routes;
pub mod shopify;
pub mod state;

use axum::{Json, Router, extract::State, routing::get};
use serde_json::{Value, json};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use state::AppState;

/// Build the application router with middleware.
pub fn app(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .merge(routes::routes())
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Health check with a per-subsystem configuration summary.
async fn health(State(state): State<AppState>) -> Json<Value> {
    let config = state.config();
    Json(json!({
        "status": "ok",
        "shopify": {
            "storefront": config.shopify.storefront_configured(),
            "admin": config.shopify.admin_configured(),
        },
        "fcm": config.fcm_configured(),
    }))
}
