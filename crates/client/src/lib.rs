//! Client state library for the Sparkle shop app.
//!
//! Everything the app keeps on the device: the product and order caches
//! with their daily midnight invalidation, the cart, wishlist, session,
//! order history, and the notification inbox, plus a typed HTTP client for
//! the Sparkle proxy server.
//!
//! Services are plain injectable objects over an [`store::KeyValueStore`],
//! and publish changes on `tokio::sync::broadcast` channels so UI layers
//! can subscribe without polling.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod api;
pub mod auth;
pub mod cart;
pub mod error;
pub mod midnight;
pub mod notifications;
pub mod order_cache;
pub mod orders;
pub mod product_cache;
pub mod refresh;
pub mod store;
pub mod wishlist;

pub use api::{ApiClient, ProductQuery};
pub use auth::{AuthEvent, AuthStore, StoredUser};
pub use cart::CartService;
pub use error::{ClientError, Result};
pub use midnight::{CacheEvent, MidnightScheduler};
pub use notifications::NotificationService;
pub use order_cache::OrderCache;
pub use orders::{CustomerInfo, OrderService};
pub use product_cache::ProductCache;
pub use refresh::{CacheState, CatalogCache};
pub use store::{FileStore, KeyValueStore, MemoryStore, StoreError};
pub use wishlist::WishlistService;
