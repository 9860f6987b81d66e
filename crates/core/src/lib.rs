//! Sparkle Core - Shared types library.
//!
//! This crate provides common types used across the Sparkle components:
//! - `server` - API proxy in front of the Shopify Storefront/Admin APIs
//! - `client` - Client-side state library (cart, caches, wishlist, inbox)
//!
//! # Architecture
//!
//! The core crate contains only types - no I/O, no HTTP clients. The API
//! envelope structs in [`api`] define the wire contract between the proxy
//! and its consumers, so both sides serialize and parse the same shapes.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod api;
pub mod types;

pub use types::*;
