//! Server configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! All variables are optional. Upstream credentials may be absent during
//! local development; endpoints that need them respond with a degraded
//! payload instead of refusing to start.
//!
//! - `SPARKLE_HOST` - Bind address (default: 0.0.0.0)
//! - `SPARKLE_PORT` - Listen port (default: 3001)
//! - `SPARKLE_DATA_DIR` - Directory for device/notification storage (default: data)
//! - `SHOPIFY_STORE_DOMAIN` - Shopify store domain (e.g., your-store.myshopify.com)
//! - `SHOPIFY_STOREFRONT_TOKEN` - Storefront API access token
//! - `SHOPIFY_ADMIN_API_TOKEN` - Admin API access token (order creation)
//! - `SHOPIFY_API_VERSION` - API version (default: 2025-01)
//! - `FCM_SERVER_KEY` - FCM server key for push delivery

use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;

use secrecy::SecretString;
use thiserror::Error;

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Server application configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Directory for persisted device tokens and notification history
    pub data_dir: PathBuf,
    /// Shopify API configuration
    pub shopify: ShopifyConfig,
    /// FCM server key for push delivery
    pub fcm_server_key: Option<SecretString>,
}

/// Shopify API configuration.
///
/// Implements `Debug` manually to redact token fields.
#[derive(Clone)]
pub struct ShopifyConfig {
    /// Shopify store domain (e.g., your-store.myshopify.com)
    pub store_domain: String,
    /// Shopify API version (e.g., 2025-01)
    pub api_version: String,
    /// Storefront API access token
    pub storefront_token: Option<SecretString>,
    /// Admin API access token
    pub admin_token: Option<SecretString>,
}

impl std::fmt::Debug for ShopifyConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ShopifyConfig")
            .field("store_domain", &self.store_domain)
            .field("api_version", &self.api_version)
            .field(
                "storefront_token",
                &self.storefront_token.as_ref().map(|_| "[REDACTED]"),
            )
            .field(
                "admin_token",
                &self.admin_token.as_ref().map(|_| "[REDACTED]"),
            )
            .finish()
    }
}

impl ShopifyConfig {
    /// Whether the Storefront API (products, cart, orders) can be called.
    #[must_use]
    pub fn storefront_configured(&self) -> bool {
        !self.store_domain.is_empty() && self.storefront_token.is_some()
    }

    /// Whether the Admin API (draft order creation) can be called.
    #[must_use]
    pub fn admin_configured(&self) -> bool {
        !self.store_domain.is_empty() && self.admin_token.is_some()
    }

    /// Storefront GraphQL endpoint URL.
    #[must_use]
    pub fn storefront_endpoint(&self) -> String {
        format!(
            "https://{}/api/{}/graphql.json",
            self.store_domain, self.api_version
        )
    }

    /// Admin GraphQL endpoint URL.
    #[must_use]
    pub fn admin_endpoint(&self) -> String {
        format!(
            "https://{}/admin/api/{}/graphql.json",
            self.store_domain, self.api_version
        )
    }
}

impl ServerConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the host or port cannot be parsed.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let host = get_env_or_default("SPARKLE_HOST", "0.0.0.0")
            .parse::<IpAddr>()
            .map_err(|e| ConfigError::InvalidEnvVar("SPARKLE_HOST".to_string(), e.to_string()))?;
        let port = get_env_or_default("SPARKLE_PORT", "3001")
            .parse::<u16>()
            .map_err(|e| ConfigError::InvalidEnvVar("SPARKLE_PORT".to_string(), e.to_string()))?;
        let data_dir = PathBuf::from(get_env_or_default("SPARKLE_DATA_DIR", "data"));

        let shopify = ShopifyConfig {
            store_domain: get_env_or_default("SHOPIFY_STORE_DOMAIN", ""),
            api_version: get_env_or_default("SHOPIFY_API_VERSION", "2025-01"),
            storefront_token: get_optional_secret("SHOPIFY_STOREFRONT_TOKEN"),
            admin_token: get_optional_secret("SHOPIFY_ADMIN_API_TOKEN"),
        };

        Ok(Self {
            host,
            port,
            data_dir,
            shopify,
            fcm_server_key: get_optional_secret("FCM_SERVER_KEY"),
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    /// Whether push delivery is configured.
    #[must_use]
    pub const fn fcm_configured(&self) -> bool {
        self.fcm_server_key.is_some()
    }
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Get an optional environment variable as a secret, treating empty as unset.
fn get_optional_secret(key: &str) -> Option<SecretString> {
    std::env::var(key)
        .ok()
        .filter(|v| !v.is_empty())
        .map(SecretString::from)
}
