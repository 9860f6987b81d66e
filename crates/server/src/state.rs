//! Application state shared across handlers.

use std::sync::Arc;

use crate::catalog::CatalogService;
use crate::config::ServerConfig;
use crate::error::AppError;
use crate::notifications::NotificationRegistry;
use crate::notifications::push::PushSender;
use crate::shopify::{AdminClient, StorefrontClient};

/// Application state shared across all handlers.
///
/// Cheaply cloneable via `Arc`. Upstream clients are `None` when the matching
/// credentials are absent; handlers decide whether that is an error or a
/// degraded-but-successful response.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: ServerConfig,
    storefront: Option<StorefrontClient>,
    admin: Option<AdminClient>,
    catalog: Option<CatalogService>,
    registry: NotificationRegistry,
    push: PushSender,
}

impl AppState {
    /// Build the state from configuration, loading persisted notification data.
    #[must_use]
    pub fn new(config: ServerConfig) -> Self {
        let storefront = StorefrontClient::from_config(&config.shopify);
        let admin = AdminClient::from_config(&config.shopify);
        let catalog = storefront.clone().map(CatalogService::new);
        let registry = NotificationRegistry::load(&config.data_dir);
        let push = PushSender::new(config.fcm_server_key.clone());

        if storefront.is_none() {
            tracing::warn!("Storefront API not configured, product and cart endpoints degraded");
        }
        if admin.is_none() {
            tracing::warn!("Admin API not configured, order creation disabled");
        }

        Self {
            inner: Arc::new(AppStateInner {
                config,
                storefront,
                admin,
                catalog,
                registry,
                push,
            }),
        }
    }

    #[must_use]
    pub fn config(&self) -> &ServerConfig {
        &self.inner.config
    }

    /// The catalog service, if the Storefront API is configured.
    #[must_use]
    pub fn catalog(&self) -> Option<&CatalogService> {
        self.inner.catalog.as_ref()
    }

    /// The Storefront API client, or `NotConfigured`.
    ///
    /// # Errors
    ///
    /// Returns `AppError::NotConfigured` when credentials are absent.
    pub fn storefront(&self) -> Result<&StorefrontClient, AppError> {
        self.inner.storefront.as_ref().ok_or(AppError::NotConfigured)
    }

    /// The Admin API client, or `NotConfigured`.
    ///
    /// # Errors
    ///
    /// Returns `AppError::NotConfigured` when credentials are absent.
    pub fn admin(&self) -> Result<&AdminClient, AppError> {
        self.inner.admin.as_ref().ok_or(AppError::NotConfigured)
    }

    #[must_use]
    pub fn registry(&self) -> &NotificationRegistry {
        &self.inner.registry
    }

    #[must_use]
    pub fn push(&self) -> &PushSender {
        &self.inner.push
    }
}
