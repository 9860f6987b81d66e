//! Shopify API clients.
//!
//! Two thin GraphQL-over-HTTP clients built on `reqwest`: the Storefront API
//! client (products, cart, customer orders) and the Admin API client (draft
//! orders). Queries are hand-written strings in [`queries`]; responses are
//! deserialized into the raw shapes in [`types`].

pub mod queries;
pub mod types;

use std::sync::Arc;

use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::config::ShopifyConfig;

/// Errors from Shopify API calls.
#[derive(Debug, thiserror::Error)]
pub enum ShopifyError {
    /// Upstream credentials are not configured.
    #[error("Shopify not configured")]
    NotConfigured,

    /// HTTP transport error.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Non-success HTTP status from the API.
    #[error("Shopify API error: {status} {body}")]
    Api { status: u16, body: String },

    /// GraphQL-level errors in an otherwise successful response.
    #[error("{0}")]
    GraphQl(String),

    /// Response body could not be parsed.
    #[error("Failed to parse Shopify response: {0}")]
    Parse(#[from] serde_json::Error),
}

/// GraphQL request body: `{"query": ..., "variables": ...}`.
#[derive(Debug, Serialize)]
struct GraphQlRequest<'a> {
    query: &'a str,
    variables: Value,
}

/// GraphQL response envelope.
#[derive(Debug, Deserialize)]
struct GraphQlResponse<T> {
    data: Option<T>,
    errors: Option<Vec<GraphQlErrorEntry>>,
}

#[derive(Debug, Deserialize)]
struct GraphQlErrorEntry {
    message: String,
}

/// Which authentication header a client sends.
#[derive(Debug, Clone, Copy)]
enum ApiKind {
    Storefront,
    Admin,
}

impl ApiKind {
    const fn header_name(self) -> &'static str {
        match self {
            Self::Storefront => "X-Shopify-Storefront-Access-Token",
            Self::Admin => "X-Shopify-Access-Token",
        }
    }
}

struct GraphQlClientInner {
    client: reqwest::Client,
    endpoint: String,
    token: SecretString,
    kind: ApiKind,
}

impl GraphQlClientInner {
    async fn execute<T: DeserializeOwned>(
        &self,
        query: &str,
        variables: Value,
    ) -> Result<T, ShopifyError> {
        let body = GraphQlRequest { query, variables };

        let response = self
            .client
            .post(&self.endpoint)
            .header(self.kind.header_name(), self.token.expose_secret())
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            tracing::error!(
                status = %status,
                body = %text.chars().take(500).collect::<String>(),
                "Shopify API returned non-success status"
            );
            return Err(ShopifyError::Api {
                status: status.as_u16(),
                body: text.chars().take(200).collect(),
            });
        }

        let parsed: GraphQlResponse<T> = serde_json::from_str(&text).inspect_err(|e| {
            tracing::error!(
                error = %e,
                body = %text.chars().take(500).collect::<String>(),
                "Failed to parse Shopify GraphQL response"
            );
        })?;

        if let Some(errors) = parsed.errors
            && !errors.is_empty()
        {
            let joined = errors
                .into_iter()
                .map(|e| e.message)
                .collect::<Vec<_>>()
                .join(", ");
            tracing::debug!(errors = %joined, "GraphQL errors in response");
            return Err(ShopifyError::GraphQl(joined));
        }

        parsed
            .data
            .ok_or_else(|| ShopifyError::GraphQl("Response contained no data".to_string()))
    }
}

/// Client for the Shopify Storefront API.
#[derive(Clone)]
pub struct StorefrontClient {
    inner: Arc<GraphQlClientInner>,
}

impl StorefrontClient {
    /// Create a client if storefront credentials are configured.
    #[must_use]
    pub fn from_config(config: &ShopifyConfig) -> Option<Self> {
        if !config.storefront_configured() {
            return None;
        }
        let token = config.storefront_token.clone()?;

        Some(Self {
            inner: Arc::new(GraphQlClientInner {
                client: reqwest::Client::new(),
                endpoint: config.storefront_endpoint(),
                token,
                kind: ApiKind::Storefront,
            }),
        })
    }

    /// Execute a GraphQL query against the Storefront API.
    ///
    /// # Errors
    ///
    /// Returns `ShopifyError` on transport failure, non-success HTTP status,
    /// GraphQL errors, or an unparseable response body.
    pub async fn execute<T: DeserializeOwned>(
        &self,
        query: &str,
        variables: Value,
    ) -> Result<T, ShopifyError> {
        self.inner.execute(query, variables).await
    }
}

/// Client for the Shopify Admin API.
#[derive(Clone)]
pub struct AdminClient {
    inner: Arc<GraphQlClientInner>,
}

impl AdminClient {
    /// Create a client if admin credentials are configured.
    #[must_use]
    pub fn from_config(config: &ShopifyConfig) -> Option<Self> {
        if !config.admin_configured() {
            return None;
        }
        let token = config.admin_token.clone()?;

        Some(Self {
            inner: Arc::new(GraphQlClientInner {
                client: reqwest::Client::new(),
                endpoint: config.admin_endpoint(),
                token,
                kind: ApiKind::Admin,
            }),
        })
    }

    /// Execute a GraphQL mutation against the Admin API.
    ///
    /// # Errors
    ///
    /// Returns `ShopifyError` on transport failure, non-success HTTP status,
    /// GraphQL errors, or an unparseable response body.
    pub async fn execute<T: DeserializeOwned>(
        &self,
        query: &str,
        variables: Value,
    ) -> Result<T, ShopifyError> {
        self.inner.execute(query, variables).await
    }
}

/// Join user errors from a mutation payload into a single message.
#[must_use]
pub fn join_user_errors(errors: &[types::UserError]) -> String {
    errors
        .iter()
        .map(|e| e.message.clone())
        .collect::<Vec<_>>()
        .join(", ")
}
