//! Typed HTTP client for the Sparkle proxy server.
//!
//! Thin wrapper over reqwest: one method per proxy endpoint, returning the
//! shared wire types. Responses are parsed whatever the status code, since
//! the proxy reports failures inside the envelope as well.

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use sparkle_core::api::{
    AddressInput, AssociateCustomerRequest, CheckoutResponse, CollectionProductsResponse,
    CreateCheckoutRequest, CreateOrderRequest, CreateOrderResponse, OrdersResponse,
    ProductResponse, ProductsResponse, RegisterDeviceRequest, RegisterDeviceResponse,
    SendNotificationRequest, SendNotificationResponse, UpdateShippingAddressRequest,
};

use crate::error::Result;

/// Product listing filters, also the identity of a product cache entry.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProductQuery {
    pub category: Option<String>,
    pub subcategory: Option<String>,
    pub search: Option<String>,
    pub limit: Option<usize>,
}

impl ProductQuery {
    /// Stable cache key for this query. The unfiltered listing maps to
    /// `"all"`, matching the server-side snapshot key.
    #[must_use]
    pub fn cache_key(&self) -> String {
        let mut parts = Vec::new();
        if let Some(category) = &self.category {
            parts.push(format!("cat:{category}"));
        }
        if let Some(subcategory) = &self.subcategory {
            parts.push(format!("sub:{subcategory}"));
        }
        if let Some(search) = &self.search {
            parts.push(format!("q:{search}"));
        }
        if parts.is_empty() {
            "all".to_string()
        } else {
            parts.join("_")
        }
    }

    fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        if let Some(category) = &self.category {
            pairs.push(("category", category.clone()));
        }
        if let Some(subcategory) = &self.subcategory {
            pairs.push(("subcategory", subcategory.clone()));
        }
        if let Some(search) = &self.search {
            pairs.push(("search", search.clone()));
        }
        if let Some(limit) = self.limit {
            pairs.push(("limit", limit.to_string()));
        }
        pairs
    }
}

/// HTTP client for every proxy endpoint.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
}

impl ApiClient {
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        let mut base_url = base_url.into();
        while base_url.ends_with('/') {
            base_url.pop();
        }
        Self {
            http: reqwest::Client::new(),
            base_url,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T> {
        let response = self.http.get(self.url(path)).query(query).send().await?;
        Ok(response.json().await?)
    }

    async fn post<T: DeserializeOwned>(&self, path: &str, body: &impl Serialize) -> Result<T> {
        let response = self.http.post(self.url(path)).json(body).send().await?;
        Ok(response.json().await?)
    }

    async fn put<T: DeserializeOwned>(&self, path: &str, body: &impl Serialize) -> Result<T> {
        let response = self.http.put(self.url(path)).json(body).send().await?;
        Ok(response.json().await?)
    }

    // Products

    pub async fn products(&self, query: &ProductQuery) -> Result<ProductsResponse> {
        self.get("/api/products", &query.query_pairs()).await
    }

    pub async fn product(&self, id: &str) -> Result<ProductResponse> {
        let path = format!("/api/products/{}", urlencoding::encode(id));
        self.get(&path, &[]).await
    }

    pub async fn collection_products(
        &self,
        handle: &str,
        first: Option<u32>,
    ) -> Result<CollectionProductsResponse> {
        let path = format!("/api/products/collection/{}", urlencoding::encode(handle));
        let query: Vec<_> = first.map(|n| ("first", n.to_string())).into_iter().collect();
        self.get(&path, &query).await
    }

    // Cart / checkout

    pub async fn create_checkout(&self, request: &CreateCheckoutRequest) -> Result<CheckoutResponse> {
        self.post("/api/cart/checkout", request).await
    }

    pub async fn checkout(&self, id: &str) -> Result<CheckoutResponse> {
        let path = format!("/api/cart/checkout/{}", urlencoding::encode(id));
        self.get(&path, &[]).await
    }

    pub async fn associate_customer(&self, id: &str, access_token: &str) -> Result<CheckoutResponse> {
        let path = format!("/api/cart/checkout/{}/customer", urlencoding::encode(id));
        let request = AssociateCustomerRequest {
            access_token: access_token.to_string(),
        };
        self.put(&path, &request).await
    }

    pub async fn update_shipping_address(
        &self,
        id: &str,
        address: AddressInput,
    ) -> Result<CheckoutResponse> {
        let path = format!(
            "/api/cart/checkout/{}/shipping-address",
            urlencoding::encode(id)
        );
        self.put(&path, &UpdateShippingAddressRequest { address }).await
    }

    // Orders

    pub async fn customer_orders(&self, access_token: &str) -> Result<OrdersResponse> {
        let response = self
            .http
            .get(self.url("/api/orders"))
            .bearer_auth(access_token)
            .send()
            .await?;
        Ok(response.json().await?)
    }

    pub async fn create_order(&self, request: &CreateOrderRequest) -> Result<CreateOrderResponse> {
        self.post("/api/shopify/create-order", request).await
    }

    // Notifications

    pub async fn register_device(
        &self,
        request: &RegisterDeviceRequest,
    ) -> Result<RegisterDeviceResponse> {
        self.post("/api/notifications/register", request).await
    }

    pub async fn unregister_device(&self, token: &str) -> Result<Value> {
        let response = self
            .http
            .delete(self.url("/api/notifications/unregister"))
            .json(&json!({ "token": token }))
            .send()
            .await?;
        Ok(response.json().await?)
    }

    pub async fn send_notification(
        &self,
        request: &SendNotificationRequest,
    ) -> Result<SendNotificationResponse> {
        self.post("/api/notifications/send", request).await
    }

    pub async fn send_to_user(
        &self,
        request: &SendNotificationRequest,
    ) -> Result<SendNotificationResponse> {
        self.post("/api/notifications/send-to-user", request).await
    }

    pub async fn send_to_token(
        &self,
        request: &SendNotificationRequest,
    ) -> Result<SendNotificationResponse> {
        self.post("/api/notifications/send-to-token", request).await
    }

    pub async fn store_received(
        &self,
        token: &str,
        title: &str,
        body: &str,
        data: Option<Value>,
    ) -> Result<Value> {
        self.post(
            "/api/notifications/store-received",
            &json!({
                "token": token,
                "title": title,
                "body": body,
                "data": data,
            }),
        )
        .await
    }

    pub async fn notification_history(&self, token: &str) -> Result<Value> {
        self.get("/api/notifications/history", &[("token", token.to_string())])
            .await
    }

    pub async fn user_notifications(&self, user_id: &str) -> Result<Value> {
        self.get(
            "/api/notifications/user-notifications",
            &[("userId", user_id.to_string())],
        )
        .await
    }

    pub async fn devices(&self) -> Result<Value> {
        self.get("/api/notifications/devices", &[]).await
    }

    pub async fn notification_status(&self) -> Result<Value> {
        self.get("/api/notifications/status", &[]).await
    }

    pub async fn health(&self) -> Result<Value> {
        self.get("/health", &[]).await
    }
}
