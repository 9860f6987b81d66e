//! Product route handlers.

use axum::{
    Json,
    extract::{Path, Query, State},
};
use serde::Deserialize;
use sparkle_core::api::{CollectionProductsResponse, ProductResponse, ProductsResponse};

use crate::catalog::{DEFAULT_MAX_PRODUCTS, ProductFilter};
use crate::error::{AppError, Result};
use crate::state::AppState;

/// Query parameters for the product listing.
#[derive(Debug, Deserialize)]
pub struct ProductsQuery {
    pub category: Option<String>,
    pub subcategory: Option<String>,
    pub search: Option<String>,
    pub limit: Option<String>,
}

/// Query parameters for the collection listing.
#[derive(Debug, Deserialize)]
pub struct CollectionQuery {
    pub first: Option<String>,
}

/// `GET /api/products`
///
/// When Shopify is not configured this still succeeds with an empty list so
/// the app renders an empty catalog instead of an error screen.
pub async fn index(
    State(state): State<AppState>,
    Query(query): Query<ProductsQuery>,
) -> Result<Json<ProductsResponse>> {
    let Some(catalog) = state.catalog() else {
        tracing::info!("Shopify not configured, returning empty products");
        return Ok(Json(ProductsResponse {
            success: true,
            message: Some("Shopify not configured".to_string()),
            ..ProductsResponse::default()
        }));
    };

    let max_products = query
        .limit
        .as_deref()
        .and_then(|l| l.parse::<usize>().ok())
        .unwrap_or(DEFAULT_MAX_PRODUCTS);
    let filter = ProductFilter {
        category: query.category,
        subcategory: query.subcategory,
        search: query.search,
    };

    let (products, cached) = catalog
        .products(max_products, &filter)
        .await
        .map_err(AppError::Upstream)?;

    tracing::debug!(count = products.len(), "Returning products");
    Ok(Json(ProductsResponse {
        success: true,
        total: products.len(),
        products,
        cached,
        message: None,
        error: None,
    }))
}

/// `GET /api/products/{id}`
pub async fn show(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ProductResponse>> {
    let catalog = state.catalog().ok_or(AppError::NotConfigured)?;

    let product = catalog
        .product_by_id(&id)
        .await?
        .ok_or_else(|| AppError::NotFound("Product not found".to_string()))?;

    Ok(Json(ProductResponse {
        success: true,
        product: Some(product),
        error: None,
    }))
}

/// `GET /api/products/collection/{handle}`
pub async fn collection(
    State(state): State<AppState>,
    Path(handle): Path<String>,
    Query(query): Query<CollectionQuery>,
) -> Result<Json<CollectionProductsResponse>> {
    let catalog = state.catalog().ok_or(AppError::NotConfigured)?;
    let first = query
        .first
        .as_deref()
        .and_then(|f| f.parse::<i64>().ok())
        .unwrap_or(250);

    let (collection, products) = catalog
        .collection(&handle, first)
        .await?
        .ok_or_else(|| AppError::NotFound("Collection not found".to_string()))?;

    Ok(Json(CollectionProductsResponse {
        success: true,
        products,
        collection: Some(collection),
        error: None,
    }))
}
