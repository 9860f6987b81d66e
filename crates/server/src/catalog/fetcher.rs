//! Product fetching and normalization.
//!
//! Pulls raw product nodes from the Storefront API and flattens them into
//! the app-facing [`Product`] shape: first variant only, edges/node nesting
//! unwrapped, sale and stock flags derived, category assigned.

use serde_json::json;
use sparkle_core::{CollectionRef, Product, sale_fields};

use crate::shopify::types::{
    CollectionProductsData, Connection, ProductData, ProductNode, ProductsData, VariantNode,
};
use crate::shopify::{ShopifyError, StorefrontClient, queries};

use super::classifier::classify;

/// Page size cap imposed by the Storefront API.
const PAGE_SIZE: i64 = 250;

/// A quantity at or below this (but above zero) is flagged as low stock.
const LOW_STOCK_THRESHOLD: i64 = 5;

/// Flatten a raw product node into the app-facing shape.
///
/// Pricing, stock, and variant fields come from the first variant; a product
/// with no variants is treated as free and out of stock rather than dropped.
#[must_use]
pub fn transform_product(node: ProductNode) -> Product {
    let variant = node
        .variants
        .map(Connection::into_nodes)
        .and_then(|nodes| nodes.into_iter().next())
        .unwrap_or_default();

    let price = variant
        .price
        .as_ref()
        .and_then(|p| p.amount.parse::<f64>().ok())
        .unwrap_or(0.0);
    let compare_at = variant
        .compare_at_price
        .as_ref()
        .and_then(|p| p.amount.parse::<f64>().ok());
    let sale = sale_fields(price, compare_at);

    let quantity_available = variant.quantity_available.unwrap_or(0);
    let classification = classify(&node.title, &node.product_type);

    let image = node
        .featured_image
        .map(|img| img.url)
        .filter(|url| !url.is_empty())
        .or_else(|| {
            node.images
                .as_ref()
                .and_then(|imgs| imgs.edges.first())
                .map(|edge| edge.node.url.clone())
        })
        .unwrap_or_default();
    let images = node
        .images
        .map(|imgs| imgs.into_nodes().into_iter().map(|img| img.url).collect())
        .unwrap_or_default();

    let is_new = node
        .tags
        .iter()
        .any(|t| t.to_lowercase().contains("new"));

    let weight = format_weight(&variant);

    Product {
        id: node.id,
        title: node.title,
        handle: node.handle,
        description: node.description,
        image,
        images,
        price,
        original_price: compare_at,
        on_sale: sale.on_sale,
        discount_percent: sale.discount_percent,
        in_stock: variant.available_for_sale.unwrap_or(false),
        low_stock: quantity_available > 0 && quantity_available <= LOW_STOCK_THRESHOLD,
        quantity_available,
        is_new,
        product_type: node.product_type,
        category: classification.category.to_string(),
        subcategory: classification.subcategory.to_string(),
        tags: node.tags,
        variant_id: variant.id,
        sku: variant.sku.unwrap_or_default(),
        weight,
        vendor: node.vendor.clone(),
        brand: node.vendor,
        collections: node
            .collections
            .map(|c| {
                c.into_nodes()
                    .into_iter()
                    .map(|n| CollectionRef {
                        id: n.id,
                        title: n.title,
                        handle: n.handle,
                    })
                    .collect()
            })
            .unwrap_or_default(),
    }
}

fn format_weight(variant: &VariantNode) -> String {
    variant.weight.map_or_else(String::new, |w| {
        let unit = variant.weight_unit.as_deref().unwrap_or("KILOGRAMS");
        format!("{w} {unit}")
    })
}

/// Fetch up to `max_products` products, paginating at 250 per page.
///
/// # Errors
///
/// Returns `ShopifyError` if any page fails to fetch.
pub async fn fetch_all(
    client: &StorefrontClient,
    max_products: usize,
) -> Result<Vec<Product>, ShopifyError> {
    let mut all = Vec::new();
    let mut cursor: Option<String> = None;

    loop {
        let remaining = max_products.saturating_sub(all.len());
        if remaining == 0 {
            break;
        }
        let first = PAGE_SIZE.min(i64::try_from(remaining).unwrap_or(PAGE_SIZE));

        let data: ProductsData = client
            .execute(
                queries::PRODUCTS_PAGE,
                json!({ "first": first, "after": cursor }),
            )
            .await?;

        let page = data.products;
        all.extend(page.edges.into_iter().map(|e| transform_product(e.node)));
        tracing::debug!(fetched = all.len(), "Fetched product page");

        if !page.page_info.has_next_page {
            break;
        }
        cursor = page.page_info.end_cursor;
    }

    tracing::info!(total = all.len(), "Fetched products from Shopify");
    Ok(all)
}

/// Fetch a single product by its global id.
///
/// # Errors
///
/// Returns `ShopifyError` if the query fails.
pub async fn fetch_by_id(
    client: &StorefrontClient,
    id: &str,
) -> Result<Option<Product>, ShopifyError> {
    let data: ProductData = client
        .execute(queries::PRODUCT_BY_ID, json!({ "id": id }))
        .await?;
    Ok(data.product.map(transform_product))
}

/// Fetch a collection's products by handle.
///
/// Returns `None` if no collection exists under that handle.
///
/// # Errors
///
/// Returns `ShopifyError` if the query fails.
pub async fn fetch_collection(
    client: &StorefrontClient,
    handle: &str,
    first: i64,
) -> Result<Option<(CollectionRef, Vec<Product>)>, ShopifyError> {
    let data: CollectionProductsData = client
        .execute(
            queries::COLLECTION_PRODUCTS,
            json!({ "handle": handle, "first": first }),
        )
        .await?;

    Ok(data.collection_by_handle.map(|collection| {
        let products = collection
            .products
            .into_nodes()
            .into_iter()
            .map(transform_product)
            .collect();
        (
            CollectionRef {
                id: collection.id,
                title: collection.title,
                handle: handle.to_string(),
            },
            products,
        )
    }))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::shopify::types::{Connection, Edge, ImageNode, MoneyNode};

    fn node_with_variant(variant: VariantNode) -> ProductNode {
        ProductNode {
            id: "gid://shopify/Product/1".to_string(),
            title: "Surface Cleaner 1 Liter".to_string(),
            handle: "surface-cleaner".to_string(),
            variants: Some(Connection {
                edges: vec![Edge { node: variant }],
            }),
            ..ProductNode::default()
        }
    }

    fn money(amount: &str) -> MoneyNode {
        MoneyNode {
            amount: amount.to_string(),
            currency_code: "PKR".to_string(),
        }
    }

    #[test]
    fn transform_derives_sale_and_stock_flags() {
        let product = transform_product(node_with_variant(VariantNode {
            id: "gid://shopify/ProductVariant/9".to_string(),
            price: Some(money("400.0")),
            compare_at_price: Some(money("500.0")),
            available_for_sale: Some(true),
            quantity_available: Some(3),
            ..VariantNode::default()
        }));

        assert!(product.on_sale);
        assert_eq!(product.discount_percent, 20);
        assert!((product.original_price.unwrap() - 500.0).abs() < f64::EPSILON);
        assert!(product.in_stock);
        assert!(product.low_stock);
        assert_eq!(product.variant_id, "gid://shopify/ProductVariant/9");
    }

    #[test]
    fn transform_without_variant_is_out_of_stock() {
        let node = ProductNode {
            title: "Broom".to_string(),
            ..ProductNode::default()
        };
        let product = transform_product(node);
        assert!(!product.in_stock);
        assert!(!product.low_stock);
        assert!((product.price - 0.0).abs() < f64::EPSILON);
        assert!(product.variant_id.is_empty());
    }

    #[test]
    fn transform_formats_weight_with_default_unit() {
        let product = transform_product(node_with_variant(VariantNode {
            weight: Some(1.5),
            weight_unit: None,
            ..VariantNode::default()
        }));
        assert_eq!(product.weight, "1.5 KILOGRAMS");

        let no_weight = transform_product(node_with_variant(VariantNode::default()));
        assert_eq!(no_weight.weight, "");
    }

    #[test]
    fn transform_falls_back_to_first_image() {
        let node = ProductNode {
            title: "Mop".to_string(),
            featured_image: None,
            images: Some(Connection {
                edges: vec![Edge {
                    node: ImageNode {
                        url: "https://cdn/img1.jpg".to_string(),
                    },
                }],
            }),
            ..ProductNode::default()
        };
        let product = transform_product(node);
        assert_eq!(product.image, "https://cdn/img1.jpg");
        assert_eq!(product.images, vec!["https://cdn/img1.jpg".to_string()]);
    }

    #[test]
    fn transform_flags_new_from_tags() {
        let node = ProductNode {
            title: "Duster".to_string(),
            tags: vec!["New Arrival".to_string()],
            ..ProductNode::default()
        };
        assert!(transform_product(node).is_new);
    }

    #[test]
    fn transform_assigns_category() {
        let node = ProductNode {
            title: "Marble Floor Cleaner 5 Liter".to_string(),
            ..ProductNode::default()
        };
        let product = transform_product(node);
        assert_eq!(product.category, "cleaning-chemicals");
        assert_eq!(product.subcategory, "floor-cleaner");
    }
}
