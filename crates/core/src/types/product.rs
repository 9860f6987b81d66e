//! Normalized product record.
//!
//! The upstream Storefront API returns a deeply nested GraphQL shape; the
//! proxy flattens it into this record, filling every optional field with an
//! empty-string/zero fallback so consumers never deal with partial data.

use serde::{Deserialize, Serialize};

/// Reference to an upstream collection a product belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct CollectionRef {
    pub id: String,
    pub title: String,
    pub handle: String,
}

/// A normalized storefront product.
///
/// Invariant: `discount_percent > 0` implies `on_sale` and
/// `original_price > price`. Use [`sale_fields`] to derive the three
/// sale-related fields together so the invariant holds by construction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: String,
    pub title: String,
    pub handle: String,
    pub description: String,
    /// Primary image URL; empty string when the product has no image.
    pub image: String,
    /// All image URLs, in upstream order.
    pub images: Vec<String>,
    pub price: f64,
    /// Compare-at price, present only when the product is discounted.
    pub original_price: Option<f64>,
    pub on_sale: bool,
    /// Rounded percentage discount, 0-100.
    pub discount_percent: u8,
    pub in_stock: bool,
    pub low_stock: bool,
    pub quantity_available: i64,
    pub is_new: bool,
    pub product_type: String,
    pub category: String,
    pub subcategory: String,
    pub tags: Vec<String>,
    /// Upstream variant ID. Empty means the item cannot be checked out and
    /// must be dropped from any cart before checkout.
    pub variant_id: String,
    pub sku: String,
    pub weight: String,
    pub vendor: String,
    pub brand: String,
    pub collections: Vec<CollectionRef>,
}

impl Product {
    /// Whether this product can be added to an upstream cart.
    #[must_use]
    pub fn is_purchasable(&self) -> bool {
        !self.variant_id.is_empty()
    }
}

/// The three derived sale fields, computed together.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SaleFields {
    pub original_price: Option<f64>,
    pub on_sale: bool,
    pub discount_percent: u8,
}

/// Derive the sale fields from a price and an optional compare-at price.
///
/// A product is on sale only when the compare-at price strictly exceeds the
/// current price; the discount percentage is rounded to the nearest integer.
#[must_use]
pub fn sale_fields(price: f64, compare_at: Option<f64>) -> SaleFields {
    let on_sale = compare_at.is_some_and(|c| c > price);
    let discount_percent = if on_sale {
        compare_at.map_or(0, |c| {
            #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
            {
                (((c - price) / c) * 100.0).round() as u8
            }
        })
    } else {
        0
    };

    SaleFields {
        original_price: compare_at,
        on_sale,
        discount_percent,
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn sale_fields_discounted() {
        let sale = sale_fields(750.0, Some(1000.0));
        assert!(sale.on_sale);
        assert_eq!(sale.discount_percent, 25);
        assert_eq!(sale.original_price, Some(1000.0));
    }

    #[test]
    fn sale_fields_rounds_to_nearest() {
        // (1000 - 667) / 1000 = 33.3% -> 33
        assert_eq!(sale_fields(667.0, Some(1000.0)).discount_percent, 33);
        // (300 - 199) / 300 = 33.67% -> 34
        assert_eq!(sale_fields(199.0, Some(300.0)).discount_percent, 34);
    }

    #[test]
    fn sale_fields_not_discounted() {
        let sale = sale_fields(500.0, Some(500.0));
        assert!(!sale.on_sale);
        assert_eq!(sale.discount_percent, 0);

        let sale = sale_fields(500.0, None);
        assert!(!sale.on_sale);
        assert_eq!(sale.discount_percent, 0);
        assert_eq!(sale.original_price, None);
    }

    #[test]
    fn discount_implies_on_sale_and_higher_original() {
        // Invariant: discount > 0 <=> on_sale <=> original > price
        for (price, compare) in [
            (100.0, Some(200.0)),
            (100.0, Some(100.0)),
            (100.0, Some(50.0)),
            (100.0, None),
            (0.0, Some(10.0)),
        ] {
            let sale = sale_fields(price, compare);
            assert_eq!(sale.discount_percent > 0, sale.on_sale);
            assert_eq!(sale.on_sale, compare.is_some_and(|c| c > price));
        }
    }

    #[test]
    fn product_serializes_camel_case() {
        let product = Product {
            id: "gid://shopify/Product/1".to_string(),
            variant_id: "gid://shopify/ProductVariant/1".to_string(),
            discount_percent: 10,
            on_sale: true,
            original_price: Some(100.0),
            price: 90.0,
            ..Product::default()
        };
        let json = serde_json::to_value(&product).unwrap();
        assert_eq!(json["variantId"], "gid://shopify/ProductVariant/1");
        assert_eq!(json["discountPercent"], 10);
        assert_eq!(json["onSale"], true);
        assert_eq!(json["originalPrice"], 100.0);
    }

    #[test]
    fn purchasable_requires_variant_id() {
        let mut product = Product::default();
        assert!(!product.is_purchasable());
        product.variant_id = "gid://shopify/ProductVariant/1".to_string();
        assert!(product.is_purchasable());
    }
}
