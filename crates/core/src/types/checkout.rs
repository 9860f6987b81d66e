//! Backward-compatible checkout shape.
//!
//! The upstream Checkout API is deprecated; carts are created through the
//! Cart API and translated back into the checkout shape older consumers
//! expect, including the GraphQL-style `lineItems.edges[].node` nesting.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A monetary amount as the upstream API represents it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Money {
    pub amount: String,
    pub currency_code: String,
}

impl Default for Money {
    fn default() -> Self {
        Self {
            amount: "0".to_string(),
            currency_code: "PKR".to_string(),
        }
    }
}

/// Minimal product reference carried on a checkout line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct ProductRef {
    pub id: String,
    pub title: String,
    pub handle: String,
}

/// Variant data carried on a checkout line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct CheckoutVariant {
    pub id: String,
    pub title: String,
    pub price: Money,
    pub product: ProductRef,
}

/// A single checkout line item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct CheckoutLineItem {
    pub id: String,
    pub title: String,
    pub quantity: i64,
    pub variant: CheckoutVariant,
}

/// GraphQL-style edge wrapper, kept for backward compatibility.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct CheckoutLineEdge {
    pub node: CheckoutLineItem,
}

/// GraphQL-style connection wrapper, kept for backward compatibility.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct CheckoutLines {
    pub edges: Vec<CheckoutLineEdge>,
}

/// The checkout shape returned by the cart proxy endpoints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct Checkout {
    pub id: String,
    /// Upstream-hosted checkout page URL.
    pub web_url: String,
    pub subtotal_price: Money,
    pub total_price: Money,
    pub total_tax: Money,
    pub line_items: CheckoutLines,
    pub shipping_address: Option<Value>,
    pub email: Option<String>,
    pub requires_shipping: bool,
    pub available_shipping_rates: Option<Value>,
    /// Informational note, set on the swallowed-failure shipping path.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn money_defaults_to_pkr() {
        let money = Money::default();
        assert_eq!(money.amount, "0");
        assert_eq!(money.currency_code, "PKR");
        let json = serde_json::to_value(&money).unwrap();
        assert_eq!(json["currencyCode"], "PKR");
    }

    #[test]
    fn checkout_keeps_edges_node_nesting() {
        let checkout = Checkout {
            id: "gid://shopify/Cart/abc".to_string(),
            line_items: CheckoutLines {
                edges: vec![CheckoutLineEdge {
                    node: CheckoutLineItem {
                        title: "Floor Cleaner".to_string(),
                        quantity: 2,
                        ..CheckoutLineItem::default()
                    },
                }],
            },
            ..Checkout::default()
        };
        let json = serde_json::to_value(&checkout).unwrap();
        assert_eq!(json["lineItems"]["edges"][0]["node"]["quantity"], 2);
        assert_eq!(json["webUrl"], "");
    }
}
