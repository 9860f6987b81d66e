//! Raw deserialization shapes for Shopify GraphQL responses.
//!
//! These mirror the upstream JSON one-to-one (camelCase, edges/node nesting)
//! and are converted into the app-facing types in `sparkle_core` by the
//! catalog and route layers. Fields default aggressively so a missing or
//! null upstream field never fails the whole response.

use serde::Deserialize;

/// `{"edges": [{"node": ...}]}` connection wrapper.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct Connection<T> {
    #[serde(default = "Vec::new")]
    pub edges: Vec<Edge<T>>,
}

/// A single connection edge.
#[derive(Debug, Clone, Deserialize)]
pub struct Edge<T> {
    pub node: T,
}

impl<T> Connection<T> {
    /// Unwrap the edges/node nesting into a plain vector.
    pub fn into_nodes(self) -> Vec<T> {
        self.edges.into_iter().map(|e| e.node).collect()
    }
}

/// Pagination info on a paged connection.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct PageInfo {
    #[serde(default)]
    pub has_next_page: bool,
    #[serde(default)]
    pub end_cursor: Option<String>,
}

/// A paged products connection.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct ProductConnection {
    #[serde(default)]
    pub page_info: PageInfo,
    #[serde(default = "Vec::new")]
    pub edges: Vec<Edge<ProductNode>>,
}

/// A money amount.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct MoneyNode {
    #[serde(default)]
    pub amount: String,
    #[serde(default)]
    pub currency_code: String,
}

/// An image.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct ImageNode {
    #[serde(default)]
    pub url: String,
}

/// A product variant as returned by product queries.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct VariantNode {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub sku: Option<String>,
    #[serde(default)]
    pub price: Option<MoneyNode>,
    #[serde(default)]
    pub compare_at_price: Option<MoneyNode>,
    #[serde(default)]
    pub available_for_sale: Option<bool>,
    #[serde(default)]
    pub quantity_available: Option<i64>,
    #[serde(default)]
    pub weight: Option<f64>,
    #[serde(default)]
    pub weight_unit: Option<String>,
}

/// A collection reference on a product.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct CollectionNode {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub handle: String,
}

/// A product as returned by product queries.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct ProductNode {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub handle: String,
    #[serde(default)]
    pub product_type: String,
    #[serde(default)]
    pub vendor: String,
    #[serde(default = "Vec::new")]
    pub tags: Vec<String>,
    #[serde(default)]
    pub collections: Option<Connection<CollectionNode>>,
    #[serde(default)]
    pub featured_image: Option<ImageNode>,
    #[serde(default)]
    pub images: Option<Connection<ImageNode>>,
    #[serde(default)]
    pub variants: Option<Connection<VariantNode>>,
}

/// `data` shape of the paged products query.
#[derive(Debug, Clone, Deserialize)]
pub struct ProductsData {
    pub products: ProductConnection,
}

/// `data` shape of the single product query.
#[derive(Debug, Clone, Deserialize)]
pub struct ProductData {
    pub product: Option<ProductNode>,
}

/// A collection with its products.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct CollectionProductsNode {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub products: Connection<ProductNode>,
}

/// `data` shape of the collection products query.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CollectionProductsData {
    pub collection_by_handle: Option<CollectionProductsNode>,
}

// =============================================================================
// Cart API
// =============================================================================

/// Totals on a cart.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct CartCost {
    #[serde(default)]
    pub total_amount: Option<MoneyNode>,
    #[serde(default)]
    pub subtotal_amount: Option<MoneyNode>,
    #[serde(default)]
    pub total_tax_amount: Option<MoneyNode>,
}

/// Minimal product reference on a cart line's merchandise.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct MerchandiseProductNode {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub handle: String,
}

/// A `ProductVariant` merchandise on a cart line.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct MerchandiseNode {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub price: Option<MoneyNode>,
    #[serde(default)]
    pub product: Option<MerchandiseProductNode>,
}

/// A cart line.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct CartLineNode {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub quantity: i64,
    #[serde(default)]
    pub merchandise: Option<MerchandiseNode>,
}

/// Buyer identity on a cart.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct BuyerIdentityNode {
    #[serde(default)]
    pub email: Option<String>,
}

/// A cart as returned by the Cart API.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct CartNode {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub checkout_url: String,
    #[serde(default)]
    pub cost: Option<CartCost>,
    #[serde(default)]
    pub lines: Option<Connection<CartLineNode>>,
    #[serde(default)]
    pub buyer_identity: Option<BuyerIdentityNode>,
}

/// A user error on a mutation payload.
#[derive(Debug, Clone, Deserialize)]
pub struct UserError {
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub field: Option<serde_json::Value>,
    #[serde(default)]
    pub message: String,
}

/// Payload shared by the cart mutations.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct CartPayload {
    #[serde(default)]
    pub cart: Option<CartNode>,
    #[serde(default = "Vec::new")]
    pub user_errors: Vec<UserError>,
}

/// `data` shape of the `cartCreate` mutation.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartCreateData {
    pub cart_create: CartPayload,
}

/// `data` shape of the `cartBuyerIdentityUpdate` mutation.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartBuyerIdentityUpdateData {
    pub cart_buyer_identity_update: CartPayload,
}

/// `data` shape of the cart-by-id query.
#[derive(Debug, Clone, Deserialize)]
pub struct CartData {
    pub cart: Option<CartNode>,
}

// =============================================================================
// Customer orders
// =============================================================================

/// A variant on an order line item.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct OrderVariantNode {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub price: Option<MoneyNode>,
    #[serde(default)]
    pub image: Option<ImageNode>,
}

/// A line item on a customer order.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct OrderLineItemNode {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub quantity: i64,
    #[serde(default)]
    pub variant: Option<OrderVariantNode>,
}

/// A customer order.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct OrderNode {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub order_number: i64,
    #[serde(default)]
    pub processed_at: String,
    #[serde(default)]
    pub financial_status: Option<String>,
    #[serde(default)]
    pub fulfillment_status: Option<String>,
    #[serde(default)]
    pub total_price: MoneyNode,
    #[serde(default)]
    pub line_items: Connection<OrderLineItemNode>,
}

/// A customer with their orders.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct CustomerNode {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub orders: Connection<OrderNode>,
}

/// `data` shape of the customer orders query.
#[derive(Debug, Clone, Deserialize)]
pub struct CustomerData {
    pub customer: Option<CustomerNode>,
}

// =============================================================================
// Admin API (draft orders)
// =============================================================================

/// A draft order.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct DraftOrderNode {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub status: Option<String>,
}

/// The completed order attached to a draft order.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct CompletedOrderNode {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub name: String,
}

/// Payload of the `draftOrderCreate` mutation.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct DraftOrderCreatePayload {
    #[serde(default)]
    pub draft_order: Option<DraftOrderNode>,
    #[serde(default = "Vec::new")]
    pub user_errors: Vec<UserError>,
}

/// `data` shape of the `draftOrderCreate` mutation.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DraftOrderCreateData {
    pub draft_order_create: DraftOrderCreatePayload,
}

/// A draft order with its completed order.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct CompletedDraftOrderNode {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub order: Option<CompletedOrderNode>,
}

/// Payload of the `draftOrderComplete` mutation.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct DraftOrderCompletePayload {
    #[serde(default)]
    pub draft_order: Option<CompletedDraftOrderNode>,
    #[serde(default = "Vec::new")]
    pub user_errors: Vec<UserError>,
}

/// `data` shape of the `draftOrderComplete` mutation.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DraftOrderCompleteData {
    pub draft_order_complete: DraftOrderCompletePayload,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn product_node_tolerates_missing_fields() {
        let node: ProductNode = serde_json::from_str(r#"{"id":"gid://shopify/Product/1"}"#)
            .unwrap();
        assert_eq!(node.id, "gid://shopify/Product/1");
        assert!(node.tags.is_empty());
        assert!(node.variants.is_none());
    }

    #[test]
    fn cart_parses_nested_merchandise() {
        let raw = r#"{
            "id": "gid://shopify/Cart/1",
            "checkoutUrl": "https://shop/checkout",
            "cost": {"subtotalAmount": {"amount": "450.0", "currencyCode": "PKR"}},
            "lines": {"edges": [{"node": {
                "id": "line1",
                "quantity": 3,
                "merchandise": {
                    "id": "gid://shopify/ProductVariant/9",
                    "title": "1 Liter",
                    "price": {"amount": "150.0", "currencyCode": "PKR"},
                    "product": {"id": "p1", "title": "Floor Cleaner", "handle": "floor-cleaner"}
                }
            }}]}
        }"#;
        let cart: CartNode = serde_json::from_str(raw).unwrap();
        assert_eq!(cart.checkout_url, "https://shop/checkout");
        let lines = cart.lines.unwrap().into_nodes();
        assert_eq!(lines.len(), 1);
        let merchandise = lines.into_iter().next().unwrap().merchandise.unwrap();
        assert_eq!(merchandise.product.unwrap().handle, "floor-cleaner");
    }

    #[test]
    fn draft_order_create_parses_user_errors() {
        let raw = r#"{"draftOrderCreate": {"draftOrder": null, "userErrors": [
            {"field": ["input", "lineItems"], "message": "Variant is invalid"}
        ]}}"#;
        let data: DraftOrderCreateData = serde_json::from_str(raw).unwrap();
        assert!(data.draft_order_create.draft_order.is_none());
        assert_eq!(data.draft_order_create.user_errors.len(), 1);
    }
}
