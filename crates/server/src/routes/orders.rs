//! Customer order history handler.

use axum::{Json, extract::State, http::HeaderMap};
use serde_json::json;
use sparkle_core::api::OrdersResponse;
use sparkle_core::{CartItem, Order, OrderStatus, PaymentMethod, Product};

use crate::error::{AppError, Result};
use crate::shopify::queries;
use crate::shopify::types::{CustomerData, CustomerNode, OrderNode};
use crate::state::AppState;

/// Translate an upstream order into the app-facing shape.
///
/// Customer contact fields are not part of the order payload and get filled
/// from the customer record by the caller.
fn transform_order(order: OrderNode) -> Order {
    let items = order
        .line_items
        .into_nodes()
        .into_iter()
        .map(|item| {
            let variant = item.variant.unwrap_or_default();
            let price = variant
                .price
                .as_ref()
                .and_then(|p| p.amount.parse::<f64>().ok())
                .unwrap_or(0.0);
            CartItem {
                product: Product {
                    id: variant.id.clone(),
                    title: item.title,
                    image: variant.image.map(|i| i.url).unwrap_or_default(),
                    price,
                    variant_id: variant.id,
                    ..Product::default()
                },
                quantity: u32::try_from(item.quantity.max(0)).unwrap_or(0),
            }
        })
        .collect();

    let total = order.total_price.amount.parse::<f64>().unwrap_or(0.0);
    let status = OrderStatus::from_upstream(
        order.financial_status.as_deref().unwrap_or(""),
        order.fulfillment_status.as_deref().unwrap_or(""),
    );

    Order {
        id: order.id.clone(),
        order_number: format!("#{}", order.order_number),
        items,
        subtotal: total,
        delivery_charge: 0.0,
        total,
        payment_method: PaymentMethod::CashOnDelivery,
        status,
        created_at: order.processed_at,
        shopify_order_id: Some(order.id),
        ..Order::default()
    }
}

fn customer_display_name(customer: &CustomerNode) -> String {
    let name = format!(
        "{} {}",
        customer.first_name.as_deref().unwrap_or(""),
        customer.last_name.as_deref().unwrap_or("")
    )
    .trim()
    .to_string();
    if name.is_empty() {
        customer.email.clone()
    } else {
        name
    }
}

/// `GET /api/orders`
///
/// Requires the customer access token as a `Bearer` Authorization header.
pub async fn index(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<OrdersResponse>> {
    let access_token = headers
        .get(axum::http::header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .filter(|t| !t.is_empty())
        .ok_or_else(|| AppError::Unauthorized("Access token required".to_string()))?;

    let client = state.storefront()?;
    let data: CustomerData = client
        .execute(
            queries::CUSTOMER_ORDERS,
            json!({ "customerAccessToken": access_token }),
        )
        .await?;

    let customer = data
        .customer
        .ok_or_else(|| AppError::NotFound("Customer not found".to_string()))?;

    let name = customer_display_name(&customer);
    let mut orders: Vec<Order> = customer
        .orders
        .into_nodes()
        .into_iter()
        .map(|node| {
            let mut order = transform_order(node);
            order.customer_email = customer.email.clone();
            order.customer_name = name.clone();
            order.customer_phone = customer.phone.clone().unwrap_or_default();
            order
        })
        .collect();

    // Newest first
    orders.sort_by(|a, b| b.created_at.cmp(&a.created_at));

    tracing::info!(count = orders.len(), "Fetched customer orders");
    Ok(Json(OrdersResponse {
        success: true,
        orders,
        error: None,
    }))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::shopify::types::{
        Connection, Edge, ImageNode, MoneyNode, OrderLineItemNode, OrderVariantNode,
    };

    #[test]
    fn transform_order_maps_status_and_items() {
        let node = OrderNode {
            id: "gid://shopify/Order/5".to_string(),
            order_number: 1042,
            processed_at: "2026-02-10T10:00:00Z".to_string(),
            financial_status: Some("PAID".to_string()),
            fulfillment_status: Some("UNFULFILLED".to_string()),
            total_price: MoneyNode {
                amount: "750.0".to_string(),
                currency_code: "PKR".to_string(),
            },
            line_items: Connection {
                edges: vec![Edge {
                    node: OrderLineItemNode {
                        title: "Dish Wash".to_string(),
                        quantity: 3,
                        variant: Some(OrderVariantNode {
                            id: "variant1".to_string(),
                            price: Some(MoneyNode {
                                amount: "250.0".to_string(),
                                currency_code: "PKR".to_string(),
                            }),
                            image: Some(ImageNode {
                                url: "https://cdn/img.jpg".to_string(),
                            }),
                        }),
                    },
                }],
            },
        };

        let order = transform_order(node);
        assert_eq!(order.order_number, "#1042");
        assert_eq!(order.status, OrderStatus::Processing);
        assert!((order.total - 750.0).abs() < f64::EPSILON);
        assert_eq!(
            order.shopify_order_id.as_deref(),
            Some("gid://shopify/Order/5")
        );

        let item = order.items.first().unwrap();
        assert_eq!(item.quantity, 3);
        assert_eq!(item.product.variant_id, "variant1");
        assert!((item.product.price - 250.0).abs() < f64::EPSILON);
    }

    #[test]
    fn display_name_falls_back_to_email() {
        let customer = CustomerNode {
            email: "a@b.com".to_string(),
            first_name: None,
            last_name: None,
            ..CustomerNode::default()
        };
        assert_eq!(customer_display_name(&customer), "a@b.com");

        let named = CustomerNode {
            email: "a@b.com".to_string(),
            first_name: Some("Sara".to_string()),
            last_name: Some("Khan".to_string()),
            ..CustomerNode::default()
        };
        assert_eq!(customer_display_name(&named), "Sara Khan");
    }
}
