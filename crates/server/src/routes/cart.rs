//! Cart route handlers.
//!
//! The upstream Checkout API is deprecated; these handlers drive the Cart
//! API and translate carts back into the checkout shape the app expects.

use axum::{
    Json,
    extract::{Path, State},
};
use serde_json::json;
use sparkle_core::api::{
    AssociateCustomerRequest, CheckoutResponse, CreateCheckoutRequest, UpdateShippingAddressRequest,
};
use sparkle_core::{
    Checkout, CheckoutLineEdge, CheckoutLineItem, CheckoutLines, CheckoutVariant, Money, ProductRef,
};

use crate::error::{AppError, Result};
use crate::shopify::types::{CartBuyerIdentityUpdateData, CartCreateData, CartData, CartNode};
use crate::shopify::{join_user_errors, queries};
use crate::state::AppState;

/// Fallback note on the swallowed-failure shipping path.
const ADDRESS_AT_CHECKOUT: &str = "Address will be entered on checkout page";

fn money(node: Option<crate::shopify::types::MoneyNode>) -> Money {
    node.map_or_else(Money::default, |m| Money {
        amount: m.amount,
        currency_code: m.currency_code,
    })
}

/// Translate a cart into the backward-compatible checkout shape.
fn cart_to_checkout(cart: CartNode) -> Checkout {
    let cost = cart.cost.unwrap_or_default();
    let edges = cart
        .lines
        .map(crate::shopify::types::Connection::into_nodes)
        .unwrap_or_default()
        .into_iter()
        .map(|line| {
            let merchandise = line.merchandise.unwrap_or_default();
            let product = merchandise.product.unwrap_or_default();
            CheckoutLineEdge {
                node: CheckoutLineItem {
                    id: line.id,
                    title: if product.title.is_empty() {
                        merchandise.title.clone()
                    } else {
                        product.title.clone()
                    },
                    quantity: line.quantity,
                    variant: CheckoutVariant {
                        id: merchandise.id,
                        title: merchandise.title,
                        price: money(merchandise.price),
                        product: ProductRef {
                            id: product.id,
                            title: product.title,
                            handle: product.handle,
                        },
                    },
                },
            }
        })
        .collect();

    Checkout {
        id: cart.id,
        web_url: cart.checkout_url,
        subtotal_price: money(cost.subtotal_amount),
        total_price: money(cost.total_amount),
        total_tax: money(cost.total_tax_amount),
        line_items: CheckoutLines { edges },
        shipping_address: None,
        email: cart.buyer_identity.and_then(|b| b.email),
        requires_shipping: true,
        available_shipping_rates: None,
        message: None,
    }
}

/// `POST /api/cart/checkout`
pub async fn create_checkout(
    State(state): State<AppState>,
    Json(request): Json<CreateCheckoutRequest>,
) -> Result<Json<CheckoutResponse>> {
    if request.line_items.is_empty() {
        return Err(AppError::BadRequest("Line items are required".to_string()));
    }
    let client = state.storefront()?;

    let lines: Vec<_> = request
        .line_items
        .iter()
        .map(|item| {
            json!({
                "merchandiseId": item.variant_id,
                "quantity": item.quantity.max(1),
            })
        })
        .collect();

    let mut input = json!({ "lines": lines });
    if let (Some(obj), Some(email)) = (input.as_object_mut(), &request.email) {
        obj.insert("buyerIdentity".to_string(), json!({ "email": email }));
    }
    if let (Some(obj), Some(note)) = (input.as_object_mut(), &request.note) {
        obj.insert("note".to_string(), json!(note));
    }

    let data: CartCreateData = client
        .execute(queries::CART_CREATE, json!({ "input": input }))
        .await?;

    let payload = data.cart_create;
    if !payload.user_errors.is_empty() {
        return Err(AppError::BadRequest(join_user_errors(&payload.user_errors)));
    }
    let cart = payload
        .cart
        .ok_or_else(|| AppError::Upstream("Failed to create cart".to_string()))?;

    tracing::info!(cart_id = %cart.id, "Cart created");
    Ok(Json(CheckoutResponse {
        success: true,
        checkout: Some(cart_to_checkout(cart)),
        error: None,
    }))
}

/// `GET /api/cart/checkout/{checkout_id}`
pub async fn get_checkout(
    State(state): State<AppState>,
    Path(checkout_id): Path<String>,
) -> Result<Json<CheckoutResponse>> {
    let client = state.storefront()?;

    let data: CartData = client
        .execute(queries::CART_BY_ID, json!({ "id": checkout_id }))
        .await?;

    let cart = data
        .cart
        .ok_or_else(|| AppError::NotFound("Cart not found".to_string()))?;

    Ok(Json(CheckoutResponse {
        success: true,
        checkout: Some(cart_to_checkout(cart)),
        error: None,
    }))
}

/// `PUT /api/cart/checkout/{checkout_id}/customer`
pub async fn associate_customer(
    State(state): State<AppState>,
    Path(checkout_id): Path<String>,
    Json(request): Json<AssociateCustomerRequest>,
) -> Result<Json<CheckoutResponse>> {
    if request.access_token.is_empty() {
        return Err(AppError::BadRequest("Access token is required".to_string()));
    }
    let client = state.storefront()?;

    let data: CartBuyerIdentityUpdateData = client
        .execute(
            queries::CART_BUYER_IDENTITY_UPDATE,
            json!({
                "cartId": checkout_id,
                "buyerIdentity": { "customerAccessToken": request.access_token },
            }),
        )
        .await?;

    let payload = data.cart_buyer_identity_update;
    if !payload.user_errors.is_empty() {
        return Err(AppError::BadRequest(join_user_errors(&payload.user_errors)));
    }
    let cart = payload
        .cart
        .ok_or_else(|| AppError::Upstream("Failed to associate customer".to_string()))?;

    tracing::info!(cart_id = %checkout_id, "Customer associated with cart");
    Ok(Json(CheckoutResponse {
        success: true,
        checkout: Some(cart_to_checkout(cart)),
        error: None,
    }))
}

/// `PUT /api/cart/checkout/{checkout_id}/shipping-address`
///
/// Upstream rejections are swallowed: the customer can always re-enter the
/// address on the hosted checkout page, so a failed preference update still
/// returns success with an explanatory message.
pub async fn update_shipping_address(
    State(state): State<AppState>,
    Path(checkout_id): Path<String>,
    Json(request): Json<UpdateShippingAddressRequest>,
) -> Result<Json<CheckoutResponse>> {
    if !request.address.is_complete() {
        return Err(AppError::BadRequest(
            "Complete address is required".to_string(),
        ));
    }
    let client = state.storefront()?;
    let address = &request.address;

    let variables = json!({
        "cartId": checkout_id,
        "buyerIdentity": {
            "deliveryAddressPreferences": [{
                "deliveryAddress": {
                    "firstName": address.first_name,
                    "lastName": address.last_name,
                    "address1": address.address1,
                    "address2": address.address2,
                    "city": address.city,
                    "province": address.province,
                    "country": address.country,
                    "zip": address.zip,
                    "phone": address.phone,
                }
            }]
        },
    });

    let result: std::result::Result<CartBuyerIdentityUpdateData, _> = client
        .execute(queries::CART_BUYER_IDENTITY_UPDATE, variables)
        .await;

    let checkout = match result {
        Ok(data) => {
            let payload = data.cart_buyer_identity_update;
            if !payload.user_errors.is_empty() {
                tracing::warn!(
                    errors = %join_user_errors(&payload.user_errors),
                    "Shipping address update warning"
                );
            }
            payload.cart.map_or_else(
                || fallback_checkout(&checkout_id),
                |cart| {
                    tracing::info!(cart_id = %checkout_id, "Shipping address updated");
                    cart_to_checkout(cart)
                },
            )
        }
        Err(e) => {
            tracing::warn!(error = %e, "Shipping address update failed, deferring to checkout page");
            fallback_checkout(&checkout_id)
        }
    };

    Ok(Json(CheckoutResponse {
        success: true,
        checkout: Some(checkout),
        error: None,
    }))
}

fn fallback_checkout(checkout_id: &str) -> Checkout {
    Checkout {
        id: checkout_id.to_string(),
        message: Some(ADDRESS_AT_CHECKOUT.to_string()),
        ..Checkout::default()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::shopify::types::{
        BuyerIdentityNode, CartCost, CartLineNode, Connection, Edge, MerchandiseNode,
        MerchandiseProductNode, MoneyNode,
    };

    #[test]
    fn cart_to_checkout_flattens_merchandise() {
        let cart = CartNode {
            id: "gid://shopify/Cart/1".to_string(),
            checkout_url: "https://shop/checkout".to_string(),
            cost: Some(CartCost {
                subtotal_amount: Some(MoneyNode {
                    amount: "300.0".to_string(),
                    currency_code: "PKR".to_string(),
                }),
                total_amount: None,
                total_tax_amount: None,
            }),
            lines: Some(Connection {
                edges: vec![Edge {
                    node: CartLineNode {
                        id: "line1".to_string(),
                        quantity: 2,
                        merchandise: Some(MerchandiseNode {
                            id: "variant1".to_string(),
                            title: "1L".to_string(),
                            price: Some(MoneyNode {
                                amount: "150.0".to_string(),
                                currency_code: "PKR".to_string(),
                            }),
                            product: Some(MerchandiseProductNode {
                                id: "p1".to_string(),
                                title: "Floor Cleaner".to_string(),
                                handle: "floor-cleaner".to_string(),
                            }),
                        }),
                    },
                }],
            }),
            buyer_identity: Some(BuyerIdentityNode {
                email: Some("a@b.com".to_string()),
            }),
        };

        let checkout = cart_to_checkout(cart);
        assert_eq!(checkout.web_url, "https://shop/checkout");
        assert_eq!(checkout.subtotal_price.amount, "300.0");
        // Missing totals fall back to zero PKR
        assert_eq!(checkout.total_price.currency_code, "PKR");
        assert_eq!(checkout.email.as_deref(), Some("a@b.com"));
        assert!(checkout.requires_shipping);

        let line = &checkout.line_items.edges.first().unwrap().node;
        assert_eq!(line.title, "Floor Cleaner");
        assert_eq!(line.quantity, 2);
        assert_eq!(line.variant.product.handle, "floor-cleaner");
    }

    #[test]
    fn line_title_falls_back_to_variant_title() {
        let cart = CartNode {
            lines: Some(Connection {
                edges: vec![Edge {
                    node: CartLineNode {
                        id: "line1".to_string(),
                        quantity: 1,
                        merchandise: Some(MerchandiseNode {
                            title: "Default Title".to_string(),
                            ..MerchandiseNode::default()
                        }),
                    },
                }],
            }),
            ..CartNode::default()
        };

        let checkout = cart_to_checkout(cart);
        assert_eq!(
            checkout.line_items.edges.first().unwrap().node.title,
            "Default Title"
        );
    }

    #[test]
    fn fallback_checkout_carries_message() {
        let checkout = fallback_checkout("cart-1");
        assert_eq!(checkout.id, "cart-1");
        assert_eq!(checkout.web_url, "");
        assert_eq!(checkout.message.as_deref(), Some(ADDRESS_AT_CHECKOUT));
    }
}
