//! Draft order creation through the Admin API.

use axum::{Json, extract::State};
use serde_json::json;
use sparkle_core::api::{CreateOrderRequest, CreateOrderResponse};

use crate::error::{AppError, Result};
use crate::shopify::types::{DraftOrderCompleteData, DraftOrderCreateData};
use crate::shopify::{AdminClient, join_user_errors, queries};
use crate::state::AppState;

/// `POST /api/shopify/create-order`
///
/// Creates a draft order and then tries to complete it. Completion failures
/// are tolerated: the draft order already exists in the store, so the
/// response still reports success with the draft order id.
pub async fn create_order(
    State(state): State<AppState>,
    Json(request): Json<CreateOrderRequest>,
) -> Result<Json<CreateOrderResponse>> {
    if let Some(field) = request.missing_field() {
        return Err(AppError::BadRequest(format!(
            "Missing required field: {field}"
        )));
    }
    if request.items.is_empty() {
        return Err(AppError::BadRequest(
            "Items array is required and must not be empty".to_string(),
        ));
    }

    let client = state.admin()?;
    tracing::info!(order_number = %request.order_number, "Creating order");

    let draft = create_draft_order(client, &request).await?;
    tracing::info!(draft_order_id = %draft.0, "Draft order created");

    let completed = match complete_draft_order(client, &draft.0).await {
        Ok(order) => order,
        Err(e) => {
            tracing::warn!(error = %e, "Failed to complete draft order");
            None
        }
    };
    if let Some((order_id, _)) = &completed {
        tracing::info!(order_id = %order_id, "Order completed");
    }

    let (order_id, order_name) = completed.map_or((None, draft.1), |(id, name)| {
        (Some(id), name)
    });

    Ok(Json(CreateOrderResponse {
        success: true,
        draft_order_id: Some(draft.0),
        order_id,
        order_name: Some(order_name),
        message: Some("Order created successfully in Shopify".to_string()),
        error: None,
    }))
}

/// Create the draft order. Returns (draft order id, draft order name).
async fn create_draft_order(
    client: &AdminClient,
    request: &CreateOrderRequest,
) -> Result<(String, String)> {
    let line_items: Vec<_> = request
        .items
        .iter()
        .map(|item| {
            json!({
                "variantId": item.variant_id,
                "quantity": item.quantity,
            })
        })
        .collect();

    let mut name_parts = request.customer_name.split_whitespace();
    let first_name = name_parts.next().unwrap_or("").to_string();
    let last_name = name_parts.collect::<Vec<_>>().join(" ");

    let address = json!({
        "firstName": first_name,
        "lastName": last_name,
        "address1": request.customer_address,
        "city": request.city,
        "country": "Pakistan",
        "countryCode": "PK",
        "phone": request.customer_phone,
    });

    let payment_label = if request.payment_method == "cod" {
        "Cash on Delivery"
    } else {
        "Bank Transfer"
    };

    let variables = json!({
        "input": {
            "lineItems": line_items,
            "email": request.customer_email,
            "phone": request.customer_phone,
            "shippingAddress": address,
            "billingAddress": address,
            "shippingLine": {
                "title": format!("Delivery to {}", request.city),
                "price": request.delivery_charge.to_string(),
            },
            "note": format!(
                "Sparkle App Order - {}\nPayment Method: {payment_label}",
                request.order_number
            ),
            "tags": ["sparkle-app", request.payment_method],
        }
    });

    let data: DraftOrderCreateData = client
        .execute(queries::DRAFT_ORDER_CREATE, variables)
        .await?;

    let payload = data.draft_order_create;
    if !payload.user_errors.is_empty() {
        return Err(AppError::Upstream(format!(
            "Shopify errors: {}",
            join_user_errors(&payload.user_errors)
        )));
    }
    let draft = payload
        .draft_order
        .ok_or_else(|| AppError::Upstream("Failed to create draft order".to_string()))?;

    Ok((draft.id, draft.name))
}

/// Complete the draft order. Returns (order id, order name) when the order
/// materialized, `None` when upstream reported user errors.
async fn complete_draft_order(
    client: &AdminClient,
    draft_order_id: &str,
) -> Result<Option<(String, String)>> {
    let data: DraftOrderCompleteData = client
        .execute(queries::DRAFT_ORDER_COMPLETE, json!({ "id": draft_order_id }))
        .await?;

    let payload = data.draft_order_complete;
    if !payload.user_errors.is_empty() {
        tracing::warn!(
            errors = %join_user_errors(&payload.user_errors),
            "Draft order completion errors"
        );
        return Ok(None);
    }

    Ok(payload
        .draft_order
        .and_then(|d| d.order)
        .map(|order| (order.id, order.name)))
}
