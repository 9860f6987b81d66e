//! Notification route handlers: device registration, push delivery, and
//! the stored notification history.

use axum::{
    Json,
    extract::{Query, State},
};
use chrono::Utc;
use serde::Deserialize;
use serde_json::{Value, json};
use sparkle_core::api::{
    RegisterDeviceRequest, RegisterDeviceResponse, SendNotificationRequest,
    SendNotificationResponse,
};

use crate::error::{AppError, Result};
use crate::notifications::DeviceToken;
use crate::notifications::push::{PushMessage, PushOutcome, PushReport};
use crate::state::AppState;

/// `POST /api/notifications/register`
pub async fn register(
    State(state): State<AppState>,
    Json(request): Json<RegisterDeviceRequest>,
) -> Result<Json<RegisterDeviceResponse>> {
    if request.token.is_empty() {
        return Err(AppError::BadRequest("FCM token is required".to_string()));
    }

    let now = Utc::now().to_rfc3339();
    let platform = request.platform.unwrap_or_else(|| "web".to_string());
    let device = DeviceToken {
        token: request.token,
        platform: platform.clone(),
        registered_at: request.timestamp.unwrap_or_else(|| now.clone()),
        last_active: now,
        user_id: request.user_id,
    };

    let device_count = state.registry().register(device).await;
    tracing::info!(platform = %platform, "Registered device");

    Ok(Json(RegisterDeviceResponse {
        success: true,
        message: Some("Device registered successfully".to_string()),
        device_count,
        error: None,
    }))
}

/// Body of `DELETE /api/notifications/unregister`.
#[derive(Debug, Deserialize)]
pub struct UnregisterRequest {
    #[serde(default)]
    pub token: String,
}

/// `DELETE /api/notifications/unregister`
pub async fn unregister(
    State(state): State<AppState>,
    Json(request): Json<UnregisterRequest>,
) -> Result<Json<Value>> {
    if request.token.is_empty() {
        return Err(AppError::BadRequest("Token is required".to_string()));
    }

    let removed = state.registry().unregister(&request.token).await;
    Ok(Json(json!({
        "success": true,
        "message": if removed { "Device unregistered" } else { "Device not found" },
    })))
}

/// Send to a list of tokens, recording deliveries and pruning dead tokens.
async fn deliver(state: &AppState, tokens: &[String], request: &SendNotificationRequest) -> PushReport {
    let mut data = json!({ "type": request.kind.clone().unwrap_or_else(|| "general".to_string()) });
    if let (Some(target), Some(extra)) = (
        data.as_object_mut(),
        request.data.as_ref().and_then(Value::as_object),
    ) {
        for (k, v) in extra {
            target.insert(k.clone(), v.clone());
        }
    }

    let message = PushMessage {
        title: request.title.clone(),
        body: request.body.clone(),
        image_url: request.image_url.clone(),
        data: data.clone(),
    };

    let mut report = PushReport::default();
    for token in tokens {
        match state.push().send(token, &message).await {
            PushOutcome::Delivered => {
                report.sent += 1;
                state
                    .registry()
                    .record("sent", token, &request.title, &request.body, data.clone(), None)
                    .await;
            }
            PushOutcome::InvalidToken => {
                report.failed += 1;
                state.registry().prune(token).await;
            }
            PushOutcome::Failed => report.failed += 1,
        }
    }

    tracing::info!(sent = report.sent, failed = report.failed, "Push send complete");
    report
}

/// `POST /api/notifications/send`
///
/// Broadcasts to every registered device, or to one user's devices when
/// `userId` is present.
pub async fn send(
    State(state): State<AppState>,
    Json(request): Json<SendNotificationRequest>,
) -> Result<Json<SendNotificationResponse>> {
    if request.title.is_empty() || request.body.is_empty() {
        return Err(AppError::BadRequest(
            "Title and body are required".to_string(),
        ));
    }

    let tokens = state.registry().tokens(request.user_id.as_deref()).await;
    if tokens.is_empty() {
        return Ok(Json(SendNotificationResponse {
            success: true,
            message: Some("No devices registered".to_string()),
            ..SendNotificationResponse::default()
        }));
    }

    let report = deliver(&state, &tokens, &request).await;
    Ok(Json(SendNotificationResponse {
        success: true,
        message: Some(format!(
            "Notification sent to {} devices ({} failed)",
            report.sent, report.failed
        )),
        sent_count: report.sent,
        failed_count: report.failed,
        error: None,
    }))
}

/// `POST /api/notifications/send-to-user`
pub async fn send_to_user(
    State(state): State<AppState>,
    Json(request): Json<SendNotificationRequest>,
) -> Result<Json<SendNotificationResponse>> {
    let Some(user_id) = request.user_id.clone().filter(|u| !u.is_empty()) else {
        return Err(AppError::BadRequest(
            "userId, title, and body are required".to_string(),
        ));
    };
    if request.title.is_empty() || request.body.is_empty() {
        return Err(AppError::BadRequest(
            "userId, title, and body are required".to_string(),
        ));
    }

    let tokens = state.registry().tokens(Some(&user_id)).await;
    if tokens.is_empty() {
        return Ok(Json(SendNotificationResponse {
            success: true,
            message: Some("User has no registered devices".to_string()),
            ..SendNotificationResponse::default()
        }));
    }

    let report = deliver(&state, &tokens, &request).await;
    Ok(Json(SendNotificationResponse {
        success: true,
        message: Some(format!("Notification sent to user's {} devices", report.sent)),
        sent_count: report.sent,
        failed_count: report.failed,
        error: None,
    }))
}

/// `POST /api/notifications/send-to-token`
pub async fn send_to_token(
    State(state): State<AppState>,
    Json(request): Json<SendNotificationRequest>,
) -> Result<Json<SendNotificationResponse>> {
    let Some(token) = request.token.clone().filter(|t| !t.is_empty()) else {
        return Err(AppError::BadRequest(
            "token, title, and body are required".to_string(),
        ));
    };
    if request.title.is_empty() || request.body.is_empty() {
        return Err(AppError::BadRequest(
            "token, title, and body are required".to_string(),
        ));
    }

    let report = deliver(&state, std::slice::from_ref(&token), &request).await;
    let delivered = report.sent > 0;
    Ok(Json(SendNotificationResponse {
        success: delivered,
        message: Some(if delivered {
            "Notification sent!".to_string()
        } else {
            "Failed to send notification".to_string()
        }),
        sent_count: report.sent,
        failed_count: report.failed,
        error: None,
    }))
}

/// Body of `POST /api/notifications/store-received`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoreReceivedRequest {
    #[serde(default)]
    pub token: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub body: String,
    #[serde(default)]
    pub data: Option<Value>,
    #[serde(default)]
    pub timestamp: Option<String>,
}

/// `POST /api/notifications/store-received`
///
/// Clients report notifications they received while the app was in the
/// foreground so the server-side history stays complete.
pub async fn store_received(
    State(state): State<AppState>,
    Json(request): Json<StoreReceivedRequest>,
) -> Result<Json<Value>> {
    if request.token.is_empty() || request.title.is_empty() || request.body.is_empty() {
        return Err(AppError::BadRequest("Required fields missing".to_string()));
    }

    state
        .registry()
        .record(
            "received",
            &request.token,
            &request.title,
            &request.body,
            request.data.unwrap_or_else(|| json!({})),
            request.timestamp,
        )
        .await;

    Ok(Json(json!({
        "success": true,
        "message": "Notification stored successfully",
    })))
}

/// Query of `GET /api/notifications/history`.
#[derive(Debug, Deserialize)]
pub struct HistoryQuery {
    pub token: Option<String>,
}

/// `GET /api/notifications/history?token=`
pub async fn history(
    State(state): State<AppState>,
    Query(query): Query<HistoryQuery>,
) -> Result<Json<Value>> {
    let token = query
        .token
        .filter(|t| !t.is_empty())
        .ok_or_else(|| AppError::BadRequest("Token is required".to_string()))?;

    let notifications = state.registry().history_for_token(&token).await;
    Ok(Json(json!({
        "success": true,
        "count": notifications.len(),
        "notifications": notifications,
    })))
}

/// Query of `GET /api/notifications/user-notifications`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserNotificationsQuery {
    pub user_id: Option<String>,
}

/// `GET /api/notifications/user-notifications?userId=`
pub async fn user_notifications(
    State(state): State<AppState>,
    Query(query): Query<UserNotificationsQuery>,
) -> Result<Json<Value>> {
    let user_id = query
        .user_id
        .filter(|u| !u.is_empty())
        .ok_or_else(|| AppError::BadRequest("userId is required".to_string()))?;

    let notifications = state.registry().history_for_user(&user_id).await;
    Ok(Json(json!({
        "success": true,
        "count": notifications.len(),
        "notifications": notifications,
    })))
}

/// `GET /api/notifications/devices`
pub async fn devices(State(state): State<AppState>) -> Json<Value> {
    let devices = state.registry().device_summaries().await;
    Json(json!({
        "success": true,
        "count": devices.len(),
        "devices": devices,
    }))
}

/// `GET /api/notifications/status`
pub async fn status(State(state): State<AppState>) -> Json<Value> {
    let (registered_devices, stored_notifications) = state.registry().counts().await;
    Json(json!({
        "success": true,
        "status": {
            "fcmConfigured": state.push().is_configured(),
            "registeredDevices": registered_devices,
            "storedNotifications": stored_notifications,
        },
    }))
}
