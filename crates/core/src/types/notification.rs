//! Push-notification inbox types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Notification category, used by the UI for filtering and icons.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    OrderUpdate,
    Promotion,
    Discount,
    Sale,
    NewProduct,
    Delivery,
    #[default]
    General,
}

/// A notification as stored in the client inbox.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PushNotification {
    pub id: String,
    pub title: String,
    pub body: String,
    #[serde(rename = "type", default)]
    pub kind: NotificationKind,
    pub timestamp: DateTime<Utc>,
    pub read: bool,
    #[serde(default)]
    pub data: Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
}
