//! Device token registry and notification history.
//!
//! Registered FCM tokens and sent/received notifications are held in memory
//! behind `RwLock` maps and mirrored to JSON files under the data directory
//! so they survive restarts. Persistence failures are logged and otherwise
//! ignored; the registry keeps serving from memory.

pub mod push;

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::sync::RwLock;
use uuid::Uuid;

const DEVICES_FILE: &str = "devices.json";
const NOTIFICATIONS_FILE: &str = "notifications.json";

/// A registered device token.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceToken {
    pub token: String,
    pub platform: String,
    pub registered_at: String,
    pub last_active: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
}

/// A notification recorded in the history, either sent by us or reported
/// as received by a client.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SentNotification {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    pub token: String,
    pub title: String,
    pub body: String,
    #[serde(default)]
    pub data: Value,
    pub timestamp: String,
    pub delivered: bool,
    pub read: bool,
}

/// A device as exposed by the devices listing (token truncated).
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceSummary {
    pub platform: String,
    pub registered_at: String,
    pub last_active: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    pub token_preview: String,
}

/// Registry of device tokens and notification history.
pub struct NotificationRegistry {
    data_dir: PathBuf,
    devices: RwLock<HashMap<String, DeviceToken>>,
    sent: RwLock<HashMap<String, SentNotification>>,
}

impl NotificationRegistry {
    /// Create a registry, loading any persisted state from `data_dir`.
    #[must_use]
    pub fn load(data_dir: &Path) -> Self {
        let devices: Vec<DeviceToken> = load_json(&data_dir.join(DEVICES_FILE));
        let notifications: Vec<SentNotification> = load_json(&data_dir.join(NOTIFICATIONS_FILE));
        tracing::info!(
            devices = devices.len(),
            notifications = notifications.len(),
            "Loaded notification storage"
        );

        Self {
            data_dir: data_dir.to_path_buf(),
            devices: RwLock::new(devices.into_iter().map(|d| (d.token.clone(), d)).collect()),
            sent: RwLock::new(
                notifications
                    .into_iter()
                    .map(|n| (n.id.clone(), n))
                    .collect(),
            ),
        }
    }

    /// Register (or refresh) a device token. Returns the device count.
    pub async fn register(&self, device: DeviceToken) -> usize {
        let mut devices = self.devices.write().await;
        devices.insert(device.token.clone(), device);
        self.persist_devices(&devices);
        devices.len()
    }

    /// Remove a device token. Returns whether it was registered.
    pub async fn unregister(&self, token: &str) -> bool {
        let mut devices = self.devices.write().await;
        let removed = devices.remove(token).is_some();
        if removed {
            self.persist_devices(&devices);
        }
        removed
    }

    /// Remove a token reported as invalid by the push gateway.
    pub async fn prune(&self, token: &str) {
        let mut devices = self.devices.write().await;
        if devices.remove(token).is_some() {
            tracing::info!("Pruned invalid device token");
            self.persist_devices(&devices);
        }
    }

    /// Tokens for one user, or every registered token when `user_id` is `None`.
    pub async fn tokens(&self, user_id: Option<&str>) -> Vec<String> {
        let devices = self.devices.read().await;
        devices
            .values()
            .filter(|d| user_id.is_none_or(|uid| d.user_id.as_deref() == Some(uid)))
            .map(|d| d.token.clone())
            .collect()
    }

    /// The user a token is registered to, if any.
    pub async fn user_for_token(&self, token: &str) -> Option<String> {
        let devices = self.devices.read().await;
        devices.get(token).and_then(|d| d.user_id.clone())
    }

    /// Truncated device listing for the admin endpoint.
    pub async fn device_summaries(&self) -> Vec<DeviceSummary> {
        let devices = self.devices.read().await;
        devices
            .values()
            .map(|d| DeviceSummary {
                platform: d.platform.clone(),
                registered_at: d.registered_at.clone(),
                last_active: d.last_active.clone(),
                user_id: d.user_id.clone(),
                token_preview: format!("{}...", truncate(&d.token, 20)),
            })
            .collect()
    }

    /// Record a notification in the history with a fresh id.
    pub async fn record(
        &self,
        prefix: &str,
        token: &str,
        title: &str,
        body: &str,
        data: Value,
        timestamp: Option<String>,
    ) -> String {
        let user_id = self.user_for_token(token).await;
        let id = format!("{prefix}_{}_{}", Utc::now().timestamp_millis(), short_id());
        let notification = SentNotification {
            id: id.clone(),
            user_id,
            token: token.to_string(),
            title: title.to_string(),
            body: body.to_string(),
            data,
            timestamp: timestamp.unwrap_or_else(|| Utc::now().to_rfc3339()),
            delivered: true,
            read: false,
        };

        let mut sent = self.sent.write().await;
        sent.insert(id.clone(), notification);
        self.persist_notifications(&sent);
        id
    }

    /// History for one token, newest first.
    pub async fn history_for_token(&self, token: &str) -> Vec<SentNotification> {
        let sent = self.sent.read().await;
        let mut matching: Vec<SentNotification> = sent
            .values()
            .filter(|n| n.token == token)
            .cloned()
            .collect();
        matching.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        matching
    }

    /// History for one user, newest first.
    pub async fn history_for_user(&self, user_id: &str) -> Vec<SentNotification> {
        let sent = self.sent.read().await;
        let mut matching: Vec<SentNotification> = sent
            .values()
            .filter(|n| n.user_id.as_deref() == Some(user_id))
            .cloned()
            .collect();
        matching.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        matching
    }

    /// (registered devices, stored notifications) counts.
    pub async fn counts(&self) -> (usize, usize) {
        let devices = self.devices.read().await.len();
        let sent = self.sent.read().await.len();
        (devices, sent)
    }

    fn persist_devices(&self, devices: &HashMap<String, DeviceToken>) {
        let list: Vec<&DeviceToken> = devices.values().collect();
        save_json(&self.data_dir, DEVICES_FILE, &list);
    }

    fn persist_notifications(&self, sent: &HashMap<String, SentNotification>) {
        let list: Vec<&SentNotification> = sent.values().collect();
        save_json(&self.data_dir, NOTIFICATIONS_FILE, &list);
    }
}

fn load_json<T: serde::de::DeserializeOwned>(path: &Path) -> Vec<T> {
    match std::fs::read_to_string(path) {
        Ok(raw) => serde_json::from_str(&raw).unwrap_or_else(|e| {
            tracing::warn!(path = %path.display(), error = %e, "Failed to parse stored data");
            Vec::new()
        }),
        Err(_) => Vec::new(),
    }
}

fn save_json<T: Serialize>(dir: &Path, file: &str, value: &T) {
    if let Err(e) = std::fs::create_dir_all(dir) {
        tracing::error!(dir = %dir.display(), error = %e, "Failed to create data directory");
        return;
    }
    let path = dir.join(file);
    match serde_json::to_string_pretty(value) {
        Ok(raw) => {
            if let Err(e) = std::fs::write(&path, raw) {
                tracing::error!(path = %path.display(), error = %e, "Failed to persist data");
            }
        }
        Err(e) => tracing::error!(error = %e, "Failed to serialize data"),
    }
}

fn truncate(s: &str, len: usize) -> &str {
    let end = s
        .char_indices()
        .nth(len)
        .map_or_else(|| s.len(), |(i, _)| i);
    s.get(..end).unwrap_or(s)
}

fn short_id() -> String {
    Uuid::new_v4().simple().to_string().chars().take(9).collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;

    fn device(token: &str, user_id: Option<&str>) -> DeviceToken {
        DeviceToken {
            token: token.to_string(),
            platform: "android".to_string(),
            registered_at: "2026-01-01T00:00:00Z".to_string(),
            last_active: "2026-01-01T00:00:00Z".to_string(),
            user_id: user_id.map(ToString::to_string),
        }
    }

    #[tokio::test]
    async fn register_is_idempotent_per_token() {
        let dir = tempfile::tempdir().unwrap();
        let registry = NotificationRegistry::load(dir.path());

        assert_eq!(registry.register(device("tok-a", None)).await, 1);
        assert_eq!(registry.register(device("tok-a", Some("u1"))).await, 1);
        assert_eq!(registry.register(device("tok-b", None)).await, 2);
    }

    #[tokio::test]
    async fn tokens_filter_by_user() {
        let dir = tempfile::tempdir().unwrap();
        let registry = NotificationRegistry::load(dir.path());
        registry.register(device("tok-a", Some("u1"))).await;
        registry.register(device("tok-b", Some("u2"))).await;
        registry.register(device("tok-c", None)).await;

        let all = registry.tokens(None).await;
        assert_eq!(all.len(), 3);

        let u1 = registry.tokens(Some("u1")).await;
        assert_eq!(u1, vec!["tok-a".to_string()]);
    }

    #[tokio::test]
    async fn state_survives_reload() {
        let dir = tempfile::tempdir().unwrap();
        {
            let registry = NotificationRegistry::load(dir.path());
            registry.register(device("tok-a", Some("u1"))).await;
            registry
                .record("sent", "tok-a", "Hello", "World", json!({}), None)
                .await;
        }

        let reloaded = NotificationRegistry::load(dir.path());
        let (devices, notifications) = reloaded.counts().await;
        assert_eq!(devices, 1);
        assert_eq!(notifications, 1);
        assert_eq!(
            reloaded.history_for_user("u1").await.first().unwrap().title,
            "Hello"
        );
    }

    #[tokio::test]
    async fn history_sorts_newest_first() {
        let dir = tempfile::tempdir().unwrap();
        let registry = NotificationRegistry::load(dir.path());
        registry.register(device("tok-a", None)).await;
        registry
            .record(
                "sent",
                "tok-a",
                "Older",
                "b",
                json!({}),
                Some("2026-01-01T00:00:00Z".to_string()),
            )
            .await;
        registry
            .record(
                "sent",
                "tok-a",
                "Newer",
                "b",
                json!({}),
                Some("2026-02-01T00:00:00Z".to_string()),
            )
            .await;

        let history = registry.history_for_token("tok-a").await;
        assert_eq!(history.len(), 2);
        assert_eq!(history.first().unwrap().title, "Newer");
    }

    #[tokio::test]
    async fn unregister_and_prune_remove_tokens() {
        let dir = tempfile::tempdir().unwrap();
        let registry = NotificationRegistry::load(dir.path());
        registry.register(device("tok-a", None)).await;

        assert!(registry.unregister("tok-a").await);
        assert!(!registry.unregister("tok-a").await);

        registry.register(device("tok-b", None)).await;
        registry.prune("tok-b").await;
        assert!(registry.tokens(None).await.is_empty());
    }

    #[test]
    fn truncate_respects_char_boundaries() {
        assert_eq!(truncate("abcdef", 3), "abc");
        assert_eq!(truncate("ab", 20), "ab");
    }
}
