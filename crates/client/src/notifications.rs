//! Push notification inbox and device registration.
//!
//! The inbox is a newest-first list persisted under a single key. Where
//! the FCM registration token comes from depends on the platform the app
//! is embedded in, so token acquisition sits behind [`PushPlatform`] and
//! the concrete strategy is chosen once at startup.

use std::sync::Arc;

use chrono::Utc;
use serde_json::Value;
use sparkle_core::api::RegisterDeviceRequest;
use sparkle_core::types::{NotificationKind, PushNotification};
use tokio::sync::broadcast;

use crate::api::ApiClient;
use crate::store::KeyValueStore;

const INBOX_KEY: &str = "sparkle_notifications";
const FCM_TOKEN_KEY: &str = "sparkle_fcm_token";

/// Platform-specific push capability.
pub trait PushPlatform: Send + Sync {
    /// Platform tag reported on registration (`web`, `android`, `ios`).
    fn name(&self) -> &'static str;
    fn supported(&self) -> bool;
    /// The FCM registration token, if one could be obtained.
    fn token(&self) -> Option<String>;
}

/// Push backed by a token the embedding app obtained from its FCM SDK.
pub struct ProvidedTokenPlatform {
    name: &'static str,
    token: String,
}

impl ProvidedTokenPlatform {
    #[must_use]
    pub fn new(name: &'static str, token: impl Into<String>) -> Self {
        Self {
            name,
            token: token.into(),
        }
    }
}

impl PushPlatform for ProvidedTokenPlatform {
    fn name(&self) -> &'static str {
        self.name
    }

    fn supported(&self) -> bool {
        !self.token.is_empty()
    }

    fn token(&self) -> Option<String> {
        self.supported().then(|| self.token.clone())
    }
}

/// No push capability. The inbox still works for locally added entries.
pub struct UnsupportedPlatform;

impl PushPlatform for UnsupportedPlatform {
    fn name(&self) -> &'static str {
        "unsupported"
    }

    fn supported(&self) -> bool {
        false
    }

    fn token(&self) -> Option<String> {
        None
    }
}

/// First supported candidate, falling back to [`UnsupportedPlatform`].
#[must_use]
pub fn select_platform(candidates: Vec<Box<dyn PushPlatform>>) -> Box<dyn PushPlatform> {
    candidates
        .into_iter()
        .find(|p| p.supported())
        .unwrap_or_else(|| Box::new(UnsupportedPlatform))
}

#[derive(Clone)]
pub struct NotificationService {
    store: Arc<dyn KeyValueStore>,
    api: ApiClient,
    platform: Arc<dyn PushPlatform>,
    tx: broadcast::Sender<Vec<PushNotification>>,
}

impl NotificationService {
    #[must_use]
    pub fn new(
        store: Arc<dyn KeyValueStore>,
        api: ApiClient,
        platform: Arc<dyn PushPlatform>,
    ) -> Self {
        let (tx, _) = broadcast::channel(16);
        Self {
            store,
            api,
            platform,
            tx,
        }
    }

    /// Receives the full inbox after every change.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<Vec<PushNotification>> {
        self.tx.subscribe()
    }

    /// Inbox contents, newest first. A corrupt inbox reads as empty.
    #[must_use]
    pub fn notifications(&self) -> Vec<PushNotification> {
        self.store
            .get(INBOX_KEY)
            .and_then(|raw| serde_json::from_str(&raw).ok())
            .unwrap_or_default()
    }

    /// Add a notification to the front of the inbox, unread.
    pub fn add(
        &self,
        title: &str,
        body: &str,
        kind: NotificationKind,
        data: Value,
        image_url: Option<String>,
    ) -> PushNotification {
        let notification = PushNotification {
            id: generate_id(),
            title: title.to_string(),
            body: body.to_string(),
            kind,
            timestamp: Utc::now(),
            read: false,
            data,
            image_url,
        };

        let mut inbox = self.notifications();
        inbox.insert(0, notification.clone());
        self.persist(&inbox);
        notification
    }

    pub fn mark_read(&self, id: &str) {
        let mut inbox = self.notifications();
        let mut changed = false;
        for notification in &mut inbox {
            if notification.id == id && !notification.read {
                notification.read = true;
                changed = true;
            }
        }
        if changed {
            self.persist(&inbox);
        }
    }

    pub fn mark_all_read(&self) {
        let mut inbox = self.notifications();
        if inbox.iter().any(|n| !n.read) {
            for notification in &mut inbox {
                notification.read = true;
            }
            self.persist(&inbox);
        }
    }

    pub fn delete(&self, id: &str) {
        let mut inbox = self.notifications();
        let before = inbox.len();
        inbox.retain(|n| n.id != id);
        if inbox.len() != before {
            self.persist(&inbox);
        }
    }

    pub fn clear(&self) {
        self.persist(&[]);
    }

    #[must_use]
    pub fn unread_count(&self) -> usize {
        self.notifications().iter().filter(|n| !n.read).count()
    }

    /// The persisted FCM token, if push was ever enabled here.
    #[must_use]
    pub fn fcm_token(&self) -> Option<String> {
        self.store.get(FCM_TOKEN_KEY)
    }

    /// Obtain and persist this platform's FCM token and register it with
    /// the proxy. Registration is best-effort; a saved token with a failed
    /// registration still counts as enabled.
    pub async fn enable_push(&self, user_id: Option<&str>) -> bool {
        if !self.platform.supported() {
            tracing::debug!(platform = self.platform.name(), "Push not supported");
            return false;
        }
        let Some(token) = self.platform.token() else {
            return false;
        };

        if let Err(e) = self.store.set(FCM_TOKEN_KEY, &token) {
            tracing::warn!(error = %e, "Failed to persist FCM token");
        }

        let request = RegisterDeviceRequest {
            token,
            platform: Some(self.platform.name().to_string()),
            timestamp: Some(Utc::now().to_rfc3339()),
            user_id: user_id.map(ToString::to_string),
        };
        match self.api.register_device(&request).await {
            Ok(response) if response.success => {
                tracing::info!(devices = response.device_count, "Device registered");
            }
            Ok(response) => {
                tracing::warn!(error = ?response.error, "Device registration rejected");
            }
            Err(e) => tracing::warn!(error = %e, "Device registration failed"),
        }
        true
    }

    /// Record a notification that arrived while the app was foregrounded:
    /// into the inbox, and reported to the proxy history best-effort.
    pub async fn handle_incoming(
        &self,
        title: &str,
        body: &str,
        kind: NotificationKind,
        data: Value,
        image_url: Option<String>,
    ) -> PushNotification {
        let notification = self.add(title, body, kind, data.clone(), image_url);
        if let Some(token) = self.fcm_token() {
            if let Err(e) = self.api.store_received(&token, title, body, Some(data)).await {
                tracing::debug!(error = %e, "Failed to report received notification");
            }
        }
        notification
    }

    fn persist(&self, inbox: &[PushNotification]) {
        match serde_json::to_string(inbox) {
            Ok(serialized) => {
                if let Err(e) = self.store.set(INBOX_KEY, &serialized) {
                    tracing::warn!(error = %e, "Failed to persist notifications");
                }
                let _ = self.tx.send(inbox.to_vec());
            }
            Err(e) => tracing::warn!(error = %e, "Failed to serialize notifications"),
        }
    }
}

fn generate_id() -> String {
    let suffix: String = uuid::Uuid::new_v4().simple().to_string().chars().take(9).collect();
    format!("notif_{}_{suffix}", Utc::now().timestamp_millis())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    fn service() -> NotificationService {
        NotificationService::new(
            Arc::new(MemoryStore::new()),
            ApiClient::new("http://localhost:3001"),
            Arc::new(UnsupportedPlatform),
        )
    }

    #[test]
    fn inbox_is_newest_first() {
        let service = service();
        service.add("First", "a", NotificationKind::General, Value::Null, None);
        service.add("Second", "b", NotificationKind::Promotion, Value::Null, None);

        let inbox = service.notifications();
        assert_eq!(inbox.len(), 2);
        assert_eq!(inbox.first().unwrap().title, "Second");
        assert_eq!(service.unread_count(), 2);
    }

    #[test]
    fn mark_read_and_mark_all_read() {
        let service = service();
        let first = service.add("First", "a", NotificationKind::General, Value::Null, None);
        service.add("Second", "b", NotificationKind::General, Value::Null, None);

        service.mark_read(&first.id);
        assert_eq!(service.unread_count(), 1);

        service.mark_all_read();
        assert_eq!(service.unread_count(), 0);
    }

    #[test]
    fn delete_and_clear() {
        let service = service();
        let first = service.add("First", "a", NotificationKind::General, Value::Null, None);
        service.add("Second", "b", NotificationKind::General, Value::Null, None);

        service.delete(&first.id);
        assert_eq!(service.notifications().len(), 1);

        service.clear();
        assert!(service.notifications().is_empty());
    }

    #[tokio::test]
    async fn enable_push_fails_without_platform_support() {
        let service = service();
        assert!(!service.enable_push(Some("user@example.com")).await);
        assert!(service.fcm_token().is_none());
    }

    #[test]
    fn platform_selection_prefers_supported() {
        let platform = select_platform(vec![
            Box::new(UnsupportedPlatform),
            Box::new(ProvidedTokenPlatform::new("android", "fcm-token")),
        ]);
        assert_eq!(platform.name(), "android");
        assert_eq!(platform.token().as_deref(), Some("fcm-token"));

        let fallback = select_platform(vec![Box::new(ProvidedTokenPlatform::new("web", ""))]);
        assert!(!fallback.supported());
    }

    #[test]
    fn generated_ids_are_distinct() {
        let a = generate_id();
        let b = generate_id();
        assert!(a.starts_with("notif_"));
        assert_ne!(a, b);
    }
}
