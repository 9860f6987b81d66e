//! Persisted login session.
//!
//! Holds the logged-in customer and their Storefront access token, and
//! broadcasts login/logout so dependent services (wishlist, orders) can
//! react. Authentication itself happens upstream; this is only the
//! client-side session record.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

use crate::store::KeyValueStore;

const USER_KEY: &str = "sparkle_user";

/// The persisted session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredUser {
    pub email: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    pub access_token: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthEvent {
    LoggedIn(StoredUser),
    LoggedOut,
}

#[derive(Clone)]
pub struct AuthStore {
    store: Arc<dyn KeyValueStore>,
    tx: broadcast::Sender<AuthEvent>,
}

impl AuthStore {
    #[must_use]
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        let (tx, _) = broadcast::channel(16);
        Self { store, tx }
    }

    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<AuthEvent> {
        self.tx.subscribe()
    }

    /// The current session, `None` when logged out. A corrupt record is
    /// dropped as if logged out.
    #[must_use]
    pub fn current_user(&self) -> Option<StoredUser> {
        let raw = self.store.get(USER_KEY)?;
        match serde_json::from_str(&raw) {
            Ok(user) => Some(user),
            Err(e) => {
                tracing::warn!(error = %e, "Corrupt stored session, clearing");
                self.store.remove(USER_KEY);
                None
            }
        }
    }

    #[must_use]
    pub fn access_token(&self) -> Option<String> {
        self.current_user().map(|user| user.access_token)
    }

    pub fn login(&self, user: StoredUser) {
        match serde_json::to_string(&user) {
            Ok(serialized) => {
                if let Err(e) = self.store.set(USER_KEY, &serialized) {
                    tracing::warn!(error = %e, "Failed to persist session");
                }
                tracing::info!(email = %user.email, "Logged in");
                let _ = self.tx.send(AuthEvent::LoggedIn(user));
            }
            Err(e) => tracing::warn!(error = %e, "Failed to serialize session"),
        }
    }

    pub fn logout(&self) {
        self.store.remove(USER_KEY);
        tracing::info!("Logged out");
        let _ = self.tx.send(AuthEvent::LoggedOut);
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    fn user() -> StoredUser {
        StoredUser {
            email: "user@example.com".to_string(),
            name: Some("Sara Khan".to_string()),
            phone: None,
            access_token: "token-123".to_string(),
        }
    }

    #[tokio::test]
    async fn login_persists_and_broadcasts() {
        let auth = AuthStore::new(Arc::new(MemoryStore::new()));
        let mut events = auth.subscribe();

        auth.login(user());
        assert_eq!(events.recv().await.unwrap(), AuthEvent::LoggedIn(user()));
        assert_eq!(auth.current_user(), Some(user()));
        assert_eq!(auth.access_token().as_deref(), Some("token-123"));

        auth.logout();
        assert_eq!(events.recv().await.unwrap(), AuthEvent::LoggedOut);
        assert!(auth.current_user().is_none());
    }

    #[test]
    fn corrupt_session_reads_as_logged_out() {
        let store = Arc::new(MemoryStore::new());
        store.set(USER_KEY, "not json").unwrap();
        let auth = AuthStore::new(store);
        assert!(auth.current_user().is_none());
    }
}
