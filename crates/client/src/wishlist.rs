//! Per-user wishlist of product ids.
//!
//! Storage is keyed by the logged-in user's email, so each account keeps
//! its own list and switching accounts swaps lists naturally. All
//! operations are no-ops while logged out.

use std::sync::Arc;

use tokio::sync::broadcast;

use crate::auth::AuthStore;
use crate::store::KeyValueStore;

const KEY_PREFIX: &str = "sparkle_wishlist_";

#[derive(Clone)]
pub struct WishlistService {
    store: Arc<dyn KeyValueStore>,
    auth: AuthStore,
    tx: broadcast::Sender<Vec<String>>,
}

impl WishlistService {
    #[must_use]
    pub fn new(store: Arc<dyn KeyValueStore>, auth: AuthStore) -> Self {
        let (tx, _) = broadcast::channel(16);
        Self { store, auth, tx }
    }

    /// Receives the full product id list after every change.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<Vec<String>> {
        self.tx.subscribe()
    }

    fn key(&self) -> Option<String> {
        self.auth
            .current_user()
            .map(|user| format!("{KEY_PREFIX}{}", user.email))
    }

    /// Product ids in the current user's wishlist. Empty when logged out.
    #[must_use]
    pub fn list(&self) -> Vec<String> {
        let Some(key) = self.key() else {
            return Vec::new();
        };
        self.store
            .get(&key)
            .and_then(|raw| serde_json::from_str(&raw).ok())
            .unwrap_or_default()
    }

    #[must_use]
    pub fn contains(&self, product_id: &str) -> bool {
        self.list().iter().any(|id| id == product_id)
    }

    #[must_use]
    pub fn count(&self) -> usize {
        self.list().len()
    }

    pub fn add(&self, product_id: &str) {
        let mut list = self.list();
        if !list.iter().any(|id| id == product_id) {
            list.push(product_id.to_string());
            self.save(&list);
        }
    }

    pub fn remove(&self, product_id: &str) {
        let mut list = self.list();
        let before = list.len();
        list.retain(|id| id != product_id);
        if list.len() != before {
            self.save(&list);
        }
    }

    /// Returns whether the product is in the wishlist afterwards.
    /// Always `false` while logged out.
    pub fn toggle(&self, product_id: &str) -> bool {
        if self.auth.current_user().is_none() {
            tracing::debug!("Wishlist toggle ignored while logged out");
            return false;
        }
        if self.contains(product_id) {
            self.remove(product_id);
            false
        } else {
            self.add(product_id);
            true
        }
    }

    pub fn clear(&self) {
        if let Some(key) = self.key() {
            self.store.remove(&key);
            let _ = self.tx.send(Vec::new());
        }
    }

    fn save(&self, list: &[String]) {
        let Some(key) = self.key() else {
            return;
        };
        match serde_json::to_string(list) {
            Ok(serialized) => {
                if let Err(e) = self.store.set(&key, &serialized) {
                    tracing::warn!(error = %e, "Failed to persist wishlist");
                }
                let _ = self.tx.send(list.to_vec());
            }
            Err(e) => tracing::warn!(error = %e, "Failed to serialize wishlist"),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::auth::StoredUser;
    use crate::store::MemoryStore;

    fn logged_in(email: &str) -> (WishlistService, AuthStore) {
        let store: Arc<MemoryStore> = Arc::new(MemoryStore::new());
        let auth = AuthStore::new(Arc::clone(&store) as _);
        auth.login(StoredUser {
            email: email.to_string(),
            name: None,
            phone: None,
            access_token: "t".to_string(),
        });
        (WishlistService::new(store as _, auth.clone()), auth)
    }

    #[test]
    fn add_remove_toggle() {
        let (wishlist, _auth) = logged_in("user@example.com");

        assert!(wishlist.toggle("p1"));
        wishlist.add("p2");
        wishlist.add("p2");
        assert_eq!(wishlist.count(), 2);
        assert!(wishlist.contains("p1"));

        assert!(!wishlist.toggle("p1"));
        assert_eq!(wishlist.list(), vec!["p2"]);

        wishlist.remove("p2");
        assert_eq!(wishlist.count(), 0);
    }

    #[test]
    fn logged_out_operations_are_noops() {
        let store: Arc<MemoryStore> = Arc::new(MemoryStore::new());
        let auth = AuthStore::new(Arc::clone(&store) as _);
        let wishlist = WishlistService::new(store as _, auth);

        assert!(!wishlist.toggle("p1"));
        wishlist.add("p1");
        assert_eq!(wishlist.count(), 0);
        assert!(wishlist.list().is_empty());
    }

    #[test]
    fn lists_are_separate_per_user() {
        let (wishlist, auth) = logged_in("a@example.com");
        wishlist.add("p1");

        auth.login(StoredUser {
            email: "b@example.com".to_string(),
            name: None,
            phone: None,
            access_token: "t".to_string(),
        });
        assert!(wishlist.list().is_empty());

        auth.login(StoredUser {
            email: "a@example.com".to_string(),
            name: None,
            phone: None,
            access_token: "t".to_string(),
        });
        assert_eq!(wishlist.list(), vec!["p1"]);
    }
}
