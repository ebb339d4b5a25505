use std::sync::Arc;

use chrono::Utc;
use warden_core::SessionState;
use warden_state::{key::session_key, key::strip_session_prefix, SessionStore};

use crate::error::AuthError;

/// Wraps a [`SessionStore`] with JSON (de)serialization of [`SessionState`],
/// expiry checks, and the TTL-on-write-back rule.
pub struct AuthManager {
    store: Arc<dyn SessionStore>,
}

impl AuthManager {
    #[must_use]
    pub fn new(store: Arc<dyn SessionStore>) -> Self {
        Self { store }
    }

    /// Fetch and deserialize the session for `name`. `Ok(None)` covers both
    /// a missing key and a malformed JSON record — to callers above, an
    /// unauthorized key looks the same either way. Store I/O errors are
    /// logged and also surface as `Ok(None)` ("key not authorised"), never
    /// as a 5xx (§7).
    pub async fn is_key_authorised(&self, name: &str) -> Option<SessionState> {
        let raw = match self.store.get_key(&session_key(name)).await {
            Ok(raw) => raw,
            Err(err) => {
                tracing::warn!(error = %err, "session store error, treating key as unauthorised");
                return None;
            }
        };
        let raw = raw?;
        match serde_json::from_str(&raw) {
            Ok(session) => Some(session),
            Err(err) => {
                tracing::warn!(error = %err, "malformed session record, treating key as unauthorised");
                None
            }
        }
    }

    /// True iff `expires >= 1` and `expires <= now`.
    #[must_use]
    pub fn is_key_expired(&self, session: &SessionState) -> bool {
        session.is_expired(Utc::now().timestamp())
    }

    /// Serialize and write `session` back under `name`, with TTL =
    /// `expires - now + 300`. A non-positive TTL persists without expiry.
    pub async fn update_session(&self, name: &str, session: &SessionState) -> Result<(), AuthError> {
        let now = Utc::now().timestamp();
        let ttl = session.store_ttl_seconds(now);
        let raw = serde_json::to_string(session).expect("SessionState always serializes");
        self.store.set_key(&session_key(name), &raw, ttl).await?;
        Ok(())
    }

    /// Passthrough fetch for the admin surface: raw session, or `None` if
    /// absent/malformed.
    pub async fn get_session_detail(&self, name: &str) -> Option<SessionState> {
        self.is_key_authorised(name).await
    }

    /// Passthrough listing for the admin surface: every session key whose
    /// name starts with `prefix`, with the store's `apikey-` prefix
    /// stripped.
    pub async fn get_sessions(&self, prefix: &str) -> Result<Vec<String>, AuthError> {
        let keys = self.store.get_keys(&session_key(prefix)).await?;
        Ok(keys.iter().map(|k| strip_session_prefix(k).to_owned()).collect())
    }

    pub async fn delete_session(&self, name: &str) -> Result<bool, AuthError> {
        Ok(self.store.delete_key(&session_key(name)).await?)
    }

    /// Write a pre-formatted record under an exact store key, with no TTL
    /// and no `apikey-` prefixing. Used by the admin surface for artifacts
    /// outside the session key-space, e.g. OAuth2 client registrations
    /// under `oauth-data.<api_id>.<sub-prefix>.<id>`.
    pub async fn store_raw(&self, key: &str, value: &str) -> Result<(), AuthError> {
        self.store.set_key(key, value, 0).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use warden_state_memory::MemoryStore;

    fn session() -> SessionState {
        SessionState {
            last_check: 0,
            allowance: 2.0,
            rate: 2.0,
            per: 10.0,
            expires: 0,
            quota_max: -1,
            quota_remaining: 0,
            quota_renews: 0,
            quota_renewal_rate: 0,
            access_rights: Default::default(),
            org_id: String::new(),
        }
    }

    #[tokio::test]
    async fn unknown_key_is_not_authorised() {
        let manager = AuthManager::new(Arc::new(MemoryStore::new()));
        assert!(manager.is_key_authorised("nope").await.is_none());
    }

    #[tokio::test]
    async fn update_then_fetch_round_trips() {
        let manager = AuthManager::new(Arc::new(MemoryStore::new()));
        manager.update_session("abc", &session()).await.unwrap();
        let fetched = manager.is_key_authorised("abc").await.unwrap();
        assert_eq!(fetched.rate, 2.0);
    }

    #[tokio::test]
    async fn malformed_json_is_not_authorised() {
        let store = Arc::new(MemoryStore::new());
        store.set_key(&session_key("bad"), "not json", 0).await.unwrap();
        let manager = AuthManager::new(store);
        assert!(manager.is_key_authorised("bad").await.is_none());
    }

    #[tokio::test]
    async fn prefix_listing_strips_store_prefix() {
        let manager = AuthManager::new(Arc::new(MemoryStore::new()));
        manager.update_session("org1-abc", &session()).await.unwrap();
        manager.update_session("org1-def", &session()).await.unwrap();
        manager.update_session("org2-xyz", &session()).await.unwrap();
        let mut keys = manager.get_sessions("org1-").await.unwrap();
        keys.sort();
        assert_eq!(keys, vec!["org1-abc".to_owned(), "org1-def".to_owned()]);
    }
}
