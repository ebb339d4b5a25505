use std::time::{Duration, Instant};

use async_trait::async_trait;
use dashmap::DashMap;
use warden_state::{SessionStore, StoreError};

struct Entry {
    value: String,
    expires_at: Option<Instant>,
}

impl Entry {
    fn is_live(&self, now: Instant) -> bool {
        self.expires_at.is_none_or(|deadline| deadline > now)
    }
}

/// In-memory [`SessionStore`]. Intended for tests and local/dev use, not
/// for production — state does not survive a process restart and is not
/// shared across nodes.
///
/// Unlike the bare "no TTL honored" baseline, entries here do carry their
/// own expiry and are treated as absent once it passes; eviction is lazy
/// (checked on access), there is no background sweep.
#[derive(Default)]
pub struct MemoryStore {
    entries: DashMap<String, Entry>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SessionStore for MemoryStore {
    async fn get_key(&self, name: &str) -> Result<Option<String>, StoreError> {
        let now = Instant::now();
        match self.entries.get(name) {
            Some(entry) if entry.is_live(now) => Ok(Some(entry.value.clone())),
            Some(_) => {
                drop(self.entries.remove(name));
                Ok(None)
            }
            None => Ok(None),
        }
    }

    async fn set_key(&self, name: &str, value: &str, ttl_seconds: i64) -> Result<(), StoreError> {
        let expires_at = (ttl_seconds > 0)
            .then(|| Instant::now() + Duration::from_secs(ttl_seconds as u64));
        self.entries.insert(
            name.to_owned(),
            Entry {
                value: value.to_owned(),
                expires_at,
            },
        );
        Ok(())
    }

    async fn delete_key(&self, name: &str) -> Result<bool, StoreError> {
        Ok(self.entries.remove(name).is_some())
    }

    async fn get_keys(&self, prefix: &str) -> Result<Vec<String>, StoreError> {
        let now = Instant::now();
        Ok(self
            .entries
            .iter()
            .filter(|e| e.is_live(now) && e.key().starts_with(prefix))
            .map(|e| e.key().clone())
            .collect())
    }

    async fn get_keys_and_values(&self) -> Result<Vec<(String, String)>, StoreError> {
        let now = Instant::now();
        Ok(self
            .entries
            .iter()
            .filter(|e| e.is_live(now))
            .map(|e| (e.key().clone(), e.value.value.clone()))
            .collect())
    }

    async fn connect(&self) -> Result<(), StoreError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn runs_conformance_suite() {
        let store = MemoryStore::new();
        warden_state::testing::run_store_conformance_tests(&store).await;
    }

    #[tokio::test]
    async fn ttl_zero_means_no_expiry() {
        let store = MemoryStore::new();
        store.set_key("k", "v", 0).await.unwrap();
        assert_eq!(store.get_key("k").await.unwrap().as_deref(), Some("v"));
    }

    #[tokio::test]
    async fn negative_ttl_means_no_expiry() {
        let store = MemoryStore::new();
        store.set_key("k", "v", -5).await.unwrap();
        assert_eq!(store.get_key("k").await.unwrap().as_deref(), Some("v"));
    }

    #[tokio::test]
    async fn expired_entry_reads_as_missing() {
        let store = MemoryStore::new();
        store.entries.insert(
            "k".into(),
            Entry {
                value: "v".into(),
                expires_at: Some(Instant::now() - Duration::from_secs(1)),
            },
        );
        assert!(store.get_key("k").await.unwrap().is_none());
    }
}
