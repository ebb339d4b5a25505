use std::sync::Arc;

use async_trait::async_trait;
use warden_core::AnalyticsRecord;
use warden_state::{key::analytics_key, SessionStore};

/// Destination an [`AnalyticsRecord`] is written to. Implementations should
/// expect to be called from a spawned task (the proxy/error terminators
/// never await this directly) and should not assume the original request is
/// still in flight.
#[async_trait]
pub trait AnalyticsSink: Send + Sync {
    async fn emit(&self, record: AnalyticsRecord);
}

/// Writes each record as JSON through the same [`SessionStore`] the
/// sessions live in, under the `analytics-<timekey>-<uuid>` key layout.
pub struct StoreSink {
    store: Arc<dyn SessionStore>,
}

impl StoreSink {
    #[must_use]
    pub fn new(store: Arc<dyn SessionStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl AnalyticsSink for StoreSink {
    async fn emit(&self, record: AnalyticsRecord) {
        let timekey = format!(
            "{:04}{:02}{:02}{:02}",
            record.year, record.month, record.day, record.hour
        );
        let key = analytics_key(&timekey, &uuid::Uuid::new_v4().simple().to_string());
        let Ok(raw) = serde_json::to_string(&record) else {
            tracing::warn!("failed to serialize analytics record");
            return;
        };
        if let Err(err) = self.store.set_key(&key, &raw, 0).await {
            tracing::warn!(error = %err, "failed to write analytics record");
        }
    }
}

/// Discards every record. Wired in when `enable_analytics` is `false`
/// (§6) so the pipeline still has a sink to call without accumulating
/// anything.
#[derive(Default)]
pub struct NullSink;

impl NullSink {
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl AnalyticsSink for NullSink {
    async fn emit(&self, _record: AnalyticsRecord) {}
}

/// In-memory sink used by tests to assert on emitted records without a real
/// store round-trip.
#[derive(Default)]
pub struct MemorySink {
    records: parking_lot::Mutex<Vec<AnalyticsRecord>>,
}

impl MemorySink {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn records(&self) -> Vec<AnalyticsRecord> {
        self.records.lock().clone()
    }
}

#[async_trait]
impl AnalyticsSink for MemorySink {
    async fn emit(&self, record: AnalyticsRecord) {
        self.records.lock().push(record);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use warden_state_memory::MemoryStore;

    fn record() -> AnalyticsRecord {
        AnalyticsRecord::new(
            "GET", "/x", 0, "curl", 200, "key-1", Utc::now(), Some("v1"), "api", "api-1", "org-1",
        )
    }

    #[tokio::test]
    async fn store_sink_writes_under_analytics_prefix() {
        let store = Arc::new(MemoryStore::new());
        let sink = StoreSink::new(store.clone());
        sink.emit(record()).await;
        let all = store.get_keys("analytics-").await.unwrap();
        assert_eq!(all.len(), 1);
    }

    #[tokio::test]
    async fn memory_sink_collects_records() {
        let sink = MemorySink::new();
        sink.emit(record()).await;
        assert_eq!(sink.records().len(), 1);
    }
}
