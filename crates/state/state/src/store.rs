use async_trait::async_trait;

use crate::error::StoreError;

/// Trait for the session/key-value store that backs sessions, analytics
/// records, and OAuth2 client data.
///
/// Implementations must be `Send + Sync` and safe for concurrent access from
/// many request tasks at once. A missing key is signaled as `Ok(None)`, not
/// an error; only genuine backend failures (connection loss, malformed
/// backend response) should return `Err`.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Fetch the value stored under `name`. `Ok(None)` means the key does
    /// not exist (or has expired); this is not an error.
    async fn get_key(&self, name: &str) -> Result<Option<String>, StoreError>;

    /// Overwrite the value stored under `name`. A non-positive `ttl_seconds`
    /// means "persist without expiry".
    async fn set_key(&self, name: &str, value: &str, ttl_seconds: i64) -> Result<(), StoreError>;

    /// Delete the key `name`. Returns `true` if it existed.
    async fn delete_key(&self, name: &str) -> Result<bool, StoreError>;

    /// Every key whose name starts with `prefix`, with the store's internal
    /// namespace prefix (if any) stripped, but `prefix` itself left in.
    async fn get_keys(&self, prefix: &str) -> Result<Vec<String>, StoreError>;

    /// Bulk fetch of every key/value pair currently in the store. Used by
    /// the analytics sink and by admin listing; backends may implement this
    /// expensively (it is not a hot-path operation).
    async fn get_keys_and_values(&self) -> Result<Vec<(String, String)>, StoreError>;

    /// Idempotent connect/reconnect. Implementations lazily reconnect on
    /// first use after a transient failure rather than requiring an
    /// explicit call here; `connect` exists so callers can eagerly
    /// establish a connection at startup and fail fast on misconfiguration.
    async fn connect(&self) -> Result<(), StoreError>;
}
