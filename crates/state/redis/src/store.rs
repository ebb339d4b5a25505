use async_trait::async_trait;
use deadpool_redis::{Config, Pool, Runtime};
use redis::AsyncCommands;
use warden_state::{SessionStore, StoreError};

use crate::config::RedisConfig;

/// Redis-backed implementation of [`SessionStore`].
///
/// Every key is written under `{prefix}:{name}`; the prefix is transparently
/// added on write and stripped on read, and `get_keys`/`get_keys_and_values`
/// strip it from returned key names. Uses a `deadpool-redis` pool so
/// concurrent requests don't serialize on a single connection; a fresh
/// pooled connection is acquired per call, which is how this store "lazily
/// reconnects" after a transient failure — there is no long-lived connection
/// to go stale.
pub struct RedisStore {
    pool: Pool,
    prefix: String,
}

impl RedisStore {
    /// # Errors
    ///
    /// Returns [`StoreError::Connection`] if the pool cannot be created.
    pub fn new(config: &RedisConfig) -> Result<Self, StoreError> {
        let cfg = Config::from_url(&config.url);
        let pool = cfg
            .builder()
            .map(|b| {
                b.max_size(config.pool_size)
                    .wait_timeout(Some(config.connection_timeout))
                    .runtime(Runtime::Tokio1)
                    .build()
            })
            .map_err(|e| StoreError::Connection(e.to_string()))?
            .map_err(|e| StoreError::Connection(e.to_string()))?;

        Ok(Self {
            pool,
            prefix: config.prefix.clone(),
        })
    }

    fn full_key(&self, name: &str) -> String {
        format!("{}:{}", self.prefix, name)
    }

    fn strip_prefix<'a>(&self, key: &'a str) -> &'a str {
        key.strip_prefix(&format!("{}:", self.prefix)).unwrap_or(key)
    }

    async fn conn(&self) -> Result<deadpool_redis::Connection, StoreError> {
        self.pool
            .get()
            .await
            .map_err(|e| StoreError::Connection(e.to_string()))
    }
}

#[async_trait]
impl SessionStore for RedisStore {
    async fn get_key(&self, name: &str) -> Result<Option<String>, StoreError> {
        let mut conn = self.conn().await?;
        conn.get(self.full_key(name))
            .await
            .map_err(|e| StoreError::Backend(e.to_string()))
    }

    async fn set_key(&self, name: &str, value: &str, ttl_seconds: i64) -> Result<(), StoreError> {
        let mut conn = self.conn().await?;
        let key = self.full_key(name);
        if ttl_seconds > 0 {
            let _: () = conn
                .set_ex(&key, value, ttl_seconds as u64)
                .await
                .map_err(|e| StoreError::Backend(e.to_string()))?;
        } else {
            let _: () = conn
                .set(&key, value)
                .await
                .map_err(|e| StoreError::Backend(e.to_string()))?;
        }
        Ok(())
    }

    async fn delete_key(&self, name: &str) -> Result<bool, StoreError> {
        let mut conn = self.conn().await?;
        let deleted: i64 = conn
            .del(self.full_key(name))
            .await
            .map_err(|e| StoreError::Backend(e.to_string()))?;
        Ok(deleted > 0)
    }

    async fn get_keys(&self, prefix: &str) -> Result<Vec<String>, StoreError> {
        let mut conn = self.conn().await?;
        let pattern = format!("{}*", self.full_key(prefix));
        let mut results = Vec::new();
        let mut cursor = 0u64;
        loop {
            let (next_cursor, keys): (u64, Vec<String>) = redis::cmd("SCAN")
                .arg(cursor)
                .arg("MATCH")
                .arg(&pattern)
                .arg("COUNT")
                .arg(200)
                .query_async(&mut conn)
                .await
                .map_err(|e| StoreError::Backend(e.to_string()))?;
            results.extend(keys.into_iter().map(|k| self.strip_prefix(&k).to_owned()));
            cursor = next_cursor;
            if cursor == 0 {
                break;
            }
        }
        Ok(results)
    }

    async fn get_keys_and_values(&self) -> Result<Vec<(String, String)>, StoreError> {
        let mut conn = self.conn().await?;
        let pattern = format!("{}:*", self.prefix);
        let mut results = Vec::new();
        let mut cursor = 0u64;
        loop {
            let (next_cursor, keys): (u64, Vec<String>) = redis::cmd("SCAN")
                .arg(cursor)
                .arg("MATCH")
                .arg(&pattern)
                .arg("COUNT")
                .arg(200)
                .query_async(&mut conn)
                .await
                .map_err(|e| StoreError::Backend(e.to_string()))?;
            for key in keys {
                let value: Option<String> = conn
                    .get(&key)
                    .await
                    .map_err(|e| StoreError::Backend(e.to_string()))?;
                if let Some(value) = value {
                    results.push((self.strip_prefix(&key).to_owned(), value));
                }
            }
            cursor = next_cursor;
            if cursor == 0 {
                break;
            }
        }
        Ok(results)
    }

    async fn connect(&self) -> Result<(), StoreError> {
        self.conn().await.map(|_| ())
    }
}

#[cfg(all(test, feature = "integration"))]
mod integration_tests {
    use super::*;

    fn test_config() -> RedisConfig {
        RedisConfig {
            url: std::env::var("REDIS_URL").unwrap_or_else(|_| "redis://127.0.0.1:6379".into()),
            prefix: format!("warden-test-{}", uuid::Uuid::new_v4()),
            ..RedisConfig::default()
        }
    }

    #[tokio::test]
    #[ignore = "requires a live Redis instance"]
    async fn store_conformance() {
        let config = test_config();
        let store = RedisStore::new(&config).expect("pool creation should succeed");
        warden_state::testing::run_store_conformance_tests(&store).await;
    }
}
