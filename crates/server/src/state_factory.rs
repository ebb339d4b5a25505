use std::sync::Arc;

use warden_state::SessionStore;
use warden_state_memory::MemoryStore;
use warden_state_redis::{RedisConfig, RedisStore};

use crate::config::{StorageConfig, StorageType};
use crate::error::ServerError;

/// Construct the configured `SessionStore` backend (§6 `storage.type`).
pub fn create_store(config: &StorageConfig) -> Result<Arc<dyn SessionStore>, ServerError> {
    match config.storage_type {
        StorageType::Memory => Ok(Arc::new(MemoryStore::new())),
        StorageType::Redis => {
            let host = config.host.as_deref().unwrap_or("127.0.0.1");
            let port = config.port.unwrap_or(6379);
            let credentials = match (&config.username, &config.password) {
                (Some(user), Some(pass)) => format!("{user}:{pass}@"),
                (None, Some(pass)) => format!(":{pass}@"),
                _ => String::new(),
            };
            let url = format!("redis://{credentials}{host}:{port}");
            let redis_config = RedisConfig { url, prefix: config.namespace.clone(), ..RedisConfig::default() };
            Ok(Arc::new(RedisStore::new(&redis_config)?))
        }
    }
}
