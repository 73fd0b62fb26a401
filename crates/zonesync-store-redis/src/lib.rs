// # Redis Queue Store
//
// Implements `QueueStore` and `ValidationSignal` over two Redis keys:
//
// - the pending key holds a JSON-encoded pending change set, written once
//   by an external producer and read non-destructively here;
// - the validation key holds a stringified integer flag, written by an
//   external validation process.
//
// This system only ever reads the keys and deletes them during cleanup.
// There is no locking discipline: the contract assumes a single producer
// and a single daemon instance per key pair.

use async_trait::async_trait;
use redis::AsyncCommands;
use tracing::{debug, error, warn};

use zonesync_core::record::PendingChangeSet;
use zonesync_core::traits::{coerce_flag, QueueStore, ValidationSignal};
use zonesync_core::{Error, Result, StoreConfig};

/// Redis-backed queue store
///
/// Holds a multiplexed connection handle; clones share the underlying
/// connection.
#[derive(Clone)]
pub struct RedisQueueStore {
    conn: redis::aio::MultiplexedConnection,
    pending_key: String,
    validation_key: String,
}

impl std::fmt::Debug for RedisQueueStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedisQueueStore")
            .field("pending_key", &self.pending_key)
            .field("validation_key", &self.validation_key)
            .finish()
    }
}

impl RedisQueueStore {
    /// Connect to Redis using the store configuration
    pub async fn connect(config: &StoreConfig) -> Result<Self> {
        config.validate()?;

        let url = format!("redis://{}:{}/{}", config.host, config.port, config.db);
        let client = redis::Client::open(url)
            .map_err(|e| Error::store(format!("invalid Redis connection info: {}", e)))?;

        let conn = client
            .get_multiplexed_async_connection()
            .await
            .map_err(|e| {
                Error::store(format!(
                    "failed to connect to Redis at {}:{}: {}",
                    config.host, config.port, e
                ))
            })?;

        Ok(Self {
            conn,
            pending_key: config.pending_key.clone(),
            validation_key: config.validation_key.clone(),
        })
    }

    /// Delete one key; absence counts as success
    async fn delete_key(&self, key: &str) -> bool {
        let mut conn = self.conn.clone();
        match conn.del::<_, i64>(key).await {
            Ok(removed) => {
                debug!(key, removed, "key deleted");
                true
            }
            Err(e) => {
                error!(key, error = %e, "failed to delete key");
                false
            }
        }
    }
}

#[async_trait]
impl QueueStore for RedisQueueStore {
    async fn fetch_pending(&self) -> Result<Option<PendingChangeSet>> {
        let mut conn = self.conn.clone();
        let payload: Option<String> = conn
            .get(&self.pending_key)
            .await
            .map_err(|e| Error::store(format!("failed to read {}: {}", self.pending_key, e)))?;

        let Some(payload) = payload else {
            warn!(key = %self.pending_key, "pending key not found in store");
            return Ok(None);
        };

        // A payload that fails to parse aborts this cycle, not the daemon
        let set: PendingChangeSet = serde_json::from_str(&payload)?;
        debug!(entries = set.records.len(), "pending change set fetched");
        Ok(Some(set))
    }

    async fn clear_pending(&self) -> Result<bool> {
        // Each deletion is attempted regardless of the other's outcome
        let pending_ok = self.delete_key(&self.pending_key).await;
        let validation_ok = self.delete_key(&self.validation_key).await;

        Ok(pending_ok && validation_ok)
    }
}

#[async_trait]
impl ValidationSignal for RedisQueueStore {
    async fn is_complete(&self) -> Result<bool> {
        let mut conn = self.conn.clone();
        let value: Option<String> = conn
            .get(&self.validation_key)
            .await
            .map_err(|e| Error::store(format!("failed to read {}: {}", self.validation_key, e)))?;

        Ok(coerce_flag(value.as_deref()))
    }
}
