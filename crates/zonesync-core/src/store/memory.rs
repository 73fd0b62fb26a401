// # Memory Queue Store
//
// In-memory implementation of QueueStore and ValidationSignal.
//
// Holds the raw string payloads the way the real store would, including
// the stringified-integer validation flag, so parsing and coercion take
// the same code path as production. Nothing persists across restarts.
//
// Intended for tests and local development; the daemon runs against the
// Redis store.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::warn;

use crate::record::PendingChangeSet;
use crate::traits::{QueueStore, ValidationSignal};
use crate::Error;

#[derive(Debug, Default)]
struct Keys {
    pending: Option<String>,
    validation: Option<String>,
}

/// In-memory queue store
///
/// Both keys live behind one RwLock; clones share the same storage.
#[derive(Debug, Clone, Default)]
pub struct MemoryQueueStore {
    inner: Arc<RwLock<Keys>>,
}

impl MemoryQueueStore {
    /// Create an empty store (no pending set, no validation flag)
    pub fn new() -> Self {
        Self::default()
    }

    /// Write a raw pending payload, as the external producer would
    pub async fn set_pending(&self, payload: impl Into<String>) {
        self.inner.write().await.pending = Some(payload.into());
    }

    /// Write the validation flag, as the external validator would
    pub async fn set_validation(&self, value: impl Into<String>) {
        self.inner.write().await.validation = Some(value.into());
    }

    /// Whether the pending key is present
    pub async fn has_pending(&self) -> bool {
        self.inner.read().await.pending.is_some()
    }

    /// Whether the validation key is present
    pub async fn has_validation(&self) -> bool {
        self.inner.read().await.validation.is_some()
    }
}

#[async_trait]
impl QueueStore for MemoryQueueStore {
    async fn fetch_pending(&self) -> Result<Option<PendingChangeSet>, Error> {
        let guard = self.inner.read().await;
        match guard.pending.as_deref() {
            Some(payload) => {
                let set: PendingChangeSet = serde_json::from_str(payload)?;
                Ok(Some(set))
            }
            None => {
                warn!("pending key not found in queue store");
                Ok(None)
            }
        }
    }

    async fn clear_pending(&self) -> Result<bool, Error> {
        let mut guard = self.inner.write().await;
        guard.pending = None;
        guard.validation = None;
        Ok(true)
    }
}

#[async_trait]
impl ValidationSignal for MemoryQueueStore {
    async fn is_complete(&self) -> Result<bool, Error> {
        let guard = self.inner.read().await;
        Ok(crate::coerce_flag(guard.validation.as_deref()))
    }
}
