//! Test doubles and common utilities for the reconcile contract tests
//!
//! The doubles are cheap clones sharing their interior state, so a test
//! can hand one clone to the Reconciler and keep another to script the
//! remote server or read call counters.

use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use zonesync_core::error::Result;
use zonesync_core::record::{PendingChangeSet, RecordType, ZoneRecord};
use zonesync_core::traits::{DnsApi, QueueStore, ValidationSignal};
use zonesync_core::{ApiConfig, Error, MemoryQueueStore, StoreConfig, ZoneSyncConfig};

/// A scripted DNS server double
///
/// Records "exist" when their (name, type) pair is in the set. Adds insert
/// into the set (upsert), deletes remove from it, so multi-cycle scenarios
/// behave like a real server would.
#[derive(Clone, Default)]
pub struct MockDnsApi {
    records: Arc<Mutex<HashSet<(String, String)>>>,
    refuse_delete: Arc<Mutex<HashSet<String>>>,
    fail_add: Arc<AtomicBool>,
    add_count: Arc<AtomicUsize>,
    exists_count: Arc<AtomicUsize>,
    delete_count: Arc<AtomicUsize>,
}

impl MockDnsApi {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-seed a record as existing on the "server"
    pub fn seed_record(&self, name: &str, record_type: RecordType) {
        self.records
            .lock()
            .unwrap()
            .insert((name.to_string(), record_type.as_str().to_string()));
    }

    pub fn has_record(&self, name: &str, record_type: RecordType) -> bool {
        self.records
            .lock()
            .unwrap()
            .contains(&(name.to_string(), record_type.as_str().to_string()))
    }

    /// Make every add return an API error
    pub fn fail_adds(&self, fail: bool) {
        self.fail_add.store(fail, Ordering::SeqCst);
    }

    /// Make deletes for this record name report a non-ok status
    pub fn refuse_delete(&self, name: &str) {
        self.refuse_delete.lock().unwrap().insert(name.to_string());
    }

    pub fn allow_delete(&self, name: &str) {
        self.refuse_delete.lock().unwrap().remove(name);
    }

    pub fn add_calls(&self) -> usize {
        self.add_count.load(Ordering::SeqCst)
    }

    pub fn exists_calls(&self) -> usize {
        self.exists_count.load(Ordering::SeqCst)
    }

    pub fn delete_calls(&self) -> usize {
        self.delete_count.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl DnsApi for MockDnsApi {
    async fn add_record(
        &self,
        _zone: &str,
        name: &str,
        record_type: RecordType,
        value: &str,
        _ttl: u32,
    ) -> Result<serde_json::Value> {
        self.add_count.fetch_add(1, Ordering::SeqCst);

        if value.is_empty() {
            return Err(Error::invalid_input("a value is required"));
        }
        if self.fail_add.load(Ordering::SeqCst) {
            return Err(Error::api("error", "{\"status\":\"error\"}"));
        }

        self.records
            .lock()
            .unwrap()
            .insert((name.to_string(), record_type.as_str().to_string()));

        Ok(serde_json::json!({
            "name": name,
            "type": record_type.as_str(),
            "rData": { "value": value },
        }))
    }

    async fn record_exists(
        &self,
        _zone: &str,
        name: &str,
        record_type: RecordType,
    ) -> Result<bool> {
        self.exists_count.fetch_add(1, Ordering::SeqCst);
        Ok(self.has_record(name, record_type))
    }

    async fn delete_record(
        &self,
        _zone: &str,
        name: &str,
        record_type: RecordType,
        _value: &str,
    ) -> Result<bool> {
        self.delete_count.fetch_add(1, Ordering::SeqCst);

        if self.refuse_delete.lock().unwrap().contains(name) {
            return Ok(false);
        }

        self.records
            .lock()
            .unwrap()
            .remove(&(name.to_string(), record_type.as_str().to_string()));
        Ok(true)
    }

    async fn list_zone_records(&self, _zone: &str) -> Result<Vec<ZoneRecord>> {
        Ok(Vec::new())
    }
}

/// A validation signal the test can flip directly
#[derive(Clone, Default)]
pub struct StaticValidation {
    complete: Arc<AtomicBool>,
}

impl StaticValidation {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_complete(&self, complete: bool) {
        self.complete.store(complete, Ordering::SeqCst);
    }
}

#[async_trait]
impl ValidationSignal for StaticValidation {
    async fn is_complete(&self) -> Result<bool> {
        Ok(self.complete.load(Ordering::SeqCst))
    }
}

/// A queue store whose clear can be made to fail, for partial-success tests
#[derive(Clone)]
pub struct FailingClearStore {
    inner: MemoryQueueStore,
    fail_clear: Arc<AtomicBool>,
}

impl FailingClearStore {
    pub fn new(inner: MemoryQueueStore) -> Self {
        Self {
            inner,
            fail_clear: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn fail_clears(&self, fail: bool) {
        self.fail_clear.store(fail, Ordering::SeqCst);
    }
}

#[async_trait]
impl QueueStore for FailingClearStore {
    async fn fetch_pending(&self) -> Result<Option<PendingChangeSet>> {
        self.inner.fetch_pending().await
    }

    async fn clear_pending(&self) -> Result<bool> {
        if self.fail_clear.load(Ordering::SeqCst) {
            return Ok(false);
        }
        self.inner.clear_pending().await
    }
}

/// Minimal valid configuration for engine tests
pub fn test_config(zone: &str) -> ZoneSyncConfig {
    ZoneSyncConfig {
        api: ApiConfig {
            base_url: "https://dns.test/api".to_string(),
            token: "test-token".to_string(),
        },
        store: StoreConfig::default(),
        zone: zone.to_string(),
        ttl: 60,
        poll_interval_secs: 300,
    }
}

/// One-entry pending payload, as the external producer would write it
pub fn single_a_record_payload() -> &'static str {
    r#"{"records": [{"name": "host1", "type": "A", "value": "10.0.0.5"}]}"#
}
