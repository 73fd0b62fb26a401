//! Contract tests for the per-entry state transitions
//!
//! Each test drives a single reconciliation cycle and asserts which API
//! calls were (not) made. States are derived from the remote server and
//! the validation flag, so expectations here are entirely about calls.

mod common;

use common::*;
use zonesync_core::{MemoryQueueStore, Reconciler, RecordType};

fn reconciler(
    api: &MockDnsApi,
    store: &MemoryQueueStore,
    validation: &StaticValidation,
) -> Reconciler {
    Reconciler::new(
        Box::new(api.clone()),
        Box::new(store.clone()),
        Box::new(validation.clone()),
        &test_config("example.com"),
    )
    .expect("reconciler construction succeeds")
}

#[tokio::test]
async fn pending_entry_triggers_create() {
    let api = MockDnsApi::new();
    let store = MemoryQueueStore::new();
    let validation = StaticValidation::new();
    store.set_pending(single_a_record_payload()).await;

    let report = reconciler(&api, &store, &validation)
        .run_cycle()
        .await
        .unwrap();

    assert_eq!(report.created, 1);
    assert_eq!(api.add_calls(), 1);
    assert!(api.has_record("host1", RecordType::A));

    // The queue read is non-destructive
    assert!(store.has_pending().await);
}

#[tokio::test]
async fn existing_record_transitions_without_add() {
    let api = MockDnsApi::new();
    api.seed_record("host1", RecordType::A);
    let store = MemoryQueueStore::new();
    let validation = StaticValidation::new();
    store.set_pending(single_a_record_payload()).await;

    let report = reconciler(&api, &store, &validation)
        .run_cycle()
        .await
        .unwrap();

    assert_eq!(report.awaiting_validation, 1);
    assert_eq!(api.add_calls(), 0, "present entry must not be re-added");
}

#[tokio::test]
async fn unvalidated_entry_performs_no_delete() {
    let api = MockDnsApi::new();
    api.seed_record("host1", RecordType::A);
    let store = MemoryQueueStore::new();
    let validation = StaticValidation::new();
    store.set_pending(single_a_record_payload()).await;

    // Flag absent
    let report = reconciler(&api, &store, &validation)
        .run_cycle()
        .await
        .unwrap();
    assert_eq!(api.delete_calls(), 0);
    assert!(!report.cleared);

    // Flag explicitly false
    store.set_validation("0").await;
    reconciler(&api, &store, &validation)
        .run_cycle()
        .await
        .unwrap();
    assert_eq!(api.delete_calls(), 0);
}

#[tokio::test]
async fn failed_add_leaves_entry_pending() {
    let api = MockDnsApi::new();
    api.fail_adds(true);
    let store = MemoryQueueStore::new();
    let validation = StaticValidation::new();
    store.set_pending(single_a_record_payload()).await;

    let reconciler = reconciler(&api, &store, &validation);

    let report = reconciler.run_cycle().await.unwrap();
    assert_eq!(report.failed, 1);
    assert!(!report.cleared);
    assert!(store.has_pending().await);

    // Next cycle retries the create
    api.fail_adds(false);
    let report = reconciler.run_cycle().await.unwrap();
    assert_eq!(report.created, 1);
    assert_eq!(api.add_calls(), 2);
}

#[tokio::test]
async fn delete_failure_keeps_entry_eligible() {
    let api = MockDnsApi::new();
    api.seed_record("host1", RecordType::A);
    api.refuse_delete("host1");
    let store = MemoryQueueStore::new();
    let validation = StaticValidation::new();
    validation.set_complete(true);
    store.set_pending(single_a_record_payload()).await;

    let reconciler = reconciler(&api, &store, &validation);

    let report = reconciler.run_cycle().await.unwrap();
    assert_eq!(report.failed, 1);
    assert_eq!(api.delete_calls(), 1);
    assert!(!report.cleared, "keys must not be cleared while the record remains");
    assert!(store.has_pending().await);

    // Server accepts the delete on the next cycle
    api.allow_delete("host1");
    let report = reconciler.run_cycle().await.unwrap();
    assert_eq!(report.deleted, 1);
    assert!(report.cleared);
    assert!(!store.has_pending().await);
}

#[tokio::test]
async fn absent_queue_does_no_work() {
    let api = MockDnsApi::new();
    let store = MemoryQueueStore::new();
    let validation = StaticValidation::new();

    let report = reconciler(&api, &store, &validation)
        .run_cycle()
        .await
        .unwrap();

    assert_eq!(report.total(), 0);
    assert_eq!(api.add_calls(), 0);
    assert_eq!(api.delete_calls(), 0);
}

#[tokio::test]
async fn entries_are_processed_independently() {
    let api = MockDnsApi::new();
    // "ready" already exists; "fresh" does not
    api.seed_record("ready", RecordType::Txt);
    let store = MemoryQueueStore::new();
    let validation = StaticValidation::new();
    store
        .set_pending(
            r#"{"records": [
                [{"name": "ready", "type": "TXT", "value": "proof"}],
                [{"name": "fresh", "type": "A", "value": "10.0.0.9"}]
            ]}"#,
        )
        .await;

    let report = reconciler(&api, &store, &validation)
        .run_cycle()
        .await
        .unwrap();

    // Grouped payload flattens to two entries with independent transitions
    assert_eq!(report.awaiting_validation, 1);
    assert_eq!(report.created, 1);
    assert!(api.has_record("fresh", RecordType::A));
}
