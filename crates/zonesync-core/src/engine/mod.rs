//! Reconcile engine
//!
//! The Reconciler drives pending change requests through their lifecycle:
//!
//! ```text
//! ┌─────────────┐      record      ┌─────────────────────┐
//! │   Pending   │───── exists ────▶│ Present-Unvalidated │
//! └─────────────┘                  └─────────────────────┘
//!        │ absent: add_record                │ validation flag set
//!        ▼                                   ▼
//!   (stay Pending,                    ┌───────────┐
//!    retry next cycle)                │ Validated │── delete_record ──▶ Cleaned
//!                                     └───────────┘
//! ```
//!
//! Nothing is persisted locally: each cycle re-derives every entry's state
//! from the remote server and the external validation flag, so a cycle is
//! safe to repeat after any partial failure. Once every entry in the
//! pending set is cleaned, both store keys are cleared.

use std::time::Duration;

use tokio::sync::oneshot;
use tracing::{debug, error, info, warn};

use crate::config::ZoneSyncConfig;
use crate::record::ChangeRequest;
use crate::traits::{DnsApi, QueueStore, ValidationSignal};
use crate::{Error, Result};

/// State of one change request, derived fresh each cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryState {
    /// Not yet confirmed present on the remote server
    Pending,
    /// Present on the server, awaiting the validation flag
    PresentUnvalidated,
    /// Flag set but the record still exists (delete pending or refused)
    Validated,
    /// Record gone from the server; eligible for key cleanup. Terminal.
    Cleaned,
}

/// What happened to one entry within a cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Transition {
    /// `add_record` issued; entry stays Pending until presence is confirmed
    Created,
    /// Present and unvalidated, no action taken
    AwaitingValidation,
    /// Validated but the server refused the delete; stays Validated
    DeleteRefused,
    /// Record deleted this cycle; entry is Cleaned
    Deleted,
    /// Record absent with the flag set; already Cleaned by an earlier cycle
    AlreadyGone,
}

impl Transition {
    /// The state the entry ends the cycle in
    pub(crate) fn end_state(self) -> EntryState {
        match self {
            Transition::Created => EntryState::Pending,
            Transition::AwaitingValidation => EntryState::PresentUnvalidated,
            Transition::DeleteRefused => EntryState::Validated,
            Transition::Deleted | Transition::AlreadyGone => EntryState::Cleaned,
        }
    }
}

/// What one reconciliation cycle did
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CycleReport {
    /// Entries for which `add_record` was issued this cycle
    pub created: usize,
    /// Entries present on the server, still waiting for validation
    pub awaiting_validation: usize,
    /// Entries whose record was deleted this cycle
    pub deleted: usize,
    /// Entries already gone from the server with the flag set
    /// (leftover from an earlier delete whose key cleanup failed)
    pub already_cleaned: usize,
    /// Entries whose API call failed; left in place for the next cycle
    pub failed: usize,
    /// Whether both store keys were cleared this cycle
    pub cleared: bool,
}

impl CycleReport {
    /// Total entries examined this cycle
    pub fn total(&self) -> usize {
        self.created + self.awaiting_validation + self.deleted + self.already_cleaned + self.failed
    }
}

/// The reconciliation state machine
///
/// Owns its collaborators behind trait objects so the daemon, the one-shot
/// runner and the tests all drive the same code.
pub struct Reconciler {
    api: Box<dyn DnsApi>,
    queue: Box<dyn QueueStore>,
    validation: Box<dyn ValidationSignal>,
    zone: String,
    ttl: u32,
    poll_interval: Duration,
}

impl Reconciler {
    /// Create a new reconciler
    ///
    /// Validates the configuration up front; a missing API URL or token
    /// aborts here, before any work starts.
    pub fn new(
        api: Box<dyn DnsApi>,
        queue: Box<dyn QueueStore>,
        validation: Box<dyn ValidationSignal>,
        config: &ZoneSyncConfig,
    ) -> Result<Self> {
        config.validate()?;

        Ok(Self {
            api,
            queue,
            validation,
            zone: config.zone.clone(),
            ttl: config.ttl,
            poll_interval: Duration::from_secs(config.poll_interval_secs),
        })
    }

    /// Run the daemon loop: one cycle, sleep, repeat until SIGINT
    ///
    /// Transient errors from the DNS API or the queue store never exit
    /// the loop; they are logged and the entry retries on the next cycle.
    pub async fn run(&self) -> Result<()> {
        self.run_internal(None).await
    }

    /// Run the daemon loop with a controlled shutdown signal (for tests)
    pub async fn run_with_shutdown(
        &self,
        shutdown_rx: Option<oneshot::Receiver<()>>,
    ) -> Result<()> {
        self.run_internal(shutdown_rx).await
    }

    async fn run_internal(&self, shutdown_rx: Option<oneshot::Receiver<()>>) -> Result<()> {
        info!(
            zone = %self.zone,
            interval_secs = self.poll_interval.as_secs(),
            "starting reconcile loop"
        );

        if let Some(mut rx) = shutdown_rx {
            loop {
                self.cycle_logged().await;

                tokio::select! {
                    _ = tokio::time::sleep(self.poll_interval) => {}
                    _ = &mut rx => {
                        info!("shutdown signal received");
                        break;
                    }
                }
            }
        } else {
            loop {
                self.cycle_logged().await;

                tokio::select! {
                    _ = tokio::time::sleep(self.poll_interval) => {}
                    _ = tokio::signal::ctrl_c() => {
                        info!("shutdown signal received");
                        break;
                    }
                }
            }
        }

        info!("reconcile loop stopped");
        Ok(())
    }

    /// Run one cycle and log the outcome; a failed cycle never escapes
    async fn cycle_logged(&self) {
        match self.run_cycle().await {
            Ok(report) if report.total() == 0 && !report.cleared => {
                debug!("cycle complete, nothing to do");
            }
            Ok(report) => {
                info!(
                    created = report.created,
                    awaiting = report.awaiting_validation,
                    deleted = report.deleted,
                    already_cleaned = report.already_cleaned,
                    failed = report.failed,
                    cleared = report.cleared,
                    "cycle complete"
                );
            }
            Err(e) => {
                error!(error = %e, "reconcile cycle aborted, will retry next interval");
            }
        }
    }

    /// Perform a single reconciliation cycle
    ///
    /// Each entry in the flattened pending sequence is processed in order
    /// and independently: one entry's failure does not affect another's
    /// transition. The store keys are cleared only once every entry has
    /// reached [`EntryState::Cleaned`].
    pub async fn run_cycle(&self) -> Result<CycleReport> {
        let mut report = CycleReport::default();

        let Some(pending) = self.queue.fetch_pending().await? else {
            return Ok(report);
        };

        if pending.records.is_empty() {
            warn!("pending change set contains no records");
            return Ok(report);
        }

        let validated = self.validation.is_complete().await?;
        debug!(validated, entries = pending.records.len(), "evaluating pending set");

        let mut all_cleaned = true;
        for entry in &pending.records {
            match self.reconcile_entry(entry, validated).await {
                Ok(Transition::Created) => {
                    report.created += 1;
                    all_cleaned = false;
                }
                Ok(Transition::AwaitingValidation) => {
                    report.awaiting_validation += 1;
                    all_cleaned = false;
                }
                Ok(Transition::DeleteRefused) => {
                    report.failed += 1;
                    all_cleaned = false;
                }
                Ok(Transition::Deleted) => report.deleted += 1,
                Ok(Transition::AlreadyGone) => report.already_cleaned += 1,
                Err(e) => {
                    error!(
                        record = %entry.name,
                        record_type = %entry.record_type,
                        error = %e,
                        "entry reconciliation failed, leaving state unchanged"
                    );
                    report.failed += 1;
                    all_cleaned = false;
                }
            }
        }

        if all_cleaned {
            match self.queue.clear_pending().await {
                Ok(true) => {
                    info!("all entries cleaned, store keys cleared");
                    report.cleared = true;
                }
                Ok(false) => {
                    warn!("records removed from DNS but store keys not fully cleared, retrying next cycle");
                }
                Err(e) => {
                    warn!(error = %e, "store key cleanup failed, retrying next cycle");
                }
            }
        }

        Ok(report)
    }

    /// Drive one entry through at most one transition
    async fn reconcile_entry(&self, entry: &ChangeRequest, validated: bool) -> Result<Transition> {
        let exists = self
            .api
            .record_exists(&self.zone, &entry.name, entry.record_type)
            .await?;

        match (exists, validated) {
            (true, false) => {
                debug!(record = %entry.name, "record present, awaiting validation");
                Ok(Transition::AwaitingValidation)
            }
            (true, true) => {
                info!(record = %entry.name, "validation complete, removing record");
                if self
                    .api
                    .delete_record(&self.zone, &entry.name, entry.record_type, &entry.value)
                    .await?
                {
                    Ok(Transition::Deleted)
                } else {
                    warn!(record = %entry.name, "delete refused by server, retrying next cycle");
                    Ok(Transition::DeleteRefused)
                }
            }
            (false, true) => {
                // Deleted on a previous cycle whose key cleanup failed;
                // re-adding here would undo the delete we just confirmed.
                debug!(record = %entry.name, "record already removed, pending key cleanup");
                Ok(Transition::AlreadyGone)
            }
            (false, false) => {
                info!(record = %entry.name, record_type = %entry.record_type, "creating record");
                self.api
                    .add_record(&self.zone, &entry.name, entry.record_type, &entry.value, self.ttl)
                    .await?;
                Ok(Transition::Created)
            }
        }
    }

    /// Apply every queued entry once, without validation wait or cleanup
    ///
    /// This is the one-shot "apply from queue" mode: it only creates or
    /// overwrites records and leaves the queue key in place. Returns the
    /// number of records applied.
    pub async fn apply_pending_once(&self) -> Result<usize> {
        let Some(pending) = self.queue.fetch_pending().await? else {
            return Ok(0);
        };

        let mut applied = 0;
        for entry in &pending.records {
            match self
                .api
                .add_record(&self.zone, &entry.name, entry.record_type, &entry.value, self.ttl)
                .await
            {
                Ok(added) => {
                    info!(record = %entry.name, response = %added, "record applied");
                    applied += 1;
                }
                Err(e) => {
                    error!(record = %entry.name, error = %e, "failed to apply record");
                }
            }
        }
        Ok(applied)
    }

    /// Apply one manually specified record
    ///
    /// Input validation happens before any network call: an empty value is
    /// rejected here and the record type was already checked at parse time.
    pub async fn apply_record(
        &self,
        name: &str,
        record_type: crate::record::RecordType,
        value: &str,
    ) -> Result<serde_json::Value> {
        if value.is_empty() {
            return Err(Error::invalid_input(format!(
                "a value is required for {} records",
                record_type
            )));
        }
        self.api
            .add_record(&self.zone, name, record_type, value, self.ttl)
            .await
    }

    /// List and log every record in the zone
    pub async fn list_zone(&self) -> Result<()> {
        let records = self.api.list_zone_records(&self.zone).await?;

        info!(zone = %self.zone, count = records.len(), "zone records");
        for record in &records {
            info!(
                name = %record.name,
                record_type = %record.record_type,
                data = %record.data,
                "record"
            );
        }
        Ok(())
    }
}
