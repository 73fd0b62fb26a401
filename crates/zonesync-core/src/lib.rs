// # zonesync-core
//
// Core library for the zonesync DNS reconciliation system.
//
// ## Architecture Overview
//
// - **DnsApi**: trait for add/check/delete/list operations on the remote
//   DNS server (implemented by `zonesync-provider-technitium`)
// - **QueueStore**: trait for reading and clearing the pending change set
//   (implemented by `zonesync-store-redis` and `MemoryQueueStore`)
// - **ValidationSignal**: trait for the external "validation complete" flag
// - **Reconciler**: the state machine driving queued changes through
//   create → await validation → delete → clear, plus the one-shot runner
//
// Data flows one direction per cycle: queue store → reconciler → DNS API,
// then back to the queue store for cleanup once every entry is done.

pub mod config;
pub mod engine;
pub mod error;
pub mod record;
pub mod store;
pub mod traits;

// Re-export core types for convenience
pub use config::{ApiConfig, StoreConfig, ZoneSyncConfig};
pub use engine::{CycleReport, EntryState, Reconciler};
pub use error::{Error, Result};
pub use record::{ChangeRequest, PendingChangeSet, RecordType, ZoneRecord};
pub use store::MemoryQueueStore;
pub use traits::{coerce_flag, DnsApi, QueueStore, ValidationSignal};
