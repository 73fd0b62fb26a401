//! Trait seams between the reconcile engine and its external collaborators

pub mod dns_api;
pub mod queue_store;

pub use dns_api::DnsApi;
pub use queue_store::{coerce_flag, QueueStore, ValidationSignal};
