// # DNS API Trait
//
// Defines the interface for mutating and inspecting records on the remote
// DNS server. The zonesync-provider-technitium crate provides the real
// implementation; tests substitute scripted doubles.
//
// Implementations are isolated and stateless: one API call per invocation,
// no retry logic (the engine retries by re-polling on a fixed interval),
// no caching of remote records.

use async_trait::async_trait;

use crate::record::{RecordType, ZoneRecord};

/// Interface to the remote DNS server API
///
/// # Thread Safety
///
/// Implementations must be thread-safe and usable across async tasks.
#[async_trait]
pub trait DnsApi: Send + Sync {
    /// Create or overwrite a record in the zone (upsert semantics)
    ///
    /// Repeated calls with identical input must be safe to retry.
    /// Implementations must fail fast with [`crate::Error::InvalidInput`]
    /// before any network call when `value` is empty.
    ///
    /// # Returns
    ///
    /// - `Ok(Value)`: the added-record description from the response body
    /// - `Err(Error)`: input rejected, transport failure, or non-ok status
    async fn add_record(
        &self,
        zone: &str,
        name: &str,
        record_type: RecordType,
        value: &str,
        ttl: u32,
    ) -> Result<serde_json::Value, crate::Error>;

    /// Check whether a record of the given kind exists under `name.zone`
    ///
    /// A non-ok status or a malformed response body yields `Ok(false)`
    /// with a diagnostic; this call never propagates a parse failure.
    async fn record_exists(
        &self,
        zone: &str,
        name: &str,
        record_type: RecordType,
    ) -> Result<bool, crate::Error>;

    /// Delete a record, mirroring `add_record`'s parameterization
    ///
    /// # Returns
    ///
    /// `Ok(true)` only when the server reports an ok status; `Ok(false)`
    /// otherwise, with the response body logged.
    async fn delete_record(
        &self,
        zone: &str,
        name: &str,
        record_type: RecordType,
        value: &str,
    ) -> Result<bool, crate::Error>;

    /// Fetch all records for a zone
    ///
    /// On a non-ok status this returns an empty listing with the status
    /// code and server error message logged. Callers must treat that as
    /// "nothing listed", not as proof the zone is empty.
    async fn list_zone_records(&self, zone: &str) -> Result<Vec<ZoneRecord>, crate::Error>;
}
