// # Queue Store & Validation Signal Traits
//
// The pending queue and the validation flag live in a shared key-value
// store written by external processes. This system reads the queue
// non-destructively, polls the flag, and deletes both keys only during
// cleanup.
//
// The validation signal is a separate seam from the queue store so the
// engine can be tested without a live store; the Redis implementation
// happens to provide both.

use async_trait::async_trait;
use tracing::warn;

use crate::record::PendingChangeSet;

/// Typed access to the pending-change-set key
#[async_trait]
pub trait QueueStore: Send + Sync {
    /// Read the pending change set, if any
    ///
    /// An absent key is not an error: it returns `Ok(None)` with a
    /// warn-level diagnostic. Reading does **not** delete the key. A
    /// payload that fails to parse is an error and aborts the cycle.
    async fn fetch_pending(&self) -> Result<Option<PendingChangeSet>, crate::Error>;

    /// Delete the pending key and the validation key
    ///
    /// Each deletion is attempted independently; failing to delete one
    /// key does not prevent attempting the other. `Ok(true)` only when
    /// both deletions (or absences) succeeded. Idempotent: clearing keys
    /// that are already absent reports success.
    async fn clear_pending(&self) -> Result<bool, crate::Error>;
}

/// External signal that a pending change has been confirmed live
///
/// Written by a validation process outside this system; read-only here
/// except for deletion during [`QueueStore::clear_pending`].
#[async_trait]
pub trait ValidationSignal: Send + Sync {
    /// Whether external validation has completed
    ///
    /// An absent flag is `false`. A present value is coerced through
    /// integer parsing (`0` is false, nonzero is true); anything that
    /// fails to parse is treated as `false` with a diagnostic.
    async fn is_complete(&self) -> Result<bool, crate::Error>;
}

/// Coerce a raw validation-flag value to a boolean
///
/// Absent key is `false`. A present value must parse as an integer: `0`
/// is false, nonzero is true. Anything else is fatal for this check only
/// and treated as `false` with a diagnostic.
pub fn coerce_flag(value: Option<&str>) -> bool {
    match value {
        None => false,
        Some(raw) => match raw.trim().parse::<i64>() {
            Ok(n) => n != 0,
            Err(_) => {
                warn!(value = raw, "validation flag is not an integer, treating as incomplete");
                false
            }
        },
    }
}
