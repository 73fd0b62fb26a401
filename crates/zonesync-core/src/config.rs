//! Configuration types for the zonesync system
//!
//! All configuration is explicit and passed to constructors; there is no
//! process-wide mutable state.

use serde::{Deserialize, Serialize};

/// Main zonesync configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ZoneSyncConfig {
    /// Remote DNS API connection settings
    pub api: ApiConfig,

    /// Queue store connection settings
    pub store: StoreConfig,

    /// Zone this process instance manages (e.g. "example.com")
    pub zone: String,

    /// TTL applied to created records, in seconds
    #[serde(default = "default_ttl")]
    pub ttl: u32,

    /// Seconds to sleep between daemon reconciliation cycles
    #[serde(default = "default_poll_interval_secs")]
    pub poll_interval_secs: u64,
}

impl ZoneSyncConfig {
    /// Validate the configuration
    ///
    /// A missing API URL or token is a fatal startup error; the caller is
    /// expected to exit before any work begins.
    pub fn validate(&self) -> Result<(), crate::Error> {
        self.api.validate()?;
        self.store.validate()?;

        if self.zone.is_empty() {
            return Err(crate::Error::config("zone cannot be empty"));
        }

        Ok(())
    }
}

/// Remote DNS API connection settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Base URL of the DNS server API (e.g. "https://dns.internal/api")
    pub base_url: String,

    /// API token, carried as a query parameter on every request
    pub token: String,
}

impl ApiConfig {
    /// Validate the API settings
    pub fn validate(&self) -> Result<(), crate::Error> {
        if self.base_url.is_empty() {
            return Err(crate::Error::config("API base URL is required"));
        }
        if !self.base_url.starts_with("http://") && !self.base_url.starts_with("https://") {
            return Err(crate::Error::config(format!(
                "API base URL must use http or https, got: {}",
                self.base_url
            )));
        }
        if self.token.is_empty() {
            return Err(crate::Error::config("API token is required"));
        }
        Ok(())
    }
}

/// Queue store connection settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Store host
    #[serde(default = "default_store_host")]
    pub host: String,

    /// Store port
    #[serde(default = "default_store_port")]
    pub port: u16,

    /// Database index
    #[serde(default = "default_store_db")]
    pub db: i64,

    /// Key holding the pending change set
    #[serde(default = "default_pending_key")]
    pub pending_key: String,

    /// Key holding the external validation flag
    #[serde(default = "default_validation_key")]
    pub validation_key: String,
}

impl StoreConfig {
    /// Validate the store settings
    pub fn validate(&self) -> Result<(), crate::Error> {
        if self.host.is_empty() {
            return Err(crate::Error::config("store host cannot be empty"));
        }
        if self.pending_key.is_empty() || self.validation_key.is_empty() {
            return Err(crate::Error::config("store key names cannot be empty"));
        }
        if self.pending_key == self.validation_key {
            return Err(crate::Error::config(
                "pending key and validation key must differ",
            ));
        }
        Ok(())
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            host: default_store_host(),
            port: default_store_port(),
            db: default_store_db(),
            pending_key: default_pending_key(),
            validation_key: default_validation_key(),
        }
    }
}

fn default_ttl() -> u32 {
    60
}

fn default_poll_interval_secs() -> u64 {
    300
}

fn default_store_host() -> String {
    "127.0.0.1".to_string()
}

fn default_store_port() -> u16 {
    6379
}

fn default_store_db() -> i64 {
    4
}

fn default_pending_key() -> String {
    "dns_update".to_string()
}

fn default_validation_key() -> String {
    "dns_validation_complete".to_string()
}
