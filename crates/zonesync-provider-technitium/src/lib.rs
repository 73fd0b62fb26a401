// # Technitium DNS API Client
//
// Implements the `DnsApi` trait over the Technitium HTTP API.
//
// ## API Conventions
//
// - The token travels as a query parameter, not a header; that is what the
//   server expects.
// - Responses are a JSON envelope: `{ "status": "ok", "response": {...} }`
//   on success, with an `errorMessage` field otherwise.
// - `overwrite=true` is sent on every add, so creates are upserts and safe
//   to retry.
// - TLS certificate verification is DISABLED: the server is an internal
//   deployment with a private CA. This is a reviewed exception, not a
//   default to copy elsewhere.
//
// ## API Reference
//
// - Add record:    POST `/zones/records/add`
// - Get records:   GET  `/zones/records/get`
// - Delete record: POST `/zones/records/delete`
// - List zone:     GET  `/zones/records/get?listZone=true`

use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;
use tracing::{debug, error, info, warn};

use zonesync_core::record::{RecordType, ZoneRecord};
use zonesync_core::traits::DnsApi;
use zonesync_core::{Error, Result};

/// Default HTTP timeout for API requests
const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(30);

/// Preference sent with MX records; the queue payload carries only the
/// exchange host
const MX_PREFERENCE: &str = "10";

/// Client for the Technitium DNS server API
pub struct TechnitiumClient {
    /// Base URL of the API, e.g. "https://dns.internal/api"
    base_url: String,

    /// API token, sent as a query parameter on every request.
    /// Never log this value.
    token: String,

    /// HTTP client for API requests
    client: reqwest::Client,
}

// Custom Debug implementation that hides the API token
impl std::fmt::Debug for TechnitiumClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TechnitiumClient")
            .field("base_url", &self.base_url)
            .field("token", &"<REDACTED>")
            .finish()
    }
}

impl TechnitiumClient {
    /// Create a new Technitium client
    ///
    /// Fails when the token is empty or the HTTP client cannot be built.
    pub fn new(base_url: impl Into<String>, token: impl Into<String>) -> Result<Self> {
        let base_url = base_url.into();
        let token = token.into();

        if token.is_empty() {
            return Err(Error::config("Technitium API token cannot be empty"));
        }

        // Internal server with a private CA; certificate verification is
        // intentionally off. See the module header.
        let client = reqwest::Client::builder()
            .timeout(DEFAULT_HTTP_TIMEOUT)
            .danger_accept_invalid_certs(true)
            .build()
            .map_err(|e| Error::http(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            token,
            client,
        })
    }

    /// Fully qualified record name the API expects in `domain`
    fn domain(zone: &str, name: &str) -> String {
        format!("{}.{}", name, zone)
    }

    /// The query parameter carrying the record data, per record kind
    fn value_param(record_type: RecordType) -> &'static str {
        match record_type {
            RecordType::A | RecordType::Aaaa => "ipAddress",
            RecordType::Cname => "cname",
            RecordType::Mx => "exchange",
            RecordType::Txt => "text",
        }
    }

    /// Send a request and parse the JSON envelope
    ///
    /// Transport failures and unparsable bodies are errors for the call;
    /// the envelope's `status` field is left for the caller to inspect.
    async fn send(&self, endpoint: &str, params: &[(&str, &str)], post: bool) -> Result<Value> {
        let url = format!("{}/{}", self.base_url, endpoint);

        let request = if post {
            self.client.post(&url)
        } else {
            self.client.get(&url)
        };

        let response = request
            .query(&[("token", self.token.as_str())])
            .query(params)
            .send()
            .await
            .map_err(|e| Error::http(format!("request to {} failed: {}", endpoint, e)))?;

        let status_code = response.status();
        let body: Value = response
            .json()
            .await
            .map_err(|e| Error::http(format!(
                "unparsable response from {} (HTTP {}): {}",
                endpoint, status_code, e
            )))?;

        Ok(body)
    }

    /// The envelope's `status` field, or "" when missing
    fn envelope_status(body: &Value) -> &str {
        body.get("status").and_then(Value::as_str).unwrap_or("")
    }

    /// The envelope's `errorMessage`, or a placeholder
    fn error_message(body: &Value) -> &str {
        body.get("errorMessage")
            .and_then(Value::as_str)
            .unwrap_or("(no error message)")
    }
}

#[async_trait]
impl DnsApi for TechnitiumClient {
    async fn add_record(
        &self,
        zone: &str,
        name: &str,
        record_type: RecordType,
        value: &str,
        ttl: u32,
    ) -> Result<Value> {
        // Fail fast, before any network call
        if value.is_empty() {
            return Err(Error::invalid_input(format!(
                "a value is required for {} records",
                record_type
            )));
        }

        let domain = Self::domain(zone, name);
        let ttl = ttl.to_string();
        let mut params = vec![
            ("domain", domain.as_str()),
            ("zone", zone),
            ("type", record_type.as_str()),
            ("ttl", ttl.as_str()),
            ("overwrite", "true"),
            (Self::value_param(record_type), value),
        ];
        if record_type == RecordType::Mx {
            params.push(("preference", MX_PREFERENCE));
        }

        info!(%domain, record_type = %record_type, "adding record");
        let body = self.send("zones/records/add", &params, true).await?;

        if Self::envelope_status(&body) == "ok" {
            let added = body
                .get("response")
                .and_then(|r| r.get("addedRecord"))
                .cloned()
                .unwrap_or_else(|| body.get("response").cloned().unwrap_or(Value::Null));
            debug!(response = %added, "record added");
            Ok(added)
        } else {
            Err(Error::api(Self::envelope_status(&body), body.to_string()))
        }
    }

    async fn record_exists(&self, zone: &str, name: &str, record_type: RecordType) -> Result<bool> {
        let domain = Self::domain(zone, name);
        let params = [("domain", domain.as_str()), ("zone", zone)];

        let body = match self.send("zones/records/get", &params, false).await {
            Ok(body) => body,
            Err(e) => {
                // This check never raises past this boundary
                error!(%domain, error = %e, "record lookup failed, treating as absent");
                return Ok(false);
            }
        };

        if Self::envelope_status(&body) != "ok" {
            warn!(
                %domain,
                status = Self::envelope_status(&body),
                error_message = Self::error_message(&body),
                "record lookup returned non-ok status"
            );
            return Ok(false);
        }

        let records = body
            .get("response")
            .and_then(|r| r.get("records"))
            .and_then(Value::as_array)
            .cloned()
            .unwrap_or_default();

        let matched: Vec<&Value> = records
            .iter()
            .filter(|r| {
                r.get("type").and_then(Value::as_str) == Some(record_type.as_str())
            })
            .collect();

        if matched.is_empty() {
            debug!(%domain, record_type = %record_type, "no matching records");
            Ok(false)
        } else {
            info!(%domain, matched = ?matched, "record found");
            Ok(true)
        }
    }

    async fn delete_record(
        &self,
        zone: &str,
        name: &str,
        record_type: RecordType,
        value: &str,
    ) -> Result<bool> {
        let domain = Self::domain(zone, name);
        let params = [
            ("domain", domain.as_str()),
            ("zone", zone),
            ("type", record_type.as_str()),
            (Self::value_param(record_type), value),
        ];

        info!(%domain, record_type = %record_type, "deleting record");
        let body = self.send("zones/records/delete", &params, true).await?;

        if Self::envelope_status(&body) == "ok" {
            Ok(true)
        } else {
            warn!(%domain, response = %body, "delete returned non-ok status");
            Ok(false)
        }
    }

    async fn list_zone_records(&self, zone: &str) -> Result<Vec<ZoneRecord>> {
        let params = [("domain", zone), ("zone", zone), ("listZone", "true")];

        let body = self.send("zones/records/get", &params, false).await?;

        if Self::envelope_status(&body) != "ok" {
            // "Nothing listed" is not the same as "zone is empty"
            warn!(
                %zone,
                status = Self::envelope_status(&body),
                error_message = Self::error_message(&body),
                "failed to fetch zone records"
            );
            return Ok(Vec::new());
        }

        let records = body
            .get("response")
            .and_then(|r| r.get("records"))
            .cloned()
            .unwrap_or(Value::Array(Vec::new()));

        let parsed: Vec<ZoneRecord> = serde_json::from_value(records)?;
        Ok(parsed)
    }
}
