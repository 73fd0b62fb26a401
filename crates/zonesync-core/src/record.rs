//! Record model for the zonesync system
//!
//! Defines the record-kind enumeration, the change requests read from the
//! pending queue, and the zone records reported by the remote server.

use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;

/// Kind of DNS record this system may create or delete.
///
/// The remote API accepts more types than these; anything outside this set
/// is rejected at parse time, before any network call is made.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RecordType {
    /// A record (IPv4 address)
    A,
    /// AAAA record (IPv6 address)
    #[serde(rename = "AAAA")]
    Aaaa,
    /// CNAME record (canonical name)
    #[serde(rename = "CNAME")]
    Cname,
    /// MX record (mail exchange)
    #[serde(rename = "MX")]
    Mx,
    /// TXT record (free text)
    #[serde(rename = "TXT")]
    Txt,
}

impl RecordType {
    /// All record kinds this system accepts, in wire form
    pub const VALID: [&'static str; 5] = ["A", "AAAA", "CNAME", "MX", "TXT"];

    /// Wire form of the record kind, as the remote API expects it
    pub fn as_str(&self) -> &'static str {
        match self {
            RecordType::A => "A",
            RecordType::Aaaa => "AAAA",
            RecordType::Cname => "CNAME",
            RecordType::Mx => "MX",
            RecordType::Txt => "TXT",
        }
    }
}

impl fmt::Display for RecordType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RecordType {
    type Err = crate::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "A" => Ok(RecordType::A),
            "AAAA" => Ok(RecordType::Aaaa),
            "CNAME" => Ok(RecordType::Cname),
            "MX" => Ok(RecordType::Mx),
            "TXT" => Ok(RecordType::Txt),
            other => Err(crate::Error::invalid_input(format!(
                "record type '{}' is not one of {:?}",
                other,
                Self::VALID
            ))),
        }
    }
}

/// One desired DNS mutation, read from the pending queue.
///
/// `value` carries an IP literal for A/AAAA, a target host for CNAME/MX,
/// and free text for TXT. A payload without a value fails to parse, which
/// is fatal for that request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeRequest {
    /// Record host label within the zone
    pub name: String,

    /// Record kind
    #[serde(rename = "type")]
    pub record_type: RecordType,

    /// Record data
    pub value: String,
}

/// The payload stored under the pending queue key.
///
/// Producers may write `records` either as a flat list or grouped into
/// nested lists; the deserializer flattens everything into one ordered
/// sequence. Group boundaries carry no meaning and are not preserved.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PendingChangeSet {
    #[serde(deserialize_with = "flatten_records")]
    pub records: Vec<ChangeRequest>,
}

/// A `records` element is either a single entry or a group of entries.
#[derive(Deserialize)]
#[serde(untagged)]
enum RecordsElement {
    Entry(ChangeRequest),
    Group(Vec<ChangeRequest>),
}

fn flatten_records<'de, D>(deserializer: D) -> Result<Vec<ChangeRequest>, D::Error>
where
    D: Deserializer<'de>,
{
    let elements = Vec::<RecordsElement>::deserialize(deserializer)?;

    let mut flat = Vec::with_capacity(elements.len());
    for element in elements {
        match element {
            RecordsElement::Entry(entry) => flat.push(entry),
            RecordsElement::Group(group) => flat.extend(group),
        }
    }
    Ok(flat)
}

/// One row from a remote zone listing.
///
/// The type stays a plain string here: listings include kinds this system
/// never mutates (NS, SOA, ...), and the listing is print-only.
#[derive(Debug, Clone, Deserialize)]
pub struct ZoneRecord {
    /// Fully qualified record name
    pub name: String,

    /// Record kind, as reported by the server
    #[serde(rename = "type")]
    pub record_type: String,

    /// Time-to-live, when the server reports one
    #[serde(default)]
    pub ttl: Option<u32>,

    /// Record data, shape varies per kind
    #[serde(rename = "rData", default)]
    pub data: serde_json::Value,
}
