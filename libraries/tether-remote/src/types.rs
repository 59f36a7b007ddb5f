//! Types for remote record store requests and responses.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Table used when none is configured.
pub const DEFAULT_TABLE: &str = "app_data";

/// Request timeout used when none is configured.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Configuration for connecting to the remote record store.
#[derive(Debug, Clone)]
pub struct RemoteConfig {
    /// Base URL of the store (e.g., "https://project.example.co")
    pub url: String,
    /// Static credential sent as both `apikey` and bearer token
    pub api_key: String,
    /// Table holding the records
    pub table: String,
    /// Per-request timeout in seconds
    pub timeout_secs: u64,
}

impl RemoteConfig {
    /// Create a config for the default table.
    pub fn new(url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            api_key: api_key.into(),
            table: DEFAULT_TABLE.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }

    /// Use a different table.
    pub fn with_table(mut self, table: impl Into<String>) -> Self {
        self.table = table.into();
        self
    }

    /// Use a different request timeout.
    pub fn with_timeout_secs(mut self, timeout_secs: u64) -> Self {
        self.timeout_secs = timeout_secs;
        self
    }
}

// =============================================================================
// Record Types
// =============================================================================

/// Identifier of a stored record.
///
/// The store may hand out numeric or textual ids; both are kept as text.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Deserialize)]
#[serde(from = "RawRecordId")]
pub struct RecordId(String);

#[derive(Deserialize)]
#[serde(untagged)]
enum RawRecordId {
    Int(i64),
    Text(String),
}

impl From<RawRecordId> for RecordId {
    fn from(raw: RawRecordId) -> Self {
        match raw {
            RawRecordId::Int(n) => RecordId(n.to_string()),
            RawRecordId::Text(s) => RecordId(s),
        }
    }
}

impl RecordId {
    pub fn new(id: impl Into<String>) -> Self {
        RecordId(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Row returned by an existence lookup (`select=id`).
#[derive(Debug, Deserialize)]
pub(crate) struct RecordRef {
    pub id: RecordId,
}

/// Latest value stored for a key (`select=data,updated_at`).
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct RemoteRecord {
    pub data: serde_json::Value,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

/// Body for record creation.
#[derive(Debug, Serialize)]
pub(crate) struct InsertRecord<'a> {
    pub app_name: &'a str,
    pub data_key: &'a str,
    pub data: &'a serde_json::Value,
}

/// Body for record update.
#[derive(Debug, Serialize)]
pub(crate) struct UpdateRecord<'a> {
    pub data: &'a serde_json::Value,
    pub updated_at: DateTime<Utc>,
}
