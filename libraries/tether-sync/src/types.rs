use crate::queue::QueuePolicy;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Period between subscription polls when none is configured
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(30);

/// Result of a `save` call
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SaveOutcome {
    /// The remote store confirmed the write
    pub synced: bool,
    /// The local cache holds the value (always true on `Ok`)
    pub local: bool,
    /// Why the remote write failed, if it was attempted and failed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl SaveOutcome {
    pub(crate) fn synced() -> Self {
        Self {
            synced: true,
            local: true,
            error: None,
        }
    }

    pub(crate) fn queued() -> Self {
        Self {
            synced: false,
            local: true,
            error: None,
        }
    }

    pub(crate) fn failed(error: String) -> Self {
        Self {
            synced: false,
            local: true,
            error: Some(error),
        }
    }
}

/// A write waiting for the next flush
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PendingItem {
    pub data_key: String,
    pub data: serde_json::Value,
    pub enqueued_at: DateTime<Utc>,
}

impl PendingItem {
    pub fn new(data_key: impl Into<String>, data: serde_json::Value) -> Self {
        Self {
            data_key: data_key.into(),
            data,
            enqueued_at: Utc::now(),
        }
    }
}

/// Snapshot of agent state
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentStatus {
    pub online: bool,
    pub pending_count: usize,
    pub app_name: String,
}

/// Summary of one flush of the pending queue
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlushReport {
    /// Items taken off the queue
    pub attempted: usize,
    /// Items the remote store confirmed
    pub synced: usize,
    /// Items `save` put back on the queue
    pub requeued: usize,
    /// Items whose local write failed
    pub failed: usize,
}

/// Tuning for a `SyncAgent`
#[derive(Debug, Clone)]
pub struct AgentOptions {
    /// Period of subscription polls
    pub poll_interval: Duration,
    /// Bounds and persistence of the pending queue
    pub queue: QueuePolicy,
    /// On `load`, push a local value up when the store has no record
    pub push_local_on_miss: bool,
}

impl Default for AgentOptions {
    fn default() -> Self {
        Self {
            poll_interval: DEFAULT_POLL_INTERVAL,
            queue: QueuePolicy::default(),
            push_local_on_miss: true,
        }
    }
}
