//! Tether Sync
//!
//! Offline-first synchronization of application state. Every save lands in
//! the local cache first and is mirrored to the remote record store when
//! the host reports connectivity; writes that cannot reach the store are
//! queued and replayed on the next offline-to-online transition.
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use tether_cache::MemoryCache;
//! use tether_remote::{RemoteConfig, RestRecordStore};
//! use tether_sync::{AgentOptions, Connectivity, SyncAgent};
//!
//! let store = Arc::new(RestRecordStore::new(RemoteConfig::new(url, key))?);
//! let connectivity = Connectivity::new(true);
//! let agent = SyncAgent::new(
//!     "notes",
//!     store,
//!     Arc::new(MemoryCache::new()),
//!     connectivity.clone(),
//!     AgentOptions::default(),
//! )?;
//!
//! let outcome = agent.save("profile", serde_json::json!({"name": "A"})).await?;
//! assert!(outcome.local);
//!
//! // Host reports the network went away and came back
//! connectivity.set_online(false);
//! connectivity.set_online(true); // queued writes flush automatically
//! ```

mod agent;
mod connectivity;
mod error;
mod locks;
mod queue;
mod subscription;
mod types;

// Public exports
pub use agent::SyncAgent;
pub use connectivity::Connectivity;
pub use error::{Result, SyncError};
pub use queue::{Enqueued, OverflowPolicy, PendingQueue, QueuePolicy};
pub use subscription::Subscription;
pub use types::{
    AgentOptions, AgentStatus, FlushReport, PendingItem, SaveOutcome, DEFAULT_POLL_INTERVAL,
};
