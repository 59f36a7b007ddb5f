//! Tether Local Cache
//!
//! Synchronous on-device key-value storage that the sync agent writes
//! through on every save. Values are JSON text; keys are namespaced per
//! application with [`namespaced_key`].
//!
//! Two backends are available:
//!   - [`MemoryCache`]: process-local map, gone when the process exits.
//!   - [`RedbCache`]: single-file durable store backed by `redb`.
//!
//! # Example
//!
//! ```rust,no_run
//! use tether_cache::{namespaced_key, LocalCache, RedbCache};
//!
//! # fn example() -> tether_cache::Result<()> {
//! let cache = RedbCache::open("./data/tether.redb")?;
//! cache.set(&namespaced_key("notes", "profile"), r#"{"name":"A"}"#)?;
//! assert!(cache.get("notes_profile")?.is_some());
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]

mod error;
mod memory;
mod redb_cache;

pub use error::{CacheError, Result};
pub use memory::MemoryCache;
pub use redb_cache::RedbCache;

/// Synchronous string key-value store.
///
/// Implementations must be safe to share across tasks; the agent calls
/// them from async code without yielding, so each call should be short.
pub trait LocalCache: Send + Sync {
    /// Read the value stored under `key`.
    fn get(&self, key: &str) -> Result<Option<String>>;

    /// Store `value` under `key`, replacing any previous value.
    fn set(&self, key: &str, value: &str) -> Result<()>;

    /// Delete `key`. Missing keys are not an error.
    fn remove(&self, key: &str) -> Result<()>;

    /// All stored keys, in backend order.
    fn keys(&self) -> Result<Vec<String>>;
}

/// Cache key for `data_key` inside the `app_name` namespace.
pub fn namespaced_key(app_name: &str, data_key: &str) -> String {
    format!("{}_{}", app_name, data_key)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_namespaced_key() {
        assert_eq!(namespaced_key("notes", "profile"), "notes_profile");
        assert_eq!(namespaced_key("park", "a_b"), "park_a_b");
    }
}
