use thiserror::Error;

/// Errors surfaced to callers of the sync agent.
///
/// Remote store failures never appear here; they degrade to the local
/// cache and the pending queue instead.
#[derive(Error, Debug)]
pub enum SyncError {
    #[error("Local cache error: {0}")]
    Cache(#[from] tether_cache::CacheError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Invalid namespace: {0}")]
    InvalidNamespace(String),

    #[error("Invalid agent options: {0}")]
    InvalidOptions(String),
}

pub type Result<T> = std::result::Result<T, SyncError>;
