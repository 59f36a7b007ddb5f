/// CLI error types
use thiserror::Error;

pub type Result<T> = std::result::Result<T, CliError>;

#[derive(Debug, Error)]
pub enum CliError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Remote store error: {0}")]
    Remote(#[from] tether_remote::RemoteError),

    #[error("Local cache error: {0}")]
    Cache(#[from] tether_cache::CacheError),

    #[error("Sync error: {0}")]
    Sync(#[from] tether_sync::SyncError),

    #[error("Remote store is offline: {0}")]
    Offline(String),

    #[error("Invalid JSON value: {0}")]
    InvalidValue(#[from] serde_json::Error),
}

impl From<config::ConfigError> for CliError {
    fn from(err: config::ConfigError) -> Self {
        CliError::Config(err.to_string())
    }
}
