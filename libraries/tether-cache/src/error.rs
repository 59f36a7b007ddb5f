/// Cache-specific errors
use thiserror::Error;

/// Result type alias using `CacheError`
pub type Result<T> = std::result::Result<T, CacheError>;

/// Cache error types
#[derive(Error, Debug)]
pub enum CacheError {
    /// Database could not be opened or created
    #[error("Cache open error: {0}")]
    Open(#[from] redb::DatabaseError),

    /// Transaction could not be started
    #[error("Cache transaction error: {0}")]
    Transaction(#[from] redb::TransactionError),

    /// Table could not be opened
    #[error("Cache table error: {0}")]
    Table(#[from] redb::TableError),

    /// Read or write failed in the storage layer
    #[error("Cache storage error: {0}")]
    Storage(#[from] redb::StorageError),

    /// Transaction could not be committed
    #[error("Cache commit error: {0}")]
    Commit(#[from] redb::CommitError),

    /// A thread panicked while holding the cache lock
    #[error("Cache lock poisoned")]
    Poisoned,

    /// I/O error
    #[error(transparent)]
    Io(#[from] std::io::Error),
}
