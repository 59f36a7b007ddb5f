//! Error types for the remote record store client.

use thiserror::Error;

/// Errors that can occur when talking to the remote record store.
#[derive(Error, Debug)]
pub enum RemoteError {
    /// HTTP request failed
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// Store returned a non-success status
    #[error("Remote store error ({status}): {message}")]
    ServerError { status: u16, message: String },

    /// Store is offline or unreachable
    #[error("Remote store unreachable: {0}")]
    ServerUnreachable(String),

    /// Invalid store URL
    #[error("Invalid store URL: {0}")]
    InvalidUrl(String),

    /// Credential cannot be sent as an HTTP header
    #[error("Invalid credential: {0}")]
    InvalidCredential(String),

    /// Failed to parse store response
    #[error("Failed to parse response: {0}")]
    ParseError(String),
}

impl RemoteError {
    /// Classify a transport error from `send()`.
    pub(crate) fn from_send(e: reqwest::Error) -> Self {
        if e.is_connect() || e.is_timeout() {
            RemoteError::ServerUnreachable(e.to_string())
        } else {
            RemoteError::Request(e)
        }
    }

    /// True when the failure came from the network rather than the store.
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            RemoteError::Request(_) | RemoteError::ServerUnreachable(_)
        )
    }
}

/// Result type for remote store operations.
pub type Result<T> = std::result::Result<T, RemoteError>;
