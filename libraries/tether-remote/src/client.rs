//! Main remote record store client.

use crate::error::{RemoteError, Result};
use crate::records::RecordsClient;
use crate::types::RemoteConfig;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use reqwest::Client;
use std::time::Duration;
use tracing::debug;

/// REST client for the remote record store.
///
/// Every request carries the static credential twice (`apikey` header and
/// bearer token) plus a JSON content type, matching what PostgREST-style
/// gateways expect.
///
/// # Example
///
/// ```ignore
/// use tether_remote::{RemoteConfig, RestRecordStore};
///
/// let store = RestRecordStore::new(RemoteConfig::new("https://project.example.co", "anon-key"))?;
/// store.ping().await?;
/// ```
#[derive(Clone)]
pub struct RestRecordStore {
    http: Client,
    base_url: String,
    table: String,
}

impl RestRecordStore {
    /// Create a new client with the given configuration.
    pub fn new(config: RemoteConfig) -> Result<Self> {
        // Validate URL
        if config.url.is_empty() {
            return Err(RemoteError::InvalidUrl("URL cannot be empty".into()));
        }

        // Parse and normalize URL
        let base_url = config.url.trim_end_matches('/').to_string();
        if !base_url.starts_with("http://") && !base_url.starts_with("https://") {
            return Err(RemoteError::InvalidUrl(
                "URL must start with http:// or https://".into(),
            ));
        }
        url::Url::parse(&base_url).map_err(|e| RemoteError::InvalidUrl(e.to_string()))?;

        if config.table.is_empty() {
            return Err(RemoteError::InvalidUrl("table cannot be empty".into()));
        }

        let http = Client::builder()
            .default_headers(credential_headers(&config.api_key)?)
            .timeout(Duration::from_secs(config.timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(format!("Tether/{}", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(RemoteError::Request)?;

        debug!(url = %base_url, table = %config.table, "Created remote store client");

        Ok(Self {
            http,
            base_url,
            table: config.table,
        })
    }

    /// Get the store URL.
    pub fn url(&self) -> &str {
        &self.base_url
    }

    /// Get the table name.
    pub fn table(&self) -> &str {
        &self.table
    }

    /// Get a client for record operations.
    pub fn records(&self) -> RecordsClient<'_> {
        RecordsClient::new(&self.http, &self.base_url, &self.table)
    }

    /// Check that the store answers for the configured table.
    pub async fn ping(&self) -> Result<()> {
        self.records().ping().await
    }
}

fn credential_headers(api_key: &str) -> Result<HeaderMap> {
    let key = HeaderValue::from_str(api_key)
        .map_err(|_| RemoteError::InvalidCredential("API key is not a valid header value".into()))?;
    let bearer = HeaderValue::from_str(&format!("Bearer {}", api_key))
        .map_err(|_| RemoteError::InvalidCredential("API key is not a valid header value".into()))?;

    let mut headers = HeaderMap::new();
    headers.insert("apikey", key);
    headers.insert(AUTHORIZATION, bearer);
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    headers.insert("Prefer", HeaderValue::from_static("return=representation"));
    Ok(headers)
}
