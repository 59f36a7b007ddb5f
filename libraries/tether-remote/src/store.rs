//! Record store abstraction consumed by the sync agent.

use crate::client::RestRecordStore;
use crate::error::Result;
use crate::types::{RecordId, RemoteRecord};
use async_trait::async_trait;

/// Remote record store keyed by `(app_name, data_key)`.
///
/// The store keeps at most one live record per pair; callers enforce that
/// by looking up the id first and then updating or inserting.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Id of the record for the pair, if one exists.
    async fn find_id(&self, app_name: &str, data_key: &str) -> Result<Option<RecordId>>;

    /// Most recently updated record for the pair.
    async fn fetch_latest(&self, app_name: &str, data_key: &str) -> Result<Option<RemoteRecord>>;

    /// Overwrite the value of record `id`.
    async fn update(&self, id: &RecordId, data: &serde_json::Value) -> Result<()>;

    /// Create a record for the pair.
    async fn insert(&self, app_name: &str, data_key: &str, data: &serde_json::Value)
        -> Result<()>;
}

#[async_trait]
impl RecordStore for RestRecordStore {
    async fn find_id(&self, app_name: &str, data_key: &str) -> Result<Option<RecordId>> {
        self.records().find_id(app_name, data_key).await
    }

    async fn fetch_latest(&self, app_name: &str, data_key: &str) -> Result<Option<RemoteRecord>> {
        self.records().fetch_latest(app_name, data_key).await
    }

    async fn update(&self, id: &RecordId, data: &serde_json::Value) -> Result<()> {
        self.records().update(id, data).await
    }

    async fn insert(
        &self,
        app_name: &str,
        data_key: &str,
        data: &serde_json::Value,
    ) -> Result<()> {
        self.records().insert(app_name, data_key, data).await
    }
}
