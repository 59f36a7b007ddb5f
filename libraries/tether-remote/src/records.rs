//! Record operations against the remote table.

use crate::error::{RemoteError, Result};
use crate::types::{InsertRecord, RecordId, RecordRef, RemoteRecord, UpdateRecord};
use chrono::Utc;
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use tracing::debug;

/// Record client for the remote store.
pub struct RecordsClient<'a> {
    http: &'a Client,
    base_url: &'a str,
    table: &'a str,
}

impl<'a> RecordsClient<'a> {
    pub(crate) fn new(http: &'a Client, base_url: &'a str, table: &'a str) -> Self {
        Self {
            http,
            base_url,
            table,
        }
    }

    fn endpoint(&self) -> String {
        format!("{}/rest/v1/{}", self.base_url, self.table)
    }

    /// Look up the id of the record for `(app_name, data_key)`.
    pub async fn find_id(&self, app_name: &str, data_key: &str) -> Result<Option<RecordId>> {
        let url = self.endpoint();
        debug!(url = %url, app = %app_name, key = %data_key, "Looking up record");

        let response = self
            .http
            .get(&url)
            .query(&[
                ("app_name", format!("eq.{}", app_name)),
                ("data_key", format!("eq.{}", data_key)),
                ("select", "id".to_string()),
            ])
            .send()
            .await
            .map_err(RemoteError::from_send)?;

        let rows: Vec<RecordRef> = read_rows(response, "lookup").await?;
        Ok(rows.into_iter().next().map(|row| row.id))
    }

    /// Fetch the most recently updated record for `(app_name, data_key)`.
    pub async fn fetch_latest(
        &self,
        app_name: &str,
        data_key: &str,
    ) -> Result<Option<RemoteRecord>> {
        let url = self.endpoint();
        debug!(url = %url, app = %app_name, key = %data_key, "Fetching latest record");

        let response = self
            .http
            .get(&url)
            .query(&[
                ("app_name", format!("eq.{}", app_name)),
                ("data_key", format!("eq.{}", data_key)),
                ("select", "data,updated_at".to_string()),
                ("order", "updated_at.desc".to_string()),
                ("limit", "1".to_string()),
            ])
            .send()
            .await
            .map_err(RemoteError::from_send)?;

        let rows: Vec<RemoteRecord> = read_rows(response, "record").await?;
        Ok(rows.into_iter().next())
    }

    /// Replace the value of an existing record and refresh its timestamp.
    pub async fn update(&self, id: &RecordId, data: &serde_json::Value) -> Result<()> {
        let url = self.endpoint();
        debug!(url = %url, id = %id, "Updating record");

        let body = UpdateRecord {
            data,
            updated_at: Utc::now(),
        };

        let response = self
            .http
            .patch(&url)
            .query(&[("id", format!("eq.{}", id))])
            .json(&body)
            .send()
            .await
            .map_err(RemoteError::from_send)?;

        ensure_success(response).await
    }

    /// Create a new record.
    pub async fn insert(
        &self,
        app_name: &str,
        data_key: &str,
        data: &serde_json::Value,
    ) -> Result<()> {
        let url = self.endpoint();
        debug!(url = %url, app = %app_name, key = %data_key, "Inserting record");

        let body = InsertRecord {
            app_name,
            data_key,
            data,
        };

        let response = self
            .http
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(RemoteError::from_send)?;

        ensure_success(response).await
    }

    /// Cheapest request the table answers: one id, no filters.
    pub async fn ping(&self) -> Result<()> {
        let url = self.endpoint();
        debug!(url = %url, "Pinging remote store");

        let response = self
            .http
            .get(&url)
            .query(&[("select", "id"), ("limit", "1")])
            .send()
            .await
            .map_err(RemoteError::from_send)?;

        ensure_success(response).await
    }
}

async fn read_rows<T: DeserializeOwned>(response: Response, what: &str) -> Result<Vec<T>> {
    let status = response.status();

    if status.is_success() {
        response.json().await.map_err(|e| {
            RemoteError::ParseError(format!("Failed to parse {} response: {}", what, e))
        })
    } else {
        let error_text = response.text().await.unwrap_or_default();
        Err(RemoteError::ServerError {
            status: status.as_u16(),
            message: error_text,
        })
    }
}

async fn ensure_success(response: Response) -> Result<()> {
    let status = response.status();

    if status.is_success() {
        Ok(())
    } else {
        let error_text = response.text().await.unwrap_or_default();
        Err(RemoteError::ServerError {
            status: status.as_u16(),
            message: error_text,
        })
    }
}
