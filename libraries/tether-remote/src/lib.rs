//! Tether Remote Store Client
//!
//! HTTP client library for the PostgREST-style table that holds Tether
//! records on the server side.
//!
//! # Features
//!
//! - **Lookup**: Find the record id for an (application, key) pair
//! - **Fetch**: Read the most recently updated value for a key
//! - **Write**: Update a record by id or insert a new one
//! - **Abstraction**: [`RecordStore`] trait so sync logic can run against any backend
//!
//! # Example
//!
//! ```ignore
//! use tether_remote::{RecordStore, RemoteConfig, RestRecordStore};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = RemoteConfig::new("https://project.example.co", "anon-key");
//!     let store = RestRecordStore::new(config)?;
//!
//!     match store.find_id("notes", "profile").await? {
//!         Some(id) => store.update(&id, &serde_json::json!({"name": "A"})).await?,
//!         None => store.insert("notes", "profile", &serde_json::json!({"name": "A"})).await?,
//!     }
//!
//!     Ok(())
//! }
//! ```

mod client;
mod error;
mod records;
mod store;
mod types;

pub use client::RestRecordStore;
pub use records::RecordsClient;
pub use error::{RemoteError, Result};
pub use store::RecordStore;
pub use types::{RecordId, RemoteConfig, RemoteRecord, DEFAULT_TABLE, DEFAULT_TIMEOUT_SECS};
