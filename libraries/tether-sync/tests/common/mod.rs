//! Shared fixtures for sync agent tests.

#![allow(dead_code)]

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tether_cache::{LocalCache, MemoryCache};
use tether_remote::{RecordId, RecordStore, RemoteError, RemoteRecord};
use tether_sync::{AgentOptions, Connectivity, SyncAgent};

pub const APP: &str = "app";

/// In-memory record store with call counters and a switchable outage.
#[derive(Default)]
pub struct FakeStore {
    records: Mutex<HashMap<(String, String), (RecordId, serde_json::Value)>>,
    next_id: AtomicU64,
    pub fetches: AtomicUsize,
    pub lookups: AtomicUsize,
    pub inserts: AtomicUsize,
    pub updates: AtomicUsize,
    pub failing: AtomicBool,
}

impl FakeStore {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn put(&self, app_name: &str, data_key: &str, data: serde_json::Value) {
        let id = RecordId::new(self.next_id.fetch_add(1, Ordering::SeqCst).to_string());
        self.records
            .lock()
            .unwrap()
            .insert((app_name.to_string(), data_key.to_string()), (id, data));
    }

    pub fn get(&self, app_name: &str, data_key: &str) -> Option<serde_json::Value> {
        self.records
            .lock()
            .unwrap()
            .get(&(app_name.to_string(), data_key.to_string()))
            .map(|(_, data)| data.clone())
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    pub fn writes(&self) -> usize {
        self.inserts.load(Ordering::SeqCst) + self.updates.load(Ordering::SeqCst)
    }

    fn check(&self) -> tether_remote::Result<()> {
        if self.failing.load(Ordering::SeqCst) {
            Err(RemoteError::ServerUnreachable("simulated outage".into()))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl RecordStore for FakeStore {
    async fn find_id(&self, app_name: &str, data_key: &str) -> tether_remote::Result<Option<RecordId>> {
        self.lookups.fetch_add(1, Ordering::SeqCst);
        self.check()?;
        Ok(self
            .records
            .lock()
            .unwrap()
            .get(&(app_name.to_string(), data_key.to_string()))
            .map(|(id, _)| id.clone()))
    }

    async fn fetch_latest(
        &self,
        app_name: &str,
        data_key: &str,
    ) -> tether_remote::Result<Option<RemoteRecord>> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        self.check()?;
        Ok(self.get(app_name, data_key).map(|data| RemoteRecord {
            data,
            updated_at: None,
        }))
    }

    async fn update(&self, id: &RecordId, data: &serde_json::Value) -> tether_remote::Result<()> {
        self.updates.fetch_add(1, Ordering::SeqCst);
        self.check()?;
        let mut records = self.records.lock().unwrap();
        for (record_id, value) in records.values_mut() {
            if record_id == id {
                *value = data.clone();
            }
        }
        Ok(())
    }

    async fn insert(
        &self,
        app_name: &str,
        data_key: &str,
        data: &serde_json::Value,
    ) -> tether_remote::Result<()> {
        self.inserts.fetch_add(1, Ordering::SeqCst);
        self.check()?;
        self.put(app_name, data_key, data.clone());
        Ok(())
    }
}

/// Agent over a fake store and a fresh memory cache.
pub fn fake_agent(
    store: &Arc<FakeStore>,
    connectivity: &Connectivity,
    options: AgentOptions,
) -> (SyncAgent, Arc<MemoryCache>) {
    let cache = Arc::new(MemoryCache::new());
    let agent = SyncAgent::new(
        APP,
        store.clone(),
        cache.clone() as Arc<dyn LocalCache>,
        connectivity.clone(),
        options,
    )
    .unwrap();
    (agent, cache)
}
