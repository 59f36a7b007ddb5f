//! Wiring between configuration, storage backends and the sync agent.

use crate::config::TetherConfig;
use crate::error::Result;
use std::sync::Arc;
use std::time::Duration;
use tether_cache::{LocalCache, RedbCache};
use tether_remote::{RecordStore, RestRecordStore};
use tether_sync::{Connectivity, SyncAgent};
use tokio::task::JoinHandle;
use tokio::time::{self, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Everything a command needs to run.
pub struct Host {
    pub agent: SyncAgent,
    pub store: Arc<RestRecordStore>,
    pub connectivity: Connectivity,
}

/// Build the agent described by `config`.
///
/// Connectivity starts from a single ping of the remote store, or offline
/// when `force_offline` is set (in which case the store is never contacted).
pub async fn build_agent(config: &TetherConfig, force_offline: bool) -> Result<Host> {
    config.validate()?;

    let store = Arc::new(RestRecordStore::new(config.remote_config())?);
    let cache: Arc<dyn LocalCache> = Arc::new(RedbCache::open(&config.cache.path)?);

    let online = if force_offline {
        info!("Offline mode - remote store will not be contacted");
        false
    } else {
        probe(&store).await
    };

    let connectivity = Connectivity::new(online);
    let agent = SyncAgent::new(
        config.agent.app_name.clone(),
        store.clone() as Arc<dyn RecordStore>,
        cache,
        connectivity.clone(),
        config.agent_options(),
    )?;

    debug!(
        app = %config.agent.app_name,
        cache = %config.cache.path.display(),
        online,
        "Agent ready"
    );

    Ok(Host {
        agent,
        store,
        connectivity,
    })
}

/// Ping the store every `interval` and report the result to `connectivity`.
///
/// Only changes reach the agent, so a recovered store triggers one flush.
/// The task ends when `token` is cancelled.
pub fn spawn_connectivity_probe(
    store: Arc<RestRecordStore>,
    connectivity: Connectivity,
    interval: Duration,
    token: CancellationToken,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = time::interval_at(Instant::now() + interval, interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                () = token.cancelled() => break,
                _ = ticker.tick() => {
                    let online = probe(&store).await;
                    if connectivity.set_online(online) {
                        info!(online, "Connectivity changed");
                    }
                }
            }
        }
        debug!("Connectivity probe stopped");
    })
}

async fn probe(store: &RestRecordStore) -> bool {
    match store.ping().await {
        Ok(()) => true,
        Err(e) => {
            warn!(url = %store.url(), error = %e, "Remote store unreachable");
            false
        }
    }
}
