use crate::connectivity::Connectivity;
use crate::error::{Result, SyncError};
use crate::locks::{lock, KeyLocks};
use crate::queue::{Enqueued, PendingQueue};
use crate::subscription::{spawn_poll, ActivePoll, Subscription};
use crate::types::{AgentOptions, AgentStatus, FlushReport, PendingItem, SaveOutcome};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, Weak};
use tether_cache::{namespaced_key, LocalCache};
use tether_remote::RecordStore;
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

/// Offline-first sync agent for one application namespace.
///
/// Saves always land in the local cache; the remote store is written when
/// the host reports connectivity, otherwise the write is queued and
/// replayed on the next offline-to-online transition. Loads prefer the
/// remote value and fall back to the cache.
///
/// Cloning is cheap and every clone drives the same agent. Construct one
/// per namespace at startup and hand clones to whoever needs it.
#[derive(Clone)]
pub struct SyncAgent {
    inner: Arc<AgentInner>,
}

pub(crate) struct AgentInner {
    app_name: String,
    store: Arc<dyn RecordStore>,
    cache: Arc<dyn LocalCache>,
    connectivity: Connectivity,
    options: AgentOptions,
    pending: Mutex<PendingQueue>,
    /// Items taken by a running flush and not yet settled; persisted ahead
    /// of the queue so a crash mid-flush loses nothing
    in_flight: Mutex<Vec<PendingItem>>,
    key_locks: KeyLocks,
    subscriptions: Mutex<HashMap<String, ActivePoll>>,
    next_subscription_id: AtomicU64,
    flush_reports: watch::Sender<Option<FlushReport>>,
    shutdown: CancellationToken,
}

impl SyncAgent {
    /// Create an agent and start listening for connectivity transitions.
    ///
    /// Must be called from within a Tokio runtime. No flush happens here,
    /// even when a persisted queue is restored; the next transition to
    /// online (or an explicit [`SyncAgent::flush_pending_sync`]) drains it.
    pub fn new(
        app_name: impl Into<String>,
        store: Arc<dyn RecordStore>,
        cache: Arc<dyn LocalCache>,
        connectivity: Connectivity,
        options: AgentOptions,
    ) -> Result<Self> {
        let app_name = app_name.into();
        if app_name.is_empty() {
            return Err(SyncError::InvalidNamespace(
                "application name cannot be empty".into(),
            ));
        }
        if app_name.contains(':') {
            return Err(SyncError::InvalidNamespace(format!(
                "application name cannot contain ':' ({})",
                app_name
            )));
        }
        if options.poll_interval.is_zero() {
            return Err(SyncError::InvalidOptions(
                "poll interval must be greater than zero".into(),
            ));
        }

        let pending = if options.queue.persist {
            let items = read_persisted_queue(cache.as_ref(), &app_name)?;
            if !items.is_empty() {
                info!(app = %app_name, count = items.len(), "Restored pending writes");
            }
            PendingQueue::restore(options.queue.clone(), items)
        } else {
            PendingQueue::new(options.queue.clone())
        };

        let (flush_reports, _) = watch::channel(None);

        let inner = Arc::new(AgentInner {
            app_name,
            store,
            cache,
            connectivity,
            options,
            pending: Mutex::new(pending),
            in_flight: Mutex::new(Vec::new()),
            key_locks: KeyLocks::default(),
            subscriptions: Mutex::new(HashMap::new()),
            next_subscription_id: AtomicU64::new(0),
            flush_reports,
            shutdown: CancellationToken::new(),
        });

        spawn_connectivity_listener(&inner);

        debug!(
            app = %inner.app_name,
            online = inner.connectivity.is_online(),
            "Sync agent started"
        );

        Ok(Self { inner })
    }

    pub(crate) fn from_inner(inner: Arc<AgentInner>) -> Self {
        Self { inner }
    }

    pub fn app_name(&self) -> &str {
        &self.inner.app_name
    }

    pub fn is_online(&self) -> bool {
        self.inner.connectivity.is_online()
    }

    /// Save `value` under `key`.
    ///
    /// The local cache is written first and unconditionally. Remote
    /// failures are reported in the outcome and queue the write; only a
    /// local cache or serialization failure returns `Err`.
    pub async fn save(&self, key: &str, value: Value) -> Result<SaveOutcome> {
        let text = serde_json::to_string(&value)?;
        self.inner.cache.set(&self.local_key(key), &text)?;

        if !self.is_online() {
            self.enqueue(PendingItem::new(key, value));
            info!(key = %key, "Offline - queued for later");
            return Ok(SaveOutcome::queued());
        }

        let result = self.write_remote(key, &value).await;
        match result {
            Ok(()) => {
                info!(key = %key, "Saved to remote store");
                Ok(SaveOutcome::synced())
            }
            Err(e) => {
                error!(key = %key, error = %e, "Remote save failed");
                self.enqueue(PendingItem::new(key, value));
                Ok(SaveOutcome::failed(e.to_string()))
            }
        }
    }

    /// Serialize `value` and [`save`](Self::save) it.
    pub async fn save_as<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> Result<SaveOutcome> {
        self.save(key, serde_json::to_value(value)?).await
    }

    /// Load the value for `key`, preferring the remote store when online.
    ///
    /// A remote value overwrites the local cache. When the store has no
    /// record but the cache does, the cached value is pushed up (unless
    /// disabled in [`AgentOptions`]) and returned.
    pub async fn load(&self, key: &str) -> Result<Option<Value>> {
        let local_key = self.local_key(key);
        let local = match self.inner.cache.get(&local_key)? {
            Some(text) => Some(serde_json::from_str::<Value>(&text)?),
            None => None,
        };

        if !self.is_online() {
            debug!(key = %key, "Offline - using local data");
            return Ok(local);
        }

        match self.inner.store.fetch_latest(&self.inner.app_name, key).await {
            Ok(Some(record)) => {
                self.inner
                    .cache
                    .set(&local_key, &serde_json::to_string(&record.data)?)?;
                info!(key = %key, "Loaded from remote store");
                Ok(Some(record.data))
            }
            Ok(None) => match local {
                Some(value) => {
                    if self.inner.options.push_local_on_miss {
                        info!(key = %key, "No remote record - pushing local value");
                        match self.save(key, value.clone()).await {
                            Ok(outcome) => {
                                debug!(key = %key, synced = outcome.synced, "Local value pushed");
                            }
                            Err(e) => warn!(key = %key, error = %e, "Failed to push local value"),
                        }
                    }
                    Ok(Some(value))
                }
                None => Ok(None),
            },
            Err(e) => {
                error!(key = %key, error = %e, "Remote load failed - using local data");
                Ok(local)
            }
        }
    }

    /// [`load`](Self::load) and deserialize into `T`.
    pub async fn load_as<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>> {
        match self.load(key).await? {
            Some(value) => Ok(Some(serde_json::from_value(value)?)),
            None => Ok(None),
        }
    }

    /// Poll `key` every `poll_interval` while online and hand each present
    /// value to `callback`.
    ///
    /// A key has at most one poll: subscribing again cancels the previous
    /// one. Errors during a tick are logged and the poll carries on.
    pub fn subscribe<F>(&self, key: &str, callback: F) -> Subscription
    where
        F: Fn(Value) + Send + Sync + 'static,
    {
        let id = self.inner.next_subscription_id.fetch_add(1, Ordering::Relaxed);
        let token = self.inner.shutdown.child_token();

        let previous = lock(&self.inner.subscriptions).insert(
            key.to_string(),
            ActivePoll {
                id,
                token: token.clone(),
            },
        );
        if let Some(previous) = previous {
            debug!(key = %key, "Replacing existing subscription");
            previous.token.cancel();
        }

        spawn_poll(
            Arc::downgrade(&self.inner),
            key.to_string(),
            id,
            token.clone(),
            self.inner.options.poll_interval,
            callback,
        );

        debug!(key = %key, interval = ?self.inner.options.poll_interval, "Subscribed");
        Subscription::new(key.to_string(), id, token, Arc::downgrade(&self.inner))
    }

    /// Number of keys with a live poll.
    pub fn active_subscriptions(&self) -> usize {
        lock(&self.inner.subscriptions).len()
    }

    /// Drain the pending queue through [`save`](Self::save), in enqueue order.
    ///
    /// Items that fail again are re-queued by `save` itself; nothing is
    /// re-added here. Writes queued while this runs wait for the next flush.
    /// With a persisted queue, each item stays persisted until its write
    /// has settled.
    pub async fn flush_pending_sync(&self) -> FlushReport {
        let pending = {
            let mut queue = lock(&self.inner.pending);
            let items = queue.take_all();
            lock(&self.inner.in_flight).extend(items.iter().cloned());
            items
        };

        let mut report = FlushReport {
            attempted: pending.len(),
            ..Default::default()
        };

        if !pending.is_empty() {
            info!(count = pending.len(), "Syncing pending items");
        }

        for item in pending {
            match self.save(&item.data_key, item.data.clone()).await {
                Ok(outcome) if outcome.synced => report.synced += 1,
                Ok(_) => report.requeued += 1,
                Err(e) => {
                    error!(key = %item.data_key, error = %e, "Failed to sync pending item");
                    report.failed += 1;
                }
            }
            self.settle(&item);
        }

        if report.attempted > 0 {
            info!(
                synced = report.synced,
                requeued = report.requeued,
                failed = report.failed,
                "Pending sync finished"
            );
        }

        self.inner.flush_reports.send_replace(Some(report.clone()));
        report
    }

    /// Watch the report of the most recent flush.
    pub fn flush_reports(&self) -> watch::Receiver<Option<FlushReport>> {
        self.inner.flush_reports.subscribe()
    }

    /// Current connectivity, queue length and namespace.
    pub fn status(&self) -> AgentStatus {
        AgentStatus {
            online: self.is_online(),
            pending_count: lock(&self.inner.pending).len(),
            app_name: self.inner.app_name.clone(),
        }
    }

    /// Copy of the queued writes, oldest first.
    pub fn pending_items(&self) -> Vec<PendingItem> {
        lock(&self.inner.pending).iter().cloned().collect()
    }

    /// Stop every subscription poll and the connectivity listener.
    ///
    /// `save`, `load` and `flush_pending_sync` keep working afterwards, but
    /// transitions no longer trigger a flush.
    pub fn shutdown(&self) {
        self.inner.shutdown.cancel();
        lock(&self.inner.subscriptions).clear();
        debug!(app = %self.inner.app_name, "Sync agent shut down");
    }

    fn local_key(&self, key: &str) -> String {
        namespaced_key(&self.inner.app_name, key)
    }

    async fn write_remote(&self, key: &str, value: &Value) -> tether_remote::Result<()> {
        let _guard = self.inner.key_locks.acquire(key).await;
        let store = &self.inner.store;
        let app_name = &self.inner.app_name;

        match store.find_id(app_name, key).await? {
            Some(id) => store.update(&id, value).await,
            None => store.insert(app_name, key, value).await,
        }
    }

    fn enqueue(&self, item: PendingItem) {
        let mut queue = lock(&self.inner.pending);
        match queue.push(item) {
            Enqueued::Accepted => {}
            Enqueued::DroppedOldest(dropped) => {
                warn!(key = %dropped.data_key, "Pending queue full - dropped oldest write");
            }
            Enqueued::Rejected(rejected) => {
                warn!(key = %rejected.data_key, "Pending queue full - write not queued");
            }
        }
        self.persist_queue(&queue);
    }

    /// Drop a flushed item from the in-flight set and persist what is left.
    fn settle(&self, item: &PendingItem) {
        let queue = lock(&self.inner.pending);
        {
            let mut in_flight = lock(&self.inner.in_flight);
            if let Some(index) = in_flight.iter().position(|pending| pending == item) {
                in_flight.remove(index);
            }
        }
        self.persist_queue(&queue);
    }

    /// Write in-flight items followed by the queue. Callers hold the queue
    /// lock, which also orders access to `in_flight`.
    fn persist_queue(&self, queue: &PendingQueue) {
        if !queue.policy().persist {
            return;
        }

        let items: Vec<PendingItem> = lock(&self.inner.in_flight)
            .iter()
            .chain(queue.iter())
            .cloned()
            .collect();
        let result = serde_json::to_string(&items)
            .map_err(SyncError::from)
            .and_then(|text| {
                self.inner
                    .cache
                    .set(&queue_key(&self.inner.app_name), &text)
                    .map_err(SyncError::from)
            });

        if let Err(e) = result {
            warn!(error = %e, "Failed to persist pending queue");
        }
    }
}

impl AgentInner {
    pub(crate) fn remove_subscription(&self, key: &str, id: u64) {
        let mut subscriptions = lock(&self.subscriptions);
        if subscriptions.get(key).is_some_and(|poll| poll.id == id) {
            subscriptions.remove(key);
        }
    }
}

impl Drop for AgentInner {
    fn drop(&mut self) {
        self.shutdown.cancel();
    }
}

/// Cache key holding the persisted queue for `app_name`.
///
/// Starts with ':', which no namespaced data key can since application
/// names may not contain it.
fn queue_key(app_name: &str) -> String {
    format!("::pending::{}", app_name)
}

fn read_persisted_queue(cache: &dyn LocalCache, app_name: &str) -> Result<Vec<PendingItem>> {
    match cache.get(&queue_key(app_name))? {
        Some(text) => Ok(serde_json::from_str(&text)?),
        None => Ok(Vec::new()),
    }
}

/// The watch channel keeps only the latest value, so an online period that
/// ends before the listener wakes is skipped; the next transition flushes.
fn spawn_connectivity_listener(inner: &Arc<AgentInner>) {
    let mut rx = inner.connectivity.watch();
    let _ = rx.borrow_and_update();

    let agent = Arc::downgrade(inner);
    let shutdown = inner.shutdown.clone();

    tokio::spawn(async move {
        loop {
            tokio::select! {
                () = shutdown.cancelled() => break,
                changed = rx.changed() => {
                    if changed.is_err() {
                        break;
                    }
                    let online = *rx.borrow_and_update();
                    if !handle_transition(&agent, online).await {
                        break;
                    }
                }
            }
        }
        debug!("Connectivity listener stopped");
    });
}

/// React to one transition. Returns false once the agent is gone.
async fn handle_transition(agent: &Weak<AgentInner>, online: bool) -> bool {
    let Some(inner) = agent.upgrade() else {
        return false;
    };

    if online {
        info!(app = %inner.app_name, "Back online");
        SyncAgent::from_inner(inner).flush_pending_sync().await;
    } else {
        info!(app = %inner.app_name, "Gone offline");
    }
    true
}
