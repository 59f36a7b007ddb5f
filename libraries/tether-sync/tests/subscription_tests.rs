//! Polling subscription tests.
//!
//! Time is paused so the 30 second poll period elapses instantly; the
//! record store is the in-memory fake from `common`.

mod common;

use common::{fake_agent, FakeStore, APP};
use std::sync::atomic::Ordering;
use std::time::Duration;
use tether_cache::LocalCache;
use tether_sync::{AgentOptions, Connectivity};
use tokio::sync::mpsc;
use tokio::time::Instant;

fn channel_callback() -> (
    impl Fn(serde_json::Value) + Send + Sync + 'static,
    mpsc::UnboundedReceiver<serde_json::Value>,
) {
    let (tx, rx) = mpsc::unbounded_channel();
    (
        move |value| {
            let _ = tx.send(value);
        },
        rx,
    )
}

#[tokio::test(start_paused = true)]
async fn test_poll_delivers_remote_value_each_period() {
    let store = FakeStore::new();
    store.put(APP, "profile", serde_json::json!({"name": "remote"}));
    let (agent, cache) = fake_agent(&store, &Connectivity::new(true), AgentOptions::default());

    let (callback, mut rx) = channel_callback();
    let start = Instant::now();
    let _subscription = agent.subscribe("profile", callback);

    let first = rx.recv().await.unwrap();
    assert_eq!(first, serde_json::json!({"name": "remote"}));
    assert!(start.elapsed() >= Duration::from_secs(30));
    assert_eq!(
        cache.get("app_profile").unwrap().as_deref(),
        Some(r#"{"name":"remote"}"#)
    );

    // Identical values are delivered again; polling cannot tell them apart
    let second = rx.recv().await.unwrap();
    assert_eq!(second, first);
    assert!(start.elapsed() >= Duration::from_secs(60));
}

#[tokio::test(start_paused = true)]
async fn test_poll_skips_missing_values() {
    let store = FakeStore::new();
    let (agent, _cache) = fake_agent(&store, &Connectivity::new(true), AgentOptions::default());

    let (callback, mut rx) = channel_callback();
    let _subscription = agent.subscribe("profile", callback);

    tokio::time::sleep(Duration::from_secs(65)).await;
    assert!(rx.try_recv().is_err());
    assert_eq!(store.fetches.load(Ordering::SeqCst), 2);
}

#[tokio::test(start_paused = true)]
async fn test_resubscribe_cancels_previous_poll() {
    let store = FakeStore::new();
    store.put(APP, "profile", serde_json::json!(1));
    let (agent, _cache) = fake_agent(&store, &Connectivity::new(true), AgentOptions::default());

    let (first_callback, mut first_rx) = channel_callback();
    let (second_callback, mut second_rx) = channel_callback();

    let first = agent.subscribe("profile", first_callback);
    let second = agent.subscribe("profile", second_callback);

    assert!(!first.is_active());
    assert!(second.is_active());
    assert_eq!(agent.active_subscriptions(), 1);

    // The first poll task ends and drops its callback
    assert!(first_rx.recv().await.is_none());
    assert_eq!(second_rx.recv().await, Some(serde_json::json!(1)));

    // One poll per period means one fetch per period
    tokio::time::sleep(Duration::from_secs(1)).await;
    assert_eq!(store.fetches.load(Ordering::SeqCst), 1);
}

#[tokio::test(start_paused = true)]
async fn test_unsubscribe_stops_poll() {
    let store = FakeStore::new();
    store.put(APP, "profile", serde_json::json!(1));
    let (agent, _cache) = fake_agent(&store, &Connectivity::new(true), AgentOptions::default());

    let (callback, mut rx) = channel_callback();
    let subscription = agent.subscribe("profile", callback);
    assert_eq!(subscription.key(), "profile");

    subscription.unsubscribe();

    assert_eq!(agent.active_subscriptions(), 0);
    assert!(rx.recv().await.is_none());
    assert_eq!(store.fetches.load(Ordering::SeqCst), 0);
}

#[tokio::test(start_paused = true)]
async fn test_offline_ticks_are_skipped() {
    let store = FakeStore::new();
    store.put(APP, "profile", serde_json::json!("remote"));
    let connectivity = Connectivity::new(false);
    let (agent, _cache) = fake_agent(&store, &connectivity, AgentOptions::default());

    let (callback, mut rx) = channel_callback();
    let _subscription = agent.subscribe("profile", callback);

    tokio::time::sleep(Duration::from_secs(95)).await;
    assert!(rx.try_recv().is_err());
    assert_eq!(store.fetches.load(Ordering::SeqCst), 0);

    connectivity.set_online(true);
    assert_eq!(rx.recv().await, Some(serde_json::json!("remote")));
}

#[tokio::test(start_paused = true)]
async fn test_tick_errors_do_not_stop_poll() {
    let store = FakeStore::new();
    let (agent, cache) = fake_agent(&store, &Connectivity::new(true), AgentOptions::default());
    cache.set("app_profile", "{broken").unwrap();

    let (callback, mut rx) = channel_callback();
    let start = Instant::now();
    let _subscription = agent.subscribe("profile", callback);

    // First tick fails on the malformed cache entry
    tokio::time::sleep(Duration::from_secs(31)).await;
    assert!(rx.try_recv().is_err());

    cache.set("app_profile", "\"fixed\"").unwrap();
    store.put(APP, "profile", serde_json::json!("fixed"));

    assert_eq!(rx.recv().await, Some(serde_json::json!("fixed")));
    assert!(start.elapsed() >= Duration::from_secs(60));
}

#[tokio::test(start_paused = true)]
async fn test_remote_outage_falls_back_to_local_value() {
    let store = FakeStore::new();
    store.set_failing(true);
    let (agent, cache) = fake_agent(&store, &Connectivity::new(true), AgentOptions::default());
    cache.set("app_profile", "42").unwrap();

    let (callback, mut rx) = channel_callback();
    let _subscription = agent.subscribe("profile", callback);

    assert_eq!(rx.recv().await, Some(serde_json::json!(42)));
}

#[tokio::test(start_paused = true)]
async fn test_custom_poll_interval() {
    let store = FakeStore::new();
    store.put(APP, "profile", serde_json::json!(true));
    let options = AgentOptions {
        poll_interval: Duration::from_secs(5),
        ..Default::default()
    };
    let (agent, _cache) = fake_agent(&store, &Connectivity::new(true), options);

    let (callback, mut rx) = channel_callback();
    let start = Instant::now();
    let _subscription = agent.subscribe("profile", callback);

    rx.recv().await.unwrap();
    let elapsed = start.elapsed();
    assert!(elapsed >= Duration::from_secs(5) && elapsed < Duration::from_secs(30));
}

#[tokio::test(start_paused = true)]
async fn test_shutdown_stops_every_poll() {
    let store = FakeStore::new();
    let (agent, _cache) = fake_agent(&store, &Connectivity::new(true), AgentOptions::default());

    let (a_callback, mut a_rx) = channel_callback();
    let (b_callback, mut b_rx) = channel_callback();
    let a = agent.subscribe("a", a_callback);
    let _b = agent.subscribe("b", b_callback);
    assert_eq!(agent.active_subscriptions(), 2);

    agent.shutdown();

    assert!(!a.is_active());
    assert_eq!(agent.active_subscriptions(), 0);
    assert!(a_rx.recv().await.is_none());
    assert!(b_rx.recv().await.is_none());
}

#[tokio::test(start_paused = true)]
async fn test_dropping_agent_stops_polls() {
    let store = FakeStore::new();
    let (agent, _cache) = fake_agent(&store, &Connectivity::new(true), AgentOptions::default());

    let (callback, mut rx) = channel_callback();
    let subscription = agent.subscribe("profile", callback);

    drop(agent);

    assert!(rx.recv().await.is_none());
    assert!(!subscription.is_active());
}
