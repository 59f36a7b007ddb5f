//! Tests for the durable cache backend.

use tempfile::TempDir;
use tether_cache::{namespaced_key, LocalCache, MemoryCache, RedbCache};

#[test]
fn test_values_survive_reopen() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("cache.redb");

    {
        let cache = RedbCache::open(&path).unwrap();
        cache
            .set(&namespaced_key("notes", "profile"), r#"{"name":"A"}"#)
            .unwrap();
    }

    let cache = RedbCache::open(&path).unwrap();
    assert_eq!(
        cache.get("notes_profile").unwrap().as_deref(),
        Some(r#"{"name":"A"}"#)
    );
}

#[test]
fn test_creates_parent_directories() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("nested").join("deeper").join("cache.redb");

    let cache = RedbCache::open(&path).unwrap();
    assert!(path.exists());
    assert_eq!(cache.path(), path.as_path());
}

#[test]
fn test_get_missing_key() {
    let dir = TempDir::new().unwrap();
    let cache = RedbCache::open(dir.path().join("cache.redb")).unwrap();

    assert!(cache.get("never_written").unwrap().is_none());
    assert!(cache.keys().unwrap().is_empty());
}

#[test]
fn test_overwrite_and_remove() {
    let dir = TempDir::new().unwrap();
    let cache = RedbCache::open(dir.path().join("cache.redb")).unwrap();

    cache.set("notes_a", "1").unwrap();
    cache.set("notes_a", "2").unwrap();
    cache.set("notes_b", "3").unwrap();
    assert_eq!(cache.get("notes_a").unwrap().as_deref(), Some("2"));

    cache.remove("notes_a").unwrap();
    cache.remove("notes_a").unwrap();
    assert!(cache.get("notes_a").unwrap().is_none());
    assert_eq!(cache.keys().unwrap(), vec!["notes_b".to_string()]);
}

#[test]
fn test_backends_agree_through_trait_object() {
    let dir = TempDir::new().unwrap();
    let backends: Vec<Box<dyn LocalCache>> = vec![
        Box::new(MemoryCache::new()),
        Box::new(RedbCache::open(dir.path().join("cache.redb")).unwrap()),
    ];

    for cache in &backends {
        cache.set("park_zeta", "z").unwrap();
        cache.set("park_alpha", "a").unwrap();
        assert_eq!(
            cache.keys().unwrap(),
            vec!["park_alpha".to_string(), "park_zeta".to_string()]
        );
    }
}
