use async_trait::async_trait;
use serde_json::{json, Value};
use signage::components::cache_service::{keys, EventCache, FileCache};
use signage::components::events_feed::{Event, EventSource, EventsFeed, RefreshOutcome};
use signage::error::{cache_error, upstream_error, SignageResult};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::Mutex;

/// Mock key/value store standing in for Redis
#[derive(Debug, Default)]
pub struct MockCache {
    data: Mutex<HashMap<String, String>>,
    broken: AtomicBool,
}

impl MockCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent call fail
    pub fn break_store(&self) {
        self.broken.store(true, Ordering::SeqCst);
    }

    pub async fn raw(&self, key: &str) -> Option<String> {
        self.data.lock().await.get(key).cloned()
    }

    fn check(&self) -> SignageResult<()> {
        if self.broken.load(Ordering::SeqCst) {
            return Err(cache_error("Connection refused"));
        }
        Ok(())
    }
}

#[async_trait]
impl EventCache for MockCache {
    async fn get(&self) -> SignageResult<Option<Vec<Event>>> {
        self.check()?;
        let data = self.data.lock().await;

        match data.get(keys::EVENTS) {
            Some(json) => {
                let events: Vec<Event> = serde_json::from_str(json)
                    .map_err(|e| cache_error(&format!("Failed to deserialize events: {e}")))?;
                Ok(Some(events))
            }
            None => Ok(None),
        }
    }

    async fn put(&self, events: &[Event]) -> SignageResult<()> {
        self.check()?;
        let json = serde_json::to_string(events)
            .map_err(|e| cache_error(&format!("Failed to serialize events: {e}")))?;
        self.data.lock().await.insert(keys::EVENTS.to_string(), json);
        Ok(())
    }
}

/// Source that serves a payload until switched off
struct ToggleSource {
    payload: Value,
    down: AtomicBool,
}

#[async_trait]
impl EventSource for ToggleSource {
    async fn fetch_raw(&self) -> SignageResult<Value> {
        if self.down.load(Ordering::SeqCst) {
            return Err(upstream_error("HTTP 500 Internal Server Error"));
        }
        Ok(self.payload.clone())
    }
}

fn payload() -> Value {
    json!({
        "events": [
            {"event": {"id": 1, "title": "Film Screening", "first_date": "2999-03-01"}},
            {"event": {"id": 2, "title": "Career Fair", "first_date": "2999-02-01"}}
        ]
    })
}

#[tokio::test]
async fn test_fresh_refresh_overwrites_cache_slot() {
    let cache = Arc::new(MockCache::new());
    let source = Arc::new(ToggleSource {
        payload: payload(),
        down: AtomicBool::new(false),
    });
    let feed = EventsFeed::new(source, cache.clone(), 6);

    let outcome = feed.refresh().await.unwrap();
    assert!(matches!(outcome, RefreshOutcome::Fresh { .. }));

    let stored: Value = serde_json::from_str(&cache.raw("events").await.unwrap()).unwrap();
    assert_eq!(stored[0]["id"], 2);
    assert_eq!(stored[1]["title"], "Film Screening");
}

#[tokio::test]
async fn test_failed_refresh_serves_last_known_good() {
    let cache = Arc::new(MockCache::new());
    let source = Arc::new(ToggleSource {
        payload: payload(),
        down: AtomicBool::new(false),
    });
    let feed = EventsFeed::new(source.clone(), cache.clone(), 6);

    let fresh = feed.refresh().await.unwrap();
    source.down.store(true, Ordering::SeqCst);

    match feed.refresh().await.unwrap() {
        RefreshOutcome::Degraded { events, error } => {
            assert_eq!(events, fresh.into_events());
            assert!(error.contains("500"));
        }
        other => panic!("expected degraded outcome, got {other:?}"),
    }
}

#[tokio::test]
async fn test_broken_cache_never_masks_outcome() {
    let cache = Arc::new(MockCache::new());
    cache.break_store();
    let source = Arc::new(ToggleSource {
        payload: payload(),
        down: AtomicBool::new(false),
    });
    let feed = EventsFeed::new(source.clone(), cache, 6);

    // Write failure: still fresh
    let fresh = feed.refresh().await.unwrap();
    assert_eq!(fresh.events().len(), 2);
    assert!(fresh.error().is_none());

    // Read failure: treated as a miss
    source.down.store(true, Ordering::SeqCst);
    assert!(matches!(feed.refresh().await.unwrap(), RefreshOutcome::Empty { .. }));
}

#[tokio::test]
async fn test_file_cache_survives_new_instance() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("events.json");

    let first = FileCache::new(&path);
    assert_eq!(first.get().await.unwrap(), None);

    let events: Vec<Event> = payload()["events"]
        .as_array()
        .unwrap()
        .iter()
        .map(|wrapper| Event::from_value(&wrapper["event"]).unwrap())
        .collect();
    first.put(&events).await.unwrap();

    // A new instance reads what the previous process left behind
    let second = FileCache::new(&path);
    assert_eq!(second.get().await.unwrap(), Some(events));
}
