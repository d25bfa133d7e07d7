use super::models::Event;
use super::normalize::normalize;
use super::select::select_upcoming;
use super::source::EventSource;
use crate::components::cache_service::EventCache;
use crate::error::SignageResult;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;
use tracing::{info, warn};

/// Result of one refresh cycle
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum RefreshOutcome {
    /// Freshly fetched list, now also cached
    Fresh { events: Vec<Event> },
    /// Fetch failed; showing the last cached list
    Degraded { events: Vec<Event>, error: String },
    /// Fetch failed and nothing was cached
    Empty { error: String },
}

impl RefreshOutcome {
    /// Events to show for this outcome
    pub fn events(&self) -> &[Event] {
        match self {
            RefreshOutcome::Fresh { events } | RefreshOutcome::Degraded { events, .. } => events,
            RefreshOutcome::Empty { .. } => &[],
        }
    }

    pub fn into_events(self) -> Vec<Event> {
        match self {
            RefreshOutcome::Fresh { events } | RefreshOutcome::Degraded { events, .. } => events,
            RefreshOutcome::Empty { .. } => Vec::new(),
        }
    }

    /// Failure behind a degraded or empty outcome
    pub fn error(&self) -> Option<&str> {
        match self {
            RefreshOutcome::Fresh { .. } => None,
            RefreshOutcome::Degraded { error, .. } | RefreshOutcome::Empty { error } => {
                Some(error)
            }
        }
    }

    pub fn is_degraded(&self) -> bool {
        matches!(self, RefreshOutcome::Degraded { .. })
    }
}

/// Fetches, normalizes and selects upcoming events, falling back to the cache
#[derive(Clone)]
pub struct EventsFeed {
    source: Arc<dyn EventSource>,
    cache: Arc<dyn EventCache>,
    limit: usize,
}

impl EventsFeed {
    pub fn new(source: Arc<dyn EventSource>, cache: Arc<dyn EventCache>, limit: usize) -> Self {
        Self {
            source,
            cache,
            limit,
        }
    }

    /// Fetch the upstream payload and select the events to display.
    ///
    /// Touches neither the cache nor any other state.
    pub async fn fetch_upcoming(&self, now: DateTime<Utc>) -> SignageResult<Vec<Event>> {
        let raw = self.source.fetch_raw().await?;
        let events = normalize(&raw);
        let found = events.len();
        let selected = select_upcoming(events, now, self.limit);

        info!("Selected {} upcoming events out of {}", selected.len(), found);
        Ok(selected)
    }

    /// Run one refresh cycle.
    ///
    /// A successful fetch overwrites the cache before returning. A failed
    /// fetch is answered from the cache, tagged so callers can tell stale
    /// data from nothing at all. Failures the cache cannot stand in for,
    /// such as a misconfigured source, are returned as errors.
    pub async fn refresh(&self) -> SignageResult<RefreshOutcome> {
        let e = match self.fetch_upcoming(Utc::now()).await {
            Ok(events) => {
                if let Err(e) = self.cache.put(&events).await {
                    warn!("Failed to cache events: {}", e);
                }
                return Ok(RefreshOutcome::Fresh { events });
            }
            Err(e) if !e.is_recoverable() => return Err(e),
            Err(e) => e,
        };

        warn!("Event refresh failed: {}", e);
        let error = e.to_string();

        let outcome = match self.cache.get().await {
            Ok(Some(events)) => {
                info!("Serving {} cached events", events.len());
                RefreshOutcome::Degraded { events, error }
            }
            Ok(None) => RefreshOutcome::Empty { error },
            Err(cache_err) => {
                warn!("Failed to read cached events: {}", cache_err);
                RefreshOutcome::Empty { error }
            }
        };

        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::cache_service::InMemoryCache;
    use crate::error::{cache_error, config_error, upstream_error, Error};
    use async_trait::async_trait;
    use serde_json::{json, Value};

    struct StaticSource(Value);

    #[async_trait]
    impl EventSource for StaticSource {
        async fn fetch_raw(&self) -> SignageResult<Value> {
            Ok(self.0.clone())
        }
    }

    struct FailingSource;

    #[async_trait]
    impl EventSource for FailingSource {
        async fn fetch_raw(&self) -> SignageResult<Value> {
            Err(upstream_error("HTTP 503"))
        }
    }

    struct BrokenCache;

    #[async_trait]
    impl EventCache for BrokenCache {
        async fn get(&self) -> SignageResult<Option<Vec<Event>>> {
            Err(cache_error("unavailable"))
        }

        async fn put(&self, _events: &[Event]) -> SignageResult<()> {
            Err(cache_error("unavailable"))
        }
    }

    fn payload() -> Value {
        json!({
            "events": [
                {"event": {"id": 1, "title": "Later", "first_date": "2999-02-01T10:00:00Z"}},
                {"event": {"id": 2, "title": "Past", "first_date": "2000-01-01T10:00:00Z"}},
                {"event": {"id": 3, "title": "Sooner", "first_date": "2999-01-01T10:00:00Z"}}
            ]
        })
    }

    #[tokio::test]
    async fn test_fresh_refresh_writes_cache() {
        let cache = Arc::new(InMemoryCache::new());
        let feed = EventsFeed::new(Arc::new(StaticSource(payload())), cache.clone(), 6);

        let outcome = feed.refresh().await.unwrap();
        let titles: Vec<&str> = outcome.events().iter().map(|e| e.title()).collect();
        assert_eq!(titles, vec!["Sooner", "Later"]);
        assert_eq!(outcome.error(), None);

        assert_eq!(cache.get().await.unwrap().as_deref(), Some(outcome.events()));
    }

    #[tokio::test]
    async fn test_failure_with_cache_is_degraded() {
        let cache = Arc::new(InMemoryCache::new());
        let cached = vec![Event::from_value(&json!({"id": 9, "title": "Cached"})).unwrap()];
        cache.put(&cached).await.unwrap();

        let feed = EventsFeed::new(Arc::new(FailingSource), cache, 6);
        let outcome = feed.refresh().await.unwrap();

        assert!(outcome.is_degraded());
        assert_eq!(outcome.events(), cached.as_slice());
        assert!(outcome.error().unwrap().contains("HTTP 503"));
    }

    #[tokio::test]
    async fn test_failure_without_cache_is_empty() {
        let feed = EventsFeed::new(Arc::new(FailingSource), Arc::new(InMemoryCache::new()), 6);

        let outcome = feed.refresh().await.unwrap();
        assert!(matches!(outcome, RefreshOutcome::Empty { .. }));
        assert!(outcome.events().is_empty());
    }

    #[tokio::test]
    async fn test_cache_failures_do_not_mask_outcome() {
        let fresh = EventsFeed::new(Arc::new(StaticSource(payload())), Arc::new(BrokenCache), 6);
        assert!(matches!(fresh.refresh().await.unwrap(), RefreshOutcome::Fresh { .. }));

        let failing = EventsFeed::new(Arc::new(FailingSource), Arc::new(BrokenCache), 6);
        assert!(matches!(failing.refresh().await.unwrap(), RefreshOutcome::Empty { .. }));
    }

    #[tokio::test]
    async fn test_fetch_upcoming_leaves_cache_alone() {
        let cache = Arc::new(InMemoryCache::new());
        let feed = EventsFeed::new(Arc::new(StaticSource(payload())), cache.clone(), 1);

        let events = feed.fetch_upcoming(Utc::now()).await.unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].title(), "Sooner");
        assert_eq!(cache.get().await.unwrap(), None);
    }

    struct MisconfiguredSource;

    #[async_trait]
    impl EventSource for MisconfiguredSource {
        async fn fetch_raw(&self) -> SignageResult<Value> {
            Err(config_error("Missing EVENTS_API_URL"))
        }
    }

    #[tokio::test]
    async fn test_configuration_error_skips_cache() {
        let cache = Arc::new(InMemoryCache::new());
        let cached = vec![Event::from_value(&json!({"id": 9, "title": "Cached"})).unwrap()];
        cache.put(&cached).await.unwrap();

        let feed = EventsFeed::new(Arc::new(MisconfiguredSource), cache, 6);
        let result = feed.refresh().await;

        assert!(matches!(result, Err(Error::Configuration(_))));
    }
}
