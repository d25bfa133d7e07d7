mod redis_store;

pub use redis_store::RedisCache;

use crate::components::events_feed::Event;
use crate::config::CacheBackend;
use crate::error::{cache_error, SignageResult};
use async_trait::async_trait;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::fs;
use tokio::sync::RwLock;
use tracing::info;

// Cache key constants
pub mod keys {
    /// The single slot holding the last displayed event list
    pub const EVENTS: &str = "events";
}

/// Store for the last successfully selected event list.
///
/// One slot, overwritten wholesale; last writer wins.
#[async_trait]
pub trait EventCache: Send + Sync + 'static {
    /// Read the cached list, `None` when nothing was ever stored
    async fn get(&self) -> SignageResult<Option<Vec<Event>>>;

    /// Replace the cached list
    async fn put(&self, events: &[Event]) -> SignageResult<()>;
}

/// In-memory implementation of the cache
#[derive(Debug, Default)]
pub struct InMemoryCache {
    events: RwLock<Option<Vec<Event>>>,
}

impl InMemoryCache {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl EventCache for InMemoryCache {
    async fn get(&self) -> SignageResult<Option<Vec<Event>>> {
        Ok(self.events.read().await.clone())
    }

    async fn put(&self, events: &[Event]) -> SignageResult<()> {
        *self.events.write().await = Some(events.to_vec());
        Ok(())
    }
}

/// JSON snapshot on local disk, kept across restarts
#[derive(Debug, Clone)]
pub struct FileCache {
    path: PathBuf,
}

impl FileCache {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl EventCache for FileCache {
    async fn get(&self) -> SignageResult<Option<Vec<Event>>> {
        let json = match fs::read_to_string(&self.path).await {
            Ok(json) => json,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(cache_error(&format!(
                    "Failed to read {}: {}",
                    self.path.display(),
                    e
                )))
            }
        };

        let events: Vec<Event> = serde_json::from_str(&json)
            .map_err(|e| cache_error(&format!("Failed to deserialize events: {}", e)))?;

        Ok(Some(events))
    }

    async fn put(&self, events: &[Event]) -> SignageResult<()> {
        let json = serde_json::to_string(events)
            .map_err(|e| cache_error(&format!("Failed to serialize events: {}", e)))?;

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).await?;
        }

        // Write next to the target and rename so readers never see a partial file
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, json).await?;
        fs::rename(&tmp, &self.path).await?;

        Ok(())
    }
}

/// Build the cache selected in configuration
pub fn build_cache(backend: &CacheBackend) -> SignageResult<Arc<dyn EventCache>> {
    let cache: Arc<dyn EventCache> = match backend {
        CacheBackend::Memory => {
            info!("Using in-memory event cache");
            Arc::new(InMemoryCache::new())
        }
        CacheBackend::File(path) => {
            info!("Using file event cache at {}", path.display());
            Arc::new(FileCache::new(path.clone()))
        }
        CacheBackend::Redis(url) => {
            info!("Using Redis event cache at {}", url);
            Arc::new(RedisCache::new(url)?)
        }
    };

    Ok(cache)
}
