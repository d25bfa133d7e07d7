use super::{keys, EventCache};
use crate::components::events_feed::Event;
use crate::error::{cache_error, SignageResult};
use async_trait::async_trait;
use redis::{AsyncCommands, Client as RedisClient};
use tracing::debug;

/// Redis-backed cache holding the event list under a single key
#[derive(Debug, Clone)]
pub struct RedisCache {
    client: RedisClient,
}

impl RedisCache {
    /// Create a client; the connection itself is opened per operation
    pub fn new(redis_url: &str) -> SignageResult<Self> {
        let client = RedisClient::open(redis_url)
            .map_err(|e| cache_error(&format!("Failed to create Redis client: {}", e)))?;

        Ok(Self { client })
    }

    /// Get a redis connection
    async fn get_connection(&self) -> SignageResult<redis::aio::MultiplexedConnection> {
        self.client
            .get_multiplexed_async_connection()
            .await
            .map_err(|e| cache_error(&format!("Failed to connect to Redis: {}", e)))
    }
}

#[async_trait]
impl EventCache for RedisCache {
    async fn get(&self) -> SignageResult<Option<Vec<Event>>> {
        let mut conn = self.get_connection().await?;

        let events_json: Option<String> = conn
            .get(keys::EVENTS)
            .await
            .map_err(|e| cache_error(&format!("Failed to read events from Redis: {}", e)))?;

        let Some(events_json) = events_json else {
            return Ok(None);
        };

        let events: Vec<Event> = serde_json::from_str(&events_json)
            .map_err(|e| cache_error(&format!("Failed to deserialize events: {}", e)))?;

        Ok(Some(events))
    }

    async fn put(&self, events: &[Event]) -> SignageResult<()> {
        let events_json = serde_json::to_string(events)
            .map_err(|e| cache_error(&format!("Failed to serialize events: {}", e)))?;

        let mut conn = self.get_connection().await?;

        let () = conn
            .set(keys::EVENTS, events_json)
            .await
            .map_err(|e| cache_error(&format!("Failed to save events to Redis: {}", e)))?;

        debug!("Saved {} events to Redis", events.len());
        Ok(())
    }
}
