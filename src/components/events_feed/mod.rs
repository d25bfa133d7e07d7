mod feed;
pub mod models;
pub mod normalize;
mod scheduler;
pub mod select;
pub mod source;

pub use feed::{EventsFeed, RefreshOutcome};
pub use models::{Event, EventId};
pub use normalize::{normalize, Candidate};
pub use select::select_upcoming;
pub use source::{EventSource, HttpEventSource};

use crate::config::Config;
use crate::error::SignageResult;
use crate::utils::scheduler::RepeatingTask;
use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};

use super::Services;

/// Periodic refresh of the upcoming events feeding the display
#[derive(Default)]
pub struct EventsFeedComponent {
    task: Mutex<Option<RepeatingTask>>,
}

impl EventsFeedComponent {
    /// Create a new events feed component
    pub fn new() -> Self {
        Self {
            task: Mutex::new(None),
        }
    }

    /// Whether the refresh loop is running
    pub async fn is_running(&self) -> bool {
        self.task
            .lock()
            .await
            .as_ref()
            .is_some_and(RepeatingTask::is_armed)
    }
}

#[async_trait]
impl super::Component for EventsFeedComponent {
    fn name(&self) -> &'static str {
        "events_feed"
    }

    async fn init(&self, config: Arc<RwLock<Config>>, services: Services) -> SignageResult<()> {
        let interval = config.read().await.refresh_interval;

        let mut task_lock = self.task.lock().await;
        let task = task_lock.get_or_insert_with(|| RepeatingTask::new("refresh"));

        // Start the refresh scheduler
        scheduler::start_scheduler(task, interval, services.feed, services.rotation);

        Ok(())
    }

    async fn shutdown(&self) -> SignageResult<()> {
        if let Some(task) = self.task.lock().await.as_mut() {
            task.disarm();
        }
        Ok(())
    }

    fn as_any(&self) -> &dyn std::any::Any {
        self
    }
}
