use super::actor::{RotationActor, RotationActorHandle, RotationSnapshot};
use super::state::DisplayMode;
use crate::components::events_feed::RefreshOutcome;
use crate::error::SignageResult;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;

/// Handle for interacting with the rotation actor
#[derive(Clone)]
pub struct RotationHandle {
    actor_handle: RotationActorHandle,
    _actor_task: Arc<JoinHandle<()>>,
}

impl RotationHandle {
    /// Create a new RotationHandle and spawn the actor
    pub fn new(mode: DisplayMode, period: Duration) -> Self {
        // Create the actor and get its handle
        let (mut actor, handle) = RotationActor::new(mode, period);

        // Spawn a task to run the actor
        let actor_task = tokio::spawn(async move {
            actor.run().await;
        });

        Self {
            actor_handle: handle,
            _actor_task: Arc::new(actor_task),
        }
    }

    /// Feed a refresh result to the display
    pub async fn load(&self, outcome: RefreshOutcome) -> SignageResult<RotationSnapshot> {
        self.actor_handle.load(outcome).await
    }

    /// Switch between single and multi-slide layout
    pub async fn set_mode(&self, mode: DisplayMode) -> SignageResult<RotationSnapshot> {
        self.actor_handle.set_mode(mode).await
    }

    /// Current view of the display
    pub async fn snapshot(&self) -> SignageResult<RotationSnapshot> {
        self.actor_handle.snapshot().await
    }

    /// Shutdown the actor
    pub async fn shutdown(&self) -> SignageResult<()> {
        self.actor_handle.shutdown().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::events_feed::Event;
    use crate::components::rotation::state::{Freshness, Phase};
    use serde_json::json;
    use tokio::time::sleep;

    const PERIOD: Duration = Duration::from_secs(10);

    fn events(n: i64) -> Vec<Event> {
        (1..=n)
            .map(|i| Event::from_value(&json!({"id": i, "title": format!("E{}", i)})).unwrap())
            .collect()
    }

    #[tokio::test(start_paused = true)]
    async fn test_rotates_on_period_and_wraps() {
        let handle = RotationHandle::new(DisplayMode::Single, PERIOD);

        let snapshot = handle.snapshot().await.unwrap();
        assert_eq!(snapshot.phase, Phase::Uninitialized);
        assert!(!snapshot.timer_armed);

        let loaded = handle
            .load(RefreshOutcome::Fresh { events: events(3) })
            .await
            .unwrap();
        assert_eq!(loaded.phase, Phase::Ready);
        assert_eq!(loaded.index, 0);
        assert!(loaded.timer_armed);

        sleep(Duration::from_secs(11)).await;
        assert_eq!(handle.snapshot().await.unwrap().index, 1);

        sleep(Duration::from_secs(20)).await;
        let wrapped = handle.snapshot().await.unwrap();
        assert_eq!(wrapped.index, 0);
        assert_eq!(wrapped.visible[0].title(), "E1");

        handle.shutdown().await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn test_reload_replaces_timer() {
        let handle = RotationHandle::new(DisplayMode::Single, PERIOD);
        handle
            .load(RefreshOutcome::Fresh { events: events(3) })
            .await
            .unwrap();

        // First timer would fire at 10s and 20s
        sleep(Duration::from_secs(15)).await;
        assert_eq!(handle.snapshot().await.unwrap().index, 1);

        let reloaded = handle
            .load(RefreshOutcome::Fresh { events: events(3) })
            .await
            .unwrap();
        assert_eq!(reloaded.index, 0);

        // Only the new timer fires, at 25s
        sleep(Duration::from_secs(6)).await;
        assert_eq!(handle.snapshot().await.unwrap().index, 0);
        sleep(Duration::from_secs(5)).await;
        assert_eq!(handle.snapshot().await.unwrap().index, 1);

        handle.shutdown().await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn test_empty_result_disarms_timer() {
        let handle = RotationHandle::new(DisplayMode::Single, PERIOD);
        handle
            .load(RefreshOutcome::Fresh { events: events(2) })
            .await
            .unwrap();

        let empty = handle
            .load(RefreshOutcome::Empty {
                error: "Upstream error: HTTP 502".to_string(),
            })
            .await
            .unwrap();
        assert_eq!(empty.phase, Phase::Empty);
        assert_eq!(empty.freshness, Freshness::Unavailable);
        assert!(!empty.timer_armed);
        assert!(empty.visible.is_empty());

        sleep(Duration::from_secs(30)).await;
        assert_eq!(handle.snapshot().await.unwrap().index, 0);

        handle.shutdown().await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn test_mode_switch_resets_and_rearms() {
        let handle = RotationHandle::new(DisplayMode::Single, PERIOD);
        handle
            .load(RefreshOutcome::Degraded {
                events: events(4),
                error: "timeout".to_string(),
            })
            .await
            .unwrap();

        sleep(Duration::from_secs(15)).await;
        let switched = handle.set_mode(DisplayMode::multi(3)).await.unwrap();
        assert_eq!(switched.index, 0);
        assert_eq!(switched.visible.len(), 3);
        assert!(switched.timer_armed);
        assert!(switched.notice.is_some());

        sleep(Duration::from_secs(6)).await;
        assert_eq!(handle.snapshot().await.unwrap().index, 0);

        handle.shutdown().await.unwrap();
    }
}
