use super::feed::{EventsFeed, RefreshOutcome};
use crate::components::rotation::RotationHandle;
use crate::utils::scheduler::RepeatingTask;
use std::ops::ControlFlow;
use std::time::Duration;
use tracing::{error, info, warn};

/// Start refreshing events now and then every `interval`, feeding the display
pub fn start_scheduler(
    task: &mut RepeatingTask,
    interval: Duration,
    feed: EventsFeed,
    rotation: RotationHandle,
) {
    info!("Refreshing events every {:?}", interval);

    task.arm(interval, true, move || {
        let feed = feed.clone();
        let rotation = rotation.clone();
        async move {
            let outcome = match feed.refresh().await {
                Ok(outcome) => outcome,
                Err(e) => {
                    // Nothing the cache can cover; keep what is on screen
                    error!("Event refresh failed: {}", e);
                    return ControlFlow::Continue(());
                }
            };
            match &outcome {
                RefreshOutcome::Fresh { events } => {
                    info!("Refreshed {} upcoming events", events.len())
                }
                RefreshOutcome::Degraded { events, error } => {
                    warn!("Showing {} cached events: {}", events.len(), error)
                }
                RefreshOutcome::Empty { error } => warn!("No events to show: {}", error),
            }

            match rotation.load(outcome).await {
                Ok(_) => ControlFlow::Continue(()),
                Err(e) => {
                    error!("Failed to hand events to the display: {}", e);
                    ControlFlow::Break(())
                }
            }
        }
    });
}
