use std::future::Future;
use std::ops::ControlFlow;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::{interval, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::debug;

/// A recurring task that can be torn down and re-armed.
///
/// At most one task is active per slot: arming always cancels the previous
/// task first. Dropping the slot cancels the task.
#[derive(Debug, Default)]
pub struct RepeatingTask {
    name: &'static str,
    armed: Option<ArmedTask>,
}

#[derive(Debug)]
struct ArmedTask {
    cancel: CancellationToken,
    join: JoinHandle<()>,
}

impl RepeatingTask {
    /// Create an empty slot
    pub fn new(name: &'static str) -> Self {
        Self { name, armed: None }
    }

    /// Arm the slot, replacing any running task.
    ///
    /// `tick` runs once per `period`; the first run happens right away when
    /// `fire_immediately` is set, otherwise after one full period. Returning
    /// `ControlFlow::Break` ends the task.
    pub fn arm<F, Fut>(&mut self, period: Duration, fire_immediately: bool, mut tick: F)
    where
        F: FnMut() -> Fut + Send + 'static,
        Fut: Future<Output = ControlFlow<()>> + Send,
    {
        self.disarm();

        let cancel = CancellationToken::new();
        let cancelled = cancel.clone();
        let name = self.name;

        let join = tokio::spawn(async move {
            let mut ticker = interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            // The first tick of an interval completes immediately
            if !fire_immediately {
                ticker.tick().await;
            }

            loop {
                tokio::select! {
                    biased;
                    _ = cancelled.cancelled() => break,
                    _ = ticker.tick() => {
                        if tick().await.is_break() {
                            break;
                        }
                    }
                }
            }

            debug!("Repeating task {} stopped", name);
        });

        debug!("Repeating task {} armed with period {:?}", name, period);
        self.armed = Some(ArmedTask { cancel, join });
    }

    /// Cancel the running task, if any
    pub fn disarm(&mut self) {
        if let Some(task) = self.armed.take() {
            task.cancel.cancel();
            task.join.abort();
            debug!("Repeating task {} disarmed", self.name);
        }
    }

    /// Whether a task is currently running in this slot
    pub fn is_armed(&self) -> bool {
        self.armed
            .as_ref()
            .is_some_and(|task| !task.join.is_finished())
    }
}

impl Drop for RepeatingTask {
    fn drop(&mut self) {
        self.disarm();
    }
}
