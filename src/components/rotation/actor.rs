use super::state::{DisplayMode, Freshness, Phase, RotationState};
use crate::components::events_feed::{Event, RefreshOutcome};
use crate::error::{component_error, SignageResult};
use crate::utils::scheduler::RepeatingTask;
use serde::Serialize;
use std::ops::ControlFlow;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{debug, info};

/// Point-in-time view of the rotation
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RotationSnapshot {
    pub phase: Phase,
    #[serde(flatten)]
    pub mode: DisplayMode,
    pub index: usize,
    pub total: usize,
    pub freshness: Freshness,
    pub notice: Option<String>,
    pub error: Option<String>,
    pub visible: Vec<Event>,
    pub timer_armed: bool,
}

/// The rotation actor that owns the display state
pub struct RotationActor {
    state: RotationState,
    period: Duration,
    timer: RepeatingTask,
    generation: u64,
    self_tx: mpsc::WeakSender<RotationCommand>,
    command_rx: mpsc::Receiver<RotationCommand>,
}

/// Commands that can be sent to the rotation actor
pub enum RotationCommand {
    Load(RefreshOutcome, mpsc::Sender<RotationSnapshot>),
    /// Timer tick; ticks from a torn-down timer carry an old generation
    Advance { generation: u64 },
    SetMode(DisplayMode, mpsc::Sender<RotationSnapshot>),
    Snapshot(mpsc::Sender<RotationSnapshot>),
    Shutdown,
}

/// Handle for communicating with the rotation actor
#[derive(Clone)]
pub struct RotationActorHandle {
    command_tx: mpsc::Sender<RotationCommand>,
}

impl RotationActorHandle {
    /// Replace the rotating items with a refresh result
    pub async fn load(&self, outcome: RefreshOutcome) -> SignageResult<RotationSnapshot> {
        let (response_tx, mut response_rx) = mpsc::channel(1);
        self.command_tx
            .send(RotationCommand::Load(outcome, response_tx))
            .await
            .map_err(|e| component_error(&format!("Actor mailbox error: {}", e)))?;

        response_rx
            .recv()
            .await
            .ok_or_else(|| component_error("Response channel closed"))
    }

    /// Switch the display layout
    pub async fn set_mode(&self, mode: DisplayMode) -> SignageResult<RotationSnapshot> {
        let (response_tx, mut response_rx) = mpsc::channel(1);
        self.command_tx
            .send(RotationCommand::SetMode(mode, response_tx))
            .await
            .map_err(|e| component_error(&format!("Actor mailbox error: {}", e)))?;

        response_rx
            .recv()
            .await
            .ok_or_else(|| component_error("Response channel closed"))
    }

    /// Get the current view
    pub async fn snapshot(&self) -> SignageResult<RotationSnapshot> {
        let (response_tx, mut response_rx) = mpsc::channel(1);
        self.command_tx
            .send(RotationCommand::Snapshot(response_tx))
            .await
            .map_err(|e| component_error(&format!("Actor mailbox error: {}", e)))?;

        response_rx
            .recv()
            .await
            .ok_or_else(|| component_error("Response channel closed"))
    }

    /// Shutdown the actor
    pub async fn shutdown(&self) -> SignageResult<()> {
        let _ = self.command_tx.send(RotationCommand::Shutdown).await;
        Ok(())
    }
}

impl RotationActor {
    /// Create a new actor and return its handle
    pub fn new(mode: DisplayMode, period: Duration) -> (Self, RotationActorHandle) {
        let (command_tx, command_rx) = mpsc::channel(32);

        let actor = Self {
            state: RotationState::new(mode),
            period,
            timer: RepeatingTask::new("rotation"),
            generation: 0,
            self_tx: command_tx.downgrade(),
            command_rx,
        };

        let handle = RotationActorHandle { command_tx };

        (actor, handle)
    }

    /// Start the actor's processing loop
    pub async fn run(&mut self) {
        info!("Rotation actor started");

        // Process commands
        while let Some(cmd) = self.command_rx.recv().await {
            match cmd {
                RotationCommand::Load(outcome, response_tx) => {
                    let phase = self.state.load(outcome);
                    info!(
                        "Rotation loaded {} items ({:?}, {:?})",
                        self.state.items().len(),
                        phase,
                        self.state.freshness()
                    );
                    self.rearm();
                    let _ = response_tx.send(self.snapshot()).await;
                }
                RotationCommand::Advance { generation } => {
                    if generation == self.generation {
                        let index = self.state.advance();
                        debug!("Rotation advanced to {}", index);
                    } else {
                        debug!("Ignoring tick from retired timer {}", generation);
                    }
                }
                RotationCommand::SetMode(mode, response_tx) => {
                    self.state.set_mode(mode);
                    info!("Display mode set to {:?}", self.state.mode());
                    self.rearm();
                    let _ = response_tx.send(self.snapshot()).await;
                }
                RotationCommand::Snapshot(response_tx) => {
                    let _ = response_tx.send(self.snapshot()).await;
                }
                RotationCommand::Shutdown => {
                    info!("Rotation actor shutting down");
                    break;
                }
            }
        }

        self.timer.disarm();
        info!("Rotation actor shut down");
    }

    /// Tear down the current timer and arm a new one if the state rotates
    fn rearm(&mut self) {
        self.timer.disarm();
        self.generation += 1;

        if !self.state.is_rotating() {
            return;
        }

        let generation = self.generation;
        let self_tx = self.self_tx.clone();
        self.timer.arm(self.period, false, move || {
            let self_tx = self_tx.clone();
            async move {
                // The actor is gone once every strong sender is dropped
                let Some(tx) = self_tx.upgrade() else {
                    return ControlFlow::Break(());
                };
                match tx.send(RotationCommand::Advance { generation }).await {
                    Ok(()) => ControlFlow::Continue(()),
                    Err(_) => ControlFlow::Break(()),
                }
            }
        });
    }

    fn snapshot(&self) -> RotationSnapshot {
        RotationSnapshot {
            phase: self.state.phase(),
            mode: self.state.mode(),
            index: self.state.index(),
            total: self.state.items().len(),
            freshness: self.state.freshness(),
            notice: self.state.notice().map(str::to_string),
            error: self.state.last_error().map(str::to_string),
            visible: self.state.visible().to_vec(),
            timer_armed: self.timer.is_armed(),
        }
    }
}
