use crate::components::events_feed::{Event, RefreshOutcome};
use serde::{Deserialize, Serialize};

/// Banner shown while the display runs on cached data
pub const STALE_NOTICE: &str = "Could not fetch events. Showing cached data if available.";

/// Layout of the display
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum DisplayMode {
    /// One slide at a time
    Single,
    /// Up to `count` slides side by side
    Multi { count: usize },
}

impl DisplayMode {
    /// Multi-slide mode showing at least one slide
    pub fn multi(count: usize) -> Self {
        DisplayMode::Multi {
            count: count.max(1),
        }
    }

    fn normalized(self) -> Self {
        match self {
            DisplayMode::Single => DisplayMode::Single,
            DisplayMode::Multi { count } => DisplayMode::multi(count),
        }
    }
}

/// Lifecycle of the rotation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    /// No refresh result yet
    Uninitialized,
    /// Items loaded and rotating
    Ready,
    /// Nothing to show; no timer runs
    Empty,
}

/// How current the loaded items are
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Freshness {
    /// Fetched on the last refresh
    Live,
    /// Served from the cache after a failed refresh
    Stale,
    /// Refresh failed and no cache was available
    Unavailable,
}

/// Rotation state machine.
///
/// Pure: the timer lives with the owner, which should keep one armed
/// exactly while `is_rotating` holds.
#[derive(Debug, Clone)]
pub struct RotationState {
    items: Vec<Event>,
    index: usize,
    mode: DisplayMode,
    phase: Phase,
    freshness: Freshness,
    last_error: Option<String>,
}

impl RotationState {
    pub fn new(mode: DisplayMode) -> Self {
        Self {
            items: Vec::new(),
            index: 0,
            mode: mode.normalized(),
            phase: Phase::Uninitialized,
            freshness: Freshness::Live,
            last_error: None,
        }
    }

    /// Replace the items with a refresh result, restarting from the first
    pub fn load(&mut self, outcome: RefreshOutcome) -> Phase {
        self.freshness = match &outcome {
            RefreshOutcome::Fresh { .. } => Freshness::Live,
            RefreshOutcome::Degraded { .. } => Freshness::Stale,
            RefreshOutcome::Empty { .. } => Freshness::Unavailable,
        };
        self.last_error = outcome.error().map(str::to_string);
        self.items = outcome.into_events();
        self.index = 0;
        self.phase = if self.items.is_empty() {
            Phase::Empty
        } else {
            Phase::Ready
        };
        self.phase
    }

    /// Move to the next item, wrapping around
    pub fn advance(&mut self) -> usize {
        if self.phase == Phase::Ready {
            self.index = (self.index + 1) % self.items.len();
        }
        self.index
    }

    /// Switch layout, restarting from the first item
    pub fn set_mode(&mut self, mode: DisplayMode) {
        self.mode = mode.normalized();
        self.index = 0;
    }

    /// Items currently on screen
    pub fn visible(&self) -> &[Event] {
        if self.phase != Phase::Ready {
            return &[];
        }
        match self.mode {
            DisplayMode::Single => &self.items[self.index..=self.index],
            DisplayMode::Multi { count } => &self.items[..count.min(self.items.len())],
        }
    }

    /// Whether an advance timer should be running
    pub fn is_rotating(&self) -> bool {
        self.phase == Phase::Ready
    }

    /// Banner text for the current state, if any
    pub fn notice(&self) -> Option<&'static str> {
        match (self.phase, self.freshness) {
            (Phase::Ready, Freshness::Stale) => Some(STALE_NOTICE),
            _ => None,
        }
    }

    pub fn items(&self) -> &[Event] {
        &self.items
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn mode(&self) -> DisplayMode {
        self.mode
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn freshness(&self) -> Freshness {
        self.freshness
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }
}
