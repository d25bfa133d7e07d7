use super::actor::RotationSnapshot;
use super::rooms::RoomDirectory;
use super::state::{DisplayMode, Freshness, Phase};
use crate::components::events_feed::{Event, EventId};
use crate::config::Config;
use crate::error::SignageResult;
use crate::utils::text::{display_title, html_to_text, truncate};
use crate::utils::time::{format_ap_time_range, format_start};
use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use serde::Serialize;

/// Text shown when there is nothing to rotate
pub const NOTHING_TO_SHOW: &str = "No upcoming events";

/// Text shown before the first refresh completes
pub const LOADING: &str = "Loading…";

/// One event laid out for the screen
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Slide {
    pub id: EventId,
    pub title: String,
    pub starts_at: Option<DateTime<Utc>>,
    pub when: Option<String>,
    pub time_range: Option<String>,
    pub location: Option<String>,
    pub description: Option<String>,
    pub photo_url: Option<String>,
    pub url: Option<String>,
}

/// What the screen should show right now
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DisplayView {
    pub phase: Phase,
    #[serde(flatten)]
    pub mode: DisplayMode,
    pub index: usize,
    pub total: usize,
    pub freshness: Freshness,
    /// Transient banner, e.g. when showing cached data
    pub notice: Option<String>,
    /// Placeholder text when no slide is shown
    pub placeholder: Option<String>,
    pub slides: Vec<Slide>,
}

/// Turns events into slides
#[derive(Debug, Clone)]
pub struct SlideFormatter {
    timezone: Tz,
    title_prefixes: Vec<String>,
    description_max_chars: usize,
    rooms: RoomDirectory,
}

impl SlideFormatter {
    pub fn new(
        timezone: Tz,
        title_prefixes: Vec<String>,
        description_max_chars: usize,
        rooms: RoomDirectory,
    ) -> Self {
        Self {
            timezone,
            title_prefixes,
            description_max_chars,
            rooms,
        }
    }

    /// Build a formatter from configuration, loading the rooms file if set
    pub fn from_config(config: &Config) -> SignageResult<Self> {
        let rooms = match &config.rooms_file {
            Some(path) => RoomDirectory::load(path)?,
            None => RoomDirectory::default(),
        };

        Ok(Self::new(
            config.timezone,
            config.title_prefixes.clone(),
            config.description_max_chars,
            rooms,
        ))
    }

    pub fn slide(&self, event: &Event) -> Slide {
        let starts_at = event.start_instant();
        let when = starts_at.map(|start| format_start(start, self.timezone));
        let time_range = starts_at.zip(event.end_instant()).map(|(start, end)| {
            format_ap_time_range(
                &start.with_timezone(&self.timezone),
                &end.with_timezone(&self.timezone),
            )
        });

        // A room number wins over the location name
        let location = match event.room_number() {
            Some(room) => self.rooms.format_location(room),
            None => event.location_name().map(str::to_string),
        };

        let description = event
            .body()
            .map(html_to_text)
            .filter(|text| !text.is_empty())
            .map(|text| truncate(&text, self.description_max_chars));

        Slide {
            id: event.id().clone(),
            title: display_title(event.title(), &self.title_prefixes),
            starts_at,
            when,
            time_range,
            location,
            description,
            photo_url: event.photo_url().map(str::to_string),
            url: event.url().map(str::to_string),
        }
    }

    pub fn view(&self, snapshot: &RotationSnapshot) -> DisplayView {
        let placeholder = match snapshot.phase {
            Phase::Uninitialized => Some(LOADING.to_string()),
            Phase::Empty => Some(NOTHING_TO_SHOW.to_string()),
            Phase::Ready => None,
        };

        DisplayView {
            phase: snapshot.phase,
            mode: snapshot.mode,
            index: snapshot.index,
            total: snapshot.total,
            freshness: snapshot.freshness,
            notice: snapshot.notice.clone(),
            placeholder,
            slides: snapshot.visible.iter().map(|e| self.slide(e)).collect(),
        }
    }
}
