use crate::error::{config_error, SignageResult};
use regex::Regex;
use serde::Deserialize;
use std::fs;
use std::path::Path;
use std::sync::LazyLock;
use tracing::info;

/// Official name and building of a room
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RoomEntry {
    /// Number used for lookup
    pub number: u32,
    /// Number as printed, e.g. "315/316"; defaults to `number`
    #[serde(default)]
    pub label: Option<String>,
    pub name: String,
    pub building: String,
}

#[derive(Debug, Deserialize)]
struct RoomsFile {
    #[serde(default)]
    rooms: Vec<RoomEntry>,
}

/// Lookup table turning free-text room numbers into display locations
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoomDirectory {
    entries: Vec<RoomEntry>,
}

impl Default for RoomDirectory {
    fn default() -> Self {
        let room = |number: u32, label: Option<&str>, name: &str, building: &str| RoomEntry {
            number,
            label: label.map(str::to_string),
            name: name.to_string(),
            building: building.to_string(),
        };

        Self {
            entries: vec![
                room(102, None, "Lecture Hall", "Newhouse 1"),
                room(140, None, "Joyce Hergenhan Auditorium", "Newhouse 3"),
                room(251, None, "Costas Corner", "Newhouse 3"),
                room(252, None, "Kramer War Room", "Newhouse 3"),
                room(253, None, "Sports Media Center", "Newhouse 3"),
                room(301, None, "Visitors’ Center", "Newhouse 1"),
                room(
                    316,
                    Some("315/316"),
                    "Undergraduate Advising and Records Office",
                    "Newhouse 3",
                ),
                room(318, None, "Horvitz Academic Programs Suite", "Newhouse 3"),
                room(327, None, "Time Warner Cable Conference Room", "Newhouse 3"),
            ],
        }
    }
}

impl RoomDirectory {
    pub fn new(entries: Vec<RoomEntry>) -> Self {
        Self { entries }
    }

    /// Parse a table of `[[rooms]]` entries
    pub fn from_toml_str(content: &str) -> SignageResult<Self> {
        let file: RoomsFile = toml::from_str(content)?;
        Ok(Self::new(file.rooms))
    }

    /// Load a table from disk
    pub fn load(path: &Path) -> SignageResult<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            config_error(&format!("Failed to read rooms file {}: {}", path.display(), e))
        })?;
        let directory = Self::from_toml_str(&content)?;
        info!(
            "Loaded {} rooms from {}",
            directory.entries.len(),
            path.display()
        );
        Ok(directory)
    }

    pub fn lookup(&self, number: u32) -> Option<&RoomEntry> {
        self.entries.iter().find(|entry| entry.number == number)
    }

    /// Display text for a free-text room field.
    ///
    /// A known room reads "<name>\n<number> <building>"; unknown text is
    /// returned as given; blank or "None" yields nothing.
    pub fn format_location(&self, room: &str) -> Option<String> {
        let room = room.trim();
        if room.is_empty() || room == "None" {
            return None;
        }

        let hit = extract_room_number(room).and_then(|number| self.lookup(number));
        match hit {
            Some(entry) => {
                let label = entry
                    .label
                    .clone()
                    .unwrap_or_else(|| entry.number.to_string());
                Some(format!("{}\n{} {}", entry.name, label, entry.building))
            }
            None => Some(room.to_string()),
        }
    }
}

static ROOM_NUMBER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[0-9]{3,}").expect("valid room number regex"));

/// First run of three or more digits, or the whole text when it is a number
fn extract_room_number(room: &str) -> Option<u32> {
    if let Some(found) = ROOM_NUMBER.find(room) {
        return found.as_str().parse().ok();
    }

    if !room.is_empty() && room.chars().all(|c| c.is_ascii_digit()) {
        return room.parse().ok();
    }
    None
}
