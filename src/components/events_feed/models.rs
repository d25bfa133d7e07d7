use crate::utils::time::parse_start_instant;
use chrono::{DateTime, Utc};
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Number, Value};
use std::fmt;

/// Identifier of an upstream event, numeric or textual
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum EventId {
    Number(Number),
    Text(String),
}

impl fmt::Display for EventId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EventId::Number(n) => write!(f, "{}", n),
            EventId::Text(s) => f.write_str(s),
        }
    }
}

/// A calendar event as delivered by the upstream API.
///
/// Only `id` and `title` are guaranteed. Every other upstream field is kept
/// untouched in `fields` and read through the lenient accessors below, so a
/// field of an unexpected type reads as absent instead of failing the event.
#[derive(Debug, Clone, PartialEq)]
pub struct Event {
    id: EventId,
    title: String,
    fields: Map<String, Value>,
}

impl Event {
    /// Accept an upstream object if it looks like an event.
    ///
    /// Conforming means `id` is a number or string and `title` is a string.
    pub fn from_object(fields: Map<String, Value>) -> Option<Self> {
        let id = match fields.get("id")? {
            Value::Number(n) => EventId::Number(n.clone()),
            Value::String(s) => EventId::Text(s.clone()),
            _ => return None,
        };
        let title = fields.get("title")?.as_str()?.to_string();

        Some(Self { id, title, fields })
    }

    /// Accept any JSON value if it is a conforming event object
    pub fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Object(map) => Self::from_object(map.clone()),
            _ => None,
        }
    }

    pub fn id(&self) -> &EventId {
        &self.id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    /// Non-empty string field by name
    fn text(&self, name: &str) -> Option<&str> {
        self.fields
            .get(name)
            .and_then(Value::as_str)
            .filter(|s| !s.is_empty())
    }

    /// Start of the first scheduled instance
    pub fn first_instance_start(&self) -> Option<&str> {
        self.fields
            .get("event_instances")?
            .as_array()?
            .first()?
            .get("event_instance")?
            .get("start")?
            .as_str()
            .filter(|s| !s.is_empty())
    }

    /// Legacy first-date field
    pub fn first_date(&self) -> Option<&str> {
        self.text("first_date")
    }

    /// Raw start string: first instance start, else first date
    pub fn start_raw(&self) -> Option<&str> {
        self.first_instance_start().or_else(|| self.first_date())
    }

    /// Effective start instant, `None` when unresolvable
    pub fn start_instant(&self) -> Option<DateTime<Utc>> {
        // An unparseable instance start does not fall through to first_date
        self.start_raw().and_then(parse_start_instant)
    }

    /// End of the first scheduled instance
    pub fn end_instant(&self) -> Option<DateTime<Utc>> {
        self.fields
            .get("event_instances")?
            .as_array()?
            .first()?
            .get("event_instance")?
            .get("end")?
            .as_str()
            .and_then(parse_start_instant)
    }

    pub fn room_number(&self) -> Option<&str> {
        self.text("room_number")
    }

    pub fn location_name(&self) -> Option<&str> {
        self.text("location_name")
    }

    pub fn description_text(&self) -> Option<&str> {
        self.text("description_text")
    }

    pub fn description(&self) -> Option<&str> {
        self.text("description")
    }

    /// Description body, plain text preferred over rich text
    pub fn body(&self) -> Option<&str> {
        self.description_text().or_else(|| self.description())
    }

    pub fn photo_url(&self) -> Option<&str> {
        self.text("photo_url")
    }

    /// Public page for the event
    pub fn url(&self) -> Option<&str> {
        self.text("localist_url").or_else(|| self.text("url"))
    }
}

impl Serialize for Event {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.fields.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Event {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let fields = Map::deserialize(deserializer)?;
        Event::from_object(fields)
            .ok_or_else(|| D::Error::custom("event needs a numeric or string id and a string title"))
    }
}
