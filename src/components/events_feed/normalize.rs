use super::models::Event;
use serde_json::Value;
use tracing::debug;

/// Classification of one element of an upstream event list
#[derive(Debug, Clone, PartialEq)]
pub enum Candidate {
    /// `{ "event": { ... } }` wrapper around a conforming event
    Wrapped(Event),
    /// A conforming event object given directly
    Bare(Event),
    /// Anything that does not resolve to a conforming event
    Rejected,
}

impl Candidate {
    /// Classify a single list element
    pub fn classify(element: &Value) -> Self {
        match element.get("event") {
            Some(inner @ Value::Object(_)) => match Event::from_value(inner) {
                Some(event) => Candidate::Wrapped(event),
                None => Candidate::Rejected,
            },
            _ => match Event::from_value(element) {
                Some(event) => Candidate::Bare(event),
                None => Candidate::Rejected,
            },
        }
    }

    /// The event carried by this candidate, if accepted
    pub fn into_event(self) -> Option<Event> {
        match self {
            Candidate::Wrapped(event) | Candidate::Bare(event) => Some(event),
            Candidate::Rejected => None,
        }
    }
}

/// Find the event list in a payload: top-level `events`, else `data.events`
fn locate_events(raw: &Value) -> Option<&Vec<Value>> {
    raw.get("events")
        .and_then(Value::as_array)
        .or_else(|| raw.get("data")?.get("events")?.as_array())
}

/// Turn an upstream payload into the canonical event list.
///
/// Never fails: an unrecognized payload yields an empty list, and elements
/// that are not events are dropped. Input order is kept.
pub fn normalize(raw: &Value) -> Vec<Event> {
    let Some(elements) = locate_events(raw) else {
        debug!("No event list found in upstream payload");
        return Vec::new();
    };

    let events: Vec<Event> = elements
        .iter()
        .filter_map(|element| Candidate::classify(element).into_event())
        .collect();

    let dropped = elements.len() - events.len();
    if dropped > 0 {
        debug!("Dropped {} non-conforming elements out of {}", dropped, elements.len());
    }

    events
}
