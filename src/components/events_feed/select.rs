use super::models::Event;
use chrono::{DateTime, Utc};

/// Keep future events, earliest first, at most `limit` of them.
///
/// Events whose start cannot be resolved are dropped. Ties keep input order.
pub fn select_upcoming(events: Vec<Event>, now: DateTime<Utc>, limit: usize) -> Vec<Event> {
    let mut upcoming: Vec<(DateTime<Utc>, Event)> = events
        .into_iter()
        .filter_map(|event| {
            let start = event.start_instant()?;
            (start > now).then_some((start, event))
        })
        .collect();

    // sort_by_key is stable
    upcoming.sort_by_key(|(start, _)| *start);
    upcoming.truncate(limit);

    upcoming.into_iter().map(|(_, event)| event).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DEFAULT_EVENT_LIMIT;
    use crate::components::events_feed::normalize::normalize;
    use chrono::TimeZone;
    use serde_json::json;

    fn event(id: i64, first_date: &str) -> Event {
        Event::from_value(&json!({"id": id, "title": format!("Event {}", id), "first_date": first_date}))
            .unwrap()
    }

    fn ids(events: &[Event]) -> Vec<String> {
        events.iter().map(|e| e.id().to_string()).collect()
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap()
    }

    #[test]
    fn test_past_and_unresolvable_are_excluded() {
        let events = vec![
            event(1, "2024-12-31T23:59:59Z"),
            event(2, "2025-01-01T00:00:00Z"),
            event(3, "2025-01-01T00:00:01Z"),
            event(4, "someday"),
            event(5, ""),
        ];

        assert_eq!(ids(&select_upcoming(events, now(), 6)), vec!["3"]);
    }

    #[test]
    fn test_sorted_and_stable() {
        let events = vec![
            event(1, "2025-03-01T10:00:00Z"),
            event(2, "2025-02-01T10:00:00Z"),
            event(3, "2025-03-01T10:00:00Z"),
            event(4, "2025-02-15T10:00:00Z"),
            event(5, "2025-03-01T05:00:00-05:00"),
        ];

        assert_eq!(
            ids(&select_upcoming(events, now(), 10)),
            vec!["2", "4", "1", "3", "5"]
        );
    }

    #[test]
    fn test_limit() {
        let events: Vec<Event> = (1..=9)
            .map(|i| event(i, &format!("2025-02-0{}T10:00:00Z", i)))
            .collect();

        let selected = select_upcoming(events.clone(), now(), DEFAULT_EVENT_LIMIT);
        assert_eq!(ids(&selected), vec!["1", "2", "3", "4", "5", "6"]);

        let all = select_upcoming(events[..3].to_vec(), now(), DEFAULT_EVENT_LIMIT);
        assert_eq!(all, events[..3].to_vec());

        assert!(select_upcoming(events, now(), 0).is_empty());
        assert!(select_upcoming(Vec::new(), now(), 6).is_empty());
    }

    #[test]
    fn test_wrapped_future_event_scenario() {
        let raw = json!({
            "events": [
                {"event": {"id": 1, "title": "A", "first_date": "2999-01-01T10:00:00Z"}},
                {"id": 2, "title": "B", "first_date": "2000-01-01T10:00:00Z"}
            ]
        });

        let selected = select_upcoming(normalize(&raw), now(), DEFAULT_EVENT_LIMIT);
        assert_eq!(ids(&selected), vec!["1"]);
        assert_eq!(selected[0].title(), "A");
    }
}
