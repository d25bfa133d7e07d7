use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime, Timelike, Utc};
use chrono_tz::Tz;

/// AP style month abbreviations
const AP_MONTHS: [&str; 12] = [
    "Jan.", "Feb.", "March", "April", "May", "June", "July", "Aug.", "Sept.", "Oct.", "Nov.",
    "Dec.",
];

/// Parse an upstream start string into an instant.
///
/// Accepts RFC 3339, ISO datetimes without an offset (read as UTC) and bare
/// `YYYY-MM-DD` dates (UTC midnight).
pub fn parse_start_instant(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }

    // Offsets without a colon, e.g. -0400
    if let Ok(dt) = DateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%z") {
        return Some(dt.with_timezone(&Utc));
    }

    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M:%S"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(naive.and_utc());
        }
    }

    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

/// Format a date AP style, e.g. "Wednesday, Sept. 10"
pub fn format_ap_date(dt: &DateTime<Tz>) -> String {
    let month = AP_MONTHS[dt.month0() as usize];
    format!("{}, {} {}", dt.format("%A"), month, dt.day())
}

/// Split a time into its AP clock text and period
fn ap_clock(dt: &DateTime<Tz>) -> (String, &'static str) {
    let period = if dt.hour() < 12 { "a.m." } else { "p.m." };
    let hour = match dt.hour() % 12 {
        0 => 12,
        h => h,
    };
    let clock = if dt.minute() == 0 {
        hour.to_string()
    } else {
        format!("{}:{:02}", hour, dt.minute())
    };
    (clock, period)
}

/// Format a time AP style, e.g. "6 p.m." or "6:30 p.m."
pub fn format_ap_time(dt: &DateTime<Tz>) -> String {
    let (clock, period) = ap_clock(dt);
    format!("{} {}", clock, period)
}

/// Format a time range AP style, sharing the period when both ends agree
pub fn format_ap_time_range(start: &DateTime<Tz>, end: &DateTime<Tz>) -> String {
    let (start_clock, start_period) = ap_clock(start);
    let (end_clock, end_period) = ap_clock(end);
    if start_period == end_period {
        format!("{}-{} {}", start_clock, end_clock, end_period)
    } else {
        format!("{} {}-{} {}", start_clock, start_period, end_clock, end_period)
    }
}

/// Format an event start for a slide, e.g. "Wednesday, Sept. 10, 6 p.m."
pub fn format_start(instant: DateTime<Utc>, timezone: Tz) -> String {
    let local = instant.with_timezone(&timezone);
    format!("{}, {}", format_ap_date(&local), format_ap_time(&local))
}
