//! iCalendar export for a saved itinerary.

use crate::apis::fields::first_text;
use crate::summarize::normalize::DigestEvent;
use crate::types::UnifiedEvent;
use chrono::NaiveDate;
use serde_json::Value;

const PRODID: &str = "-//Event Radar//EN";
const UID_DOMAIN: &str = "event-radar";
const UNTITLED: &str = "Untitled Event";

/// One calendar entry; everything but the UID is optional.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CalendarEntry {
    pub id: Option<String>,
    pub name: Option<String>,
    /// `YYYY-MM-DD`; anything else is treated as undated.
    pub date: Option<String>,
    pub location: String,
    pub url: Option<String>,
}

impl From<&UnifiedEvent> for CalendarEntry {
    fn from(ev: &UnifiedEvent) -> Self {
        let location = [&ev.venue_name, &ev.city, &ev.country]
            .iter()
            .filter_map(|p| p.as_deref())
            .filter(|p| !p.is_empty())
            .collect::<Vec<_>>()
            .join(", ");
        Self {
            id: Some(ev.id.clone()),
            name: Some(ev.name.clone()).filter(|n| !n.is_empty()),
            date: ev.date.clone(),
            location,
            url: ev.url.clone(),
        }
    }
}

impl CalendarEntry {
    /// Entry from a unified event or a raw provider record.
    pub fn from_value(ev: &Value) -> Self {
        let digest = DigestEvent::from_value(ev);
        Self {
            id: first_text(ev, &["id"]),
            name: first_text(ev, &["name", "title", "name.text"]),
            date: digest.date.clone(),
            location: digest.location(),
            url: digest.url,
        }
    }
}

/// Render a `VCALENDAR` document with CRLF line endings.
pub fn render_ics(entries: &[CalendarEntry]) -> String {
    let mut out = String::new();
    push_line(&mut out, "BEGIN:VCALENDAR");
    push_line(&mut out, "VERSION:2.0");
    push_line(&mut out, &format!("PRODID:{PRODID}"));
    push_line(&mut out, "CALSCALE:GREGORIAN");

    for (idx, entry) in entries.iter().enumerate() {
        push_line(&mut out, "BEGIN:VEVENT");
        let uid = match entry.id.as_deref().filter(|id| !id.is_empty()) {
            Some(id) => id.to_string(),
            None => format!("event-{}", idx + 1),
        };
        push_line(&mut out, &format!("UID:{uid}@{UID_DOMAIN}"));
        if let Some(start) = entry.date.as_deref().and_then(parse_date) {
            push_line(&mut out, &format!("DTSTART;VALUE=DATE:{}", start.format("%Y%m%d")));
            if let Some(end) = start.succ_opt() {
                push_line(&mut out, &format!("DTEND;VALUE=DATE:{}", end.format("%Y%m%d")));
            }
        }
        let name = entry.name.as_deref().unwrap_or(UNTITLED);
        push_line(&mut out, &format!("SUMMARY:{}", escape_text(name)));
        if !entry.location.is_empty() {
            push_line(&mut out, &format!("LOCATION:{}", escape_text(&entry.location)));
        }
        if let Some(url) = entry.url.as_deref().filter(|u| !u.is_empty()) {
            push_line(&mut out, &format!("DESCRIPTION:{}", escape_text(url)));
        }
        push_line(&mut out, "END:VEVENT");
    }

    push_line(&mut out, "END:VCALENDAR");
    out
}

fn push_line(out: &mut String, line: &str) {
    out.push_str(line);
    out.push_str("\r\n");
}

fn parse_date(raw: &str) -> Option<NaiveDate> {
    let head = raw.get(..10)?;
    NaiveDate::parse_from_str(head, "%Y-%m-%d").ok()
}

/// RFC 5545 TEXT escaping.
fn escape_text(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            ',' => out.push_str("\\,"),
            ';' => out.push_str("\\;"),
            '\n' => out.push_str("\\n"),
            '\r' => {}
            other => out.push(other),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Source;
    use serde_json::json;

    #[test]
    fn renders_dated_event() {
        let ev = UnifiedEvent {
            id: "tm_1".into(),
            name: "Rock; Roll, Live".into(),
            date: Some("2025-12-31".into()),
            venue_name: Some("Arena".into()),
            city: Some("Berlin".into()),
            country: None,
            url: Some("https://x.test/e".into()),
            image: None,
            source: Source::Ticketmaster,
            price: None,
            provider: None,
        };
        let ics = render_ics(&[CalendarEntry::from(&ev)]);
        assert!(ics.starts_with("BEGIN:VCALENDAR\r\nVERSION:2.0\r\n"));
        assert!(ics.contains("UID:tm_1@event-radar\r\n"));
        assert!(ics.contains("DTSTART;VALUE=DATE:20251231\r\n"));
        assert!(ics.contains("DTEND;VALUE=DATE:20260101\r\n"));
        assert!(ics.contains("SUMMARY:Rock\\; Roll\\, Live\r\n"));
        assert!(ics.contains("LOCATION:Arena\\, Berlin\r\n"));
        assert!(ics.contains("DESCRIPTION:https://x.test/e\r\n"));
        assert!(ics.ends_with("END:VEVENT\r\nEND:VCALENDAR\r\n"));
    }

    #[test]
    fn undated_raw_record_uses_defaults() {
        let entry = CalendarEntry::from_value(&json!({ "date": "soon" }));
        let ics = render_ics(&[entry]);
        assert!(ics.contains("UID:event-1@event-radar\r\n"));
        assert!(ics.contains("SUMMARY:Untitled Event\r\n"));
        assert!(!ics.contains("DTSTART"));
        assert!(!ics.contains("LOCATION"));
    }

    #[test]
    fn raw_ticketmaster_record() {
        let raw = json!({
            "id": "G5v",
            "name": "Jazz",
            "url": "https://tm.test/G5v",
            "dates": { "start": { "localDate": "2025-03-01" } },
            "_embedded": { "venues": [{ "name": "Club", "city": { "name": "Hamburg" } }] }
        });
        let ics = render_ics(&[CalendarEntry::from_value(&raw)]);
        assert!(ics.contains("UID:G5v@event-radar"));
        assert!(ics.contains("DTSTART;VALUE=DATE:20250301"));
        assert!(ics.contains("LOCATION:Club\\, Hamburg"));
    }

    #[test]
    fn empty_calendar_is_still_valid() {
        assert_eq!(
            render_ics(&[]),
            "BEGIN:VCALENDAR\r\nVERSION:2.0\r\nPRODID:-//Event Radar//EN\r\nCALSCALE:GREGORIAN\r\nEND:VCALENDAR\r\n"
        );
    }
}
