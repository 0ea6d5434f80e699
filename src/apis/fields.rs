//! First-present-wins field resolution over loosely shaped JSON.
//!
//! Provider schemas move fields around between API versions, so every target
//! attribute is described by an ordered list of dotted paths (`"a.b.0.c"`,
//! numeric segments index arrays). The first path that yields a present,
//! non-empty value wins; nothing here ever fails.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde_json::Value;

/// Walk a dotted path into `value`.
pub fn lookup<'a>(value: &'a Value, path: &str) -> Option<&'a Value> {
    path.split('.').try_fold(value, |node, segment| match node {
        Value::Object(map) => map.get(segment),
        Value::Array(items) => segment.parse::<usize>().ok().and_then(|i| items.get(i)),
        _ => None,
    })
}

/// `null`, `false` and blank strings count as absent.
pub fn is_present(value: &Value) -> bool {
    match value {
        Value::Null | Value::Bool(false) => false,
        Value::String(s) => !s.trim().is_empty(),
        _ => true,
    }
}

/// First present value along `paths`.
pub fn first<'a>(value: &'a Value, paths: &[&str]) -> Option<&'a Value> {
    paths
        .iter()
        .filter_map(|path| lookup(value, path))
        .find(|v| is_present(v))
}

/// First present scalar along `paths`, rendered as text. Numbers are accepted
/// because several catalogs emit numeric ids.
pub fn first_text(value: &Value, paths: &[&str]) -> Option<String> {
    paths
        .iter()
        .filter_map(|path| lookup(value, path))
        .filter(|v| is_present(v))
        .find_map(scalar_text)
}

fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// First path whose value starts with a `YYYY-MM-DD` calendar date.
pub fn first_date(value: &Value, paths: &[&str]) -> Option<String> {
    paths
        .iter()
        .filter_map(|path| lookup(value, path))
        .filter_map(Value::as_str)
        .find_map(iso_date)
}

/// Keep the leading calendar date of an ISO timestamp, if it is a real date.
pub fn iso_date(raw: &str) -> Option<String> {
    let head: String = raw.trim().chars().take(10).collect();
    NaiveDate::parse_from_str(&head, "%Y-%m-%d")
        .ok()
        .map(|d| d.format("%Y-%m-%d").to_string())
}

/// Lenient date conversion used for client-supplied events: offsets are
/// converted to UTC, plain datetimes keep their calendar day, anything
/// unparseable is passed through untouched.
pub fn to_iso_date_maybe(raw: &str) -> String {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return dt.with_timezone(&Utc).format("%Y-%m-%d").to_string();
    }
    for fmt in ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(raw, fmt) {
            return dt.date().format("%Y-%m-%d").to_string();
        }
    }
    iso_date(raw).unwrap_or_else(|| raw.to_string())
}
