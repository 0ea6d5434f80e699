use crate::constants::FINGERPRINT_NAME_CHARS;
use crate::error::{truncate_chars, RadarError, Result};
use crate::types::Source;
use serde_json::Value;
use tracing::debug;

/// Query-string pairs; blank values are never sent.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct QueryParams(Vec<(&'static str, String)>);

impl QueryParams {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, key: &'static str, value: impl Into<String>) -> &mut Self {
        let value = value.into();
        if !value.trim().is_empty() {
            self.0.retain(|(k, _)| *k != key);
            self.0.push((key, value));
        }
        self
    }

    pub fn set_opt(&mut self, key: &'static str, value: Option<String>) -> &mut Self {
        if let Some(value) = value {
            self.set(key, value);
        }
        self
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.iter().find(|(k, _)| *k == key).map(|(_, v)| v.as_str())
    }

    pub fn pairs(&self) -> &[(&'static str, String)] {
        &self.0
    }
}

/// Day-start timestamp in the `YYYY-MM-DDT00:00:00Z` form the catalogs expect.
pub fn day_start(date: &str) -> String {
    format!("{date}T00:00:00Z")
}

/// Day-end timestamp in the `YYYY-MM-DDT23:59:59Z` form the catalogs expect.
pub fn day_end(date: &str) -> String {
    format!("{date}T23:59:59Z")
}

/// Send a prepared request and decode a JSON body. Non-success statuses become
/// `RadarError::Upstream` carrying the status and a truncated body.
pub async fn fetch_json(source: Source, request: reqwest::RequestBuilder) -> Result<Value> {
    let resp = request.send().await?;
    let status = resp.status();
    debug!(source = %source, status = status.as_u16(), "provider responded");
    if !status.is_success() {
        let body = resp.text().await.unwrap_or_default();
        return Err(RadarError::upstream(source.as_str(), status.as_u16(), &body));
    }
    let bytes = resp.bytes().await?;
    Ok(serde_json::from_slice(&bytes)?)
}

/// Stable id for records without a native one: `<prefix>_<name(24)>_<date>_<city>`.
pub fn fingerprint(source: Source, name: Option<&str>, date: Option<&str>, city: Option<&str>) -> String {
    format!(
        "{}_{}_{}_{}",
        source.id_prefix(),
        truncate_chars(name.unwrap_or_default(), FINGERPRINT_NAME_CHARS),
        date.unwrap_or_default(),
        city.unwrap_or_default()
    )
}

/// `<prefix>_<native id>`, or the fingerprint when the catalog sent no id.
pub fn event_id(
    source: Source,
    native: Option<String>,
    name: Option<&str>,
    date: Option<&str>,
    city: Option<&str>,
) -> String {
    match native {
        Some(native) => format!("{}_{}", source.id_prefix(), native),
        None => fingerprint(source, name, date, city),
    }
}

/// Records live either under `events` or at the root of the payload.
pub fn event_list(data: &Value) -> &[Value] {
    data.get("events")
        .and_then(Value::as_array)
        .or_else(|| data.as_array())
        .map(Vec::as_slice)
        .unwrap_or(&[])
}
