use crate::apis::base::{day_end, day_start, event_id, fetch_json, QueryParams};
use crate::apis::fields::{first_date, first_text, lookup};
use crate::config::ProviderSettings;
use crate::error::Result;
use crate::types::{EventProvider, PriceHint, SearchQuery, Source, UnifiedEvent};
use serde_json::Value;
use tracing::{debug, info, instrument};

const SEARCH_PATH: &str = "/v3/events/search/";

const ID: &[&str] = &["id"];
const NAME: &[&str] = &["name.text", "name"];
const DATE: &[&str] = &["start.local", "start.utc"];
const VENUE: &[&str] = &["venue.name"];
const CITY: &[&str] = &["venue.address.city"];
const COUNTRY: &[&str] = &["venue.address.country"];
const URL: &[&str] = &["url"];
const IMAGE: &[&str] = &["logo.url"];

pub struct EventbriteApi {
    client: reqwest::Client,
    token: Option<String>,
    base_url: String,
    page_size: u32,
}

impl EventbriteApi {
    pub fn new(client: reqwest::Client, settings: &ProviderSettings, page_size: u32) -> Self {
        Self {
            client,
            token: settings.eventbrite_token.clone(),
            base_url: settings.eventbrite_base_url.trim_end_matches('/').to_string(),
            page_size,
        }
    }

    pub fn build_params(&self, query: &SearchQuery) -> QueryParams {
        let mut p = QueryParams::new();
        p.set("expand", "venue")
            .set("page_size", self.page_size.to_string())
            .set_opt("q", query.keyword.clone())
            .set_opt("location.address", query.city.clone())
            .set_opt("start_date.range_start", query.start_date.as_deref().map(day_start))
            .set_opt("start_date.range_end", query.end_date.as_deref().map(day_end));
        p
    }

    pub fn parse_events(data: &Value) -> Vec<UnifiedEvent> {
        lookup(data, "events")
            .and_then(Value::as_array)
            .map(|list| list.iter().map(Self::parse_event).collect())
            .unwrap_or_default()
    }

    fn parse_event(ev: &Value) -> UnifiedEvent {
        let source = Source::Eventbrite;
        let is_free = ev.get("is_free").and_then(Value::as_bool).unwrap_or(false);
        let name = first_text(ev, NAME);
        let date = first_date(ev, DATE);
        let city = first_text(ev, CITY);
        UnifiedEvent {
            id: event_id(source, first_text(ev, ID), name.as_deref(), date.as_deref(), city.as_deref()),
            name: name.unwrap_or_else(|| "Event".to_string()),
            date,
            venue_name: first_text(ev, VENUE),
            city,
            country: first_text(ev, COUNTRY),
            url: first_text(ev, URL),
            image: first_text(ev, IMAGE),
            source,
            price: is_free.then(|| PriceHint::Label("free".to_string())),
            provider: None,
        }
    }
}

#[async_trait::async_trait]
impl EventProvider for EventbriteApi {
    fn source(&self) -> Source {
        Source::Eventbrite
    }

    fn is_configured(&self) -> bool {
        self.token.is_some()
    }

    #[instrument(skip(self, query), fields(source = "eventbrite"))]
    async fn fetch(&self, query: &SearchQuery) -> Result<Vec<UnifiedEvent>> {
        let Some(token) = self.token.as_deref() else {
            debug!("EVENTBRITE_TOKEN not set, skipping");
            return Ok(Vec::new());
        };
        let params = self.build_params(query);
        let request = self
            .client
            .get(format!("{}{}", self.base_url, SEARCH_PATH))
            .bearer_auth(token)
            .query(params.pairs());
        let data = fetch_json(self.source(), request).await?;
        let events = Self::parse_events(&data);
        info!("Fetched {} events from Eventbrite", events.len());
        Ok(events)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn params_use_eventbrite_names() {
        let api = EventbriteApi::new(reqwest::Client::new(), &ProviderSettings::default(), 20);
        let query = SearchQuery {
            keyword: Some("techno".into()),
            city: Some("Hamburg".into()),
            country_code: Some("de".into()),
            start_date: Some("2025-07-01".into()),
            ..Default::default()
        };
        let p = api.build_params(&query);
        assert_eq!(p.get("expand"), Some("venue"));
        assert_eq!(p.get("page_size"), Some("20"));
        assert_eq!(p.get("q"), Some("techno"));
        assert_eq!(p.get("location.address"), Some("Hamburg"));
        assert_eq!(p.get("start_date.range_start"), Some("2025-07-01T00:00:00Z"));
        assert_eq!(p.get("start_date.range_end"), None);
        // Eventbrite search has no country filter
        assert_eq!(p.get("countryCode"), None);
    }

    #[test]
    fn parses_nested_name_and_venue() {
        let data = json!({"events": [
            {
                "id": "991",
                "name": {"text": "Harbour Rave"},
                "start": {"local": "2025-07-04T22:00:00"},
                "is_free": true,
                "venue": {"name": "Pier 3", "address": {"city": "Hamburg", "country": "DE"}},
                "logo": {"url": "https://img/eb.png"}
            },
            {"id": "992", "name": {"text": ""}, "start": {}}
        ]});
        let events = EventbriteApi::parse_events(&data);
        assert_eq!(events[0].id, "eb_991");
        assert_eq!(events[0].name, "Harbour Rave");
        assert_eq!(events[0].date.as_deref(), Some("2025-07-04"));
        assert_eq!(events[0].city.as_deref(), Some("Hamburg"));
        assert_eq!(events[0].price, Some(PriceHint::Label("free".into())));
        assert_eq!(events[1].name, "Event");
        assert_eq!(events[1].date, None);
    }

    #[test]
    fn records_without_native_id_get_distinct_fingerprints() {
        let data = json!({"events": [
            {"name": {"text": "A"}, "start": {"local": "2025-05-01T20:00:00"},
             "venue": {"address": {"city": "Hamburg"}}},
            {"name": {"text": "B"}}
        ]});
        let events = EventbriteApi::parse_events(&data);
        assert_eq!(events[0].id, "eb_A_2025-05-01_Hamburg");
        assert_eq!(events[1].id, "eb_B__");
    }
}
