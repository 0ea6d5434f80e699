use crate::apis::base::{day_end, day_start, event_id, fetch_json, QueryParams};
use crate::apis::fields::{first, first_date, first_text, lookup};
use crate::config::ProviderSettings;
use crate::error::Result;
use crate::types::{EventProvider, PriceHint, SearchQuery, Source, UnifiedEvent};
use serde_json::Value;
use tracing::{debug, info, instrument};

const EVENTS_PATH: &str = "/discovery/v2/events.json";

const ID: &[&str] = &["id"];
const NAME: &[&str] = &["name"];
const DATE: &[&str] = &["dates.start.localDate", "dates.start.dateTime"];
const VENUE: &[&str] = &["_embedded.venues.0.name"];
const CITY: &[&str] = &["_embedded.venues.0.city.name"];
const COUNTRY: &[&str] = &["_embedded.venues.0.country.name", "_embedded.venues.0.country.countryCode"];
const URL: &[&str] = &["url"];
const IMAGE: &[&str] = &["images.0.url"];
const CATEGORY: &[&str] = &["classifications.0.segment.name"];
const PRICE: &[&str] = &["priceRanges.0.min"];

/// Ticketmaster Discovery API v2.
pub struct TicketmasterApi {
    client: reqwest::Client,
    api_key: Option<String>,
    base_url: String,
    page_size: u32,
}

impl TicketmasterApi {
    pub fn new(client: reqwest::Client, settings: &ProviderSettings, page_size: u32) -> Self {
        Self {
            client,
            api_key: settings.ticketmaster_key.clone(),
            base_url: settings.ticketmaster_base_url.trim_end_matches('/').to_string(),
            page_size,
        }
    }

    pub fn build_params(&self, api_key: &str, query: &SearchQuery) -> QueryParams {
        let mut p = QueryParams::new();
        p.set("apikey", api_key)
            .set("size", self.page_size.to_string())
            .set("sort", "date,asc")
            .set_opt("keyword", query.keyword.clone())
            .set_opt("city", query.city.clone())
            .set_opt("countryCode", query.country_code.as_ref().map(|c| c.to_uppercase()))
            .set_opt("startDateTime", query.start_date.as_deref().map(day_start))
            .set_opt("endDateTime", query.end_date.as_deref().map(day_end));
        p
    }

    /// Map a Discovery API response body into unified events.
    pub fn parse_events(data: &Value) -> Vec<UnifiedEvent> {
        lookup(data, "_embedded.events")
            .and_then(Value::as_array)
            .map(|list| list.iter().map(Self::parse_event).collect())
            .unwrap_or_default()
    }

    fn parse_event(ev: &Value) -> UnifiedEvent {
        let source = Source::Ticketmaster;
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
            price: first(ev, PRICE).and_then(Value::as_f64).map(PriceHint::Amount),
            provider: first_text(ev, CATEGORY),
        }
    }
}

#[async_trait::async_trait]
impl EventProvider for TicketmasterApi {
    fn source(&self) -> Source {
        Source::Ticketmaster
    }

    fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }

    #[instrument(skip(self, query), fields(source = "ticketmaster"))]
    async fn fetch(&self, query: &SearchQuery) -> Result<Vec<UnifiedEvent>> {
        let Some(api_key) = self.api_key.as_deref() else {
            debug!("TM_API_KEY not set, skipping");
            return Ok(Vec::new());
        };
        let params = self.build_params(api_key, query);
        let request = self
            .client
            .get(format!("{}{}", self.base_url, EVENTS_PATH))
            .query(params.pairs());
        let data = fetch_json(self.source(), request).await?;
        let events = Self::parse_events(&data);
        info!("Fetched {} events from Ticketmaster", events.len());
        Ok(events)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn api() -> TicketmasterApi {
        TicketmasterApi::new(reqwest::Client::new(), &ProviderSettings::default(), 20)
    }

    #[test]
    fn params_follow_discovery_conventions() {
        let query = SearchQuery {
            keyword: Some("jazz".into()),
            city: Some("Berlin".into()),
            country_code: Some("de".into()),
            start_date: Some("2025-06-01".into()),
            end_date: Some("2025-06-03".into()),
            ..Default::default()
        };
        let p = api().build_params("k", &query);
        assert_eq!(p.get("apikey"), Some("k"));
        assert_eq!(p.get("size"), Some("20"));
        assert_eq!(p.get("sort"), Some("date,asc"));
        assert_eq!(p.get("countryCode"), Some("DE"));
        assert_eq!(p.get("startDateTime"), Some("2025-06-01T00:00:00Z"));
        assert_eq!(p.get("endDateTime"), Some("2025-06-03T23:59:59Z"));
    }

    #[test]
    fn parses_embedded_events() {
        let data = json!({
            "_embedded": {"events": [{
                "id": "G5v",
                "name": "Berlin Jazz Night",
                "url": "https://tm.example/e/G5v",
                "dates": {"start": {"localDate": "2025-06-02"}},
                "images": [{"url": "https://img/1.jpg"}],
                "classifications": [{"segment": {"name": "Music"}}],
                "priceRanges": [{"min": 35.0}],
                "_embedded": {"venues": [{
                    "name": "A-Trane",
                    "city": {"name": "Berlin"},
                    "country": {"countryCode": "DE"}
                }]}
            }]}
        });
        let events = TicketmasterApi::parse_events(&data);
        assert_eq!(events.len(), 1);
        let ev = &events[0];
        assert_eq!(ev.id, "tm_G5v");
        assert_eq!(ev.date.as_deref(), Some("2025-06-02"));
        assert_eq!(ev.venue_name.as_deref(), Some("A-Trane"));
        assert_eq!(ev.city.as_deref(), Some("Berlin"));
        assert_eq!(ev.country.as_deref(), Some("DE"));
        assert_eq!(ev.provider.as_deref(), Some("Music"));
        assert_eq!(ev.price, Some(PriceHint::Amount(35.0)));
    }

    #[test]
    fn missing_embedded_block_is_empty() {
        assert!(TicketmasterApi::parse_events(&json!({"page": {"totalElements": 0}})).is_empty());
    }

    #[test]
    fn records_without_native_id_get_distinct_fingerprints() {
        let data = json!({"_embedded": {"events": [
            {"name": "A", "dates": {"start": {"localDate": "2025-05-01"}},
             "_embedded": {"venues": [{"city": {"name": "Berlin"}}]}},
            {"name": "B", "dates": {"start": {"localDate": "2025-05-01"}},
             "_embedded": {"venues": [{"city": {"name": "Berlin"}}]}}
        ]}});
        let events = TicketmasterApi::parse_events(&data);
        assert_eq!(events[0].id, "tm_A_2025-05-01_Berlin");
        assert_eq!(events[1].id, "tm_B_2025-05-01_Berlin");
    }
}
