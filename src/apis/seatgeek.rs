use crate::apis::base::{day_end, day_start, event_id, fetch_json, QueryParams};
use crate::apis::fields::{first, first_date, first_text, lookup};
use crate::config::ProviderSettings;
use crate::error::Result;
use crate::types::{EventProvider, PriceHint, SearchQuery, Source, UnifiedEvent};
use serde_json::Value;
use tracing::{debug, info, instrument};

const EVENTS_PATH: &str = "/2/events";

const ID: &[&str] = &["id"];
const NAME: &[&str] = &["title", "short_title"];
const DATE: &[&str] = &["datetime_local", "datetime_utc"];
const VENUE: &[&str] = &["venue.name"];
const CITY: &[&str] = &["venue.city"];
const COUNTRY: &[&str] = &["venue.country"];
const URL: &[&str] = &["url"];
const CATEGORY: &[&str] = &["type"];
const PRICE: &[&str] = &["stats.lowest_price"];

pub struct SeatGeekApi {
    client: reqwest::Client,
    client_id: Option<String>,
    base_url: String,
    page_size: u32,
}

impl SeatGeekApi {
    pub fn new(client: reqwest::Client, settings: &ProviderSettings, page_size: u32) -> Self {
        Self {
            client,
            client_id: settings.seatgeek_client_id.clone(),
            base_url: settings.seatgeek_base_url.trim_end_matches('/').to_string(),
            page_size,
        }
    }

    pub fn build_params(&self, client_id: &str, query: &SearchQuery) -> QueryParams {
        let mut p = QueryParams::new();
        p.set("client_id", client_id)
            .set("per_page", self.page_size.to_string())
            .set("sort", "datetime_utc.asc")
            .set_opt("q", query.keyword.clone())
            .set_opt("venue.city", query.city.clone())
            .set_opt("datetime_utc.gte", query.start_date.as_deref().map(day_start))
            .set_opt("datetime_utc.lte", query.end_date.as_deref().map(day_end));
        p
    }

    pub fn parse_events(data: &Value) -> Vec<UnifiedEvent> {
        lookup(data, "events")
            .and_then(Value::as_array)
            .map(|list| list.iter().map(Self::parse_event).collect())
            .unwrap_or_default()
    }

    fn parse_event(ev: &Value) -> UnifiedEvent {
        let source = Source::Seatgeek;
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
            image: performer_image(ev),
            source,
            price: first(ev, PRICE).and_then(Value::as_f64).map(PriceHint::Amount),
            provider: first_text(ev, CATEGORY),
        }
    }
}

/// SeatGeek has no event image; use the first performer that carries one.
fn performer_image(ev: &Value) -> Option<String> {
    ev.get("performers")?
        .as_array()?
        .iter()
        .find_map(|p| first_text(p, &["image"]))
}

#[async_trait::async_trait]
impl EventProvider for SeatGeekApi {
    fn source(&self) -> Source {
        Source::Seatgeek
    }

    fn is_configured(&self) -> bool {
        self.client_id.is_some()
    }

    #[instrument(skip(self, query), fields(source = "seatgeek"))]
    async fn fetch(&self, query: &SearchQuery) -> Result<Vec<UnifiedEvent>> {
        let Some(client_id) = self.client_id.as_deref() else {
            debug!("SEATGEEK_CLIENT_ID not set, skipping");
            return Ok(Vec::new());
        };
        let params = self.build_params(client_id, query);
        let request = self
            .client
            .get(format!("{}{}", self.base_url, EVENTS_PATH))
            .query(params.pairs());
        let data = fetch_json(self.source(), request).await?;
        let events = Self::parse_events(&data);
        info!("Fetched {} events from SeatGeek", events.len());
        Ok(events)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parses_numeric_ids_and_performer_images() {
        let data = json!({"events": [{
            "id": 5501234,
            "title": "Open Air Classics",
            "datetime_local": "2025-08-09T20:00:00",
            "type": "concert",
            "stats": {"lowest_price": 19},
            "venue": {"name": "Waldbühne", "city": "Berlin", "country": "DE"},
            "performers": [{"name": "A"}, {"name": "B", "image": "https://img/b.jpg"}]
        }]});
        let events = SeatGeekApi::parse_events(&data);
        let ev = &events[0];
        assert_eq!(ev.id, "sg_5501234");
        assert_eq!(ev.date.as_deref(), Some("2025-08-09"));
        assert_eq!(ev.image.as_deref(), Some("https://img/b.jpg"));
        assert_eq!(ev.provider.as_deref(), Some("concert"));
        assert_eq!(ev.price, Some(PriceHint::Amount(19.0)));
    }

    #[test]
    fn falls_back_to_utc_datetime() {
        let data = json!({"events": [{"id": 1, "title": "X", "datetime_utc": "2025-08-10T01:00:00"}]});
        assert_eq!(SeatGeekApi::parse_events(&data)[0].date.as_deref(), Some("2025-08-10"));
    }

    #[test]
    fn params_use_seatgeek_names() {
        let api = SeatGeekApi::new(reqwest::Client::new(), &ProviderSettings::default(), 20);
        let query = SearchQuery { city: Some("Berlin".into()), end_date: Some("2025-08-31".into()), ..Default::default() };
        let p = api.build_params("cid", &query);
        assert_eq!(p.get("client_id"), Some("cid"));
        assert_eq!(p.get("per_page"), Some("20"));
        assert_eq!(p.get("sort"), Some("datetime_utc.asc"));
        assert_eq!(p.get("venue.city"), Some("Berlin"));
        assert_eq!(p.get("datetime_utc.lte"), Some("2025-08-31T23:59:59Z"));
    }

    #[test]
    fn records_without_native_id_get_distinct_fingerprints() {
        let data = json!({"events": [
            {"title": "A", "datetime_local": "2025-05-01T20:00:00", "venue": {"city": "Oslo"}},
            {"title": "B", "datetime_local": "2025-05-01T20:00:00", "venue": {"city": "Oslo"}}
        ]});
        let events = SeatGeekApi::parse_events(&data);
        assert_eq!(events[0].id, "sg_A_2025-05-01_Oslo");
        assert_eq!(events[1].id, "sg_B_2025-05-01_Oslo");
        assert_ne!(events[0].id, events[1].id);
    }
}
