use crate::apis::base::{event_id, event_list, fetch_json, QueryParams};
use crate::apis::fields::{first_date, first_text};
use crate::constants::PROXY_DEFAULT_COUNTRY;
use crate::error::Result;
use crate::types::{EventProvider, SearchQuery, Source, UnifiedEvent};
use serde_json::Value;
use tracing::{debug, info, instrument};

const ID: &[&str] = &["id"];
const NAME: &[&str] = &["name", "title"];
const DATE: &[&str] = &["date", "start"];
const VENUE: &[&str] = &["venueName", "venue", "location.name"];
const CITY: &[&str] = &["city", "location.city"];
const COUNTRY: &[&str] = &["country"];
const URL: &[&str] = &["url"];
const IMAGE: &[&str] = &["image"];

/// Catalog reached through a server-side proxy that already returns
/// near-unified JSON (Konzertkasse, Reservix).
pub struct ProxyApi {
    client: reqwest::Client,
    source: Source,
    proxy_url: Option<String>,
}

impl ProxyApi {
    pub fn new(client: reqwest::Client, source: Source, proxy_url: Option<String>) -> Self {
        Self { client, source, proxy_url }
    }

    pub fn build_params(query: &SearchQuery) -> QueryParams {
        let mut p = QueryParams::new();
        p.set_opt("q", query.keyword.clone())
            .set_opt("city", query.city.clone())
            .set_opt("start", query.start_date.clone())
            .set_opt("end", query.end_date.clone());
        p
    }

    pub fn parse_events(source: Source, data: &Value) -> Vec<UnifiedEvent> {
        event_list(data)
            .iter()
            .map(|ev| Self::parse_event(source, ev))
            .collect()
    }

    fn parse_event(source: Source, ev: &Value) -> UnifiedEvent {
        let name = first_text(ev, NAME);
        let date = first_date(ev, DATE);
        let city = first_text(ev, CITY);
        let id = event_id(source, first_text(ev, ID), name.as_deref(), date.as_deref(), city.as_deref());
        UnifiedEvent {
            id,
            name: name.unwrap_or_else(|| "Event".to_string()),
            date,
            venue_name: first_text(ev, VENUE),
            city,
            country: first_text(ev, COUNTRY).or_else(|| Some(PROXY_DEFAULT_COUNTRY.to_string())),
            url: first_text(ev, URL),
            image: first_text(ev, IMAGE),
            source,
            price: None,
            provider: None,
        }
    }
}

#[async_trait::async_trait]
impl EventProvider for ProxyApi {
    fn source(&self) -> Source {
        self.source
    }

    fn is_configured(&self) -> bool {
        self.proxy_url.is_some()
    }

    #[instrument(skip(self, query), fields(source = %self.source))]
    async fn fetch(&self, query: &SearchQuery) -> Result<Vec<UnifiedEvent>> {
        let Some(proxy_url) = self.proxy_url.as_deref() else {
            debug!("No proxy URL for {}, skipping", self.source);
            return Ok(Vec::new());
        };
        let params = Self::build_params(query);
        let request = self.client.get(proxy_url).query(params.pairs());
        let data = fetch_json(self.source, request).await?;
        let events = Self::parse_events(self.source, &data);
        info!("Fetched {} events from {}", events.len(), self.source);
        Ok(events)
    }
}
