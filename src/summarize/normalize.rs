//! Summarizer-side view of an event.
//!
//! Summary and planning requests come from clients that may send unified
//! events or raw provider records, so every attribute is resolved through an
//! ordered path list.

use crate::apis::fields::{first, first_text, lookup, to_iso_date_maybe};
use crate::types::{PriceHint, UnifiedEvent};
use serde::Serialize;
use serde_json::Value;

const NAME: &[&str] = &["name", "title", "name.text"];
const DATE: &[&str] = &[
    "date",
    "start",
    "dates.start.dateTime",
    "dates.start.localDate",
    "start.utc",
    "start.local",
];
const VENUE: &[&str] = &["venueName", "venue.name", "_embedded.venues.0.name", "location.name"];
const CITY: &[&str] = &[
    "city",
    "venue.city",
    "_embedded.venues.0.city.name",
    "location.city",
    "venue.address.city",
];
const COUNTRY: &[&str] = &[
    "country",
    "_embedded.venues.0.country.countryCode",
    "venue.address.country",
];
const URL: &[&str] = &["url", "link", "resource_url"];
const PROVIDER: &[&str] = &["provider", "source", "classifications.0.segment.name"];
const IMAGE: &[&str] = &["image", "images.0.url", "logo.url"];

/// Fields the summarizer reads from an event.
#[derive(Debug, Clone, PartialEq)]
pub struct DigestEvent {
    pub name: String,
    pub date: Option<String>,
    pub venue_name: Option<String>,
    pub city: Option<String>,
    pub country: Option<String>,
    pub url: Option<String>,
    pub price: Option<PriceHint>,
    pub provider: Option<String>,
    pub image: Option<String>,
}

impl DigestEvent {
    pub fn from_value(ev: &Value) -> Self {
        Self {
            name: first_text(ev, NAME).unwrap_or_else(|| "Unknown event".to_string()),
            date: first_text(ev, DATE).map(|d| to_iso_date_maybe(&d)),
            venue_name: first_text(ev, VENUE),
            city: first_text(ev, CITY),
            country: first_text(ev, COUNTRY),
            url: first_text(ev, URL),
            price: price_hint(ev),
            provider: first_text(ev, PROVIDER),
            image: first_text(ev, IMAGE),
        }
    }

    /// `venue, city, country` with missing parts left out.
    pub fn location(&self) -> String {
        [&self.venue_name, &self.city, &self.country]
            .iter()
            .filter_map(|part| part.as_deref())
            .filter(|part| !part.is_empty())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

fn price_hint(ev: &Value) -> Option<PriceHint> {
    if let Some(price) = first(ev, &["price"]) {
        return match price {
            Value::Number(n) => n.as_f64().map(PriceHint::Amount),
            Value::String(s) => Some(PriceHint::Label(s.clone())),
            _ => None,
        };
    }
    if ev.get("is_free").and_then(Value::as_bool).unwrap_or(false) {
        return Some(PriceHint::Label("free".to_string()));
    }
    lookup(ev, "priceRanges.0.min")
        .and_then(Value::as_f64)
        .map(PriceHint::Amount)
}

impl From<&UnifiedEvent> for DigestEvent {
    fn from(ev: &UnifiedEvent) -> Self {
        Self {
            name: ev.name.clone(),
            date: ev.date.clone(),
            venue_name: ev.venue_name.clone(),
            city: ev.city.clone(),
            country: ev.country.clone(),
            url: ev.url.clone(),
            price: ev.price.clone(),
            provider: ev.provider.clone().or_else(|| Some(ev.source.to_string())),
            image: ev.image.clone(),
        }
    }
}

/// Token-friendly record handed to the itinerary planner.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompactEvent {
    pub id: Option<String>,
    pub name: Option<String>,
    pub date: Option<String>,
    pub venue: Option<String>,
    pub city: Option<String>,
    pub country: Option<String>,
    pub url: Option<String>,
    pub source: Option<String>,
}

impl CompactEvent {
    pub fn from_value(ev: &Value) -> Self {
        Self {
            id: first_text(ev, &["id"]),
            name: first_text(ev, NAME),
            date: first_text(ev, &["date", "dates.start.localDate"]),
            venue: first_text(ev, &["venueName", "venue", "_embedded.venues.0.name"]),
            city: first_text(ev, &["city", "_embedded.venues.0.city.name"]),
            country: first_text(
                ev,
                &["country", "_embedded.venues.0.country.name", "_embedded.venues.0.country.countryCode"],
            ),
            url: first_text(ev, &["url"]),
            source: first_text(ev, &["source"]),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn raw_ticketmaster_record_is_understood() {
        let raw = json!({
            "name": "Lollapalooza",
            "dates": {"start": {"dateTime": "2025-07-20T12:00:00Z", "localDate": "2025-07-20"}},
            "classifications": [{"segment": {"name": "Music"}}],
            "priceRanges": [{"min": 99}],
            "_embedded": {"venues": [{"name": "Olympiapark", "city": {"name": "Berlin"}, "country": {"countryCode": "DE"}}]}
        });
        let ev = DigestEvent::from_value(&raw);
        assert_eq!(ev.date.as_deref(), Some("2025-07-20"));
        assert_eq!(ev.location(), "Olympiapark, Berlin, DE");
        assert_eq!(ev.provider.as_deref(), Some("Music"));
        assert_eq!(ev.price, Some(PriceHint::Amount(99.0)));
    }

    #[test]
    fn unknown_shapes_get_defaults() {
        let ev = DigestEvent::from_value(&json!({}));
        assert_eq!(ev.name, "Unknown event");
        assert_eq!(ev.location(), "");
        assert!(ev.date.is_none());
    }

    #[test]
    fn unified_event_provider_defaults_to_source_tag() {
        let unified: UnifiedEvent = serde_json::from_value(json!({
            "id": "sg_1", "name": "X", "source": "seatgeek"
        }))
        .unwrap();
        assert_eq!(DigestEvent::from(&unified).provider.as_deref(), Some("seatgeek"));
    }

    #[test]
    fn compact_event_from_unified_shape() {
        let c = CompactEvent::from_value(&json!({
            "id": "tm_1", "name": "Show", "date": "2025-01-02", "venueName": "Hall", "city": "Wien", "source": "ticketmaster"
        }));
        assert_eq!(c.venue.as_deref(), Some("Hall"));
        assert_eq!(c.city.as_deref(), Some("Wien"));
        assert_eq!(c.country, None);
    }
}
