use event_radar::apis::eventbrite::EventbriteApi;
use event_radar::apis::proxy::ProxyApi;
use event_radar::apis::seatgeek::SeatGeekApi;
use event_radar::apis::ticketmaster::TicketmasterApi;
use event_radar::config::ProviderSettings;
use event_radar::error::{RadarError, MAX_ERROR_BODY_CHARS};
use event_radar::types::{EventProvider, PriceHint, SearchQuery, Source};
use httpmock::prelude::*;
use serde_json::json;

fn query() -> SearchQuery {
    SearchQuery {
        keyword: Some("jazz".into()),
        city: Some("Berlin".into()),
        country_code: Some("de".into()),
        start_date: Some("2025-06-01".into()),
        end_date: Some("2025-06-03".into()),
        ..Default::default()
    }
}

#[tokio::test]
async fn ticketmaster_sends_discovery_filters() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(GET)
                .path("/discovery/v2/events.json")
                .query_param("apikey", "tm-key")
                .query_param("size", "20")
                .query_param("sort", "date,asc")
                .query_param("keyword", "jazz")
                .query_param("city", "Berlin")
                .query_param("countryCode", "DE")
                .query_param("startDateTime", "2025-06-01T00:00:00Z")
                .query_param("endDateTime", "2025-06-03T23:59:59Z");
            then.status(200).json_body(json!({
                "_embedded": { "events": [{
                    "id": "G5v",
                    "name": "Jazz Night",
                    "url": "https://tm.test/G5v",
                    "dates": { "start": { "localDate": "2025-06-02" } },
                    "images": [{ "url": "https://img.test/1.jpg" }],
                    "priceRanges": [{ "min": 35.0 }],
                    "classifications": [{ "segment": { "name": "Music" } }],
                    "_embedded": { "venues": [{
                        "name": "A-Trane",
                        "city": { "name": "Berlin" },
                        "country": { "countryCode": "DE" }
                    }] }
                }] }
            }));
        })
        .await;

    let settings = ProviderSettings {
        ticketmaster_key: Some("tm-key".into()),
        ticketmaster_base_url: server.base_url(),
        ..Default::default()
    };
    let api = TicketmasterApi::new(reqwest::Client::new(), &settings, 20);
    let events = api.fetch(&query()).await.unwrap();

    mock.assert_async().await;
    assert_eq!(events.len(), 1);
    let ev = &events[0];
    assert_eq!(ev.id, "tm_G5v");
    assert_eq!(ev.date.as_deref(), Some("2025-06-02"));
    assert_eq!(ev.venue_name.as_deref(), Some("A-Trane"));
    assert_eq!(ev.country.as_deref(), Some("DE"));
    assert_eq!(ev.price, Some(PriceHint::Amount(35.0)));
    assert_eq!(ev.provider.as_deref(), Some("Music"));
    assert_eq!(ev.source, Source::Ticketmaster);
}

#[tokio::test]
async fn eventbrite_uses_bearer_token() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(GET)
                .path("/v3/events/search/")
                .header("authorization", "Bearer eb-token")
                .query_param("expand", "venue")
                .query_param("q", "jazz")
                .query_param("location.address", "Berlin")
                .query_param("start_date.range_start", "2025-06-01T00:00:00Z");
            then.status(200).json_body(json!({
                "events": [{
                    "id": "77",
                    "name": { "text": "Open Air" },
                    "start": { "local": "2025-06-01T18:00:00" },
                    "is_free": true,
                    "venue": { "name": "Park", "address": { "city": "Berlin", "country": "DE" } }
                }]
            }));
        })
        .await;

    let settings = ProviderSettings {
        eventbrite_token: Some("eb-token".into()),
        eventbrite_base_url: server.base_url(),
        ..Default::default()
    };
    let events = EventbriteApi::new(reqwest::Client::new(), &settings, 20)
        .fetch(&query())
        .await
        .unwrap();

    mock.assert_async().await;
    assert_eq!(events[0].id, "eb_77");
    assert_eq!(events[0].name, "Open Air");
    assert_eq!(events[0].date.as_deref(), Some("2025-06-01"));
    assert_eq!(events[0].price, Some(PriceHint::Label("free".into())));
}

#[tokio::test]
async fn seatgeek_error_carries_status_and_truncated_body() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(GET).path("/2/events").query_param("client_id", "sg-id");
            then.status(503).body("x".repeat(2_000));
        })
        .await;

    let settings = ProviderSettings {
        seatgeek_client_id: Some("sg-id".into()),
        seatgeek_base_url: server.base_url(),
        ..Default::default()
    };
    let err = SeatGeekApi::new(reqwest::Client::new(), &settings, 20)
        .fetch(&SearchQuery::default())
        .await
        .unwrap_err();

    mock.assert_async().await;
    match err {
        RadarError::Upstream { status, body, service } => {
            assert_eq!(status, 503);
            assert_eq!(service, "seatgeek");
            assert_eq!(body.chars().count(), MAX_ERROR_BODY_CHARS);
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn proxy_reads_root_array_and_fingerprints_records() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(GET).path("/kk").query_param("q", "jazz");
            then.status(200).json_body(json!([
                { "title": "Kammerkonzert", "start": "2025-07-01T19:30:00", "location": { "name": "Saal", "city": "Köln" } }
            ]));
        })
        .await;

    let api = ProxyApi::new(reqwest::Client::new(), Source::Konzertkasse, Some(server.url("/kk")));
    let q = SearchQuery { keyword: Some("jazz".into()), ..Default::default() };
    let events = api.fetch(&q).await.unwrap();

    mock.assert_async().await;
    let ev = &events[0];
    assert_eq!(ev.id, "kk_Kammerkonzert_2025-07-01_Köln");
    assert_eq!(ev.venue_name.as_deref(), Some("Saal"));
    assert_eq!(ev.country.as_deref(), Some("DE"));
}

#[tokio::test]
async fn unconfigured_adapter_makes_no_call() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.path("/discovery/v2/events.json");
            then.status(200).json_body(json!({}));
        })
        .await;

    let settings = ProviderSettings {
        ticketmaster_base_url: server.base_url(),
        ..Default::default()
    };
    let api = TicketmasterApi::new(reqwest::Client::new(), &settings, 20);
    assert!(!api.is_configured());
    assert!(api.fetch(&query()).await.unwrap().is_empty());
    assert_eq!(mock.hits_async().await, 0);
}
