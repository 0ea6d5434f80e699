use crate::calendar::{render_ics, CalendarEntry};
use crate::config::Config;
use crate::error::{RadarError, Result};
use crate::observability;
use crate::pipeline::Aggregator;
use crate::summarize::normalize::DigestEvent;
use crate::summarize::{GroqClient, ItineraryPlanner, SectionAction, Summarizer};
use crate::types::{SearchQuery, Source, SummaryResult, UnifiedEvent, UserContext};
use axum::{
    body::Bytes,
    extract::{Query, State},
    http::{header, Method, StatusCode},
    response::{IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};
use hyper::Server;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::net::SocketAddr;
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

const SUMMARY_UNAVAILABLE: &str = "AI summary could not be generated.";

/// Shared handles for every route.
#[derive(Clone)]
pub struct AppState {
    pub aggregator: Arc<Aggregator>,
    pub summarizer: Arc<Summarizer>,
    pub planner: Arc<ItineraryPlanner>,
    pub summary_event_limit: usize,
}

impl AppState {
    pub fn from_config(config: &Config) -> Result<Self> {
        let client = config.http_client()?;
        let chat = Arc::new(GroqClient::new(client, &config.llm));
        Ok(Self {
            aggregator: Arc::new(Aggregator::from_config(config)?),
            summarizer: Arc::new(Summarizer::new(chat.clone())),
            planner: Arc::new(ItineraryPlanner::new(chat, &config.planner)?),
            summary_event_limit: config.summary_event_limit,
        })
    }
}

/// `providers` arrives as a JSON array or a comma-separated string.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum ProviderList {
    Many(Vec<String>),
    Csv(String),
}

impl ProviderList {
    /// A blank string means "no preference"; anything else selects exactly
    /// the known tags it names.
    fn into_sources(self) -> Option<Vec<Source>> {
        match self {
            ProviderList::Many(tags) => Some(Source::parse_list(tags.iter().map(String::as_str))),
            ProviderList::Csv(csv) if csv.trim().is_empty() => None,
            ProviderList::Csv(csv) => Some(Source::parse_list(csv.split(','))),
        }
    }
}

/// Aggregation filters, from a JSON body or the query string.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SearchParams {
    pub keyword: Option<String>,
    pub city: Option<String>,
    pub country_code: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub providers: Option<ProviderList>,
    pub tone: Option<String>,
}

impl SearchParams {
    pub fn into_query(self) -> SearchQuery {
        SearchQuery {
            keyword: self.keyword,
            city: self.city,
            country_code: self.country_code,
            start_date: self.start_date,
            end_date: self.end_date,
            providers: self.providers.and_then(ProviderList::into_sources),
            tone: self.tone,
        }
        .normalized()
    }
}

/// Query-string form; the provider list is always comma-separated here.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct SearchQueryString {
    keyword: Option<String>,
    city: Option<String>,
    country_code: Option<String>,
    start_date: Option<String>,
    end_date: Option<String>,
    providers: Option<String>,
    tone: Option<String>,
}

impl From<SearchQueryString> for SearchParams {
    fn from(q: SearchQueryString) -> Self {
        Self {
            keyword: q.keyword,
            city: q.city,
            country_code: q.country_code,
            start_date: q.start_date,
            end_date: q.end_date,
            providers: q.providers.map(ProviderList::Csv),
            tone: q.tone,
        }
    }
}

#[derive(Debug, Deserialize)]
struct SummaryRequest {
    #[serde(default)]
    events: Vec<Value>,
    #[serde(flatten)]
    context: UserContext,
}

#[derive(Debug, Deserialize)]
struct PlanRequest {
    #[serde(default)]
    itinerary: Option<Vec<Value>>,
    #[serde(flatten)]
    context: UserContext,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct SectionRequest {
    action: Option<String>,
    text: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct CalendarRequest {
    events: Vec<Value>,
}

#[derive(Debug, Serialize)]
struct EventsResponse {
    events: Vec<UnifiedEvent>,
}

#[derive(Debug, Serialize)]
struct SummaryResponse {
    summary: String,
    degraded: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl From<SummaryResult> for SummaryResponse {
    fn from(result: SummaryResult) -> Self {
        Self { summary: result.text, degraded: result.degraded, error: result.error_detail }
    }
}

#[derive(Debug, Serialize)]
struct SearchResponse {
    events: Vec<UnifiedEvent>,
    #[serde(flatten)]
    summary: SummaryResponse,
}

/// Error body `{ "error": message }`; client errors are 400, the rest 500.
struct ApiError(RadarError);

impl From<RadarError> for ApiError {
    fn from(e: RadarError) -> Self {
        ApiError(e)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = if self.0.is_client_error() {
            StatusCode::BAD_REQUEST
        } else {
            StatusCode::INTERNAL_SERVER_ERROR
        };
        let message = match self.0 {
            RadarError::InvalidRequest(m) | RadarError::NotConfigured(m) => m,
            other => other.to_string(),
        };
        if status.is_server_error() {
            warn!("request failed: {}", message);
        }
        (status, Json(json!({ "error": message }))).into_response()
    }
}

fn parse_body<T: serde::de::DeserializeOwned>(body: &Bytes) -> std::result::Result<T, ApiError> {
    serde_json::from_slice(body)
        .map_err(|e| ApiError(RadarError::InvalidRequest(format!("Malformed JSON body: {e}"))))
}

/// Health check endpoint
async fn health() -> impl IntoResponse {
    Json(json!({
        "status": "healthy",
        "service": "event_radar",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

async fn metrics_handler() -> impl IntoResponse {
    match observability::render() {
        Some(text) => (StatusCode::OK, text).into_response(),
        None => (StatusCode::SERVICE_UNAVAILABLE, "metrics recorder not installed").into_response(),
    }
}

async fn events_get(
    State(state): State<AppState>,
    Query(params): Query<SearchQueryString>,
) -> Json<EventsResponse> {
    let query = SearchParams::from(params).into_query();
    Json(EventsResponse { events: state.aggregator.aggregate(&query).await })
}

/// A body that is not valid JSON is treated as an empty filter set.
async fn events_post(State(state): State<AppState>, body: Bytes) -> Json<EventsResponse> {
    let params: SearchParams = serde_json::from_slice(&body).unwrap_or_default();
    let query = params.into_query();
    Json(EventsResponse { events: state.aggregator.aggregate(&query).await })
}

async fn search(State(state): State<AppState>, body: Bytes) -> Json<SearchResponse> {
    let params: SearchParams = serde_json::from_slice(&body).unwrap_or_default();
    let query = params.into_query();
    let events = state.aggregator.aggregate(&query).await;
    let head = &events[..events.len().min(state.summary_event_limit)];
    let result = state.summarizer.summarize(head, &query.user_context()).await;
    Json(SearchResponse { summary: result.into(), events })
}

async fn summary(State(state): State<AppState>, body: Bytes) -> Response {
    let request: SummaryRequest = match serde_json::from_slice(&body) {
        Ok(r) => r,
        Err(e) => {
            return (
                StatusCode::BAD_REQUEST,
                Json(json!({ "error": format!("Malformed JSON body: {e}"), "summary": SUMMARY_UNAVAILABLE })),
            )
                .into_response();
        }
    };
    let events: Vec<DigestEvent> = request.events.iter().map(DigestEvent::from_value).collect();
    let result = state
        .summarizer
        .summarize_digest(&events, &request.context.normalized())
        .await;
    Json(SummaryResponse::from(result)).into_response()
}

async fn plan(
    State(state): State<AppState>,
    body: Bytes,
) -> std::result::Result<Json<Value>, ApiError> {
    let request: PlanRequest = parse_body(&body)?;
    let items = request.itinerary.unwrap_or_default();
    let text = state.planner.plan(&items, &request.context.normalized()).await?;
    Ok(Json(json!({ "summary": text })))
}

async fn plan_section(
    State(state): State<AppState>,
    body: Bytes,
) -> std::result::Result<Json<Value>, ApiError> {
    let request: SectionRequest = parse_body(&body)?;
    let action = SectionAction::parse(request.action.as_deref());
    let text = state
        .planner
        .refine_section(action, request.text.as_deref().unwrap_or(""))
        .await?;
    Ok(Json(json!({ "summary": text })))
}

async fn calendar(body: Bytes) -> std::result::Result<Response, ApiError> {
    let request: CalendarRequest = parse_body(&body)?;
    let entries: Vec<CalendarEntry> = request.events.iter().map(CalendarEntry::from_value).collect();
    Ok((
        [
            (header::CONTENT_TYPE, "text/calendar; charset=utf-8"),
            (header::CONTENT_DISPOSITION, "attachment; filename=\"event-radar.ics\""),
        ],
        render_ics(&entries),
    )
        .into_response())
}

/// Create the HTTP router with all routes
pub fn create_server(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health))
        .route("/metrics", get(metrics_handler))
        .route("/api/events", get(events_get).post(events_post))
        .route("/api/search", post(search))
        .route("/api/summary", post(summary))
        .route("/api/plan", post(plan))
        .route("/api/plan/section", post(plan_section))
        .route("/api/calendar", post(calendar))
        .with_state(state)
        .layer(ServiceBuilder::new().layer(TraceLayer::new_for_http()).layer(cors))
}

/// Start the HTTP server on the specified port
pub async fn start_server(state: AppState, port: u16) -> anyhow::Result<()> {
    let app = create_server(state);
    let addr = SocketAddr::from(([0, 0, 0, 0], port));

    info!("HTTP server listening on http://localhost:{port}");
    info!("Health check: http://localhost:{port}/health");

    Server::bind(&addr).serve(app.into_make_service()).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn body_provider_list_accepts_array_or_csv() {
        let p: SearchParams =
            serde_json::from_str(r#"{"providers":["seatgeek","bogus"],"city":" Berlin "}"#).unwrap();
        let q = p.into_query();
        assert_eq!(q.providers, Some(vec![Source::Seatgeek]));
        assert_eq!(q.city.as_deref(), Some("Berlin"));

        let p: SearchParams = serde_json::from_str(r#"{"providers":"reservix, ticketmaster"}"#).unwrap();
        assert_eq!(p.into_query().providers, Some(vec![Source::Reservix, Source::Ticketmaster]));
    }

    #[test]
    fn blank_or_missing_provider_list_means_all() {
        let p: SearchParams = serde_json::from_str(r#"{"providers":"  "}"#).unwrap();
        assert_eq!(p.into_query().providers, None);
        assert_eq!(SearchParams::default().into_query().providers, None);
    }

    #[test]
    fn empty_array_selects_nothing() {
        let p: SearchParams = serde_json::from_str(r#"{"providers":[]}"#).unwrap();
        assert_eq!(p.into_query().providers, Some(vec![]));
    }
}
