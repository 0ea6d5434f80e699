use crate::apis::create_all;
use crate::config::{Config, DedupSettings};
use crate::error::{RadarError, Result};
use crate::observability::metrics;
use crate::types::{EventProvider, SearchQuery, Source, UnifiedEvent};
use futures::future::join_all;
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, instrument, warn};

/// What one adapter contributed to a fan-out.
#[derive(Debug)]
pub enum AdapterOutcome {
    Fetched {
        source: Source,
        events: Vec<UnifiedEvent>,
    },
    /// No credential / proxy URL; no call was made.
    Skipped { source: Source },
    Failed { source: Source, error: RadarError },
}

impl AdapterOutcome {
    pub fn source(&self) -> Source {
        match self {
            AdapterOutcome::Fetched { source, .. }
            | AdapterOutcome::Skipped { source }
            | AdapterOutcome::Failed { source, .. } => *source,
        }
    }

    /// Events from a successful adapter; failed and skipped adapters give nothing.
    pub fn into_events(self) -> Vec<UnifiedEvent> {
        match self {
            AdapterOutcome::Fetched { events, .. } => events,
            _ => Vec::new(),
        }
    }
}

/// Fans a query out to the catalog adapters and merges what comes back.
pub struct Aggregator {
    providers: Vec<Arc<dyn EventProvider>>,
    dedup: DedupSettings,
}

impl Aggregator {
    /// `providers` order is the enumeration order; it decides which record
    /// survives when two catalogs list the same event.
    pub fn new(providers: Vec<Arc<dyn EventProvider>>, dedup: DedupSettings) -> Self {
        Self { providers, dedup }
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        let client = config.http_client()?;
        Ok(Self::new(create_all(config, client), config.dedup))
    }

    /// Adapters selected by the query, in enumeration order.
    pub fn active_providers(&self, query: &SearchQuery) -> Vec<Arc<dyn EventProvider>> {
        self.providers
            .iter()
            .filter(|p| query.wants(p.source()))
            .cloned()
            .collect()
    }

    /// Call every active adapter concurrently and let each one settle on its
    /// own. Outcomes come back in enumeration order, not completion order.
    pub async fn fan_out(&self, query: &SearchQuery) -> Vec<AdapterOutcome> {
        let active = self.active_providers(query);
        join_all(active.iter().map(|provider| run_provider(provider.as_ref(), query))).await
    }

    /// Fan out, flatten, dedup and sort. Never fails: with every adapter down
    /// the result is simply empty.
    #[instrument(skip(self, query), fields(keyword = ?query.keyword, city = ?query.city))]
    pub async fn aggregate(&self, query: &SearchQuery) -> Vec<UnifiedEvent> {
        let outcomes = self.fan_out(query).await;
        let merged: Vec<UnifiedEvent> = outcomes
            .into_iter()
            .flat_map(AdapterOutcome::into_events)
            .collect();
        let total = merged.len();
        let mut events = dedup_events(merged, self.dedup);
        let dropped = total - events.len();
        if dropped > 0 {
            debug!("Dropped {} duplicate events", dropped);
            metrics::aggregate::duplicates_dropped(dropped);
        }
        sort_by_date(&mut events);
        metrics::aggregate::merged(events.len());
        info!("Aggregated {} events ({} before dedup)", events.len(), total);
        events
    }
}

async fn run_provider(provider: &dyn EventProvider, query: &SearchQuery) -> AdapterOutcome {
    let source = provider.source();
    if !provider.is_configured() {
        debug!(source = %source, "provider not configured");
        metrics::providers::skipped(source);
        return AdapterOutcome::Skipped { source };
    }
    let started = Instant::now();
    match provider.fetch(query).await {
        Ok(events) => {
            metrics::providers::request_success(
                source,
                started.elapsed().as_secs_f64(),
                events.len(),
            );
            AdapterOutcome::Fetched { source, events }
        }
        Err(error) => {
            warn!(source = %source, "provider failed: {}", error);
            metrics::providers::request_error(source);
            AdapterOutcome::Failed { source, error }
        }
    }
}

/// Composite `(name, date, city)` key. Case folding and whitespace collapsing
/// are controlled by `settings`.
pub fn dedup_key(event: &UnifiedEvent, settings: DedupSettings) -> (String, String, String) {
    let norm = |s: &str| {
        let s = if settings.collapse_whitespace {
            s.split_whitespace().collect::<Vec<_>>().join(" ")
        } else {
            s.to_string()
        };
        if settings.fold_case {
            s.to_lowercase()
        } else {
            s
        }
    };
    (
        norm(&event.name),
        event.date.clone().unwrap_or_default(),
        norm(event.city.as_deref().unwrap_or("")),
    )
}

/// Keep the first record per dedup key, preserving input order.
pub fn dedup_events(events: Vec<UnifiedEvent>, settings: DedupSettings) -> Vec<UnifiedEvent> {
    let mut seen = HashSet::new();
    events
        .into_iter()
        .filter(|ev| seen.insert(dedup_key(ev, settings)))
        .collect()
}

/// Stable ascending sort on the ISO date string; undated events come first.
pub fn sort_by_date(events: &mut [UnifiedEvent]) {
    events.sort_by(|a, b| {
        a.date
            .as_deref()
            .unwrap_or("")
            .cmp(b.date.as_deref().unwrap_or(""))
    });
}
