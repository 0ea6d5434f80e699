//! Metrics for the aggregation and summarization phases.
//!
//! Names follow `radar_<phase>_<what>` with Prometheus suffixes. Recording
//! is a no-op until [`init_metrics`] installs a recorder, so library users
//! and tests never need to initialize anything.

use std::sync::{Once, OnceLock};
use tracing::{info, warn};

static INIT: Once = Once::new();
static HANDLE: OnceLock<metrics_exporter_prometheus::PrometheusHandle> = OnceLock::new();

/// Install the Prometheus recorder. Idempotent.
pub fn init_metrics() {
    INIT.call_once(|| {
        match metrics_exporter_prometheus::PrometheusBuilder::new().install_recorder() {
            Ok(handle) => {
                if HANDLE.set(handle).is_err() {
                    warn!("Prometheus handle already set");
                }
                register_all();
                info!("Prometheus recorder installed");
            }
            Err(e) => warn!("Failed to install Prometheus recorder: {}", e),
        }
    });
}

/// Render the current metrics in Prometheus text format.
pub fn render() -> Option<String> {
    HANDLE.get().map(|h| h.render())
}

fn register_all() {
    let _ = ::metrics::counter!("radar_providers_requests_success_total");
    let _ = ::metrics::counter!("radar_providers_requests_error_total");
    let _ = ::metrics::counter!("radar_providers_skipped_total");
    let _ = ::metrics::histogram!("radar_providers_request_duration_seconds");
    let _ = ::metrics::counter!("radar_aggregate_duplicates_dropped_total");
    let _ = ::metrics::histogram!("radar_aggregate_events");
    let _ = ::metrics::counter!("radar_summary_generated_total");
    let _ = ::metrics::counter!("radar_summary_fallback_total");
    let _ = ::metrics::counter!("radar_planner_model_attempts_total");
}

pub mod providers {
    use crate::types::Source;

    pub fn request_success(source: Source, duration_secs: f64, events: usize) {
        ::metrics::counter!("radar_providers_requests_success_total", "source" => source.as_str())
            .increment(1);
        ::metrics::histogram!("radar_providers_request_duration_seconds", "source" => source.as_str())
            .record(duration_secs);
        ::metrics::histogram!("radar_providers_events", "source" => source.as_str())
            .record(events as f64);
    }

    pub fn request_error(source: Source) {
        ::metrics::counter!("radar_providers_requests_error_total", "source" => source.as_str())
            .increment(1);
    }

    pub fn skipped(source: Source) {
        ::metrics::counter!("radar_providers_skipped_total", "source" => source.as_str())
            .increment(1);
    }
}

pub mod aggregate {
    pub fn duplicates_dropped(count: usize) {
        ::metrics::counter!("radar_aggregate_duplicates_dropped_total").increment(count as u64);
    }

    pub fn merged(count: usize) {
        ::metrics::histogram!("radar_aggregate_events").record(count as f64);
    }
}

pub mod summary {
    pub fn generated() {
        ::metrics::counter!("radar_summary_generated_total").increment(1);
    }

    /// `reason` is one of `not_configured`, `empty_digest`, `upstream_error`, `empty_completion`.
    pub fn fallback(reason: &'static str) {
        ::metrics::counter!("radar_summary_fallback_total", "reason" => reason).increment(1);
    }
}

pub mod planner {
    pub fn model_attempt(outcome: &'static str) {
        ::metrics::counter!("radar_planner_model_attempts_total", "outcome" => outcome).increment(1);
    }
}
