// Aggregation stage: fan-out to the catalogs, settle, dedup, sort

pub mod aggregate;

pub use aggregate::{dedup_events, dedup_key, sort_by_date, AdapterOutcome, Aggregator};
