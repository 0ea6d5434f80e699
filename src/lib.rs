pub mod apis;
pub mod calendar;
pub mod config;
pub mod constants;
pub mod error;
pub mod logging;
pub mod observability;
pub mod pipeline;
pub mod server;
pub mod summarize;
pub mod types;
