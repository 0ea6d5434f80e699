use crate::constants::*;
use crate::error::{RadarError, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info};

/// Credentials and endpoints per catalog. A `None` credential means the
/// adapter is "not configured" and is skipped without a network call.
#[derive(Debug, Clone)]
pub struct ProviderSettings {
    pub ticketmaster_key: Option<String>,
    pub ticketmaster_base_url: String,
    pub eventbrite_token: Option<String>,
    pub eventbrite_base_url: String,
    pub seatgeek_client_id: Option<String>,
    pub seatgeek_base_url: String,
    pub konzertkasse_proxy_url: Option<String>,
    pub reservix_proxy_url: Option<String>,
}

impl Default for ProviderSettings {
    fn default() -> Self {
        Self {
            ticketmaster_key: None,
            ticketmaster_base_url: TICKETMASTER_BASE_URL.to_string(),
            eventbrite_token: None,
            eventbrite_base_url: EVENTBRITE_BASE_URL.to_string(),
            seatgeek_client_id: None,
            seatgeek_base_url: SEATGEEK_BASE_URL.to_string(),
            konzertkasse_proxy_url: None,
            reservix_proxy_url: None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct LlmSettings {
    pub api_key: Option<String>,
    pub model: String,
    pub base_url: String,
}

impl Default for LlmSettings {
    fn default() -> Self {
        Self {
            api_key: None,
            model: DEFAULT_MODEL.to_string(),
            base_url: GROQ_BASE_URL.to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct PlannerSettings {
    /// Tried in order after the configured model is rejected as unavailable.
    pub fallback_models: Vec<String>,
    /// Case-insensitive regex patterns that mark an error as "model unavailable".
    pub retryable_model_errors: Vec<String>,
}

impl Default for PlannerSettings {
    fn default() -> Self {
        Self {
            fallback_models: DEFAULT_FALLBACK_MODELS.iter().map(|m| m.to_string()).collect(),
            retryable_model_errors: DEFAULT_RETRYABLE_MODEL_ERRORS
                .iter()
                .map(|p| p.to_string())
                .collect(),
        }
    }
}

/// Strictness of the (name, date, city) duplicate key.
#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct DedupSettings {
    pub fold_case: bool,
    pub collapse_whitespace: bool,
}

impl Default for DedupSettings {
    fn default() -> Self {
        Self { fold_case: true, collapse_whitespace: false }
    }
}

/// Tunables read from the optional TOML file.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
struct FileConfig {
    http_timeout_secs: u64,
    page_size: u32,
    summary_event_limit: usize,
    planner: PlannerSettings,
    dedup: DedupSettings,
}

impl Default for FileConfig {
    fn default() -> Self {
        Self {
            http_timeout_secs: DEFAULT_HTTP_TIMEOUT_SECS,
            page_size: DEFAULT_PAGE_SIZE,
            summary_event_limit: DEFAULT_SUMMARY_EVENT_LIMIT,
            planner: PlannerSettings::default(),
            dedup: DedupSettings::default(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub providers: ProviderSettings,
    pub llm: LlmSettings,
    pub http_timeout_secs: u64,
    pub page_size: u32,
    pub summary_event_limit: usize,
    pub planner: PlannerSettings,
    pub dedup: DedupSettings,
}

impl Default for Config {
    fn default() -> Self {
        Self::from_parts(FileConfig::default(), ProviderSettings::default(), LlmSettings::default())
    }
}

impl Config {
    /// Load tunables from `EVENT_RADAR_CONFIG` (or `config.toml` when present)
    /// and secrets from the environment.
    pub fn load() -> Result<Self> {
        let path = std::env::var(ENV_CONFIG_PATH)
            .ok()
            .map(PathBuf::from)
            .or_else(|| {
                let default = PathBuf::from(DEFAULT_CONFIG_FILE);
                default.exists().then_some(default)
            });
        Self::load_from(path.as_deref())
    }

    pub fn load_from(path: Option<&Path>) -> Result<Self> {
        let file = match path {
            Some(path) => {
                let content = fs::read_to_string(path).map_err(|e| {
                    RadarError::Config(format!(
                        "Failed to read config file '{}': {}",
                        path.display(),
                        e
                    ))
                })?;
                info!("Loaded tunables from {}", path.display());
                toml::from_str(&content)?
            }
            None => {
                debug!("No config file, using defaults");
                FileConfig::default()
            }
        };
        Ok(Self::from_parts(file, ProviderSettings::from_env(), LlmSettings::from_env()))
    }

    /// Tunables from a TOML string, no environment lookups.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let file: FileConfig = toml::from_str(content)?;
        Ok(Self::from_parts(file, ProviderSettings::default(), LlmSettings::default()))
    }

    fn from_parts(file: FileConfig, providers: ProviderSettings, llm: LlmSettings) -> Self {
        Self {
            providers,
            llm,
            http_timeout_secs: file.http_timeout_secs,
            page_size: file.page_size,
            summary_event_limit: file.summary_event_limit,
            planner: file.planner,
            dedup: file.dedup,
        }
    }

    pub fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.http_timeout_secs)
    }

    /// Shared HTTP client; every outbound call is bounded by the configured timeout.
    pub fn http_client(&self) -> Result<reqwest::Client> {
        Ok(reqwest::Client::builder()
            .timeout(self.http_timeout())
            .user_agent(concat!("event_radar/", env!("CARGO_PKG_VERSION")))
            .build()?)
    }
}

impl ProviderSettings {
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            ticketmaster_key: env_value(ENV_TM_API_KEY),
            ticketmaster_base_url: env_value(ENV_TM_BASE_URL)
                .unwrap_or(defaults.ticketmaster_base_url),
            eventbrite_token: env_value(ENV_EVENTBRITE_TOKEN),
            eventbrite_base_url: env_value(ENV_EVENTBRITE_BASE_URL)
                .unwrap_or(defaults.eventbrite_base_url),
            seatgeek_client_id: env_value(ENV_SEATGEEK_CLIENT_ID),
            seatgeek_base_url: env_value(ENV_SEATGEEK_BASE_URL)
                .unwrap_or(defaults.seatgeek_base_url),
            konzertkasse_proxy_url: env_value(ENV_KONZERTKASSE_PROXY_URL),
            reservix_proxy_url: env_value(ENV_RESERVIX_PROXY_URL),
        }
    }
}

impl LlmSettings {
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            api_key: env_value(ENV_GROQ_API_KEY),
            model: env_value(ENV_GROQ_MODEL).unwrap_or(defaults.model),
            base_url: env_value(ENV_GROQ_BASE_URL).unwrap_or(defaults.base_url),
        }
    }
}

fn env_value(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_values() {
        let config = Config::default();
        assert_eq!(config.page_size, 20);
        assert_eq!(config.summary_event_limit, 10);
        assert_eq!(config.llm.model, "llama-3.1-8b-instant");
        assert_eq!(config.planner.fallback_models.len(), 3);
        assert!(config.dedup.fold_case);
        assert!(config.providers.ticketmaster_key.is_none());
    }

    #[test]
    fn partial_toml_keeps_defaults() {
        let config = Config::from_toml_str(
            r#"
            page_size = 5

            [planner]
            fallback_models = ["a", "b"]
            "#,
        )
        .unwrap();
        assert_eq!(config.page_size, 5);
        assert_eq!(config.http_timeout_secs, 15);
        assert_eq!(config.planner.fallback_models, vec!["a", "b"]);
        assert_eq!(config.planner.retryable_model_errors.len(), 4);
    }

    #[test]
    fn malformed_toml_is_an_error() {
        assert!(matches!(
            Config::from_toml_str("page_size = \"many\""),
            Err(RadarError::Toml(_))
        ));
    }
}
