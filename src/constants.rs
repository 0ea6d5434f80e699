/// Provider tags. These are the values accepted in the `providers` filter and
/// carried in `UnifiedEvent::source`.
pub const TICKETMASTER_API: &str = "ticketmaster";
pub const EVENTBRITE_API: &str = "eventbrite";
pub const SEATGEEK_API: &str = "seatgeek";
pub const KONZERTKASSE_API: &str = "konzertkasse";
pub const RESERVIX_API: &str = "reservix";

// Public API endpoints (overridable through config for proxies and tests)
pub const TICKETMASTER_BASE_URL: &str = "https://app.ticketmaster.com";
pub const EVENTBRITE_BASE_URL: &str = "https://www.eventbriteapi.com";
pub const SEATGEEK_BASE_URL: &str = "https://api.seatgeek.com";
pub const GROQ_BASE_URL: &str = "https://api.groq.com/openai/v1";

// Environment variable names
pub const ENV_TM_API_KEY: &str = "TM_API_KEY";
pub const ENV_EVENTBRITE_TOKEN: &str = "EVENTBRITE_TOKEN";
pub const ENV_SEATGEEK_CLIENT_ID: &str = "SEATGEEK_CLIENT_ID";
pub const ENV_KONZERTKASSE_PROXY_URL: &str = "KONZERTKASSE_PROXY_URL";
pub const ENV_RESERVIX_PROXY_URL: &str = "RESERVIX_PROXY_URL";
pub const ENV_GROQ_API_KEY: &str = "GROQ_API_KEY";
pub const ENV_GROQ_MODEL: &str = "GROQ_MODEL";
pub const ENV_TM_BASE_URL: &str = "TM_BASE_URL";
pub const ENV_EVENTBRITE_BASE_URL: &str = "EVENTBRITE_BASE_URL";
pub const ENV_SEATGEEK_BASE_URL: &str = "SEATGEEK_BASE_URL";
pub const ENV_GROQ_BASE_URL: &str = "GROQ_BASE_URL";
pub const ENV_CONFIG_PATH: &str = "EVENT_RADAR_CONFIG";

pub const DEFAULT_CONFIG_FILE: &str = "config.toml";
pub const DEFAULT_MODEL: &str = "llama-3.1-8b-instant";
pub const DEFAULT_FALLBACK_MODELS: [&str; 3] = [
    "llama-3.1-8b-instant",
    "mixtral-8x7b-32768",
    "llama-3.2-90b-text-preview",
];
pub const DEFAULT_RETRYABLE_MODEL_ERRORS: [&str; 4] = [
    "model_decommissioned",
    "deprecations",
    "invalid_model",
    "unsupported",
];

pub const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 15;
pub const DEFAULT_PAGE_SIZE: u32 = 20;
pub const DEFAULT_SUMMARY_EVENT_LIMIT: usize = 10;

/// Proxy providers serve German catalogs; records without a country get this one.
pub const PROXY_DEFAULT_COUNTRY: &str = "DE";
/// Name prefix length used when a proxy record has no native id.
pub const FINGERPRINT_NAME_CHARS: usize = 24;
