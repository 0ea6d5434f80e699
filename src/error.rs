use thiserror::Error;

/// Upstream bodies are cut to this many characters before they are carried in an error.
pub const MAX_ERROR_BODY_CHARS: usize = 500;

#[derive(Error, Debug)]
pub enum RadarError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON deserialization failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML deserialization failed: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("{service} {status}: {body}")]
    Upstream {
        service: String,
        status: u16,
        body: String,
    },

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Not configured: {0}")]
    NotConfigured(String),

    #[error("All models failed ({}): {last_error}", attempted.join(", "))]
    ModelsExhausted {
        attempted: Vec<String>,
        last_error: String,
    },
}

impl RadarError {
    /// Build an upstream failure, truncating the response body for diagnostics.
    pub fn upstream(service: impl Into<String>, status: u16, body: &str) -> Self {
        RadarError::Upstream {
            service: service.into(),
            status,
            body: truncate_chars(body, MAX_ERROR_BODY_CHARS),
        }
    }

    pub fn is_client_error(&self) -> bool {
        matches!(self, RadarError::InvalidRequest(_))
    }
}

/// Char-boundary safe prefix of `s`.
pub fn truncate_chars(s: &str, max: usize) -> String {
    match s.char_indices().nth(max) {
        Some((idx, _)) => s[..idx].to_string(),
        None => s.to_string(),
    }
}

pub type Result<T> = std::result::Result<T, RadarError>;
