//! Jukebox error types

use std::time::Duration;

/// Jukebox error types
#[derive(Debug, Clone, thiserror::Error)]
pub enum JukeboxError {
    // Backing-call/network errors
    #[error("HTTP error: {0}")]
    Http(String),

    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("rate limited, retry after {retry_after:?}")]
    RateLimited { retry_after: Option<Duration> },

    #[error("authentication failed")]
    AuthenticationFailed,

    #[error("not found: {0}")]
    NotFound(String),

    // Configuration errors
    #[error("configuration error: {0}")]
    Configuration(String),

    // Data errors
    #[error("JSON error: {0}")]
    Json(String),

    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("image quality tier {tier} out of range ({available} available)")]
    QualityTierOutOfRange { tier: usize, available: usize },

    #[error("data error: {0}")]
    Data(String),
}

// Variants carry owned strings rather than source errors so the enum stays
// `Clone` — a failure produced under a single-flight cache population must
// be handed to every coalesced caller.
impl From<serde_json::Error> for JukeboxError {
    fn from(err: serde_json::Error) -> Self {
        JukeboxError::Json(err.to_string())
    }
}

/// Result type alias for Jukebox operations
pub type Result<T> = std::result::Result<T, JukeboxError>;
