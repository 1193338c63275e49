//! Upstream client error types.

use std::time::Duration;

/// Errors from the Open Charge Map HTTP client.
#[derive(Debug, thiserror::Error)]
pub enum OcmError {
    /// Request never completed (connect failure, timeout, ...).
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Response body was not the expected JSON.
    #[error("JSON parse error: {message}")]
    Json {
        message: String,
        body: Option<String>,
    },

    /// Upstream answered with a non-success status.
    #[error("API error {status}: {message}")]
    Api { status: u16, message: String },

    /// Every upstream slot stayed busy for the whole request timeout.
    #[error("no upstream slot free after {0:?}")]
    SlotTimeout(Duration),

    /// Upstream answered 429.
    #[error("rate limited by Open Charge Map")]
    RateLimited,

    /// No API key configured.
    #[error("not configured: {0}")]
    NotConfigured(String),
}

impl OcmError {
    /// Whether this error indicates a deployment defect rather than a
    /// transient upstream condition.
    pub fn is_configuration(&self) -> bool {
        matches!(self, OcmError::NotConfigured(_))
    }
}
