//! Error types for the SCIM client.

use thiserror::Error;

/// Result type alias using `ScimClientError`.
pub type ScimClientResult<T> = Result<T, ScimClientError>;

/// Errors returned when talking to a SCIM 2.0 service provider.
#[derive(Debug, Error)]
pub enum ScimClientError {
    /// Invalid client configuration.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// The API token was rejected (401/403).
    #[error("Authentication failed: {0}")]
    AuthError(String),

    /// The resource does not exist (404).
    #[error("Not found: {0}")]
    NotFound(String),

    /// The provider is throttling requests (429).
    #[error("Rate limited (retry after {retry_after_secs:?}s)")]
    RateLimited { retry_after_secs: Option<u64> },

    /// Any other non-success SCIM response.
    #[error("SCIM error (HTTP {status}): {detail}")]
    ScimError { status: u16, detail: String },

    /// The response body was not valid SCIM JSON.
    #[error("Failed to parse response: {0}")]
    ParseError(String),

    /// The request timed out.
    #[error("Request timed out: {0}")]
    Timeout(String),

    /// The service provider could not be reached.
    #[error("Target unreachable: {0}")]
    Unreachable(String),

    /// Other transport failure.
    #[error("HTTP error: {0}")]
    HttpError(String),

    /// A retried operation never succeeded.
    #[error("Max retries exceeded after {attempts} attempt(s): {message}")]
    MaxRetriesExceeded { attempts: u32, message: String },
}

impl ScimClientError {
    /// Whether the operation may succeed if repeated after a pause.
    ///
    /// Only throttling and gateway-style 5xx responses qualify; connection
    /// failures are reported straight away.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::RateLimited { .. } => true,
            Self::ScimError { status, .. } => matches!(status, 502..=504),
            _ => false,
        }
    }

    /// Whether the provider answered with a 5xx status.
    #[must_use]
    pub fn is_server_error(&self) -> bool {
        matches!(self, Self::ScimError { status, .. } if *status >= 500)
    }

    /// Whether the failure happened below HTTP (no response received).
    #[must_use]
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            Self::Timeout(_) | Self::Unreachable(_) | Self::HttpError(_) | Self::MaxRetriesExceeded { .. }
        )
    }
}

impl From<reqwest::Error> for ScimClientError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            Self::Timeout(e.to_string())
        } else if e.is_connect() {
            Self::Unreachable(e.to_string())
        } else if e.is_decode() {
            Self::ParseError(e.to_string())
        } else {
            Self::HttpError(e.to_string())
        }
    }
}

impl From<serde_json::Error> for ScimClientError {
    fn from(e: serde_json::Error) -> Self {
        Self::ParseError(e.to_string())
    }
}
