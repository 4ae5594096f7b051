//! Error types for the Entra ID directory client.

use thiserror::Error;

/// Result type alias using `EntraError`.
pub type EntraResult<T> = Result<T, EntraError>;

/// Errors that can occur when reading a group from Entra ID.
#[derive(Debug, Error)]
pub enum EntraError {
    /// Configuration validation error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// `OAuth2` token acquisition failed.
    #[error("Authentication error: {0}")]
    Auth(String),

    /// Microsoft Graph API error.
    #[error("Graph API error: {code} - {message}")]
    GraphApi {
        code: String,
        message: String,
        inner_error: Option<String>,
    },

    /// HTTP transport error.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON parsing error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// URL parsing error.
    #[error("URL error: {0}")]
    Url(#[from] url::ParseError),

    /// More than one group carries the requested display name.
    #[error("Group name '{name}' is ambiguous: {count} groups match")]
    AmbiguousGroup { name: String, count: usize },

    /// Maximum retry attempts exceeded.
    #[error("Maximum retries ({attempts}) exceeded")]
    MaxRetriesExceeded { attempts: u32 },
}

impl EntraError {
    /// Whether this error came from the token endpoint rather than Graph.
    #[must_use]
    pub fn is_auth(&self) -> bool {
        matches!(self, Self::Auth(_))
    }

    /// Whether this error is a network-level failure.
    #[must_use]
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Http(_) | Self::MaxRetriesExceeded { .. })
    }
}
