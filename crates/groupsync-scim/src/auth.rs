//! SCIM target authentication: Netskope API token header or Bearer token.

use reqwest::RequestBuilder;
use secrecy::{ExposeSecret, SecretString};

/// Header Netskope expects the REST API v2 token in.
pub const NETSKOPE_TOKEN_HEADER: &str = "Netskope-api-token";

/// Credentials for a SCIM target.
///
/// The [`Debug`] impl redacts tokens to prevent accidental credential
/// exposure in log output.
#[derive(Clone)]
pub enum ScimCredentials {
    /// `Authorization: Bearer <token>`.
    Bearer { token: SecretString },

    /// Token sent in a custom header (Netskope uses `Netskope-api-token`).
    ApiTokenHeader { header: String, token: SecretString },
}

impl ScimCredentials {
    /// Netskope tenant API token.
    #[must_use]
    pub fn netskope(token: SecretString) -> Self {
        Self::ApiTokenHeader {
            header: NETSKOPE_TOKEN_HEADER.to_string(),
            token,
        }
    }
}

impl std::fmt::Debug for ScimCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Bearer { .. } => f
                .debug_struct("Bearer")
                .field("token", &"[REDACTED]")
                .finish(),
            Self::ApiTokenHeader { header, .. } => f
                .debug_struct("ApiTokenHeader")
                .field("header", header)
                .field("token", &"[REDACTED]")
                .finish(),
        }
    }
}

/// Authentication handler for SCIM targets.
#[derive(Debug, Clone)]
pub struct ScimAuth {
    credentials: ScimCredentials,
}

impl ScimAuth {
    #[must_use]
    pub fn new(credentials: ScimCredentials) -> Self {
        Self { credentials }
    }

    /// Apply authentication to a request builder.
    #[must_use]
    pub fn apply(&self, builder: RequestBuilder) -> RequestBuilder {
        match &self.credentials {
            ScimCredentials::Bearer { token } => builder.bearer_auth(token.expose_secret()),
            ScimCredentials::ApiTokenHeader { header, token } => {
                builder.header(header.as_str(), token.expose_secret())
            }
        }
    }
}
