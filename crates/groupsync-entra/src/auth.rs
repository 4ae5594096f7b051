//! OAuth2 authentication for Microsoft Graph API.

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use tokio::sync::RwLock;
use tracing::{debug, info, instrument};

use crate::{EntraCloudEnvironment, EntraCredentials, EntraError, EntraResult};

/// Source of bearer tokens for Graph requests.
///
/// The directory client never talks to the token endpoint itself; it asks a
/// provider for a token before every request.
#[async_trait]
pub trait TokenProvider: Send + Sync + std::fmt::Debug {
    /// Returns a valid access token.
    async fn get_token(&self) -> EntraResult<SecretString>;

    /// Drops any cached token so the next call fetches a fresh one.
    async fn invalidate(&self) {}
}

/// OAuth2 token response from the identity platform.
#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    expires_in: i64,
    #[allow(dead_code)]
    token_type: String,
}

/// Cached OAuth2 access token.
#[derive(Debug, Clone)]
struct CachedToken {
    access_token: SecretString,
    expires_at: DateTime<Utc>,
}

impl CachedToken {
    /// Returns true if the token is expired or will expire within the grace period.
    fn is_expired(&self, grace_period: Duration) -> bool {
        Utc::now() + grace_period >= self.expires_at
    }
}

/// Client-credentials token provider with an in-memory cache.
#[derive(Debug)]
pub struct TokenCache {
    credentials: EntraCredentials,
    cloud_environment: EntraCloudEnvironment,
    tenant_id: String,
    http_client: reqwest::Client,
    cached_token: RwLock<Option<CachedToken>>,
    /// Grace period before expiry to trigger refresh (default: 5 minutes).
    grace_period: Duration,
}

impl TokenCache {
    /// Creates a new token cache.
    #[must_use]
    pub fn new(
        credentials: EntraCredentials,
        cloud_environment: EntraCloudEnvironment,
        tenant_id: String,
        http_client: reqwest::Client,
    ) -> Self {
        Self {
            credentials,
            cloud_environment,
            tenant_id,
            http_client,
            cached_token: RwLock::new(None),
            grace_period: Duration::minutes(5),
        }
    }

    /// URL of the v2.0 token endpoint for the configured tenant.
    #[must_use]
    pub fn token_url(&self) -> String {
        format!(
            "{}/{}/oauth2/v2.0/token",
            self.cloud_environment.login_endpoint(),
            self.tenant_id
        )
    }

    /// Acquires a new access token using client credentials flow.
    #[instrument(skip(self))]
    async fn acquire_token(&self) -> EntraResult<CachedToken> {
        let scope = format!("{}/.default", self.cloud_environment.graph_endpoint());
        let params = [
            ("grant_type", "client_credentials"),
            ("client_id", self.credentials.client_id.as_str()),
            (
                "client_secret",
                self.credentials.client_secret.expose_secret(),
            ),
            ("scope", scope.as_str()),
        ];

        let response = self
            .http_client
            .post(self.token_url())
            .form(&params)
            .send()
            .await
            .map_err(|e| EntraError::Auth(format!("Token request failed: {e}")))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(EntraError::Auth(format!(
                "Token request failed with status {status}: {body}"
            )));
        }

        let token_response: TokenResponse = response
            .json()
            .await
            .map_err(|e| EntraError::Auth(format!("Failed to parse token response: {e}")))?;

        let expires_at = Utc::now() + Duration::seconds(token_response.expires_in);

        info!("Entra access token obtained");
        debug!(
            "Token expires at {}",
            expires_at.format("%Y-%m-%d %H:%M:%S UTC")
        );

        Ok(CachedToken {
            access_token: SecretString::from(token_response.access_token),
            expires_at,
        })
    }
}

#[async_trait]
impl TokenProvider for TokenCache {
    #[instrument(skip(self), fields(tenant_id = %self.tenant_id))]
    async fn get_token(&self) -> EntraResult<SecretString> {
        {
            let cache = self.cached_token.read().await;
            if let Some(ref token) = *cache {
                if !token.is_expired(self.grace_period) {
                    debug!("Using cached token");
                    return Ok(token.access_token.clone());
                }
            }
        }

        debug!("No usable token in cache, acquiring a new one");
        let new_token = self.acquire_token().await?;
        let access_token = new_token.access_token.clone();

        *self.cached_token.write().await = Some(new_token);

        Ok(access_token)
    }

    async fn invalidate(&self) {
        *self.cached_token.write().await = None;
    }
}

/// Provider that always hands out the same pre-acquired token.
#[derive(Debug, Clone)]
pub struct StaticToken(SecretString);

impl StaticToken {
    #[must_use]
    pub fn new(token: impl Into<String>) -> Self {
        Self(SecretString::from(token.into()))
    }
}

#[async_trait]
impl TokenProvider for StaticToken {
    async fn get_token(&self) -> EntraResult<SecretString> {
        Ok(self.0.clone())
    }
}
