//! Microsoft Graph API HTTP client with pagination and throttling handling.

use secrecy::ExposeSecret;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, instrument, warn};

use crate::auth::TokenProvider;
use crate::rate_limit::{RateLimitConfig, RateLimiter};
use crate::{EntraCloudEnvironment, EntraError, EntraResult};

/// `OData` error response from Microsoft Graph.
#[derive(Debug, Deserialize)]
pub struct ODataError {
    pub error: ODataErrorBody,
}

/// `OData` error body.
#[derive(Debug, Deserialize)]
pub struct ODataErrorBody {
    pub code: String,
    pub message: String,
    #[serde(rename = "innerError")]
    pub inner_error: Option<serde_json::Value>,
}

/// Response wrapper for paginated Graph API responses.
#[derive(Debug, Deserialize)]
pub struct ODataResponse<T> {
    #[serde(default = "Vec::new")]
    pub value: Vec<T>,
    #[serde(rename = "@odata.nextLink")]
    pub next_link: Option<String>,
}

/// Microsoft Graph API client.
#[derive(Debug, Clone)]
pub struct GraphClient {
    http_client: reqwest::Client,
    token_provider: Arc<dyn TokenProvider>,
    cloud_environment: EntraCloudEnvironment,
    api_version: String,
    rate_limiter: RateLimiter,
}

impl GraphClient {
    /// Creates a new Graph client.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be created.
    pub fn new(
        token_provider: Arc<dyn TokenProvider>,
        cloud_environment: EntraCloudEnvironment,
        api_version: String,
        timeout: Duration,
    ) -> EntraResult<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| EntraError::Config(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self::with_http_client(
            http_client,
            token_provider,
            cloud_environment,
            api_version,
        ))
    }

    /// Creates a client around a pre-built `reqwest::Client`.
    #[must_use]
    pub fn with_http_client(
        http_client: reqwest::Client,
        token_provider: Arc<dyn TokenProvider>,
        cloud_environment: EntraCloudEnvironment,
        api_version: String,
    ) -> Self {
        Self {
            http_client,
            token_provider,
            cloud_environment,
            api_version,
            rate_limiter: RateLimiter::default(),
        }
    }

    /// Replaces the throttling configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid.
    pub fn with_rate_limit_config(mut self, config: RateLimitConfig) -> EntraResult<Self> {
        self.rate_limiter = RateLimiter::new(config)?;
        Ok(self)
    }

    /// Returns the base URL for Graph API requests.
    #[must_use]
    pub fn base_url(&self) -> String {
        format!(
            "{}/{}",
            self.cloud_environment.graph_endpoint(),
            self.api_version
        )
    }

    /// Performs a GET request with token injection and retry handling.
    #[instrument(skip(self))]
    pub async fn get<T: DeserializeOwned>(&self, url: &str) -> EntraResult<T> {
        let mut attempt = 0u32;
        let mut reauthenticated = false;

        loop {
            let token = self.token_provider.get_token().await?;

            let response = self
                .http_client
                .get(url)
                .bearer_auth(token.expose_secret())
                .header("Accept", "application/json")
                .send()
                .await?;
            let status = response.status();

            if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
                let retry_after = response
                    .headers()
                    .get("Retry-After")
                    .and_then(|v| v.to_str().ok())
                    .map(str::to_owned);
                self.rate_limiter
                    .backoff(retry_after.as_deref(), attempt)
                    .await?;
                attempt += 1;
                continue;
            }

            if matches!(
                status,
                reqwest::StatusCode::BAD_GATEWAY
                    | reqwest::StatusCode::SERVICE_UNAVAILABLE
                    | reqwest::StatusCode::GATEWAY_TIMEOUT
            ) {
                warn!("Transient error {}, retry {}", status, attempt + 1);
                self.rate_limiter.backoff(None, attempt).await?;
                attempt += 1;
                continue;
            }

            // An expired token is refreshed once; a second 401 is reported.
            if status == reqwest::StatusCode::UNAUTHORIZED && !reauthenticated {
                debug!("Graph returned 401, refreshing token");
                self.token_provider.invalidate().await;
                reauthenticated = true;
                continue;
            }

            if status.is_success() {
                return response.json().await.map_err(EntraError::from);
            }

            let error_body = response.text().await.unwrap_or_default();
            return Err(Self::graph_error(status, error_body));
        }
    }

    fn graph_error(status: reqwest::StatusCode, error_body: String) -> EntraError {
        if let Ok(odata_error) = serde_json::from_str::<ODataError>(&error_body) {
            return EntraError::GraphApi {
                code: odata_error.error.code,
                message: odata_error.error.message,
                inner_error: odata_error.error.inner_error.map(|v| v.to_string()),
            };
        }

        EntraError::GraphApi {
            code: status.to_string(),
            message: error_body,
            inner_error: None,
        }
    }

    /// Fetches all pages of a paginated response, processing each page via callback.
    ///
    /// Follows `@odata.nextLink` until the server stops returning one. Any
    /// failing page aborts the whole walk. Returns the number of pages fetched.
    #[instrument(skip(self, callback))]
    pub async fn get_paginated<T, F>(&self, initial_url: &str, mut callback: F) -> EntraResult<usize>
    where
        T: DeserializeOwned,
        F: FnMut(Vec<T>) -> EntraResult<()>,
    {
        let mut url = initial_url.to_string();
        let mut pages = 0usize;

        loop {
            debug!("Fetching page: {}", url);
            let response: ODataResponse<T> = self.get(&url).await?;
            pages += 1;

            callback(response.value)?;

            match response.next_link {
                Some(next) => url = next,
                None => return Ok(pages),
            }
        }
    }
}
