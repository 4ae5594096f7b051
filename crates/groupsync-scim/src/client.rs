//! SCIM 2.0 HTTP client (reqwest-based).
//!
//! Thin transport layer: authentication, SCIM media types, throttling
//! backoff for reads and mapping of error responses.

use crate::auth::ScimAuth;
use crate::config::ScimConfig;
use crate::error::{ScimClientError, ScimClientResult};
use crate::models::ScimListResponse;
use crate::retry::RetryPolicy;
use chrono::{DateTime, Utc};
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use reqwest::{Client, Method, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::{debug, warn};

/// Media type sent in `Accept`.
pub const SCIM_ACCEPT: &str = "application/scim+json;charset=utf-8";

/// Media type of request bodies.
pub const SCIM_CONTENT_TYPE: &str = "application/scim+json";

/// SCIM 2.0 HTTP client.
#[derive(Debug, Clone)]
pub struct ScimClient {
    /// Base URL of the SCIM target (e.g., "<https://acme.goskope.com/api/v2/scim>").
    base_url: String,
    auth: ScimAuth,
    http_client: Client,
    retry: RetryPolicy,
}

impl ScimClient {
    /// Create a client from validated configuration.
    pub fn new(config: &ScimConfig) -> ScimClientResult<Self> {
        config.validate()?;

        if !config.tls_verify {
            warn!(base_url = %config.base_url, "TLS certificate verification is disabled");
        }

        let http_client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .danger_accept_invalid_certs(!config.tls_verify)
            .user_agent(concat!("groupsync/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| {
                ScimClientError::InvalidConfig(format!("Failed to build HTTP client: {e}"))
            })?;

        Ok(Self::with_http_client(
            config.base_url.clone(),
            ScimAuth::new(config.credentials.clone()),
            http_client,
        )
        .with_retry_policy(RetryPolicy::new(config.max_retries, 1_000)))
    }

    /// Create a client with a pre-built `reqwest::Client` (for testing).
    #[must_use]
    pub fn with_http_client(base_url: String, auth: ScimAuth, http_client: Client) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            auth,
            http_client,
            retry: RetryPolicy::default(),
        }
    }

    #[must_use]
    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// One page of `GET {base}/{resource}` with optional filter.
    pub async fn list_page<T: DeserializeOwned>(
        &self,
        resource: &str,
        filter: Option<&str>,
        start_index: i64,
        count: i64,
    ) -> ScimClientResult<ScimListResponse<T>> {
        let url = format!("{}/{}", self.base_url, resource);
        let mut params: Vec<(&str, String)> = Vec::with_capacity(3);
        if let Some(f) = filter {
            params.push(("filter", f.to_string()));
        }
        params.push(("startIndex", start_index.to_string()));
        params.push(("count", count.to_string()));

        self.retry
            .execute(resource, || self.get_with_params(&url, &params))
            .await
    }

    /// `GET {base}/{path}` restricted to the given attributes.
    pub async fn get_resource<T: DeserializeOwned>(
        &self,
        path: &str,
        attributes: &str,
    ) -> ScimClientResult<T> {
        let url = format!("{}/{}", self.base_url, path);
        let params = [("attributes", attributes.to_string())];
        self.retry
            .execute(path, || self.get_with_params(&url, &params))
            .await
    }

    /// `PATCH {base}/{path}` with a pre-serialized SCIM body, sent once.
    ///
    /// Any HTTP response comes back as `(status, body)` for the caller to
    /// judge; only transport failures are errors.
    pub async fn send_patch(&self, path: &str, body: String) -> ScimClientResult<(StatusCode, String)> {
        let url = format!("{}/{}", self.base_url, path);
        debug!("SCIM PATCH {}", url);
        let response = self
            .request(Method::PATCH, &url)
            .header(CONTENT_TYPE, SCIM_CONTENT_TYPE)
            .body(body)
            .send()
            .await?;
        let status = response.status();
        let text = response.text().await.unwrap_or_default();
        Ok((status, text))
    }

    async fn get_with_params<T: DeserializeOwned>(
        &self,
        url: &str,
        params: &[(&str, String)],
    ) -> ScimClientResult<T> {
        debug!("SCIM GET {} {:?}", url, params);
        let response = self.request(Method::GET, url).query(params).send().await?;
        self.handle_response(response).await
    }

    fn request(&self, method: Method, url: &str) -> RequestBuilder {
        let builder = self
            .http_client
            .request(method, url)
            .header(ACCEPT, SCIM_ACCEPT);
        self.auth.apply(builder)
    }

    async fn handle_response<T: DeserializeOwned>(
        &self,
        response: reqwest::Response,
    ) -> ScimClientResult<T> {
        let status = response.status();

        if status.is_success() {
            let body = response.text().await?;
            serde_json::from_str(&body)
                .map_err(|e| ScimClientError::ParseError(format!("Failed to parse response: {e}")))
        } else {
            Err(Self::error_from_response(response).await)
        }
    }

    async fn error_from_response(response: reqwest::Response) -> ScimClientError {
        let status = response.status();

        let retry_after = response
            .headers()
            .get("Retry-After")
            .and_then(|v| v.to_str().ok())
            .and_then(parse_retry_after);

        let body = response
            .text()
            .await
            .unwrap_or_else(|_| "<no body>".to_string());

        match status {
            StatusCode::NOT_FOUND => ScimClientError::NotFound(body),
            StatusCode::TOO_MANY_REQUESTS => ScimClientError::RateLimited {
                retry_after_secs: retry_after,
            },
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                ScimClientError::AuthError(format!("HTTP {status}: {body}"))
            }
            _ => {
                let detail = if body.is_empty() {
                    format!("HTTP {status}")
                } else {
                    body
                };
                ScimClientError::ScimError {
                    status: status.as_u16(),
                    detail,
                }
            }
        }
    }
}

/// Seconds to wait from a `Retry-After` value, either delay-seconds or an
/// HTTP-date. A date in the past means no wait.
#[must_use]
pub fn parse_retry_after(header_value: &str) -> Option<u64> {
    let value = header_value.trim();
    if let Ok(secs) = value.parse::<u64>() {
        return Some(secs);
    }
    let at = DateTime::parse_from_rfc2822(value).ok()?;
    let remaining = at.with_timezone(&Utc) - Utc::now();
    Some(u64::try_from(remaining.num_seconds()).unwrap_or(0))
}

/// Escape a value for use inside a SCIM filter string literal.
///
/// RFC 7644 Section 3.4.2.2 string values are double-quoted; backslashes and
/// double quotes are escaped to prevent filter injection.
#[must_use]
pub fn escape_scim_filter_value(value: &str) -> String {
    value.replace('\\', "\\\\").replace('"', "\\\"")
}
