//! SCIM target configuration.

use crate::auth::ScimCredentials;
use crate::error::{ScimClientError, ScimClientResult};

/// Default page size for `startIndex`/`count` listings.
pub const DEFAULT_PAGE_SIZE: i64 = 100;

/// Default HTTP timeout in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Connection settings for a SCIM 2.0 service provider.
#[derive(Debug, Clone)]
pub struct ScimConfig {
    /// Base URL without trailing slash, e.g. `https://acme.goskope.com/api/v2/scim`.
    pub base_url: String,
    pub credentials: ScimCredentials,
    /// `count` sent with every paged listing.
    pub page_size: i64,
    pub timeout_secs: u64,
    /// Verify the server certificate. Disable only for lab tenants.
    pub tls_verify: bool,
    /// Retry budget for throttled reads.
    pub max_retries: u32,
}

impl ScimConfig {
    pub fn new(base_url: impl Into<String>, credentials: ScimCredentials) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            credentials,
            page_size: DEFAULT_PAGE_SIZE,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            tls_verify: true,
            max_retries: 5,
        }
    }

    /// SCIM base URL of a Netskope tenant.
    #[must_use]
    pub fn netskope_base_url(tenant: &str) -> String {
        format!("https://{}.goskope.com/api/v2/scim", tenant.trim())
    }

    #[must_use]
    pub fn with_page_size(mut self, page_size: i64) -> Self {
        self.page_size = page_size;
        self
    }

    #[must_use]
    pub fn with_timeout_secs(mut self, timeout_secs: u64) -> Self {
        self.timeout_secs = timeout_secs;
        self
    }

    #[must_use]
    pub fn with_tls_verify(mut self, tls_verify: bool) -> Self {
        self.tls_verify = tls_verify;
        self
    }

    #[must_use]
    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    pub fn validate(&self) -> ScimClientResult<()> {
        if !self.base_url.starts_with("http://") && !self.base_url.starts_with("https://") {
            return Err(ScimClientError::InvalidConfig(format!(
                "SCIM base URL must be http(s): {}",
                self.base_url
            )));
        }
        if self.page_size < 1 {
            return Err(ScimClientError::InvalidConfig(
                "page size must be at least 1".to_string(),
            ));
        }
        if self.timeout_secs == 0 {
            return Err(ScimClientError::InvalidConfig(
                "timeout must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}
