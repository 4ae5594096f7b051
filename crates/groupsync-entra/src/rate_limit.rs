//! Throttling handling for Microsoft Graph API requests.
//!
//! Graph answers bursts with `429 Too Many Requests` and a `Retry-After`
//! header. Requests are retried after the advertised delay, or after an
//! exponential backoff with jitter when the header is missing.

use std::time::Duration;

use chrono::{DateTime, Utc};
use rand::Rng;
use tracing::{info, warn};

use crate::{EntraError, EntraResult};

/// Backoff settings for throttled and transiently failing Graph calls.
#[derive(Debug, Clone)]
pub struct RateLimitConfig {
    /// First backoff step in milliseconds.
    pub base_delay_ms: u64,
    /// Upper bound for any single wait, advertised or computed.
    pub max_delay_ms: u64,
    /// Extra random delay as a fraction of the computed step, in `[0, 1]`.
    pub jitter_factor: f64,
    pub max_retries: u32,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            base_delay_ms: 1000,
            max_delay_ms: 300_000,
            jitter_factor: 0.25,
            max_retries: 5,
        }
    }
}

impl RateLimitConfig {
    /// Millisecond delays, no jitter, three retries.
    #[must_use]
    pub fn for_testing() -> Self {
        Self {
            base_delay_ms: 1,
            max_delay_ms: 10,
            jitter_factor: 0.0,
            max_retries: 3,
        }
    }

    /// # Errors
    ///
    /// Returns [`EntraError::Config`] when the delays or jitter are out of range.
    pub fn validate(&self) -> EntraResult<()> {
        let problem = if self.base_delay_ms == 0 {
            Some("base_delay_ms must be greater than zero")
        } else if self.max_delay_ms < self.base_delay_ms {
            Some("max_delay_ms must not be below base_delay_ms")
        } else if !(0.0..=1.0).contains(&self.jitter_factor) {
            Some("jitter_factor must lie between 0 and 1")
        } else {
            None
        };

        match problem {
            Some(msg) => Err(EntraError::Config(format!("Invalid rate limit config: {msg}"))),
            None => Ok(()),
        }
    }
}

/// Decides how long to wait before retrying a Graph request.
#[derive(Debug, Clone, Default)]
pub struct RateLimiter {
    config: RateLimitConfig,
}

impl RateLimiter {
    /// # Errors
    ///
    /// Returns [`EntraError::Config`] if `config` does not validate.
    pub fn new(config: RateLimitConfig) -> EntraResult<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    #[must_use]
    pub fn config(&self) -> &RateLimitConfig {
        &self.config
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

    /// Wait before retry number `attempt` (zero-based).
    ///
    /// An advertised delay is honoured up to `max_delay_ms`; otherwise the
    /// step doubles per attempt, is capped, then jittered upward.
    #[must_use]
    pub fn delay_for(&self, retry_after_secs: Option<u64>, attempt: u32) -> Duration {
        let cap = Duration::from_millis(self.config.max_delay_ms);

        if let Some(secs) = retry_after_secs {
            let advertised = Duration::from_secs(secs);
            if advertised > cap {
                warn!(
                    retry_after_secs = secs,
                    cap_secs = cap.as_secs(),
                    "Retry-After above the configured maximum, capping"
                );
                return Duration::from_secs(cap.as_secs());
            }
            return advertised;
        }

        let step = self
            .config
            .base_delay_ms
            .saturating_mul(1u64.checked_shl(attempt).unwrap_or(u64::MAX))
            .min(self.config.max_delay_ms);

        let jitter_ms = (step as f64 * self.config.jitter_factor) as u64;
        let extra = if jitter_ms == 0 {
            0
        } else {
            rand::thread_rng().gen_range(0..=jitter_ms)
        };
        Duration::from_millis(step + extra)
    }

    /// Sleep before retry number `attempt`.
    ///
    /// # Errors
    ///
    /// Returns [`EntraError::MaxRetriesExceeded`] once `attempt` reaches the
    /// configured maximum.
    pub async fn backoff(&self, retry_after_header: Option<&str>, attempt: u32) -> EntraResult<()> {
        if attempt >= self.config.max_retries {
            return Err(EntraError::MaxRetriesExceeded { attempts: attempt });
        }

        let delay = self.delay_for(retry_after_header.and_then(Self::parse_retry_after), attempt);
        info!(delay_ms = delay.as_millis() as u64, attempt = attempt + 1, "Backing off Graph request");
        tokio::time::sleep(delay).await;
        Ok(())
    }
}
