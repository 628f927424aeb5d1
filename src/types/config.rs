//! Configuration structures.
//!
//! Configuration is immutable once a dispatcher is constructed; there is no
//! dynamic reconfiguration of a running rate limit.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::{Error, Result};

/// Default ISMP create-document endpoint.
pub const DEFAULT_ENDPOINT: &str = "https://ismp.crpt.ru/api/v3/lk/documents/create";

/// Rate limit: at most `request_limit` dispatches per `window`, spaced
/// evenly rather than bursting at the start of each window.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RateLimitConfig {
    /// Time span over which the request-count ceiling applies.
    #[serde(with = "humantime_serde")]
    pub window: Duration,

    /// Maximum number of dispatches permitted per window. Also the capacity
    /// of the submission queue.
    pub request_limit: u32,
}

impl RateLimitConfig {
    /// Build a validated config.
    pub fn new(window: Duration, request_limit: u32) -> Result<Self> {
        let config = Self {
            window,
            request_limit,
        };
        config.validate()?;
        Ok(config)
    }

    /// Check the config invariants: `request_limit >= 1`, `window > 0`, and
    /// an interval that does not truncate to zero at nanosecond resolution.
    pub fn validate(&self) -> Result<()> {
        if self.request_limit == 0 {
            return Err(Error::configuration("request_limit must be at least 1"));
        }
        if self.window.is_zero() {
            return Err(Error::configuration("window must be non-zero"));
        }
        if self.tick_interval().is_zero() {
            return Err(Error::configuration(format!(
                "window {:?} split across {} requests truncates to a zero interval",
                self.window, self.request_limit
            )));
        }
        Ok(())
    }

    /// Spacing between consecutive dispatches: `window / request_limit`.
    pub fn tick_interval(&self) -> Duration {
        self.window
            .checked_div(self.request_limit)
            .unwrap_or(Duration::ZERO)
    }
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            window: Duration::from_secs(60),
            request_limit: 20,
        }
    }
}

/// Gateway configuration: where to send documents and how fast. Every field
/// defaults, so a partial config file is enough.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayConfig {
    /// Outbound create-document endpoint.
    #[serde(default = "default_endpoint")]
    pub endpoint: String,

    /// Rate limit applied to outbound calls.
    #[serde(default)]
    pub rate: RateLimitConfig,

    /// Reject documents with missing required fields (and blank signatures)
    /// before they reach the queue.
    #[serde(default = "default_validate_documents")]
    pub validate_documents: bool,

    /// Logging configuration.
    #[serde(default)]
    pub observability: ObservabilityConfig,
}

fn default_endpoint() -> String {
    DEFAULT_ENDPOINT.to_string()
}

fn default_validate_documents() -> bool {
    true
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            rate: RateLimitConfig::default(),
            validate_documents: default_validate_documents(),
            observability: ObservabilityConfig::default(),
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObservabilityConfig {
    /// Tracing log level (trace, debug, info, warn, error). `RUST_LOG`
    /// overrides this when set.
    pub log_level: String,

    /// Enable JSON log formatting.
    pub json_logs: bool,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            json_logs: false,
        }
    }
}
