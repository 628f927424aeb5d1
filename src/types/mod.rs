//! Core type definitions shared across the gateway.

pub mod config;
pub mod errors;

pub use config::{GatewayConfig, ObservabilityConfig, RateLimitConfig, DEFAULT_ENDPOINT};
pub use errors::{Error, Result};
