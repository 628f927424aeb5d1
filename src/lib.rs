//! # ISMP Gateway - Paced Document Submission
//!
//! Throttling gateway for the ISMP marking API. Producers submit documents
//! faster than the external API may legally receive them; the gateway queues
//! them and releases them at a steady rate so the aggregate call count never
//! exceeds `request_limit` requests per `window`.
//!
//! ## Architecture
//!
//! The dispatcher owns the one shared mutable structure (the bounded
//! submission queue) and a single scheduler task that drains it:
//! ```text
//!   producers ──► validation ──► payload build ──► submit()
//!                                                     │ (blocks when full)
//!                                            ┌────────▼────────┐
//!                                            │ bounded queue   │ capacity =
//!                                            │ (FIFO)          │ request_limit
//!                                            └────────┬────────┘
//!                                      one dequeue per│tick, every
//!                                      window / request_limit
//!                                            ┌────────▼────────┐
//!                                            │ network sender  │──► ISMP API
//!                                            └─────────────────┘
//! ```

// Enforce strict safety at compile time
#![deny(unsafe_code)]
#![warn(missing_debug_implementations)]
#![warn(rust_2018_idioms)]

// Re-export public API
pub mod dispatch;
pub mod document;
pub mod envelope;
pub mod gateway;
pub mod sender;
pub mod types;
pub mod validation;

// Internal utilities
pub mod observability;

pub use dispatch::{DispatchStats, Dispatcher};
pub use document::{Document, Product};
pub use envelope::RequestEnvelope;
pub use gateway::Gateway;
pub use sender::{HttpSender, NetworkSender};
pub use types::{Error, GatewayConfig, ObservabilityConfig, RateLimitConfig, Result};
