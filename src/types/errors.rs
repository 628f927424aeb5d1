//! Application error types.
//!
//! All errors use `thiserror` for automatic Error trait derivation and provide
//! clear error messages with context.

use thiserror::Error;

/// Application result type.
pub type Result<T> = std::result::Result<T, Error>;

/// Main error enum for the gateway.
#[derive(Error, Debug)]
pub enum Error {
    /// Invalid rate limit or endpoint configuration. Raised at construction
    /// time, never at submission time.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// Document or signature rejected before admission.
    #[error("validation error: {0}")]
    Validation(String),

    /// Payload build failure (surfaced to the submit caller, pre-queue).
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The dispatcher was shut down while the caller was submitting or
    /// parked on a full queue.
    #[error("dispatcher closed: {0}")]
    Closed(String),

    /// Outbound call failure, post-dequeue. Recorded by the scheduler but
    /// never re-enqueued and never fatal to the tick loop.
    #[error("send failed: {0}")]
    Send(String),
}

// Convenience constructors
impl Error {
    pub fn configuration(msg: impl Into<String>) -> Self {
        Self::Configuration(msg.into())
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn closed(msg: impl Into<String>) -> Self {
        Self::Closed(msg.into())
    }

    pub fn send(msg: impl Into<String>) -> Self {
        Self::Send(msg.into())
    }
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        Self::Send(err.to_string())
    }
}
