//! Gateway facade - wiring validation, payload building, and dispatch.
//!
//! Each gateway owns its own dispatcher, so multiple independently-configured
//! rate limits can coexist in one process.

use std::sync::Arc;

use crate::dispatch::Dispatcher;
use crate::document::Document;
use crate::observability;
use crate::sender::HttpSender;
use crate::types::{GatewayConfig, Result};
use crate::validation;

/// Submission gateway for one endpoint and one rate limit.
#[derive(Debug)]
pub struct Gateway {
    config: GatewayConfig,
    dispatcher: Dispatcher,
}

impl Gateway {
    /// Wire up an HTTP sender and a dispatcher for the configured endpoint
    /// and rate. Fails on an invalid endpoint or rate limit. The first
    /// gateway in a process also initializes logging.
    pub fn new(config: GatewayConfig) -> Result<Self> {
        observability::init_tracing(&config.observability);
        let sender = Arc::new(HttpSender::new(&config.endpoint)?);
        let dispatcher = Dispatcher::new(config.rate.clone(), sender)?;
        Ok(Self { config, dispatcher })
    }

    /// Validate (when enabled), build the wire body, and admit the request.
    ///
    /// Validation and serialization failures surface here synchronously,
    /// before any queue interaction. Blocks while the queue is full.
    pub async fn submit_document(&self, document: &Document, signature: &str) -> Result<()> {
        if self.config.validate_documents {
            validation::validate_signature(signature)?;
            validation::validate_document(document)?;
        }
        let body = document.to_body()?;
        self.dispatcher.submit(body, signature).await
    }

    /// The underlying dispatcher (stats, tick interval).
    pub fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }

    pub async fn shutdown(&self) {
        self.dispatcher.shutdown().await;
    }
}
