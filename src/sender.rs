//! Outbound network sender.
//!
//! The sender performs exactly one outbound call per envelope. Outcomes are
//! logged and counted by the scheduler but never retried at this layer;
//! reliable delivery is a higher layer's responsibility.

use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;

use crate::envelope::RequestEnvelope;
use crate::types::{Error, Result};

/// Header carrying the detached signature on outbound calls.
pub const SIGNATURE_HEADER: &str = "Signature";

/// One outbound call per envelope. Implementations must be shareable across
/// the scheduler task and test harnesses.
#[async_trait]
pub trait NetworkSender: Send + Sync {
    async fn send(&self, envelope: &RequestEnvelope) -> Result<()>;
}

/// HTTP sender posting envelopes to one fixed, pre-configured endpoint with
/// create-document semantics.
#[derive(Debug, Clone)]
pub struct HttpSender {
    client: reqwest::Client,
    endpoint: reqwest::Url,
}

impl HttpSender {
    /// Build a sender for one endpoint. Rejects unparseable URLs at
    /// construction so a bad endpoint never reaches the dispatch path.
    pub fn new(endpoint: &str) -> Result<Self> {
        let endpoint = reqwest::Url::parse(endpoint)
            .map_err(|e| Error::configuration(format!("invalid endpoint {endpoint}: {e}")))?;
        Ok(Self {
            client: reqwest::Client::new(),
            endpoint,
        })
    }

    pub fn endpoint(&self) -> &str {
        self.endpoint.as_str()
    }
}

#[async_trait]
impl NetworkSender for HttpSender {
    async fn send(&self, envelope: &RequestEnvelope) -> Result<()> {
        let response = self
            .client
            .post(self.endpoint.clone())
            .header(SIGNATURE_HEADER, envelope.signature())
            .header(CONTENT_TYPE, "application/json")
            .body(envelope.body().clone())
            .send()
            .await?;

        let status = response.status();
        response.error_for_status()?;

        tracing::debug!("envelope posted to {} (status={})", self.endpoint, status);
        Ok(())
    }
}
