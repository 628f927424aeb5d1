//! Request envelope - the immutable unit of work.
//!
//! An envelope carries one serialized body and its detached signature from
//! admission to dispatch. It has no identity beyond its queue position;
//! duplicates are permitted and not deduplicated. Ownership transfers from
//! producer to queue to sender, one owner at a time.

use bytes::Bytes;

/// A serialized request body plus the signature to attach to the outbound
/// call. Consumed exactly once by the network sender.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestEnvelope {
    body: Bytes,
    signature: String,
}

impl RequestEnvelope {
    pub fn new(body: impl Into<Bytes>, signature: impl Into<String>) -> Self {
        Self {
            body: body.into(),
            signature: signature.into(),
        }
    }

    /// The wire body, cheap to clone.
    pub fn body(&self) -> &Bytes {
        &self.body
    }

    /// The detached signature, carried as a request header.
    pub fn signature(&self) -> &str {
        &self.signature
    }
}
