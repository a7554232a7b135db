//! Upstream generation service.
//!
//! The relay only needs "POST this request, give me the status and a byte
//! stream of the body"; [`Upstream`] is that seam, [`HttpUpstream`] the
//! reqwest-backed implementation.

mod http;

use std::pin::Pin;

use async_trait::async_trait;
use bytes::Bytes;
use futures_util::Stream;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use http::HttpUpstream;

/// Body of the streaming POST sent to the generation endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerateRequest {
    pub model: String,
    pub prompt: String,
    /// Always `true`: the relay only speaks the streamed form.
    pub stream: bool,
}

impl GenerateRequest {
    pub fn new(model: impl Into<String>, prompt: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            prompt: prompt.into(),
            stream: true,
        }
    }
}

/// Upstream body as a sequence of byte chunks, read one at a time.
pub type ByteStream = Pin<Box<dyn Stream<Item = Result<Bytes, UpstreamError>> + Send>>;

/// An open upstream response. Dropping it releases the connection.
pub struct UpstreamResponse {
    pub status: u16,
    pub body: ByteStream,
}

impl std::fmt::Debug for UpstreamResponse {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UpstreamResponse")
            .field("status", &self.status)
            .finish_non_exhaustive()
    }
}

/// Upstream failures. All of them end the body for the current session.
#[derive(Debug, Error)]
pub enum UpstreamError {
    /// Connect, DNS or TLS failure before any response arrived.
    #[error("connection failed: {0}")]
    Connect(String),

    /// The connection broke while the body was being read.
    #[error("transport error: {0}")]
    Transport(String),

    /// The request could not be built (bad URL, client construction).
    #[error("invalid request: {0}")]
    InvalidRequest(String),
}

/// Something that can open a streaming generation response.
#[async_trait]
pub trait Upstream: Send + Sync {
    /// Send `request` and return once the response headers are in.
    async fn open(&self, request: &GenerateRequest) -> Result<UpstreamResponse, UpstreamError>;
}
