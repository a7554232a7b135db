//! reqwest-backed upstream client.

use async_trait::async_trait;
use futures_util::StreamExt;
use tracing::debug;

use genrelay_core::RelayConfig;

use super::{GenerateRequest, Upstream, UpstreamError, UpstreamResponse};

/// Client for the streaming generation endpoint.
///
/// The inner `reqwest::Client` is a connection pool shared by all sessions;
/// each call to [`Upstream::open`] yields a response owned by one session.
#[derive(Debug, Clone)]
pub struct HttpUpstream {
    http: reqwest::Client,
    url: reqwest::Url,
}

impl HttpUpstream {
    /// Create a client for the configured endpoint.
    pub fn new(config: &RelayConfig) -> Result<Self, UpstreamError> {
        let url = reqwest::Url::parse(config.upstream_url.trim())
            .map_err(|e| UpstreamError::InvalidRequest(format!("upstream_url: {e}")))?;

        // Ensure a TLS crypto provider is installed (reqwest uses rustls-no-provider).
        // The `Err` case just means it was already installed.
        let _ = rustls::crypto::ring::default_provider().install_default();

        let http = reqwest::Client::builder()
            .connect_timeout(config.connect_timeout())
            .build()
            .map_err(|e| UpstreamError::InvalidRequest(e.to_string()))?;

        Ok(Self { http, url })
    }

    pub const fn url(&self) -> &reqwest::Url {
        &self.url
    }

    fn classify(err: &reqwest::Error) -> UpstreamError {
        if err.is_builder() {
            UpstreamError::InvalidRequest(err.to_string())
        } else {
            UpstreamError::Connect(err.to_string())
        }
    }
}

#[async_trait]
impl Upstream for HttpUpstream {
    async fn open(&self, request: &GenerateRequest) -> Result<UpstreamResponse, UpstreamError> {
        let resp = self
            .http
            .post(self.url.clone())
            .json(request)
            .send()
            .await
            .map_err(|e| Self::classify(&e))?;

        let status = resp.status().as_u16();
        debug!(url = %self.url, status, "Upstream response headers received");

        let body = resp
            .bytes_stream()
            .map(|chunk| chunk.map_err(|e| UpstreamError::Transport(e.to_string())));

        Ok(UpstreamResponse {
            status,
            body: Box::pin(body),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_url_is_rejected() {
        let config = RelayConfig {
            upstream_url: "not a url".into(),
            ..Default::default()
        };
        let err = HttpUpstream::new(&config).unwrap_err();
        assert!(matches!(err, UpstreamError::InvalidRequest(_)));
    }

    #[test]
    fn valid_config_creates_client() {
        let upstream = HttpUpstream::new(&RelayConfig::default()).unwrap();
        assert_eq!(upstream.url().as_str(), "http://localhost:11434/api/generate");
    }

    #[test]
    fn surrounding_whitespace_is_trimmed() {
        let config = RelayConfig {
            upstream_url: " http://127.0.0.1:9/api/generate ".into(),
            ..Default::default()
        };
        let upstream = HttpUpstream::new(&config).unwrap();
        assert_eq!(upstream.url().port(), Some(9));
    }
}
