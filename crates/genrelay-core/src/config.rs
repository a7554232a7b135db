//! Relay configuration.
//!
//! Values come from built-in defaults overridden by CLI flags or their
//! environment-variable fallbacks. There is no configuration file.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Complete relay configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RelayConfig {
    /// Generation endpoint receiving the streaming POST.
    pub upstream_url: String,
    /// Model identifier sent upstream when the request does not name one.
    pub model: String,
    /// Prompt sent upstream when the request does not carry one.
    pub prompt: String,
    /// Longest upstream line accepted before it is dropped as malformed.
    pub max_line_bytes: usize,
    /// Upper bound on establishing the upstream TCP connection (seconds).
    pub connect_timeout_secs: u64,
    /// Interval of SSE keep-alive comments; `0` disables them.
    pub keep_alive_secs: u64,
    pub pacing: PacingConfig,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            upstream_url: "http://localhost:11434/api/generate".to_string(),
            model: "llama3.2".to_string(),
            prompt: "What is the capital of France?".to_string(),
            max_line_bytes: 1024 * 1024, // 1 MiB
            connect_timeout_secs: 10,
            keep_alive_secs: 15,
            pacing: PacingConfig::default(),
        }
    }
}

impl RelayConfig {
    /// Check the values that would otherwise only fail once a client connects.
    pub fn validate(&self) -> Result<()> {
        let url = self.upstream_url.trim();
        if url.is_empty() {
            return Err(Error::Config("upstream_url is empty".into()));
        }
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(Error::Config(format!(
                "upstream_url must be http(s): {url}"
            )));
        }
        if self.model.trim().is_empty() {
            return Err(Error::Config("model is empty".into()));
        }
        if self.max_line_bytes == 0 {
            return Err(Error::Config("max_line_bytes must be positive".into()));
        }
        Ok(())
    }

    pub const fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }

    pub const fn keep_alive(&self) -> Option<Duration> {
        if self.keep_alive_secs == 0 {
            None
        } else {
            Some(Duration::from_secs(self.keep_alive_secs))
        }
    }
}

/// Artificial delays between emitted events.
///
/// They only make incremental delivery perceptible in a browser; every
/// field may be zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PacingConfig {
    /// After the upstream answers, before the `status` event.
    pub before_status_ms: u64,
    /// After the `status` event, before the first body line is read.
    pub before_body_ms: u64,
    /// Before each relayed chunk.
    pub between_chunks_ms: u64,
    /// After the closing banner, before the terminal `close`.
    pub before_close_ms: u64,
}

impl Default for PacingConfig {
    fn default() -> Self {
        Self {
            before_status_ms: 1000,
            before_body_ms: 1000,
            between_chunks_ms: 300,
            before_close_ms: 1000,
        }
    }
}

impl PacingConfig {
    /// No pacing at all.
    pub const fn none() -> Self {
        Self {
            before_status_ms: 0,
            before_body_ms: 0,
            between_chunks_ms: 0,
            before_close_ms: 0,
        }
    }

    pub const fn before_status(&self) -> Duration {
        Duration::from_millis(self.before_status_ms)
    }

    pub const fn before_body(&self) -> Duration {
        Duration::from_millis(self.before_body_ms)
    }

    pub const fn between_chunks(&self) -> Duration {
        Duration::from_millis(self.between_chunks_ms)
    }

    pub const fn before_close(&self) -> Duration {
        Duration::from_millis(self.before_close_ms)
    }
}
