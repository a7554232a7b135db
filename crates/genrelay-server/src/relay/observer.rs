//! Observability hook for relay sessions.
//!
//! Failures that are not surfaced to the client (malformed lines, client
//! disconnects) still have to be visible to operators. The relay reports
//! them through a [`RelayObserver`]; [`TracingObserver`] logs them.

use tracing::{debug, info, warn};

use genrelay_core::ndjson::GenerationStats;

use crate::upstream::UpstreamError;

/// How a session ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionOutcome {
    /// The body ended or a `done` chunk arrived.
    Completed,
    /// Connecting or reading the body failed.
    UpstreamFailed,
    /// The event stream was dropped before the terminal event.
    ClientDisconnected,
}

impl SessionOutcome {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Completed => "completed",
            Self::UpstreamFailed => "upstream_failed",
            Self::ClientDisconnected => "client_disconnected",
        }
    }
}

/// Callbacks invoked by a relay session. All methods default to no-ops.
pub trait RelayObserver: Send + Sync {
    fn session_started(&self, _session_id: &str, _model: &str) {}

    fn upstream_status(&self, _session_id: &str, _status: u16) {}

    /// A line was dropped because it could not be decoded.
    fn malformed_line(&self, _session_id: &str, _line: &[u8], _error: &genrelay_core::Error) {}

    fn upstream_failed(&self, _session_id: &str, _error: &UpstreamError) {}

    /// The upstream reported an error inside an otherwise valid chunk.
    fn upstream_reported_error(&self, _session_id: &str, _message: &str) {}

    fn chunk_relayed(&self, _session_id: &str, _fragment: &str) {}

    fn generation_finished(&self, _session_id: &str, _stats: Option<&GenerationStats>) {}

    /// Bytes of an unterminated trailing line were discarded at end of body.
    fn partial_line_discarded(&self, _session_id: &str, _bytes: usize) {}

    fn session_ended(&self, _session_id: &str, _outcome: SessionOutcome, _chunks: usize) {}
}

/// Logs every callback through `tracing`.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingObserver;

/// Longest prefix of a malformed line copied into the log.
const LOG_LINE_PREVIEW: usize = 200;

impl RelayObserver for TracingObserver {
    fn session_started(&self, session_id: &str, model: &str) {
        info!(session_id, model, "Relay session started");
    }

    fn upstream_status(&self, session_id: &str, status: u16) {
        if (200..300).contains(&status) {
            debug!(session_id, status, "Upstream responded");
        } else {
            warn!(session_id, status, "Upstream responded with non-success status");
        }
    }

    fn malformed_line(&self, session_id: &str, line: &[u8], error: &genrelay_core::Error) {
        let preview = String::from_utf8_lossy(&line[..line.len().min(LOG_LINE_PREVIEW)]);
        warn!(session_id, error = %error, line = %preview, "Could not decode upstream line");
    }

    fn upstream_failed(&self, session_id: &str, error: &UpstreamError) {
        warn!(session_id, error = %error, "Upstream failed");
    }

    fn upstream_reported_error(&self, session_id: &str, message: &str) {
        warn!(session_id, upstream_error = message, "Upstream reported an error");
    }

    fn chunk_relayed(&self, session_id: &str, fragment: &str) {
        debug!(session_id, chunk = ?fragment, "chunk");
    }

    fn generation_finished(&self, session_id: &str, stats: Option<&GenerationStats>) {
        match stats {
            Some(stats) => info!(
                session_id,
                model = stats.model.as_deref().unwrap_or(""),
                done_reason = stats.done_reason.as_deref().unwrap_or(""),
                eval_count = stats.eval_count.unwrap_or(0),
                total_duration_ms = stats.total_duration.unwrap_or(0) / 1_000_000,
                "Generation finished"
            ),
            None => info!(session_id, "Generation finished"),
        }
    }

    fn partial_line_discarded(&self, session_id: &str, bytes: usize) {
        debug!(session_id, bytes, "Discarded unterminated trailing line");
    }

    fn session_ended(&self, session_id: &str, outcome: SessionOutcome, chunks: usize) {
        info!(session_id, outcome = outcome.as_str(), chunks, "Relay session ended");
    }
}
