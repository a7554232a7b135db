//! Relay module types.

use std::pin::Pin;
use std::sync::Arc;

use futures_util::Stream;

use genrelay_core::{OutboundEvent, PacingConfig, RelayConfig};

use super::observer::{RelayObserver, SessionOutcome};
use crate::upstream::UpstreamError;

/// Outbound events of one relay session, in emission order.
pub type EventStream = Pin<Box<dyn Stream<Item = OutboundEvent> + Send>>;

/// Per-session knobs shared by every session of a [`super::StreamRelay`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RelayOptions {
    pub pacing: PacingConfig,
    pub max_line_bytes: usize,
}

impl Default for RelayOptions {
    fn default() -> Self {
        Self::from(&RelayConfig::default())
    }
}

impl From<&RelayConfig> for RelayOptions {
    fn from(config: &RelayConfig) -> Self {
        Self {
            pacing: config.pacing,
            max_line_bytes: config.max_line_bytes,
        }
    }
}

/// Client-facing description of an upstream failure.
pub fn failure_event(error: &UpstreamError) -> OutboundEvent {
    match error {
        UpstreamError::Connect(detail) | UpstreamError::InvalidRequest(detail) => {
            OutboundEvent::status(format!("Upstream unavailable: {detail}<br>"))
        }
        UpstreamError::Transport(detail) => {
            OutboundEvent::status(format!("Upstream error: {detail}<br>"))
        }
    }
}

/// Reports the end of a session exactly once.
///
/// If the session is dropped before [`SessionGuard::finish`] runs, the
/// client went away mid-stream and the drop reports that instead.
pub(crate) struct SessionGuard {
    observer: Arc<dyn RelayObserver>,
    session_id: String,
    chunks: usize,
    finished: bool,
}

impl SessionGuard {
    pub(crate) fn new(observer: Arc<dyn RelayObserver>, session_id: String) -> Self {
        Self {
            observer,
            session_id,
            chunks: 0,
            finished: false,
        }
    }

    pub(crate) fn record_chunk(&mut self) {
        self.chunks += 1;
    }

    pub(crate) fn finish(&mut self, outcome: SessionOutcome) {
        if !self.finished {
            self.finished = true;
            self.observer
                .session_ended(&self.session_id, outcome, self.chunks);
        }
    }
}

impl Drop for SessionGuard {
    fn drop(&mut self) {
        self.finish(SessionOutcome::ClientDisconnected);
    }
}
