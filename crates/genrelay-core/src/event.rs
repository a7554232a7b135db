//! Outbound events delivered to the subscribed client.
//!
//! A relay session emits these in order; position in the sequence is the
//! only identity an event has. `close` is terminal and carries no payload.

use std::fmt;

/// Banner emitted before the upstream is contacted.
pub const START_BANNER: &str = "Starting event stream<br>";

/// Banner emitted right before the terminal `close` event.
pub const CLOSING_BANNER: &str = "<br> closing stream <br>";

/// The three event names a client can observe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    Message,
    Status,
    Close,
}

impl EventKind {
    /// Wire name used in the SSE `event:` field.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Message => "message",
            Self::Status => "status",
            Self::Close => "close",
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single client-visible event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutboundEvent {
    pub kind: EventKind,
    pub payload: String,
}

impl OutboundEvent {
    pub fn message(payload: impl Into<String>) -> Self {
        Self {
            kind: EventKind::Message,
            payload: payload.into(),
        }
    }

    pub fn status(payload: impl Into<String>) -> Self {
        Self {
            kind: EventKind::Status,
            payload: payload.into(),
        }
    }

    /// The terminal event. Always has an empty payload.
    pub const fn close() -> Self {
        Self {
            kind: EventKind::Close,
            payload: String::new(),
        }
    }

    /// `status` event reporting the upstream HTTP status code.
    pub fn upstream_status(code: u16) -> Self {
        Self::status(format!("HTTP Status Code: {code}<br>"))
    }

    pub const fn is_terminal(&self) -> bool {
        matches!(self.kind, EventKind::Close)
    }

    /// Payload with bare `\r` and `\r\n` folded into `\n`.
    ///
    /// SSE only treats `\n` as a `data:` line separator once the payload is
    /// split by the framing layer, and carriage returns are rejected there.
    pub fn sse_payload(&self) -> String {
        if self.payload.contains('\r') {
            self.payload.replace("\r\n", "\n").replace('\r', "\n")
        } else {
            self.payload.clone()
        }
    }
}
