//! Relay module: bridges one upstream generation stream to one client.
//!
//! This is the "glue" that connects:
//! - `Upstream` (streaming POST, raw body chunks)
//! - `genrelay_core::ndjson` (line framing, chunk decoding)
//! - the outbound `OutboundEvent` sequence consumed by the SSE route

mod observer;
mod pipeline;
mod types;

pub use observer::{RelayObserver, SessionOutcome, TracingObserver};
pub use pipeline::StreamRelay;
pub use types::{failure_event, EventStream, RelayOptions};
