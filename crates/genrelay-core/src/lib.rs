//! `genrelay` Core Library
//!
//! Shared functionality for the relay server:
//! - NDJSON line framing and tolerant chunk decoding
//! - Outbound event model (`message` / `status` / `close`)
//! - Relay configuration and pacing
//! - Common error types

pub mod config;
pub mod error;
pub mod event;
pub mod ndjson;
pub mod tracing_init;

pub use config::{PacingConfig, RelayConfig};
pub use error::{Error, Result};
pub use event::{EventKind, OutboundEvent};
