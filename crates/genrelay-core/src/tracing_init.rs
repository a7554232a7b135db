//! Tracing/logging initialization for the relay binary.
//!
//! One subscriber per process: an `EnvFilter` (overridable through
//! `RUST_LOG`) plus either the human-readable or the JSON fmt layer.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::error::{Error, Result};

/// Crates whose spans and events are enabled at `log_level` by default.
const LOG_TARGETS: &[&str] = &["genrelay_server", "genrelay_core", "tower_http"];

/// Build the default filter directive for the given level, e.g.
/// `"genrelay_server=info,genrelay_core=info,tower_http=info"`.
pub fn default_filter(log_level: &str) -> String {
    LOG_TARGETS
        .iter()
        .map(|target| format!("{target}={log_level}"))
        .collect::<Vec<_>>()
        .join(",")
}

/// Initialise the global tracing subscriber.
///
/// * `log_level` -- level applied to the relay's own targets when `RUST_LOG`
///   is not set (e.g. `"info"`).
/// * `log_json` -- when `true`, emit structured JSON log lines instead of the
///   human-readable format.
///
/// Fails if a global subscriber is already installed.
pub fn init_tracing(log_level: &str, log_json: bool) -> Result<()> {
    let env_filter = tracing_subscriber::EnvFilter::new(
        std::env::var("RUST_LOG").unwrap_or_else(|_| default_filter(log_level)),
    );
    let registry = tracing_subscriber::registry().with(env_filter);
    let installed = if log_json {
        registry
            .with(tracing_subscriber::fmt::layer().json())
            .try_init()
    } else {
        registry.with(tracing_subscriber::fmt::layer()).try_init()
    };
    installed.map_err(|e| Error::Config(format!("tracing already initialised: {e}")))
}
