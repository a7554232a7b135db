//! genrelay
//!
//! Serves a demo page and an SSE endpoint that relays a local streaming
//! generation API to the browser.

use std::net::SocketAddr;
use std::sync::Arc;

use clap::Parser;
use tracing::{info, warn};

use genrelay_core::{PacingConfig, RelayConfig};
use genrelay_server::relay::{RelayOptions, StreamRelay};
use genrelay_server::routes::{build_router, AppState};
use genrelay_server::upstream::HttpUpstream;

#[derive(Parser, Debug)]
#[command(name = "genrelay")]
#[command(version, about = "Relay a streaming generation API over server-sent events")]
struct Args {
    /// Listen address
    #[arg(long, default_value = "127.0.0.1:8000", env = "GENRELAY_ADDR")]
    addr: SocketAddr,

    /// Generation endpoint receiving the streaming POST
    #[arg(
        long,
        default_value = "http://localhost:11434/api/generate",
        env = "GENRELAY_UPSTREAM_URL"
    )]
    upstream_url: String,

    /// Model requested from the upstream unless the client names one
    #[arg(long, default_value = "llama3.2", env = "GENRELAY_MODEL")]
    model: String,

    /// Prompt sent upstream unless the client passes `?prompt=`
    #[arg(
        long,
        default_value = "What is the capital of France?",
        env = "GENRELAY_PROMPT"
    )]
    prompt: String,

    /// Longest accepted upstream line in bytes
    #[arg(long, default_value_t = 1024 * 1024, env = "GENRELAY_MAX_LINE_BYTES")]
    max_line_bytes: usize,

    /// Seconds allowed for connecting to the upstream
    #[arg(long, default_value_t = 10, env = "GENRELAY_CONNECT_TIMEOUT")]
    connect_timeout: u64,

    /// Seconds between SSE keep-alive comments (0 disables them)
    #[arg(long, default_value_t = 15, env = "GENRELAY_KEEP_ALIVE")]
    keep_alive: u64,

    /// Delay before the status event (ms)
    #[arg(long, default_value_t = 1000, env = "GENRELAY_PACE_STATUS_MS")]
    pace_status_ms: u64,

    /// Delay between the status event and the first body read (ms)
    #[arg(long, default_value_t = 1000, env = "GENRELAY_PACE_BODY_MS")]
    pace_body_ms: u64,

    /// Delay before each relayed chunk (ms)
    #[arg(long, default_value_t = 300, env = "GENRELAY_PACE_CHUNK_MS")]
    pace_chunk_ms: u64,

    /// Delay before the terminal close event (ms)
    #[arg(long, default_value_t = 1000, env = "GENRELAY_PACE_CLOSE_MS")]
    pace_close_ms: u64,

    /// Disable all pacing delays
    #[arg(long, env = "GENRELAY_NO_PACING")]
    no_pacing: bool,

    /// Log level filter (e.g. "info", "debug", "warn").
    #[arg(long, default_value = "info", env = "GENRELAY_LOG_LEVEL")]
    log_level: String,

    /// Output logs as JSON (for structured log aggregation).
    #[arg(long, env = "GENRELAY_LOG_JSON")]
    log_json: bool,
}

impl Args {
    fn relay_config(&self) -> RelayConfig {
        let pacing = if self.no_pacing {
            PacingConfig::none()
        } else {
            PacingConfig {
                before_status_ms: self.pace_status_ms,
                before_body_ms: self.pace_body_ms,
                between_chunks_ms: self.pace_chunk_ms,
                before_close_ms: self.pace_close_ms,
            }
        };
        RelayConfig {
            upstream_url: self.upstream_url.clone(),
            model: self.model.clone(),
            prompt: self.prompt.clone(),
            max_line_bytes: self.max_line_bytes,
            connect_timeout_secs: self.connect_timeout,
            keep_alive_secs: self.keep_alive,
            pacing,
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    genrelay_core::tracing_init::init_tracing(&args.log_level, args.log_json)?;

    let config = args.relay_config();
    config.validate()?;

    info!(
        version = env!("CARGO_PKG_VERSION"),
        addr = %args.addr,
        upstream = %config.upstream_url,
        model = %config.model,
        "Starting genrelay"
    );

    let upstream = HttpUpstream::new(&config)?;
    let relay = StreamRelay::new(Arc::new(upstream), RelayOptions::from(&config));
    let app = build_router(AppState::new(relay, &config));

    let listener = tokio::net::TcpListener::bind(args.addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("genrelay stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "Failed to listen for Ctrl-C");
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_produce_valid_config() {
        let args = Args::parse_from(["genrelay"]);
        let config = args.relay_config();
        assert!(config.validate().is_ok());
        assert_eq!(config, RelayConfig::default());
    }

    #[test]
    fn no_pacing_zeroes_every_delay() {
        let args = Args::parse_from(["genrelay", "--no-pacing", "--pace-chunk-ms", "50"]);
        assert_eq!(args.relay_config().pacing, PacingConfig::none());
    }
}
