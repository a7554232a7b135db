use std::convert::Infallible;
use std::time::Duration;

use axum::extract::{Query, State};
use axum::response::sse::{Event, KeepAlive, Sse};
use axum::response::{Html, IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use futures_util::StreamExt;
use serde::Deserialize;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use genrelay_core::{OutboundEvent, RelayConfig};

use crate::relay::StreamRelay;
use crate::upstream::GenerateRequest;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub relay: StreamRelay,
    /// Model used when the request does not name one.
    pub model: String,
    /// Prompt used when the request does not carry one.
    pub prompt: String,
    pub keep_alive: Option<Duration>,
}

impl AppState {
    pub fn new(relay: StreamRelay, config: &RelayConfig) -> Self {
        Self {
            relay,
            model: config.model.clone(),
            prompt: config.prompt.clone(),
            keep_alive: config.keep_alive(),
        }
    }

    /// Upstream request for `query`, falling back to the configured values.
    fn generate_request(&self, query: RelayQuery) -> GenerateRequest {
        let pick = |value: Option<String>, default: &str| {
            value
                .filter(|v| !v.trim().is_empty())
                .unwrap_or_else(|| default.to_string())
        };
        GenerateRequest::new(
            pick(query.model, &self.model),
            pick(query.prompt, &self.prompt),
        )
    }
}

/// Optional overrides accepted by `GET /ai`.
#[derive(Debug, Default, Deserialize)]
pub struct RelayQuery {
    pub prompt: Option<String>,
    pub model: Option<String>,
}

const INDEX_HTML: &str = include_str!("static/index.html");

/// Build the application router.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/ai", get(ai))
        .route("/health", get(health))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// `GET /`: page that subscribes to `/ai` and renders the events.
pub async fn index() -> Html<&'static str> {
    Html(INDEX_HTML)
}

/// `GET /health`
pub async fn health() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "ok" }))
}

/// `GET /ai`: one relay session streamed as server-sent events.
pub async fn ai(State(state): State<AppState>, Query(query): Query<RelayQuery>) -> Response {
    let request = state.generate_request(query);
    let events = state
        .relay
        .relay(request)
        .map(|event| Ok::<_, Infallible>(to_sse_event(&event)));

    let sse = Sse::new(events);
    match state.keep_alive {
        Some(interval) => sse.keep_alive(KeepAlive::new().interval(interval)).into_response(),
        None => sse.into_response(),
    }
}

/// Frame an outbound event as `event: <kind>` followed by its `data:` lines.
pub fn to_sse_event(event: &OutboundEvent) -> Event {
    Event::default()
        .event(event.kind.as_str())
        .data(event.sse_payload())
}
