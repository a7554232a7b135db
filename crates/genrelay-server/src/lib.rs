//! genrelay server library
//!
//! Relays a streaming text-generation API to browsers:
//! - `upstream`: the streaming POST to the generation service
//! - `relay`: one session per client, NDJSON lines → ordered outbound events
//! - `routes`: the axum router serving the SSE endpoint and the demo page

pub mod relay;
pub mod routes;
pub mod upstream;
