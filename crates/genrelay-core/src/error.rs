//! Error types for the `genrelay` core library.

use thiserror::Error;

/// Result type alias using the core `Error`.
pub type Result<T> = std::result::Result<T, Error>;

/// Core error types for `genrelay` operations.
#[derive(Debug, Error)]
pub enum Error {
    /// NDJSON line could not be decoded into a chunk
    #[error("Failed to parse NDJSON: {0}")]
    NdjsonParse(String),

    /// A single upstream line exceeded the configured limit
    #[error("Line exceeds {limit} bytes")]
    LineTooLong { limit: usize },

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
