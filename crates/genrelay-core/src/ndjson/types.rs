//! Chunk types for the streaming generation protocol.

/// One decoded upstream line.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UpstreamChunk {
    /// Text fragment to relay. Empty when the line carried none.
    pub response: String,
    /// Set on the last chunk of a generation.
    pub done: bool,
    /// Error string reported in-band by the upstream, if any.
    pub error: Option<String>,
    /// Summary fields present on the final chunk.
    pub stats: Option<GenerationStats>,
}

/// Metadata the upstream attaches to its final chunk.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GenerationStats {
    pub model: Option<String>,
    pub done_reason: Option<String>,
    /// Number of generated tokens.
    pub eval_count: Option<u64>,
    /// Wall time of the whole generation in nanoseconds.
    pub total_duration: Option<u64>,
}

impl GenerationStats {
    pub const fn is_empty(&self) -> bool {
        self.model.is_none()
            && self.done_reason.is_none()
            && self.eval_count.is_none()
            && self.total_duration.is_none()
    }
}
