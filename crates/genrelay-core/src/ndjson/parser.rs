//! NDJSON parser for streaming generation chunks.
//!
//! Implements tolerant reader pattern: unknown fields ignored, missing
//! `response` / `done` fall back to `""` / `false`.

use serde_json::Value;

use super::types::{GenerationStats, UpstreamChunk};
use crate::error::{Error, Result};

/// `true` when the line holds nothing but (Unicode) whitespace.
///
/// Invalid UTF-8 is never blank; it is left for [`parse_line`] to reject.
pub fn is_blank(line: &[u8]) -> bool {
    std::str::from_utf8(line).is_ok_and(|text| text.trim().is_empty())
}

/// Parse a single NDJSON line from the upstream body.
pub fn parse_line(line: &[u8]) -> Result<UpstreamChunk> {
    let text = std::str::from_utf8(line)
        .map_err(|e| Error::NdjsonParse(format!("invalid UTF-8: {e}")))?;
    let raw: Value = serde_json::from_str(text)?;
    parse_value(&raw)
}

/// Parse a JSON value into a chunk.
pub fn parse_value(raw: &Value) -> Result<UpstreamChunk> {
    if !raw.is_object() {
        return Err(Error::NdjsonParse("Expected a JSON object".into()));
    }

    let response = raw
        .get("response")
        .and_then(|v| v.as_str())
        .unwrap_or("")
        .to_string();

    let done = raw.get("done").and_then(Value::as_bool).unwrap_or(false);

    let error = raw
        .get("error")
        .and_then(|v| v.as_str())
        .map(String::from);

    let stats = GenerationStats {
        model: raw.get("model").and_then(|v| v.as_str()).map(String::from),
        done_reason: raw
            .get("done_reason")
            .and_then(|v| v.as_str())
            .map(String::from),
        eval_count: raw.get("eval_count").and_then(Value::as_u64),
        total_duration: raw.get("total_duration").and_then(Value::as_u64),
    };

    Ok(UpstreamChunk {
        response,
        done,
        error,
        stats: (done && !stats.is_empty()).then_some(stats),
    })
}
