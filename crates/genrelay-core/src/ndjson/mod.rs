//! NDJSON reader for streaming generation responses.
//!
//! The upstream body arrives in arbitrary byte chunks; [`LineFramer`] turns
//! them into complete lines and [`parse_line`] decodes each line into an
//! [`UpstreamChunk`], implementing a tolerant reader pattern.

mod framer;
mod parser;
mod types;

pub use framer::LineFramer;
pub use parser::{is_blank, parse_line, parse_value};
pub use types::*;
