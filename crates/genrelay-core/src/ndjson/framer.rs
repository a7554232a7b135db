//! Incremental line framing over an arbitrarily chunked byte stream.

use crate::error::{Error, Result};

/// Splits pushed byte chunks into `\n`-terminated lines.
///
/// Bytes still buffered when the stream ends are a partial line and are
/// never returned. Lines longer than `max_line_bytes` are reported once as
/// [`Error::LineTooLong`] and skipped up to their terminating newline.
#[derive(Debug)]
pub struct LineFramer {
    buf: Vec<u8>,
    /// Offset up to which `buf` is known to contain no newline.
    scanned: usize,
    max_line_bytes: usize,
    /// Dropping the tail of an over-long line.
    discarding: bool,
}

impl LineFramer {
    pub const fn new(max_line_bytes: usize) -> Self {
        Self {
            buf: Vec::new(),
            scanned: 0,
            max_line_bytes,
            discarding: false,
        }
    }

    /// Append a chunk of the body.
    pub fn push(&mut self, chunk: &[u8]) {
        if self.discarding {
            // Only the part after the next newline is worth keeping.
            let Some(pos) = chunk.iter().position(|&b| b == b'\n') else {
                return;
            };
            self.discarding = false;
            self.buf.extend_from_slice(&chunk[pos + 1..]);
        } else {
            self.buf.extend_from_slice(chunk);
        }
    }

    /// Next complete line, without its `\n` (and trailing `\r`).
    ///
    /// `None` means more input is needed.
    pub fn next_line(&mut self) -> Option<Result<Vec<u8>>> {
        if self.discarding {
            return None;
        }

        if let Some(rel) = self.buf[self.scanned..].iter().position(|&b| b == b'\n') {
            let end = self.scanned + rel;
            let mut line: Vec<u8> = self.buf.drain(..=end).collect();
            self.scanned = 0;
            line.pop();
            if line.last() == Some(&b'\r') {
                line.pop();
            }
            if line.len() > self.max_line_bytes {
                return Some(Err(Error::LineTooLong {
                    limit: self.max_line_bytes,
                }));
            }
            return Some(Ok(line));
        }

        // A trailing `\r` may still turn out to be part of the line ending.
        let held = self.buf.len() - usize::from(self.buf.last() == Some(&b'\r'));
        if held > self.max_line_bytes {
            self.buf.clear();
            self.scanned = 0;
            self.discarding = true;
            return Some(Err(Error::LineTooLong {
                limit: self.max_line_bytes,
            }));
        }

        self.scanned = self.buf.len();
        None
    }

    /// Bytes of an unterminated line currently held back.
    pub fn pending_bytes(&self) -> usize {
        self.buf.len()
    }
}
