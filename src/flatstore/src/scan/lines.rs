//! Line reassembly across chunk boundaries.

use bytes::{Bytes, BytesMut};
use tracing::warn;

use crate::config::DEFAULT_MAX_LINE_BYTES;

/// Carry-over buffer for a single scan.
///
/// Invariant: the carried fragment never contains a newline and never grows
/// past `max_line_bytes` plus one chunk. A line longer than the limit is
/// dropped whole, up to and including its newline.
#[derive(Debug)]
pub struct LineAssembler {
    carry: BytesMut,
    max_line_bytes: usize,
    /// Inside an oversized line; skip input until the next newline.
    discarding: bool,
}

impl Default for LineAssembler {
    fn default() -> Self {
        Self::with_max_line_bytes(DEFAULT_MAX_LINE_BYTES)
    }
}

impl LineAssembler {
    /// Create an assembler with the default line limit.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an assembler that drops lines longer than `max_line_bytes`.
    pub fn with_max_line_bytes(max_line_bytes: usize) -> Self {
        Self {
            carry: BytesMut::new(),
            max_line_bytes: max_line_bytes.max(1),
            discarding: false,
        }
    }

    /// Append a chunk and take every line it completes.
    ///
    /// Returns the completed lines as one block ending in `\n`, or `None`
    /// when the chunk completes no line. The fragment after the last
    /// newline stays carried.
    pub fn push(&mut self, chunk: &[u8]) -> Option<Bytes> {
        let mut chunk = chunk;
        if self.discarding {
            let end = chunk.iter().position(|&b| b == b'\n')?;
            self.discarding = false;
            chunk = &chunk[end + 1..];
        }

        let searched = self.carry.len();
        self.carry.extend_from_slice(chunk);

        let block = self.carry[searched..]
            .iter()
            .rposition(|&b| b == b'\n')
            .map(|pos| self.carry.split_to(searched + pos + 1).freeze());

        if self.carry.len() > self.max_line_bytes {
            warn!(
                bytes = self.carry.len(),
                limit = self.max_line_bytes,
                "line exceeds maximum length, dropping it"
            );
            self.carry.clear();
            self.discarding = true;
        }
        block
    }

    /// The incomplete fragment currently carried.
    pub fn pending(&self) -> &[u8] {
        &self.carry
    }
}

/// Split a block returned by [`LineAssembler::push`] into lines, without
/// terminators (`\n` or `\r\n`).
pub fn complete_lines(block: &[u8]) -> impl Iterator<Item = &[u8]> {
    let block = block.strip_suffix(b"\n").unwrap_or(block);
    block
        .split(|&b| b == b'\n')
        .map(|line| line.strip_suffix(b"\r").unwrap_or(line))
}
