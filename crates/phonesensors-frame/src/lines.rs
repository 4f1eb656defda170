use bytes::{Bytes, BytesMut};
use tracing::debug;

use crate::error::{FrameError, Result};

/// Line terminator of the wire format.
pub const TERMINATOR: u8 = b'\n';

/// Default maximum length of a single line: 1 MiB.
pub const DEFAULT_MAX_LINE_LEN: usize = 1024 * 1024;

const INITIAL_BUFFER_CAPACITY: usize = 8 * 1024;

/// Splits a byte stream into complete lines, carrying the unterminated tail
/// across calls.
///
/// After every [`push`](Self::push) the carried-over buffer holds no
/// terminator. Works on bytes rather than text, so a UTF-8 sequence split
/// across two reads is reassembled before anything decodes it.
#[derive(Debug)]
pub struct LineBuffer {
    buf: BytesMut,
    // Bytes of `buf` already known to hold no terminator.
    scanned: usize,
    max_line_len: usize,
    // Length dropped so far of a line that overflowed `max_line_len`.
    discarding: Option<usize>,
}

impl LineBuffer {
    /// Create a line buffer with the default maximum line length.
    pub fn new() -> Self {
        Self::with_max_line_len(DEFAULT_MAX_LINE_LEN)
    }

    /// Create a line buffer with an explicit maximum line length.
    pub fn with_max_line_len(max_line_len: usize) -> Self {
        Self {
            buf: BytesMut::with_capacity(INITIAL_BUFFER_CAPACITY),
            scanned: 0,
            max_line_len,
            discarding: None,
        }
    }

    /// Append `chunk` and return every line it completes, terminators stripped.
    ///
    /// A line longer than the maximum is reported once, as `Err(LineTooLong)`,
    /// in the call that terminates it. Its bytes are not kept while it is
    /// still arriving.
    pub fn push(&mut self, chunk: &[u8]) -> Vec<Result<Bytes>> {
        self.buf.extend_from_slice(chunk);

        let mut lines = Vec::new();
        while let Some(offset) = self.buf[self.scanned..]
            .iter()
            .position(|b| *b == TERMINATOR)
        {
            let end = self.scanned + offset;
            let mut line = self.buf.split_to(end + 1);
            line.truncate(end);
            self.scanned = 0;

            let size = self.discarding.take().unwrap_or(0) + line.len();
            if size > self.max_line_len {
                lines.push(Err(FrameError::LineTooLong {
                    size,
                    max: self.max_line_len,
                }));
            } else {
                lines.push(Ok(line.freeze()));
            }
        }
        self.scanned = self.buf.len();

        if let Some(dropped) = self.discarding.as_mut() {
            *dropped += self.buf.len();
            self.clear_pending();
        } else if self.buf.len() > self.max_line_len {
            debug!(
                size = self.buf.len(),
                max = self.max_line_len,
                "line exceeds maximum length, discarding"
            );
            self.discarding = Some(self.buf.len());
            self.clear_pending();
        }

        lines
    }

    /// The carried-over, unterminated input.
    pub fn pending(&self) -> &[u8] {
        &self.buf
    }

    /// Number of carried-over bytes.
    pub fn pending_len(&self) -> usize {
        self.buf.len()
    }

    /// Maximum accepted line length.
    pub fn max_line_len(&self) -> usize {
        self.max_line_len
    }

    /// Drop all carried-over input, including an oversize line in progress.
    pub fn clear(&mut self) {
        self.clear_pending();
        self.discarding = None;
    }

    fn clear_pending(&mut self) {
        self.buf.clear();
        self.scanned = 0;
    }
}

impl Default for LineBuffer {
    fn default() -> Self {
        Self::new()
    }
}
