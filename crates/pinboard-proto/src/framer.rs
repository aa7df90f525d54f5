//! Stream-to-frame splitting.

use bytes::BytesMut;

use crate::Frame;

/// Accumulates stream bytes and yields complete lines.
///
/// Owned by exactly one reader. Partial data stays in the internal buffer
/// until its delimiter arrives and is never observable from outside.
///
/// # Invariants
///
/// - Feeding a byte sequence in any number of chunks yields the same frames,
///   in the same order, as feeding it in one call.
/// - No yielded frame contains the delimiter.
/// - Frame length is unbounded here. Callers that need a cap inspect
///   [`LineFramer::buffered_len`] after each feed.
#[derive(Debug, Default)]
pub struct LineFramer {
    buffer: BytesMut,
}

impl LineFramer {
    /// Create an empty framer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `bytes` and extract every complete frame, in arrival order.
    pub fn feed(&mut self, bytes: &[u8]) -> Vec<Frame> {
        // Bytes already buffered were scanned by the previous call
        let mut scan_from = self.buffer.len();
        self.buffer.extend_from_slice(bytes);

        let mut frames = Vec::new();
        while let Some(offset) =
            self.buffer[scan_from..].iter().position(|&b| b == Frame::DELIMITER)
        {
            let end = scan_from + offset;
            let mut line = self.buffer.split_to(end + 1);
            line.truncate(end);
            frames.push(Frame::new(line.freeze()));
            scan_from = 0;
        }

        frames
    }

    /// Bytes of the pending partial frame.
    pub fn buffered_len(&self) -> usize {
        self.buffer.len()
    }
}
