//! A single protocol line.
//!
//! A `Frame` is one complete line of text with the `\n` delimiter stripped.
//! It holds raw bytes; UTF-8 validation happens when the frame is decoded
//! into a [`Command`](crate::Command) or [`Event`](crate::Event), so a
//! garbled line surfaces as a malformed message instead of a read failure.

use std::fmt;

use bytes::{BufMut, Bytes};

use crate::errors::{ProtocolError, Result};

/// One protocol line without its delimiter.
///
/// # Invariants
///
/// - The line never contains [`Frame::DELIMITER`]. Frames produced by
///   [`LineFramer`](crate::LineFramer) and by the codec uphold this; frames
///   built by hand from unvalidated input may not, and would be split in two
///   by the peer.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Frame {
    line: Bytes,
}

impl Frame {
    /// Line delimiter on the wire.
    pub const DELIMITER: u8 = b'\n';

    /// Wrap a line. The delimiter must already be stripped.
    pub fn new(line: impl Into<Bytes>) -> Self {
        Self { line: line.into() }
    }

    /// Raw line bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.line
    }

    /// Line as text.
    ///
    /// # Errors
    ///
    /// - `ProtocolError::InvalidUtf8` if the line is not UTF-8
    pub fn as_str(&self) -> Result<&str> {
        std::str::from_utf8(&self.line).map_err(|_| ProtocolError::InvalidUtf8)
    }

    /// Line length in bytes, excluding the delimiter.
    pub fn len(&self) -> usize {
        self.line.len()
    }

    /// Whether the line is empty.
    pub fn is_empty(&self) -> bool {
        self.line.is_empty()
    }

    /// Write the line followed by the delimiter.
    pub fn encode(&self, dst: &mut impl BufMut) {
        dst.put_slice(&self.line);
        dst.put_u8(Self::DELIMITER);
    }

    /// Wire bytes including the delimiter.
    pub fn to_wire(&self) -> Vec<u8> {
        let mut wire = Vec::with_capacity(self.line.len() + 1);
        self.encode(&mut wire);
        wire
    }
}

impl fmt::Debug for Frame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Frame").field(&String::from_utf8_lossy(&self.line)).finish()
    }
}

impl fmt::Display for Frame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&String::from_utf8_lossy(&self.line))
    }
}

impl From<&'static str> for Frame {
    fn from(line: &'static str) -> Self {
        Self::new(line)
    }
}

impl From<String> for Frame {
    fn from(line: String) -> Self {
        Self::new(line)
    }
}
