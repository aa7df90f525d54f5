//! Why a connection ended.

use thiserror::Error;

/// Cause of a connection teardown, reported exactly once per connection.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DisconnectReason {
    /// `disconnect()` was called locally.
    #[error("closed locally")]
    Local,
    /// The server closed the stream (zero-length read).
    #[error("closed by server")]
    PeerClosed,
    /// Reading from the socket failed.
    #[error("read failed: {0}")]
    ReadFailed(String),
    /// Writing to the socket failed.
    #[error("write failed: {0}")]
    WriteFailed(String),
    /// A single frame grew past the configured cap.
    #[error("frame exceeded {limit} bytes")]
    FrameTooLong {
        /// Configured cap in bytes.
        limit: usize,
    },
}

impl DisconnectReason {
    /// Whether the connection ended because something went wrong, as opposed
    /// to an orderly close by either side.
    pub fn is_failure(&self) -> bool {
        matches!(self, Self::ReadFailed(_) | Self::WriteFailed(_) | Self::FrameTooLong { .. })
    }
}
