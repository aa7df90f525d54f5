//! Runtime inbox messages.

use pinboard_client::{DisconnectReason, Frame, SessionEvent};

/// Everything the [`Runtime`](crate::Runtime) reacts to, in one stream.
///
/// The transport's receive task produces `Frame` and `Disconnected`;
/// [`ClientHandle`](crate::ClientHandle) produces `Intent`. Funneling all
/// three through one channel gives a single total order.
#[derive(Debug, Clone)]
pub enum Input {
    /// Frame from the server.
    Frame(Frame),
    /// The connection closed. Always the last input the runtime handles.
    Disconnected(DisconnectReason),
    /// User intent.
    Intent(SessionEvent),
}
