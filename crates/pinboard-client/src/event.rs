//! Session events and actions.

use pinboard_proto::{Command, Frame, MessageId};

use crate::{DisconnectReason, Notification};

/// Events the caller feeds into the session.
///
/// The caller is responsible for:
/// - Receiving frames from the transport, in arrival order
/// - Reporting connection loss
/// - Forwarding user intents
///
/// Frames and intents must be fed through one serialization point so no two
/// events are applied concurrently.
#[derive(Debug, Clone)]
pub enum SessionEvent {
    /// Frame received from the server.
    FrameReceived(Frame),

    /// The transport reported the connection closed.
    Disconnected {
        /// Why it closed.
        reason: DisconnectReason,
    },

    /// User wants the group list.
    RequestGroupList,

    /// User wants to join a group.
    RequestJoin {
        /// Group to join.
        group: String,
    },

    /// User wants to leave a group.
    RequestLeave {
        /// Group to leave.
        group: String,
    },

    /// User wants to post a message.
    RequestPost {
        /// Target group.
        group: String,
        /// Message subject. Must be non-empty.
        subject: String,
        /// Message content. Must be non-empty.
        content: String,
    },

    /// User selected a message to view, or cleared the selection.
    SelectMessage {
        /// Group the message belongs to.
        group: String,
        /// Message to view. `None` clears the selection.
        id: Option<MessageId>,
    },

    /// User wants a keepalive round trip.
    Ping,

    /// User is leaving. The caller tears down the transport afterwards.
    Exit,
}

/// Actions the session produces for the caller to execute.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionAction {
    /// Send a command to the server.
    Send(Command),

    /// Deliver a notification to the presentation layer.
    Notify(Notification),
}
