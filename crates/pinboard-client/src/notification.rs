//! Change notifications for the presentation layer.

use pinboard_proto::{MessageBody, MessageId, ProtocolError};

use crate::{DisconnectReason, GroupSummary, SessionError};

/// A change to the session the presentation layer should reflect.
///
/// Notifications carry everything needed to render them; the presentation
/// layer never reads session internals.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notification {
    /// The group list changed.
    GroupsUpdated {
        /// Every known group, in first-seen order.
        groups: Vec<GroupSummary>,
    },

    /// The local user joined a group.
    Joined {
        /// Group joined.
        group: String,
    },

    /// The local user left a group.
    Left {
        /// Group left.
        group: String,
    },

    /// Another user joined a group.
    MemberAdded {
        /// Group joined.
        group: String,
        /// Name of the user.
        user: String,
    },

    /// Another user left a group.
    MemberRemoved {
        /// Group left.
        group: String,
        /// Name of the user.
        user: String,
    },

    /// A new message header is available.
    HeaderAdded {
        /// Group the message was posted to.
        group: String,
        /// Message id.
        id: MessageId,
    },

    /// The selected message's body is available.
    BodyAvailable(MessageBody),

    /// The selection in a group was cleared.
    Cleared {
        /// Group whose selection was cleared.
        group: String,
    },

    /// The connection ended. Session-ending.
    Disconnected {
        /// Why it ended.
        reason: DisconnectReason,
    },

    /// A frame from the server could not be decoded and was discarded.
    ParseWarning {
        /// The offending line (lossy UTF-8).
        frame: String,
        /// Why it was rejected.
        reason: ProtocolError,
    },

    /// A user intent was rejected locally and nothing was sent.
    IntentRejected {
        /// Why it was rejected.
        reason: SessionError,
    },

    /// The server answered a keepalive.
    Pong,
}
