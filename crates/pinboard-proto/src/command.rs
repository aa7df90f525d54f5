//! Outbound messages (client to server).

use crate::{
    Frame, MessageId, Verb,
    errors::{ProtocolError, Result},
    fields,
};

/// A message the client sends to the server.
///
/// | Verb   | Fields                  |
/// |--------|-------------------------|
/// | GROUPS | (none)                  |
/// | JOIN   | group, name             |
/// | LEAVE  | group                   |
/// | POST   | group, subject, content |
/// | VIEW   | group, id               |
/// | EXIT   | (none)                  |
/// | PING   | (none)                  |
///
/// Encoding never fails. String fields must not contain `|` or `\n`; that is
/// validated by whoever builds the command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Request the group list.
    Groups,
    /// Join a group under a display name.
    Join {
        /// Group to join.
        group: String,
        /// Name to appear under.
        name: String,
    },
    /// Leave a group.
    Leave {
        /// Group to leave.
        group: String,
    },
    /// Post a message.
    Post {
        /// Target group.
        group: String,
        /// Message subject.
        subject: String,
        /// Message content.
        content: String,
    },
    /// Fetch a message body.
    View {
        /// Group the message was posted to.
        group: String,
        /// Message to fetch.
        id: MessageId,
    },
    /// Announce departure.
    Exit,
    /// Keepalive; the server echoes it.
    Ping,
}

impl Command {
    /// Verb this command encodes to.
    pub fn verb(&self) -> Verb {
        match self {
            Self::Groups => Verb::Groups,
            Self::Join { .. } => Verb::Join,
            Self::Leave { .. } => Verb::Leave,
            Self::Post { .. } => Verb::Post,
            Self::View { .. } => Verb::View,
            Self::Exit => Verb::Exit,
            Self::Ping => Verb::Ping,
        }
    }

    /// Group this command targets, if any.
    pub fn group(&self) -> Option<&str> {
        match self {
            Self::Join { group, .. }
            | Self::Leave { group }
            | Self::Post { group, .. }
            | Self::View { group, .. } => Some(group),
            Self::Groups | Self::Exit | Self::Ping => None,
        }
    }

    /// Encode into a frame (no delimiter).
    pub fn to_frame(&self) -> Frame {
        let verb = self.verb();
        match self {
            Self::Groups | Self::Exit | Self::Ping => fields::frame(verb, &[]),
            Self::Join { group, name } => fields::frame(verb, &[group.as_str(), name.as_str()]),
            Self::Leave { group } => fields::frame(verb, &[group.as_str()]),
            Self::Post { group, subject, content } => {
                fields::frame(verb, &[group.as_str(), subject.as_str(), content.as_str()])
            },
            Self::View { group, id } => {
                let id = id.to_string();
                fields::frame(verb, &[group.as_str(), id.as_str()])
            },
        }
    }

    /// Decode a frame sent by a client.
    ///
    /// Used by servers and test peers; the client itself never decodes its
    /// own commands.
    ///
    /// # Errors
    ///
    /// - `ProtocolError::UnknownVerb` for verbs a client never sends
    /// - `ProtocolError::FieldCount` / `EmptyField` for bad field layouts
    /// - `ProtocolError::InvalidMessageId` for a non-numeric VIEW id
    pub fn decode(frame: &Frame) -> Result<Self> {
        let (verb_str, rest) = fields::split(frame)?;
        let Some(verb) = Verb::parse(verb_str) else {
            return Err(ProtocolError::UnknownVerb { verb: verb_str.to_string() });
        };

        match verb {
            Verb::Groups => {
                fields::exact::<0>(verb, &rest)?;
                Ok(Self::Groups)
            },
            Verb::Join => {
                let [group, name] = fields::exact(verb, &rest)?;
                Ok(Self::Join {
                    group: fields::required(verb, "group", group)?.to_string(),
                    name: fields::required(verb, "name", name)?.to_string(),
                })
            },
            Verb::Leave => {
                let [group] = fields::exact(verb, &rest)?;
                Ok(Self::Leave { group: fields::required(verb, "group", group)?.to_string() })
            },
            Verb::Post => {
                let [group, subject, content] = fields::exact(verb, &rest)?;
                Ok(Self::Post {
                    group: fields::required(verb, "group", group)?.to_string(),
                    subject: subject.to_string(),
                    content: content.to_string(),
                })
            },
            Verb::View => {
                let [group, id] = fields::exact(verb, &rest)?;
                Ok(Self::View {
                    group: fields::required(verb, "group", group)?.to_string(),
                    id: MessageId::parse(id)?,
                })
            },
            Verb::Exit => {
                fields::exact::<0>(verb, &rest)?;
                Ok(Self::Exit)
            },
            Verb::Ping => {
                fields::exact::<0>(verb, &rest)?;
                Ok(Self::Ping)
            },
            Verb::Message => Err(ProtocolError::UnknownVerb { verb: verb_str.to_string() }),
        }
    }
}
