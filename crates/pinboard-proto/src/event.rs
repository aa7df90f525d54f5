//! Inbound messages (server to client).

use crate::{
    Frame, MessageId, PostDate, Verb,
    errors::{ProtocolError, Result},
    fields,
};

/// Full content of a posted message, as returned by `VIEW`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MessageBody {
    /// Group the message was posted to.
    pub group: String,
    /// Server-assigned id.
    pub id: MessageId,
    /// Display name of the poster.
    pub sender: String,
    /// When the message was posted.
    pub posted_at: PostDate,
    /// Message subject.
    pub subject: String,
    /// Message content.
    pub content: String,
}

/// A message the server sends to the client.
///
/// | Verb    | Fields                                        |
/// |---------|-----------------------------------------------|
/// | GROUPS  | g1, g2, ... (variadic, possibly none)         |
/// | JOIN    | group, name                                   |
/// | LEAVE   | group, name                                   |
/// | MESSAGE | group, id                                     |
/// | VIEW    | group, id, sender, postDate, subject, content |
/// | PING    | (none)                                        |
///
/// Decoding is total: any frame either yields an `Event` or a
/// [`ProtocolError`]. It never panics.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    /// Full list of groups on the server.
    GroupsList {
        /// Group names in server order.
        groups: Vec<String>,
    },
    /// A user joined a group (possibly the local user).
    UserJoined {
        /// Group joined.
        group: String,
        /// Name of the user.
        user: String,
    },
    /// A user left a group (possibly the local user).
    UserLeft {
        /// Group left.
        group: String,
        /// Name of the user.
        user: String,
    },
    /// A message header: the id of a new message, without its body.
    MessagePosted {
        /// Group the message was posted to.
        group: String,
        /// Server-assigned id.
        id: MessageId,
    },
    /// A message body in response to `VIEW`.
    MessageBody(MessageBody),
    /// Keepalive echo.
    Ping,
}

impl Event {
    /// Verb this event encodes to.
    pub fn verb(&self) -> Verb {
        match self {
            Self::GroupsList { .. } => Verb::Groups,
            Self::UserJoined { .. } => Verb::Join,
            Self::UserLeft { .. } => Verb::Leave,
            Self::MessagePosted { .. } => Verb::Message,
            Self::MessageBody(_) => Verb::View,
            Self::Ping => Verb::Ping,
        }
    }

    /// Group this event refers to, if any.
    pub fn group(&self) -> Option<&str> {
        match self {
            Self::UserJoined { group, .. }
            | Self::UserLeft { group, .. }
            | Self::MessagePosted { group, .. } => Some(group),
            Self::MessageBody(body) => Some(&body.group),
            Self::GroupsList { .. } | Self::Ping => None,
        }
    }

    /// Decode a frame sent by the server.
    ///
    /// # Errors
    ///
    /// - `ProtocolError::EmptyFrame` / `InvalidUtf8` for unreadable lines
    /// - `ProtocolError::UnknownVerb` for unrecognized or client-only verbs
    /// - `ProtocolError::FieldCount` / `EmptyField` for bad field layouts
    /// - `ProtocolError::InvalidMessageId` / `InvalidPostDate` for bad values
    pub fn decode(frame: &Frame) -> Result<Self> {
        let (verb_str, rest) = fields::split(frame)?;
        let Some(verb) = Verb::parse(verb_str) else {
            return Err(ProtocolError::UnknownVerb { verb: verb_str.to_string() });
        };

        match verb {
            Verb::Groups => {
                let groups = rest
                    .iter()
                    .map(|group| fields::required(verb, "group", group).map(str::to_string))
                    .collect::<Result<Vec<_>>>()?;
                Ok(Self::GroupsList { groups })
            },
            Verb::Join => {
                let (group, user) = Self::decode_membership(verb, &rest)?;
                Ok(Self::UserJoined { group, user })
            },
            Verb::Leave => {
                let (group, user) = Self::decode_membership(verb, &rest)?;
                Ok(Self::UserLeft { group, user })
            },
            Verb::Message => {
                let [group, id] = fields::exact(verb, &rest)?;
                Ok(Self::MessagePosted {
                    group: fields::required(verb, "group", group)?.to_string(),
                    id: MessageId::parse(id)?,
                })
            },
            Verb::View => {
                let [group, id, sender, posted_at, subject, content] =
                    fields::exact(verb, &rest)?;
                Ok(Self::MessageBody(MessageBody {
                    group: fields::required(verb, "group", group)?.to_string(),
                    id: MessageId::parse(id)?,
                    sender: sender.to_string(),
                    posted_at: PostDate::parse(posted_at)?,
                    subject: subject.to_string(),
                    content: content.to_string(),
                }))
            },
            Verb::Ping => {
                fields::exact::<0>(verb, &rest)?;
                Ok(Self::Ping)
            },
            Verb::Post | Verb::Exit => {
                Err(ProtocolError::UnknownVerb { verb: verb_str.to_string() })
            },
        }
    }

    /// Encode into a frame (no delimiter).
    ///
    /// Servers and test peers use this; the client only decodes events.
    pub fn to_frame(&self) -> Frame {
        let verb = self.verb();
        match self {
            Self::GroupsList { groups } => {
                let groups: Vec<&str> = groups.iter().map(String::as_str).collect();
                fields::frame(verb, &groups)
            },
            Self::UserJoined { group, user } | Self::UserLeft { group, user } => {
                fields::frame(verb, &[group.as_str(), user.as_str()])
            },
            Self::MessagePosted { group, id } => {
                let id = id.to_string();
                fields::frame(verb, &[group.as_str(), id.as_str()])
            },
            Self::MessageBody(body) => {
                let id = body.id.to_string();
                fields::frame(verb, &[
                    body.group.as_str(),
                    id.as_str(),
                    body.sender.as_str(),
                    body.posted_at.as_str(),
                    body.subject.as_str(),
                    body.content.as_str(),
                ])
            },
            Self::Ping => fields::frame(verb, &[]),
        }
    }

    fn decode_membership(verb: Verb, rest: &[&str]) -> Result<(String, String)> {
        let [group, user] = fields::exact(verb, rest)?;
        Ok((
            fields::required(verb, "group", group)?.to_string(),
            fields::required(verb, "name", user)?.to_string(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn decode(line: &'static str) -> Result<Event> {
        Event::decode(&Frame::from(line))
    }

    #[test]
    fn view_decodes_to_typed_body() {
        let event = decode("VIEW|General|7|alice|2024-01-01T10:00:00|Hi|there").unwrap();

        let Event::MessageBody(body) = event else {
            panic!("expected MessageBody, got {event:?}");
        };
        assert_eq!(body.group, "General");
        assert_eq!(body.id, MessageId(7));
        assert_eq!(body.sender, "alice");
        assert_eq!(body.posted_at.as_str(), "2024-01-01T10:00:00");
        assert_eq!(body.subject, "Hi");
        assert_eq!(body.content, "there");
    }

    #[test]
    fn groups_list_is_variadic() {
        assert_eq!(decode("GROUPS"), Ok(Event::GroupsList { groups: vec![] }));
        assert_eq!(
            decode("GROUPS|Public|Sports"),
            Ok(Event::GroupsList { groups: vec!["Public".into(), "Sports".into()] })
        );
        assert_eq!(
            decode("GROUPS|Public|"),
            Err(ProtocolError::EmptyField { verb: "GROUPS", field: "group" })
        );
    }

    #[test]
    fn unknown_verb_is_malformed() {
        assert_eq!(decode("GARBAGE"), Err(ProtocolError::UnknownVerb { verb: "GARBAGE".into() }));
        assert!(matches!(decode("POST|Public|a|b"), Err(ProtocolError::UnknownVerb { .. })));
        assert_eq!(decode(""), Err(ProtocolError::EmptyFrame));
    }

    #[test]
    fn wrong_field_count_is_malformed() {
        assert_eq!(
            decode("LEAVE|Public"),
            Err(ProtocolError::FieldCount { verb: "LEAVE", expected: 2, actual: 1 })
        );
        // No escaping: a pipe inside content shifts every later field
        assert_eq!(
            decode("VIEW|Public|3|bob|2024-02-02T08:00:00|Hello|Wor|ld"),
            Err(ProtocolError::FieldCount { verb: "VIEW", expected: 6, actual: 7 })
        );
    }

    #[test]
    fn bad_values_are_malformed() {
        assert!(matches!(
            decode("MESSAGE|Public|seven"),
            Err(ProtocolError::InvalidMessageId { .. })
        ));
        assert!(matches!(
            decode("VIEW|Public|3|bob|yesterday|Hello|World"),
            Err(ProtocolError::InvalidPostDate { .. })
        ));
    }

    #[test]
    fn body_encoding_preserves_wire_text() {
        let line = "VIEW|Public|3|bob|2024-02-02T08:00:00Z|Hello|World";
        let event = decode(line).unwrap();
        assert_eq!(event.to_frame(), Frame::from(line));
    }
}
