//! Protocol verbs.

use std::fmt;

/// First field of every frame, selecting the message kind.
///
/// Some verbs travel in both directions with different field layouts
/// (`JOIN` carries `group, name` both ways, `VIEW` carries `group, id`
/// outbound and the full body inbound). `POST` and `EXIT` are outbound only;
/// `MESSAGE` is inbound only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Verb {
    /// Group list request / response.
    Groups,
    /// Join a group / someone joined.
    Join,
    /// Leave a group / someone left.
    Leave,
    /// Post a message.
    Post,
    /// New message header.
    Message,
    /// Fetch a message body / message body.
    View,
    /// Announce departure.
    Exit,
    /// Keepalive.
    Ping,
}

impl Verb {
    /// Wire spelling of the verb.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Groups => "GROUPS",
            Self::Join => "JOIN",
            Self::Leave => "LEAVE",
            Self::Post => "POST",
            Self::Message => "MESSAGE",
            Self::View => "VIEW",
            Self::Exit => "EXIT",
            Self::Ping => "PING",
        }
    }

    /// Parse a wire verb. Case-sensitive; `None` if unrecognized.
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "GROUPS" => Some(Self::Groups),
            "JOIN" => Some(Self::Join),
            "LEAVE" => Some(Self::Leave),
            "POST" => Some(Self::Post),
            "MESSAGE" => Some(Self::Message),
            "VIEW" => Some(Self::View),
            "EXIT" => Some(Self::Exit),
            "PING" => Some(Self::Ping),
            _ => None,
        }
    }
}

impl fmt::Display for Verb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
