//! Line commands typed at the prompt.
//!
//! Every command starts with `%`. Arguments are separated by whitespace,
//! except the post subject and content, which are split at the first `|`
//! so both may contain spaces.

use pinboard_app::{AppError, ClientHandle};
use pinboard_client::MessageId;
use thiserror::Error;

/// Command prefix.
pub const PREFIX: char = '%';

/// Parsed prompt command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// `%groups`
    Groups,
    /// `%join <group>`
    Join {
        /// Group to join.
        group: String,
    },
    /// `%leave <group>`
    Leave {
        /// Group to leave.
        group: String,
    },
    /// `%post <group> <subject> | <content>`
    Post {
        /// Target group.
        group: String,
        /// Subject, trimmed.
        subject: String,
        /// Content, trimmed.
        content: String,
    },
    /// `%view <group> <id>`
    View {
        /// Group holding the message.
        group: String,
        /// Message to select.
        id: MessageId,
    },
    /// `%clear <group>`
    Clear {
        /// Group whose selection is cleared.
        group: String,
    },
    /// `%ping`
    Ping,
    /// `%exit`
    Exit,
}

/// Why a prompt line is not a command.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// Line does not start with `%`.
    #[error("commands start with '{PREFIX}'")]
    MissingPrefix,

    /// Unrecognized command name.
    #[error("unknown command: {name}")]
    Unknown {
        /// Name as typed.
        name: String,
    },

    /// Wrong arguments for a known command.
    #[error("usage: {usage}")]
    Usage {
        /// Expected form.
        usage: &'static str,
    },

    /// Message id is not an unsigned integer.
    #[error("invalid message id: {value}")]
    InvalidId {
        /// Id as typed.
        value: String,
    },
}

impl Command {
    /// Parse one prompt line.
    ///
    /// # Errors
    ///
    /// See [`ParseError`]. Content checks (empty subject, reserved
    /// characters) are left to the session, which reports them as rejected
    /// intents.
    pub fn parse(line: &str) -> Result<Self, ParseError> {
        let line = line.trim();
        let rest = line.strip_prefix(PREFIX).ok_or(ParseError::MissingPrefix)?;
        let (name, args) = rest.split_once(char::is_whitespace).unwrap_or((rest, ""));
        let args = args.trim();

        match name {
            "groups" => no_args(args, "%groups").map(|()| Self::Groups),
            "join" => one_arg(args, "%join <group>").map(|group| Self::Join { group }),
            "leave" => one_arg(args, "%leave <group>").map(|group| Self::Leave { group }),
            "clear" => one_arg(args, "%clear <group>").map(|group| Self::Clear { group }),
            "view" => parse_view(args),
            "post" => parse_post(args),
            "ping" => no_args(args, "%ping").map(|()| Self::Ping),
            "exit" | "quit" => no_args(args, "%exit").map(|()| Self::Exit),
            _ => Err(ParseError::Unknown { name: name.to_string() }),
        }
    }

    /// Queue this command on the runtime.
    ///
    /// # Errors
    ///
    /// `AppError::Closed` once the runtime has stopped.
    pub fn submit(self, handle: &ClientHandle) -> Result<(), AppError> {
        match self {
            Self::Groups => handle.request_group_list(),
            Self::Join { group } => handle.join(group),
            Self::Leave { group } => handle.leave(group),
            Self::Post { group, subject, content } => handle.post(group, subject, content),
            Self::View { group, id } => handle.select_message(group, id),
            Self::Clear { group } => handle.clear_selection(group),
            Self::Ping => handle.ping(),
            Self::Exit => handle.exit(),
        }
    }
}

fn no_args(args: &str, usage: &'static str) -> Result<(), ParseError> {
    if args.is_empty() { Ok(()) } else { Err(ParseError::Usage { usage }) }
}

fn one_arg(args: &str, usage: &'static str) -> Result<String, ParseError> {
    let mut words = args.split_whitespace();
    match (words.next(), words.next()) {
        (Some(word), None) => Ok(word.to_string()),
        _ => Err(ParseError::Usage { usage }),
    }
}

fn parse_view(args: &str) -> Result<Command, ParseError> {
    const USAGE: &str = "%view <group> <id>";

    let mut words = args.split_whitespace();
    let (Some(group), Some(id), None) = (words.next(), words.next(), words.next()) else {
        return Err(ParseError::Usage { usage: USAGE });
    };
    let id = MessageId::parse(id).map_err(|_| ParseError::InvalidId { value: id.to_string() })?;

    Ok(Command::View { group: group.to_string(), id })
}

fn parse_post(args: &str) -> Result<Command, ParseError> {
    const USAGE: &str = "%post <group> <subject> | <content>";

    let (group, text) =
        args.split_once(char::is_whitespace).ok_or(ParseError::Usage { usage: USAGE })?;
    let (subject, content) = text.split_once('|').ok_or(ParseError::Usage { usage: USAGE })?;

    Ok(Command::Post {
        group: group.to_string(),
        subject: subject.trim().to_string(),
        content: content.trim().to_string(),
    })
}
