//! Pinboard wire protocol
//!
//! Newline-delimited UTF-8 text frames over TCP, fields separated by `|`.
//! The first field of every frame is a verb selecting the message kind; the
//! remaining fields are positional.
//!
//! # Layers
//!
//! - [`LineFramer`]: splits a raw byte stream into [`Frame`]s
//! - [`Command`]: outbound messages (client to server)
//! - [`Event`]: inbound messages (server to client)
//!
//! Everything here is pure: no sockets, no clocks, no shared state. The
//! transport and session crates build on top of it.
//!
//! # Escaping
//!
//! The protocol defines no escaping scheme. A field value containing `|` or
//! `\n` cannot be represented; callers validate inputs before encoding.

#![forbid(unsafe_code)]
#![deny(missing_docs)]

pub mod command;
pub mod errors;
pub mod event;
mod fields;
pub mod frame;
pub mod framer;
mod types;
mod verb;

pub use command::Command;
pub use errors::{ProtocolError, Result};
pub use event::{Event, MessageBody};
pub use frame::Frame;
pub use framer::LineFramer;
pub use types::{MessageId, PostDate};
pub use verb::Verb;

/// Separator between fields within a frame.
pub const FIELD_SEPARATOR: u8 = b'|';

/// Returns the first character in `value` that cannot appear inside a field.
///
/// Both the field separator and the frame delimiter are reserved.
pub fn reserved_char(value: &str) -> Option<char> {
    value.chars().find(|&c| c == char::from(FIELD_SEPARATOR) || c == char::from(Frame::DELIMITER))
}
