//! Session errors.

use thiserror::Error;

/// Intent rejected locally, before anything reaches the wire.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SessionError {
    /// Post subject was empty.
    #[error("subject must not be empty")]
    EmptySubject,

    /// Post content was empty.
    #[error("content must not be empty")]
    EmptyContent,

    /// Group name was empty.
    #[error("group name must not be empty")]
    EmptyGroupName,

    /// Configured user name was empty.
    #[error("user name must not be empty")]
    EmptyUserName,

    /// A field contains `|` or `\n`, which the protocol cannot carry.
    #[error("{field} contains reserved character {found:?}")]
    InvalidField {
        /// Which input was rejected.
        field: &'static str,
        /// Offending character.
        found: char,
    },
}
