//! Protocol decode errors.

use thiserror::Error;

/// Result alias for protocol decoding.
pub type Result<T> = std::result::Result<T, ProtocolError>;

/// A frame that could not be decoded.
///
/// Every variant describes a malformed message. Malformed frames are never
/// fatal to a connection: the receiver discards the frame, logs it, and keeps
/// reading.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProtocolError {
    /// Frame had no content at all.
    #[error("empty frame")]
    EmptyFrame,

    /// Frame bytes were not valid UTF-8.
    #[error("frame is not valid UTF-8")]
    InvalidUtf8,

    /// Verb is not one this side of the protocol understands.
    #[error("unknown verb {verb:?}")]
    UnknownVerb {
        /// Verb as received.
        verb: String,
    },

    /// Verb is known but carried the wrong number of fields.
    #[error("{verb} expects {expected} fields, got {actual}")]
    FieldCount {
        /// Verb of the frame.
        verb: &'static str,
        /// Number of fields the verb requires.
        expected: usize,
        /// Number of fields received.
        actual: usize,
    },

    /// A required field was present but empty.
    #[error("{verb} has an empty {field} field")]
    EmptyField {
        /// Verb of the frame.
        verb: &'static str,
        /// Name of the empty field.
        field: &'static str,
    },

    /// Message id was not an unsigned decimal integer.
    #[error("invalid message id {value:?}")]
    InvalidMessageId {
        /// Field as received.
        value: String,
    },

    /// Post date was not ISO-8601.
    #[error("invalid post date {value:?}")]
    InvalidPostDate {
        /// Field as received.
        value: String,
    },
}

impl ProtocolError {
    /// Verb of the offending frame, if it was recognized.
    pub fn verb(&self) -> Option<&'static str> {
        match self {
            Self::FieldCount { verb, .. } | Self::EmptyField { verb, .. } => Some(verb),
            Self::EmptyFrame
            | Self::InvalidUtf8
            | Self::UnknownVerb { .. }
            | Self::InvalidMessageId { .. }
            | Self::InvalidPostDate { .. } => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn field_errors_carry_verb() {
        let err = ProtocolError::FieldCount { verb: "JOIN", expected: 2, actual: 1 };
        assert_eq!(err.verb(), Some("JOIN"));
        assert_eq!(err.to_string(), "JOIN expects 2 fields, got 1");

        assert_eq!(ProtocolError::UnknownVerb { verb: "GARBAGE".into() }.verb(), None);
    }
}
