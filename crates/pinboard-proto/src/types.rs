//! Typed field values shared by commands and events.

use std::{fmt, str::FromStr};

use chrono::{DateTime, NaiveDateTime};

use crate::errors::{ProtocolError, Result};

/// Server-assigned message identifier.
///
/// Unsigned decimal on the wire. The reference server hands out unsigned
/// 32-bit ids; the wider type accepts all of them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MessageId(pub u64);

impl MessageId {
    /// Parse a wire field.
    pub fn parse(value: &str) -> Result<Self> {
        // u64::from_str accepts a leading '+', the wire format does not
        if value.is_empty() || !value.bytes().all(|b| b.is_ascii_digit()) {
            return Err(ProtocolError::InvalidMessageId { value: value.to_string() });
        }

        value
            .parse()
            .map(Self)
            .map_err(|_| ProtocolError::InvalidMessageId { value: value.to_string() })
    }
}

impl FromStr for MessageId {
    type Err = ProtocolError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl fmt::Display for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for MessageId {
    fn from(value: u64) -> Self {
        Self(value)
    }
}

/// Post date of a message body.
///
/// Accepts RFC 3339 with an offset (`2024-02-02T08:00:00Z`) or a naive local
/// form (`2024-01-01T10:00:00`, optional fraction). The exact wire text is
/// kept so re-encoding and display are lossless.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PostDate {
    raw: String,
    parsed: NaiveDateTime,
}

impl PostDate {
    const NAIVE_FORMAT: &'static str = "%Y-%m-%dT%H:%M:%S%.f";

    /// Parse a wire field.
    pub fn parse(value: &str) -> Result<Self> {
        let parsed = match DateTime::parse_from_rfc3339(value) {
            Ok(with_offset) => with_offset.naive_utc(),
            Err(_) => NaiveDateTime::parse_from_str(value, Self::NAIVE_FORMAT)
                .map_err(|_| ProtocolError::InvalidPostDate { value: value.to_string() })?,
        };

        Ok(Self { raw: value.to_string(), parsed })
    }

    /// Exact text as received.
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// Parsed timestamp. Offset forms are normalized to UTC.
    pub fn naive_utc(&self) -> NaiveDateTime {
        self.parsed
    }
}

impl FromStr for PostDate {
    type Err = ProtocolError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl fmt::Display for PostDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}
