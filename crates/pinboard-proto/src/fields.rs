//! Field splitting and joining shared by the command and event codecs.

use bytes::BufMut;

use crate::{
    FIELD_SEPARATOR, Frame, Verb,
    errors::{ProtocolError, Result},
};

/// Split a frame into its verb and positional fields.
pub(crate) fn split(frame: &Frame) -> Result<(&str, Vec<&str>)> {
    let line = frame.as_str()?;
    if line.is_empty() {
        return Err(ProtocolError::EmptyFrame);
    }

    let mut parts = line.split(char::from(FIELD_SEPARATOR));
    let verb = parts.next().unwrap_or_default();
    Ok((verb, parts.collect()))
}

/// Require exactly `N` fields.
pub(crate) fn exact<'a, const N: usize>(verb: Verb, fields: &[&'a str]) -> Result<[&'a str; N]> {
    <[&'a str; N]>::try_from(fields).map_err(|_| ProtocolError::FieldCount {
        verb: verb.as_str(),
        expected: N,
        actual: fields.len(),
    })
}

/// Require a field to be non-empty.
pub(crate) fn required<'a>(verb: Verb, field: &'static str, value: &'a str) -> Result<&'a str> {
    if value.is_empty() {
        return Err(ProtocolError::EmptyField { verb: verb.as_str(), field });
    }
    Ok(value)
}

/// Write `verb|f1|f2|...` without the delimiter.
pub(crate) fn put_line(dst: &mut impl BufMut, verb: Verb, fields: &[&str]) {
    dst.put_slice(verb.as_str().as_bytes());
    for field in fields {
        dst.put_u8(FIELD_SEPARATOR);
        dst.put_slice(field.as_bytes());
    }
}

/// Build a frame from a verb and fields.
pub(crate) fn frame(verb: Verb, fields: &[&str]) -> Frame {
    let mut line = Vec::new();
    put_line(&mut line, verb, fields);
    Frame::new(line)
}
