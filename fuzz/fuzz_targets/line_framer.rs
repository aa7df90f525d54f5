//! Fuzz target for stream splitting
//!
//! # Strategy
//!
//! Arbitrary bytes, cut at arbitrary points, fed to one framer chunk by
//! chunk and to another in a single call.
//!
//! # Invariants
//!
//! - Both framers yield the same frames in the same order
//! - Both framers keep the same partial tail
//! - No frame contains the delimiter

#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use pinboard_proto::{Frame, LineFramer};

#[derive(Debug, Arbitrary)]
struct Input {
    stream: Vec<u8>,
    cuts: Vec<u16>,
}

fuzz_target!(|input: Input| {
    let mut whole = LineFramer::new();
    let expected = whole.feed(&input.stream);

    let mut chunked = LineFramer::new();
    let mut actual = Vec::new();
    let mut rest = input.stream.as_slice();
    for cut in input.cuts {
        let at = usize::from(cut).min(rest.len());
        let (chunk, tail) = rest.split_at(at);
        actual.extend(chunked.feed(chunk));
        rest = tail;
    }
    actual.extend(chunked.feed(rest));

    assert_eq!(actual, expected);
    assert_eq!(chunked.buffered_len(), whole.buffered_len());
    for frame in &actual {
        assert!(!frame.as_bytes().contains(&Frame::DELIMITER));
    }
});
