//! Fuzz target for line decoding
//!
//! # Strategy
//!
//! - Random bytes: arbitrary lines, including invalid UTF-8
//! - Verb prefixed: a known verb followed by arbitrary fields, to get past
//!   the verb check and exercise field parsing
//!
//! # Invariants
//!
//! - `Event::decode` and `Command::decode` never panic
//! - Anything that decodes re-encodes to a frame that decodes to the same
//!   value

#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use pinboard_proto::{Command, Event, Frame};

const VERBS: [&str; 8] = ["GROUPS", "JOIN", "LEAVE", "MESSAGE", "VIEW", "POST", "PING", "EXIT"];

#[derive(Debug, Arbitrary)]
enum Line {
    Raw(Vec<u8>),
    Prefixed { verb: u8, fields: Vec<String> },
}

impl Line {
    fn into_frame(self) -> Frame {
        match self {
            Self::Raw(mut bytes) => {
                bytes.retain(|&b| b != Frame::DELIMITER);
                Frame::new(bytes)
            },
            Self::Prefixed { verb, fields } => {
                let verb = VERBS[usize::from(verb) % VERBS.len()];
                let mut line = verb.to_string();
                for field in fields {
                    line.push('|');
                    line.push_str(&field.replace('\n', ""));
                }
                Frame::from(line)
            },
        }
    }
}

fuzz_target!(|line: Line| {
    let frame = line.into_frame();

    if let Ok(event) = Event::decode(&frame) {
        assert_eq!(Event::decode(&event.to_frame()).as_ref(), Ok(&event));
    }

    if let Ok(command) = Command::decode(&frame) {
        assert_eq!(Command::decode(&command.to_frame()).as_ref(), Ok(&command));
    }
});
