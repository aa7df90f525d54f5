//! Fuzz target for session reconciliation
//!
//! # Strategy
//!
//! Interleaves server frames over a small pool of group names, message ids
//! and users with local intents and disconnects, so events collide on the
//! same groups and messages.
//!
//! # Invariants
//!
//! - `Session::handle` never panics
//! - Every standard session invariant holds after each event
//! - Known groups and headers are never forgotten

#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use pinboard_client::{
    DisconnectReason, Frame, MessageId, Session, SessionConfig, SessionEvent,
};
use pinboard_harness::InvariantRegistry;

const GROUPS: [&str; 3] = ["Public", "Group1", "Group2"];
const USERS: [&str; 3] = ["me", "amy", "bob"];

#[derive(Debug, Arbitrary)]
enum Step {
    GroupsList(Vec<u8>),
    Join { group: u8, user: u8 },
    Leave { group: u8, user: u8 },
    Header { group: u8, id: u8 },
    Body { group: u8, id: u8 },
    Select { group: u8, id: Option<u8> },
    Post { group: u8, subject: String, content: String },
    Garbage(Vec<u8>),
    Disconnect,
}

fn group(index: u8) -> &'static str {
    GROUPS[usize::from(index) % GROUPS.len()]
}

fn user(index: u8) -> &'static str {
    USERS[usize::from(index) % USERS.len()]
}

impl Step {
    fn into_event(self) -> SessionEvent {
        let frame = |line: String| SessionEvent::FrameReceived(Frame::from(line));
        match self {
            Self::GroupsList(picks) => {
                let names: Vec<_> = picks.into_iter().map(group).collect();
                frame(format!("GROUPS|{}", names.join("|")))
            },
            Self::Join { group: g, user: u } => frame(format!("JOIN|{}|{}", group(g), user(u))),
            Self::Leave { group: g, user: u } => frame(format!("LEAVE|{}|{}", group(g), user(u))),
            Self::Header { group: g, id } => frame(format!("MESSAGE|{}|{id}", group(g))),
            Self::Body { group: g, id } => frame(format!(
                "VIEW|{}|{id}|amy|2024-01-01T10:00:00|subject|content",
                group(g)
            )),
            Self::Select { group: g, id } => SessionEvent::SelectMessage {
                group: group(g).to_string(),
                id: id.map(|id| MessageId(u64::from(id))),
            },
            Self::Post { group: g, subject, content } => {
                SessionEvent::RequestPost { group: group(g).to_string(), subject, content }
            },
            Self::Garbage(mut bytes) => {
                bytes.retain(|&b| b != Frame::DELIMITER);
                SessionEvent::FrameReceived(Frame::new(bytes))
            },
            Self::Disconnect => SessionEvent::Disconnected { reason: DisconnectReason::PeerClosed },
        }
    }
}

fuzz_target!(|steps: Vec<Step>| {
    let Ok(mut session) = Session::new(SessionConfig::new("me")) else {
        return;
    };
    let invariants = InvariantRegistry::standard();

    for step in steps {
        let before = session.snapshot();
        // Rejected intents are expected; only panics matter
        let _ = session.handle(step.into_event());
        let after = session.snapshot();

        invariants.assert_all(&after, "after fuzzed event");
        for old in &before.groups {
            let Some(new) = after.group(&old.name) else {
                panic!("group {} was forgotten", old.name);
            };
            assert!(new.headers.starts_with(&old.headers), "headers of {} were lost", old.name);
        }
    }
});
