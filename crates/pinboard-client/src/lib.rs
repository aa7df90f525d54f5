//! Client
//!
//! Action-based session state machine for the pinboard protocol. Keeps the
//! client's view of groups, memberships and message catalogs consistent with
//! the server, including lazy fetch of message bodies.
//!
//! # Architecture
//!
//! [`Session`] is Sans-IO. It receives [`SessionEvent`]s (decoded server
//! frames, connection loss, user intents), updates its state, and returns
//! [`SessionAction`]s for the caller to execute: commands to send and
//! [`Notification`]s for the presentation layer. The caller owns the single
//! serialization point; the session never locks anything itself.
//!
//! # Transport (optional)
//!
//! With the `transport` feature enabled, this crate also provides
//! [`transport::Transport`]: a TCP connection with a dedicated receive task
//! that feeds a [`pinboard_proto::LineFramer`].

#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod config;
mod disconnect;
mod error;
mod event;
mod group;
mod notification;
mod session;

#[cfg(feature = "transport")]
pub mod transport;

pub use config::{DEFAULT_GROUP, SessionConfig};
pub use disconnect::DisconnectReason;
pub use error::SessionError;
pub use event::{SessionAction, SessionEvent};
pub use group::{BodyState, Group, GroupSummary};
pub use notification::Notification;
pub use pinboard_proto::{Command, Event, Frame, MessageBody, MessageId, PostDate};
pub use session::{GroupSnapshot, Session, SessionSnapshot};
