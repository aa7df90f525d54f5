//! Application layer for pinboard
//!
//! Wires the Sans-IO [`Session`](pinboard_client::Session) to a live
//! [`Transport`](pinboard_client::transport::Transport) behind a single
//! serialization point.
//!
//! # Components
//!
//! - [`Driver`]: outbound seam; the TCP transport in production
//! - [`Runtime`]: actor that owns the session and the transport's send side,
//!   draining one inbox that merges inbound frames, the disconnect signal and
//!   user intents
//! - [`ClientHandle`]: cloneable, non-blocking intent API
//! - [`Notifications`]: stream of session changes for the presentation layer
//! - [`connect`]: dials the server and spawns the runtime
//!
//! Notifications travel on their own channel. A consumer may call back into
//! [`ClientHandle`] while handling one; the intent simply queues behind
//! whatever the runtime is doing.

#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod config;
mod driver;
mod error;
mod handle;
mod input;
mod runtime;

pub use config::ClientConfig;
pub use driver::Driver;
pub use error::AppError;
pub use handle::{ClientHandle, ConnectedClient, Notifications, connect};
pub use input::Input;
pub use runtime::Runtime;
