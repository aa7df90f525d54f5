//! Terminal client for pinboard
//!
//! A thin shell over [`pinboard_app`]: parses `%` commands from a line
//! reader, submits them through [`pinboard_app::ClientHandle`], and prints
//! each [`pinboard_client::Notification`] on its own line. All protocol and
//! session logic lives below this crate.

#![forbid(unsafe_code)]
#![deny(missing_docs)]

pub mod args;
pub mod command;
pub mod render;
pub mod shell;

pub use args::Args;
pub use command::{Command, ParseError};
pub use shell::{ShellError, run};
