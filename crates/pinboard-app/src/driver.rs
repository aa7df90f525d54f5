//! Driver trait for abstracting the outbound connection.
//!
//! The [`Runtime`](crate::Runtime) only needs to send commands and to tear the
//! connection down. Production uses the TCP
//! [`Transport`](pinboard_client::transport::Transport); tests substitute a
//! recording driver.

use std::{future::Future, sync::Arc};

use pinboard_client::{
    Command,
    transport::{Transport, TransportError},
};

/// Outbound side of a connection.
///
/// Inbound frames do not pass through the driver: whoever owns the read side
/// pushes [`Input::Frame`](crate::Input::Frame) and exactly one
/// [`Input::Disconnected`](crate::Input::Disconnected) into the runtime inbox.
pub trait Driver: Send + Sync + 'static {
    /// Error returned by a failed send.
    type Error: std::error::Error + Send + 'static;

    /// Send one command, fully, before returning.
    ///
    /// # Errors
    ///
    /// Returns an error if the connection is closed or the write fails.
    fn send(&self, command: &Command) -> impl Future<Output = Result<(), Self::Error>> + Send;

    /// Close the connection. Idempotent. The read side reports the close.
    fn disconnect(&self);
}

impl Driver for Arc<Transport> {
    type Error = TransportError;

    fn send(&self, command: &Command) -> impl Future<Output = Result<(), Self::Error>> + Send {
        Transport::send(self, command)
    }

    fn disconnect(&self) {
        Transport::disconnect(self);
    }
}
