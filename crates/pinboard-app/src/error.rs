//! Application errors.

use pinboard_client::{SessionError, transport::TransportError};
use thiserror::Error;

/// Errors from connecting or submitting intents.
#[derive(Error, Debug)]
pub enum AppError {
    /// The session configuration was rejected.
    #[error("invalid session config: {0}")]
    Session(#[from] SessionError),

    /// The connection could not be established.
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// The runtime has stopped; the session is over.
    #[error("client runtime has stopped")]
    Closed,
}
