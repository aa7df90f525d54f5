//! Prompt loop: reads command lines, prints notifications.

use std::io::{self, Write};

use pinboard_app::{AppError, ConnectedClient};
use pinboard_client::Session;
use thiserror::Error;
use tokio::{
    io::{AsyncBufRead, AsyncBufReadExt},
    task::JoinError,
};

use crate::{command::Command, render};

/// Errors that end the shell.
#[derive(Error, Debug)]
pub enum ShellError {
    /// Reading commands or writing output failed.
    #[error("terminal I/O failed: {0}")]
    Io(#[from] io::Error),

    /// Connecting or submitting failed.
    #[error(transparent)]
    App(#[from] AppError),

    /// The runtime task panicked or was cancelled.
    #[error("client runtime failed: {0}")]
    Runtime(#[from] JoinError),
}

/// Run the prompt until the connection ends.
///
/// Requests the group list first. End of input is treated as `%exit`.
/// Returns the final session state.
pub async fn run<R, W>(
    client: ConnectedClient,
    input: R,
    out: &mut W,
) -> Result<Session, ShellError>
where
    R: AsyncBufRead + Unpin,
    W: Write,
{
    let ConnectedClient { handle, mut notifications, runtime } = client;
    let mut lines = input.lines();
    let mut input_open = true;

    handle.request_group_list()?;

    loop {
        tokio::select! {
            notification = notifications.recv() => {
                let Some(notification) = notification else { break };
                render::write_line(out, &notification)?;
            },
            line = lines.next_line(), if input_open => {
                let Some(line) = line? else {
                    input_open = false;
                    // Already closed is fine: the notification stream ends anyway.
                    let _ = handle.exit();
                    continue;
                };
                if line.trim().is_empty() {
                    continue;
                }

                match Command::parse(&line) {
                    Ok(command) => {
                        tracing::debug!(?command, "submitting");
                        if command.submit(&handle).is_err() {
                            // Runtime stopped; drain what it left behind.
                            input_open = false;
                        }
                    },
                    Err(e) => {
                        writeln!(out, "{e}")?;
                        out.flush()?;
                    },
                }
            },
        }
    }

    Ok(runtime.await?)
}
