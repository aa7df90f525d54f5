//! TCP transport for the client.
//!
//! [`Transport`] owns one TCP connection. Sends are serialized through an
//! async mutex around the write half; a dedicated receive task owns the read
//! half and feeds a [`LineFramer`]. Protocol logic stays in the Sans-IO
//! [`Session`](crate::Session).
//!
//! # Connection state
//!
//! A single [`ConnectionState`] value in a `watch` channel is the authority
//! for callers. Each successful `connect` also opens a link: a numbered,
//! per-connection close signal. Closing records the [`DisconnectReason`] on
//! the current link, which wakes that connection's receive task even if the
//! transport has already reconnected. A receive task can only close its own
//! link, so a stale task never tears down a newer connection.

use std::{
    io,
    sync::{Arc, Mutex, MutexGuard, PoisonError},
    time::Duration,
};

use pinboard_proto::{Command, Frame, LineFramer};
use thiserror::Error;
use tokio::{
    io::{AsyncReadExt, AsyncWriteExt},
    net::{
        TcpStream,
        tcp::{OwnedReadHalf, OwnedWriteHalf},
    },
    sync::{Mutex as AsyncMutex, watch},
    task::JoinHandle,
};

use crate::DisconnectReason;

/// Bytes requested per socket read.
const READ_CHUNK: usize = 4096;

/// Lifecycle of the connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    /// No socket.
    Disconnected,
    /// `connect` in progress.
    Connecting,
    /// Socket open.
    Connected,
}

/// Transport tuning. The default blocks indefinitely and never caps frames.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TransportConfig {
    /// Give up on `connect` after this long.
    pub connect_timeout: Option<Duration>,
    /// Tear the connection down if a single frame grows past this many bytes.
    pub max_frame_len: Option<usize>,
}

/// Transport errors.
#[derive(Debug, Error)]
pub enum TransportError {
    /// Connection could not be established.
    #[error("failed to connect to {addr}: {source}")]
    Connect {
        /// Address as given to `connect`.
        addr: String,
        /// Underlying failure (refused, unresolvable, timed out).
        #[source]
        source: io::Error,
    },

    /// `connect` called while connecting or connected.
    #[error("already connected")]
    AlreadyConnected,

    /// Operation needs an open connection.
    #[error("not connected")]
    NotConnected,

    /// Writing a frame failed. The connection is now closed.
    #[error("write failed: {0}")]
    Write(#[source] io::Error),

    /// A receive loop already owns the read half.
    #[error("receive loop already running")]
    AlreadyReceiving,
}

/// One TCP connection to the server.
///
/// Shared behind an [`Arc`]: the receive task holds a clone so it can mark
/// the connection closed when the peer goes away.
#[derive(Debug)]
pub struct Transport {
    config: TransportConfig,
    state: watch::Sender<ConnectionState>,
    /// Close gate and the current link.
    gate: Mutex<Gate>,
    writer: AsyncMutex<Option<OwnedWriteHalf>>,
    /// Taken by `start_receiving`.
    reader: Mutex<Option<PendingReader>>,
}

#[derive(Debug, Default)]
struct Gate {
    last_id: u64,
    current: Option<Link>,
}

/// Close signal of one connection. Holds `Some` once closed.
#[derive(Debug)]
struct Link {
    id: u64,
    closed: watch::Sender<Option<DisconnectReason>>,
}

#[derive(Debug)]
struct PendingReader {
    link: u64,
    half: OwnedReadHalf,
    closed: watch::Receiver<Option<DisconnectReason>>,
}

impl Default for Transport {
    fn default() -> Self {
        Self::new(TransportConfig::default())
    }
}

impl Transport {
    /// Create a disconnected transport.
    pub fn new(config: TransportConfig) -> Self {
        let (state, _) = watch::channel(ConnectionState::Disconnected);
        Self {
            config,
            state,
            gate: Mutex::new(Gate::default()),
            writer: AsyncMutex::new(None),
            reader: Mutex::new(None),
        }
    }

    /// Current connection state.
    pub fn state(&self) -> ConnectionState {
        *self.state.borrow()
    }

    /// Whether the socket is open.
    pub fn is_connected(&self) -> bool {
        self.state() == ConnectionState::Connected
    }

    /// Open a TCP connection.
    ///
    /// Blocks until connected, refused, or the configured timeout elapses.
    /// A `disconnect` issued while connecting wins: the new socket is dropped
    /// and `NotConnected` is returned.
    ///
    /// # Errors
    ///
    /// - `TransportError::AlreadyConnected` if not `Disconnected`
    /// - `TransportError::Connect` on any connect failure
    /// - `TransportError::NotConnected` if disconnected mid-connect
    pub async fn connect(&self, host: &str, port: u16) -> Result<(), TransportError> {
        let claimed = self.state.send_if_modified(|state| {
            if *state != ConnectionState::Disconnected {
                return false;
            }
            *state = ConnectionState::Connecting;
            true
        });
        if !claimed {
            return Err(TransportError::AlreadyConnected);
        }

        let addr = format!("{host}:{port}");
        tracing::info!(%addr, "connecting");

        let stream = match self.open(&addr).await {
            Ok(stream) => stream,
            Err(source) => {
                tracing::warn!(%addr, error = %source, "connect failed");
                self.state.send_if_modified(|state| {
                    let connecting = *state == ConnectionState::Connecting;
                    if connecting {
                        *state = ConnectionState::Disconnected;
                    }
                    connecting
                });
                return Err(TransportError::Connect { addr, source });
            },
        };

        if let Err(e) = stream.set_nodelay(true) {
            tracing::debug!(error = %e, "could not disable Nagle");
        }
        let (read, write) = stream.into_split();

        let mut writer = self.writer.lock().await;
        let mut gate = lock(&self.gate);
        if self.state() != ConnectionState::Connecting {
            return Err(TransportError::NotConnected);
        }

        gate.last_id += 1;
        let link = gate.last_id;
        let (closed, closed_rx) = watch::channel(None);
        gate.current = Some(Link { id: link, closed });
        *writer = Some(write);
        *lock(&self.reader) = Some(PendingReader { link, half: read, closed: closed_rx });
        self.state.send_replace(ConnectionState::Connected);
        drop(gate);

        tracing::info!(%addr, link, "connected");
        Ok(())
    }

    async fn open(&self, addr: &str) -> io::Result<TcpStream> {
        let attempt = TcpStream::connect(addr);
        match self.config.connect_timeout {
            None => attempt.await,
            Some(limit) => tokio::time::timeout(limit, attempt).await.unwrap_or_else(|_| {
                Err(io::Error::new(io::ErrorKind::TimedOut, "connect timed out"))
            }),
        }
    }

    /// Encode `command` as one frame and write it fully.
    ///
    /// Concurrent senders are serialized; frames never interleave.
    ///
    /// # Errors
    ///
    /// - `TransportError::NotConnected` if the connection is not open
    /// - `TransportError::Write` if the write fails; the connection is closed
    ///   and the receive task reports `DisconnectReason::WriteFailed`
    pub async fn send(&self, command: &Command) -> Result<(), TransportError> {
        let frame = command.to_frame();
        let mut writer = self.writer.lock().await;

        if !self.is_connected() {
            writer.take();
            return Err(TransportError::NotConnected);
        }
        let Some(stream) = writer.as_mut() else {
            return Err(TransportError::NotConnected);
        };
        // Connect needs the writer lock, so the link cannot change under us.
        let link = self.current_link();

        tracing::trace!(%frame, "send");
        let result = stream.write_all(&frame.to_wire()).await;
        if let Err(e) = result {
            tracing::warn!(error = %e, "write failed");
            writer.take();
            drop(writer);
            self.close(link, DisconnectReason::WriteFailed(e.to_string()));
            return Err(TransportError::Write(e));
        }

        Ok(())
    }

    /// Spawn the receive task.
    ///
    /// `on_frame` runs on the receive task once per frame, in arrival order.
    /// `on_disconnect` runs once when the loop stops, whatever the cause:
    /// peer EOF, read error, an over-long frame, a failed send, or
    /// [`Transport::disconnect`]. Neither callback may block; forward to a
    /// channel.
    ///
    /// # Errors
    ///
    /// - `TransportError::NotConnected` if the connection is not open
    /// - `TransportError::AlreadyReceiving` if a receive task already owns
    ///   this connection
    pub fn start_receiving<F, D>(
        self: &Arc<Self>,
        mut on_frame: F,
        on_disconnect: D,
    ) -> Result<JoinHandle<()>, TransportError>
    where
        F: FnMut(Frame) + Send + 'static,
        D: FnOnce(DisconnectReason) + Send + 'static,
    {
        if !self.is_connected() {
            return Err(TransportError::NotConnected);
        }
        let Some(reader) = lock(&self.reader).take() else {
            return Err(TransportError::AlreadyReceiving);
        };

        let transport = Arc::clone(self);
        tracing::debug!(link = reader.link, "receive loop starting");
        Ok(tokio::spawn(async move {
            let reason = transport.receive_loop(reader, &mut on_frame).await;
            tracing::debug!(%reason, "receive loop stopped");
            on_disconnect(reason);
        }))
    }

    async fn receive_loop(
        &self,
        reader: PendingReader,
        on_frame: &mut (impl FnMut(Frame) + Send),
    ) -> DisconnectReason {
        let PendingReader { link, half: mut reader, mut closed } = reader;
        let mut framer = LineFramer::new();
        let mut chunk = [0u8; READ_CHUNK];

        let failure = 'receiving: loop {
            let read = tokio::select! {
                biased;
                reason = closed.wait_for(Option::is_some) => {
                    return reason.ok().and_then(|r| r.clone()).unwrap_or(DisconnectReason::Local);
                },
                read = reader.read(&mut chunk) => read,
            };

            let n = match read {
                Ok(0) => break DisconnectReason::PeerClosed,
                Ok(n) => n,
                Err(e) => {
                    tracing::warn!(error = %e, "read failed");
                    break DisconnectReason::ReadFailed(e.to_string());
                },
            };

            for frame in framer.feed(&chunk[..n]) {
                if let Some(limit) = self.exceeds_limit(frame.len()) {
                    break 'receiving DisconnectReason::FrameTooLong { limit };
                }
                tracing::trace!(%frame, "recv");
                on_frame(frame);
                if let Some(reason) = closed.borrow().clone() {
                    return reason;
                }
            }

            if let Some(limit) = self.exceeds_limit(framer.buffered_len()) {
                break DisconnectReason::FrameTooLong { limit };
            }
        };

        if let DisconnectReason::FrameTooLong { limit } = failure {
            tracing::warn!(limit, "frame exceeded limit");
        }
        self.close(Some(link), failure.clone());
        // A concurrent close may have won; report what it recorded.
        let recorded = closed.borrow().clone();
        recorded.unwrap_or(failure)
    }

    /// Configured cap, if `len` exceeds it.
    fn exceeds_limit(&self, len: usize) -> Option<usize> {
        self.config.max_frame_len.filter(|limit| len > *limit)
    }

    /// Close the connection. Idempotent and non-blocking.
    ///
    /// Safe to call from any thread, including from inside the receive
    /// callbacks. Wakes a receive task blocked on read.
    pub fn disconnect(&self) {
        self.close(None, DisconnectReason::Local);
    }

    /// Transition to `Disconnected`, recording `reason` on the current link
    /// if this call did it. With `only` set, a link that is no longer current
    /// is left alone.
    fn close(&self, only: Option<u64>, reason: DisconnectReason) -> bool {
        let gate = lock(&self.gate);
        if self.state() == ConnectionState::Disconnected {
            return false;
        }
        if let Some(id) = only
            && gate.current.as_ref().map(|l| l.id) != Some(id)
        {
            return false;
        }

        tracing::info!(%reason, "disconnecting");
        if let Some(link) = &gate.current {
            link.closed.send_if_modified(|recorded| {
                let first = recorded.is_none();
                if first {
                    *recorded = Some(reason);
                }
                first
            });
        }
        self.state.send_replace(ConnectionState::Disconnected);
        drop(gate);

        // A sender holding the lock drops the write half on its next check.
        if let Ok(mut writer) = self.writer.try_lock() {
            writer.take();
        }
        lock(&self.reader).take();
        true
    }

    fn current_link(&self) -> Option<u64> {
        lock(&self.gate).current.as_ref().map(|l| l.id)
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
