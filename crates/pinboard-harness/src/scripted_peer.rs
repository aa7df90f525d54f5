//! Line-level fake server.
//!
//! A [`ScriptedPeer`] listens on an ephemeral loopback port and hands the
//! test one [`PeerConnection`] per accepted client. The test reads exactly the
//! lines the client wrote and writes exactly the bytes it wants the client to
//! see, including partial frames and garbage.

use std::{io, net::SocketAddr, time::Duration};

use tokio::{
    io::{AsyncBufReadExt, AsyncWriteExt, BufReader, Lines},
    net::{
        TcpListener,
        tcp::{OwnedReadHalf, OwnedWriteHalf},
    },
};

/// How long `recv_line` waits before giving up.
const RECV_TIMEOUT: Duration = Duration::from_secs(5);

/// Listening side of a fake server.
pub struct ScriptedPeer {
    listener: TcpListener,
}

impl ScriptedPeer {
    /// Bind to `127.0.0.1:0`.
    pub async fn bind() -> io::Result<Self> {
        let listener = TcpListener::bind("127.0.0.1:0").await?;
        Ok(Self { listener })
    }

    /// Bound address.
    pub fn local_addr(&self) -> io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    /// Bound port.
    pub fn port(&self) -> io::Result<u16> {
        Ok(self.local_addr()?.port())
    }

    /// Wait for the next client.
    pub async fn accept(&self) -> io::Result<PeerConnection> {
        let (stream, addr) = self.listener.accept().await?;
        tracing::debug!(%addr, "scripted peer accepted");
        let (read, write) = stream.into_split();
        Ok(PeerConnection { lines: BufReader::new(read).lines(), writer: Some(write) })
    }
}

/// One accepted client connection.
pub struct PeerConnection {
    lines: Lines<BufReader<OwnedReadHalf>>,
    writer: Option<OwnedWriteHalf>,
}

impl PeerConnection {
    /// Next line the client sent, without its delimiter. `None` on EOF.
    ///
    /// Fails with `TimedOut` if nothing arrives within five seconds.
    pub async fn recv_line(&mut self) -> io::Result<Option<String>> {
        tokio::time::timeout(RECV_TIMEOUT, self.lines.next_line())
            .await
            .map_err(|_| io::Error::new(io::ErrorKind::TimedOut, "no line from client"))?
    }

    /// Send one line; the delimiter is appended.
    pub async fn send_line(&mut self, line: &str) -> io::Result<()> {
        let mut wire = Vec::with_capacity(line.len() + 1);
        wire.extend_from_slice(line.as_bytes());
        wire.push(b'\n');
        self.send_raw(&wire).await
    }

    /// Send bytes verbatim.
    pub async fn send_raw(&mut self, bytes: &[u8]) -> io::Result<()> {
        let writer = self.writer.as_mut().ok_or(io::ErrorKind::NotConnected)?;
        writer.write_all(bytes).await?;
        writer.flush().await
    }

    /// Half-close: the client reads EOF. Reading from it keeps working.
    pub async fn close(&mut self) -> io::Result<()> {
        match self.writer.take() {
            Some(mut writer) => writer.shutdown().await,
            None => Ok(()),
        }
    }

    /// Whether the client closed its side. Consumes any pending lines.
    pub async fn wait_closed(&mut self) -> io::Result<bool> {
        loop {
            match self.recv_line().await {
                Ok(None) => return Ok(true),
                Ok(Some(_)) => {},
                Err(e) if e.kind() == io::ErrorKind::TimedOut => return Ok(false),
                Err(e) if e.kind() == io::ErrorKind::ConnectionReset => return Ok(true),
                Err(e) => return Err(e),
            }
        }
    }
}
