//! In-process bulletin-board server.
//!
//! `SimServer` accepts real loopback TCP connections and implements the server
//! side of the protocol:
//!
//! - `GROUPS` lists the configured boards
//! - `JOIN` announces the newcomer to existing members, then echoes the join
//!   to the caller followed by up to two recent `MESSAGE` headers and one
//!   `JOIN` per existing member
//! - `POST` stores the message under a random id and broadcasts `MESSAGE` to
//!   every member, poster included
//! - `LEAVE` broadcasts to every member, leaver included
//! - `VIEW` answers members only, for stored ids only
//! - `PING` is echoed; `EXIT` or EOF leaves every board
//!
//! Requests that do not apply (unknown board, not a member, unknown id) are
//! dropped silently, as is anything that does not decode.

use std::{
    collections::HashMap,
    io,
    net::SocketAddr,
    sync::{Arc, Mutex, MutexGuard, PoisonError},
};

use chrono::{SecondsFormat, Utc};
use pinboard_proto::{Command, Event, Frame, LineFramer, MessageBody, MessageId, PostDate};
use rand::{RngCore, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tokio::{
    io::{AsyncReadExt, AsyncWriteExt},
    net::{TcpListener, TcpStream},
    sync::mpsc,
    task::JoinHandle,
};

/// Boards of the reference server.
pub const DEFAULT_GROUPS: [&str; 6] = ["Public", "Group1", "Group2", "Group3", "Group4", "Group5"];

/// Recent headers replayed to a joining member.
const JOIN_REPLAY: usize = 2;

/// Server settings.
#[derive(Debug, Clone)]
pub struct SimServerConfig {
    /// Boards, in the order `GROUPS` lists them.
    pub groups: Vec<String>,
    /// Seed for message ids.
    pub seed: u64,
}

impl Default for SimServerConfig {
    fn default() -> Self {
        Self { groups: DEFAULT_GROUPS.iter().map(ToString::to_string).collect(), seed: 0 }
    }
}

/// Running server. Stops when dropped.
pub struct SimServer {
    addr: SocketAddr,
    accept_task: JoinHandle<()>,
}

impl SimServer {
    /// Start on `127.0.0.1:0` with the default boards.
    pub async fn start() -> io::Result<Self> {
        Self::start_with(SimServerConfig::default()).await
    }

    /// Start on `127.0.0.1:0` with custom settings.
    pub async fn start_with(config: SimServerConfig) -> io::Result<Self> {
        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;
        let world = Arc::new(Mutex::new(World::new(&config)));

        let accept_task = tokio::spawn(async move {
            loop {
                let (stream, peer) = match listener.accept().await {
                    Ok(accepted) => accepted,
                    Err(e) => {
                        tracing::warn!(error = %e, "sim server accept failed");
                        break;
                    },
                };
                tracing::debug!(%peer, "sim server accepted");
                tokio::spawn(serve(stream, Arc::clone(&world)));
            }
        });

        Ok(Self { addr, accept_task })
    }

    /// Bound address.
    pub fn local_addr(&self) -> SocketAddr {
        self.addr
    }

    /// Bound port.
    pub fn port(&self) -> u16 {
        self.addr.port()
    }

    /// Stop accepting. Existing connections keep running until they close.
    pub fn shutdown(&self) {
        self.accept_task.abort();
    }
}

impl Drop for SimServer {
    fn drop(&mut self) {
        self.shutdown();
    }
}

type ClientId = u64;

struct StoredMessage {
    id: MessageId,
    sender: String,
    posted_at: PostDate,
    subject: String,
    content: String,
}

struct Board {
    name: String,
    /// Post order.
    messages: Vec<StoredMessage>,
    /// Join order.
    members: Vec<(ClientId, String)>,
}

impl Board {
    fn member_name(&self, client: ClientId) -> Option<&str> {
        self.members.iter().find(|(id, _)| *id == client).map(|(_, name)| name.as_str())
    }
}

struct World {
    boards: Vec<Board>,
    outboxes: HashMap<ClientId, mpsc::UnboundedSender<Frame>>,
    rng: ChaCha8Rng,
    next_client: ClientId,
}

impl World {
    fn new(config: &SimServerConfig) -> Self {
        let boards = config
            .groups
            .iter()
            .map(|name| Board { name: name.clone(), messages: Vec::new(), members: Vec::new() })
            .collect();
        Self {
            boards,
            outboxes: HashMap::new(),
            rng: ChaCha8Rng::seed_from_u64(config.seed),
            next_client: 1,
        }
    }

    fn register(&mut self, outbox: mpsc::UnboundedSender<Frame>) -> ClientId {
        let id = self.next_client;
        self.next_client += 1;
        self.outboxes.insert(id, outbox);
        id
    }

    fn send(&self, client: ClientId, event: &Event) {
        if let Some(outbox) = self.outboxes.get(&client) {
            // A closed outbox means the client is going away.
            let _ = outbox.send(event.to_frame());
        }
    }

    fn board(&self, name: &str) -> Option<usize> {
        self.boards.iter().position(|b| b.name == name)
    }

    fn handle(&mut self, client: ClientId, command: Command) {
        match command {
            Command::Groups => {
                let groups = self.boards.iter().map(|b| b.name.clone()).collect();
                self.send(client, &Event::GroupsList { groups });
            },
            Command::Join { group, name } => self.join(client, &group, name),
            Command::Leave { group } => self.leave(client, &group),
            Command::Post { group, subject, content } => {
                self.post(client, &group, subject, content);
            },
            Command::View { group, id } => self.view(client, &group, id),
            Command::Ping => self.send(client, &Event::Ping),
            Command::Exit => self.depart(client),
        }
    }

    fn join(&mut self, client: ClientId, group: &str, name: String) {
        let Some(index) = self.board(group) else { return };
        if self.boards[index].member_name(client).is_some() {
            return;
        }

        let announce = Event::UserJoined { group: group.to_string(), user: name.clone() };
        for (member, _) in &self.boards[index].members {
            self.send(*member, &announce);
        }
        self.boards[index].members.push((client, name.clone()));
        self.send(client, &announce);

        let board = &self.boards[index];
        let recent = board.messages.len().saturating_sub(JOIN_REPLAY);
        for message in &board.messages[recent..] {
            self.send(client, &Event::MessagePosted { group: group.to_string(), id: message.id });
        }
        for (member, user) in &board.members {
            if *member != client && *user != name {
                self.send(client, &Event::UserJoined {
                    group: group.to_string(),
                    user: user.clone(),
                });
            }
        }
    }

    fn leave(&mut self, client: ClientId, group: &str) {
        let Some(index) = self.board(group) else { return };
        let Some(name) = self.boards[index].member_name(client).map(str::to_string) else {
            return;
        };

        let announce = Event::UserLeft { group: group.to_string(), user: name };
        for (member, _) in &self.boards[index].members {
            self.send(*member, &announce);
        }
        self.boards[index].members.retain(|(id, _)| *id != client);
    }

    fn post(&mut self, client: ClientId, group: &str, subject: String, content: String) {
        let Some(index) = self.board(group) else { return };
        let Some(sender) = self.boards[index].member_name(client).map(str::to_string) else {
            return;
        };

        let id = MessageId(u64::from(self.rng.next_u32()));
        let stamp = Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true);
        let Ok(posted_at) = PostDate::parse(&stamp) else {
            tracing::error!(%stamp, "sim server produced an unparseable date");
            return;
        };

        self.boards[index].messages.push(StoredMessage { id, sender, posted_at, subject, content });

        let announce = Event::MessagePosted { group: group.to_string(), id };
        for (member, _) in &self.boards[index].members {
            self.send(*member, &announce);
        }
    }

    fn view(&self, client: ClientId, group: &str, id: MessageId) {
        let Some(index) = self.board(group) else { return };
        let board = &self.boards[index];
        if board.member_name(client).is_none() {
            return;
        }
        let Some(message) = board.messages.iter().find(|m| m.id == id) else { return };

        self.send(client, &Event::MessageBody(MessageBody {
            group: group.to_string(),
            id,
            sender: message.sender.clone(),
            posted_at: message.posted_at.clone(),
            subject: message.subject.clone(),
            content: message.content.clone(),
        }));
    }

    /// Leave every board the client is in.
    fn depart(&mut self, client: ClientId) {
        let joined: Vec<String> = self
            .boards
            .iter()
            .filter(|b| b.member_name(client).is_some())
            .map(|b| b.name.clone())
            .collect();
        for group in joined {
            self.leave(client, &group);
        }
    }

    fn disconnect(&mut self, client: ClientId) {
        self.depart(client);
        self.outboxes.remove(&client);
    }
}

fn lock(world: &Mutex<World>) -> MutexGuard<'_, World> {
    world.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Serve one client until EOF, read error, or `EXIT`.
async fn serve(stream: TcpStream, world: Arc<Mutex<World>>) {
    let (mut reader, mut writer) = stream.into_split();
    let (outbox, mut inbox) = mpsc::unbounded_channel::<Frame>();
    let client = lock(&world).register(outbox);

    let write_task = tokio::spawn(async move {
        while let Some(frame) = inbox.recv().await {
            if writer.write_all(&frame.to_wire()).await.is_err() {
                break;
            }
        }
        let _ = writer.shutdown().await;
    });

    let mut framer = LineFramer::new();
    let mut chunk = [0u8; 4096];
    'serving: loop {
        let n = match reader.read(&mut chunk).await {
            Ok(0) | Err(_) => break,
            Ok(n) => n,
        };
        for frame in framer.feed(&chunk[..n]) {
            let command = match Command::decode(&frame) {
                Ok(command) => command,
                Err(e) => {
                    tracing::debug!(%frame, error = %e, "sim server ignoring frame");
                    continue;
                },
            };
            let exit = command == Command::Exit;
            lock(&world).handle(client, command);
            if exit {
                break 'serving;
            }
        }
    }

    lock(&world).disconnect(client);
    let _ = write_task.await;
    tracing::debug!(client, "sim server connection closed");
}
