//! Wire-level behavior of the simulated server.

use std::time::Duration;

use pinboard_harness::{SimServer, SimServerConfig};
use tokio::{
    io::{AsyncBufReadExt, AsyncWriteExt, BufReader, Lines},
    net::{
        TcpStream,
        tcp::{OwnedReadHalf, OwnedWriteHalf},
    },
    time::timeout,
};

struct RawClient {
    lines: Lines<BufReader<OwnedReadHalf>>,
    writer: OwnedWriteHalf,
}

impl RawClient {
    async fn connect(server: &SimServer) -> Self {
        let stream = TcpStream::connect(server.local_addr()).await.unwrap();
        let (read, writer) = stream.into_split();
        Self { lines: BufReader::new(read).lines(), writer }
    }

    async fn send(&mut self, line: &str) {
        self.writer.write_all(format!("{line}\n").as_bytes()).await.unwrap();
    }

    async fn recv(&mut self) -> String {
        timeout(Duration::from_secs(5), self.lines.next_line())
            .await
            .expect("server reply timed out")
            .unwrap()
            .expect("server closed the connection")
    }

    async fn recv_nothing(&mut self) {
        let next = timeout(Duration::from_millis(100), self.lines.next_line()).await;
        assert!(next.is_err(), "unexpected line: {next:?}");
    }
}

#[tokio::test]
async fn groups_lists_configured_boards_in_order() {
    let server = SimServer::start_with(SimServerConfig {
        groups: vec!["Public".into(), "Sports".into()],
        seed: 1,
    })
    .await
    .unwrap();
    let mut client = RawClient::connect(&server).await;

    client.send("GROUPS").await;
    assert_eq!(client.recv().await, "GROUPS|Public|Sports");
}

#[tokio::test]
async fn join_echoes_then_replays_members() {
    let server = SimServer::start().await.unwrap();
    let mut alice = RawClient::connect(&server).await;
    let mut bob = RawClient::connect(&server).await;

    alice.send("JOIN|Public|alice").await;
    assert_eq!(alice.recv().await, "JOIN|Public|alice");

    bob.send("JOIN|Public|bob").await;
    assert_eq!(alice.recv().await, "JOIN|Public|bob");
    assert_eq!(bob.recv().await, "JOIN|Public|bob");
    assert_eq!(bob.recv().await, "JOIN|Public|alice");
}

#[tokio::test]
async fn post_broadcasts_header_and_view_returns_body() {
    let server = SimServer::start().await.unwrap();
    let mut alice = RawClient::connect(&server).await;

    alice.send("JOIN|Public|alice").await;
    alice.recv().await;
    alice.send("POST|Public|Hi|there").await;

    let header = alice.recv().await;
    let id = header.strip_prefix("MESSAGE|Public|").expect("header line");
    assert!(id.parse::<u32>().is_ok());

    alice.send(&format!("VIEW|Public|{id}")).await;
    let body = alice.recv().await;
    let fields: Vec<_> = body.split('|').collect();
    assert_eq!(fields.len(), 7);
    assert_eq!(&fields[..4], &["VIEW", "Public", id, "alice"]);
    assert!(fields[4].ends_with('Z'));
    assert_eq!(&fields[5..], &["Hi", "there"]);
}

#[tokio::test]
async fn late_joiner_sees_two_most_recent_headers() {
    let server = SimServer::start().await.unwrap();
    let mut alice = RawClient::connect(&server).await;
    alice.send("JOIN|Public|alice").await;
    alice.recv().await;

    let mut ids = Vec::new();
    for n in 0..3 {
        alice.send(&format!("POST|Public|s{n}|c{n}")).await;
        ids.push(alice.recv().await);
    }

    let mut bob = RawClient::connect(&server).await;
    bob.send("JOIN|Public|bob").await;
    assert_eq!(bob.recv().await, "JOIN|Public|bob");
    assert_eq!(bob.recv().await, ids[1]);
    assert_eq!(bob.recv().await, ids[2]);
    assert_eq!(bob.recv().await, "JOIN|Public|alice");
}

#[tokio::test]
async fn requests_that_do_not_apply_are_dropped() {
    let server = SimServer::start().await.unwrap();
    let mut client = RawClient::connect(&server).await;

    client.send("JOIN|Nowhere|me").await;
    client.send("VIEW|Public|7").await;
    client.send("POST|Public|not|member").await;
    client.send("GARBAGE").await;
    client.recv_nothing().await;

    client.send("PING").await;
    assert_eq!(client.recv().await, "PING");
}

#[tokio::test]
async fn exit_leaves_every_board() {
    let server = SimServer::start().await.unwrap();
    let mut alice = RawClient::connect(&server).await;
    let mut bob = RawClient::connect(&server).await;

    alice.send("JOIN|Public|alice").await;
    alice.recv().await;
    bob.send("JOIN|Public|bob").await;
    alice.recv().await;
    bob.recv().await;
    bob.recv().await;

    bob.send("EXIT").await;
    assert_eq!(alice.recv().await, "LEAVE|Public|bob");
}
