//! End-to-end tests against the simulated server over loopback TCP.
//!
//! # Oracle Pattern
//!
//! Tests drive real clients through [`ClientHandle`] and end by checking the
//! final session each runtime returns against the standard invariants.

use std::time::Duration;

use pinboard_app::{AppError, ClientConfig, ConnectedClient, connect};
use pinboard_client::{
    DisconnectReason, GroupSummary, MessageBody, MessageId, Notification, Session,
    transport::TransportError,
};
use pinboard_harness::{InvariantRegistry, SimServer};
use tokio::time::timeout;

async fn client(server: &SimServer, name: &str) -> ConnectedClient {
    connect(ClientConfig::new("127.0.0.1", server.port(), name)).await.unwrap()
}

/// Wait for the first notification matching `pick`, skipping others.
async fn wait_for<T>(
    client: &mut ConnectedClient,
    mut pick: impl FnMut(Notification) -> Option<T>,
) -> T {
    let wait = async {
        loop {
            let notification = client.notifications.recv().await.expect("notifications ended");
            if let Some(found) = pick(notification) {
                return found;
            }
        }
    };
    timeout(Duration::from_secs(5), wait).await.expect("notification timed out")
}

async fn joined(client: &mut ConnectedClient, group: &str) {
    wait_for(client, |n| matches!(n, Notification::Joined { group: g } if g == group).then_some(()))
        .await;
}

async fn finish(client: ConnectedClient) -> Session {
    client.handle.exit().unwrap();
    let session = timeout(Duration::from_secs(5), client.runtime).await.unwrap().unwrap();
    InvariantRegistry::standard().assert_all(&session.snapshot(), "at exit");
    session
}

#[tokio::test]
async fn group_list_triggers_auto_join() {
    let server = SimServer::start().await.unwrap();
    let mut alice = client(&server, "alice").await;

    alice.handle.request_group_list().unwrap();
    let groups = wait_for(&mut alice, |n| match n {
        Notification::GroupsUpdated { groups } => Some(groups),
        _ => None,
    })
    .await;
    assert_eq!(groups.first(), Some(&GroupSummary { name: "Public".into(), joined: false }));
    assert_eq!(groups.len(), 6);

    joined(&mut alice, "Public").await;

    let session = finish(alice).await;
    assert!(session.group("Group1").is_some_and(|g| !g.is_joined()));
}

#[tokio::test]
async fn post_and_fetch_body_across_clients() {
    let server = SimServer::start().await.unwrap();
    let mut alice = client(&server, "alice").await;
    let mut bob = client(&server, "bob").await;

    alice.handle.join("Public").unwrap();
    joined(&mut alice, "Public").await;
    bob.handle.join("Public").unwrap();
    joined(&mut bob, "Public").await;

    wait_for(&mut bob, |n| {
        matches!(n, Notification::MemberAdded { ref user, .. } if user == "alice").then_some(())
    })
    .await;

    alice.handle.post("Public", "Hello", "World").unwrap();
    let id = wait_for(&mut bob, |n| match n {
        Notification::HeaderAdded { id, .. } => Some(id),
        _ => None,
    })
    .await;

    bob.handle.select_message("Public", id).unwrap();
    let body: MessageBody = wait_for(&mut bob, |n| match n {
        Notification::BodyAvailable(body) => Some(body),
        _ => None,
    })
    .await;

    assert_eq!(body.id, id);
    assert_eq!(body.sender, "alice");
    assert_eq!(body.subject, "Hello");
    assert_eq!(body.content, "World");

    finish(alice).await;
    let session = finish(bob).await;
    assert_eq!(session.group("Public").map(|g| g.headers().to_vec()), Some(vec![id]));
}

#[tokio::test]
async fn members_see_each_other_leave() {
    let server = SimServer::start().await.unwrap();
    let mut alice = client(&server, "alice").await;
    let mut bob = client(&server, "bob").await;

    alice.handle.join("Group1").unwrap();
    joined(&mut alice, "Group1").await;
    bob.handle.join("Group1").unwrap();
    joined(&mut bob, "Group1").await;

    bob.handle.leave("Group1").unwrap();
    let left = wait_for(&mut alice, |n| match n {
        Notification::MemberRemoved { group, user } => Some((group, user)),
        _ => None,
    })
    .await;
    assert_eq!(left, ("Group1".into(), "bob".into()));

    wait_for(&mut bob, |n| matches!(n, Notification::Left { .. }).then_some(())).await;

    finish(alice).await;
    let session = finish(bob).await;
    assert!(!session.is_joined("Group1"));
}

#[tokio::test]
async fn exit_reports_local_disconnect() {
    let server = SimServer::start().await.unwrap();
    let mut alice = client(&server, "alice").await;

    alice.handle.exit().unwrap();
    let reason = wait_for(&mut alice, |n| match n {
        Notification::Disconnected { reason } => Some(reason),
        _ => None,
    })
    .await;

    assert_eq!(reason, DisconnectReason::Local);
    assert_eq!(alice.notifications.recv().await, None);
    assert!(matches!(alice.handle.join("Public"), Err(AppError::Closed)));
}

#[tokio::test]
async fn selecting_unknown_message_waits_quietly() {
    let server = SimServer::start().await.unwrap();
    let mut alice = client(&server, "alice").await;

    alice.handle.join("Public").unwrap();
    joined(&mut alice, "Public").await;
    alice.handle.select_message("Public", MessageId(42)).unwrap();
    alice.handle.ping().unwrap();

    wait_for(&mut alice, |n| match n {
        Notification::BodyAvailable(_) => panic!("server has no message 42"),
        Notification::Pong => Some(()),
        _ => None,
    })
    .await;

    finish(alice).await;
}

#[tokio::test]
async fn connect_refused_is_reported() {
    let server = SimServer::start().await.unwrap();
    let port = server.port();
    drop(server);
    tokio::time::sleep(Duration::from_millis(20)).await;

    let result = connect(ClientConfig::new("127.0.0.1", port, "alice")).await;
    assert!(matches!(result, Err(AppError::Transport(TransportError::Connect { .. }))));
}

#[tokio::test]
async fn invalid_user_name_is_rejected_before_connecting() {
    let result = connect(ClientConfig::new("127.0.0.1", 1, "a|b")).await;
    assert!(matches!(result, Err(AppError::Session(_))));
}
