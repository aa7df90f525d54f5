//! Session scenarios driven through raw frames.

use pinboard_client::{
    BodyState, Command, DisconnectReason, Frame, GroupSummary, MessageId, Notification, Session,
    SessionAction, SessionConfig, SessionError, SessionEvent,
};

fn session() -> Session {
    Session::new(SessionConfig::new("me")).unwrap()
}

fn frame(session: &mut Session, line: &str) -> Vec<SessionAction> {
    session.handle(SessionEvent::FrameReceived(Frame::from(line.to_string()))).unwrap()
}

fn select(session: &mut Session, group: &str, id: u64) -> Vec<SessionAction> {
    session
        .handle(SessionEvent::SelectMessage { group: group.into(), id: Some(MessageId(id)) })
        .unwrap()
}

fn wire(actions: &[SessionAction]) -> Vec<String> {
    actions
        .iter()
        .filter_map(|action| match action {
            SessionAction::Send(command) => Some(command.to_frame().to_string()),
            SessionAction::Notify(_) => None,
        })
        .collect()
}

fn notifications(actions: Vec<SessionAction>) -> Vec<Notification> {
    actions
        .into_iter()
        .filter_map(|action| match action {
            SessionAction::Notify(notification) => Some(notification),
            SessionAction::Send(_) => None,
        })
        .collect()
}

#[test]
fn groups_list_auto_joins_default_group() {
    let mut session = session();
    let actions = frame(&mut session, "GROUPS|Public|Sports");

    assert_eq!(wire(&actions), vec!["JOIN|Public|me"]);
    assert_eq!(notifications(actions), vec![Notification::GroupsUpdated {
        groups: vec![
            GroupSummary { name: "Public".into(), joined: false },
            GroupSummary { name: "Sports".into(), joined: false },
        ],
    }]);
    assert!(!session.is_joined("Public"));
    assert!(!session.is_joined("Sports"));
}

#[test]
fn auto_join_not_repeated_once_joined() {
    let mut session = session();
    frame(&mut session, "GROUPS|Public|Sports");
    frame(&mut session, "JOIN|Public|me");

    let actions = frame(&mut session, "GROUPS|Public|Sports");
    assert!(wire(&actions).is_empty());
}

#[test]
fn auto_join_can_be_disabled() {
    let mut session = Session::new(SessionConfig::new("me").without_auto_join()).unwrap();
    let actions = frame(&mut session, "GROUPS|Public|Sports");
    assert!(wire(&actions).is_empty());
}

#[test]
fn auto_join_ignores_lists_without_default_group() {
    let mut session = session();
    let actions = frame(&mut session, "GROUPS|Sports|Music");
    assert!(wire(&actions).is_empty());
}

#[test]
fn join_then_header_are_applied_in_order() {
    let mut session = session();
    let first = frame(&mut session, "JOIN|G|alice");
    let second = frame(&mut session, "MESSAGE|G|7");

    assert_eq!(notifications(first), vec![Notification::MemberAdded {
        group: "G".into(),
        user: "alice".into(),
    }]);
    assert_eq!(notifications(second), vec![Notification::HeaderAdded {
        group: "G".into(),
        id: MessageId(7),
    }]);

    let group = session.group("G").unwrap();
    assert!(group.has_member("alice"));
    assert_eq!(group.headers(), &[MessageId(7)]);
}

#[test]
fn repeated_selection_sends_one_view() {
    let mut session = session();
    frame(&mut session, "MESSAGE|G|7");

    let first = select(&mut session, "G", 7);
    let second = select(&mut session, "G", 7);

    assert_eq!(wire(&first), vec!["VIEW|G|7"]);
    assert!(second.is_empty());
    assert_eq!(
        session.group("G").map(|g| g.body_state(MessageId(7))),
        Some(BodyState::FetchInFlight)
    );
}

#[test]
fn body_for_active_selection_is_delivered() {
    let mut session = session();
    frame(&mut session, "MESSAGE|Public|3");
    select(&mut session, "Public", 3);

    let actions = frame(&mut session, "VIEW|Public|3|bob|2024-02-02T08:00:00|Hello|World");
    let notes: [Notification; 1] = notifications(actions).try_into().unwrap();
    let [Notification::BodyAvailable(body)] = notes else {
        panic!("expected a single bodyAvailable");
    };

    assert_eq!(body.group, "Public");
    assert_eq!(body.id, MessageId(3));
    assert_eq!(body.sender, "bob");
    assert_eq!(body.posted_at.as_str(), "2024-02-02T08:00:00");
    assert_eq!(body.subject, "Hello");
    assert_eq!(body.content, "World");
}

#[test]
fn body_for_stale_selection_is_cached_silently() {
    let mut session = session();
    frame(&mut session, "MESSAGE|Public|3");
    frame(&mut session, "MESSAGE|Public|4");
    select(&mut session, "Public", 3);
    select(&mut session, "Public", 4);

    let actions = frame(&mut session, "VIEW|Public|3|bob|2024-02-02T08:00:00|Hello|World");
    assert!(actions.is_empty());

    let reselect = select(&mut session, "Public", 3);
    assert!(wire(&reselect).is_empty());
    assert!(matches!(
        notifications(reselect).as_slice(),
        [Notification::BodyAvailable(body)] if body.id == MessageId(3)
    ));
}

#[test]
fn empty_post_never_reaches_the_wire() {
    let mut session = session();
    for (subject, content, expected) in [
        ("", "there", SessionError::EmptySubject),
        ("Hi", "", SessionError::EmptyContent),
    ] {
        let result = session.handle(SessionEvent::RequestPost {
            group: "General".into(),
            subject: subject.into(),
            content: content.into(),
        });
        assert_eq!(result, Err(expected));
    }
}

#[test]
fn post_encodes_exact_frame() {
    let mut session = session();
    let actions = session
        .handle(SessionEvent::RequestPost {
            group: "General".into(),
            subject: "Hi".into(),
            content: "there".into(),
        })
        .unwrap();

    assert_eq!(actions, vec![SessionAction::Send(Command::Post {
        group: "General".into(),
        subject: "Hi".into(),
        content: "there".into(),
    })]);
    assert_eq!(Command::Post {
        group: "General".into(),
        subject: "Hi".into(),
        content: "there".into(),
    }
    .to_frame()
    .to_wire(), b"POST|General|Hi|there\n");
}

#[test]
fn garbage_is_discarded_without_mutation() {
    let mut session = session();
    frame(&mut session, "GROUPS|Public|Sports");
    frame(&mut session, "JOIN|Public|me");
    let before = session.snapshot();

    let malformed =
        ["GARBAGE", "", "JOIN|Public", "MESSAGE|Public|-1", "VIEW|Public|3|bob|yesterday|a|b"];
    for line in malformed {
        let actions = frame(&mut session, line);
        assert!(
            matches!(actions.as_slice(), [SessionAction::Notify(
                Notification::ParseWarning { .. }
            )]),
            "{line:?} produced {actions:?}"
        );
    }

    assert_eq!(session.snapshot(), before);
}

#[test]
fn rejoin_after_leave_restores_membership() {
    let mut session = session();
    frame(&mut session, "JOIN|Sports|me");
    frame(&mut session, "LEAVE|Sports|me");
    assert!(!session.is_joined("Sports"));

    let actions = session.handle(SessionEvent::RequestJoin { group: "Sports".into() }).unwrap();
    assert_eq!(wire(&actions), vec!["JOIN|Sports|me"]);

    frame(&mut session, "JOIN|Sports|me");
    assert!(session.is_joined("Sports"));
}

#[test]
fn server_join_replay_reconciles() {
    let mut session = session();
    for line in ["JOIN|Public|me", "MESSAGE|Public|10", "MESSAGE|Public|11", "JOIN|Public|alice"] {
        frame(&mut session, line);
    }

    let group = session.group("Public").unwrap();
    assert!(group.is_joined());
    assert_eq!(group.members().collect::<Vec<_>>(), vec!["alice", "me"]);
    assert_eq!(group.headers(), &[MessageId(10), MessageId(11)]);
}

#[test]
fn disconnect_keeps_catalog() {
    let mut session = session();
    frame(&mut session, "JOIN|Public|me");
    frame(&mut session, "MESSAGE|Public|3");
    frame(&mut session, "VIEW|Public|3|bob|2024-02-02T08:00:00Z|Hello|World");

    session.handle(SessionEvent::Disconnected { reason: DisconnectReason::PeerClosed }).unwrap();

    let group = session.group("Public").unwrap();
    assert!(!group.is_joined());
    assert_eq!(group.headers(), &[MessageId(3)]);
    assert_eq!(group.body_state(MessageId(3)), BodyState::Cached);
}

#[test]
fn ping_round_trip() {
    let mut session = session();
    let actions = session.handle(SessionEvent::Ping).unwrap();
    assert_eq!(wire(&actions), vec!["PING"]);

    assert_eq!(notifications(frame(&mut session, "PING")), vec![Notification::Pong]);
}
