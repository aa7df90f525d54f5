//! One-line text rendering of notifications.

use std::io::{self, Write};

use pinboard_client::{GroupSummary, Notification};

/// Render `notification` as a single display line, without the newline.
pub fn render(notification: &Notification) -> String {
    match notification {
        Notification::GroupsUpdated { groups } => format!("groups: {}", group_list(groups)),
        Notification::Joined { group } => format!("[{group}] joined"),
        Notification::Left { group } => format!("[{group}] left"),
        Notification::MemberAdded { group, user } => format!("[{group}] {user} joined"),
        Notification::MemberRemoved { group, user } => format!("[{group}] {user} left"),
        Notification::HeaderAdded { group, id } => format!("[{group}] message {id}"),
        Notification::BodyAvailable(body) => format!(
            "[{}] #{} from {} at {}: {} | {}",
            body.group, body.id, body.sender, body.posted_at, body.subject, body.content
        ),
        Notification::Cleared { group } => format!("[{group}] selection cleared"),
        Notification::Disconnected { reason } => format!("disconnected: {reason}"),
        Notification::ParseWarning { frame, reason } => {
            format!("warning: ignored {frame:?}: {reason}")
        },
        Notification::IntentRejected { reason } => format!("rejected: {reason}"),
        Notification::Pong => "pong".to_string(),
    }
}

/// Write `notification` as one line to `out`.
///
/// # Errors
///
/// Propagates write errors from `out`.
pub fn write_line(out: &mut impl Write, notification: &Notification) -> io::Result<()> {
    writeln!(out, "{}", render(notification))?;
    out.flush()
}

fn group_list(groups: &[GroupSummary]) -> String {
    if groups.is_empty() {
        return "(none)".to_string();
    }

    groups
        .iter()
        .map(|g| if g.joined { format!("{}*", g.name) } else { g.name.clone() })
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use pinboard_client::{DisconnectReason, MessageBody, MessageId, PostDate, SessionError};

    use super::*;

    #[test]
    fn group_list_marks_joined_groups() {
        let line = render(&Notification::GroupsUpdated {
            groups: vec![
                GroupSummary { name: "Public".into(), joined: true },
                GroupSummary { name: "Group1".into(), joined: false },
            ],
        });
        assert_eq!(line, "groups: Public*, Group1");

        let empty = render(&Notification::GroupsUpdated { groups: vec![] });
        assert_eq!(empty, "groups: (none)");
    }

    #[test]
    fn body_shows_every_field() {
        let body = MessageBody {
            group: "Public".into(),
            id: MessageId(7),
            sender: "bob".into(),
            posted_at: PostDate::parse("2024-01-01T10:00:00").unwrap(),
            subject: "Hello".into(),
            content: "World".into(),
        };
        assert_eq!(
            render(&Notification::BodyAvailable(body)),
            "[Public] #7 from bob at 2024-01-01T10:00:00: Hello | World"
        );
    }

    #[test]
    fn membership_and_status_lines() {
        assert_eq!(
            render(&Notification::MemberAdded { group: "Public".into(), user: "amy".into() }),
            "[Public] amy joined"
        );
        assert_eq!(
            render(&Notification::Disconnected { reason: DisconnectReason::PeerClosed }),
            "disconnected: closed by server"
        );
        assert_eq!(
            render(&Notification::IntentRejected { reason: SessionError::EmptySubject }),
            "rejected: subject must not be empty"
        );
        assert_eq!(render(&Notification::Pong), "pong");
    }

    #[test]
    fn write_line_appends_newline() {
        let mut out = Vec::new();
        write_line(&mut out, &Notification::Cleared { group: "Public".into() }).unwrap();
        assert_eq!(out, b"[Public] selection cleared\n");
    }
}
