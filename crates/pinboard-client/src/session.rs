//! Session state machine.
//!
//! The `Session` is the reconciliation engine: it applies decoded server
//! events to the local view of groups, and turns user intents into commands.
//! The server is the single source of truth for membership, so intents never
//! change membership locally; only the echoed `JOIN`/`LEAVE` events do.
//!
//! # Ordering
//!
//! Events are applied strictly in the order they are fed. The protocol has no
//! request ids; a `JOIN` echo for the local user arrives before any later
//! event about that membership because the connection is one ordered stream.

use std::collections::HashMap;

use pinboard_proto::{Command, Event, Frame, MessageBody, MessageId, reserved_char};

use crate::{
    DisconnectReason, Group, GroupSummary, Notification, SessionConfig, SessionError,
    event::{SessionAction, SessionEvent},
};

/// Client session: the local user and every group seen so far.
///
/// Single-writer. Every entry point takes `&mut self`; the caller funnels
/// frames and intents through one serialization point.
#[derive(Debug, Clone)]
pub struct Session {
    config: SessionConfig,
    groups: HashMap<String, Group>,
    /// Group names in first-seen order.
    order: Vec<String>,
}

impl Session {
    /// Create an empty session.
    ///
    /// # Errors
    ///
    /// - `SessionError::EmptyUserName` / `InvalidField` if the user name cannot
    ///   be sent on the wire
    /// - `SessionError::EmptyGroupName` / `InvalidField` for a bad auto-join
    ///   group
    pub fn new(config: SessionConfig) -> Result<Self, SessionError> {
        if config.user_name.is_empty() {
            return Err(SessionError::EmptyUserName);
        }
        check_reserved("user name", &config.user_name)?;
        if let Some(group) = &config.auto_join_group {
            validate_group(group)?;
        }

        Ok(Self { config, groups: HashMap::new(), order: Vec::new() })
    }

    /// Name the local user joins groups under.
    pub fn user_name(&self) -> &str {
        &self.config.user_name
    }

    /// A group by name. `None` if never referenced.
    pub fn group(&self, name: &str) -> Option<&Group> {
        self.groups.get(name)
    }

    /// All known groups, in first-seen order.
    pub fn groups(&self) -> impl Iterator<Item = &Group> {
        self.order.iter().filter_map(|name| self.groups.get(name))
    }

    /// Whether the local user is a member of `group`.
    pub fn is_joined(&self, group: &str) -> bool {
        self.groups.get(group).is_some_and(Group::is_joined)
    }

    /// Process an event and return resulting actions.
    ///
    /// Server frames never fail: malformed ones become a
    /// [`Notification::ParseWarning`] and leave state untouched.
    ///
    /// # Errors
    ///
    /// Returns `SessionError` when a user intent is rejected locally. Nothing
    /// is sent and state is unchanged.
    pub fn handle(&mut self, event: SessionEvent) -> Result<Vec<SessionAction>, SessionError> {
        match event {
            SessionEvent::FrameReceived(frame) => Ok(self.handle_frame(&frame)),
            SessionEvent::Disconnected { reason } => Ok(self.handle_disconnected(reason)),
            SessionEvent::RequestGroupList => Ok(vec![SessionAction::Send(Command::Groups)]),
            SessionEvent::RequestJoin { group } => self.request_join(group),
            SessionEvent::RequestLeave { group } => self.request_leave(group),
            SessionEvent::RequestPost { group, subject, content } => {
                self.request_post(group, subject, content)
            },
            SessionEvent::SelectMessage { group, id } => self.select_message(group, id),
            SessionEvent::Ping => Ok(vec![SessionAction::Send(Command::Ping)]),
            SessionEvent::Exit => Ok(vec![SessionAction::Send(Command::Exit)]),
        }
    }

    /// Apply a decoded server event.
    pub fn apply(&mut self, event: Event) -> Vec<SessionAction> {
        match event {
            Event::GroupsList { groups } => self.on_groups_list(&groups),
            Event::UserJoined { group, user } => self.on_join(group, user),
            Event::UserLeft { group, user } => self.on_leave(group, user),
            Event::MessagePosted { group, id } => self.on_message_header(group, id),
            Event::MessageBody(body) => self.on_message_body(body),
            Event::Ping => {
                tracing::debug!("keepalive answered");
                vec![SessionAction::Notify(Notification::Pong)]
            },
        }
    }

    fn handle_frame(&mut self, frame: &Frame) -> Vec<SessionAction> {
        match Event::decode(frame) {
            Ok(event) => self.apply(event),
            Err(reason) => {
                tracing::warn!(frame = %frame, error = %reason, "discarding malformed frame");
                vec![SessionAction::Notify(Notification::ParseWarning {
                    frame: frame.to_string(),
                    reason,
                })]
            },
        }
    }

    fn handle_disconnected(&mut self, reason: DisconnectReason) -> Vec<SessionAction> {
        tracing::info!(%reason, "session disconnected");
        for group in self.groups.values_mut() {
            group.reset_connection_state();
        }
        vec![SessionAction::Notify(Notification::Disconnected { reason })]
    }

    fn on_groups_list(&mut self, names: &[String]) -> Vec<SessionAction> {
        for name in names {
            self.group_mut(name);
        }

        let mut actions =
            vec![SessionAction::Notify(Notification::GroupsUpdated { groups: self.summaries() })];

        if let Some(default) = self.config.auto_join_group.as_deref()
            && names.iter().any(|name| name == default)
            && !self.is_joined(default)
        {
            tracing::info!(group = default, "auto-joining default group");
            actions.push(SessionAction::Send(Command::Join {
                group: default.to_string(),
                name: self.config.user_name.clone(),
            }));
        }

        actions
    }

    fn on_join(&mut self, group: String, user: String) -> Vec<SessionAction> {
        let is_local = user == self.config.user_name;
        let entry = self.group_mut(&group);
        entry.add_member(&user);

        if is_local {
            entry.set_joined(true);
            tracing::info!(group = %group, "joined group");
            vec![SessionAction::Notify(Notification::Joined { group })]
        } else {
            tracing::debug!(group = %group, user = %user, "member joined");
            vec![SessionAction::Notify(Notification::MemberAdded { group, user })]
        }
    }

    fn on_leave(&mut self, group: String, user: String) -> Vec<SessionAction> {
        let is_local = user == self.config.user_name;
        let entry = self.group_mut(&group);
        entry.remove_member(&user);

        if is_local {
            entry.set_joined(false);
            tracing::info!(group = %group, "left group");
            vec![SessionAction::Notify(Notification::Left { group })]
        } else {
            tracing::debug!(group = %group, user = %user, "member left");
            vec![SessionAction::Notify(Notification::MemberRemoved { group, user })]
        }
    }

    fn on_message_header(&mut self, group: String, id: MessageId) -> Vec<SessionAction> {
        if self.group_mut(&group).add_header(id) {
            vec![SessionAction::Notify(Notification::HeaderAdded { group, id })]
        } else {
            tracing::debug!(group = %group, %id, "duplicate message header");
            vec![]
        }
    }

    fn on_message_body(&mut self, body: MessageBody) -> Vec<SessionAction> {
        let id = body.id;
        let entry = self.group_mut(&body.group);
        entry.cache_body(body);

        if entry.selection() == Some(id)
            && let Some(cached) = entry.body(id)
        {
            return vec![SessionAction::Notify(Notification::BodyAvailable(cached.clone()))];
        }

        tracing::debug!(group = entry.name(), %id, "cached body for unselected message");
        vec![]
    }

    fn request_join(&self, group: String) -> Result<Vec<SessionAction>, SessionError> {
        validate_group(&group)?;
        Ok(vec![SessionAction::Send(Command::Join {
            group,
            name: self.config.user_name.clone(),
        })])
    }

    fn request_leave(&self, group: String) -> Result<Vec<SessionAction>, SessionError> {
        validate_group(&group)?;
        Ok(vec![SessionAction::Send(Command::Leave { group })])
    }

    fn request_post(
        &self,
        group: String,
        subject: String,
        content: String,
    ) -> Result<Vec<SessionAction>, SessionError> {
        validate_group(&group)?;
        if subject.is_empty() {
            return Err(SessionError::EmptySubject);
        }
        if content.is_empty() {
            return Err(SessionError::EmptyContent);
        }
        check_reserved("subject", &subject)?;
        check_reserved("content", &content)?;

        Ok(vec![SessionAction::Send(Command::Post { group, subject, content })])
    }

    fn select_message(
        &mut self,
        group: String,
        id: Option<MessageId>,
    ) -> Result<Vec<SessionAction>, SessionError> {
        validate_group(&group)?;
        let entry = self.group_mut(&group);
        entry.select(id);

        let Some(id) = id else {
            return Ok(vec![SessionAction::Notify(Notification::Cleared { group })]);
        };

        if let Some(cached) = entry.body(id) {
            return Ok(vec![SessionAction::Notify(Notification::BodyAvailable(cached.clone()))]);
        }

        if !entry.start_fetch(id) {
            tracing::debug!(group = %group, %id, "fetch already in flight");
            return Ok(vec![]);
        }

        Ok(vec![SessionAction::Send(Command::View { group, id })])
    }

    /// Group by name, created on first reference.
    fn group_mut(&mut self, name: &str) -> &mut Group {
        let Self { groups, order, .. } = self;
        groups.entry(name.to_string()).or_insert_with(|| {
            order.push(name.to_string());
            Group::new(name)
        })
    }

    fn summaries(&self) -> Vec<GroupSummary> {
        self.groups().map(Group::summary).collect()
    }

    /// Observable state for tests and invariant checks.
    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            user_name: self.config.user_name.clone(),
            groups: self.groups().map(GroupSnapshot::from).collect(),
        }
    }
}

/// Point-in-time copy of a session's observable state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionSnapshot {
    /// Local user name.
    pub user_name: String,
    /// Groups in first-seen order.
    pub groups: Vec<GroupSnapshot>,
}

impl SessionSnapshot {
    /// A group by name.
    pub fn group(&self, name: &str) -> Option<&GroupSnapshot> {
        self.groups.iter().find(|g| g.name == name)
    }
}

/// Point-in-time copy of one group.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupSnapshot {
    /// Group name.
    pub name: String,
    /// Whether the local user is a member.
    pub joined: bool,
    /// Members, sorted.
    pub members: Vec<String>,
    /// Message ids in arrival order.
    pub headers: Vec<MessageId>,
    /// Ids with a cached body, sorted.
    pub cached: Vec<MessageId>,
    /// Ids with a fetch in flight, sorted.
    pub in_flight: Vec<MessageId>,
    /// Current selection.
    pub selected: Option<MessageId>,
}

impl From<&Group> for GroupSnapshot {
    fn from(group: &Group) -> Self {
        let mut cached: Vec<_> = group.cached().collect();
        cached.sort_unstable();
        let mut in_flight: Vec<_> = group.in_flight().collect();
        in_flight.sort_unstable();

        Self {
            name: group.name().to_string(),
            joined: group.is_joined(),
            members: group.members().map(str::to_string).collect(),
            headers: group.headers().to_vec(),
            cached,
            in_flight,
            selected: group.selection(),
        }
    }
}

fn validate_group(group: &str) -> Result<(), SessionError> {
    if group.is_empty() {
        return Err(SessionError::EmptyGroupName);
    }
    check_reserved("group", group)
}

fn check_reserved(field: &'static str, value: &str) -> Result<(), SessionError> {
    match reserved_char(value) {
        Some(found) => Err(SessionError::InvalidField { field, found }),
        None => Ok(()),
    }
}
