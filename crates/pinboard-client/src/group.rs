//! Per-group state.
//!
//! A [`Group`] is created the first time anything names it and lives for the
//! rest of the session. Leaving only clears the membership flag, so a group
//! can be rejoined without losing its catalog.

use std::collections::{BTreeSet, HashMap, HashSet};

use pinboard_proto::{MessageBody, MessageId};

/// Fetch state of one message body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BodyState {
    /// Not fetched and no request outstanding.
    NoBody,
    /// A `VIEW` request is outstanding.
    FetchInFlight,
    /// Body is cached.
    Cached,
}

/// Name and membership flag of a group, as carried by notifications.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupSummary {
    /// Group name.
    pub name: String,
    /// Whether the local user is a member.
    pub joined: bool,
}

/// Client-side view of one discussion group.
#[derive(Debug, Clone)]
pub struct Group {
    name: String,
    joined: bool,
    members: BTreeSet<String>,
    /// Arrival order of `MESSAGE` events; no duplicates.
    headers: Vec<MessageId>,
    bodies: HashMap<MessageId, MessageBody>,
    in_flight: HashSet<MessageId>,
    selected: Option<MessageId>,
}

impl Group {
    pub(crate) fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            joined: false,
            members: BTreeSet::new(),
            headers: Vec::new(),
            bodies: HashMap::new(),
            in_flight: HashSet::new(),
            selected: None,
        }
    }

    /// Group name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Whether the local user is a member.
    pub fn is_joined(&self) -> bool {
        self.joined
    }

    /// Members currently observed in the group, sorted.
    pub fn members(&self) -> impl Iterator<Item = &str> {
        self.members.iter().map(String::as_str)
    }

    /// Whether `user` is currently a member.
    pub fn has_member(&self, user: &str) -> bool {
        self.members.contains(user)
    }

    /// Message ids in arrival order.
    pub fn headers(&self) -> &[MessageId] {
        &self.headers
    }

    /// Cached body for `id`.
    pub fn body(&self, id: MessageId) -> Option<&MessageBody> {
        self.bodies.get(&id)
    }

    /// Fetch state for `id`.
    pub fn body_state(&self, id: MessageId) -> BodyState {
        if self.bodies.contains_key(&id) {
            BodyState::Cached
        } else if self.in_flight.contains(&id) {
            BodyState::FetchInFlight
        } else {
            BodyState::NoBody
        }
    }

    /// Message the user currently has selected in this group.
    pub fn selection(&self) -> Option<MessageId> {
        self.selected
    }

    /// Summary for notifications.
    pub fn summary(&self) -> GroupSummary {
        GroupSummary { name: self.name.clone(), joined: self.joined }
    }

    pub(crate) fn set_joined(&mut self, joined: bool) {
        self.joined = joined;
    }

    pub(crate) fn add_member(&mut self, user: &str) -> bool {
        self.members.insert(user.to_string())
    }

    pub(crate) fn remove_member(&mut self, user: &str) -> bool {
        self.members.remove(user)
    }

    /// Append a header. Returns `false` if it was already known.
    pub(crate) fn add_header(&mut self, id: MessageId) -> bool {
        if self.headers.contains(&id) {
            return false;
        }
        self.headers.push(id);
        true
    }

    pub(crate) fn select(&mut self, id: Option<MessageId>) {
        self.selected = id;
    }

    /// Mark a fetch as outstanding. Returns `false` if one already was.
    pub(crate) fn start_fetch(&mut self, id: MessageId) -> bool {
        self.in_flight.insert(id)
    }

    /// Cache a body and resolve its fetch. The first body for an id wins.
    pub(crate) fn cache_body(&mut self, body: MessageBody) {
        self.in_flight.remove(&body.id);
        self.bodies.entry(body.id).or_insert(body);
    }

    /// Forget connection-scoped state: membership and outstanding fetches.
    pub(crate) fn reset_connection_state(&mut self) {
        self.joined = false;
        self.members.clear();
        self.in_flight.clear();
    }

    pub(crate) fn in_flight(&self) -> impl Iterator<Item = MessageId> + '_ {
        self.in_flight.iter().copied()
    }

    pub(crate) fn cached(&self) -> impl Iterator<Item = MessageId> + '_ {
        self.bodies.keys().copied()
    }
}

#[cfg(test)]
mod tests {
    use pinboard_proto::PostDate;

    use super::*;

    fn body(id: u64, subject: &str) -> MessageBody {
        MessageBody {
            group: "Public".into(),
            id: MessageId(id),
            sender: "bob".into(),
            posted_at: PostDate::parse("2024-02-02T08:00:00").unwrap(),
            subject: subject.into(),
            content: "World".into(),
        }
    }

    #[test]
    fn body_state_follows_fetch_lifecycle() {
        let mut group = Group::new("Public");
        let id = MessageId(3);
        assert_eq!(group.body_state(id), BodyState::NoBody);

        assert!(group.start_fetch(id));
        assert!(!group.start_fetch(id));
        assert_eq!(group.body_state(id), BodyState::FetchInFlight);

        group.cache_body(body(3, "Hello"));
        assert_eq!(group.body_state(id), BodyState::Cached);
    }

    #[test]
    fn cached_bodies_are_immutable() {
        let mut group = Group::new("Public");
        group.cache_body(body(3, "first"));
        group.cache_body(body(3, "second"));

        assert_eq!(group.body(MessageId(3)).map(|b| b.subject.as_str()), Some("first"));
    }

    #[test]
    fn headers_keep_arrival_order_without_duplicates() {
        let mut group = Group::new("Public");
        assert!(group.add_header(MessageId(9)));
        assert!(group.add_header(MessageId(2)));
        assert!(!group.add_header(MessageId(9)));

        assert_eq!(group.headers(), &[MessageId(9), MessageId(2)]);
    }
}
