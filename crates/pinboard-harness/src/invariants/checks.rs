//! Standard invariant checks.

use std::collections::HashSet;

use pinboard_client::GroupSnapshot;

use super::{Invariant, InvariantResult};

/// A message id appears in a group's header list at most once.
pub struct UniqueHeaders;

impl Invariant for UniqueHeaders {
    fn name(&self) -> &'static str {
        "unique_headers"
    }

    fn check(&self, _user: &str, group: &GroupSnapshot) -> InvariantResult {
        let mut seen = HashSet::new();
        match group.headers.iter().find(|id| !seen.insert(**id)) {
            Some(dup) => Err(format!("header {dup} listed twice")),
            None => Ok(()),
        }
    }
}

/// The local user is in a group's member set iff the group is joined.
///
/// Only the server's echo changes either side, and both change together.
pub struct LocalMembership;

impl Invariant for LocalMembership {
    fn name(&self) -> &'static str {
        "local_membership"
    }

    fn check(&self, user: &str, group: &GroupSnapshot) -> InvariantResult {
        let listed = group.members.iter().any(|m| m == user);
        if listed == group.joined {
            return Ok(());
        }
        Err(format!("joined={} but {user} listed={listed}", group.joined))
    }
}

/// A body is never both cached and awaiting a fetch.
pub struct FetchStateExclusive;

impl Invariant for FetchStateExclusive {
    fn name(&self) -> &'static str {
        "fetch_state_exclusive"
    }

    fn check(&self, _user: &str, group: &GroupSnapshot) -> InvariantResult {
        match group.in_flight.iter().find(|id| group.cached.contains(id)) {
            Some(id) => Err(format!("{id} cached with a fetch in flight")),
            None => Ok(()),
        }
    }
}
