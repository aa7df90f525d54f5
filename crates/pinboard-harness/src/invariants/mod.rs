//! Invariant checking for session state.
//!
//! Invariants are properties that must hold after every event the session
//! applies, regardless of order, duplication or malformed input. Tests take a
//! [`SessionSnapshot`] after each step and run the registry against it.
//!
//! # Usage
//!
//! ```ignore
//! let registry = InvariantRegistry::standard();
//! registry.assert_all(&session.snapshot(), "after JOIN");
//! ```

mod checks;

use std::fmt;

pub use checks::{FetchStateExclusive, LocalMembership, UniqueHeaders};
use pinboard_client::{GroupSnapshot, SessionSnapshot};

/// Outcome of checking one group. The error describes what is wrong.
pub type InvariantResult = Result<(), String>;

/// One broken invariant in one group.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
    /// Which invariant broke.
    pub invariant: &'static str,
    /// Group it broke in.
    pub group: String,
    /// What was observed.
    pub detail: String,
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} in {}: {}", self.invariant, self.group, self.detail)
    }
}

impl std::error::Error for Violation {}

/// A per-group property of session state.
pub trait Invariant: Send + Sync {
    /// Stable name used in reports.
    fn name(&self) -> &'static str;

    /// Check `group` as seen by local user `user`.
    fn check(&self, user: &str, group: &GroupSnapshot) -> InvariantResult;
}

/// Set of invariants run against every group of a snapshot.
#[derive(Default)]
pub struct InvariantRegistry {
    invariants: Vec<Box<dyn Invariant>>,
}

impl InvariantRegistry {
    /// Registry with nothing registered.
    pub fn new() -> Self {
        Self::default()
    }

    /// [`UniqueHeaders`], [`LocalMembership`] and [`FetchStateExclusive`].
    pub fn standard() -> Self {
        let mut registry = Self::new();
        registry.add(UniqueHeaders);
        registry.add(LocalMembership);
        registry.add(FetchStateExclusive);
        registry
    }

    /// Register another invariant.
    pub fn add<I: Invariant + 'static>(&mut self, invariant: I) {
        self.invariants.push(Box::new(invariant));
    }

    /// Every violation in `state`, group by group, in registration order
    /// within a group.
    pub fn check_all(&self, state: &SessionSnapshot) -> Result<(), Vec<Violation>> {
        let mut violations = Vec::new();
        for group in &state.groups {
            for invariant in &self.invariants {
                if let Err(detail) = invariant.check(&state.user_name, group) {
                    violations.push(Violation {
                        invariant: invariant.name(),
                        group: group.name.clone(),
                        detail,
                    });
                }
            }
        }

        if violations.is_empty() { Ok(()) } else { Err(violations) }
    }

    /// Like [`check_all`](Self::check_all), but panics listing every
    /// violation. `context` names the step being checked.
    #[allow(clippy::panic)]
    pub fn assert_all(&self, state: &SessionSnapshot, context: &str) {
        let Err(violations) = self.check_all(state) else { return };

        let report = violations.iter().fold(String::new(), |mut out, v| {
            out.push_str("\n  ");
            out.push_str(&v.to_string());
            out
        });
        panic!("session invariants broken {context}:{report}");
    }

    /// Registered invariant count.
    pub fn len(&self) -> usize {
        self.invariants.len()
    }

    /// Whether nothing is registered.
    pub fn is_empty(&self) -> bool {
        self.invariants.is_empty()
    }
}
