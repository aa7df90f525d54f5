//! Session configuration.

/// Group the client joins automatically when it first appears in a group
/// list.
pub const DEFAULT_GROUP: &str = "Public";

/// Settings for a [`Session`](crate::Session).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionConfig {
    /// Name the local user joins groups under.
    pub user_name: String,
    /// Group joined automatically on the first group list that contains it.
    /// `None` disables auto-join.
    pub auto_join_group: Option<String>,
}

impl SessionConfig {
    /// Config for `user_name` that auto-joins [`DEFAULT_GROUP`].
    pub fn new(user_name: impl Into<String>) -> Self {
        Self { user_name: user_name.into(), auto_join_group: Some(DEFAULT_GROUP.to_string()) }
    }

    /// Disable auto-join.
    #[must_use]
    pub fn without_auto_join(mut self) -> Self {
        self.auto_join_group = None;
        self
    }
}
