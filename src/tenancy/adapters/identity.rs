//! Static token-table identity provider.

use crate::tenancy::{domain::UserId, ports::IdentityProvider};
use async_trait::async_trait;
use std::collections::HashMap;

/// Identity provider backed by a fixed table of session tokens.
///
/// Used by the development server and by tests; production deployments plug
/// in an adapter for their real identity provider.
#[derive(Debug, Clone, Default)]
pub struct StaticIdentityProvider {
    sessions: HashMap<String, UserId>,
}

impl StaticIdentityProvider {
    /// Creates an empty provider that rejects every token.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a session token for a user.
    #[must_use]
    pub fn with_session(mut self, token: impl Into<String>, user_id: UserId) -> Self {
        self.sessions.insert(token.into(), user_id);
        self
    }
}

impl FromIterator<(String, UserId)> for StaticIdentityProvider {
    fn from_iter<I: IntoIterator<Item = (String, UserId)>>(iter: I) -> Self {
        Self {
            sessions: iter.into_iter().collect(),
        }
    }
}

#[async_trait]
impl IdentityProvider for StaticIdentityProvider {
    async fn resolve_session(&self, token: &str) -> Option<UserId> {
        self.sessions.get(token).copied()
    }
}
