//! Authenticated caller identity.

use super::UserId;
use serde::{Deserialize, Serialize};

/// How the caller proved its identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuthMethod {
    /// A session token issued by the delegated identity provider.
    Session,
    /// The static service credential, acting on behalf of a named user.
    ServiceCredential,
}

/// The principal a request acts as.
///
/// Authorization is never taken from the principal itself; every operation
/// re-derives the principal's scope from persisted memberships.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Principal {
    user_id: UserId,
    method: AuthMethod,
}

impl Principal {
    /// Creates a principal authenticated through a session.
    #[must_use]
    pub const fn session(user_id: UserId) -> Self {
        Self {
            user_id,
            method: AuthMethod::Session,
        }
    }

    /// Creates a principal named by a service-credential caller.
    #[must_use]
    pub const fn service(user_id: UserId) -> Self {
        Self {
            user_id,
            method: AuthMethod::ServiceCredential,
        }
    }

    /// Returns the acting user.
    #[must_use]
    pub const fn user_id(&self) -> UserId {
        self.user_id
    }

    /// Returns how the principal authenticated.
    #[must_use]
    pub const fn method(&self) -> AuthMethod {
        self.method
    }
}
