//! Identity provider port.
//!
//! Session issuance belongs to a delegated identity provider; the board only
//! asks it which user a presented session token belongs to.

use crate::tenancy::domain::UserId;
use async_trait::async_trait;

/// Resolves session tokens to users.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Returns the user owning `token`, or `None` when the token is unknown
    /// or expired.
    async fn resolve_session(&self, token: &str) -> Option<UserId>;
}
