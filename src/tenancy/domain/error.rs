//! Error types for tenancy domain validation and parsing.

use thiserror::Error;

/// Errors returned while constructing tenancy domain values.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TenancyDomainError {
    /// The team name is empty after trimming.
    #[error("team name must not be empty")]
    EmptyTeamName,

    /// The project name is empty after trimming.
    #[error("project name must not be empty")]
    EmptyProjectName,

    /// A name exceeds the persisted column width.
    #[error("name exceeds {max} characters")]
    NameTooLong {
        /// Maximum accepted length.
        max: usize,
    },

    /// The slug is empty or contains characters other than `[a-z0-9-]`.
    #[error("invalid slug '{0}', expected lowercase letters, digits and dashes")]
    InvalidSlug(String),

    /// The `owner` role is reserved for the team's designated owner.
    #[error("the owner role cannot be granted through membership")]
    OwnerRoleReserved,
}

/// Error returned while parsing team roles from persistence or requests.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown team role: {0}")]
pub struct ParseTeamRoleError(pub String);
