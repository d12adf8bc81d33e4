//! Error taxonomy shared by every bounded context.
//!
//! Each layer keeps its own `thiserror` enum, but every service-level error
//! can be classified into one [`ErrorKind`]. The HTTP boundary and the
//! optimistic mutation coordinator only ever look at the kind.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Discriminated classification of a failed operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// The caller did not present a usable identity.
    Unauthorized,
    /// The caller is authenticated and in scope but lacks the required role.
    Forbidden,
    /// The resource is absent or outside the caller's scope.
    ///
    /// The two cases are deliberately indistinguishable.
    NotFound,
    /// The request collides with existing state.
    Conflict,
    /// A required field is missing or malformed.
    Validation,
    /// Unexpected infrastructure failure.
    Internal,
}

impl ErrorKind {
    /// Returns the canonical wire representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Unauthorized => "unauthorized",
            Self::Forbidden => "forbidden",
            Self::NotFound => "not_found",
            Self::Conflict => "conflict",
            Self::Validation => "validation",
            Self::Internal => "internal",
        }
    }

    /// Classifies an HTTP status code returned by the board API.
    ///
    /// Unrecognised client errors fall back to [`ErrorKind::Validation`] and
    /// everything else to [`ErrorKind::Internal`].
    #[must_use]
    pub const fn from_status(status: u16) -> Self {
        match status {
            401 => Self::Unauthorized,
            403 => Self::Forbidden,
            404 => Self::NotFound,
            409 => Self::Conflict,
            400..=499 => Self::Validation,
            _ => Self::Internal,
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Kinds of resources named in "not found" errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Resource {
    /// A team.
    Team,
    /// A team membership.
    Membership,
    /// A project.
    Project,
    /// A lane.
    Lane,
    /// A task.
    Task,
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Team => "team",
            Self::Membership => "membership",
            Self::Project => "project",
            Self::Lane => "lane",
            Self::Task => "task",
        })
    }
}

/// Errors that can be classified into an [`ErrorKind`].
pub trait Classify {
    /// Returns the taxonomy kind for this error.
    fn kind(&self) -> ErrorKind;
}
