//! Service-level errors for tenancy operations.

use crate::error::{Classify, ErrorKind, Resource};
use crate::tenancy::{
    domain::{ParseTeamRoleError, TeamId, TeamRole, TenancyDomainError},
    ports::TenancyRepositoryError,
};
use thiserror::Error;

/// Errors returned by tenancy services and the access scope resolver.
#[derive(Debug, Error)]
pub enum TenancyServiceError {
    /// Domain validation failed.
    #[error(transparent)]
    Domain(#[from] TenancyDomainError),
    /// A role string could not be parsed.
    #[error(transparent)]
    InvalidRole(#[from] ParseTeamRoleError),
    /// Repository operation failed.
    #[error(transparent)]
    Repository(#[from] TenancyRepositoryError),
    /// The resource does not exist or is outside the caller's scope.
    #[error("{0} not found")]
    NotFound(Resource),
    /// The caller is in scope but its role is insufficient.
    #[error("this operation requires the {required} role")]
    Forbidden {
        /// Minimum role the operation needs.
        required: TeamRole,
    },
    /// The designated owner cannot be removed through membership deletion.
    #[error("the owner of team {0} cannot be removed from it")]
    OwnerMembershipProtected(TeamId),
}

/// Result type for tenancy service operations.
pub type TenancyServiceResult<T> = Result<T, TenancyServiceError>;

impl Classify for TenancyRepositoryError {
    fn kind(&self) -> ErrorKind {
        match self {
            Self::DuplicateTeamSlug(_)
            | Self::DuplicateMembership { .. }
            | Self::DuplicateProjectSlug { .. } => ErrorKind::Conflict,
            Self::MembershipNotFound { .. } | Self::ProjectNotFound(_) => ErrorKind::NotFound,
            Self::Persistence(_) => ErrorKind::Internal,
        }
    }
}

impl Classify for TenancyServiceError {
    fn kind(&self) -> ErrorKind {
        match self {
            Self::Domain(_) | Self::InvalidRole(_) => ErrorKind::Validation,
            Self::Repository(err) => err.kind(),
            Self::NotFound(_) => ErrorKind::NotFound,
            Self::Forbidden { .. } => ErrorKind::Forbidden,
            Self::OwnerMembershipProtected(_) => ErrorKind::Conflict,
        }
    }
}
