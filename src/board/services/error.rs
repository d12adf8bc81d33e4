//! Service-level errors for lane and task operations.

use crate::board::{
    domain::{BoardDomainError, LaneKey, ParseTaskPriorityError},
    ports::BoardRepositoryError,
};
use crate::error::{Classify, ErrorKind, Resource};
use crate::tenancy::{ports::TenancyRepositoryError, services::TenancyServiceError};
use thiserror::Error;

/// Errors returned by lane, task and sequence services.
#[derive(Debug, Error)]
pub enum BoardServiceError {
    /// Domain validation failed.
    #[error(transparent)]
    Domain(#[from] BoardDomainError),
    /// A priority string could not be parsed.
    #[error(transparent)]
    InvalidPriority(#[from] ParseTaskPriorityError),
    /// Scope resolution failed.
    #[error(transparent)]
    Scope(#[from] TenancyServiceError),
    /// Task sequence allocation failed.
    #[error(transparent)]
    Sequence(#[from] TenancyRepositoryError),
    /// Repository operation failed.
    #[error(transparent)]
    Repository(#[from] BoardRepositoryError),
    /// The resource does not exist or is outside the caller's scope.
    #[error("{0} not found")]
    NotFound(Resource),
    /// The task status names no lane of the project.
    #[error("status '{0}' does not match any lane of the project")]
    UnknownStatus(LaneKey),
}

impl BoardServiceError {
    /// Reports a task write whose status lane vanished as an unknown status.
    #[must_use]
    pub(crate) fn from_task_write(err: BoardRepositoryError) -> Self {
        match err {
            BoardRepositoryError::UnknownLane { key, .. } => Self::UnknownStatus(key),
            other => Self::Repository(other),
        }
    }
}

/// Result type for board service operations.
pub type BoardServiceResult<T> = Result<T, BoardServiceError>;

impl Classify for BoardRepositoryError {
    fn kind(&self) -> ErrorKind {
        match self {
            Self::DuplicateLaneKey { .. } | Self::DuplicateLocalId { .. } | Self::LastLane(_) => {
                ErrorKind::Conflict
            }
            Self::LaneNotFound(_) | Self::TaskNotFound(_) => ErrorKind::NotFound,
            Self::UnknownLane { .. } => ErrorKind::Validation,
            Self::Persistence(_) => ErrorKind::Internal,
        }
    }
}

impl Classify for BoardServiceError {
    fn kind(&self) -> ErrorKind {
        match self {
            Self::Domain(_) | Self::InvalidPriority(_) | Self::UnknownStatus(_) => {
                ErrorKind::Validation
            }
            Self::Scope(err) => err.kind(),
            Self::Sequence(err) => err.kind(),
            Self::Repository(err) => err.kind(),
            Self::NotFound(_) => ErrorKind::NotFound,
        }
    }
}
