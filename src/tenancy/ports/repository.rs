//! Repository port for teams, memberships, projects and task sequences.

use crate::tenancy::domain::{Project, ProjectId, Slug, Team, TeamId, TeamMembership, UserId};
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// Result type for tenancy repository operations.
pub type TenancyRepositoryResult<T> = Result<T, TenancyRepositoryError>;

/// Tenancy persistence contract.
#[async_trait]
pub trait TenancyRepository: Send + Sync {
    /// Stores a new team.
    ///
    /// # Errors
    ///
    /// Returns [`TenancyRepositoryError::DuplicateTeamSlug`] when another team
    /// already uses the slug.
    async fn store_team(&self, team: &Team) -> TenancyRepositoryResult<()>;

    /// Finds a team by identifier.
    async fn find_team(&self, id: TeamId) -> TenancyRepositoryResult<Option<Team>>;

    /// Returns the teams with the given identifiers.
    async fn find_teams(&self, ids: &[TeamId]) -> TenancyRepositoryResult<Vec<Team>>;

    /// Returns every team where `user_id` is the designated owner or holds a
    /// membership.
    async fn team_ids_for_user(&self, user_id: UserId) -> TenancyRepositoryResult<Vec<TeamId>>;

    /// Stores a membership.
    ///
    /// # Errors
    ///
    /// Returns [`TenancyRepositoryError::DuplicateMembership`] when the user
    /// already belongs to the team.
    async fn store_membership(&self, membership: &TeamMembership) -> TenancyRepositoryResult<()>;

    /// Finds the stored membership of a user in a team.
    async fn find_membership(
        &self,
        team_id: TeamId,
        user_id: UserId,
    ) -> TenancyRepositoryResult<Option<TeamMembership>>;

    /// Lists stored memberships of a team.
    async fn list_memberships(&self, team_id: TeamId)
    -> TenancyRepositoryResult<Vec<TeamMembership>>;

    /// Removes a membership.
    ///
    /// # Errors
    ///
    /// Returns [`TenancyRepositoryError::MembershipNotFound`] when the user
    /// holds no stored membership in the team.
    async fn delete_membership(&self, team_id: TeamId, user_id: UserId)
    -> TenancyRepositoryResult<()>;

    /// Stores a new project.
    ///
    /// # Errors
    ///
    /// Returns [`TenancyRepositoryError::DuplicateProjectSlug`] when the slug
    /// is already used within the team.
    async fn store_project(&self, project: &Project) -> TenancyRepositoryResult<()>;

    /// Persists a renamed project. The task sequence is never overwritten.
    ///
    /// # Errors
    ///
    /// Returns [`TenancyRepositoryError::ProjectNotFound`] when the project is
    /// missing or [`TenancyRepositoryError::DuplicateProjectSlug`] on a slug
    /// collision.
    async fn update_project(&self, project: &Project) -> TenancyRepositoryResult<()>;

    /// Finds a project by identifier.
    async fn find_project(&self, id: ProjectId) -> TenancyRepositoryResult<Option<Project>>;

    /// Lists projects owned by any of the given teams, ordered by name.
    async fn list_projects(&self, team_ids: &[TeamId]) -> TenancyRepositoryResult<Vec<Project>>;

    /// Deletes a project together with its lanes and tasks.
    ///
    /// # Errors
    ///
    /// Returns [`TenancyRepositoryError::ProjectNotFound`] when the project is
    /// missing.
    async fn delete_project(&self, id: ProjectId) -> TenancyRepositoryResult<()>;

    /// Atomically reads the project's task sequence and increments it,
    /// returning the value read.
    ///
    /// Concurrent callers never observe the same value.
    ///
    /// # Errors
    ///
    /// Returns [`TenancyRepositoryError::ProjectNotFound`] when the project is
    /// missing.
    async fn allocate_task_sequence(&self, id: ProjectId) -> TenancyRepositoryResult<u64>;
}

/// Errors returned by tenancy repository implementations.
#[derive(Debug, Clone, Error)]
pub enum TenancyRepositoryError {
    /// Another team already uses the slug.
    #[error("duplicate team slug: {0}")]
    DuplicateTeamSlug(Slug),

    /// The user already belongs to the team.
    #[error("user {user_id} is already a member of team {team_id}")]
    DuplicateMembership {
        /// Team identifier.
        team_id: TeamId,
        /// User identifier.
        user_id: UserId,
    },

    /// No stored membership exists for the user in the team.
    #[error("user {user_id} is not a member of team {team_id}")]
    MembershipNotFound {
        /// Team identifier.
        team_id: TeamId,
        /// User identifier.
        user_id: UserId,
    },

    /// Another project of the team already uses the slug.
    #[error("duplicate project slug '{slug}' in team {team_id}")]
    DuplicateProjectSlug {
        /// Team identifier.
        team_id: TeamId,
        /// Conflicting slug.
        slug: Slug,
    },

    /// The project was not found.
    #[error("project not found: {0}")]
    ProjectNotFound(ProjectId),

    /// Persistence-layer failure.
    #[error("persistence error: {0}")]
    Persistence(Arc<dyn std::error::Error + Send + Sync>),
}

impl TenancyRepositoryError {
    /// Wraps a persistence error.
    #[must_use]
    pub fn persistence(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Persistence(Arc::new(err))
    }
}
