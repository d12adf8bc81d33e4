//! Access scope resolution.
//!
//! Scope is re-derived from persisted ownership and memberships on every
//! call and never cached, so a revoked membership takes effect on the very
//! next request. A resource outside the caller's scope is reported as
//! [`TenancyServiceError::NotFound`], never as forbidden, so that callers
//! cannot probe for the existence of other tenants' data.

use super::{TenancyServiceError, TenancyServiceResult};
use crate::error::Resource;
use crate::tenancy::{
    domain::{Principal, Project, ProjectId, ProjectPath, Team, TeamId, TeamRole},
    ports::TenancyRepository,
};
use std::collections::HashSet;
use std::sync::Arc;

/// Teams a principal owns or belongs to.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TeamScope(HashSet<TeamId>);

impl TeamScope {
    /// Returns `true` when the team is accessible.
    #[must_use]
    pub fn contains(&self, team_id: TeamId) -> bool {
        self.0.contains(&team_id)
    }

    /// Returns `true` when no team is accessible.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns the accessible team identifiers in a stable order.
    #[must_use]
    pub fn to_sorted_vec(&self) -> Vec<TeamId> {
        let mut ids: Vec<TeamId> = self.0.iter().copied().collect();
        ids.sort_unstable();
        ids
    }
}

/// Projects within a principal's accessible teams.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProjectScope(HashSet<ProjectId>);

impl ProjectScope {
    /// Returns `true` when the project is accessible.
    #[must_use]
    pub fn contains(&self, project_id: ProjectId) -> bool {
        self.0.contains(&project_id)
    }

    /// Returns `true` when no project is accessible.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns the number of accessible projects.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }
}

/// Computes what a principal may touch.
pub struct AccessScopeResolver<R>
where
    R: TenancyRepository + ?Sized,
{
    repository: Arc<R>,
}

impl<R> Clone for AccessScopeResolver<R>
where
    R: TenancyRepository + ?Sized,
{
    fn clone(&self) -> Self {
        Self {
            repository: Arc::clone(&self.repository),
        }
    }
}

impl<R> AccessScopeResolver<R>
where
    R: TenancyRepository + ?Sized,
{
    /// Creates a resolver reading from the given repository.
    #[must_use]
    pub const fn new(repository: Arc<R>) -> Self {
        Self { repository }
    }

    /// Returns the teams where the principal is owner or member.
    ///
    /// # Errors
    ///
    /// Returns [`TenancyServiceError::Repository`] when the lookup fails.
    pub async fn team_scope(&self, principal: &Principal) -> TenancyServiceResult<TeamScope> {
        let ids = self
            .repository
            .team_ids_for_user(principal.user_id())
            .await?;
        Ok(TeamScope(ids.into_iter().collect()))
    }

    /// Returns the projects within the principal's accessible teams,
    /// optionally narrowed to one team.
    ///
    /// Narrowing to a team outside the scope yields an empty set.
    ///
    /// # Errors
    ///
    /// Returns [`TenancyServiceError::Repository`] when the lookup fails.
    pub async fn project_scope(
        &self,
        principal: &Principal,
        team_id: Option<TeamId>,
    ) -> TenancyServiceResult<ProjectScope> {
        let teams = self.team_scope(principal).await?;
        let team_ids = match team_id {
            Some(requested) if teams.contains(requested) => vec![requested],
            Some(_) => return Ok(ProjectScope::default()),
            None => teams.to_sorted_vec(),
        };
        if team_ids.is_empty() {
            return Ok(ProjectScope::default());
        }
        let projects = self.repository.list_projects(&team_ids).await?;
        Ok(ProjectScope(projects.iter().map(Project::id).collect()))
    }

    /// Returns the team when it lies within the principal's scope.
    ///
    /// # Errors
    ///
    /// Returns [`TenancyServiceError::NotFound`] when the team is missing or
    /// out of scope.
    pub async fn require_team(
        &self,
        principal: &Principal,
        team_id: TeamId,
    ) -> TenancyServiceResult<Team> {
        let scope = self.team_scope(principal).await?;
        if !scope.contains(team_id) {
            tracing::debug!(%team_id, user_id = %principal.user_id(), "team outside scope");
            return Err(TenancyServiceError::NotFound(Resource::Team));
        }
        self.repository
            .find_team(team_id)
            .await?
            .ok_or(TenancyServiceError::NotFound(Resource::Team))
    }

    /// Returns the principal's effective role in an accessible team.
    ///
    /// # Errors
    ///
    /// Returns [`TenancyServiceError::NotFound`] when the principal holds no
    /// role in the team.
    pub async fn role_in(&self, principal: &Principal, team: &Team) -> TenancyServiceResult<TeamRole> {
        if team.owner_id() == principal.user_id() {
            return Ok(TeamRole::Owner);
        }
        self.repository
            .find_membership(team.id(), principal.user_id())
            .await?
            .map(|membership| membership.role())
            .ok_or(TenancyServiceError::NotFound(Resource::Team))
    }

    /// Returns the team when the principal is in scope and holds at least
    /// `minimum`.
    ///
    /// # Errors
    ///
    /// Returns [`TenancyServiceError::NotFound`] when out of scope and
    /// [`TenancyServiceError::Forbidden`] when the role is insufficient.
    pub async fn require_role(
        &self,
        principal: &Principal,
        team_id: TeamId,
        minimum: TeamRole,
    ) -> TenancyServiceResult<Team> {
        let team = self.require_team(principal, team_id).await?;
        let role = self.role_in(principal, &team).await?;
        if !role.at_least(minimum) {
            return Err(TenancyServiceError::Forbidden { required: minimum });
        }
        Ok(team)
    }

    /// Returns the project addressed by `path` when it lies within the
    /// principal's scope and belongs to the addressed team.
    ///
    /// # Errors
    ///
    /// Returns [`TenancyServiceError::NotFound`] when the project is missing,
    /// out of scope, or owned by a different team.
    pub async fn require_project(
        &self,
        principal: &Principal,
        path: ProjectPath,
    ) -> TenancyServiceResult<Project> {
        let scope = self.project_scope(principal, Some(path.team_id)).await?;
        if !scope.contains(path.project_id) {
            tracing::debug!(
                project_id = %path.project_id,
                user_id = %principal.user_id(),
                "project outside scope"
            );
            return Err(TenancyServiceError::NotFound(Resource::Project));
        }
        self.repository
            .find_project(path.project_id)
            .await?
            .filter(|project| project.team_id() == path.team_id)
            .ok_or(TenancyServiceError::NotFound(Resource::Project))
    }
}
