//! Service layer for teams and memberships.

use super::{AccessScopeResolver, TenancyServiceError, TenancyServiceResult};
use crate::tenancy::{
    domain::{Principal, Slug, Team, TeamId, TeamMembership, TeamName, TeamRole, UserId},
    ports::{TenancyRepository, TenancyRepositoryError},
};
use mockable::Clock;
use std::sync::Arc;

/// Request payload for creating a team.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateTeamRequest {
    name: String,
    slug: Option<String>,
}

impl CreateTeamRequest {
    /// Creates a request with the required team name.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            slug: None,
        }
    }

    /// Sets an explicit slug instead of deriving one from the name.
    #[must_use]
    pub fn with_slug(mut self, slug: impl Into<String>) -> Self {
        self.slug = Some(slug.into());
        self
    }
}

/// Request payload for adding a member to a team.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddMemberRequest {
    /// User to add.
    pub user_id: UserId,
    /// Requested role, `admin` or `member`.
    pub role: String,
}

impl AddMemberRequest {
    /// Creates a request.
    #[must_use]
    pub fn new(user_id: UserId, role: impl Into<String>) -> Self {
        Self {
            user_id,
            role: role.into(),
        }
    }
}

/// Team and membership orchestration service.
pub struct TeamService<R, C>
where
    R: TenancyRepository + ?Sized,
    C: Clock + Send + Sync,
{
    repository: Arc<R>,
    scope: AccessScopeResolver<R>,
    clock: Arc<C>,
}

impl<R, C> Clone for TeamService<R, C>
where
    R: TenancyRepository + ?Sized,
    C: Clock + Send + Sync,
{
    fn clone(&self) -> Self {
        Self {
            repository: Arc::clone(&self.repository),
            scope: self.scope.clone(),
            clock: Arc::clone(&self.clock),
        }
    }
}

impl<R, C> TeamService<R, C>
where
    R: TenancyRepository + ?Sized,
    C: Clock + Send + Sync,
{
    /// Creates a new team service.
    #[must_use]
    pub fn new(repository: Arc<R>, clock: Arc<C>) -> Self {
        let scope = AccessScopeResolver::new(Arc::clone(&repository));
        Self {
            repository,
            scope,
            clock,
        }
    }

    /// Creates a team owned by the calling principal.
    ///
    /// # Errors
    ///
    /// Returns validation errors for a blank name or bad slug and a conflict
    /// when the slug is taken.
    pub async fn create_team(
        &self,
        principal: &Principal,
        request: CreateTeamRequest,
    ) -> TenancyServiceResult<Team> {
        let name = TeamName::new(request.name)?;
        let slug = request.slug.map(Slug::new).transpose()?;
        let team = Team::new(name, principal.user_id(), slug, &*self.clock)?;
        self.repository.store_team(&team).await?;
        tracing::info!(team_id = %team.id(), owner = %team.owner_id(), "team created");
        Ok(team)
    }

    /// Lists every team the principal owns or belongs to.
    ///
    /// # Errors
    ///
    /// Returns repository errors.
    pub async fn list_teams(&self, principal: &Principal) -> TenancyServiceResult<Vec<Team>> {
        let scope = self.scope.team_scope(principal).await?;
        if scope.is_empty() {
            return Ok(Vec::new());
        }
        let mut teams = self.repository.find_teams(&scope.to_sorted_vec()).await?;
        teams.sort_by(|left, right| left.name().as_str().cmp(right.name().as_str()));
        Ok(teams)
    }

    /// Returns a team in the principal's scope.
    ///
    /// # Errors
    ///
    /// Returns [`TenancyServiceError::NotFound`] when out of scope.
    pub async fn get_team(
        &self,
        principal: &Principal,
        team_id: TeamId,
    ) -> TenancyServiceResult<Team> {
        self.scope.require_team(principal, team_id).await
    }

    /// Lists the team's members, the designated owner first.
    ///
    /// # Errors
    ///
    /// Returns [`TenancyServiceError::NotFound`] when out of scope.
    pub async fn list_members(
        &self,
        principal: &Principal,
        team_id: TeamId,
    ) -> TenancyServiceResult<Vec<TeamMembership>> {
        let team = self.scope.require_team(principal, team_id).await?;
        let stored = self.repository.list_memberships(team_id).await?;
        let mut members = Vec::with_capacity(stored.len() + 1);
        members.push(team.owner_membership());
        members.extend(
            stored
                .into_iter()
                .filter(|membership| membership.user_id() != team.owner_id()),
        );
        Ok(members)
    }

    /// Adds a member to the team. Requires the `admin` role.
    ///
    /// # Errors
    ///
    /// Returns [`TenancyServiceError::Forbidden`] for plain members, a
    /// validation error for an unknown or reserved role, and a conflict when
    /// the user already belongs to the team.
    pub async fn add_member(
        &self,
        principal: &Principal,
        team_id: TeamId,
        request: AddMemberRequest,
    ) -> TenancyServiceResult<TeamMembership> {
        let team = self
            .scope
            .require_role(principal, team_id, TeamRole::Admin)
            .await?;
        let role = TeamRole::try_from(request.role.as_str())?;
        if request.user_id == team.owner_id() {
            return Err(TenancyRepositoryError::DuplicateMembership {
                team_id,
                user_id: request.user_id,
            }
            .into());
        }
        let membership = TeamMembership::grant(team_id, request.user_id, role, &*self.clock)?;
        self.repository.store_membership(&membership).await?;
        tracing::info!(%team_id, user_id = %request.user_id, role = %role, "member added");
        Ok(membership)
    }

    /// Removes a member from the team.
    ///
    /// Admins may remove anyone but the owner; members may remove themselves.
    ///
    /// # Errors
    ///
    /// Returns [`TenancyServiceError::OwnerMembershipProtected`] when the
    /// target is the designated owner.
    pub async fn remove_member(
        &self,
        principal: &Principal,
        team_id: TeamId,
        user_id: UserId,
    ) -> TenancyServiceResult<()> {
        let team = if principal.user_id() == user_id {
            self.scope.require_team(principal, team_id).await?
        } else {
            self.scope
                .require_role(principal, team_id, TeamRole::Admin)
                .await?
        };
        if team.owner_id() == user_id {
            return Err(TenancyServiceError::OwnerMembershipProtected(team_id));
        }
        self.repository.delete_membership(team_id, user_id).await?;
        tracing::info!(%team_id, %user_id, "member removed");
        Ok(())
    }
}
