//! Service layer for projects.

use super::{AccessScopeResolver, TenancyServiceResult};
use crate::tenancy::{
    domain::{Principal, Project, ProjectName, ProjectPath, Slug, TeamId, TeamRole},
    ports::TenancyRepository,
};
use mockable::Clock;
use std::sync::Arc;

/// Request payload for creating a project.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateProjectRequest {
    name: String,
    slug: Option<String>,
}

impl CreateProjectRequest {
    /// Creates a request with the required project name.
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

/// Request payload for renaming a project.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UpdateProjectRequest {
    /// New display name.
    pub name: Option<String>,
    /// New slug.
    pub slug: Option<String>,
}

/// Project orchestration service.
pub struct ProjectService<R, C>
where
    R: TenancyRepository + ?Sized,
    C: Clock + Send + Sync,
{
    repository: Arc<R>,
    scope: AccessScopeResolver<R>,
    clock: Arc<C>,
}

impl<R, C> Clone for ProjectService<R, C>
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

impl<R, C> ProjectService<R, C>
where
    R: TenancyRepository + ?Sized,
    C: Clock + Send + Sync,
{
    /// Creates a new project service.
    #[must_use]
    pub fn new(repository: Arc<R>, clock: Arc<C>) -> Self {
        let scope = AccessScopeResolver::new(Arc::clone(&repository));
        Self {
            repository,
            scope,
            clock,
        }
    }

    /// Lists the projects of an accessible team.
    ///
    /// # Errors
    ///
    /// Returns not-found when the team is outside the principal's scope.
    pub async fn list_projects(
        &self,
        principal: &Principal,
        team_id: TeamId,
    ) -> TenancyServiceResult<Vec<Project>> {
        let team = self.scope.require_team(principal, team_id).await?;
        Ok(self.repository.list_projects(&[team.id()]).await?)
    }

    /// Creates a project in an accessible team.
    ///
    /// # Errors
    ///
    /// Returns validation errors for a blank name or bad slug, a conflict when
    /// the slug is taken within the team, and not-found when out of scope.
    pub async fn create_project(
        &self,
        principal: &Principal,
        team_id: TeamId,
        request: CreateProjectRequest,
    ) -> TenancyServiceResult<Project> {
        let team = self.scope.require_team(principal, team_id).await?;
        let name = ProjectName::new(request.name)?;
        let slug = request.slug.map(Slug::new).transpose()?;
        let project = Project::new(team.id(), name, slug, &*self.clock)?;
        self.repository.store_project(&project).await?;
        tracing::info!(project_id = %project.id(), %team_id, "project created");
        Ok(project)
    }

    /// Returns an accessible project.
    ///
    /// # Errors
    ///
    /// Returns not-found when the project is outside the principal's scope.
    pub async fn get_project(
        &self,
        principal: &Principal,
        path: ProjectPath,
    ) -> TenancyServiceResult<Project> {
        self.scope.require_project(principal, path).await
    }

    /// Renames an accessible project.
    ///
    /// # Errors
    ///
    /// Returns validation errors, a slug conflict, or not-found.
    pub async fn update_project(
        &self,
        principal: &Principal,
        path: ProjectPath,
        request: UpdateProjectRequest,
    ) -> TenancyServiceResult<Project> {
        let mut project = self.scope.require_project(principal, path).await?;
        let name = match request.name {
            Some(raw) => ProjectName::new(raw)?,
            None => project.name().clone(),
        };
        let slug = request.slug.map(Slug::new).transpose()?;
        project.rename(name, slug, &*self.clock);
        self.repository.update_project(&project).await?;
        Ok(project)
    }

    /// Deletes a project with its lanes and tasks. Requires the `admin` role.
    ///
    /// # Errors
    ///
    /// Returns not-found when out of scope and forbidden for plain members.
    pub async fn delete_project(
        &self,
        principal: &Principal,
        path: ProjectPath,
    ) -> TenancyServiceResult<()> {
        let project = self.scope.require_project(principal, path).await?;
        self.scope
            .require_role(principal, path.team_id, TeamRole::Admin)
            .await?;
        self.repository.delete_project(project.id()).await?;
        tracing::info!(project_id = %project.id(), "project deleted");
        Ok(())
    }
}
