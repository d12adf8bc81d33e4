//! Project endpoints.

use crate::api::{
    ApiErr, AppState, Authenticated,
    dto::{CreateProjectBody, ProjectView, UpdateProjectBody},
    extract::{ApiJson, ApiPath},
};
use crate::tenancy::domain::{ProjectId, ProjectPath, TeamId};
use axum::{Json, extract::State, http::StatusCode};

/// GET /api/teams/{team_id}/projects
pub async fn list_projects(
    State(state): State<AppState>,
    Authenticated(principal): Authenticated,
    ApiPath(team_id): ApiPath<TeamId>,
) -> Result<Json<Vec<ProjectView>>, ApiErr> {
    let projects = state.projects.list_projects(&principal, team_id).await?;
    Ok(Json(projects.iter().map(ProjectView::from).collect()))
}

/// POST /api/teams/{team_id}/projects
pub async fn create_project(
    State(state): State<AppState>,
    Authenticated(principal): Authenticated,
    ApiPath(team_id): ApiPath<TeamId>,
    ApiJson(body): ApiJson<CreateProjectBody>,
) -> Result<(StatusCode, Json<ProjectView>), ApiErr> {
    let project = state
        .projects
        .create_project(&principal, team_id, body.into())
        .await?;
    Ok((StatusCode::CREATED, Json(ProjectView::from(&project))))
}

/// GET /api/teams/{team_id}/projects/{project_id}
pub async fn get_project(
    State(state): State<AppState>,
    Authenticated(principal): Authenticated,
    ApiPath((team_id, project_id)): ApiPath<(TeamId, ProjectId)>,
) -> Result<Json<ProjectView>, ApiErr> {
    let path = ProjectPath::new(team_id, project_id);
    let project = state.projects.get_project(&principal, path).await?;
    Ok(Json(ProjectView::from(&project)))
}

/// PATCH /api/teams/{team_id}/projects/{project_id}
pub async fn update_project(
    State(state): State<AppState>,
    Authenticated(principal): Authenticated,
    ApiPath((team_id, project_id)): ApiPath<(TeamId, ProjectId)>,
    ApiJson(body): ApiJson<UpdateProjectBody>,
) -> Result<Json<ProjectView>, ApiErr> {
    let path = ProjectPath::new(team_id, project_id);
    let project = state
        .projects
        .update_project(&principal, path, body.into())
        .await?;
    Ok(Json(ProjectView::from(&project)))
}

/// DELETE /api/teams/{team_id}/projects/{project_id}: admins and owners
/// only; lanes and tasks go with the project.
pub async fn delete_project(
    State(state): State<AppState>,
    Authenticated(principal): Authenticated,
    ApiPath((team_id, project_id)): ApiPath<(TeamId, ProjectId)>,
) -> Result<StatusCode, ApiErr> {
    let path = ProjectPath::new(team_id, project_id);
    state.projects.delete_project(&principal, path).await?;
    Ok(StatusCode::NO_CONTENT)
}
