//! Task endpoints.

use crate::api::{
    ApiErr, AppState, Authenticated,
    dto::{CreateTaskBody, MoveTaskBody, TaskFilter, TaskView, UpdateTaskBody},
    extract::{ApiJson, ApiPath, ApiQuery},
};
use crate::board::domain::TaskId;
use crate::tenancy::domain::{ProjectId, ProjectPath, TeamId};
use axum::{Json, extract::State, http::StatusCode};

/// GET /api/teams/{team_id}/projects/{project_id}/tasks?status=<key>
pub async fn list_tasks(
    State(state): State<AppState>,
    Authenticated(principal): Authenticated,
    ApiPath((team_id, project_id)): ApiPath<(TeamId, ProjectId)>,
    ApiQuery(filter): ApiQuery<TaskFilter>,
) -> Result<Json<Vec<TaskView>>, ApiErr> {
    let path = ProjectPath::new(team_id, project_id);
    let tasks = state
        .tasks
        .list_tasks(&principal, path, filter.status)
        .await?;
    Ok(Json(tasks.iter().map(TaskView::from).collect()))
}

/// POST /api/teams/{team_id}/projects/{project_id}/tasks
pub async fn create_task(
    State(state): State<AppState>,
    Authenticated(principal): Authenticated,
    ApiPath((team_id, project_id)): ApiPath<(TeamId, ProjectId)>,
    ApiJson(body): ApiJson<CreateTaskBody>,
) -> Result<(StatusCode, Json<TaskView>), ApiErr> {
    let path = ProjectPath::new(team_id, project_id);
    let task = state
        .tasks
        .create_task(&principal, path, body.into())
        .await?;
    Ok((StatusCode::CREATED, Json(TaskView::from(&task))))
}

/// GET /api/teams/{team_id}/projects/{project_id}/tasks/{task_id}
pub async fn get_task(
    State(state): State<AppState>,
    Authenticated(principal): Authenticated,
    ApiPath((team_id, project_id, task_id)): ApiPath<(TeamId, ProjectId, TaskId)>,
) -> Result<Json<TaskView>, ApiErr> {
    let path = ProjectPath::new(team_id, project_id);
    let task = state.tasks.get_task(&principal, path, task_id).await?;
    Ok(Json(TaskView::from(&task)))
}

/// PATCH /api/teams/{team_id}/projects/{project_id}/tasks/{task_id}
pub async fn update_task(
    State(state): State<AppState>,
    Authenticated(principal): Authenticated,
    ApiPath((team_id, project_id, task_id)): ApiPath<(TeamId, ProjectId, TaskId)>,
    ApiJson(body): ApiJson<UpdateTaskBody>,
) -> Result<Json<TaskView>, ApiErr> {
    let path = ProjectPath::new(team_id, project_id);
    let task = state
        .tasks
        .update_task(&principal, path, task_id, body.into())
        .await?;
    Ok(Json(TaskView::from(&task)))
}

/// POST /api/teams/{team_id}/projects/{project_id}/tasks/{task_id}/move
pub async fn move_task(
    State(state): State<AppState>,
    Authenticated(principal): Authenticated,
    ApiPath((team_id, project_id, task_id)): ApiPath<(TeamId, ProjectId, TaskId)>,
    ApiJson(body): ApiJson<MoveTaskBody>,
) -> Result<Json<TaskView>, ApiErr> {
    let path = ProjectPath::new(team_id, project_id);
    let task = state
        .tasks
        .move_task(&principal, path, task_id, body.into())
        .await?;
    Ok(Json(TaskView::from(&task)))
}

/// DELETE /api/teams/{team_id}/projects/{project_id}/tasks/{task_id}
pub async fn delete_task(
    State(state): State<AppState>,
    Authenticated(principal): Authenticated,
    ApiPath((team_id, project_id, task_id)): ApiPath<(TeamId, ProjectId, TaskId)>,
) -> Result<StatusCode, ApiErr> {
    let path = ProjectPath::new(team_id, project_id);
    state.tasks.delete_task(&principal, path, task_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
