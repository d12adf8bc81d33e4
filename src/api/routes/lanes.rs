//! Lane endpoints.

use crate::api::{
    ApiErr, AppState, Authenticated,
    dto::{CreateLaneBody, LaneView, MoveLaneBody, UpdateLaneBody},
    extract::{ApiJson, ApiPath},
};
use crate::board::domain::LaneId;
use crate::tenancy::domain::{ProjectId, ProjectPath, TeamId};
use axum::{Json, extract::State, http::StatusCode};

/// GET /api/teams/{team_id}/projects/{project_id}/lanes: seeds the default
/// lanes on first access.
pub async fn list_lanes(
    State(state): State<AppState>,
    Authenticated(principal): Authenticated,
    ApiPath((team_id, project_id)): ApiPath<(TeamId, ProjectId)>,
) -> Result<Json<Vec<LaneView>>, ApiErr> {
    let path = ProjectPath::new(team_id, project_id);
    let lanes = state.lanes.list_lanes(&principal, path).await?;
    Ok(Json(lanes.iter().map(LaneView::from).collect()))
}

/// POST /api/teams/{team_id}/projects/{project_id}/lanes
pub async fn create_lane(
    State(state): State<AppState>,
    Authenticated(principal): Authenticated,
    ApiPath((team_id, project_id)): ApiPath<(TeamId, ProjectId)>,
    ApiJson(body): ApiJson<CreateLaneBody>,
) -> Result<(StatusCode, Json<LaneView>), ApiErr> {
    let path = ProjectPath::new(team_id, project_id);
    let lane = state
        .lanes
        .create_lane(&principal, path, body.into())
        .await?;
    Ok((StatusCode::CREATED, Json(LaneView::from(&lane))))
}

/// PATCH /api/teams/{team_id}/projects/{project_id}/lanes/{lane_id}
pub async fn update_lane(
    State(state): State<AppState>,
    Authenticated(principal): Authenticated,
    ApiPath((team_id, project_id, lane_id)): ApiPath<(TeamId, ProjectId, LaneId)>,
    ApiJson(body): ApiJson<UpdateLaneBody>,
) -> Result<Json<LaneView>, ApiErr> {
    let path = ProjectPath::new(team_id, project_id);
    let lane = state
        .lanes
        .update_lane(&principal, path, lane_id, body.into())
        .await?;
    Ok(Json(LaneView::from(&lane)))
}

/// POST /api/teams/{team_id}/projects/{project_id}/lanes/{lane_id}/move
pub async fn move_lane(
    State(state): State<AppState>,
    Authenticated(principal): Authenticated,
    ApiPath((team_id, project_id, lane_id)): ApiPath<(TeamId, ProjectId, LaneId)>,
    ApiJson(body): ApiJson<MoveLaneBody>,
) -> Result<Json<LaneView>, ApiErr> {
    let path = ProjectPath::new(team_id, project_id);
    let lane = state
        .lanes
        .move_lane(&principal, path, lane_id, body.before)
        .await?;
    Ok(Json(LaneView::from(&lane)))
}

/// DELETE /api/teams/{team_id}/projects/{project_id}/lanes/{lane_id}:
/// moves the lane's tasks to a fallback lane first.
pub async fn delete_lane(
    State(state): State<AppState>,
    Authenticated(principal): Authenticated,
    ApiPath((team_id, project_id, lane_id)): ApiPath<(TeamId, ProjectId, LaneId)>,
) -> Result<StatusCode, ApiErr> {
    let path = ProjectPath::new(team_id, project_id);
    state.lanes.delete_lane(&principal, path, lane_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
