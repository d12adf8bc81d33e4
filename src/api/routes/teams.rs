//! Team and membership endpoints.

use crate::api::{
    ApiErr, AppState, Authenticated,
    dto::{AddMemberBody, CreateTeamBody, MemberView, TeamView},
    extract::{ApiJson, ApiPath},
};
use crate::tenancy::domain::{TeamId, UserId};
use axum::{Json, extract::State, http::StatusCode};

/// GET /api/teams: teams the caller owns or belongs to.
pub async fn list_teams(
    State(state): State<AppState>,
    Authenticated(principal): Authenticated,
) -> Result<Json<Vec<TeamView>>, ApiErr> {
    let teams = state.teams.list_teams(&principal).await?;
    Ok(Json(teams.iter().map(TeamView::from).collect()))
}

/// POST /api/teams: create a team owned by the caller.
pub async fn create_team(
    State(state): State<AppState>,
    Authenticated(principal): Authenticated,
    ApiJson(body): ApiJson<CreateTeamBody>,
) -> Result<(StatusCode, Json<TeamView>), ApiErr> {
    let team = state.teams.create_team(&principal, body.into()).await?;
    Ok((StatusCode::CREATED, Json(TeamView::from(&team))))
}

/// GET /api/teams/{team_id}
pub async fn get_team(
    State(state): State<AppState>,
    Authenticated(principal): Authenticated,
    ApiPath(team_id): ApiPath<TeamId>,
) -> Result<Json<TeamView>, ApiErr> {
    let team = state.teams.get_team(&principal, team_id).await?;
    Ok(Json(TeamView::from(&team)))
}

/// GET /api/teams/{team_id}/members
pub async fn list_members(
    State(state): State<AppState>,
    Authenticated(principal): Authenticated,
    ApiPath(team_id): ApiPath<TeamId>,
) -> Result<Json<Vec<MemberView>>, ApiErr> {
    let members = state.teams.list_members(&principal, team_id).await?;
    Ok(Json(members.iter().map(MemberView::from).collect()))
}

/// POST /api/teams/{team_id}/members: admins and owners only.
pub async fn add_member(
    State(state): State<AppState>,
    Authenticated(principal): Authenticated,
    ApiPath(team_id): ApiPath<TeamId>,
    ApiJson(body): ApiJson<AddMemberBody>,
) -> Result<(StatusCode, Json<MemberView>), ApiErr> {
    let membership = state
        .teams
        .add_member(&principal, team_id, body.into())
        .await?;
    Ok((StatusCode::CREATED, Json(MemberView::from(&membership))))
}

/// DELETE /api/teams/{team_id}/members/{user_id}
pub async fn remove_member(
    State(state): State<AppState>,
    Authenticated(principal): Authenticated,
    ApiPath((team_id, user_id)): ApiPath<(TeamId, UserId)>,
) -> Result<StatusCode, ApiErr> {
    state
        .teams
        .remove_member(&principal, team_id, user_id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
