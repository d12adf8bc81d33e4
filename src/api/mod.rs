//! REST surface over the tenancy and board services.
//!
//! Every route lives under `/api`. Handlers authenticate through
//! [`Authenticated`], call exactly one service operation and map its error
//! through [`ApiErr`].

mod auth;
pub mod dto;
mod error;
pub mod extract;
pub mod routes;
mod state;

pub use auth::{ACTING_USER_HEADER, Authenticated, SERVICE_KEY_HEADER};
pub use error::{ApiErr, status_for};
pub use state::{AppState, AuthConfig, Lanes, Projects, Tasks, Teams};

use axum::{
    Router,
    routing::{delete, get, patch, post},
};
use tower_http::trace::TraceLayer;

const PROJECT: &str = "/teams/{team_id}/projects/{project_id}";

/// Builds the application router.
#[must_use]
pub fn router(state: AppState) -> Router {
    let api = Router::new()
        .route("/health", get(routes::health::health))
        .route(
            "/teams",
            get(routes::teams::list_teams).post(routes::teams::create_team),
        )
        .route("/teams/{team_id}", get(routes::teams::get_team))
        .route(
            "/teams/{team_id}/members",
            get(routes::teams::list_members).post(routes::teams::add_member),
        )
        .route(
            "/teams/{team_id}/members/{user_id}",
            delete(routes::teams::remove_member),
        )
        .route(
            "/teams/{team_id}/projects",
            get(routes::projects::list_projects).post(routes::projects::create_project),
        )
        .route(
            PROJECT,
            get(routes::projects::get_project)
                .patch(routes::projects::update_project)
                .delete(routes::projects::delete_project),
        )
        .route(
            &format!("{PROJECT}/lanes"),
            get(routes::lanes::list_lanes).post(routes::lanes::create_lane),
        )
        .route(
            &format!("{PROJECT}/lanes/{{lane_id}}"),
            patch(routes::lanes::update_lane).delete(routes::lanes::delete_lane),
        )
        .route(
            &format!("{PROJECT}/lanes/{{lane_id}}/move"),
            post(routes::lanes::move_lane),
        )
        .route(
            &format!("{PROJECT}/tasks"),
            get(routes::tasks::list_tasks).post(routes::tasks::create_task),
        )
        .route(
            &format!("{PROJECT}/tasks/{{task_id}}"),
            get(routes::tasks::get_task)
                .patch(routes::tasks::update_task)
                .delete(routes::tasks::delete_task),
        )
        .route(
            &format!("{PROJECT}/tasks/{{task_id}}/move"),
            post(routes::tasks::move_task),
        );

    Router::new()
        .nest("/api", api)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
