//! Liveness endpoint.

use crate::api::dto::HealthView;
use axum::Json;

/// GET /api/health: liveness check.
#[expect(clippy::unused_async, reason = "axum handlers are async functions")]
pub async fn health() -> Json<HealthView> {
    Json(HealthView {
        status: "ok".to_owned(),
        version: env!("CARGO_PKG_VERSION").to_owned(),
    })
}
