//! Liveness and database reachability.

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::Serialize;
use tally_db::MigrationStatus;
use tracing::warn;

use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub database: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub migrations: Option<MigrationStatus>,
}

/// 200 when the database answers `SELECT 1`, 503 otherwise.
pub async fn check(State(state): State<AppState>) -> (StatusCode, Json<HealthResponse>) {
    if !state.db.health_check().await {
        warn!("Health check failed: database unavailable");
        return (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(HealthResponse {
                status: "degraded",
                database: "unavailable",
                migrations: None,
            }),
        );
    }

    let migrations = state.db.migration_status().await.ok();
    (
        StatusCode::OK,
        Json(HealthResponse {
            status: "ok",
            database: "connected",
            migrations,
        }),
    )
}
