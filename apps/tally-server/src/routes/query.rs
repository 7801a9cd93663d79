//! Ad-hoc SQL console.
//!
//! Runs whatever the operator typed, with no authorization and no
//! sanitization. Bind the server to localhost.

use axum::extract::State;
use axum::Json;
use serde::Deserialize;
use tracing::{info, warn};

use crate::error::ApiResult;
use crate::state::AppState;
use tally_core::validation::validate_sql;
use tally_db::QueryOutcome;

#[derive(Debug, Deserialize)]
pub struct QueryRequest {
    pub sql: String,
}

/// Answers `{ rows: [{column: value}], rowsAffected }`, or 500 carrying the
/// raw SQLite message.
pub async fn execute(
    State(state): State<AppState>,
    Json(request): Json<QueryRequest>,
) -> ApiResult<Json<QueryOutcome>> {
    validate_sql(&request.sql)?;
    warn!(sql = %request.sql, "Running ad-hoc SQL");

    let outcome = state.db.query().execute(&request.sql).await?;
    info!(rows = outcome.rows.len(), rows_affected = outcome.rows_affected, "Ad-hoc SQL done");

    Ok(Json(outcome))
}
