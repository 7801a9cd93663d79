//! Cash and item withdrawals.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use tracing::{debug, info};

use crate::error::ApiResult;
use crate::routes::{ListParams, Success};
use crate::state::AppState;
use tally_core::validation::{validate_list_limit, validate_new_withdrawal};
use tally_core::{NewWithdrawal, Withdrawal};

pub async fn list(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> ApiResult<Json<Vec<Withdrawal>>> {
    let limit = validate_list_limit(params.limit)?;
    debug!(limit, "list_withdrawals");

    Ok(Json(state.db.withdrawals().list(limit).await?))
}

/// An item withdrawal takes exactly one unit off the shelf; `amount` only
/// values it.
pub async fn create(
    State(state): State<AppState>,
    Json(input): Json<NewWithdrawal>,
) -> ApiResult<(StatusCode, Json<Withdrawal>)> {
    validate_new_withdrawal(&input)?;

    let withdrawal = state.db.withdrawals().create(&input).await?;
    info!(
        id = withdrawal.id,
        kind = %withdrawal.kind,
        amount = %withdrawal.amount(),
        "Withdrawal recorded"
    );

    Ok((StatusCode::CREATED, Json(withdrawal)))
}

pub async fn undo(State(state): State<AppState>, Path(id): Path<i64>) -> ApiResult<Json<Success>> {
    let withdrawal = state.db.withdrawals().undo(id).await?;
    info!(id, kind = %withdrawal.kind, "Withdrawal undone");

    Ok(Json(Success::OK))
}
