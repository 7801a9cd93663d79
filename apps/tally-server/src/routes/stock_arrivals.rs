//! Deliveries. Recording one overwrites the product's cost price; undoing
//! it only takes the quantity back.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use tracing::{debug, info};

use crate::error::ApiResult;
use crate::routes::{ListParams, Success};
use crate::state::AppState;
use tally_core::validation::{validate_list_limit, validate_new_stock_arrival};
use tally_core::{NewStockArrival, StockArrival};

pub async fn list(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> ApiResult<Json<Vec<StockArrival>>> {
    let limit = validate_list_limit(params.limit)?;
    debug!(limit, "list_stock_arrivals");

    Ok(Json(state.db.stock_arrivals().list(limit).await?))
}

pub async fn create(
    State(state): State<AppState>,
    Json(input): Json<NewStockArrival>,
) -> ApiResult<(StatusCode, Json<StockArrival>)> {
    validate_new_stock_arrival(&input)?;

    let arrival = state.db.stock_arrivals().create(&input).await?;
    info!(
        id = arrival.id,
        product_id = arrival.product_id,
        quantity = %arrival.quantity,
        "Stock arrival recorded"
    );

    Ok((StatusCode::CREATED, Json(arrival)))
}

pub async fn undo(State(state): State<AppState>, Path(id): Path<i64>) -> ApiResult<Json<Success>> {
    let arrival = state.db.stock_arrivals().undo(id).await?;
    info!(id, product_id = arrival.product_id, "Stock arrival undone");

    Ok(Json(Success::OK))
}
