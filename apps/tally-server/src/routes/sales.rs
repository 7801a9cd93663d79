//! # Sale Routes
//!
//! ```text
//! POST /api/sales { items: [{ product_id, quantity, selling_price }] }
//!       │
//!       ▼
//! validate_new_sale ── empty / > 100 lines / qty ≤ 0 / price out of range ──► 400
//!       │
//!       ▼
//! SaleRepository::create (one transaction, stock decremented per line)
//!       │
//!       ├── missing product ──► 404, nothing applied
//!       ├── total overflows ──► 400, nothing applied
//!       ▼
//! 201 { id, total_amount, total_profit, created_at, items }
//! ```

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use tracing::{debug, info};

use crate::error::ApiResult;
use crate::routes::{ListParams, Success};
use crate::state::AppState;
use tally_core::validation::{validate_list_limit, validate_new_sale};
use tally_core::{NewSale, SaleWithItems};

pub async fn list(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> ApiResult<Json<Vec<SaleWithItems>>> {
    let limit = validate_list_limit(params.limit)?;
    debug!(limit, "list_sales");

    Ok(Json(state.db.sales().list(limit).await?))
}

pub async fn create(
    State(state): State<AppState>,
    Json(input): Json<NewSale>,
) -> ApiResult<(StatusCode, Json<SaleWithItems>)> {
    validate_new_sale(&input)?;

    let sale = state.db.sales().create(&input).await?;
    info!(
        id = sale.sale.id,
        lines = sale.items.len(),
        total = %sale.sale.total_amount(),
        profit = %sale.sale.total_profit(),
        "Sale completed"
    );

    Ok((StatusCode::CREATED, Json(sale)))
}

/// Puts every sold quantity back on the shelf and removes the sale.
pub async fn undo(State(state): State<AppState>, Path(id): Path<i64>) -> ApiResult<Json<Success>> {
    let sale = state.db.sales().undo(id).await?;
    info!(id, lines = sale.items.len(), "Sale undone");

    Ok(Json(Success::OK))
}
