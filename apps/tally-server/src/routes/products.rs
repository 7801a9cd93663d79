//! # Product Routes
//!
//! Catalogue CRUD.
//!
//! ## Search Flow
//! ```text
//! GET /api/products?search=bre&low_stock=true
//!       │
//!       ▼
//! validate_search_query ("bre", trimmed, ≤ 100 chars)
//!       │
//!       ▼
//! ProductFilter { search: Some("bre"), low_stock: true }
//!       │
//!       ▼
//! name LIKE '%bre%' (case-insensitive) AND quantity <= min_stock
//! ORDER BY name
//! ```
//!
//! Deleting a product also removes its sale lines, withdrawals and arrivals,
//! plus any sale left without lines.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use tracing::{debug, info};

use crate::error::ApiResult;
use crate::routes::Success;
use crate::state::AppState;
use tally_core::validation::{validate_new_product, validate_product_patch, validate_search_query};
use tally_core::{NewProduct, Product, ProductPatch};
use tally_db::ProductFilter;

/// Query string of `GET /api/products`.
#[derive(Debug, Default, Deserialize)]
pub struct ProductQuery {
    pub search: Option<String>,
    pub low_stock: Option<bool>,
}

pub async fn list(
    State(state): State<AppState>,
    Query(params): Query<ProductQuery>,
) -> ApiResult<Json<Vec<Product>>> {
    let search = match params.search.as_deref() {
        Some(raw) => Some(validate_search_query(raw)?).filter(|s| !s.is_empty()),
        None => None,
    };
    let filter = ProductFilter {
        search,
        low_stock: params.low_stock.unwrap_or(false),
    };
    debug!(?filter, "list_products");

    let products = state.db.products().list(&filter).await?;
    Ok(Json(products))
}

pub async fn get(State(state): State<AppState>, Path(id): Path<i64>) -> ApiResult<Json<Product>> {
    debug!(id, "get_product");
    Ok(Json(state.db.products().require(id).await?))
}

pub async fn create(
    State(state): State<AppState>,
    Json(input): Json<NewProduct>,
) -> ApiResult<(StatusCode, Json<Product>)> {
    validate_new_product(&input)?;

    let product = state.db.products().create(&input).await?;
    info!(id = product.id, name = %product.name, "Product created");

    Ok((StatusCode::CREATED, Json(product)))
}

pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(patch): Json<ProductPatch>,
) -> ApiResult<Json<Product>> {
    validate_product_patch(&patch)?;

    let product = state.db.products().update(id, &patch).await?;
    info!(id, "Product updated");

    Ok(Json(product))
}

pub async fn delete(State(state): State<AppState>, Path(id): Path<i64>) -> ApiResult<Json<Success>> {
    let removed = state.db.products().delete(id).await?;
    info!(id, ?removed, "Product deleted");

    Ok(Json(Success::OK))
}
