//! # HTTP Routes
//!
//! Each handler validates its input with `tally_core::validation`, calls one
//! repository method (one transaction), and answers JSON.
//!
//! ```text
//! GET    /api/health                  health::check
//! GET    /api/products                products::list      ?search=&low_stock=
//! POST   /api/products                products::create    → 201
//! GET    /api/products/{id}           products::get
//! PATCH  /api/products/{id}           products::update
//! DELETE /api/products/{id}           products::delete
//! GET    /api/sales                   sales::list         ?limit=
//! POST   /api/sales                   sales::create       → 201
//! DELETE /api/sales/{id}              sales::undo
//! GET    /api/sales/daily             reports::daily      ?date=YYYY-MM-DD
//! GET    /api/sales/monthly           reports::monthly    ?month=YYYY-MM
//! GET    /api/withdrawals             withdrawals::list   ?limit=
//! POST   /api/withdrawals             withdrawals::create → 201
//! DELETE /api/withdrawals/{id}        withdrawals::undo
//! GET    /api/stock-arrivals          stock_arrivals::list   ?limit=
//! POST   /api/stock-arrivals          stock_arrivals::create → 201
//! DELETE /api/stock-arrivals/{id}     stock_arrivals::undo
//! GET    /api/dashboard               reports::dashboard
//! POST   /api/query                   query::execute
//! POST   /api/reset/daily             reports::reset_daily
//! POST   /api/reset/monthly           reports::reset_monthly
//! ```

pub mod health;
pub mod products;
pub mod query;
pub mod reports;
pub mod sales;
pub mod stock_arrivals;
pub mod withdrawals;

use axum::routing::{delete, get, post};
use axum::Router;
use serde::{Deserialize, Serialize};

use crate::state::AppState;

/// All API routes, still waiting for their state.
pub fn api() -> Router<AppState> {
    Router::new()
        .route("/api/health", get(health::check))
        .route("/api/products", get(products::list).post(products::create))
        .route(
            "/api/products/{id}",
            get(products::get)
                .patch(products::update)
                .delete(products::delete),
        )
        .route("/api/sales", get(sales::list).post(sales::create))
        .route("/api/sales/daily", get(reports::daily))
        .route("/api/sales/monthly", get(reports::monthly))
        .route("/api/sales/{id}", delete(sales::undo))
        .route(
            "/api/withdrawals",
            get(withdrawals::list).post(withdrawals::create),
        )
        .route("/api/withdrawals/{id}", delete(withdrawals::undo))
        .route(
            "/api/stock-arrivals",
            get(stock_arrivals::list).post(stock_arrivals::create),
        )
        .route("/api/stock-arrivals/{id}", delete(stock_arrivals::undo))
        .route("/api/dashboard", get(reports::dashboard))
        .route("/api/query", post(query::execute))
        .route("/api/reset/daily", post(reports::reset_daily))
        .route("/api/reset/monthly", post(reports::reset_monthly))
}

/// `?limit=` on list endpoints.
#[derive(Debug, Default, Deserialize)]
pub struct ListParams {
    pub limit: Option<i64>,
}

/// Body of every successful delete/undo.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Success {
    pub success: bool,
}

impl Success {
    pub const OK: Success = Success { success: true };
}
