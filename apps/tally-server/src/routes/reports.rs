//! # Report Routes
//!
//! Dashboard, daily and monthly reports, and period resets.
//!
//! Calendar days follow the server's local time zone: "today" on a shop in
//! UTC+3 starts at 21:00 UTC the evening before.
//!
//! ```text
//! GET  /api/sales/daily?date=2024-05-17   Period::Day   ─┐
//! GET  /api/sales/monthly?month=2024-05   Period::Month ─┼─► bounds(Local) ─► [start, end) UTC
//! POST /api/reset/daily                   today          │
//! POST /api/reset/monthly                 this month    ─┘
//! ```

use axum::extract::{Query, State};
use axum::Json;
use chrono::Local;
use serde::Deserialize;
use tracing::{debug, info};

use crate::error::ApiResult;
use crate::state::AppState;
use tally_core::{DailyReport, DashboardStats, MonthlyReport, Period, ResetSummary};

#[derive(Debug, Default, Deserialize)]
pub struct DailyParams {
    /// `YYYY-MM-DD`; today when absent.
    pub date: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct MonthlyParams {
    /// `YYYY-MM`; the current month when absent.
    pub month: Option<String>,
}

pub async fn dashboard(State(state): State<AppState>) -> ApiResult<Json<DashboardStats>> {
    debug!("dashboard");
    Ok(Json(state.db.reports().dashboard(&Local::now()).await?))
}

pub async fn daily(
    State(state): State<AppState>,
    Query(params): Query<DailyParams>,
) -> ApiResult<Json<DailyReport>> {
    let day = match params.date.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
        Some(date) => Period::parse_day(date)?,
        None => Period::today(&Local::now()),
    };
    debug!(%day, "daily_report");

    Ok(Json(state.db.reports().daily(day, &Local).await?))
}

pub async fn monthly(
    State(state): State<AppState>,
    Query(params): Query<MonthlyParams>,
) -> ApiResult<Json<MonthlyReport>> {
    let month = match params.month.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
        Some(month) => Period::parse_month(month)?,
        None => Period::this_month(&Local::now()),
    };
    debug!(%month, "monthly_report");

    Ok(Json(state.db.reports().monthly(month, &Local).await?))
}

/// Clears today's sales and withdrawals. Stock is not given back.
pub async fn reset_daily(State(state): State<AppState>) -> ApiResult<Json<ResetSummary>> {
    reset(state, Period::today(&Local::now())).await
}

/// Clears this month's sales and withdrawals. Stock is not given back.
pub async fn reset_monthly(State(state): State<AppState>) -> ApiResult<Json<ResetSummary>> {
    reset(state, Period::this_month(&Local::now())).await
}

async fn reset(state: AppState, period: Period) -> ApiResult<Json<ResetSummary>> {
    let summary = state.db.reports().reset(period, &Local).await?;
    info!(
        period = %summary.period,
        sales = summary.sales_deleted,
        withdrawals = summary.withdrawals_deleted,
        "Books cleared"
    );
    Ok(Json(summary))
}
