//! # Report Repository
//!
//! Dashboard, daily and monthly reports, and period resets.
//!
//! Rows are fetched for the period's UTC bounds and aggregated by
//! `tally_core::report`. The time zone decides where a day starts; the
//! server passes `Local`, tests pass `Utc`.

use chrono::{DateTime, TimeZone, Utc};
use sqlx::SqlitePool;
use tracing::{debug, info};

use crate::error::DbResult;
use crate::repository::created_in_range;
use crate::repository::product::{ProductFilter, ProductRepository};
use crate::repository::sale::SaleRepository;
use crate::repository::withdrawal::WithdrawalRepository;
use tally_core::{DailyReport, DashboardStats, MonthlyReport, Period, ResetSummary};

/// Repository for reports and resets.
#[derive(Debug, Clone)]
pub struct ReportRepository {
    pool: SqlitePool,
}

impl ReportRepository {
    /// Creates a new ReportRepository.
    pub fn new(pool: SqlitePool) -> Self {
        ReportRepository { pool }
    }

    fn sales(&self) -> SaleRepository {
        SaleRepository::new(self.pool.clone())
    }

    fn withdrawals(&self) -> WithdrawalRepository {
        WithdrawalRepository::new(self.pool.clone())
    }

    /// Headline numbers for the calendar day containing `now`.
    pub async fn dashboard<Tz>(&self, now: &DateTime<Tz>) -> DbResult<DashboardStats>
    where
        Tz: TimeZone,
    {
        let (start, end) = Period::today(now).bounds(&now.timezone());
        debug!(%start, %end, "Building dashboard");

        let sales = self.sales().list_between(start, end).await?;
        let withdrawals = self.withdrawals().list_between(start, end).await?;
        let products = ProductRepository::new(self.pool.clone())
            .list(&ProductFilter::default())
            .await?;

        Ok(DashboardStats::build(&sales, &withdrawals, &products))
    }

    /// Sales (with lines) and withdrawals of one calendar day.
    pub async fn daily<Tz: TimeZone>(&self, day: Period, tz: &Tz) -> DbResult<DailyReport> {
        let (start, end) = day.bounds(tz);
        debug!(day = %day, %start, %end, "Building daily report");

        let sales = self.sales().list_between_with_items(start, end).await?;
        let withdrawals = self.withdrawals().list_between(start, end).await?;

        Ok(DailyReport::build(day, sales, withdrawals))
    }

    /// Per-day totals for one calendar month.
    pub async fn monthly<Tz: TimeZone>(&self, month: Period, tz: &Tz) -> DbResult<MonthlyReport> {
        let (start, end) = month.bounds(tz);
        debug!(month = %month, %start, %end, "Building monthly report");

        let sales = self.sales().list_between(start, end).await?;
        let withdrawals = self.withdrawals().list_between(start, end).await?;

        Ok(MonthlyReport::build(month, &sales, &withdrawals, tz))
    }

    /// Deletes the period's sales (with their lines) and withdrawals in one
    /// transaction.
    ///
    /// Product quantities are not touched and stock arrivals are kept: a
    /// reset clears the books, it does not undo anything.
    pub async fn reset<Tz: TimeZone>(&self, period: Period, tz: &Tz) -> DbResult<ResetSummary> {
        let (start, end) = period.bounds(tz);
        debug!(period = %period, %start, %end, "Resetting period");

        self.reset_between(period, start, end).await
    }

    async fn reset_between(
        &self,
        period: Period,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> DbResult<ResetSummary> {
        let mut tx = self.pool.begin().await?;

        let in_range = created_in_range("created_at");

        let sql = format!("DELETE FROM sale_items WHERE sale_id IN (SELECT id FROM sales WHERE {in_range})");
        let sale_items_deleted = sqlx::query(&sql)
            .bind(start)
            .bind(end)
            .execute(&mut *tx)
            .await?
            .rows_affected();

        let sql = format!("DELETE FROM sales WHERE {in_range}");
        let sales_deleted = sqlx::query(&sql)
            .bind(start)
            .bind(end)
            .execute(&mut *tx)
            .await?
            .rows_affected();

        let sql = format!("DELETE FROM withdrawals WHERE {in_range}");
        let withdrawals_deleted = sqlx::query(&sql)
            .bind(start)
            .bind(end)
            .execute(&mut *tx)
            .await?
            .rows_affected();

        tx.commit().await?;

        let summary = ResetSummary {
            period: period.to_string(),
            sales_deleted,
            sale_items_deleted,
            withdrawals_deleted,
        };
        info!(?summary, "Period reset");
        Ok(summary)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
