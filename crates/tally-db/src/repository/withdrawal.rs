//! # Withdrawal Repository
//!
//! Cash and item withdrawals.
//!
//! ```text
//! type = cash  →  INSERT withdrawal
//! type = item  →  INSERT withdrawal + products.quantity -= 1
//!
//! `amount` is a money valuation, never a quantity: an item
//! withdrawal moves exactly one unit whatever the amount says.
//! ```

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use tracing::{debug, info};

use crate::error::{DbError, DbResult};
use crate::repository::{apply_stock_delta, created_in_range, sortable_time};
use tally_core::{CoreError, NewWithdrawal, Quantity, Withdrawal, WithdrawalKind};

const WITHDRAWAL_SELECT: &str = r#"
    SELECT w.id, w.type, w.product_id, p.name AS product_name,
           w.amount_cents, w.description, w.created_at
    FROM withdrawals w
    LEFT JOIN products p ON p.id = w.product_id
"#;

/// Repository for withdrawal database operations.
#[derive(Debug, Clone)]
pub struct WithdrawalRepository {
    pool: SqlitePool,
}

impl WithdrawalRepository {
    /// Creates a new WithdrawalRepository.
    pub fn new(pool: SqlitePool) -> Self {
        WithdrawalRepository { pool }
    }

    /// Records a withdrawal. Item withdrawals take one unit off the shelf
    /// in the same transaction.
    ///
    /// ## Returns
    /// * `Err(DbError::NotFound)` - `product_id` names a missing product
    /// * `Err(DbError::Rejected)` - an item withdrawal without `product_id`
    pub async fn create(&self, input: &NewWithdrawal) -> DbResult<Withdrawal> {
        debug!(kind = %input.kind, product_id = ?input.product_id, "Recording withdrawal");

        let shelf_product = match (input.kind, input.product_id) {
            (WithdrawalKind::Item, Some(product_id)) => Some(product_id),
            (WithdrawalKind::Item, None) => return Err(CoreError::ItemWithdrawalWithoutProduct.into()),
            (WithdrawalKind::Cash, _) => None,
        };

        let now = Utc::now();
        let description = input
            .description
            .as_deref()
            .map(str::trim)
            .filter(|d| !d.is_empty());

        let mut tx = self.pool.begin().await?;

        let product_name = match input.product_id {
            Some(product_id) => {
                let name: Option<String> = sqlx::query_scalar("SELECT name FROM products WHERE id = ?1")
                    .bind(product_id)
                    .fetch_optional(&mut *tx)
                    .await?;
                Some(name.ok_or_else(|| DbError::not_found("Product", product_id))?)
            }
            None => None,
        };

        let id: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO withdrawals (type, product_id, amount_cents, description, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5)
            RETURNING id
            "#,
        )
        .bind(input.kind)
        .bind(input.product_id)
        .bind(input.amount_cents)
        .bind(description)
        .bind(now)
        .fetch_one(&mut *tx)
        .await?;

        if let Some(product_id) = shelf_product {
            apply_stock_delta(&mut *tx, product_id, -Quantity::ONE, now).await?;
        }

        tx.commit().await?;

        debug!(id, kind = %input.kind, "Withdrawal committed");

        Ok(Withdrawal {
            id,
            kind: input.kind,
            product_id: input.product_id,
            product_name,
            amount_cents: input.amount_cents,
            description: description.map(str::to_string),
            created_at: now,
        })
    }

    /// Undoes a withdrawal. An item withdrawal puts its one unit back,
    /// unless the product has since been deleted.
    pub async fn undo(&self, id: i64) -> DbResult<Withdrawal> {
        debug!(id, "Undoing withdrawal");

        let now = Utc::now();
        let mut tx = self.pool.begin().await?;

        let sql = format!("{WITHDRAWAL_SELECT} WHERE w.id = ?1");
        let withdrawal = sqlx::query_as::<_, Withdrawal>(&sql)
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| DbError::not_found("Withdrawal", id))?;

        if let (WithdrawalKind::Item, Some(product_id)) = (withdrawal.kind, withdrawal.product_id) {
            apply_stock_delta(&mut *tx, product_id, withdrawal.stock_removed(), now).await?;
        }

        sqlx::query("DELETE FROM withdrawals WHERE id = ?1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        info!(id, kind = %withdrawal.kind, "Withdrawal undone");
        Ok(withdrawal)
    }

    /// Lists the most recent withdrawals, newest first.
    pub async fn list(&self, limit: i64) -> DbResult<Vec<Withdrawal>> {
        debug!(limit, "Listing withdrawals");

        let sql = format!(
            "{WITHDRAWAL_SELECT} ORDER BY {} DESC, w.id DESC LIMIT ?1",
            sortable_time("w.created_at")
        );
        let withdrawals = sqlx::query_as::<_, Withdrawal>(&sql)
            .bind(limit)
            .fetch_all(&self.pool)
            .await?;

        Ok(withdrawals)
    }

    /// Withdrawals created in `[start, end)`, oldest first.
    pub async fn list_between(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> DbResult<Vec<Withdrawal>> {
        let sql = format!(
            "{WITHDRAWAL_SELECT} WHERE {} ORDER BY {}, w.id",
            created_in_range("w.created_at"),
            sortable_time("w.created_at")
        );
        let withdrawals = sqlx::query_as::<_, Withdrawal>(&sql)
            .bind(start)
            .bind(end)
            .fetch_all(&self.pool)
            .await?;

        Ok(withdrawals)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
