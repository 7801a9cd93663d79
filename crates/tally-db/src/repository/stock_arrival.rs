//! # Stock Arrival Repository
//!
//! Deliveries in, and their undo.
//!
//! ```text
//! record:  products.quantity += arrival.quantity
//!          products.cost_price_cents = arrival.cost_price_cents   (overwrite)
//!
//! undo:    products.quantity -= arrival.quantity
//!          cost price stays at the arrival's value
//! ```

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::{debug, info};

use crate::error::{DbError, DbResult};
use crate::repository::{apply_stock_delta, sortable_time};
use tally_core::{NewStockArrival, StockArrival};

const ARRIVAL_SELECT: &str = r#"
    SELECT a.id, a.product_id, p.name AS product_name,
           a.quantity, a.cost_price_cents, a.created_at
    FROM stock_arrivals a
    LEFT JOIN products p ON p.id = a.product_id
"#;

/// Repository for stock arrival database operations.
#[derive(Debug, Clone)]
pub struct StockArrivalRepository {
    pool: SqlitePool,
}

impl StockArrivalRepository {
    /// Creates a new StockArrivalRepository.
    pub fn new(pool: SqlitePool) -> Self {
        StockArrivalRepository { pool }
    }

    /// Records a delivery: stock goes up and the product's cost price
    /// becomes the delivery's cost price.
    ///
    /// ## Returns
    /// * `Err(DbError::NotFound)` - Product doesn't exist
    pub async fn create(&self, input: &NewStockArrival) -> DbResult<StockArrival> {
        debug!(
            product_id = input.product_id,
            quantity = %input.quantity,
            cost_price_cents = input.cost_price_cents,
            "Recording stock arrival"
        );

        let now = Utc::now();
        let mut tx = self.pool.begin().await?;

        let product_name: Option<String> = sqlx::query_scalar(
            r#"
            UPDATE products SET
                quantity = quantity + ?2,
                cost_price_cents = ?3,
                updated_at = ?4
            WHERE id = ?1
            RETURNING name
            "#,
        )
        .bind(input.product_id)
        .bind(input.quantity)
        .bind(input.cost_price_cents)
        .bind(now)
        .fetch_optional(&mut *tx)
        .await?;

        let product_name =
            product_name.ok_or_else(|| DbError::not_found("Product", input.product_id))?;

        let id: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO stock_arrivals (product_id, quantity, cost_price_cents, created_at)
            VALUES (?1, ?2, ?3, ?4)
            RETURNING id
            "#,
        )
        .bind(input.product_id)
        .bind(input.quantity)
        .bind(input.cost_price_cents)
        .bind(now)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        info!(id, product_id = input.product_id, "Stock arrival recorded");

        Ok(StockArrival {
            id,
            product_id: input.product_id,
            product_name: Some(product_name),
            quantity: input.quantity,
            cost_price_cents: input.cost_price_cents,
            created_at: now,
        })
    }

    /// Undoes a delivery: takes its quantity back off the product and
    /// deletes the arrival. The cost price is not rolled back.
    pub async fn undo(&self, id: i64) -> DbResult<StockArrival> {
        debug!(id, "Undoing stock arrival");

        let now = Utc::now();
        let mut tx = self.pool.begin().await?;

        let sql = format!("{ARRIVAL_SELECT} WHERE a.id = ?1");
        let arrival = sqlx::query_as::<_, StockArrival>(&sql)
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| DbError::not_found("Stock arrival", id))?;

        apply_stock_delta(&mut *tx, arrival.product_id, -arrival.quantity, now).await?;

        sqlx::query("DELETE FROM stock_arrivals WHERE id = ?1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        info!(id, product_id = arrival.product_id, "Stock arrival undone");
        Ok(arrival)
    }

    /// Lists the most recent arrivals, newest first.
    pub async fn list(&self, limit: i64) -> DbResult<Vec<StockArrival>> {
        debug!(limit, "Listing stock arrivals");

        let sql = format!(
            "{ARRIVAL_SELECT} ORDER BY {} DESC, a.id DESC LIMIT ?1",
            sortable_time("a.created_at")
        );
        let arrivals = sqlx::query_as::<_, StockArrival>(&sql)
            .bind(limit)
            .fetch_all(&self.pool)
            .await?;

        Ok(arrivals)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
