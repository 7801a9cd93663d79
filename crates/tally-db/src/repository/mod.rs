//! # Repositories
//!
//! One repository per aggregate, each owning a cloned `SqlitePool`.
//!
//! ```text
//! ┌──────────────────────────┬──────────────────────────────────────────────┐
//! │ Repository               │ Tables written                               │
//! ├──────────────────────────┼──────────────────────────────────────────────┤
//! │ ProductRepository        │ products (+ cascade on delete)               │
//! │ SaleRepository           │ sales, sale_items, products.quantity         │
//! │ WithdrawalRepository     │ withdrawals, products.quantity               │
//! │ StockArrivalRepository   │ stock_arrivals, products.quantity/cost       │
//! │ ReportRepository         │ sales, sale_items, withdrawals (reset)       │
//! │ QueryRepository          │ anything (ad-hoc SQL)                        │
//! └──────────────────────────┴──────────────────────────────────────────────┘
//! ```
//!
//! Every write that touches more than one row runs in a single transaction.
//! Returning early with `?` drops the transaction, which rolls it back.
//!
//! ## Timestamps
//! The API writes RFC 3339 text (`2024-05-02T10:00:00.123+00:00`). Rows
//! inserted through ad-hoc SQL often carry `datetime('now')` text
//! (`2024-05-02 10:00:00`), which sorts before the first form as raw text.
//! Range filters and orderings therefore compare [`sortable_time`] of both
//! sides, never the raw column.

pub mod product;
pub mod query;
pub mod report;
pub mod sale;
pub mod stock_arrival;
pub mod withdrawal;

use chrono::{DateTime, Utc};
use sqlx::SqliteConnection;
use tally_core::Quantity;
use tracing::debug;

use crate::error::DbResult;

/// SQL expression normalizing a timestamp to `YYYY-MM-DDTHH:MM:SS.SSS` UTC.
pub(crate) fn sortable_time(expr: &str) -> String {
    format!("strftime('%Y-%m-%dT%H:%M:%f', {expr})")
}

/// SQL predicate: `column` falls in `[?1, ?2)`.
pub(crate) fn created_in_range(column: &str) -> String {
    let value = sortable_time(column);
    format!(
        "{value} >= {start} AND {value} < {end}",
        start = sortable_time("?1"),
        end = sortable_time("?2"),
    )
}

/// Adds `delta` to a product's stock. Returns false when the product
/// doesn't exist.
///
/// Callers decide whether a missing product is an error: recording a
/// movement requires the product, undoing one does not.
pub(crate) async fn apply_stock_delta(
    conn: &mut SqliteConnection,
    product_id: i64,
    delta: Quantity,
    now: DateTime<Utc>,
) -> DbResult<bool> {
    debug!(product_id, delta = %delta, "Adjusting stock");

    let result = sqlx::query(
        r#"
        UPDATE products
        SET quantity = quantity + ?2,
            updated_at = ?3
        WHERE id = ?1
        "#,
    )
    .bind(product_id)
    .bind(delta)
    .bind(now)
    .execute(&mut *conn)
    .await?;

    Ok(result.rows_affected() > 0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_range_predicate_normalizes_both_sides() {
        assert_eq!(
            created_in_range("s.created_at"),
            "strftime('%Y-%m-%dT%H:%M:%f', s.created_at) >= strftime('%Y-%m-%dT%H:%M:%f', ?1) \
             AND strftime('%Y-%m-%dT%H:%M:%f', s.created_at) < strftime('%Y-%m-%dT%H:%M:%f', ?2)"
        );
    }
}

#[cfg(test)]
pub(crate) mod testing {
    //! Fixtures shared by the repository tests.

    use tally_core::{NewProduct, Product, Quantity, UnitType};

    use crate::{Database, DbConfig};

    pub async fn db() -> Database {
        Database::new(DbConfig::in_memory()).await.unwrap()
    }

    pub async fn product(db: &Database, name: &str, cost: i64, price: i64, units: i64) -> Product {
        db.products()
            .create(&NewProduct {
                name: name.to_string(),
                unit_type: UnitType::Unit,
                cost_price_cents: cost,
                selling_price_cents: price,
                quantity: Quantity::from_units(units),
                min_stock: Quantity::zero(),
            })
            .await
            .unwrap()
    }

    pub async fn quantity(db: &Database, id: i64) -> Quantity {
        db.products().get(id).await.unwrap().unwrap().quantity
    }
}
