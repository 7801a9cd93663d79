//! # Ad-hoc SQL
//!
//! Runs arbitrary SQL text against the shop database. This is an
//! administrative escape hatch: nothing is sanitized or restricted.
//!
//! ```text
//! "UPDATE products SET min_stock = 5; SELECT id, name FROM products"
//!      │
//!      ▼  one pooled connection
//!  ┌──────────────────────────────────────────────────────────────┐
//!  │ before = total_changes()                                     │
//!  │ raw_sql(...).fetch_many(conn)                                │
//!  │    Either::Right(SqliteRow) → rows.push({column: value})     │
//!  │ rows_affected = total_changes() - before                     │
//!  └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! Values keep their SQLite storage class: INTEGER → number, REAL →
//! number, TEXT → string, BLOB → array of bytes, NULL → null.

use futures_util::TryStreamExt;
use serde::Serialize;
use serde_json::{Map, Value};
use sqlx::sqlite::{SqliteConnection, SqliteRow};
use sqlx::{Column, Either, Row, SqlitePool, TypeInfo, ValueRef};
use tracing::{debug, info};

use crate::error::DbResult;

/// Result of an ad-hoc SQL run.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryOutcome {
    /// Every row returned by any statement, in order.
    pub rows: Vec<Map<String, Value>>,
    /// Rows inserted, updated or deleted by the whole run.
    pub rows_affected: u64,
}

/// Repository for ad-hoc SQL.
#[derive(Debug, Clone)]
pub struct QueryRepository {
    pool: SqlitePool,
}

impl QueryRepository {
    /// Creates a new QueryRepository.
    pub fn new(pool: SqlitePool) -> Self {
        QueryRepository { pool }
    }

    /// Executes one or more statements and collects their rows.
    ///
    /// Statements run one after another on a single connection, outside any
    /// transaction; a failing statement stops the run and earlier ones stay
    /// applied.
    pub async fn execute(&self, sql: &str) -> DbResult<QueryOutcome> {
        debug!(sql = %sql, "Executing ad-hoc SQL");

        let mut outcome = QueryOutcome::default();
        let mut conn = self.pool.acquire().await?;

        // sqlite3_changes() lingers after a SELECT, so count on the connection
        let before = total_changes(&mut conn).await?;
        {
            let mut results = sqlx::raw_sql(sql).fetch_many(&mut *conn);
            while let Some(step) = results.try_next().await? {
                if let Either::Right(row) = step {
                    outcome.rows.push(row_to_json(&row)?);
                }
            }
        }
        let after = total_changes(&mut conn).await?;
        outcome.rows_affected = after.saturating_sub(before);

        info!(
            rows = outcome.rows.len(),
            rows_affected = outcome.rows_affected,
            "Ad-hoc SQL executed"
        );
        Ok(outcome)
    }
}

/// Rows changed on this connection since it was opened.
async fn total_changes(conn: &mut SqliteConnection) -> DbResult<u64> {
    let changes: i64 = sqlx::query_scalar("SELECT total_changes()")
        .fetch_one(&mut *conn)
        .await?;
    Ok(changes.max(0) as u64)
}

/// Converts a row into a JSON object keyed by column name.
fn row_to_json(row: &SqliteRow) -> DbResult<Map<String, Value>> {
    let mut object = Map::with_capacity(row.len());

    for column in row.columns() {
        let index = column.ordinal();
        let raw = row.try_get_raw(index)?;

        let value = if raw.is_null() {
            Value::Null
        } else {
            let storage = raw.type_info().name().to_string();
            match storage.as_str() {
                "INTEGER" => Value::from(row.try_get_unchecked::<i64, _>(index)?),
                "REAL" => Value::from(row.try_get_unchecked::<f64, _>(index)?),
                "BLOB" => Value::from(row.try_get_unchecked::<Vec<u8>, _>(index)?),
                _ => Value::from(row.try_get_unchecked::<String, _>(index)?),
            }
        };

        object.insert(column.name().to_string(), value);
    }

    Ok(object)
}

// =============================================================================
// Unit Tests
// =============================================================================
