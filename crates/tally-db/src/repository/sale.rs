//! # Sale Repository
//!
//! Ringing up and undoing sales.
//!
//! ## Sale Transaction
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  BEGIN                                                                  │
//! │    INSERT sales (totals = 0)                                            │
//! │    for each line:                                                       │
//! │      SELECT cost_price_cents FROM products   ← current cost, per line  │
//! │      INSERT sale_items (cost snapshot, profit)                          │
//! │      UPDATE products SET quantity = quantity - line.quantity            │
//! │    UPDATE sales SET totals = Σ lines                                    │
//! │  COMMIT                                                                 │
//! │                                                                         │
//! │  A missing product aborts the whole sale. Stock is never checked.      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{DateTime, Utc};
use sqlx::{QueryBuilder, Sqlite, SqlitePool};
use std::collections::HashMap;
use tracing::{debug, info};

use crate::error::{DbError, DbResult};
use crate::repository::{apply_stock_delta, created_in_range, sortable_time};
use tally_core::ledger::SaleTotals;
use tally_core::{Money, NewSale, Sale, SaleItem, SaleWithItems};

const SALE_COLUMNS: &str = "id, total_amount_cents, total_profit_cents, created_at";

const ITEM_SELECT: &str = r#"
    SELECT si.id, si.sale_id, si.product_id, p.name AS product_name,
           si.quantity, si.unit_price_cents, si.cost_price_cents, si.profit_cents
    FROM sale_items si
    LEFT JOIN products p ON p.id = si.product_id
"#;

/// Repository for sale database operations.
#[derive(Debug, Clone)]
pub struct SaleRepository {
    pool: SqlitePool,
}

impl SaleRepository {
    /// Creates a new SaleRepository.
    pub fn new(pool: SqlitePool) -> Self {
        SaleRepository { pool }
    }

    /// Records a sale and moves stock, all in one transaction.
    ///
    /// ## Snapshot Pattern
    /// Each line stores the product's cost price as read inside the
    /// transaction, so later stock arrivals don't rewrite past profit.
    ///
    /// ## Returns
    /// * `Ok(SaleWithItems)` - The committed sale with its lines
    /// * `Err(DbError::NotFound)` - A line named a missing product; nothing
    ///   was written
    /// * `Err(DbError::Rejected)` - A line or total overflowed; nothing was
    ///   written
    pub async fn create(&self, input: &NewSale) -> DbResult<SaleWithItems> {
        debug!(lines = input.items.len(), "Creating sale");

        let now = Utc::now();
        let mut tx = self.pool.begin().await?;

        let sale_id: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO sales (total_amount_cents, total_profit_cents, created_at)
            VALUES (0, 0, ?1)
            RETURNING id
            "#,
        )
        .bind(now)
        .fetch_one(&mut *tx)
        .await?;

        let mut totals = SaleTotals::new();
        let mut items = Vec::with_capacity(input.items.len());

        for line in &input.items {
            let product: Option<(i64, String)> =
                sqlx::query_as("SELECT cost_price_cents, name FROM products WHERE id = ?1")
                    .bind(line.product_id)
                    .fetch_optional(&mut *tx)
                    .await?;
            let (cost_price_cents, product_name) =
                product.ok_or_else(|| DbError::not_found("Product", line.product_id))?;

            let unit_price = Money::from_cents(line.selling_price_cents);
            let cost_price = Money::from_cents(cost_price_cents);
            let figures = totals.record_line(unit_price, cost_price, line.quantity)?;

            let item_id: i64 = sqlx::query_scalar(
                r#"
                INSERT INTO sale_items (
                    sale_id, product_id, quantity,
                    unit_price_cents, cost_price_cents, profit_cents
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6)
                RETURNING id
                "#,
            )
            .bind(sale_id)
            .bind(line.product_id)
            .bind(line.quantity)
            .bind(unit_price.cents())
            .bind(cost_price.cents())
            .bind(figures.profit.cents())
            .fetch_one(&mut *tx)
            .await?;

            apply_stock_delta(&mut *tx, line.product_id, -line.quantity, now).await?;

            items.push(SaleItem {
                id: item_id,
                sale_id,
                product_id: line.product_id,
                product_name: Some(product_name),
                quantity: line.quantity,
                unit_price_cents: unit_price.cents(),
                cost_price_cents: cost_price.cents(),
                profit_cents: figures.profit.cents(),
            });
        }

        sqlx::query(
            r#"
            UPDATE sales SET
                total_amount_cents = ?2,
                total_profit_cents = ?3
            WHERE id = ?1
            "#,
        )
        .bind(sale_id)
        .bind(totals.amount.cents())
        .bind(totals.profit.cents())
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        info!(
            sale_id,
            lines = items.len(),
            total = %totals.amount,
            profit = %totals.profit,
            "Sale recorded"
        );

        Ok(SaleWithItems {
            sale: Sale {
                id: sale_id,
                total_amount_cents: totals.amount.cents(),
                total_profit_cents: totals.profit.cents(),
                created_at: now,
            },
            items,
        })
    }

    /// Undoes a sale: puts every line's quantity back, then deletes the
    /// lines and the sale.
    ///
    /// Lines whose product has since disappeared are skipped silently.
    pub async fn undo(&self, id: i64) -> DbResult<SaleWithItems> {
        debug!(id, "Undoing sale");

        let now = Utc::now();
        let mut tx = self.pool.begin().await?;

        let sql = format!("SELECT {SALE_COLUMNS} FROM sales WHERE id = ?1");
        let sale = sqlx::query_as::<_, Sale>(&sql)
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| DbError::not_found("Sale", id))?;

        let sql = format!("{ITEM_SELECT} WHERE si.sale_id = ?1 ORDER BY si.id");
        let items = sqlx::query_as::<_, SaleItem>(&sql)
            .bind(id)
            .fetch_all(&mut *tx)
            .await?;

        for item in &items {
            apply_stock_delta(&mut *tx, item.product_id, item.quantity, now).await?;
        }

        sqlx::query("DELETE FROM sale_items WHERE sale_id = ?1")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        sqlx::query("DELETE FROM sales WHERE id = ?1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        info!(id, lines = items.len(), "Sale undone");
        Ok(SaleWithItems { sale, items })
    }

    /// Gets a sale with its lines.
    pub async fn get(&self, id: i64) -> DbResult<Option<SaleWithItems>> {
        let sql = format!("SELECT {SALE_COLUMNS} FROM sales WHERE id = ?1");
        let Some(sale) = sqlx::query_as::<_, Sale>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
        else {
            return Ok(None);
        };

        let mut with_items = self.attach_items(vec![sale]).await?;
        Ok(with_items.pop())
    }

    /// Lists the most recent sales with their lines, newest first.
    pub async fn list(&self, limit: i64) -> DbResult<Vec<SaleWithItems>> {
        debug!(limit, "Listing sales");

        let sql = format!(
            "SELECT {SALE_COLUMNS} FROM sales ORDER BY {} DESC, id DESC LIMIT ?1",
            sortable_time("created_at")
        );
        let sales = sqlx::query_as::<_, Sale>(&sql)
            .bind(limit)
            .fetch_all(&self.pool)
            .await?;

        self.attach_items(sales).await
    }

    /// Sales created in `[start, end)`, oldest first.
    pub async fn list_between(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> DbResult<Vec<Sale>> {
        let sql = format!(
            "SELECT {SALE_COLUMNS} FROM sales WHERE {} ORDER BY {}, id",
            created_in_range("created_at"),
            sortable_time("created_at")
        );
        let sales = sqlx::query_as::<_, Sale>(&sql)
            .bind(start)
            .bind(end)
            .fetch_all(&self.pool)
            .await?;

        Ok(sales)
    }

    /// Sales created in `[start, end)` with their lines, oldest first.
    pub async fn list_between_with_items(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> DbResult<Vec<SaleWithItems>> {
        let sales = self.list_between(start, end).await?;
        self.attach_items(sales).await
    }

    /// Loads the lines of `sales` in one query and pairs them up, keeping
    /// the order of `sales`.
    async fn attach_items(&self, sales: Vec<Sale>) -> DbResult<Vec<SaleWithItems>> {
        if sales.is_empty() {
            return Ok(Vec::new());
        }

        let mut builder: QueryBuilder<Sqlite> = QueryBuilder::new(ITEM_SELECT);
        builder.push(" WHERE si.sale_id IN (");
        let mut ids = builder.separated(", ");
        for sale in &sales {
            ids.push_bind(sale.id);
        }
        ids.push_unseparated(") ORDER BY si.sale_id, si.id");

        let items = builder
            .build_query_as::<SaleItem>()
            .fetch_all(&self.pool)
            .await?;

        let mut by_sale: HashMap<i64, Vec<SaleItem>> = HashMap::new();
        for item in items {
            by_sale.entry(item.sale_id).or_default().push(item);
        }

        Ok(sales
            .into_iter()
            .map(|sale| SaleWithItems {
                items: by_sale.remove(&sale.id).unwrap_or_default(),
                sale,
            })
            .collect())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::testing::{db, product, quantity};
    use tally_core::{CoreError, NewStockArrival, Quantity, SaleLine};

    fn line(product_id: i64, quantity: Quantity, price: i64) -> SaleLine {
        SaleLine {
            product_id,
            quantity,
            selling_price_cents: price,
        }
    }

    #[tokio::test]
    async fn test_sale_moves_stock_and_totals_profit() {
        let db = db().await;
        let bread = product(&db, "Rye Bread", 150, 250, 10).await;
        let cheese = product(&db, "Gouda", 900, 1400, 3).await;

        let sale = db
            .sales()
            .create(&NewSale {
                items: vec![
                    line(bread.id, Quantity::from_units(2), 250),
                    line(cheese.id, Quantity::from_milli(500), 1400),
                ],
            })
            .await
            .unwrap();

        assert_eq!(sale.items.len(), 2);
        assert_eq!(sale.sale.total_amount_cents, 500 + 700);
        assert_eq!(sale.sale.total_profit_cents, 200 + 250);

        let item_profit: i64 = sale.items.iter().map(|i| i.profit_cents).sum();
        assert_eq!(item_profit, sale.sale.total_profit_cents);

        assert_eq!(quantity(&db, bread.id).await, Quantity::from_units(8));
        assert_eq!(quantity(&db, cheese.id).await, Quantity::from_milli(2500));

        let stored = db.sales().get(sale.sale.id).await.unwrap().unwrap();
        assert_eq!(stored.sale.total_profit_cents, 450);
        assert_eq!(stored.items[0].product_name.as_deref(), Some("Rye Bread"));
    }

    #[tokio::test]
    async fn test_sale_may_oversell() {
        let db = db().await;
        let bread = product(&db, "Rye Bread", 150, 250, 1).await;

        db.sales()
            .create(&NewSale {
                items: vec![line(bread.id, Quantity::from_units(3), 250)],
            })
            .await
            .unwrap();

        assert_eq!(quantity(&db, bread.id).await, Quantity::from_units(-2));
    }

    #[tokio::test]
    async fn test_sale_uses_cost_at_time_of_sale() {
        let db = db().await;
        let bread = product(&db, "Rye Bread", 150, 250, 10).await;

        let first = db
            .sales()
            .create(&NewSale {
                items: vec![line(bread.id, Quantity::ONE, 250)],
            })
            .await
            .unwrap();

        db.stock_arrivals()
            .create(&NewStockArrival {
                product_id: bread.id,
                quantity: Quantity::from_units(5),
                cost_price_cents: 200,
            })
            .await
            .unwrap();

        let second = db
            .sales()
            .create(&NewSale {
                items: vec![line(bread.id, Quantity::ONE, 250)],
            })
            .await
            .unwrap();

        assert_eq!(first.items[0].cost_price_cents, 150);
        assert_eq!(second.items[0].cost_price_cents, 200);

        // The first sale keeps its original snapshot
        let stored = db.sales().get(first.sale.id).await.unwrap().unwrap();
        assert_eq!(stored.sale.total_profit_cents, 100);
    }

    #[tokio::test]
    async fn test_missing_product_rolls_back_everything() {
        let db = db().await;
        let bread = product(&db, "Rye Bread", 150, 250, 10).await;

        let err = db
            .sales()
            .create(&NewSale {
                items: vec![line(bread.id, Quantity::ONE, 250), line(999, Quantity::ONE, 100)],
            })
            .await
            .unwrap_err();

        assert!(err.is_not_found());
        assert_eq!(quantity(&db, bread.id).await, Quantity::from_units(10));
        assert!(db.sales().list(100).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_overflowing_total_rolls_back_everything() {
        let db = db().await;
        let bread = product(&db, "Rye Bread", 150, 250, 10).await;

        let err = db
            .sales()
            .create(&NewSale {
                items: vec![
                    line(bread.id, Quantity::ONE, 250),
                    line(bread.id, Quantity::from_units(2), 5_000_000_000_000_000_000),
                ],
            })
            .await
            .unwrap_err();

        assert!(matches!(err, DbError::Rejected(CoreError::AmountOverflow)));
        assert_eq!(quantity(&db, bread.id).await, Quantity::from_units(10));
        assert!(db.sales().list(100).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_undo_restores_stock_exactly() {
        let db = db().await;
        let bread = product(&db, "Rye Bread", 150, 250, 10).await;
        let cheese = product(&db, "Gouda", 900, 1400, 3).await;

        let sale = db
            .sales()
            .create(&NewSale {
                items: vec![
                    line(bread.id, Quantity::from_units(4), 250),
                    line(cheese.id, Quantity::from_milli(1250), 1400),
                ],
            })
            .await
            .unwrap();

        let undone = db.sales().undo(sale.sale.id).await.unwrap();
        assert_eq!(undone.items.len(), 2);

        assert_eq!(quantity(&db, bread.id).await, Quantity::from_units(10));
        assert_eq!(quantity(&db, cheese.id).await, Quantity::from_units(3));
        assert!(db.sales().get(sale.sale.id).await.unwrap().is_none());

        assert!(db.sales().undo(sale.sale.id).await.unwrap_err().is_not_found());
    }

    #[tokio::test]
    async fn test_list_newest_first_with_limit() {
        let db = db().await;
        let bread = product(&db, "Rye Bread", 150, 250, 10).await;

        let mut ids = Vec::new();
        for _ in 0..3 {
            let sale = db
                .sales()
                .create(&NewSale {
                    items: vec![line(bread.id, Quantity::ONE, 250)],
                })
                .await
                .unwrap();
            ids.push(sale.sale.id);
        }

        let listed = db.sales().list(2).await.unwrap();
        assert_eq!(listed.len(), 2);
        assert_eq!(listed[0].sale.id, ids[2]);
        assert_eq!(listed[1].sale.id, ids[1]);
        assert!(listed.iter().all(|s| s.items.len() == 1));
    }
}
