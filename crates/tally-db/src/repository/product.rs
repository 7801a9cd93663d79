//! # Product Repository
//!
//! Database operations for products.
//!
//! ## Key Operations
//! - Listing with name search and a low-stock filter
//! - CRUD operations
//! - Cascading delete
//!
//! ## Cascading Delete
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  DELETE product 7 (one transaction)                                     │
//! │                                                                         │
//! │  1. sale_items      WHERE product_id = 7                                │
//! │  2. withdrawals     WHERE product_id = 7                                │
//! │  3. stock_arrivals  WHERE product_id = 7                                │
//! │  4. products        WHERE id = 7                                        │
//! │  5. sales           WHERE no sale_items remain                          │
//! │                                                                         │
//! │  Sales that keep other lines survive with their original totals.       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::{debug, info};

use crate::error::{DbError, DbResult};
use tally_core::{NewProduct, Product, ProductPatch};

/// Columns selected for every `Product` row.
pub(crate) const PRODUCT_COLUMNS: &str = "id, name, unit_type, cost_price_cents, selling_price_cents, \
     quantity, min_stock, created_at, updated_at";

/// Filters for [`ProductRepository::list`].
#[derive(Debug, Clone, Default)]
pub struct ProductFilter {
    /// Case-insensitive substring of the product name.
    pub search: Option<String>,
    /// Only products with `quantity <= min_stock`.
    pub low_stock: bool,
}

/// Rows removed by [`ProductRepository::delete`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ProductDeletion {
    pub sale_items: u64,
    pub withdrawals: u64,
    pub stock_arrivals: u64,
    pub orphaned_sales: u64,
}

/// Repository for product database operations.
///
/// ## Usage
/// ```rust,ignore
/// let repo = ProductRepository::new(pool);
///
/// let low = repo.list(&ProductFilter { low_stock: true, ..Default::default() }).await?;
/// let bread = repo.get(1).await?;
/// ```
#[derive(Debug, Clone)]
pub struct ProductRepository {
    pool: SqlitePool,
}

impl ProductRepository {
    /// Creates a new ProductRepository.
    pub fn new(pool: SqlitePool) -> Self {
        ProductRepository { pool }
    }

    /// Lists products ordered by name.
    pub async fn list(&self, filter: &ProductFilter) -> DbResult<Vec<Product>> {
        let search = filter
            .search
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(like_pattern);

        debug!(search = ?search, low_stock = filter.low_stock, "Listing products");

        let sql = format!(
            r#"
            SELECT {PRODUCT_COLUMNS}
            FROM products
            WHERE (?1 IS NULL OR name LIKE ?1 ESCAPE '\')
              AND (?2 = 0 OR quantity <= min_stock)
            ORDER BY name COLLATE NOCASE, id
            "#
        );

        let products = sqlx::query_as::<_, Product>(&sql)
            .bind(search)
            .bind(filter.low_stock)
            .fetch_all(&self.pool)
            .await?;

        debug!(count = products.len(), "Listed products");
        Ok(products)
    }

    /// Gets a product by its ID.
    ///
    /// ## Returns
    /// * `Ok(Some(Product))` - Product found
    /// * `Ok(None)` - Product not found
    pub async fn get(&self, id: i64) -> DbResult<Option<Product>> {
        let sql = format!("SELECT {PRODUCT_COLUMNS} FROM products WHERE id = ?1");

        let product = sqlx::query_as::<_, Product>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(product)
    }

    /// Gets a product by its ID, failing with `NotFound` when missing.
    pub async fn require(&self, id: i64) -> DbResult<Product> {
        self.get(id)
            .await?
            .ok_or_else(|| DbError::not_found("Product", id))
    }

    /// Inserts a new product. The name is stored trimmed.
    pub async fn create(&self, input: &NewProduct) -> DbResult<Product> {
        let name = input.name.trim();
        debug!(name = %name, "Inserting product");

        let now = Utc::now();
        let sql = format!(
            r#"
            INSERT INTO products (
                name, unit_type, cost_price_cents, selling_price_cents,
                quantity, min_stock, created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?7)
            RETURNING {PRODUCT_COLUMNS}
            "#
        );

        let product = sqlx::query_as::<_, Product>(&sql)
            .bind(name)
            .bind(input.unit_type)
            .bind(input.cost_price_cents)
            .bind(input.selling_price_cents)
            .bind(input.quantity)
            .bind(input.min_stock)
            .bind(now)
            .fetch_one(&self.pool)
            .await?;

        info!(id = product.id, name = %product.name, "Product created");
        Ok(product)
    }

    /// Applies a partial update and refreshes `updated_at`.
    ///
    /// ## Returns
    /// * `Ok(Product)` - The updated product
    /// * `Err(DbError::NotFound)` - Product doesn't exist
    pub async fn update(&self, id: i64, patch: &ProductPatch) -> DbResult<Product> {
        debug!(id, "Updating product");

        let mut tx = self.pool.begin().await?;

        let sql = format!("SELECT {PRODUCT_COLUMNS} FROM products WHERE id = ?1");
        let current = sqlx::query_as::<_, Product>(&sql)
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| DbError::not_found("Product", id))?;

        let next = patch.apply_to(&current);

        let sql = format!(
            r#"
            UPDATE products SET
                name = ?2,
                unit_type = ?3,
                cost_price_cents = ?4,
                selling_price_cents = ?5,
                quantity = ?6,
                min_stock = ?7,
                updated_at = ?8
            WHERE id = ?1
            RETURNING {PRODUCT_COLUMNS}
            "#
        );

        let updated = sqlx::query_as::<_, Product>(&sql)
            .bind(id)
            .bind(&next.name)
            .bind(next.unit_type)
            .bind(next.cost_price_cents)
            .bind(next.selling_price_cents)
            .bind(next.quantity)
            .bind(next.min_stock)
            .bind(Utc::now())
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;

        info!(id, "Product updated");
        Ok(updated)
    }

    /// Deletes a product together with every row that references it, then
    /// removes sales left with no lines.
    ///
    /// Totals of sales that keep other lines are not recomputed.
    pub async fn delete(&self, id: i64) -> DbResult<ProductDeletion> {
        debug!(id, "Deleting product");

        let mut tx = self.pool.begin().await?;

        let exists: Option<i64> = sqlx::query_scalar("SELECT id FROM products WHERE id = ?1")
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?;
        if exists.is_none() {
            return Err(DbError::not_found("Product", id));
        }

        let sale_items = sqlx::query("DELETE FROM sale_items WHERE product_id = ?1")
            .bind(id)
            .execute(&mut *tx)
            .await?
            .rows_affected();

        let withdrawals = sqlx::query("DELETE FROM withdrawals WHERE product_id = ?1")
            .bind(id)
            .execute(&mut *tx)
            .await?
            .rows_affected();

        let stock_arrivals = sqlx::query("DELETE FROM stock_arrivals WHERE product_id = ?1")
            .bind(id)
            .execute(&mut *tx)
            .await?
            .rows_affected();

        sqlx::query("DELETE FROM products WHERE id = ?1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        let orphaned_sales = sqlx::query(
            "DELETE FROM sales WHERE NOT EXISTS (SELECT 1 FROM sale_items si WHERE si.sale_id = sales.id)",
        )
        .execute(&mut *tx)
        .await?
        .rows_affected();

        tx.commit().await?;

        let deletion = ProductDeletion {
            sale_items,
            withdrawals,
            stock_arrivals,
            orphaned_sales,
        };
        info!(id, ?deletion, "Product deleted");
        Ok(deletion)
    }

    /// Counts products.
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM products")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}

/// Builds a `LIKE` pattern matching `term` anywhere, with `%`, `_` and `\`
/// taken literally.
fn like_pattern(term: &str) -> String {
    let mut pattern = String::with_capacity(term.len() + 2);
    pattern.push('%');
    for c in term.chars() {
        if matches!(c, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}

// =============================================================================
// Unit Tests
// =============================================================================
