//! # Product Repository
//!
//! Database operations for products and stock.
//!
//! ## Stock Update Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  ❌ WRONG: read stock, compare, write new value                         │
//! │     Two concurrent sales both read stock=1, both pass, stock goes -1.  │
//! │                                                                         │
//! │  ✅ CORRECT: conditional decrement, checked by affected rows            │
//! │     UPDATE products SET stock = stock - ? WHERE id = ? AND stock >= ?  │
//! │     0 rows affected means the stock moved under us: fail the sale.     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::Utc;
use sqlx::{SqliteConnection, SqlitePool};
use tracing::debug;

use crate::error::{DbError, DbResult};
use caixa_core::validation::{validate_name, validate_price_cents};
use caixa_core::Product;

const SELECT_COLUMNS: &str =
    "id, kind, description, price_cents, stock, created_at, updated_at";

/// Repository for product database operations.
#[derive(Debug, Clone)]
pub struct ProductRepository {
    pool: SqlitePool,
}

impl ProductRepository {
    /// Creates a new ProductRepository.
    pub fn new(pool: SqlitePool) -> Self {
        ProductRepository { pool }
    }

    /// Inserts a new product.
    pub async fn insert(&self, product: &Product) -> DbResult<()> {
        debug!(description = %product.description, "Inserting product");

        validate_name("description", &product.description)?;
        validate_price_cents(product.price_cents)?;

        sqlx::query(
            r#"
            INSERT INTO products (
                id, kind, description, price_cents, stock, created_at, updated_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&product.id)
        .bind(&product.kind)
        .bind(&product.description)
        .bind(product.price_cents)
        .bind(product.stock)
        .bind(product.created_at)
        .bind(product.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Gets a product by ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Product>> {
        let product = sqlx::query_as::<_, Product>(&format!(
            "SELECT {SELECT_COLUMNS} FROM products WHERE id = ?"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(product)
    }

    /// Transaction-scoped fetch, used by the checkout service.
    pub async fn get_by_id_tx(
        conn: &mut SqliteConnection,
        id: &str,
    ) -> DbResult<Option<Product>> {
        let product = sqlx::query_as::<_, Product>(&format!(
            "SELECT {SELECT_COLUMNS} FROM products WHERE id = ?"
        ))
        .bind(id)
        .fetch_optional(conn)
        .await?;

        Ok(product)
    }

    /// Lists all products ordered by kind then description.
    pub async fn list(&self) -> DbResult<Vec<Product>> {
        let products = sqlx::query_as::<_, Product>(&format!(
            "SELECT {SELECT_COLUMNS} FROM products ORDER BY kind, description"
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(products)
    }

    /// Searches products by description or kind (substring match).
    pub async fn search(&self, query: &str, limit: u32) -> DbResult<Vec<Product>> {
        let query = query.trim();

        debug!(query = %query, limit = %limit, "Searching products");

        if query.is_empty() {
            return self.list().await;
        }

        let pattern = format!("%{query}%");

        let products = sqlx::query_as::<_, Product>(&format!(
            "SELECT {SELECT_COLUMNS} FROM products \
             WHERE description LIKE ? OR kind LIKE ? \
             ORDER BY description LIMIT ?"
        ))
        .bind(&pattern)
        .bind(&pattern)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        debug!(count = products.len(), "Search returned products");
        Ok(products)
    }

    /// Updates a product's editable fields (price, description, kind).
    ///
    /// Stock is NOT updated here; use [`Self::adjust_stock`] or the
    /// checkout service's conditional decrement.
    pub async fn update(&self, product: &Product) -> DbResult<()> {
        debug!(id = %product.id, "Updating product");

        validate_name("description", &product.description)?;
        validate_price_cents(product.price_cents)?;

        let now = Utc::now();

        let result = sqlx::query(
            r#"
            UPDATE products SET
                kind = ?,
                description = ?,
                price_cents = ?,
                updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(&product.kind)
        .bind(&product.description)
        .bind(product.price_cents)
        .bind(now)
        .bind(&product.id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Product", &product.id));
        }

        Ok(())
    }

    /// Adjusts stock by a delta (positive = restock, negative = correction).
    ///
    /// Refuses to take the stock negative.
    pub async fn adjust_stock(&self, id: &str, delta: i64) -> DbResult<()> {
        debug!(id = %id, delta = %delta, "Adjusting stock");

        let now = Utc::now();

        let result = sqlx::query(
            r#"
            UPDATE products
            SET stock = stock + ?, updated_at = ?
            WHERE id = ? AND stock + ? >= 0
            "#,
        )
        .bind(delta)
        .bind(now)
        .bind(id)
        .bind(delta)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Product", id));
        }

        Ok(())
    }

    /// Transaction-scoped conditional stock decrement.
    ///
    /// ## Returns
    /// `true` if the stock was decremented; `false` if the product had
    /// fewer than `quantity` units (or no longer exists). The caller
    /// translates `false` into an insufficient-stock failure and rolls
    /// the transaction back.
    pub async fn take_stock_tx(
        conn: &mut SqliteConnection,
        id: &str,
        quantity: i64,
    ) -> DbResult<bool> {
        let now = Utc::now();

        let result = sqlx::query(
            r#"
            UPDATE products
            SET stock = stock - ?, updated_at = ?
            WHERE id = ? AND stock >= ?
            "#,
        )
        .bind(quantity)
        .bind(now)
        .bind(id)
        .bind(quantity)
        .execute(conn)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Deletes a product.
    ///
    /// ## Returns
    /// * `Err(DbError::IntegrityConflict)` - product appears in sale items
    pub async fn delete(&self, id: &str) -> DbResult<()> {
        debug!(id = %id, "Deleting product");

        let references: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM sale_items WHERE product_id = ?")
                .bind(id)
                .fetch_one(&self.pool)
                .await?;

        if references > 0 {
            return Err(DbError::still_referenced("Product", id, "sale items"));
        }

        let result = sqlx::query("DELETE FROM products WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Product", id));
        }

        Ok(())
    }

    /// Counts products (for diagnostics and seeding).
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM products")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::generate_id;
    use crate::testutil::fixture;
    use caixa_core::{CoreError, PaymentMode};

    #[tokio::test]
    async fn test_insert_rejects_negative_price() {
        let f = fixture().await;

        let product = Product {
            id: generate_id(),
            kind: "bebida".to_string(),
            description: "Suco de laranja".to_string(),
            price_cents: -100,
            stock: 0,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };

        let err = f.db.products().insert(&product).await.unwrap_err();
        assert!(matches!(err, DbError::Core(CoreError::Validation(_))));
        assert!(f.db.products().get_by_id(&product.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_adjust_stock_refuses_going_negative() {
        let f = fixture().await;

        f.db.products().adjust_stock(&f.product_id, -4).await.unwrap();
        let product = f.db.products().get_by_id(&f.product_id).await.unwrap().unwrap();
        assert_eq!(product.stock, 6);

        let err = f.db.products().adjust_stock(&f.product_id, -7).await.unwrap_err();
        assert!(matches!(err, DbError::NotFound { .. }));

        let product = f.db.products().get_by_id(&f.product_id).await.unwrap().unwrap();
        assert_eq!(product.stock, 6);
    }

    #[tokio::test]
    async fn test_delete_blocked_while_referenced_by_sales() {
        let f = fixture().await;

        f.db.checkout()
            .finalize_sale(&f.draft(PaymentMode::Cash, 1))
            .await
            .unwrap();

        let err = f.db.products().delete(&f.product_id).await.unwrap_err();
        assert!(matches!(err, DbError::IntegrityConflict { .. }));

        // An unreferenced product deletes fine
        let other = f.add_product(500, 3).await;
        f.db.products().delete(&other).await.unwrap();
        assert!(f.db.products().get_by_id(&other).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_search_matches_description_and_kind() {
        let f = fixture().await;

        let hits = f.db.products().search("Refri", 10).await.unwrap();
        assert_eq!(hits.len(), 1);

        let hits = f.db.products().search("bebida", 10).await.unwrap();
        assert_eq!(hits.len(), 1);

        let hits = f.db.products().search("inexistente", 10).await.unwrap();
        assert!(hits.is_empty());
    }
}
