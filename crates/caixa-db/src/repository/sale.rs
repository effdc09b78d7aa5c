//! # Sale Repository
//!
//! Database operations for sales, sale items and payments.
//!
//! ## Sale Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Sale Lifecycle                                    │
//! │                                                                         │
//! │  1. FINALIZE (checkout service, one transaction)                       │
//! │     └── insert_tx() + insert_item_tx()×N                               │
//! │         cash sale   → status: paid,    paid = total, auto payment      │
//! │         credit sale → status: pending, paid = 0                        │
//! │                                                                         │
//! │  2. COLLECT (billing service, per payment)                             │
//! │     └── insert_payment_tx() + set_payment_state_tx()                   │
//! │         partial → status: partial                                      │
//! │         full    → status: paid (customer ledger settled)               │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! There is no draft state: the shell assembles the cart, and the backend
//! only ever sees complete drafts to finalize atomically.

use chrono::NaiveDate;
use sqlx::{SqliteConnection, SqlitePool};
use tracing::debug;

use crate::error::{DbError, DbResult};
use caixa_core::{Payment, Sale, SaleItem, SaleStatus};

const SALE_COLUMNS: &str = "id, customer_id, seller_id, register_id, mode, status, \
     total_cents, paid_cents, notes, created_at";

const PAYMENT_COLUMNS: &str = "id, sale_id, amount_cents, method, received_by, notes, created_at";

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

    /// Gets a sale by ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Sale>> {
        let sale = sqlx::query_as::<_, Sale>(&format!(
            "SELECT {SALE_COLUMNS} FROM sales WHERE id = ?"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(sale)
    }

    /// Transaction-scoped fetch, used by the billing service.
    pub async fn get_by_id_tx(conn: &mut SqliteConnection, id: &str) -> DbResult<Option<Sale>> {
        let sale = sqlx::query_as::<_, Sale>(&format!(
            "SELECT {SALE_COLUMNS} FROM sales WHERE id = ?"
        ))
        .bind(id)
        .fetch_optional(conn)
        .await?;

        Ok(sale)
    }

    /// Inserts a sale inside the caller's transaction.
    pub async fn insert_tx(conn: &mut SqliteConnection, sale: &Sale) -> DbResult<()> {
        debug!(id = %sale.id, total_cents = %sale.total_cents, "Inserting sale");

        sqlx::query(
            r#"
            INSERT INTO sales (
                id, customer_id, seller_id, register_id, mode, status,
                total_cents, paid_cents, notes, created_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&sale.id)
        .bind(&sale.customer_id)
        .bind(&sale.seller_id)
        .bind(&sale.register_id)
        .bind(sale.mode)
        .bind(sale.status)
        .bind(sale.total_cents)
        .bind(sale.paid_cents)
        .bind(&sale.notes)
        .bind(sale.created_at)
        .execute(conn)
        .await?;

        Ok(())
    }

    /// Inserts a line item inside the caller's transaction.
    ///
    /// ## Snapshot Pattern
    /// The unit price is copied to the item, preserving the sale history
    /// even if the product's price changes later.
    pub async fn insert_item_tx(conn: &mut SqliteConnection, item: &SaleItem) -> DbResult<()> {
        debug!(sale_id = %item.sale_id, product_id = %item.product_id, "Inserting sale item");

        sqlx::query(
            r#"
            INSERT INTO sale_items (
                id, sale_id, product_id, quantity,
                unit_price_cents, subtotal_cents, created_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&item.id)
        .bind(&item.sale_id)
        .bind(&item.product_id)
        .bind(item.quantity)
        .bind(item.unit_price_cents)
        .bind(item.subtotal_cents)
        .bind(item.created_at)
        .execute(conn)
        .await?;

        Ok(())
    }

    /// Gets all items for a sale, in insertion order.
    pub async fn get_items(&self, sale_id: &str) -> DbResult<Vec<SaleItem>> {
        let items = sqlx::query_as::<_, SaleItem>(
            r#"
            SELECT id, sale_id, product_id, quantity,
                   unit_price_cents, subtotal_cents, created_at
            FROM sale_items
            WHERE sale_id = ?
            ORDER BY created_at
            "#,
        )
        .bind(sale_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(items)
    }

    /// Lists sales for a day, optionally scoped to one register.
    pub async fn list_by_date(
        &self,
        date: NaiveDate,
        register_id: Option<&str>,
    ) -> DbResult<Vec<Sale>> {
        let sales = sqlx::query_as::<_, Sale>(&format!(
            "SELECT {SALE_COLUMNS} FROM sales \
             WHERE date(created_at) = ? AND (? IS NULL OR register_id = ?) \
             ORDER BY created_at"
        ))
        .bind(date)
        .bind(register_id)
        .bind(register_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(sales)
    }

    /// Lists a customer's sales, newest first.
    pub async fn list_by_customer(&self, customer_id: &str) -> DbResult<Vec<Sale>> {
        let sales = sqlx::query_as::<_, Sale>(&format!(
            "SELECT {SALE_COLUMNS} FROM sales \
             WHERE customer_id = ? ORDER BY created_at DESC"
        ))
        .bind(customer_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(sales)
    }

    /// Lists a customer's unsettled sales (pending or partial), oldest first.
    ///
    /// This is the statement the billing screen works from.
    pub async fn open_sales_for_customer(&self, customer_id: &str) -> DbResult<Vec<Sale>> {
        let sales = sqlx::query_as::<_, Sale>(&format!(
            "SELECT {SALE_COLUMNS} FROM sales \
             WHERE customer_id = ? AND status != 'paid' ORDER BY created_at"
        ))
        .bind(customer_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(sales)
    }

    /// Updates a sale's payment progress inside the caller's transaction.
    pub async fn set_payment_state_tx(
        conn: &mut SqliteConnection,
        sale_id: &str,
        paid_cents: i64,
        status: SaleStatus,
    ) -> DbResult<()> {
        let result = sqlx::query("UPDATE sales SET paid_cents = ?, status = ? WHERE id = ?")
            .bind(paid_cents)
            .bind(status)
            .bind(sale_id)
            .execute(conn)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Sale", sale_id));
        }

        Ok(())
    }

    /// Records a payment inside the caller's transaction.
    pub async fn insert_payment_tx(
        conn: &mut SqliteConnection,
        payment: &Payment,
    ) -> DbResult<()> {
        debug!(sale_id = %payment.sale_id, amount_cents = %payment.amount_cents, "Recording payment");

        sqlx::query(
            r#"
            INSERT INTO payments (
                id, sale_id, amount_cents, method, received_by, notes, created_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&payment.id)
        .bind(&payment.sale_id)
        .bind(payment.amount_cents)
        .bind(payment.method)
        .bind(&payment.received_by)
        .bind(&payment.notes)
        .bind(payment.created_at)
        .execute(conn)
        .await?;

        Ok(())
    }

    /// Gets all payments for a sale, in order received.
    pub async fn get_payments(&self, sale_id: &str) -> DbResult<Vec<Payment>> {
        let payments = sqlx::query_as::<_, Payment>(&format!(
            "SELECT {PAYMENT_COLUMNS} FROM payments WHERE sale_id = ? ORDER BY created_at"
        ))
        .bind(sale_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(payments)
    }

    /// Gets the total amount paid for a sale.
    pub async fn total_paid(&self, sale_id: &str) -> DbResult<i64> {
        let total: i64 = sqlx::query_scalar(
            "SELECT COALESCE(SUM(amount_cents), 0) FROM payments WHERE sale_id = ?",
        )
        .bind(sale_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(total)
    }
}
