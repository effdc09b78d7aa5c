//! # Cash Flow Repository
//!
//! Database operations for the per-day, per-register cash-flow entries.
//!
//! ## NULL-Register Semantics
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  (entry_date, register_id='r1')  → register r1's day                    │
//! │  (entry_date, register_id=NULL)  → all registers combined               │
//! │                                                                         │
//! │  SQLite's ordinary `=` never matches NULL, so lookups use               │
//! │  `register_id IS ?`, which treats NULL = NULL as a match.               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The amounts in an entry are derived data; the reconciliation service
//! owns recomputing them. This repository only reads entries and adjusts
//! the one hand-entered field, the opening balance.

use chrono::NaiveDate;
use sqlx::{SqliteConnection, SqlitePool};
use tracing::debug;

use crate::error::{DbError, DbResult};
use crate::repository::generate_id;
use caixa_core::CashFlowEntry;

const ENTRY_COLUMNS: &str = "id, entry_date, register_id, opening_cents, \
     cash_sales_cents, credit_sales_cents, receipts_cents, closing_cents";

/// Repository for cash-flow entry operations.
#[derive(Debug, Clone)]
pub struct CashFlowRepository {
    pool: SqlitePool,
}

impl CashFlowRepository {
    /// Creates a new CashFlowRepository.
    pub fn new(pool: SqlitePool) -> Self {
        CashFlowRepository { pool }
    }

    /// Gets the entry for a day and register scope.
    pub async fn get(
        &self,
        date: NaiveDate,
        register_id: Option<&str>,
    ) -> DbResult<Option<CashFlowEntry>> {
        let entry = sqlx::query_as::<_, CashFlowEntry>(&format!(
            "SELECT {ENTRY_COLUMNS} FROM cash_flow_entries \
             WHERE entry_date = ? AND register_id IS ?"
        ))
        .bind(date)
        .bind(register_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(entry)
    }

    /// Transaction-scoped fetch, used by the reconciliation service.
    pub async fn get_tx(
        conn: &mut SqliteConnection,
        date: NaiveDate,
        register_id: Option<&str>,
    ) -> DbResult<Option<CashFlowEntry>> {
        let entry = sqlx::query_as::<_, CashFlowEntry>(&format!(
            "SELECT {ENTRY_COLUMNS} FROM cash_flow_entries \
             WHERE entry_date = ? AND register_id IS ?"
        ))
        .bind(date)
        .bind(register_id)
        .fetch_optional(conn)
        .await?;

        Ok(entry)
    }

    /// Lists entries for a date range, oldest first.
    ///
    /// `register_id` of `None` lists the all-registers entries only.
    pub async fn list_range(
        &self,
        from: NaiveDate,
        to: NaiveDate,
        register_id: Option<&str>,
    ) -> DbResult<Vec<CashFlowEntry>> {
        let entries = sqlx::query_as::<_, CashFlowEntry>(&format!(
            "SELECT {ENTRY_COLUMNS} FROM cash_flow_entries \
             WHERE entry_date >= ? AND entry_date <= ? AND register_id IS ? \
             ORDER BY entry_date"
        ))
        .bind(from)
        .bind(to)
        .bind(register_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(entries)
    }

    /// Inserts an entry inside the caller's transaction.
    pub async fn insert_tx(conn: &mut SqliteConnection, entry: &CashFlowEntry) -> DbResult<()> {
        debug!(
            entry_date = %entry.entry_date,
            register_id = ?entry.register_id,
            "Inserting cash-flow entry"
        );

        sqlx::query(
            r#"
            INSERT INTO cash_flow_entries (
                id, entry_date, register_id, opening_cents,
                cash_sales_cents, credit_sales_cents, receipts_cents, closing_cents
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&entry.id)
        .bind(entry.entry_date)
        .bind(&entry.register_id)
        .bind(entry.opening_cents)
        .bind(entry.cash_sales_cents)
        .bind(entry.credit_sales_cents)
        .bind(entry.receipts_cents)
        .bind(entry.closing_cents)
        .execute(conn)
        .await?;

        Ok(())
    }

    /// Writes the derived amounts inside the caller's transaction.
    ///
    /// Opening balance is left untouched; only the reconciler's derived
    /// fields are overwritten.
    pub async fn set_amounts_tx(
        conn: &mut SqliteConnection,
        id: &str,
        cash_sales_cents: i64,
        credit_sales_cents: i64,
        receipts_cents: i64,
        closing_cents: i64,
    ) -> DbResult<()> {
        let result = sqlx::query(
            r#"
            UPDATE cash_flow_entries SET
                cash_sales_cents = ?,
                credit_sales_cents = ?,
                receipts_cents = ?,
                closing_cents = ?
            WHERE id = ?
            "#,
        )
        .bind(cash_sales_cents)
        .bind(credit_sales_cents)
        .bind(receipts_cents)
        .bind(closing_cents)
        .bind(id)
        .execute(conn)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("CashFlowEntry", id));
        }

        Ok(())
    }

    /// Sets the opening balance for a day and register scope.
    ///
    /// Creates the entry if it does not exist yet. The closing balance is
    /// re-derived as opening + receipts so the entry stays consistent
    /// without a full recompute.
    pub async fn set_opening_balance(
        &self,
        date: NaiveDate,
        register_id: Option<&str>,
        opening_cents: i64,
    ) -> DbResult<CashFlowEntry> {
        debug!(
            entry_date = %date,
            register_id = ?register_id,
            opening_cents = %opening_cents,
            "Setting opening balance"
        );

        let mut tx = self.pool.begin().await?;

        let entry = match Self::get_tx(&mut *tx, date, register_id).await? {
            Some(mut entry) => {
                entry.opening_cents = opening_cents;
                entry.closing_cents = opening_cents + entry.receipts_cents;

                sqlx::query(
                    "UPDATE cash_flow_entries SET opening_cents = ?, closing_cents = ? WHERE id = ?",
                )
                .bind(entry.opening_cents)
                .bind(entry.closing_cents)
                .bind(&entry.id)
                .execute(&mut *tx)
                .await?;

                entry
            }
            None => {
                let entry = CashFlowEntry {
                    id: generate_id(),
                    entry_date: date,
                    register_id: register_id.map(str::to_string),
                    opening_cents,
                    cash_sales_cents: 0,
                    credit_sales_cents: 0,
                    receipts_cents: 0,
                    closing_cents: opening_cents,
                };
                Self::insert_tx(&mut *tx, &entry).await?;
                entry
            }
        };

        tx.commit().await?;

        Ok(entry)
    }
}
