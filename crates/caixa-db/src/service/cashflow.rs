//! # Cash Flow Reconciliation Service
//!
//! Recomputes the per-day, per-register cash-flow entries from the sale
//! and payment rows.
//!
//! ## Recompute, Never Patch
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  An entry is a materialized summary:                                    │
//! │                                                                         │
//! │    cash_sales  = Σ total of cash-mode sales on that date               │
//! │    credit_sales= Σ total of credit-mode sales on that date             │
//! │    receipts    = Σ payments received on that date (via their sale)     │
//! │    closing     = opening + receipts                                    │
//! │                                                                         │
//! │  Every mutation path (checkout, billing) triggers a full recompute of  │
//! │  the affected (date, register) inside the same transaction. There is   │
//! │  no incremental "+= amount" anywhere, so the entry can never drift.    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Receipts attribute a payment to the register of its SALE, on the date
//! the payment was RECEIVED. A credit sale rung up at register 1 on Monday
//! and paid on Friday shows up in register 1's Friday receipts.

use chrono::{Duration, NaiveDate};
use sqlx::{SqliteConnection, SqlitePool};
use tracing::{debug, info};

use crate::error::DbResult;
use crate::repository::cash_flow::CashFlowRepository;
use crate::repository::generate_id;
use crate::repository::register::RegisterRepository;
use caixa_core::CashFlowEntry;

/// Service recomputing cash-flow entries.
#[derive(Debug, Clone)]
pub struct CashFlowService {
    pool: SqlitePool,
}

impl CashFlowService {
    /// Creates a new CashFlowService.
    pub fn new(pool: SqlitePool) -> Self {
        CashFlowService { pool }
    }

    /// Recomputes one (date, register) entry in its own transaction.
    ///
    /// `register_id` of `None` recomputes the all-registers entry.
    pub async fn recompute(
        &self,
        date: NaiveDate,
        register_id: Option<&str>,
    ) -> DbResult<CashFlowEntry> {
        let mut tx = self.pool.begin().await?;
        let entry = Self::recompute_on(&mut *tx, date, register_id).await?;
        tx.commit().await?;

        Ok(entry)
    }

    /// Recomputes a range of days in a single transaction, oldest first.
    ///
    /// Used after backfilling or correcting historical sales.
    pub async fn recompute_range(
        &self,
        from: NaiveDate,
        to: NaiveDate,
        register_id: Option<&str>,
    ) -> DbResult<Vec<CashFlowEntry>> {
        info!(from = %from, to = %to, register_id = ?register_id, "Recomputing cash-flow range");

        let mut tx = self.pool.begin().await?;

        let mut entries = Vec::new();
        let mut day = from;
        while day <= to {
            entries.push(Self::recompute_on(&mut *tx, day, register_id).await?);
            day += Duration::days(1);
        }

        tx.commit().await?;

        Ok(entries)
    }

    /// Recomputes every register's entry for a day, plus the
    /// all-registers entry, in one transaction.
    ///
    /// Deactivated registers are included; they keep their history and a
    /// backfilled sale at one must not leave its entry stale.
    pub async fn recompute_all(&self, date: NaiveDate) -> DbResult<Vec<CashFlowEntry>> {
        info!(date = %date, "Recomputing cash flow for all registers");

        let register_ids = RegisterRepository::new(self.pool.clone()).list_ids().await?;

        let mut tx = self.pool.begin().await?;

        let mut entries = Vec::new();
        for register_id in &register_ids {
            entries.push(Self::recompute_on(&mut *tx, date, Some(register_id)).await?);
        }
        entries.push(Self::recompute_on(&mut *tx, date, None).await?);

        tx.commit().await?;

        Ok(entries)
    }

    /// Recomputes one entry inside the caller's transaction.
    ///
    /// This is the variant the checkout and billing services call so the
    /// reconciliation commits or rolls back together with the sale or
    /// payment that triggered it.
    pub async fn recompute_on(
        conn: &mut SqliteConnection,
        date: NaiveDate,
        register_id: Option<&str>,
    ) -> DbResult<CashFlowEntry> {
        debug!(date = %date, register_id = ?register_id, "Recomputing cash-flow entry");

        let cash_sales_cents: i64 = sqlx::query_scalar(
            r#"
            SELECT COALESCE(SUM(total_cents), 0)
            FROM sales
            WHERE date(created_at) = ? AND mode = 'cash'
              AND (? IS NULL OR register_id = ?)
            "#,
        )
        .bind(date)
        .bind(register_id)
        .bind(register_id)
        .fetch_one(&mut *conn)
        .await?;

        let credit_sales_cents: i64 = sqlx::query_scalar(
            r#"
            SELECT COALESCE(SUM(total_cents), 0)
            FROM sales
            WHERE date(created_at) = ? AND mode = 'credit'
              AND (? IS NULL OR register_id = ?)
            "#,
        )
        .bind(date)
        .bind(register_id)
        .bind(register_id)
        .fetch_one(&mut *conn)
        .await?;

        // Payments count on the day RECEIVED, attributed to the register
        // of their sale.
        let receipts_cents: i64 = sqlx::query_scalar(
            r#"
            SELECT COALESCE(SUM(p.amount_cents), 0)
            FROM payments p
            INNER JOIN sales s ON s.id = p.sale_id
            WHERE date(p.created_at) = ?
              AND (? IS NULL OR s.register_id = ?)
            "#,
        )
        .bind(date)
        .bind(register_id)
        .bind(register_id)
        .fetch_one(&mut *conn)
        .await?;

        let mut entry = match CashFlowRepository::get_tx(&mut *conn, date, register_id).await? {
            Some(entry) => entry,
            None => {
                let entry = CashFlowEntry {
                    id: generate_id(),
                    entry_date: date,
                    register_id: register_id.map(str::to_string),
                    opening_cents: 0,
                    cash_sales_cents: 0,
                    credit_sales_cents: 0,
                    receipts_cents: 0,
                    closing_cents: 0,
                };
                CashFlowRepository::insert_tx(&mut *conn, &entry).await?;
                entry
            }
        };

        entry.cash_sales_cents = cash_sales_cents;
        entry.credit_sales_cents = credit_sales_cents;
        entry.receipts_cents = receipts_cents;
        entry.closing_cents = entry.opening_cents + receipts_cents;

        CashFlowRepository::set_amounts_tx(
            &mut *conn,
            &entry.id,
            entry.cash_sales_cents,
            entry.credit_sales_cents,
            entry.receipts_cents,
            entry.closing_cents,
        )
        .await?;

        Ok(entry)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::sale::SaleRepository;
    use crate::testutil::fixture;
    use caixa_core::{Payment, PaymentMethod, PaymentMode, Sale, SaleStatus};
    use chrono::Utc;

    #[tokio::test]
    async fn test_recompute_is_idempotent() {
        let f = fixture().await;
        let today = Utc::now().date_naive();

        f.db.checkout()
            .finalize_sale(&f.draft(PaymentMode::Cash, 2))
            .await
            .unwrap();

        let first = f
            .db
            .reconciler()
            .recompute(today, Some(&f.register_id))
            .await
            .unwrap();
        let second = f
            .db
            .reconciler()
            .recompute(today, Some(&f.register_id))
            .await
            .unwrap();

        assert_eq!(first.id, second.id);
        assert_eq!(second.cash_sales_cents, 2_000);
        assert_eq!(second.receipts_cents, 2_000);
        assert_eq!(second.closing_cents, 2_000);
    }

    #[tokio::test]
    async fn test_recompute_preserves_opening_balance() {
        let f = fixture().await;
        let today = Utc::now().date_naive();

        f.db.cash_flow()
            .set_opening_balance(today, Some(&f.register_id), 5_000)
            .await
            .unwrap();

        f.db.checkout()
            .finalize_sale(&f.draft(PaymentMode::Cash, 3))
            .await
            .unwrap();

        let entry = f
            .db
            .cash_flow()
            .get(today, Some(&f.register_id))
            .await
            .unwrap()
            .unwrap();

        assert_eq!(entry.opening_cents, 5_000);
        assert_eq!(entry.receipts_cents, 3_000);
        assert_eq!(entry.closing_cents, 8_000);
    }

    #[tokio::test]
    async fn test_recompute_on_empty_day_yields_zeros() {
        let f = fixture().await;
        let day = chrono::NaiveDate::from_ymd_opt(2020, 1, 1).unwrap();

        let entry = f
            .db
            .reconciler()
            .recompute(day, Some(&f.register_id))
            .await
            .unwrap();

        assert_eq!(entry.cash_sales_cents, 0);
        assert_eq!(entry.credit_sales_cents, 0);
        assert_eq!(entry.receipts_cents, 0);
        assert_eq!(entry.closing_cents, 0);
    }

    #[tokio::test]
    async fn test_recompute_all_covers_registers_and_global() {
        let f = fixture().await;
        let today = Utc::now().date_naive();

        f.db.checkout()
            .finalize_sale(&f.draft(PaymentMode::Cash, 1))
            .await
            .unwrap();

        let entries = f.db.reconciler().recompute_all(today).await.unwrap();

        // One entry for the register, one all-registers entry
        assert_eq!(entries.len(), 2);

        let global = entries.iter().find(|e| e.register_id.is_none()).unwrap();
        assert_eq!(global.cash_sales_cents, 1_000);

        let scoped = entries.iter().find(|e| e.register_id.is_some()).unwrap();
        assert_eq!(scoped.cash_sales_cents, 1_000);
    }

    #[tokio::test]
    async fn test_recompute_all_includes_deactivated_registers() {
        let f = fixture().await;
        let today = Utc::now().date_naive();

        f.db.checkout()
            .finalize_sale(&f.draft(PaymentMode::Cash, 1))
            .await
            .unwrap();

        // Retiring the till must not orphan its history
        f.db.registers().deactivate(&f.register_id).await.unwrap();

        let entries = f.db.reconciler().recompute_all(today).await.unwrap();

        assert_eq!(entries.len(), 2);
        let scoped = entries
            .iter()
            .find(|e| e.register_id.as_deref() == Some(f.register_id.as_str()))
            .unwrap();
        assert_eq!(scoped.cash_sales_cents, 1_000);
        assert_eq!(scoped.receipts_cents, 1_000);
    }

    #[tokio::test]
    async fn test_recompute_range_walks_each_day() {
        let f = fixture().await;
        let from = chrono::NaiveDate::from_ymd_opt(2020, 1, 1).unwrap();
        let to = chrono::NaiveDate::from_ymd_opt(2020, 1, 3).unwrap();

        let entries = f
            .db
            .reconciler()
            .recompute_range(from, to, Some(&f.register_id))
            .await
            .unwrap();

        assert_eq!(entries.len(), 3);
        assert_eq!(entries[0].entry_date, from);
        assert_eq!(entries[2].entry_date, to);
    }

    #[tokio::test]
    async fn test_range_matches_single_day_recompute() {
        let f = fixture().await;
        let today = Utc::now().date_naive();

        f.db.checkout()
            .finalize_sale(&f.draft(PaymentMode::Cash, 2))
            .await
            .unwrap();

        let single = f
            .db
            .reconciler()
            .recompute(today, Some(&f.register_id))
            .await
            .unwrap();
        let ranged = f
            .db
            .reconciler()
            .recompute_range(today, today, Some(&f.register_id))
            .await
            .unwrap();

        assert_eq!(ranged.len(), 1);
        assert_eq!(ranged[0].id, single.id);
        assert_eq!(ranged[0].cash_sales_cents, single.cash_sales_cents);
        assert_eq!(ranged[0].credit_sales_cents, single.credit_sales_cents);
        assert_eq!(ranged[0].receipts_cents, single.receipts_cents);
        assert_eq!(ranged[0].closing_cents, single.closing_cents);
    }

    #[tokio::test]
    async fn test_backdated_day_reconciles_from_rows() {
        let f = fixture().await;

        // A past trading day with no entry yet: one cash sale of
        // R$ 50,00 (carrying its own payment) and one open credit sale
        // of R$ 30,00.
        let day = NaiveDate::from_ymd_opt(2024, 1, 15).unwrap();
        let at = day.and_hms_opt(10, 0, 0).unwrap().and_utc();

        let mut tx = f.db.pool().begin().await.unwrap();

        let cash_sale = Sale {
            id: generate_id(),
            customer_id: f.customer_id.clone(),
            seller_id: f.seller_id.clone(),
            register_id: f.register_id.clone(),
            mode: PaymentMode::Cash,
            status: SaleStatus::Paid,
            total_cents: 5_000,
            paid_cents: 5_000,
            notes: None,
            created_at: at,
        };
        SaleRepository::insert_tx(&mut *tx, &cash_sale).await.unwrap();
        SaleRepository::insert_payment_tx(
            &mut *tx,
            &Payment {
                id: generate_id(),
                sale_id: cash_sale.id.clone(),
                amount_cents: 5_000,
                method: PaymentMethod::Cash,
                received_by: None,
                notes: None,
                created_at: at,
            },
        )
        .await
        .unwrap();

        let credit_sale = Sale {
            id: generate_id(),
            customer_id: f.customer_id.clone(),
            seller_id: f.seller_id.clone(),
            register_id: f.register_id.clone(),
            mode: PaymentMode::Credit,
            status: SaleStatus::Pending,
            total_cents: 3_000,
            paid_cents: 0,
            notes: None,
            created_at: at,
        };
        SaleRepository::insert_tx(&mut *tx, &credit_sale).await.unwrap();

        tx.commit().await.unwrap();

        let entry = f
            .db
            .reconciler()
            .recompute(day, Some(&f.register_id))
            .await
            .unwrap();

        assert_eq!(entry.cash_sales_cents, 5_000);
        assert_eq!(entry.credit_sales_cents, 3_000);
        assert_eq!(entry.receipts_cents, 5_000);
        assert_eq!(entry.opening_cents, 0);
        assert_eq!(entry.closing_cents, 5_000);
    }
}
