//! # Reporting Service
//!
//! Read-only projections over sales, payments, expenses and cash-flow
//! entries.
//!
//! ## Two Kinds of Numbers
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  SALES numbers answer "how much did we sell" (by sale date).           │
//! │  RECEIPT numbers answer "how much money arrived" (by payment date).    │
//! │                                                                         │
//! │  A credit sale contributes to the first immediately and to the second  │
//! │  only as its payments come in, possibly days later. The daily report   │
//! │  shows both so the two never get conflated.                            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Reports never write; the live snapshot computes straight from the sale
//! and payment rows so it cannot be stale.

use chrono::{NaiveDate, Utc};
use serde::Serialize;
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::DbResult;
use crate::repository::register::RegisterRepository;
use caixa_core::CashFlowEntry;

// =============================================================================
// Report DTOs
// =============================================================================

/// One day's trading summary, optionally scoped to a register.
#[derive(Debug, Clone, Serialize)]
pub struct DailyReport {
    pub date: NaiveDate,
    pub register_id: Option<String>,
    /// Σ totals of cash-mode sales made on `date`.
    pub cash_sales_cents: i64,
    /// Σ totals of credit-mode sales made on `date`.
    pub credit_sales_cents: i64,
    /// Σ all payments received on `date`.
    pub receipts_cents: i64,
    /// Σ payments received on `date` against credit-mode sales.
    pub credit_receipts_cents: i64,
    /// Cash that actually arrived: cash sales + credit receipts.
    pub day_balance_cents: i64,
    /// Σ expenses dated `date`.
    pub expenses_cents: i64,
    pub sales_count: i64,
}

/// One register's performance over a period, derived from its cash-flow
/// entries: last closing minus first opening.
#[derive(Debug, Clone, Serialize)]
pub struct RegisterPeriodSummary {
    pub register_id: String,
    pub register_name: String,
    pub first_opening_cents: i64,
    pub last_closing_cents: i64,
    pub balance_cents: i64,
    pub sales_cents: i64,
}

/// Period report across all registers.
#[derive(Debug, Clone, Serialize)]
pub struct PeriodReport {
    pub from: NaiveDate,
    pub to: NaiveDate,
    pub registers: Vec<RegisterPeriodSummary>,
    pub total_sales_cents: i64,
    pub total_receipts_cents: i64,
}

/// A register's live position for today, computed from the raw rows.
#[derive(Debug, Clone, Serialize)]
pub struct RegisterSnapshot {
    pub register_id: String,
    pub register_name: String,
    pub cash_sales_cents: i64,
    pub credit_sales_cents: i64,
    pub receipts_cents: i64,
    pub opening_cents: i64,
    pub closing_cents: i64,
}

/// Net result for a period: sales minus expenses.
#[derive(Debug, Clone, Serialize)]
pub struct NetResult {
    pub from: NaiveDate,
    pub to: NaiveDate,
    pub sales_cents: i64,
    pub expenses_cents: i64,
    pub net_cents: i64,
}

// =============================================================================
// Service
// =============================================================================

/// Read-only reporting service.
#[derive(Debug, Clone)]
pub struct ReportService {
    pool: SqlitePool,
}

impl ReportService {
    /// Creates a new ReportService.
    pub fn new(pool: SqlitePool) -> Self {
        ReportService { pool }
    }

    /// Builds the daily report for a date, optionally scoped to a register.
    pub async fn daily_report(
        &self,
        date: NaiveDate,
        register_id: Option<&str>,
    ) -> DbResult<DailyReport> {
        debug!(date = %date, register_id = ?register_id, "Building daily report");

        let (cash_sales_cents, credit_sales_cents, sales_count) = self
            .sales_summary_for_date(date, register_id)
            .await?;

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
        .fetch_one(&self.pool)
        .await?;

        let credit_receipts_cents: i64 = sqlx::query_scalar(
            r#"
            SELECT COALESCE(SUM(p.amount_cents), 0)
            FROM payments p
            INNER JOIN sales s ON s.id = p.sale_id
            WHERE date(p.created_at) = ? AND s.mode = 'credit'
              AND (? IS NULL OR s.register_id = ?)
            "#,
        )
        .bind(date)
        .bind(register_id)
        .bind(register_id)
        .fetch_one(&self.pool)
        .await?;

        let expenses_cents: i64 = sqlx::query_scalar(
            r#"
            SELECT COALESCE(SUM(amount_cents), 0)
            FROM expenses
            WHERE expense_date = ?
              AND (? IS NULL OR register_id = ?)
            "#,
        )
        .bind(date)
        .bind(register_id)
        .bind(register_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(DailyReport {
            date,
            register_id: register_id.map(str::to_string),
            cash_sales_cents,
            credit_sales_cents,
            receipts_cents,
            credit_receipts_cents,
            day_balance_cents: cash_sales_cents + credit_receipts_cents,
            expenses_cents,
            sales_count,
        })
    }

    /// Builds the period report: one summary per register, from the
    /// reconciled cash-flow entries.
    pub async fn period_report(&self, from: NaiveDate, to: NaiveDate) -> DbResult<PeriodReport> {
        debug!(from = %from, to = %to, "Building period report");

        let registers = RegisterRepository::new(self.pool.clone()).list().await?;

        let mut summaries = Vec::with_capacity(registers.len());

        for register in &registers {
            let entries = sqlx::query_as::<_, CashFlowEntry>(
                r#"
                SELECT id, entry_date, register_id, opening_cents,
                       cash_sales_cents, credit_sales_cents, receipts_cents, closing_cents
                FROM cash_flow_entries
                WHERE entry_date >= ? AND entry_date <= ? AND register_id = ?
                ORDER BY entry_date
                "#,
            )
            .bind(from)
            .bind(to)
            .bind(&register.id)
            .fetch_all(&self.pool)
            .await?;

            let (first_opening_cents, last_closing_cents) = match (entries.first(), entries.last())
            {
                (Some(first), Some(last)) => (first.opening_cents, last.closing_cents),
                _ => (0, 0),
            };

            let sales_cents = entries
                .iter()
                .map(|e| e.cash_sales_cents + e.credit_sales_cents)
                .sum();

            summaries.push(RegisterPeriodSummary {
                register_id: register.id.clone(),
                register_name: register.name.clone(),
                first_opening_cents,
                last_closing_cents,
                balance_cents: last_closing_cents - first_opening_cents,
                sales_cents,
            });
        }

        let total_sales_cents: i64 = sqlx::query_scalar(
            "SELECT COALESCE(SUM(total_cents), 0) FROM sales \
             WHERE date(created_at) >= ? AND date(created_at) <= ?",
        )
        .bind(from)
        .bind(to)
        .fetch_one(&self.pool)
        .await?;

        let total_receipts_cents: i64 = sqlx::query_scalar(
            "SELECT COALESCE(SUM(amount_cents), 0) FROM payments \
             WHERE date(created_at) >= ? AND date(created_at) <= ?",
        )
        .bind(from)
        .bind(to)
        .fetch_one(&self.pool)
        .await?;

        Ok(PeriodReport {
            from,
            to,
            registers: summaries,
            total_sales_cents,
            total_receipts_cents,
        })
    }

    /// Live snapshot of every active register for today.
    ///
    /// Computes straight from the sale and payment rows rather than the
    /// materialized entries, so it cannot show a stale figure.
    pub async fn today_snapshot(&self) -> DbResult<Vec<RegisterSnapshot>> {
        let today = Utc::now().date_naive();
        debug!(date = %today, "Building live snapshot");

        let registers = RegisterRepository::new(self.pool.clone()).list().await?;

        let mut snapshots = Vec::new();

        for register in registers.iter().filter(|r| r.is_active) {
            let (cash_sales_cents, credit_sales_cents, _) = self
                .sales_summary_for_date(today, Some(&register.id))
                .await?;

            let receipts_cents: i64 = sqlx::query_scalar(
                r#"
                SELECT COALESCE(SUM(p.amount_cents), 0)
                FROM payments p
                INNER JOIN sales s ON s.id = p.sale_id
                WHERE date(p.created_at) = ? AND s.register_id = ?
                "#,
            )
            .bind(today)
            .bind(&register.id)
            .fetch_one(&self.pool)
            .await?;

            // Opening balance is the one hand-entered figure; read it from
            // today's entry if one exists.
            let opening_cents: i64 = sqlx::query_scalar(
                "SELECT COALESCE(MAX(opening_cents), 0) FROM cash_flow_entries \
                 WHERE entry_date = ? AND register_id = ?",
            )
            .bind(today)
            .bind(&register.id)
            .fetch_one(&self.pool)
            .await?;

            snapshots.push(RegisterSnapshot {
                register_id: register.id.clone(),
                register_name: register.name.clone(),
                cash_sales_cents,
                credit_sales_cents,
                receipts_cents,
                opening_cents,
                closing_cents: opening_cents + receipts_cents,
            });
        }

        Ok(snapshots)
    }

    /// Net result for a period: all sales minus all expenses.
    pub async fn net_result(&self, from: NaiveDate, to: NaiveDate) -> DbResult<NetResult> {
        debug!(from = %from, to = %to, "Computing net result");

        let sales_cents: i64 = sqlx::query_scalar(
            "SELECT COALESCE(SUM(total_cents), 0) FROM sales \
             WHERE date(created_at) >= ? AND date(created_at) <= ?",
        )
        .bind(from)
        .bind(to)
        .fetch_one(&self.pool)
        .await?;

        let expenses_cents: i64 = sqlx::query_scalar(
            "SELECT COALESCE(SUM(amount_cents), 0) FROM expenses \
             WHERE expense_date >= ? AND expense_date <= ?",
        )
        .bind(from)
        .bind(to)
        .fetch_one(&self.pool)
        .await?;

        Ok(NetResult {
            from,
            to,
            sales_cents,
            expenses_cents,
            net_cents: sales_cents - expenses_cents,
        })
    }

    /// Sales sums for one date: (cash_cents, credit_cents, count).
    async fn sales_summary_for_date(
        &self,
        date: NaiveDate,
        register_id: Option<&str>,
    ) -> DbResult<(i64, i64, i64)> {
        let cash_cents: i64 = sqlx::query_scalar(
            "SELECT COALESCE(SUM(total_cents), 0) FROM sales \
             WHERE date(created_at) = ? AND mode = 'cash' \
               AND (? IS NULL OR register_id = ?)",
        )
        .bind(date)
        .bind(register_id)
        .bind(register_id)
        .fetch_one(&self.pool)
        .await?;

        let credit_cents: i64 = sqlx::query_scalar(
            "SELECT COALESCE(SUM(total_cents), 0) FROM sales \
             WHERE date(created_at) = ? AND mode = 'credit' \
               AND (? IS NULL OR register_id = ?)",
        )
        .bind(date)
        .bind(register_id)
        .bind(register_id)
        .fetch_one(&self.pool)
        .await?;

        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM sales \
             WHERE date(created_at) = ? AND (? IS NULL OR register_id = ?)",
        )
        .bind(date)
        .bind(register_id)
        .bind(register_id)
        .fetch_one(&self.pool)
        .await?;

        Ok((cash_cents, credit_cents, count))
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::fixture;
    use caixa_core::{Expense, PaymentMethod, PaymentMode};
    use chrono::Utc;
    use uuid::Uuid;

    #[tokio::test]
    async fn test_daily_report_splits_sales_and_receipts() {
        let f = fixture().await;
        let today = Utc::now().date_naive();

        // Cash sale R$ 30,00, credit sale R$ 20,00, then R$ 5,00 collected
        f.db.checkout()
            .finalize_sale(&f.draft(PaymentMode::Cash, 3))
            .await
            .unwrap();
        let credit = f
            .db
            .checkout()
            .finalize_sale(&f.draft(PaymentMode::Credit, 2))
            .await
            .unwrap();
        f.db.billing()
            .register_payment(&credit.sale.id, 500, PaymentMethod::Pix, None, None)
            .await
            .unwrap();

        let report = f.db.reports().daily_report(today, None).await.unwrap();

        assert_eq!(report.cash_sales_cents, 3_000);
        assert_eq!(report.credit_sales_cents, 2_000);
        assert_eq!(report.sales_count, 2);
        // Receipts: the automatic cash payment plus the collected R$ 5,00
        assert_eq!(report.receipts_cents, 3_500);
        assert_eq!(report.credit_receipts_cents, 500);
        // Money that actually arrived in hand
        assert_eq!(report.day_balance_cents, 3_500);
    }

    #[tokio::test]
    async fn test_net_result_subtracts_expenses() {
        let f = fixture().await;
        let today = Utc::now().date_naive();

        f.db.checkout()
            .finalize_sale(&f.draft(PaymentMode::Cash, 4))
            .await
            .unwrap();

        let category = caixa_core::ExpenseCategory {
            id: Uuid::new_v4().to_string(),
            name: "Fornecedores".to_string(),
            description: None,
            created_at: Utc::now(),
        };
        f.db.expenses().insert_category(&category).await.unwrap();

        let expense = Expense {
            id: Uuid::new_v4().to_string(),
            description: "Compra de mercadoria".to_string(),
            amount_cents: 1_500,
            expense_date: today,
            category_id: category.id,
            method: PaymentMethod::Cash,
            user_id: None,
            register_id: None,
            notes: None,
            created_at: Utc::now(),
        };
        f.db.expenses().insert(&expense).await.unwrap();

        let result = f.db.reports().net_result(today, today).await.unwrap();

        assert_eq!(result.sales_cents, 4_000);
        assert_eq!(result.expenses_cents, 1_500);
        assert_eq!(result.net_cents, 2_500);
    }

    #[tokio::test]
    async fn test_period_report_uses_reconciled_entries() {
        let f = fixture().await;
        let today = Utc::now().date_naive();

        f.db.cash_flow()
            .set_opening_balance(today, Some(&f.register_id), 1_000)
            .await
            .unwrap();
        f.db.checkout()
            .finalize_sale(&f.draft(PaymentMode::Cash, 2))
            .await
            .unwrap();

        let report = f.db.reports().period_report(today, today).await.unwrap();

        assert_eq!(report.registers.len(), 1);
        let summary = &report.registers[0];
        assert_eq!(summary.first_opening_cents, 1_000);
        // closing = opening + receipts (the cash sale pays itself)
        assert_eq!(summary.last_closing_cents, 3_000);
        assert_eq!(summary.balance_cents, 2_000);
        assert_eq!(summary.sales_cents, 2_000);

        assert_eq!(report.total_sales_cents, 2_000);
        assert_eq!(report.total_receipts_cents, 2_000);
    }

    #[test]
    fn test_daily_report_json_shape() {
        let report = DailyReport {
            date: NaiveDate::from_ymd_opt(2024, 1, 15).unwrap(),
            register_id: None,
            cash_sales_cents: 3_000,
            credit_sales_cents: 2_000,
            receipts_cents: 3_500,
            credit_receipts_cents: 500,
            day_balance_cents: 3_500,
            expenses_cents: 0,
            sales_count: 2,
        };

        let json = serde_json::to_value(&report).unwrap();

        // The shell consumes these fields by name
        assert_eq!(json["date"], "2024-01-15");
        assert_eq!(json["register_id"], serde_json::Value::Null);
        assert_eq!(json["cash_sales_cents"], 3_000);
        assert_eq!(json["day_balance_cents"], 3_500);
    }

    #[tokio::test]
    async fn test_today_snapshot_reads_live_rows() {
        let f = fixture().await;

        f.db.checkout()
            .finalize_sale(&f.draft(PaymentMode::Credit, 3))
            .await
            .unwrap();

        let snapshots = f.db.reports().today_snapshot().await.unwrap();

        assert_eq!(snapshots.len(), 1);
        let snap = &snapshots[0];
        assert_eq!(snap.register_id, f.register_id);
        assert_eq!(snap.credit_sales_cents, 3_000);
        assert_eq!(snap.cash_sales_cents, 0);
        assert_eq!(snap.receipts_cents, 0);
        assert_eq!(snap.closing_cents, 0);
    }
}
