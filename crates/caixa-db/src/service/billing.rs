//! # Billing Service
//!
//! Registers payments against credit sales.
//!
//! ## Payment Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  register_payment(sale_id, amount)                                      │
//! │       │                                                                 │
//! │       ▼  BEGIN TRANSACTION                                              │
//! │  load sale                                                              │
//! │       │                                                                 │
//! │       ├── amount > remaining? → Overpayment, ROLLBACK                   │
//! │       │                                                                 │
//! │  insert payment row                                                    │
//! │  paid += amount                                                        │
//! │       │                                                                 │
//! │       ├── paid == total  → status: paid                                 │
//! │       │     └── credit sale: settle the customer ledger by the         │
//! │       │         FULL sale total (partial payments never touched it)    │
//! │       │                                                                 │
//! │       └── paid <  total  → status: partial                              │
//! │       │                                                                 │
//! │  recompute cash flow for the payment date                              │
//! │       ▼  COMMIT                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::Utc;
use serde::Serialize;
use sqlx::SqlitePool;
use tracing::{info, warn};

use crate::error::{DbError, DbResult};
use crate::repository::customer::CustomerRepository;
use crate::repository::generate_id;
use crate::repository::sale::SaleRepository;
use crate::service::cashflow::CashFlowService;
use caixa_core::{
    ledger, validation, CashFlowEntry, CoreError, Payment, PaymentMethod, Sale, SaleStatus,
};

/// The outcome of a registered payment.
#[derive(Debug, Clone, Serialize)]
pub struct PaymentOutcome {
    pub payment: Payment,
    /// The sale after this payment was applied.
    pub sale: Sale,
    /// True when this payment settled the sale in full.
    pub settled: bool,
    /// The sale register's cash-flow entry after reconciliation.
    pub cash_flow: CashFlowEntry,
}

/// Service registering payments against sales.
#[derive(Debug, Clone)]
pub struct BillingService {
    pool: SqlitePool,
}

impl BillingService {
    /// Creates a new BillingService.
    pub fn new(pool: SqlitePool) -> Self {
        BillingService { pool }
    }

    /// Registers a payment against a sale.
    ///
    /// ## Errors
    /// * `DbError::NotFound` - sale doesn't exist
    /// * `DbError::Core(CoreError::Overpayment)` - amount exceeds the remainder
    /// * `DbError::Core(CoreError::Validation)` - non-positive amount
    pub async fn register_payment(
        &self,
        sale_id: &str,
        amount_cents: i64,
        method: PaymentMethod,
        received_by: Option<&str>,
        notes: Option<String>,
    ) -> DbResult<PaymentOutcome> {
        validation::validate_amount_cents("payment", amount_cents).map_err(CoreError::from)?;

        let now = Utc::now();

        let mut tx = self.pool.begin().await?;

        let mut sale = SaleRepository::get_by_id_tx(&mut *tx, sale_id)
            .await?
            .ok_or_else(|| DbError::not_found("Sale", sale_id))?;

        let remaining_cents = sale.remaining_cents();
        if amount_cents > remaining_cents {
            warn!(
                sale_id = %sale.id,
                attempted_cents = %amount_cents,
                remaining_cents = %remaining_cents,
                "Payment rejected: overpayment"
            );
            return Err(CoreError::Overpayment {
                sale_id: sale.id,
                attempted_cents: amount_cents,
                remaining_cents,
            }
            .into());
        }

        let payment = Payment {
            id: generate_id(),
            sale_id: sale.id.clone(),
            amount_cents,
            method,
            received_by: received_by.map(str::to_string),
            notes,
            created_at: now,
        };
        SaleRepository::insert_payment_tx(&mut *tx, &payment).await?;

        sale.paid_cents += amount_cents;
        let settled = sale.paid_cents >= sale.total_cents;
        sale.status = if settled {
            SaleStatus::Paid
        } else {
            SaleStatus::Partial
        };

        SaleRepository::set_payment_state_tx(&mut *tx, &sale.id, sale.paid_cents, sale.status)
            .await?;

        // The ledger is settled once, by the full sale total, when the
        // sale flips to paid. Partial payments leave the outstanding
        // balance alone until then.
        if settled && sale.mode == caixa_core::PaymentMode::Credit {
            let mut customer = CustomerRepository::get_by_id_tx(&mut *tx, &sale.customer_id)
                .await?
                .ok_or_else(|| DbError::not_found("Customer", &sale.customer_id))?;

            ledger::settle_credit(&mut customer, sale.total_cents);
            CustomerRepository::set_outstanding_tx(
                &mut *tx,
                &customer.id,
                customer.outstanding_cents,
            )
            .await?;
        }

        // Receipts count on the date the money arrived, not the sale date.
        let payment_date = payment.payment_date();
        let cash_flow =
            CashFlowService::recompute_on(&mut *tx, payment_date, Some(&sale.register_id)).await?;
        CashFlowService::recompute_on(&mut *tx, payment_date, None).await?;

        tx.commit().await?;

        info!(
            sale_id = %sale.id,
            amount_cents = %amount_cents,
            settled = settled,
            "Payment registered"
        );

        Ok(PaymentOutcome {
            payment,
            sale,
            settled,
            cash_flow,
        })
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::fixture;
    use caixa_core::PaymentMode;

    #[tokio::test]
    async fn test_partial_payment_leaves_ledger_alone() {
        let f = fixture().await;

        // Credit sale of R$ 50,00
        let receipt = f
            .db
            .checkout()
            .finalize_sale(&f.draft(PaymentMode::Credit, 5))
            .await
            .unwrap();

        let outcome = f
            .db
            .billing()
            .register_payment(&receipt.sale.id, 2_000, PaymentMethod::Pix, None, None)
            .await
            .unwrap();

        assert!(!outcome.settled);
        assert_eq!(outcome.sale.status, SaleStatus::Partial);
        assert_eq!(outcome.sale.paid_cents, 2_000);

        // Outstanding balance stays at the full sale total until settled
        let customer = f.db.customers().get_by_id(&f.customer_id).await.unwrap().unwrap();
        assert_eq!(customer.outstanding_cents, 5_000);

        // The payment counts as a receipt on the day it arrived
        assert_eq!(outcome.cash_flow.receipts_cents, 2_000);
    }

    #[tokio::test]
    async fn test_final_payment_settles_sale_and_ledger() {
        let f = fixture().await;

        let receipt = f
            .db
            .checkout()
            .finalize_sale(&f.draft(PaymentMode::Credit, 5))
            .await
            .unwrap();

        f.db.billing()
            .register_payment(&receipt.sale.id, 2_000, PaymentMethod::Pix, None, None)
            .await
            .unwrap();

        let outcome = f
            .db
            .billing()
            .register_payment(&receipt.sale.id, 3_000, PaymentMethod::Cash, None, None)
            .await
            .unwrap();

        assert!(outcome.settled);
        assert_eq!(outcome.sale.status, SaleStatus::Paid);
        assert_eq!(outcome.sale.paid_cents, 5_000);

        let customer = f.db.customers().get_by_id(&f.customer_id).await.unwrap().unwrap();
        assert_eq!(customer.outstanding_cents, 0);

        // Both payments land in the day's receipts
        assert_eq!(outcome.cash_flow.receipts_cents, 5_000);
    }

    #[tokio::test]
    async fn test_overpayment_is_rejected() {
        let f = fixture().await;

        let receipt = f
            .db
            .checkout()
            .finalize_sale(&f.draft(PaymentMode::Credit, 5))
            .await
            .unwrap();

        let err = f
            .db
            .billing()
            .register_payment(&receipt.sale.id, 6_000, PaymentMethod::Cash, None, None)
            .await
            .unwrap_err();

        match err {
            DbError::Core(CoreError::Overpayment {
                attempted_cents,
                remaining_cents,
                ..
            }) => {
                assert_eq!(attempted_cents, 6_000);
                assert_eq!(remaining_cents, 5_000);
            }
            other => panic!("unexpected error: {other:?}"),
        }

        // Nothing changed
        let sale = f.db.sales().get_by_id(&receipt.sale.id).await.unwrap().unwrap();
        assert_eq!(sale.paid_cents, 0);
        assert_eq!(sale.status, SaleStatus::Pending);
        assert!(f.db.sales().get_payments(&sale.id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_payment_on_settled_sale_is_rejected() {
        let f = fixture().await;

        // Cash sales are born settled; any further payment overpays
        let receipt = f
            .db
            .checkout()
            .finalize_sale(&f.draft(PaymentMode::Cash, 1))
            .await
            .unwrap();

        let err = f
            .db
            .billing()
            .register_payment(&receipt.sale.id, 100, PaymentMethod::Cash, None, None)
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            DbError::Core(CoreError::Overpayment { .. })
        ));
    }

    #[tokio::test]
    async fn test_non_positive_amount_is_rejected() {
        let f = fixture().await;

        let receipt = f
            .db
            .checkout()
            .finalize_sale(&f.draft(PaymentMode::Credit, 1))
            .await
            .unwrap();

        let err = f
            .db
            .billing()
            .register_payment(&receipt.sale.id, 0, PaymentMethod::Cash, None, None)
            .await
            .unwrap_err();

        assert!(matches!(err, DbError::Core(CoreError::Validation(_))));
    }
}
