//! # Checkout Service
//!
//! Finalizes sales: the single entry point that turns a draft into a
//! persisted sale.
//!
//! ## Finalization Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  finalize_sale(draft)                                                   │
//! │       │                                                                 │
//! │       ├── validate lines and ids                                        │
//! │       │                                                                 │
//! │       ▼  BEGIN TRANSACTION                                              │
//! │  load customer, resolve products, price the lines                      │
//! │       │                                                                 │
//! │       ├── credit sale? check limit, bump customer ledger                │
//! │       │                                                                 │
//! │  insert sale + items                                                   │
//! │       │                                                                 │
//! │  conditional stock decrement per line (stock >= qty)                   │
//! │       │    └── 0 rows affected → InsufficientStock, ROLLBACK           │
//! │       │                                                                 │
//! │       ├── cash sale? insert the automatic full payment                  │
//! │       │                                                                 │
//! │  recompute cash flow (register entry + all-registers entry)            │
//! │       │                                                                 │
//! │       ▼  COMMIT                                                         │
//! │  SaleReceipt { sale, items, cash_flow }                                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Stock is checked twice: once against the loaded product row (to fail
//! fast with the real available count), and again by the conditional
//! UPDATE that is the actual guarantee under concurrency.

use chrono::Utc;
use serde::Serialize;
use sqlx::SqlitePool;
use tracing::{info, warn};

use crate::error::{DbError, DbResult};
use crate::repository::customer::CustomerRepository;
use crate::repository::generate_id;
use crate::repository::product::ProductRepository;
use crate::repository::sale::SaleRepository;
use crate::service::cashflow::CashFlowService;
use caixa_core::{
    ledger, validation, CashFlowEntry, CoreError, Payment, PaymentMethod, PaymentMode, Sale,
    SaleDraft, SaleItem, SaleStatus,
};

/// The outcome of a finalized sale.
#[derive(Debug, Clone, Serialize)]
pub struct SaleReceipt {
    pub sale: Sale,
    pub items: Vec<SaleItem>,
    /// The register's cash-flow entry after reconciliation.
    pub cash_flow: CashFlowEntry,
}

/// Service finalizing sales.
#[derive(Debug, Clone)]
pub struct CheckoutService {
    pool: SqlitePool,
}

impl CheckoutService {
    /// Creates a new CheckoutService.
    pub fn new(pool: SqlitePool) -> Self {
        CheckoutService { pool }
    }

    /// Finalizes a sale draft atomically.
    ///
    /// ## Errors
    /// * `DbError::Core(CoreError::Validation)` - bad lines or ids
    /// * `DbError::NotFound` - customer, product, seller or register missing
    /// * `DbError::Core(CoreError::InsufficientStock)` - a line can't be filled
    /// * `DbError::Core(CoreError::CreditLimitExceeded)` - credit sale over limit
    pub async fn finalize_sale(&self, draft: &SaleDraft) -> DbResult<SaleReceipt> {
        validation::validate_id("customer_id", &draft.customer_id).map_err(CoreError::from)?;
        validation::validate_id("seller_id", &draft.seller_id).map_err(CoreError::from)?;
        validation::validate_id("register_id", &draft.register_id).map_err(CoreError::from)?;
        validation::validate_sale_lines(&draft.lines).map_err(CoreError::from)?;

        let now = Utc::now();
        let sale_id = generate_id();

        let mut tx = self.pool.begin().await?;

        let mut customer = CustomerRepository::get_by_id_tx(&mut *tx, &draft.customer_id)
            .await?
            .ok_or_else(|| DbError::not_found("Customer", &draft.customer_id))?;

        // Price the lines against current products; prices are frozen
        // into the items below.
        let mut items = Vec::with_capacity(draft.lines.len());
        let mut total_cents: i64 = 0;

        for line in &draft.lines {
            let product = ProductRepository::get_by_id_tx(&mut *tx, &line.product_id)
                .await?
                .ok_or_else(|| DbError::not_found("Product", &line.product_id))?;

            if !product.in_stock(line.quantity) {
                warn!(
                    product_id = %product.id,
                    requested = %line.quantity,
                    available = %product.stock,
                    "Sale rejected: insufficient stock"
                );
                return Err(CoreError::InsufficientStock {
                    product_id: product.id,
                    requested: line.quantity,
                    available: product.stock,
                }
                .into());
            }

            let subtotal_cents = product.price().multiply_quantity(line.quantity).cents();
            total_cents += subtotal_cents;

            items.push(SaleItem {
                id: generate_id(),
                sale_id: sale_id.clone(),
                product_id: product.id,
                quantity: line.quantity,
                unit_price_cents: product.price_cents,
                subtotal_cents,
                created_at: now,
            });
        }

        // Credit sales hit the ledger before anything is written, so a
        // rejected limit leaves no trace.
        if draft.mode == PaymentMode::Credit {
            ledger::extend_credit(&mut customer, total_cents)?;
            CustomerRepository::set_outstanding_tx(
                &mut *tx,
                &customer.id,
                customer.outstanding_cents,
            )
            .await?;
        }

        let (status, paid_cents) = match draft.mode {
            PaymentMode::Cash => (SaleStatus::Paid, total_cents),
            PaymentMode::Credit => (SaleStatus::Pending, 0),
        };

        let sale = Sale {
            id: sale_id.clone(),
            customer_id: draft.customer_id.clone(),
            seller_id: draft.seller_id.clone(),
            register_id: draft.register_id.clone(),
            mode: draft.mode,
            status,
            total_cents,
            paid_cents,
            notes: draft.notes.clone(),
            created_at: now,
        };

        SaleRepository::insert_tx(&mut *tx, &sale).await?;

        for item in &items {
            SaleRepository::insert_item_tx(&mut *tx, item).await?;

            // The conditional decrement is the real concurrency guard; a
            // miss here means stock moved since the read above.
            let taken =
                ProductRepository::take_stock_tx(&mut *tx, &item.product_id, item.quantity).await?;
            if !taken {
                let available = ProductRepository::get_by_id_tx(&mut *tx, &item.product_id)
                    .await?
                    .map(|p| p.stock)
                    .unwrap_or(0);
                return Err(CoreError::InsufficientStock {
                    product_id: item.product_id.clone(),
                    requested: item.quantity,
                    available,
                }
                .into());
            }
        }

        // A cash sale is settled on the spot, so it carries its payment
        // with it. Credit sales collect through the billing service.
        if draft.mode == PaymentMode::Cash {
            let payment = Payment {
                id: generate_id(),
                sale_id: sale_id.clone(),
                amount_cents: total_cents,
                method: PaymentMethod::Cash,
                received_by: Some(draft.seller_id.clone()),
                notes: None,
                created_at: now,
            };
            SaleRepository::insert_payment_tx(&mut *tx, &payment).await?;
        }

        let sale_date = sale.sale_date();
        let cash_flow =
            CashFlowService::recompute_on(&mut *tx, sale_date, Some(&draft.register_id)).await?;
        CashFlowService::recompute_on(&mut *tx, sale_date, None).await?;

        tx.commit().await?;

        info!(
            sale_id = %sale.id,
            mode = %sale.mode.as_str(),
            total_cents = %sale.total_cents,
            items = items.len(),
            "Sale finalized"
        );

        Ok(SaleReceipt {
            sale,
            items,
            cash_flow,
        })
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
