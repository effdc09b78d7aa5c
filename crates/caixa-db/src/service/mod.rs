//! # Service Module
//!
//! Transactional services orchestrating caixa-core's business rules
//! against the database.
//!
//! ## Why a Service Layer
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Repositories answer "store this row" and "fetch that row".            │
//! │  Services answer "finalize this sale":                                 │
//! │                                                                         │
//! │    BEGIN                                                                │
//! │      check stock          (conditional decrement)                       │
//! │      check credit limit   (caixa_core::ledger)                          │
//! │      insert sale + items                                                │
//! │      insert auto-payment  (cash sales)                                  │
//! │      bump customer ledger (credit sales)                                │
//! │      recompute cash flow                                                │
//! │    COMMIT ── all of it, or none of it                                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Available Services
//!
//! - [`checkout::CheckoutService`] - Sale finalization
//! - [`billing::BillingService`] - Payments against credit sales
//! - [`cashflow::CashFlowService`] - Daily reconciliation
//! - [`reports::ReportService`] - Read-only reporting projections

pub mod billing;
pub mod cashflow;
pub mod checkout;
pub mod reports;
