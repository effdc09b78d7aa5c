//! # caixa-db: Database Layer for Caixa POS
//!
//! This crate provides database access and transactional services for the
//! Caixa POS backend. It uses SQLite for local storage with sqlx for async
//! operations.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Caixa POS Data Flow                              │
//! │                                                                         │
//! │  Shell request handler (finalize sale, register payment, report)       │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                     caixa-db (THIS CRATE)                       │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌───────────────┐    ┌──────────────┐  │   │
//! │  │   │   Services    │    │  Repositories │    │  Migrations  │  │   │
//! │  │   │ checkout      │    │ customer      │    │  (embedded)  │  │   │
//! │  │   │ billing       │───►│ product       │    │              │  │   │
//! │  │   │ cashflow      │    │ sale          │    │ 001_init.sql │  │   │
//! │  │   │ reports       │    │ cash_flow ... │    │ ...          │  │   │
//! │  │   └───────┬───────┘    └───────┬───────┘    └──────────────┘  │   │
//! │  │           │ business rules     │ SQL                           │   │
//! │  │           ▼                    ▼                               │   │
//! │  │      caixa-core           SqlitePool                           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  SQLite Database (caixa.db)                                             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`pool`] - SQLite pool setup and the [`Database`] handle
//! - [`migrations`] - Schema migrations compiled into the binary
//! - [`error`] - [`DbError`] and the sqlx mapping
//! - [`repository`] - Per-entity CRUD (customer, product, sale, ...)
//! - [`service`] - Transactional orchestrations (checkout, billing, cashflow, reports)
//!
//! ## Usage
//!
//! ```rust,ignore
//! use caixa_db::{Database, DbConfig};
//!
//! let config = DbConfig::new("path/to/caixa.db");
//! let db = Database::new(config).await?;
//!
//! // Finalize a sale (stock, credit limit, cash flow in one transaction)
//! let receipt = db.checkout().finalize_sale(&draft).await?;
//!
//! // Read a daily report
//! let report = db.reports().daily_report(date, None).await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;
pub mod service;

#[cfg(test)]
pub(crate) mod testutil;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{DbError, DbResult};
pub use pool::{Database, DbConfig};

// Repository re-exports
pub use repository::cash_flow::CashFlowRepository;
pub use repository::customer::CustomerRepository;
pub use repository::expense::ExpenseRepository;
pub use repository::product::ProductRepository;
pub use repository::register::RegisterRepository;
pub use repository::sale::SaleRepository;
pub use repository::user::UserRepository;

// Service re-exports
pub use service::billing::BillingService;
pub use service::cashflow::CashFlowService;
pub use service::checkout::CheckoutService;
pub use service::reports::ReportService;
