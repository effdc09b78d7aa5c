//! # Repositories
//!
//! One repository per entity; each owns the SQL that touches its tables
//! and nothing else. Cross-entity rules (stock on checkout, credit
//! limits, reconciliation) live in the service layer, which composes
//! repositories instead of writing its own queries where it can.
//!
//! ## Two Calling Conventions
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  repo.get_by_id(id)          borrows the pool, auto-commits             │
//! │  Repo::get_by_id_tx(conn, id) runs on the caller's connection, so a    │
//! │                               service can stack several repository      │
//! │                               calls into one transaction                │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! - [`user::UserRepository`] - Owner and register operators
//! - [`register::RegisterRepository`] - Physical tills
//! - [`customer::CustomerRepository`] - Customers and credit balances
//! - [`product::ProductRepository`] - Catalog and stock
//! - [`sale::SaleRepository`] - Sales, line items and payments
//! - [`expense::ExpenseRepository`] - Expense categories and expenses
//! - [`cash_flow::CashFlowRepository`] - Daily cash-flow entries

pub mod cash_flow;
pub mod customer;
pub mod expense;
pub mod product;
pub mod register;
pub mod sale;
pub mod user;

use uuid::Uuid;

/// Generates a new entity ID (UUID v4).
pub fn generate_id() -> String {
    Uuid::new_v4().to_string()
}
