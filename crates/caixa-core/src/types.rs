//! # Domain Types
//!
//! Core domain types used throughout Caixa POS.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │    Customer     │   │      Sale       │   │    Payment      │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  id (UUID)      │   │  id (UUID)      │   │  id (UUID)      │       │
//! │  │  credit_limit   │   │  mode, status   │   │  sale_id (FK)   │       │
//! │  │  outstanding    │   │  total, paid    │   │  method         │       │
//! │  └─────────────────┘   └─────────────────┘   │  amount_cents   │       │
//! │                                              └─────────────────┘       │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │  CashFlowEntry  │   │   SaleStatus    │   │  PaymentMode    │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  (date,register)│   │  Pending        │   │  Cash (vista)   │       │
//! │  │  opening        │   │  Partial        │   │  Credit (prazo) │       │
//! │  │  closing        │   │  Paid           │   └─────────────────┘       │
//! │  └─────────────────┘   └─────────────────┘                              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Identity
//! Every entity has a UUID v4 `id` string - immutable, used for database
//! relations. Human-facing identifiers (customer name, register name) are
//! plain mutable fields.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::money::Money;

// =============================================================================
// Payment Mode
// =============================================================================

/// How a sale is paid: immediately in full, or against the customer's credit.
///
/// The source system calls these "vista" (cash) and "prazo" (credit).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[serde(rename_all = "lowercase")]
pub enum PaymentMode {
    /// Paid in full at sale time.
    Cash,
    /// Added to the customer's outstanding balance, settled later.
    Credit,
}

impl PaymentMode {
    /// Stable string form, matching the database representation.
    pub const fn as_str(&self) -> &'static str {
        match self {
            PaymentMode::Cash => "cash",
            PaymentMode::Credit => "credit",
        }
    }
}

// =============================================================================
// Sale Status
// =============================================================================

/// The settlement status of a sale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[serde(rename_all = "lowercase")]
pub enum SaleStatus {
    /// Credit sale with no payments yet.
    Pending,
    /// Some, but not all, of the total has been paid.
    Partial,
    /// Fully paid (cash sales start here).
    Paid,
}

impl Default for SaleStatus {
    fn default() -> Self {
        SaleStatus::Pending
    }
}

// =============================================================================
// Payment Method
// =============================================================================

/// The instrument used for a payment or expense.
///
/// Mirrors the source's forma_pagamento set: dinheiro, cartao, pix, boleto.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "snake_case"))]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    /// Physical cash.
    Cash,
    /// Card on an external terminal.
    Card,
    /// Pix instant transfer.
    Pix,
    /// Bank slip (boleto).
    BankSlip,
}

// =============================================================================
// User
// =============================================================================

/// A system user: either the owner or a register operator.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct User {
    /// Unique identifier (UUID v4).
    pub id: String,

    /// Display name.
    pub name: String,

    /// Login email, unique.
    pub email: String,

    /// Owners see every register; operators are scoped to one.
    pub is_owner: bool,

    /// The register an operator is assigned to. Owners have none.
    pub register_id: Option<String>,

    /// When the user was created.
    pub created_at: DateTime<Utc>,
}

// =============================================================================
// Register
// =============================================================================

/// A physical till/location ("caixa").
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Register {
    pub id: String,
    pub name: String,
    /// Where the till physically sits (store, stall, ...).
    pub location: String,
    /// Inactive registers take no new sales but keep their history.
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

// =============================================================================
// Customer
// =============================================================================

/// A customer, with a credit limit and running outstanding balance.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Customer {
    pub id: String,
    pub name: String,
    pub phone: Option<String>,
    pub email: Option<String>,

    /// Preferred payment mode, used by the shell to pre-fill forms.
    pub payment_mode: PaymentMode,

    /// Maximum credit this customer may carry, in cents.
    pub credit_limit_cents: i64,

    /// Current unpaid credit, in cents. Never negative.
    pub outstanding_cents: i64,

    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Customer {
    /// Returns the credit limit as Money.
    #[inline]
    pub fn credit_limit(&self) -> Money {
        Money::from_cents(self.credit_limit_cents)
    }

    /// Returns the outstanding balance as Money.
    #[inline]
    pub fn outstanding(&self) -> Money {
        Money::from_cents(self.outstanding_cents)
    }
}

// =============================================================================
// Product
// =============================================================================

/// A product available for sale.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Product {
    pub id: String,

    /// Category/type of the product (free-form, e.g. "bebida").
    pub kind: String,

    /// Display description shown to the operator.
    pub description: String,

    /// Unit price in cents.
    pub price_cents: i64,

    /// Units currently in stock. Never negative.
    pub stock: i64,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Product {
    /// Returns the unit price as a Money type.
    #[inline]
    pub fn price(&self) -> Money {
        Money::from_cents(self.price_cents)
    }

    /// Checks whether the requested quantity is available.
    #[inline]
    pub fn in_stock(&self, quantity: i64) -> bool {
        self.stock >= quantity
    }
}

// =============================================================================
// Sale
// =============================================================================

/// A finalized sale.
///
/// `paid_cents` and `status` are the only fields that change after
/// creation; items are frozen with the sale.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Sale {
    pub id: String,
    pub customer_id: String,
    /// The user who rang the sale up.
    pub seller_id: String,
    /// The register the sale happened at - a first-class foreign key.
    pub register_id: String,
    pub mode: PaymentMode,
    pub status: SaleStatus,
    pub total_cents: i64,
    /// 0 <= paid_cents <= total_cents once finalized.
    pub paid_cents: i64,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Sale {
    /// Returns the total as Money.
    #[inline]
    pub fn total(&self) -> Money {
        Money::from_cents(self.total_cents)
    }

    /// Returns the amount paid so far as Money.
    #[inline]
    pub fn paid(&self) -> Money {
        Money::from_cents(self.paid_cents)
    }

    /// The unpaid remainder, in cents.
    #[inline]
    pub fn remaining_cents(&self) -> i64 {
        self.total_cents - self.paid_cents
    }

    /// The calendar date the sale happened on (UTC).
    #[inline]
    pub fn sale_date(&self) -> NaiveDate {
        self.created_at.date_naive()
    }
}

// =============================================================================
// Sale Item
// =============================================================================

/// A line item in a sale.
///
/// Uses the snapshot pattern: the unit price is frozen at sale time and
/// stays valid no matter how the product's price changes afterwards.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct SaleItem {
    pub id: String,
    pub sale_id: String,
    pub product_id: String,
    /// Quantity sold (>= 1).
    pub quantity: i64,
    /// Unit price in cents at time of sale (frozen).
    pub unit_price_cents: i64,
    /// quantity × unit price, in cents.
    pub subtotal_cents: i64,
    pub created_at: DateTime<Utc>,
}

impl SaleItem {
    /// Returns the unit price as Money.
    #[inline]
    pub fn unit_price(&self) -> Money {
        Money::from_cents(self.unit_price_cents)
    }

    /// Returns the line subtotal as Money.
    #[inline]
    pub fn subtotal(&self) -> Money {
        Money::from_cents(self.subtotal_cents)
    }
}

// =============================================================================
// Payment
// =============================================================================

/// A payment towards a sale.
///
/// A sale can accumulate multiple payments until it is fully paid.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Payment {
    pub id: String,
    pub sale_id: String,
    /// Amount paid in cents (> 0).
    pub amount_cents: i64,
    pub method: PaymentMethod,
    /// The user who received the money.
    pub received_by: Option<String>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Payment {
    /// Returns the payment amount as Money.
    #[inline]
    pub fn amount(&self) -> Money {
        Money::from_cents(self.amount_cents)
    }

    /// The calendar date the payment was received on (UTC).
    #[inline]
    pub fn payment_date(&self) -> NaiveDate {
        self.created_at.date_naive()
    }
}

// =============================================================================
// Cash Flow Entry
// =============================================================================

/// The per-day, per-register materialized cash-flow summary.
///
/// ## Not a Source of Truth
/// ```text
/// ┌─────────────────────────────────────────────────────────────────────────┐
/// │  Sales + Payments rows  ──replay──►  CashFlowEntry                      │
/// │                                                                         │
/// │  Every field except opening_cents is derivable from the sale and       │
/// │  payment rows for (entry_date, register_id). Staleness is fixed by     │
/// │  recomputing, never by incremental patching.                            │
/// └─────────────────────────────────────────────────────────────────────────┘
/// ```
///
/// `register_id` of `None` means the entry aggregates all registers.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct CashFlowEntry {
    pub id: String,
    pub entry_date: NaiveDate,
    pub register_id: Option<String>,
    /// Manually set or zero-defaulted; never auto-carried from the prior day.
    pub opening_cents: i64,
    /// Sum of cash-mode sale totals on entry_date.
    pub cash_sales_cents: i64,
    /// Sum of credit-mode sale totals on entry_date.
    pub credit_sales_cents: i64,
    /// Sum of payments received on entry_date (joined through the sale).
    pub receipts_cents: i64,
    /// opening + receipts.
    pub closing_cents: i64,
}

impl CashFlowEntry {
    /// Total sales of the day, both modes, as Money.
    #[inline]
    pub fn total_sales(&self) -> Money {
        Money::from_cents(self.cash_sales_cents + self.credit_sales_cents)
    }

    /// Returns the closing balance as Money.
    #[inline]
    pub fn closing(&self) -> Money {
        Money::from_cents(self.closing_cents)
    }
}

// =============================================================================
// Expenses
// =============================================================================

/// A category grouping expenses (unique name).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct ExpenseCategory {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// A recorded expense.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Expense {
    pub id: String,
    pub description: String,
    /// Amount spent, in cents (> 0).
    pub amount_cents: i64,
    /// The day the expense applies to (not when it was typed in).
    pub expense_date: NaiveDate,
    pub category_id: String,
    pub method: PaymentMethod,
    /// The user who recorded the expense.
    pub user_id: Option<String>,
    /// Optional register scope; owners record unscoped expenses.
    pub register_id: Option<String>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Expense {
    /// Returns the expense amount as Money.
    #[inline]
    pub fn amount(&self) -> Money {
        Money::from_cents(self.amount_cents)
    }
}

// =============================================================================
// Sale Draft (finalization input)
// =============================================================================

/// One requested line of a sale draft: which product, how many.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SaleLine {
    pub product_id: String,
    pub quantity: i64,
}

/// The typed input the shell hands to sale finalization.
///
/// All ids are already resolved/validated by the shell's form layer;
/// the services re-validate the business rules (stock, credit limit).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SaleDraft {
    pub customer_id: String,
    pub seller_id: String,
    pub register_id: String,
    pub mode: PaymentMode,
    pub lines: Vec<SaleLine>,
    pub notes: Option<String>,
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_sale_status_default() {
        assert_eq!(SaleStatus::default(), SaleStatus::Pending);
    }

    #[test]
    fn test_payment_mode_as_str() {
        assert_eq!(PaymentMode::Cash.as_str(), "cash");
        assert_eq!(PaymentMode::Credit.as_str(), "credit");
    }

    #[test]
    fn test_sale_remaining_and_date() {
        let sale = Sale {
            id: "s1".to_string(),
            customer_id: "c1".to_string(),
            seller_id: "u1".to_string(),
            register_id: "r1".to_string(),
            mode: PaymentMode::Credit,
            status: SaleStatus::Pending,
            total_cents: 20000,
            paid_cents: 15000,
            notes: None,
            created_at: Utc.with_ymd_and_hms(2024, 1, 15, 14, 30, 0).unwrap(),
        };

        assert_eq!(sale.remaining_cents(), 5000);
        assert_eq!(
            sale.sale_date(),
            NaiveDate::from_ymd_opt(2024, 1, 15).unwrap()
        );
    }

    #[test]
    fn test_cash_flow_entry_totals() {
        let entry = CashFlowEntry {
            id: "f1".to_string(),
            entry_date: NaiveDate::from_ymd_opt(2024, 1, 15).unwrap(),
            register_id: Some("r1".to_string()),
            opening_cents: 1000,
            cash_sales_cents: 5000,
            credit_sales_cents: 3000,
            receipts_cents: 5000,
            closing_cents: 6000,
        };

        assert_eq!(entry.total_sales().cents(), 8000);
        assert_eq!(entry.closing().cents(), 6000);
    }

    #[test]
    fn test_enum_serde_representation() {
        assert_eq!(
            serde_json::to_string(&PaymentMethod::BankSlip).unwrap(),
            "\"bank_slip\""
        );
        assert_eq!(
            serde_json::to_string(&SaleStatus::Partial).unwrap(),
            "\"partial\""
        );
    }
}
