//! # Credit Ledger
//!
//! Pure rules for the customer credit ledger.
//!
//! ## The Ledger Invariant
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  0 <= outstanding <= credit_limit, at all times                         │
//! │                                                                         │
//! │  Credit sale:      outstanding += sale total     (checked upfront)      │
//! │  Sale fully paid:  outstanding -= sale total     (clamped at zero)      │
//! │  Partial payment:  outstanding unchanged                                │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The services call these functions inside their database transactions;
//! the functions themselves only mutate the in-memory `Customer` and
//! decide pass/fail. Persistence is the caller's job.

use crate::error::{CoreError, CoreResult};
use crate::money::Money;
use crate::types::Customer;

// =============================================================================
// Credit Extension
// =============================================================================

/// How much credit the customer can still take on, in cents.
#[inline]
pub fn available_credit(customer: &Customer) -> i64 {
    customer.credit_limit_cents - customer.outstanding_cents
}

/// Extends the customer's credit by a sale total.
///
/// Fails with [`CoreError::CreditLimitExceeded`] if the new balance would
/// pass the limit; on success the customer's outstanding balance is bumped.
///
/// ## Example
/// ```rust
/// use caixa_core::ledger::extend_credit;
/// # use caixa_core::types::{Customer, PaymentMode};
/// # use chrono::Utc;
/// # let mut customer = Customer {
/// #     id: "c1".into(), name: "Maria".into(), phone: None, email: None,
/// #     payment_mode: PaymentMode::Credit, credit_limit_cents: 10000,
/// #     outstanding_cents: 0, notes: None, created_at: Utc::now(),
/// # };
/// extend_credit(&mut customer, 8000).unwrap();
/// assert_eq!(customer.outstanding_cents, 8000);
/// assert!(extend_credit(&mut customer, 3000).is_err()); // 8000 + 3000 > 10000
/// ```
pub fn extend_credit(customer: &mut Customer, amount_cents: i64) -> CoreResult<()> {
    if customer.outstanding_cents + amount_cents > customer.credit_limit_cents {
        return Err(CoreError::CreditLimitExceeded {
            customer_id: customer.id.clone(),
            attempted_cents: amount_cents,
            outstanding_cents: customer.outstanding_cents,
            limit_cents: customer.credit_limit_cents,
        });
    }

    customer.outstanding_cents += amount_cents;
    Ok(())
}

// =============================================================================
// Credit Settlement
// =============================================================================

/// Settles part of the customer's outstanding balance.
///
/// Called once per sale, with the full sale total, when the sale becomes
/// fully paid. Clamps at zero: a balance adjusted by hand between the
/// sale and its final payment must not drive the ledger negative.
pub fn settle_credit(customer: &mut Customer, amount_cents: i64) {
    customer.outstanding_cents = Money::from_cents(customer.outstanding_cents)
        .saturating_sub_at_zero(Money::from_cents(amount_cents))
        .cents();
}

// =============================================================================
// Unit Tests
// =============================================================================
