//! # Domain Errors
//!
//! Typed errors for every business rule that can reject an operation.
//!
//! ## Error Philosophy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Every refusal carries the numbers that justify it.                     │
//! │                                                                         │
//! │  ❌ BAD:  "insufficient stock"                                          │
//! │  ✅ GOOD: InsufficientStock { product_id, requested: 5, available: 2 }  │
//! │                                                                         │
//! │  The shell can render a precise message; tests can assert on fields.   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use thiserror::Error;

// =============================================================================
// Core Error
// =============================================================================

/// Business-rule violations raised by the core and the services.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoreError {
    /// A sale line asked for more units than the product has.
    #[error("insufficient stock for product {product_id}: requested {requested}, available {available}")]
    InsufficientStock {
        product_id: String,
        requested: i64,
        available: i64,
    },

    /// A credit sale would push the customer past their limit.
    #[error(
        "credit limit exceeded for customer {customer_id}: \
         outstanding {outstanding_cents} + sale {attempted_cents} > limit {limit_cents}"
    )]
    CreditLimitExceeded {
        customer_id: String,
        attempted_cents: i64,
        outstanding_cents: i64,
        limit_cents: i64,
    },

    /// A payment larger than the sale's unpaid remainder.
    #[error("overpayment on sale {sale_id}: attempted {attempted_cents}, remaining {remaining_cents}")]
    Overpayment {
        sale_id: String,
        attempted_cents: i64,
        remaining_cents: i64,
    },

    /// Input failed validation before any rule ran.
    #[error("validation error: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// A required field was empty or missing.
    #[error("{field} is required")]
    Required { field: &'static str },

    /// A text field exceeded its maximum length.
    #[error("{field} exceeds maximum length of {max} characters")]
    TooLong { field: &'static str, max: usize },

    /// A numeric field that must be strictly positive was not.
    #[error("{field} must be positive, got {value}")]
    MustBePositive { field: &'static str, value: i64 },

    /// A numeric field fell outside its allowed range.
    #[error("{field} must be between {min} and {max}, got {value}")]
    OutOfRange {
        field: &'static str,
        min: i64,
        max: i64,
        value: i64,
    },

    /// A field that must be a UUID was not one.
    #[error("{field} is not a valid UUID: {value}")]
    InvalidId { field: &'static str, value: String },

    /// A sale draft with no lines, or too many.
    #[error("sale must have between 1 and {max} lines, got {count}")]
    BadLineCount { max: usize, count: usize },
}

/// Convenience result alias for core operations.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = CoreError::InsufficientStock {
            product_id: "p1".to_string(),
            requested: 5,
            available: 2,
        };
        assert_eq!(
            err.to_string(),
            "insufficient stock for product p1: requested 5, available 2"
        );

        let err = CoreError::Overpayment {
            sale_id: "s1".to_string(),
            attempted_cents: 6000,
            remaining_cents: 5000,
        };
        assert!(err.to_string().contains("attempted 6000"));
    }

    #[test]
    fn test_validation_error_converts() {
        let err: CoreError = ValidationError::Required { field: "name" }.into();
        assert!(matches!(err, CoreError::Validation(_)));
        assert_eq!(err.to_string(), "validation error: name is required");
    }
}
