//! # Input Validation
//!
//! Field-level checks the repositories and services run on every boundary
//! payload before touching the database. The shell may validate its forms too, but
//! nothing here trusts that it did; the schema's NOT NULL, UNIQUE and FK
//! constraints then sit behind these as the last line.
//!
//! Validators report through [`ValidationError`], which carries the
//! offending field and value so the caller can point at the exact input.

use crate::error::ValidationError;
use crate::types::SaleLine;
use crate::{MAX_LINE_QUANTITY, MAX_SALE_LINES};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// String Validators
// =============================================================================

/// Validates a person-facing name (customer, register, user).
///
/// ## Rules
/// - Must not be empty after trimming
/// - Must be at most 200 characters
pub fn validate_name(field: &'static str, name: &str) -> ValidationResult<()> {
    let name = name.trim();

    if name.is_empty() {
        return Err(ValidationError::Required { field });
    }

    if name.len() > 200 {
        return Err(ValidationError::TooLong { field, max: 200 });
    }

    Ok(())
}

/// Validates an expense-category name.
///
/// ## Rules
/// - Must not be empty
/// - Must be at most 100 characters (uniqueness is the database's job)
pub fn validate_category_name(name: &str) -> ValidationResult<()> {
    let name = name.trim();

    if name.is_empty() {
        return Err(ValidationError::Required { field: "name" });
    }

    if name.len() > 100 {
        return Err(ValidationError::TooLong {
            field: "name",
            max: 100,
        });
    }

    Ok(())
}

// =============================================================================
// Numeric Validators
// =============================================================================

/// Validates a line-item quantity.
///
/// ## Rules
/// - Must be positive (> 0)
/// - Must not exceed MAX_LINE_QUANTITY (999)
pub fn validate_quantity(qty: i64) -> ValidationResult<()> {
    if qty <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "quantity",
            value: qty,
        });
    }

    if qty > MAX_LINE_QUANTITY {
        return Err(ValidationError::OutOfRange {
            field: "quantity",
            min: 1,
            max: MAX_LINE_QUANTITY,
            value: qty,
        });
    }

    Ok(())
}

/// Validates a price in cents.
///
/// ## Rules
/// - Must be non-negative (>= 0)
/// - Zero is allowed (giveaways)
pub fn validate_price_cents(cents: i64) -> ValidationResult<()> {
    if cents < 0 {
        return Err(ValidationError::OutOfRange {
            field: "price",
            min: 0,
            max: i64::MAX,
            value: cents,
        });
    }

    Ok(())
}

/// Validates a payment or expense amount in cents.
///
/// ## Rules
/// - Must be strictly positive; zero payments are meaningless
pub fn validate_amount_cents(field: &'static str, cents: i64) -> ValidationResult<()> {
    if cents <= 0 {
        return Err(ValidationError::MustBePositive {
            field,
            value: cents,
        });
    }

    Ok(())
}

/// Validates a credit limit in cents.
///
/// ## Rules
/// - Must be non-negative; zero means "no credit sales for this customer"
pub fn validate_credit_limit_cents(cents: i64) -> ValidationResult<()> {
    if cents < 0 {
        return Err(ValidationError::OutOfRange {
            field: "credit_limit",
            min: 0,
            max: i64::MAX,
            value: cents,
        });
    }

    Ok(())
}

// =============================================================================
// Collection Validators
// =============================================================================

/// Validates the line set of a sale draft.
///
/// ## Rules
/// - At least one line, at most MAX_SALE_LINES
/// - Every line's quantity passes [`validate_quantity`]
pub fn validate_sale_lines(lines: &[SaleLine]) -> ValidationResult<()> {
    if lines.is_empty() || lines.len() > MAX_SALE_LINES {
        return Err(ValidationError::BadLineCount {
            max: MAX_SALE_LINES,
            count: lines.len(),
        });
    }

    for line in lines {
        validate_quantity(line.quantity)?;
    }

    Ok(())
}

// =============================================================================
// UUID Validators
// =============================================================================

/// Validates a UUID string format.
///
/// ## Rules
/// - Must be a valid UUID: xxxxxxxx-xxxx-xxxx-xxxx-xxxxxxxxxxxx
pub fn validate_id(field: &'static str, id: &str) -> ValidationResult<()> {
    if id.trim().is_empty() {
        return Err(ValidationError::Required { field });
    }

    uuid::Uuid::parse_str(id).map_err(|_| ValidationError::InvalidId {
        field,
        value: id.to_string(),
    })?;

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_name() {
        assert!(validate_name("name", "Maria da Silva").is_ok());
        assert!(validate_name("name", "").is_err());
        assert!(validate_name("name", "   ").is_err());
        assert!(validate_name("name", &"A".repeat(300)).is_err());
    }

    #[test]
    fn test_validate_quantity() {
        assert!(validate_quantity(1).is_ok());
        assert!(validate_quantity(999).is_ok());

        assert!(validate_quantity(0).is_err());
        assert!(validate_quantity(-1).is_err());
        assert!(validate_quantity(1000).is_err());
    }

    #[test]
    fn test_validate_price_cents() {
        assert!(validate_price_cents(0).is_ok());
        assert!(validate_price_cents(1099).is_ok());
        assert!(validate_price_cents(-100).is_err());
    }

    #[test]
    fn test_validate_amount_cents() {
        assert!(validate_amount_cents("payment", 100).is_ok());
        assert!(validate_amount_cents("payment", 0).is_err());
        assert!(validate_amount_cents("payment", -50).is_err());
    }

    #[test]
    fn test_validate_sale_lines() {
        let line = |qty| SaleLine {
            product_id: "p1".to_string(),
            quantity: qty,
        };

        assert!(validate_sale_lines(&[line(2)]).is_ok());
        assert!(validate_sale_lines(&[]).is_err());
        assert!(validate_sale_lines(&[line(0)]).is_err());
        assert!(validate_sale_lines(&vec![line(1); 101]).is_err());
    }

    #[test]
    fn test_validate_id() {
        assert!(validate_id("customer_id", "550e8400-e29b-41d4-a716-446655440000").is_ok());
        assert!(validate_id("customer_id", "").is_err());
        assert!(validate_id("customer_id", "not-a-uuid").is_err());
    }
}
