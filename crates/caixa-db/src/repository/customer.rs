//! # Customer Repository
//!
//! Database operations for customers and their credit balances.
//!
//! ## Credit Balance Ownership
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  outstanding_cents is only ever changed by the checkout and billing    │
//! │  services, inside their transactions, through the `_tx` methods here.  │
//! │  The plain `update` deliberately leaves the balance columns alone so   │
//! │  an edit form cannot corrupt the ledger.                               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use sqlx::{SqliteConnection, SqlitePool};
use tracing::debug;

use crate::error::{DbError, DbResult};
use caixa_core::validation::{validate_credit_limit_cents, validate_name};
use caixa_core::Customer;

const SELECT_COLUMNS: &str = "id, name, phone, email, payment_mode, \
     credit_limit_cents, outstanding_cents, notes, created_at";

/// Repository for customer database operations.
#[derive(Debug, Clone)]
pub struct CustomerRepository {
    pool: SqlitePool,
}

impl CustomerRepository {
    /// Creates a new CustomerRepository.
    pub fn new(pool: SqlitePool) -> Self {
        CustomerRepository { pool }
    }

    /// Inserts a new customer.
    pub async fn insert(&self, customer: &Customer) -> DbResult<()> {
        debug!(name = %customer.name, "Inserting customer");

        validate_name("name", &customer.name)?;
        validate_credit_limit_cents(customer.credit_limit_cents)?;

        sqlx::query(
            r#"
            INSERT INTO customers (
                id, name, phone, email, payment_mode,
                credit_limit_cents, outstanding_cents, notes, created_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&customer.id)
        .bind(&customer.name)
        .bind(&customer.phone)
        .bind(&customer.email)
        .bind(customer.payment_mode)
        .bind(customer.credit_limit_cents)
        .bind(customer.outstanding_cents)
        .bind(&customer.notes)
        .bind(customer.created_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Gets a customer by ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Customer>> {
        let customer = sqlx::query_as::<_, Customer>(&format!(
            "SELECT {SELECT_COLUMNS} FROM customers WHERE id = ?"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(customer)
    }

    /// Transaction-scoped fetch, used by the services.
    pub async fn get_by_id_tx(
        conn: &mut SqliteConnection,
        id: &str,
    ) -> DbResult<Option<Customer>> {
        let customer = sqlx::query_as::<_, Customer>(&format!(
            "SELECT {SELECT_COLUMNS} FROM customers WHERE id = ?"
        ))
        .bind(id)
        .fetch_optional(conn)
        .await?;

        Ok(customer)
    }

    /// Lists all customers ordered by name.
    pub async fn list(&self) -> DbResult<Vec<Customer>> {
        let customers = sqlx::query_as::<_, Customer>(&format!(
            "SELECT {SELECT_COLUMNS} FROM customers ORDER BY name"
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(customers)
    }

    /// Lists customers with a positive outstanding balance, largest first.
    pub async fn debtors(&self) -> DbResult<Vec<Customer>> {
        let customers = sqlx::query_as::<_, Customer>(&format!(
            "SELECT {SELECT_COLUMNS} FROM customers \
             WHERE outstanding_cents > 0 ORDER BY outstanding_cents DESC"
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(customers)
    }

    /// Updates a customer's editable fields.
    ///
    /// Does NOT touch `outstanding_cents`; the ledger belongs to the
    /// checkout and billing services.
    pub async fn update(&self, customer: &Customer) -> DbResult<()> {
        debug!(id = %customer.id, "Updating customer");

        validate_name("name", &customer.name)?;
        validate_credit_limit_cents(customer.credit_limit_cents)?;

        let result = sqlx::query(
            r#"
            UPDATE customers SET
                name = ?,
                phone = ?,
                email = ?,
                payment_mode = ?,
                credit_limit_cents = ?,
                notes = ?
            WHERE id = ?
            "#,
        )
        .bind(&customer.name)
        .bind(&customer.phone)
        .bind(&customer.email)
        .bind(customer.payment_mode)
        .bind(customer.credit_limit_cents)
        .bind(&customer.notes)
        .bind(&customer.id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Customer", &customer.id));
        }

        Ok(())
    }

    /// Transaction-scoped write of the outstanding balance.
    ///
    /// Callers compute the new balance through caixa-core's ledger rules
    /// and persist the result here, inside their own transaction.
    pub async fn set_outstanding_tx(
        conn: &mut SqliteConnection,
        id: &str,
        outstanding_cents: i64,
    ) -> DbResult<()> {
        let result = sqlx::query("UPDATE customers SET outstanding_cents = ? WHERE id = ?")
            .bind(outstanding_cents)
            .bind(id)
            .execute(conn)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Customer", id));
        }

        Ok(())
    }

    /// Deletes a customer.
    ///
    /// ## Returns
    /// * `Err(DbError::IntegrityConflict)` - customer still has sales
    pub async fn delete(&self, id: &str) -> DbResult<()> {
        debug!(id = %id, "Deleting customer");

        let sales: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM sales WHERE customer_id = ?")
            .bind(id)
            .fetch_one(&self.pool)
            .await?;

        if sales > 0 {
            return Err(DbError::still_referenced("Customer", id, "sales"));
        }

        let result = sqlx::query("DELETE FROM customers WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Customer", id));
        }

        Ok(())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::generate_id;
    use crate::testutil::fixture;
    use caixa_core::{CoreError, PaymentMode};
    use chrono::Utc;

    #[tokio::test]
    async fn test_insert_rejects_blank_name_and_negative_limit() {
        let f = fixture().await;

        let mut customer = Customer {
            id: generate_id(),
            name: "   ".to_string(),
            phone: None,
            email: None,
            payment_mode: PaymentMode::Cash,
            credit_limit_cents: 0,
            outstanding_cents: 0,
            notes: None,
            created_at: Utc::now(),
        };

        let err = f.db.customers().insert(&customer).await.unwrap_err();
        assert!(matches!(err, DbError::Core(CoreError::Validation(_))));

        customer.name = "João Pereira".to_string();
        customer.credit_limit_cents = -1;
        let err = f.db.customers().insert(&customer).await.unwrap_err();
        assert!(matches!(err, DbError::Core(CoreError::Validation(_))));

        // Nothing was persisted by the rejected attempts
        assert!(f.db.customers().get_by_id(&customer.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_update_leaves_outstanding_alone() {
        let f = fixture().await;

        f.db.checkout()
            .finalize_sale(&f.draft(PaymentMode::Credit, 2))
            .await
            .unwrap();

        let mut customer = f.db.customers().get_by_id(&f.customer_id).await.unwrap().unwrap();
        customer.name = "Maria de Souza".to_string();
        customer.outstanding_cents = 0; // an edit form must not reset the ledger
        f.db.customers().update(&customer).await.unwrap();

        let customer = f.db.customers().get_by_id(&f.customer_id).await.unwrap().unwrap();
        assert_eq!(customer.name, "Maria de Souza");
        assert_eq!(customer.outstanding_cents, 2_000);
    }

    #[tokio::test]
    async fn test_debtors_lists_largest_balance_first() {
        let f = fixture().await;

        f.db.checkout()
            .finalize_sale(&f.draft(PaymentMode::Credit, 2))
            .await
            .unwrap();

        let debtors = f.db.customers().debtors().await.unwrap();
        assert_eq!(debtors.len(), 1);
        assert_eq!(debtors[0].id, f.customer_id);
        assert_eq!(debtors[0].outstanding_cents, 2_000);
    }

    #[tokio::test]
    async fn test_delete_blocked_while_referenced_by_sales() {
        let f = fixture().await;

        f.db.checkout()
            .finalize_sale(&f.draft(PaymentMode::Cash, 1))
            .await
            .unwrap();

        let err = f.db.customers().delete(&f.customer_id).await.unwrap_err();
        assert!(matches!(err, DbError::IntegrityConflict { .. }));
    }
}
