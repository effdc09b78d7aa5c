//! # Expense Repository
//!
//! Database operations for expense categories and expenses.
//!
//! Expenses are plain records: they affect the net-result report but never
//! the per-register cash-flow reconciliation, which only tracks money moving
//! through the tills.

use chrono::NaiveDate;
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::{DbError, DbResult};
use caixa_core::validation::{validate_amount_cents, validate_category_name, validate_name};
use caixa_core::{Expense, ExpenseCategory};

const EXPENSE_COLUMNS: &str = "id, description, amount_cents, expense_date, category_id, \
     method, user_id, register_id, notes, created_at";

/// Filters for listing expenses. All fields optional; `None` matches all.
#[derive(Debug, Clone, Default)]
pub struct ExpenseFilter {
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
    pub category_id: Option<String>,
    pub register_id: Option<String>,
}

/// Repository for expense database operations.
#[derive(Debug, Clone)]
pub struct ExpenseRepository {
    pool: SqlitePool,
}

impl ExpenseRepository {
    /// Creates a new ExpenseRepository.
    pub fn new(pool: SqlitePool) -> Self {
        ExpenseRepository { pool }
    }

    // -------------------------------------------------------------------------
    // Categories
    // -------------------------------------------------------------------------

    /// Inserts a new expense category.
    ///
    /// ## Returns
    /// * `Err(DbError::UniqueViolation)` - category name already exists
    pub async fn insert_category(&self, category: &ExpenseCategory) -> DbResult<()> {
        debug!(name = %category.name, "Inserting expense category");

        validate_category_name(&category.name)?;

        sqlx::query(
            r#"
            INSERT INTO expense_categories (id, name, description, created_at)
            VALUES (?, ?, ?, ?)
            "#,
        )
        .bind(&category.id)
        .bind(&category.name)
        .bind(&category.description)
        .bind(category.created_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Gets a category by ID.
    pub async fn get_category(&self, id: &str) -> DbResult<Option<ExpenseCategory>> {
        let category = sqlx::query_as::<_, ExpenseCategory>(
            "SELECT id, name, description, created_at FROM expense_categories WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(category)
    }

    /// Lists all categories ordered by name.
    pub async fn list_categories(&self) -> DbResult<Vec<ExpenseCategory>> {
        let categories = sqlx::query_as::<_, ExpenseCategory>(
            "SELECT id, name, description, created_at FROM expense_categories ORDER BY name",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(categories)
    }

    /// Deletes a category.
    ///
    /// ## Returns
    /// * `Err(DbError::IntegrityConflict)` - category still has expenses
    pub async fn delete_category(&self, id: &str) -> DbResult<()> {
        debug!(id = %id, "Deleting expense category");

        let references: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM expenses WHERE category_id = ?")
                .bind(id)
                .fetch_one(&self.pool)
                .await?;

        if references > 0 {
            return Err(DbError::still_referenced("ExpenseCategory", id, "expenses"));
        }

        let result = sqlx::query("DELETE FROM expense_categories WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("ExpenseCategory", id));
        }

        Ok(())
    }

    // -------------------------------------------------------------------------
    // Expenses
    // -------------------------------------------------------------------------

    /// Inserts a new expense.
    pub async fn insert(&self, expense: &Expense) -> DbResult<()> {
        debug!(
            description = %expense.description,
            amount_cents = %expense.amount_cents,
            "Inserting expense"
        );

        validate_name("description", &expense.description)?;
        validate_amount_cents("amount", expense.amount_cents)?;

        sqlx::query(
            r#"
            INSERT INTO expenses (
                id, description, amount_cents, expense_date, category_id,
                method, user_id, register_id, notes, created_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&expense.id)
        .bind(&expense.description)
        .bind(expense.amount_cents)
        .bind(expense.expense_date)
        .bind(&expense.category_id)
        .bind(expense.method)
        .bind(&expense.user_id)
        .bind(&expense.register_id)
        .bind(&expense.notes)
        .bind(expense.created_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Gets an expense by ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Expense>> {
        let expense = sqlx::query_as::<_, Expense>(&format!(
            "SELECT {EXPENSE_COLUMNS} FROM expenses WHERE id = ?"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(expense)
    }

    /// Lists expenses matching the filter, newest first.
    pub async fn list(&self, filter: &ExpenseFilter) -> DbResult<Vec<Expense>> {
        let expenses = sqlx::query_as::<_, Expense>(&format!(
            "SELECT {EXPENSE_COLUMNS} FROM expenses \
             WHERE (? IS NULL OR expense_date >= ?) \
               AND (? IS NULL OR expense_date <= ?) \
               AND (? IS NULL OR category_id = ?) \
               AND (? IS NULL OR register_id = ?) \
             ORDER BY expense_date DESC, created_at DESC"
        ))
        .bind(filter.from)
        .bind(filter.from)
        .bind(filter.to)
        .bind(filter.to)
        .bind(&filter.category_id)
        .bind(&filter.category_id)
        .bind(&filter.register_id)
        .bind(&filter.register_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(expenses)
    }

    /// Total expenses over a date range, in cents.
    pub async fn total_for_period(&self, from: NaiveDate, to: NaiveDate) -> DbResult<i64> {
        let total: i64 = sqlx::query_scalar(
            "SELECT COALESCE(SUM(amount_cents), 0) FROM expenses \
             WHERE expense_date >= ? AND expense_date <= ?",
        )
        .bind(from)
        .bind(to)
        .fetch_one(&self.pool)
        .await?;

        Ok(total)
    }

    /// Deletes an expense.
    pub async fn delete(&self, id: &str) -> DbResult<()> {
        debug!(id = %id, "Deleting expense");

        let result = sqlx::query("DELETE FROM expenses WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Expense", id));
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
    use crate::testutil::fixture;
    use caixa_core::{CoreError, PaymentMethod};
    use chrono::Utc;
    use uuid::Uuid;

    fn category(name: &str) -> ExpenseCategory {
        ExpenseCategory {
            id: Uuid::new_v4().to_string(),
            name: name.to_string(),
            description: None,
            created_at: Utc::now(),
        }
    }

    fn expense(category_id: &str, amount_cents: i64) -> Expense {
        Expense {
            id: Uuid::new_v4().to_string(),
            description: "Compra de mercadoria".to_string(),
            amount_cents,
            expense_date: Utc::now().date_naive(),
            category_id: category_id.to_string(),
            method: PaymentMethod::Cash,
            user_id: None,
            register_id: None,
            notes: None,
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_insert_validates_name_and_amount() {
        let f = fixture().await;

        let err = f.db.expenses().insert_category(&category("   ")).await.unwrap_err();
        assert!(matches!(err, DbError::Core(CoreError::Validation(_))));

        let cat = category("Contas");
        f.db.expenses().insert_category(&cat).await.unwrap();

        // A zero-amount expense is meaningless and never reaches the table
        let err = f.db.expenses().insert(&expense(&cat.id, 0)).await.unwrap_err();
        assert!(matches!(err, DbError::Core(CoreError::Validation(_))));
        assert!(f.db.expenses().list(&ExpenseFilter::default()).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_duplicate_category_name_is_rejected() {
        let f = fixture().await;

        f.db.expenses().insert_category(&category("Fornecedores")).await.unwrap();
        let err = f
            .db
            .expenses()
            .insert_category(&category("Fornecedores"))
            .await
            .unwrap_err();

        assert!(matches!(err, DbError::UniqueViolation { .. }));
    }

    #[tokio::test]
    async fn test_category_delete_blocked_while_referenced() {
        let f = fixture().await;

        let cat = category("Contas");
        f.db.expenses().insert_category(&cat).await.unwrap();
        f.db.expenses().insert(&expense(&cat.id, 1_500)).await.unwrap();

        let err = f.db.expenses().delete_category(&cat.id).await.unwrap_err();
        assert!(matches!(err, DbError::IntegrityConflict { .. }));

        // Removing the expense unblocks the category
        let listed = f.db.expenses().list(&ExpenseFilter::default()).await.unwrap();
        f.db.expenses().delete(&listed[0].id).await.unwrap();
        f.db.expenses().delete_category(&cat.id).await.unwrap();
    }

    #[tokio::test]
    async fn test_filtered_listing_and_period_total() {
        let f = fixture().await;
        let today = Utc::now().date_naive();

        let cat = category("Fornecedores");
        f.db.expenses().insert_category(&cat).await.unwrap();
        f.db.expenses().insert(&expense(&cat.id, 1_000)).await.unwrap();
        f.db.expenses().insert(&expense(&cat.id, 2_500)).await.unwrap();

        let by_category = f
            .db
            .expenses()
            .list(&ExpenseFilter {
                category_id: Some(cat.id.clone()),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(by_category.len(), 2);

        let total = f.db.expenses().total_for_period(today, today).await.unwrap();
        assert_eq!(total, 3_500);
    }
}
