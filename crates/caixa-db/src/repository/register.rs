//! # Register Repository
//!
//! Database operations for registers (physical tills, "caixas").

use sqlx::SqlitePool;
use tracing::debug;

use crate::error::{DbError, DbResult};
use caixa_core::Register;

/// Repository for register database operations.
#[derive(Debug, Clone)]
pub struct RegisterRepository {
    pool: SqlitePool,
}

impl RegisterRepository {
    /// Creates a new RegisterRepository.
    pub fn new(pool: SqlitePool) -> Self {
        RegisterRepository { pool }
    }

    /// Inserts a new register.
    pub async fn insert(&self, register: &Register) -> DbResult<()> {
        debug!(name = %register.name, "Inserting register");

        sqlx::query(
            r#"
            INSERT INTO registers (id, name, location, is_active, created_at)
            VALUES (?, ?, ?, ?, ?)
            "#,
        )
        .bind(&register.id)
        .bind(&register.name)
        .bind(&register.location)
        .bind(register.is_active)
        .bind(register.created_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Gets a register by ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Register>> {
        let register = sqlx::query_as::<_, Register>(
            "SELECT id, name, location, is_active, created_at FROM registers WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(register)
    }

    /// Lists all registers, active first.
    pub async fn list(&self) -> DbResult<Vec<Register>> {
        let registers = sqlx::query_as::<_, Register>(
            r#"
            SELECT id, name, location, is_active, created_at
            FROM registers
            ORDER BY is_active DESC, name
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(registers)
    }

    /// Lists the IDs of all registers, deactivated ones included.
    ///
    /// Used by the reconciler when recomputing every register for a day;
    /// a deactivated till keeps its sales history, so a backfilled day
    /// there must still reconcile.
    pub async fn list_ids(&self) -> DbResult<Vec<String>> {
        let ids = sqlx::query_scalar::<_, String>("SELECT id FROM registers ORDER BY name")
            .fetch_all(&self.pool)
            .await?;

        Ok(ids)
    }

    /// Updates a register's name and location.
    pub async fn update(&self, register: &Register) -> DbResult<()> {
        debug!(id = %register.id, "Updating register");

        let result = sqlx::query(
            "UPDATE registers SET name = ?, location = ?, is_active = ? WHERE id = ?",
        )
        .bind(&register.name)
        .bind(&register.location)
        .bind(register.is_active)
        .bind(&register.id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Register", &register.id));
        }

        Ok(())
    }

    /// Deactivates a register.
    ///
    /// The register keeps its sales and cash-flow history; it just stops
    /// accepting new sales.
    pub async fn deactivate(&self, id: &str) -> DbResult<()> {
        debug!(id = %id, "Deactivating register");

        let result = sqlx::query("UPDATE registers SET is_active = 0 WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Register", id));
        }

        Ok(())
    }
}
