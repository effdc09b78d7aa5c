//! # Database Errors
//!
//! One error enum for the whole persistence layer. Two streams feed it:
//! sqlx failures (mapped in the `From` impl below) and business-rule
//! rejections from caixa-core, carried transparently in `Core` so a
//! caller can still match on the concrete rule that fired.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  sqlx::Error ──────────► DbError::{NotFound, UniqueViolation, ...}      │
//! │  caixa_core::CoreError ► DbError::Core(..)  (transparent)               │
//! │                                                                         │
//! │  services return DbResult<T>; a failed step drops the transaction,     │
//! │  which rolls it back                                                    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use thiserror::Error;

use caixa_core::{CoreError, ValidationError};

/// Failures raised by repositories and services.
#[derive(Debug, Error)]
pub enum DbError {
    /// No row for the requested id. Also raised when an UPDATE or
    /// DELETE matched nothing.
    #[error("{entity} not found: {id}")]
    NotFound { entity: String, id: String },

    /// A UNIQUE index rejected the write (duplicate user email,
    /// duplicate expense-category name).
    #[error("duplicate {field}: a row with this value exists")]
    UniqueViolation { field: String, value: String },

    /// A foreign key pointed at a row that does not exist.
    #[error("foreign key violation: {message}")]
    ForeignKeyViolation { message: String },

    /// Deletion refused because other rows still point here. Raised by
    /// the explicit reference checks, not by SQLite itself, so the
    /// message can say what blocks the delete.
    #[error("{entity} {id} is still referenced by {referenced_by} and cannot be deleted")]
    IntegrityConflict {
        entity: String,
        id: String,
        referenced_by: String,
    },

    /// A caixa-core business rule rejected the operation.
    #[error(transparent)]
    Core(#[from] CoreError),

    #[error("connection failed: {0}")]
    ConnectionFailed(String),

    #[error("migration failed: {0}")]
    MigrationFailed(String),

    #[error("query failed: {0}")]
    QueryFailed(String),

    #[error("connection pool exhausted")]
    PoolExhausted,

    #[error("internal database error: {0}")]
    Internal(String),
}

impl DbError {
    pub fn not_found(entity: impl Into<String>, id: impl Into<String>) -> Self {
        DbError::NotFound {
            entity: entity.into(),
            id: id.into(),
        }
    }

    pub fn still_referenced(
        entity: impl Into<String>,
        id: impl Into<String>,
        referenced_by: impl Into<String>,
    ) -> Self {
        DbError::IntegrityConflict {
            entity: entity.into(),
            id: id.into(),
            referenced_by: referenced_by.into(),
        }
    }
}

// Lets repositories call the caixa-core validators with `?`; the
// rejection still surfaces as Core so callers match one variant for
// every business-rule refusal.
impl From<ValidationError> for DbError {
    fn from(err: ValidationError) -> Self {
        DbError::Core(CoreError::Validation(err))
    }
}

impl From<sqlx::Error> for DbError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => DbError::NotFound {
                entity: "Record".to_string(),
                id: "unknown".to_string(),
            },
            sqlx::Error::Database(db_err) => classify_database_error(db_err.message()),
            sqlx::Error::PoolTimedOut => DbError::PoolExhausted,
            sqlx::Error::PoolClosed => DbError::ConnectionFailed("pool is closed".to_string()),
            other => DbError::Internal(other.to_string()),
        }
    }
}

/// SQLite reports constraint failures only through the message text, so
/// classification is a string match. A UNIQUE failure names the column as
/// "UNIQUE constraint failed: table.column"; FK failures carry no detail.
fn classify_database_error(msg: &str) -> DbError {
    if let Some(field) = msg.strip_prefix("UNIQUE constraint failed: ") {
        return DbError::UniqueViolation {
            field: field.to_string(),
            value: String::new(),
        };
    }
    if msg.contains("FOREIGN KEY constraint failed") {
        return DbError::ForeignKeyViolation {
            message: msg.to_string(),
        };
    }
    DbError::QueryFailed(msg.to_string())
}

impl From<sqlx::migrate::MigrateError> for DbError {
    fn from(err: sqlx::migrate::MigrateError) -> Self {
        DbError::MigrationFailed(err.to_string())
    }
}

pub type DbResult<T> = Result<T, DbError>;
