//! # Connection Pool
//!
//! SQLite pool construction for the shop backend.
//!
//! A small shop runs one process against one database file, so the pool
//! stays small; it exists so report queries can read while a checkout
//! transaction writes.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  DbConfig::new("caixa.db")  ──►  Database::new(config).await            │
//! │                                        │                                │
//! │                                        ├── open pool (WAL, FKs on)      │
//! │                                        └── apply embedded migrations    │
//! │                                                                         │
//! │  db.checkout().finalize_sale(..)   ← write transaction                  │
//! │  db.reports().daily_report(..)     ← concurrent reads                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! WAL journaling lets readers proceed while a writer holds its
//! transaction, which is exactly the checkout-vs-reports situation above.

use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous};
use sqlx::SqlitePool;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;
use tracing::info;

use crate::error::{DbError, DbResult};
use crate::migrations;
use crate::repository::cash_flow::CashFlowRepository;
use crate::repository::customer::CustomerRepository;
use crate::repository::expense::ExpenseRepository;
use crate::repository::product::ProductRepository;
use crate::repository::register::RegisterRepository;
use crate::repository::sale::SaleRepository;
use crate::repository::user::UserRepository;
use crate::service::billing::BillingService;
use crate::service::cashflow::CashFlowService;
use crate::service::checkout::CheckoutService;
use crate::service::reports::ReportService;

// =============================================================================
// Configuration
// =============================================================================

/// Pool and startup settings, built up before opening the database.
#[derive(Debug, Clone)]
pub struct DbConfig {
    /// Where the SQLite file lives. Created on first open.
    pub database_path: PathBuf,

    /// Upper bound on pooled connections. Five covers a till plus
    /// background reporting comfortably.
    pub max_connections: u32,

    /// Connections kept warm between requests.
    pub min_connections: u32,

    /// How long an acquire may wait before giving up.
    pub connect_timeout: Duration,

    /// Idle connections older than this are dropped.
    pub idle_timeout: Duration,

    /// Apply pending migrations while opening. On except when a caller
    /// wants to stage migrations manually.
    pub run_migrations: bool,
}

impl DbConfig {
    /// Settings for a file-backed database at `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        DbConfig {
            database_path: path.into(),
            max_connections: 5,
            min_connections: 1,
            connect_timeout: Duration::from_secs(30),
            idle_timeout: Duration::from_secs(600),
            run_migrations: true,
        }
    }

    pub fn max_connections(mut self, max: u32) -> Self {
        self.max_connections = max;
        self
    }

    pub fn min_connections(mut self, min: u32) -> Self {
        self.min_connections = min;
        self
    }

    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    pub fn run_migrations(mut self, run: bool) -> Self {
        self.run_migrations = run;
        self
    }

    /// Settings for an isolated in-memory database, used by the tests.
    ///
    /// Capped at a single connection: each connection to `:memory:` gets
    /// its own empty database, so a second one would see no tables.
    pub fn in_memory() -> Self {
        DbConfig {
            database_path: PathBuf::from(":memory:"),
            max_connections: 1,
            min_connections: 1,
            connect_timeout: Duration::from_secs(5),
            idle_timeout: Duration::from_secs(60),
            run_migrations: true,
        }
    }
}

// =============================================================================
// Database Handle
// =============================================================================

/// Owning handle over the pool; the only way the rest of the backend
/// reaches the database.
///
/// Accessors come in two flavors. The repository accessors
/// (`customers()`, `products()`, ...) expose single-entity CRUD. The
/// service accessors (`checkout()`, `billing()`, `reconciler()`,
/// `reports()`) run the multi-entity orchestrations and are the ones a
/// caller should prefer whenever a business rule is involved.
#[derive(Debug, Clone)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Opens (creating if necessary) the database described by `config`
    /// and brings its schema up to date.
    ///
    /// The connection is tuned for this workload before pooling: WAL
    /// journal so reads and writes overlap, NORMAL fsync cadence, and
    /// foreign keys switched on (SQLite leaves them off by default).
    pub async fn new(config: DbConfig) -> DbResult<Self> {
        info!(path = %config.database_path.display(), "Opening database");

        let url = format!("sqlite://{}?mode=rwc", config.database_path.display());

        let options = SqliteConnectOptions::from_str(&url)
            .map_err(|e| DbError::ConnectionFailed(e.to_string()))?
            .journal_mode(SqliteJournalMode::Wal)
            .synchronous(SqliteSynchronous::Normal)
            .foreign_keys(true)
            .create_if_missing(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(config.max_connections)
            .min_connections(config.min_connections)
            .acquire_timeout(config.connect_timeout)
            .idle_timeout(Some(config.idle_timeout))
            .connect_with(options)
            .await
            .map_err(|e| DbError::ConnectionFailed(e.to_string()))?;

        info!(max_connections = config.max_connections, "Pool ready");

        let db = Database { pool };

        if config.run_migrations {
            db.run_migrations().await?;
        }

        Ok(db)
    }

    /// Applies pending migrations. `new()` already does this unless the
    /// config disabled it.
    pub async fn run_migrations(&self) -> DbResult<()> {
        migrations::run_migrations(&self.pool).await
    }

    /// Raw pool access, for queries none of the repositories cover.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    // -------------------------------------------------------------------------
    // Repositories
    // -------------------------------------------------------------------------

    pub fn users(&self) -> UserRepository {
        UserRepository::new(self.pool.clone())
    }

    pub fn registers(&self) -> RegisterRepository {
        RegisterRepository::new(self.pool.clone())
    }

    pub fn customers(&self) -> CustomerRepository {
        CustomerRepository::new(self.pool.clone())
    }

    pub fn products(&self) -> ProductRepository {
        ProductRepository::new(self.pool.clone())
    }

    pub fn sales(&self) -> SaleRepository {
        SaleRepository::new(self.pool.clone())
    }

    pub fn expenses(&self) -> ExpenseRepository {
        ExpenseRepository::new(self.pool.clone())
    }

    pub fn cash_flow(&self) -> CashFlowRepository {
        CashFlowRepository::new(self.pool.clone())
    }

    // -------------------------------------------------------------------------
    // Services
    // -------------------------------------------------------------------------

    /// Sale finalization.
    pub fn checkout(&self) -> CheckoutService {
        CheckoutService::new(self.pool.clone())
    }

    /// Payments against open sales.
    pub fn billing(&self) -> BillingService {
        BillingService::new(self.pool.clone())
    }

    /// Daily cash-flow reconciliation.
    pub fn reconciler(&self) -> CashFlowService {
        CashFlowService::new(self.pool.clone())
    }

    /// Read-only reporting.
    pub fn reports(&self) -> ReportService {
        ReportService::new(self.pool.clone())
    }

    /// Drains and closes the pool. Everything derived from this handle
    /// stops working afterwards.
    pub async fn close(&self) {
        info!("Closing database pool");
        self.pool.close().await;
    }

    /// Cheap liveness probe.
    pub async fn health_check(&self) -> bool {
        sqlx::query("SELECT 1").execute(&self.pool).await.is_ok()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_in_memory_open_and_probe() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        assert!(db.health_check().await);

        // Migrations ran: a known table answers
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM registers")
            .fetch_one(db.pool())
            .await
            .unwrap();
        assert_eq!(count, 0);
    }

    #[tokio::test]
    async fn test_builder_overrides_defaults() {
        let config = DbConfig::new("/tmp/caixa_test.db")
            .max_connections(8)
            .min_connections(2)
            .run_migrations(false);

        assert_eq!(config.max_connections, 8);
        assert_eq!(config.min_connections, 2);
        assert!(!config.run_migrations);
    }
}
