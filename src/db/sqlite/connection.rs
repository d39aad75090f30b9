//! SQLite database connection and migration management.

use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

use sqlx::SqlitePool;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use tracing::{debug, info};

use super::category::SqliteCategoryRepository;
use super::order::SqliteOrderRepository;
use super::task::SqliteTaskRepository;
use super::user::SqliteUserRepository;
use super::worker::SqliteWorkerRepository;
use crate::db::{Database, DbError, DbResult};

/// SQLite database implementation.
///
/// Provides access to repositories via associated types, avoiding dynamic dispatch.
pub struct SqliteDatabase {
    pool: SqlitePool,
    timeout: Option<Duration>,
}

impl SqliteDatabase {
    /// Open (creating if missing) a database file at the given path.
    pub async fn open<P: AsRef<Path>>(path: P) -> DbResult<Self> {
        let options = SqliteConnectOptions::new()
            .filename(path.as_ref())
            .create_if_missing(true)
            .foreign_keys(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(options)
            .await
            .map_err(|e| DbError::Connection {
                message: e.to_string(),
            })?;

        info!(path = %path.as_ref().display(), "Opened SQLite database");
        Ok(Self {
            pool,
            timeout: None,
        })
    }

    /// Create an in-memory database (useful for testing).
    ///
    /// Every pooled connection to `:memory:` would see its own empty
    /// database, so the pool is pinned to a single connection that is never
    /// reaped.
    pub async fn in_memory() -> DbResult<Self> {
        let options = SqliteConnectOptions::from_str("sqlite::memory:")
            .map_err(|e| DbError::Connection {
                message: e.to_string(),
            })?
            .foreign_keys(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await
            .map_err(|e| DbError::Connection {
                message: e.to_string(),
            })?;

        Ok(Self {
            pool,
            timeout: None,
        })
    }

    /// Apply a deadline to every repository operation.
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    /// Get a reference to the connection pool.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

impl Database for SqliteDatabase {
    type Categories<'a> = SqliteCategoryRepository<'a>;
    type Tasks<'a> = SqliteTaskRepository<'a>;
    type Users<'a> = SqliteUserRepository<'a>;
    type Workers<'a> = SqliteWorkerRepository<'a>;
    type Orders<'a> = SqliteOrderRepository<'a>;

    async fn migrate(&self) -> DbResult<()> {
        debug!("Running SQLite migrations");
        sqlx::migrate!("./data/sql/sqlite")
            .run(&self.pool)
            .await
            .map_err(|e| DbError::Migration {
                message: e.to_string(),
            })
    }

    fn categories(&self) -> Self::Categories<'_> {
        SqliteCategoryRepository {
            pool: &self.pool,
            timeout: self.timeout,
        }
    }

    fn tasks(&self) -> Self::Tasks<'_> {
        SqliteTaskRepository {
            pool: &self.pool,
            timeout: self.timeout,
        }
    }

    fn users(&self) -> Self::Users<'_> {
        SqliteUserRepository {
            pool: &self.pool,
            timeout: self.timeout,
        }
    }

    fn workers(&self) -> Self::Workers<'_> {
        SqliteWorkerRepository {
            pool: &self.pool,
            timeout: self.timeout,
        }
    }

    fn orders(&self) -> Self::Orders<'_> {
        SqliteOrderRepository {
            pool: &self.pool,
            timeout: self.timeout,
        }
    }
}
