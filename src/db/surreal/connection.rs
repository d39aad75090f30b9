//! SurrealDB connection and schema bootstrap.

use std::time::Duration;

use surrealdb::Surreal;
use surrealdb::engine::any::{self, Any};
use surrealdb::opt::auth::Root;
use tracing::{debug, info};

use super::category::SurrealCategoryRepository;
use super::order::SurrealOrderRepository;
use super::task::SurrealTaskRepository;
use super::user::SurrealUserRepository;
use super::worker::SurrealWorkerRepository;
use crate::db::{Database, DbError, DbResult};

const SCHEMA: &str = "
    DEFINE TABLE IF NOT EXISTS categories SCHEMALESS;
    DEFINE TABLE IF NOT EXISTS tasks SCHEMALESS;
    DEFINE TABLE IF NOT EXISTS users SCHEMALESS;
    DEFINE TABLE IF NOT EXISTS workers SCHEMALESS;
    DEFINE TABLE IF NOT EXISTS orders SCHEMALESS;
    DEFINE TABLE IF NOT EXISTS order_contains_tasks SCHEMALESS;
    DEFINE TABLE IF NOT EXISTS counters SCHEMALESS;

    DEFINE INDEX IF NOT EXISTS categories_id ON TABLE categories FIELDS category_id UNIQUE;
    DEFINE INDEX IF NOT EXISTS tasks_uuid ON TABLE tasks FIELDS uuid UNIQUE;
    DEFINE INDEX IF NOT EXISTS tasks_category ON TABLE tasks FIELDS category;
    DEFINE INDEX IF NOT EXISTS users_uuid ON TABLE users FIELDS uuid UNIQUE;
    DEFINE INDEX IF NOT EXISTS users_email ON TABLE users FIELDS email UNIQUE;
    DEFINE INDEX IF NOT EXISTS workers_uuid ON TABLE workers FIELDS uuid UNIQUE;
    DEFINE INDEX IF NOT EXISTS workers_email ON TABLE workers FIELDS email UNIQUE;
    DEFINE INDEX IF NOT EXISTS orders_uuid ON TABLE orders FIELDS uuid UNIQUE;
    DEFINE INDEX IF NOT EXISTS orders_user ON TABLE orders FIELDS user_id;
    DEFINE INDEX IF NOT EXISTS orders_worker ON TABLE orders FIELDS worker_id;
    DEFINE INDEX IF NOT EXISTS order_tasks_pair ON TABLE order_contains_tasks FIELDS order_id, task_id UNIQUE;
";

/// Namespace and database used by `in_memory`.
const DEFAULT_NAMESPACE: &str = "taskmarket";
const DEFAULT_DATABASE: &str = "taskmarket";

/// Root credentials for a remote server.
#[derive(Debug, Clone)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

/// SurrealDB database implementation.
///
/// The endpoint scheme picks the engine: `mem://` (in-memory),
/// `surrealkv://path` (embedded file store) or `ws://host:port` (server).
pub struct SurrealDatabase {
    db: Surreal<Any>,
    timeout: Option<Duration>,
}

impl SurrealDatabase {
    /// Connect to `endpoint` and select the namespace and database.
    pub async fn connect(
        endpoint: &str,
        namespace: &str,
        database: &str,
        credentials: Option<&Credentials>,
    ) -> DbResult<Self> {
        let db = any::connect(endpoint)
            .await
            .map_err(|e| DbError::Connection {
                message: format!("{}: {}", endpoint, e),
            })?;

        if let Some(credentials) = credentials {
            db.signin(Root {
                username: &credentials.username,
                password: &credentials.password,
            })
            .await
            .map_err(|e| DbError::Connection {
                message: format!("sign-in failed: {}", e),
            })?;
        }

        db.use_ns(namespace)
            .use_db(database)
            .await
            .map_err(|e| DbError::Connection {
                message: e.to_string(),
            })?;

        info!(endpoint, namespace, database, "Connected to SurrealDB");
        Ok(Self { db, timeout: None })
    }

    /// Create an in-memory database (useful for testing).
    pub async fn in_memory() -> DbResult<Self> {
        Self::connect("mem://", DEFAULT_NAMESPACE, DEFAULT_DATABASE, None).await
    }

    /// Apply a deadline to every repository operation.
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    /// Get a reference to the client.
    pub fn client(&self) -> &Surreal<Any> {
        &self.db
    }
}

impl Database for SurrealDatabase {
    type Categories<'a> = SurrealCategoryRepository<'a>;
    type Tasks<'a> = SurrealTaskRepository<'a>;
    type Users<'a> = SurrealUserRepository<'a>;
    type Workers<'a> = SurrealWorkerRepository<'a>;
    type Orders<'a> = SurrealOrderRepository<'a>;

    async fn migrate(&self) -> DbResult<()> {
        debug!("Defining SurrealDB tables and indexes");
        self.db
            .query(SCHEMA)
            .await
            .and_then(|response| response.check())
            .map_err(|e| DbError::Migration {
                message: e.to_string(),
            })?;
        Ok(())
    }

    fn categories(&self) -> Self::Categories<'_> {
        SurrealCategoryRepository {
            db: &self.db,
            timeout: self.timeout,
        }
    }

    fn tasks(&self) -> Self::Tasks<'_> {
        SurrealTaskRepository {
            db: &self.db,
            timeout: self.timeout,
        }
    }

    fn users(&self) -> Self::Users<'_> {
        SurrealUserRepository {
            db: &self.db,
            timeout: self.timeout,
        }
    }

    fn workers(&self) -> Self::Workers<'_> {
        SurrealWorkerRepository {
            db: &self.db,
            timeout: self.timeout,
        }
    }

    fn orders(&self) -> Self::Orders<'_> {
        SurrealOrderRepository {
            db: &self.db,
            timeout: self.timeout,
        }
    }
}
