//! SurrealDB WorkerRepository implementation.

use std::time::Duration;

use serde::Deserialize;
use surrealdb::Surreal;
use surrealdb::engine::any::Any;
use tracing::instrument;
use uuid::Uuid;

use super::documents::{WorkerDoc, convert_all};
use super::helpers::run_delete_script;
use crate::db::utils::{assign_id, bounded};
use crate::db::{
    DbError, DbResult, Operation, UNRATED, Worker, WorkerRepository, WriteKind, order_status,
};

#[derive(Debug, Deserialize)]
struct RateSummary {
    average: Option<f64>,
}

/// Document-backed worker repository.
pub struct SurrealWorkerRepository<'a> {
    pub(crate) db: &'a Surreal<Any>,
    pub(crate) timeout: Option<Duration>,
}

impl<'a> SurrealWorkerRepository<'a> {
    async fn select_one(&self, sql: &str, key: String) -> DbResult<Worker> {
        let mut response = self
            .db
            .query(sql)
            .bind(("key", key.clone()))
            .await
            .map_err(|e| DbError::Select {
                message: e.to_string(),
            })?;

        let found: Option<WorkerDoc> = response.take(0).map_err(|e| DbError::Select {
            message: e.to_string(),
        })?;

        let doc = found.ok_or_else(|| DbError::does_not_exist("Worker", &key))?;
        Worker::try_from(doc).map_err(|message| DbError::Select { message })
    }

    async fn select_many(&self, sql: &str, role: Option<i32>) -> DbResult<Vec<Worker>> {
        let mut query = self.db.query(sql);
        if let Some(role) = role {
            query = query.bind(("role", role));
        }

        let mut response = query.await.map_err(|e| DbError::Select {
            message: e.to_string(),
        })?;

        let docs: Vec<WorkerDoc> = response.take(0).map_err(|e| DbError::Select {
            message: e.to_string(),
        })?;

        convert_all(docs).map_err(|message| DbError::Select { message })
    }
}

impl<'a> WorkerRepository for SurrealWorkerRepository<'a> {
    async fn create(&self, worker: &Worker) -> DbResult<Worker> {
        worker.validate(WriteKind::Create)?;

        let created = Worker {
            id: assign_id(worker.id),
            ..worker.clone()
        };

        bounded(self.timeout, Operation::Insert, async {
            self.db
                .query("CREATE type::thing('workers', $uuid) CONTENT $doc")
                .bind(("uuid", created.id.to_string()))
                .bind(("doc", WorkerDoc::from(&created)))
                .await
                .and_then(|response| response.check())
                .map_err(|e| DbError::Insert {
                    message: e.to_string(),
                })?;

            Ok(created.clone())
        })
        .await
    }

    async fn update(&self, worker: &Worker) -> DbResult<Worker> {
        worker.validate(WriteKind::Update)?;

        bounded(self.timeout, Operation::Update, async {
            let mut response = self
                .db
                .query("UPDATE workers MERGE $doc WHERE uuid = $uuid RETURN AFTER")
                .bind(("uuid", worker.id.to_string()))
                .bind(("doc", WorkerDoc::from(worker)))
                .await
                .map_err(|e| DbError::Update {
                    message: e.to_string(),
                })?;

            let updated: Vec<WorkerDoc> = response.take(0).map_err(|e| DbError::Update {
                message: e.to_string(),
            })?;

            if updated.is_empty() {
                return Err(DbError::does_not_exist("Worker", worker.id));
            }

            Ok(worker.clone())
        })
        .await
    }

    #[instrument(skip(self))]
    async fn delete(&self, id: Uuid) -> DbResult<()> {
        bounded(self.timeout, Operation::Delete, async {
            run_delete_script(
                self.db,
                "BEGIN TRANSACTION;
                 LET $gone = (DELETE workers WHERE uuid = $uuid RETURN BEFORE);
                 IF array::len($gone) = 0 { THROW $missing; };
                 UPDATE orders SET worker_id = NONE WHERE worker_id = $uuid;
                 COMMIT TRANSACTION;",
                "Worker",
                id.to_string(),
            )
            .await
        })
        .await
    }

    async fn get_by_id(&self, id: Uuid) -> DbResult<Worker> {
        bounded(self.timeout, Operation::Select, async {
            self.select_one("SELECT * FROM workers WHERE uuid = $key", id.to_string())
                .await
        })
        .await
    }

    async fn list(&self) -> DbResult<Vec<Worker>> {
        bounded(self.timeout, Operation::Select, async {
            self.select_many("SELECT * FROM workers ORDER BY surname, name", None)
                .await
        })
        .await
    }

    async fn get_by_email(&self, email: &str) -> DbResult<Worker> {
        bounded(self.timeout, Operation::Select, async {
            self.select_one("SELECT * FROM workers WHERE email = $key", email.to_string())
                .await
        })
        .await
    }

    async fn get_workers_by_role(&self, role: i32) -> DbResult<Vec<Worker>> {
        bounded(self.timeout, Operation::Select, async {
            self.select_many(
                "SELECT * FROM workers WHERE role = $role ORDER BY surname, name",
                Some(role),
            )
            .await
        })
        .await
    }

    async fn get_average_order_rate(&self, worker: &Worker) -> DbResult<f64> {
        bounded(self.timeout, Operation::Select, async {
            let mut response = self
                .db
                .query(
                    "SELECT math::mean(rate) AS average FROM orders
                     WHERE worker_id = $worker AND status = $status AND rate != $unrated
                     GROUP ALL",
                )
                .bind(("worker", worker.id.to_string()))
                .bind(("status", order_status::COMPLETED))
                .bind(("unrated", UNRATED))
                .await
                .map_err(|e| DbError::Select {
                    message: e.to_string(),
                })?;

            let summary: Option<RateSummary> = response.take(0).map_err(|e| DbError::Select {
                message: e.to_string(),
            })?;

            // No qualifying orders yields no row, or a NaN mean
            Ok(summary
                .and_then(|s| s.average)
                .filter(|average| !average.is_nan())
                .unwrap_or(0.0))
        })
        .await
    }
}
