//! SQLite WorkerRepository implementation.

use std::time::Duration;

use sqlx::SqlitePool;
use sqlx::sqlite::SqliteRow;
use uuid::Uuid;

use super::helpers::{get, get_uuid};
use crate::db::utils::{assign_id, bounded};
use crate::db::{
    DbError, DbResult, Operation, UNRATED, Worker, WorkerRepository, WriteKind, order_status,
};

const WORKER_COLUMNS: &str = "id, name, surname, address, phone_number, email, role, password";

/// SQLx-backed worker repository.
pub struct SqliteWorkerRepository<'a> {
    pub(crate) pool: &'a SqlitePool,
    pub(crate) timeout: Option<Duration>,
}

impl<'a> SqliteWorkerRepository<'a> {
    async fn fetch_one_by(&self, column: &str, value: String) -> DbResult<Worker> {
        let row = sqlx::query(&format!(
            "SELECT {} FROM workers WHERE {} = ?",
            WORKER_COLUMNS, column
        ))
        .bind(&value)
        .fetch_optional(self.pool)
        .await
        .map_err(|e| DbError::Select {
            message: e.to_string(),
        })?;

        let row = row.ok_or_else(|| DbError::does_not_exist("Worker", &value))?;
        row_to_worker(&row).map_err(|message| DbError::Select { message })
    }
}

impl<'a> WorkerRepository for SqliteWorkerRepository<'a> {
    async fn create(&self, worker: &Worker) -> DbResult<Worker> {
        worker.validate(WriteKind::Create)?;

        let created = Worker {
            id: assign_id(worker.id),
            ..worker.clone()
        };

        bounded(self.timeout, Operation::Insert, async {
            sqlx::query(
                "INSERT INTO workers (id, name, surname, address, phone_number, email, role, password)
                 VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
            )
            .bind(created.id.to_string())
            .bind(&created.name)
            .bind(&created.surname)
            .bind(&created.address)
            .bind(&created.phone_number)
            .bind(&created.email)
            .bind(created.role)
            .bind(&created.password)
            .execute(self.pool)
            .await
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
            let result = sqlx::query(
                "UPDATE workers SET name = ?, surname = ?, address = ?, phone_number = ?, email = ?,
                 role = ?, password = ? WHERE id = ?",
            )
            .bind(&worker.name)
            .bind(&worker.surname)
            .bind(&worker.address)
            .bind(&worker.phone_number)
            .bind(&worker.email)
            .bind(worker.role)
            .bind(&worker.password)
            .bind(worker.id.to_string())
            .execute(self.pool)
            .await
            .map_err(|e| DbError::Update {
                message: e.to_string(),
            })?;

            if result.rows_affected() == 0 {
                return Err(DbError::does_not_exist("Worker", worker.id));
            }

            Ok(worker.clone())
        })
        .await
    }

    async fn delete(&self, id: Uuid) -> DbResult<()> {
        // orders.worker_id is ON DELETE SET NULL
        bounded(self.timeout, Operation::Delete, async {
            let result = sqlx::query("DELETE FROM workers WHERE id = ?")
                .bind(id.to_string())
                .execute(self.pool)
                .await
                .map_err(|e| DbError::Delete {
                    message: e.to_string(),
                })?;

            if result.rows_affected() == 0 {
                return Err(DbError::does_not_exist("Worker", id));
            }

            Ok(())
        })
        .await
    }

    async fn get_by_id(&self, id: Uuid) -> DbResult<Worker> {
        bounded(self.timeout, Operation::Select, async {
            self.fetch_one_by("id", id.to_string()).await
        })
        .await
    }

    async fn list(&self) -> DbResult<Vec<Worker>> {
        bounded(self.timeout, Operation::Select, async {
            let rows = sqlx::query(&format!(
                "SELECT {} FROM workers ORDER BY surname, name",
                WORKER_COLUMNS
            ))
            .fetch_all(self.pool)
            .await
            .map_err(|e| DbError::Select {
                message: e.to_string(),
            })?;

            rows.iter()
                .map(row_to_worker)
                .collect::<Result<Vec<_>, _>>()
                .map_err(|message| DbError::Select { message })
        })
        .await
    }

    async fn get_by_email(&self, email: &str) -> DbResult<Worker> {
        bounded(self.timeout, Operation::Select, async {
            self.fetch_one_by("email", email.to_string()).await
        })
        .await
    }

    async fn get_workers_by_role(&self, role: i32) -> DbResult<Vec<Worker>> {
        bounded(self.timeout, Operation::Select, async {
            let rows = sqlx::query(&format!(
                "SELECT {} FROM workers WHERE role = ? ORDER BY surname, name",
                WORKER_COLUMNS
            ))
            .bind(role)
            .fetch_all(self.pool)
            .await
            .map_err(|e| DbError::Select {
                message: e.to_string(),
            })?;

            rows.iter()
                .map(row_to_worker)
                .collect::<Result<Vec<_>, _>>()
                .map_err(|message| DbError::Select { message })
        })
        .await
    }

    async fn get_average_order_rate(&self, worker: &Worker) -> DbResult<f64> {
        bounded(self.timeout, Operation::Select, async {
            let average: Option<f64> = sqlx::query_scalar(
                "SELECT AVG(rate) FROM orders WHERE worker_id = ? AND status = ? AND rate != ?",
            )
            .bind(worker.id.to_string())
            .bind(order_status::COMPLETED)
            .bind(UNRATED)
            .fetch_one(self.pool)
            .await
            .map_err(|e| DbError::Select {
                message: e.to_string(),
            })?;

            Ok(average.unwrap_or(0.0))
        })
        .await
    }
}

fn row_to_worker(row: &SqliteRow) -> Result<Worker, String> {
    Ok(Worker {
        id: get_uuid(row, "id")?,
        name: get(row, "name")?,
        surname: get(row, "surname")?,
        address: get(row, "address")?,
        phone_number: get(row, "phone_number")?,
        email: get(row, "email")?,
        role: get(row, "role")?,
        password: get(row, "password")?,
    })
}
