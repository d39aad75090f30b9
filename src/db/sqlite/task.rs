//! SQLite TaskRepository implementation.

use std::time::Duration;

use sqlx::SqlitePool;
use sqlx::sqlite::SqliteRow;
use uuid::Uuid;

use super::helpers::{get, get_uuid};
use crate::db::utils::{assign_id, bounded};
use crate::db::{DbError, DbResult, Operation, Task, TaskRepository, WriteKind};

pub(crate) const TASK_COLUMNS: &str = "id, name, price_per_single, category";

/// SQLx-backed task repository.
pub struct SqliteTaskRepository<'a> {
    pub(crate) pool: &'a SqlitePool,
    pub(crate) timeout: Option<Duration>,
}

impl<'a> SqliteTaskRepository<'a> {
    async fn fetch_many(&self, sql: &str, bind: Option<i64>) -> DbResult<Vec<Task>> {
        let mut query = sqlx::query(sql);
        if let Some(value) = bind {
            query = query.bind(value);
        }

        let rows = query
            .fetch_all(self.pool)
            .await
            .map_err(|e| DbError::Select {
                message: e.to_string(),
            })?;

        rows.iter()
            .map(row_to_task)
            .collect::<Result<Vec<_>, _>>()
            .map_err(|message| DbError::Select { message })
    }
}

impl<'a> TaskRepository for SqliteTaskRepository<'a> {
    async fn create(&self, task: &Task) -> DbResult<Task> {
        task.validate(WriteKind::Create)?;

        // Use provided ID if not nil, otherwise generate one
        let created = Task {
            id: assign_id(task.id),
            ..task.clone()
        };

        bounded(self.timeout, Operation::Insert, async {
            sqlx::query(
                "INSERT INTO tasks (id, name, price_per_single, category) VALUES (?, ?, ?, ?)",
            )
            .bind(created.id.to_string())
            .bind(&created.name)
            .bind(created.price_per_single)
            .bind(created.category)
            .execute(self.pool)
            .await
            .map_err(|e| DbError::Insert {
                message: e.to_string(),
            })?;

            Ok(created.clone())
        })
        .await
    }

    async fn update(&self, task: &Task) -> DbResult<Task> {
        task.validate(WriteKind::Update)?;

        bounded(self.timeout, Operation::Update, async {
            let result = sqlx::query(
                "UPDATE tasks SET name = ?, price_per_single = ?, category = ? WHERE id = ?",
            )
            .bind(&task.name)
            .bind(task.price_per_single)
            .bind(task.category)
            .bind(task.id.to_string())
            .execute(self.pool)
            .await
            .map_err(|e| DbError::Update {
                message: e.to_string(),
            })?;

            if result.rows_affected() == 0 {
                return Err(DbError::does_not_exist("Task", task.id));
            }

            Ok(task.clone())
        })
        .await
    }

    async fn delete(&self, id: Uuid) -> DbResult<()> {
        bounded(self.timeout, Operation::Delete, async {
            let result = sqlx::query("DELETE FROM tasks WHERE id = ?")
                .bind(id.to_string())
                .execute(self.pool)
                .await
                .map_err(|e| DbError::Delete {
                    message: e.to_string(),
                })?;

            if result.rows_affected() == 0 {
                return Err(DbError::does_not_exist("Task", id));
            }

            Ok(())
        })
        .await
    }

    async fn get_by_id(&self, id: Uuid) -> DbResult<Task> {
        bounded(self.timeout, Operation::Select, async {
            let row = sqlx::query(&format!("SELECT {} FROM tasks WHERE id = ?", TASK_COLUMNS))
                .bind(id.to_string())
                .fetch_optional(self.pool)
                .await
                .map_err(|e| DbError::Select {
                    message: e.to_string(),
                })?;

            let row = row.ok_or_else(|| DbError::does_not_exist("Task", id))?;
            row_to_task(&row).map_err(|message| DbError::Select { message })
        })
        .await
    }

    async fn list(&self) -> DbResult<Vec<Task>> {
        bounded(self.timeout, Operation::Select, async {
            self.fetch_many(
                &format!("SELECT {} FROM tasks ORDER BY name", TASK_COLUMNS),
                None,
            )
            .await
        })
        .await
    }

    async fn get_tasks_in_category(&self, category: i64) -> DbResult<Vec<Task>> {
        bounded(self.timeout, Operation::Select, async {
            self.fetch_many(
                &format!(
                    "SELECT {} FROM tasks WHERE category = ? ORDER BY name",
                    TASK_COLUMNS
                ),
                Some(category),
            )
            .await
        })
        .await
    }

    async fn get_by_name(&self, name: &str) -> DbResult<Task> {
        bounded(self.timeout, Operation::Select, async {
            let row = sqlx::query(&format!(
                "SELECT {} FROM tasks WHERE name = ? LIMIT 1",
                TASK_COLUMNS
            ))
            .bind(name)
            .fetch_optional(self.pool)
            .await
            .map_err(|e| DbError::Select {
                message: e.to_string(),
            })?;

            let row = row.ok_or_else(|| DbError::does_not_exist("Task", name))?;
            row_to_task(&row).map_err(|message| DbError::Select { message })
        })
        .await
    }
}

pub(crate) fn row_to_task(row: &SqliteRow) -> Result<Task, String> {
    Ok(Task {
        id: get_uuid(row, "id")?,
        name: get(row, "name")?,
        price_per_single: get(row, "price_per_single")?,
        category: get(row, "category")?,
    })
}
