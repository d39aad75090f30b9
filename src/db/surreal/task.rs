//! SurrealDB TaskRepository implementation.

use std::time::Duration;

use surrealdb::Surreal;
use surrealdb::engine::any::Any;
use uuid::Uuid;

use super::documents::{TaskDoc, convert_all};
use crate::db::utils::{assign_id, bounded};
use crate::db::{DbError, DbResult, Operation, Task, TaskRepository, WriteKind};

/// Document-backed task repository.
pub struct SurrealTaskRepository<'a> {
    pub(crate) db: &'a Surreal<Any>,
    pub(crate) timeout: Option<Duration>,
}

impl<'a> SurrealTaskRepository<'a> {
    async fn select_one(&self, sql: &str, key: String) -> DbResult<Task> {
        let mut response = self
            .db
            .query(sql)
            .bind(("key", key.clone()))
            .await
            .map_err(|e| DbError::Select {
                message: e.to_string(),
            })?;

        let found: Option<TaskDoc> = response.take(0).map_err(|e| DbError::Select {
            message: e.to_string(),
        })?;

        let doc = found.ok_or_else(|| DbError::does_not_exist("Task", &key))?;
        Task::try_from(doc).map_err(|message| DbError::Select { message })
    }

    async fn select_many(&self, sql: &str, category: Option<i64>) -> DbResult<Vec<Task>> {
        let mut query = self.db.query(sql);
        if let Some(category) = category {
            query = query.bind(("category", category));
        }

        let mut response = query.await.map_err(|e| DbError::Select {
            message: e.to_string(),
        })?;

        let docs: Vec<TaskDoc> = response.take(0).map_err(|e| DbError::Select {
            message: e.to_string(),
        })?;

        convert_all(docs).map_err(|message| DbError::Select { message })
    }
}

impl<'a> TaskRepository for SurrealTaskRepository<'a> {
    async fn create(&self, task: &Task) -> DbResult<Task> {
        task.validate(WriteKind::Create)?;

        let created = Task {
            id: assign_id(task.id),
            ..task.clone()
        };

        bounded(self.timeout, Operation::Insert, async {
            self.db
                .query("CREATE type::thing('tasks', $uuid) CONTENT $doc")
                .bind(("uuid", created.id.to_string()))
                .bind(("doc", TaskDoc::from(&created)))
                .await
                .and_then(|response| response.check())
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
            let mut response = self
                .db
                .query(
                    "UPDATE tasks SET name = $name, price_per_single = $price, category = $category
                     WHERE uuid = $uuid RETURN AFTER",
                )
                .bind(("uuid", task.id.to_string()))
                .bind(("name", task.name.clone()))
                .bind(("price", task.price_per_single))
                .bind(("category", task.category))
                .await
                .map_err(|e| DbError::Update {
                    message: e.to_string(),
                })?;

            let updated: Vec<TaskDoc> = response.take(0).map_err(|e| DbError::Update {
                message: e.to_string(),
            })?;

            if updated.is_empty() {
                return Err(DbError::does_not_exist("Task", task.id));
            }

            Ok(task.clone())
        })
        .await
    }

    async fn delete(&self, id: Uuid) -> DbResult<()> {
        bounded(self.timeout, Operation::Delete, async {
            let mut response = self
                .db
                .query("DELETE tasks WHERE uuid = $uuid RETURN BEFORE")
                .bind(("uuid", id.to_string()))
                .await
                .map_err(|e| DbError::Delete {
                    message: e.to_string(),
                })?;

            let deleted: Vec<TaskDoc> = response.take(0).map_err(|e| DbError::Delete {
                message: e.to_string(),
            })?;

            if deleted.is_empty() {
                return Err(DbError::does_not_exist("Task", id));
            }

            Ok(())
        })
        .await
    }

    async fn get_by_id(&self, id: Uuid) -> DbResult<Task> {
        bounded(self.timeout, Operation::Select, async {
            self.select_one("SELECT * FROM tasks WHERE uuid = $key", id.to_string())
                .await
        })
        .await
    }

    async fn list(&self) -> DbResult<Vec<Task>> {
        bounded(self.timeout, Operation::Select, async {
            self.select_many("SELECT * FROM tasks ORDER BY name", None)
                .await
        })
        .await
    }

    async fn get_tasks_in_category(&self, category: i64) -> DbResult<Vec<Task>> {
        bounded(self.timeout, Operation::Select, async {
            self.select_many(
                "SELECT * FROM tasks WHERE category = $category ORDER BY name",
                Some(category),
            )
            .await
        })
        .await
    }

    async fn get_by_name(&self, name: &str) -> DbResult<Task> {
        bounded(self.timeout, Operation::Select, async {
            self.select_one("SELECT * FROM tasks WHERE name = $key LIMIT 1", name.to_string())
                .await
        })
        .await
    }
}
