//! SQLite CategoryRepository implementation.

use std::time::Duration;

use sqlx::SqlitePool;
use sqlx::sqlite::SqliteRow;

use super::helpers::get;
use crate::db::utils::bounded;
use crate::db::{Category, CategoryRepository, DbError, DbResult, Operation, WriteKind};

/// SQLx-backed category repository.
pub struct SqliteCategoryRepository<'a> {
    pub(crate) pool: &'a SqlitePool,
    pub(crate) timeout: Option<Duration>,
}

impl<'a> CategoryRepository for SqliteCategoryRepository<'a> {
    async fn create(&self, category: &Category) -> DbResult<Category> {
        category.validate(WriteKind::Create)?;

        bounded(self.timeout, Operation::Insert, async {
            let id: i64 = sqlx::query_scalar("INSERT INTO categories (name) VALUES (?) RETURNING id")
                .bind(&category.name)
                .fetch_one(self.pool)
                .await
                .map_err(|e| DbError::Insert {
                    message: e.to_string(),
                })?;

            Ok(Category {
                id,
                name: category.name.clone(),
            })
        })
        .await
    }

    async fn update(&self, category: &Category) -> DbResult<Category> {
        category.validate(WriteKind::Update)?;

        bounded(self.timeout, Operation::Update, async {
            let result = sqlx::query("UPDATE categories SET name = ? WHERE id = ?")
                .bind(&category.name)
                .bind(category.id)
                .execute(self.pool)
                .await
                .map_err(|e| DbError::Update {
                    message: e.to_string(),
                })?;

            if result.rows_affected() == 0 {
                return Err(DbError::does_not_exist("Category", category.id));
            }

            Ok(category.clone())
        })
        .await
    }

    async fn delete(&self, id: i64) -> DbResult<()> {
        bounded(self.timeout, Operation::Delete, async {
            let result = sqlx::query("DELETE FROM categories WHERE id = ?")
                .bind(id)
                .execute(self.pool)
                .await
                .map_err(|e| DbError::Delete {
                    message: e.to_string(),
                })?;

            if result.rows_affected() == 0 {
                return Err(DbError::does_not_exist("Category", id));
            }

            Ok(())
        })
        .await
    }

    async fn get_by_id(&self, id: i64) -> DbResult<Category> {
        bounded(self.timeout, Operation::Select, async {
            let row = sqlx::query("SELECT id, name FROM categories WHERE id = ?")
                .bind(id)
                .fetch_optional(self.pool)
                .await
                .map_err(|e| DbError::Select {
                    message: e.to_string(),
                })?;

            let row = row.ok_or_else(|| DbError::does_not_exist("Category", id))?;
            row_to_category(&row).map_err(|message| DbError::Select { message })
        })
        .await
    }

    async fn list(&self) -> DbResult<Vec<Category>> {
        bounded(self.timeout, Operation::Select, async {
            let rows = sqlx::query("SELECT id, name FROM categories ORDER BY id")
                .fetch_all(self.pool)
                .await
                .map_err(|e| DbError::Select {
                    message: e.to_string(),
                })?;

            rows.iter()
                .map(row_to_category)
                .collect::<Result<Vec<_>, _>>()
                .map_err(|message| DbError::Select { message })
        })
        .await
    }
}

fn row_to_category(row: &SqliteRow) -> Result<Category, String> {
    Ok(Category {
        id: get(row, "id")?,
        name: get(row, "name")?,
    })
}
