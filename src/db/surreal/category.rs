//! SurrealDB CategoryRepository implementation.

use std::time::Duration;

use surrealdb::Surreal;
use surrealdb::engine::any::Any;

use super::documents::CategoryDoc;
use super::sequence::{CATEGORY_SEQUENCE, next_value};
use crate::db::utils::bounded;
use crate::db::{Category, CategoryRepository, DbError, DbResult, Operation, WriteKind};

/// Document-backed category repository. Ids come from the `categoryid`
/// sequence.
pub struct SurrealCategoryRepository<'a> {
    pub(crate) db: &'a Surreal<Any>,
    pub(crate) timeout: Option<Duration>,
}

impl<'a> CategoryRepository for SurrealCategoryRepository<'a> {
    async fn create(&self, category: &Category) -> DbResult<Category> {
        category.validate(WriteKind::Create)?;

        bounded(self.timeout, Operation::Insert, async {
            let id = next_value(self.db, CATEGORY_SEQUENCE).await?;
            let doc = CategoryDoc {
                category_id: id,
                name: category.name.clone(),
            };

            self.db
                .query("CREATE type::thing('categories', $id) CONTENT $doc")
                .bind(("id", id))
                .bind(("doc", doc.clone()))
                .await
                .and_then(|response| response.check())
                .map_err(|e| DbError::Insert {
                    message: e.to_string(),
                })?;

            Ok(Category::from(doc))
        })
        .await
    }

    async fn update(&self, category: &Category) -> DbResult<Category> {
        category.validate(WriteKind::Update)?;

        bounded(self.timeout, Operation::Update, async {
            let mut response = self
                .db
                .query("UPDATE categories SET name = $name WHERE category_id = $id RETURN AFTER")
                .bind(("id", category.id))
                .bind(("name", category.name.clone()))
                .await
                .map_err(|e| DbError::Update {
                    message: e.to_string(),
                })?;

            let updated: Vec<CategoryDoc> = response.take(0).map_err(|e| DbError::Update {
                message: e.to_string(),
            })?;

            updated
                .into_iter()
                .next()
                .map(Category::from)
                .ok_or_else(|| DbError::does_not_exist("Category", category.id))
        })
        .await
    }

    async fn delete(&self, id: i64) -> DbResult<()> {
        bounded(self.timeout, Operation::Delete, async {
            let mut response = self
                .db
                .query("DELETE categories WHERE category_id = $id RETURN BEFORE")
                .bind(("id", id))
                .await
                .map_err(|e| DbError::Delete {
                    message: e.to_string(),
                })?;

            let deleted: Vec<CategoryDoc> = response.take(0).map_err(|e| DbError::Delete {
                message: e.to_string(),
            })?;

            if deleted.is_empty() {
                return Err(DbError::does_not_exist("Category", id));
            }

            Ok(())
        })
        .await
    }

    async fn get_by_id(&self, id: i64) -> DbResult<Category> {
        bounded(self.timeout, Operation::Select, async {
            let mut response = self
                .db
                .query("SELECT * FROM categories WHERE category_id = $id")
                .bind(("id", id))
                .await
                .map_err(|e| DbError::Select {
                    message: e.to_string(),
                })?;

            let found: Option<CategoryDoc> = response.take(0).map_err(|e| DbError::Select {
                message: e.to_string(),
            })?;

            found
                .map(Category::from)
                .ok_or_else(|| DbError::does_not_exist("Category", id))
        })
        .await
    }

    async fn list(&self) -> DbResult<Vec<Category>> {
        bounded(self.timeout, Operation::Select, async {
            let mut response = self
                .db
                .query("SELECT * FROM categories ORDER BY category_id")
                .await
                .map_err(|e| DbError::Select {
                    message: e.to_string(),
                })?;

            let docs: Vec<CategoryDoc> = response.take(0).map_err(|e| DbError::Select {
                message: e.to_string(),
            })?;

            Ok(docs.into_iter().map(Category::from).collect())
        })
        .await
    }
}
