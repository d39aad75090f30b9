//! SurrealDB UserRepository implementation.

use std::time::Duration;

use surrealdb::Surreal;
use surrealdb::engine::any::Any;
use tracing::instrument;
use uuid::Uuid;

use super::documents::{UserDoc, convert_all};
use super::helpers::run_delete_script;
use crate::db::utils::{assign_id, bounded};
use crate::db::{DbError, DbResult, Operation, User, UserRepository, WriteKind};

/// Document-backed user repository.
pub struct SurrealUserRepository<'a> {
    pub(crate) db: &'a Surreal<Any>,
    pub(crate) timeout: Option<Duration>,
}

impl<'a> SurrealUserRepository<'a> {
    async fn select_one(&self, sql: &str, key: String) -> DbResult<User> {
        let mut response = self
            .db
            .query(sql)
            .bind(("key", key.clone()))
            .await
            .map_err(|e| DbError::Select {
                message: e.to_string(),
            })?;

        let found: Option<UserDoc> = response.take(0).map_err(|e| DbError::Select {
            message: e.to_string(),
        })?;

        let doc = found.ok_or_else(|| DbError::does_not_exist("User", &key))?;
        User::try_from(doc).map_err(|message| DbError::Select { message })
    }
}

impl<'a> UserRepository for SurrealUserRepository<'a> {
    async fn create(&self, user: &User) -> DbResult<User> {
        user.validate(WriteKind::Create)?;

        let created = User {
            id: assign_id(user.id),
            ..user.clone()
        };

        bounded(self.timeout, Operation::Insert, async {
            self.db
                .query("CREATE type::thing('users', $uuid) CONTENT $doc")
                .bind(("uuid", created.id.to_string()))
                .bind(("doc", UserDoc::from(&created)))
                .await
                .and_then(|response| response.check())
                .map_err(|e| DbError::Insert {
                    message: e.to_string(),
                })?;

            Ok(created.clone())
        })
        .await
    }

    async fn update(&self, user: &User) -> DbResult<User> {
        user.validate(WriteKind::Update)?;

        bounded(self.timeout, Operation::Update, async {
            let mut response = self
                .db
                .query("UPDATE users MERGE $doc WHERE uuid = $uuid RETURN AFTER")
                .bind(("uuid", user.id.to_string()))
                .bind(("doc", UserDoc::from(user)))
                .await
                .map_err(|e| DbError::Update {
                    message: e.to_string(),
                })?;

            let updated: Vec<UserDoc> = response.take(0).map_err(|e| DbError::Update {
                message: e.to_string(),
            })?;

            if updated.is_empty() {
                return Err(DbError::does_not_exist("User", user.id));
            }

            Ok(user.clone())
        })
        .await
    }

    #[instrument(skip(self))]
    async fn delete(&self, id: Uuid) -> DbResult<()> {
        bounded(self.timeout, Operation::Delete, async {
            // The user, then the task links of their orders, then the orders
            run_delete_script(
                self.db,
                "BEGIN TRANSACTION;
                 LET $gone = (DELETE users WHERE uuid = $uuid RETURN BEFORE);
                 IF array::len($gone) = 0 { THROW $missing; };
                 LET $orders = (SELECT VALUE uuid FROM orders WHERE user_id = $uuid);
                 DELETE order_contains_tasks WHERE order_id INSIDE $orders;
                 DELETE orders WHERE user_id = $uuid;
                 COMMIT TRANSACTION;",
                "User",
                id.to_string(),
            )
            .await
        })
        .await
    }

    async fn get_by_id(&self, id: Uuid) -> DbResult<User> {
        bounded(self.timeout, Operation::Select, async {
            self.select_one("SELECT * FROM users WHERE uuid = $key", id.to_string())
                .await
        })
        .await
    }

    async fn list(&self) -> DbResult<Vec<User>> {
        bounded(self.timeout, Operation::Select, async {
            let mut response = self
                .db
                .query("SELECT * FROM users ORDER BY surname, name")
                .await
                .map_err(|e| DbError::Select {
                    message: e.to_string(),
                })?;

            let docs: Vec<UserDoc> = response.take(0).map_err(|e| DbError::Select {
                message: e.to_string(),
            })?;

            convert_all(docs).map_err(|message| DbError::Select { message })
        })
        .await
    }

    async fn get_by_email(&self, email: &str) -> DbResult<User> {
        bounded(self.timeout, Operation::Select, async {
            self.select_one("SELECT * FROM users WHERE email = $key", email.to_string())
                .await
        })
        .await
    }
}
