//! SQLite UserRepository implementation.

use std::time::Duration;

use sqlx::SqlitePool;
use sqlx::sqlite::SqliteRow;
use tracing::instrument;
use uuid::Uuid;

use super::helpers::{get, get_uuid, rollback_with};
use crate::db::utils::{assign_id, bounded};
use crate::db::{DbError, DbResult, Operation, User, UserRepository, WriteKind};

const USER_COLUMNS: &str = "id, name, surname, address, phone_number, email, password";

/// SQLx-backed user repository.
pub struct SqliteUserRepository<'a> {
    pub(crate) pool: &'a SqlitePool,
    pub(crate) timeout: Option<Duration>,
}

impl<'a> UserRepository for SqliteUserRepository<'a> {
    async fn create(&self, user: &User) -> DbResult<User> {
        user.validate(WriteKind::Create)?;

        let created = User {
            id: assign_id(user.id),
            ..user.clone()
        };

        bounded(self.timeout, Operation::Insert, async {
            sqlx::query(
                "INSERT INTO users (id, name, surname, address, phone_number, email, password)
                 VALUES (?, ?, ?, ?, ?, ?, ?)",
            )
            .bind(created.id.to_string())
            .bind(&created.name)
            .bind(&created.surname)
            .bind(&created.address)
            .bind(&created.phone_number)
            .bind(&created.email)
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

    async fn update(&self, user: &User) -> DbResult<User> {
        user.validate(WriteKind::Update)?;

        bounded(self.timeout, Operation::Update, async {
            let result = sqlx::query(
                "UPDATE users SET name = ?, surname = ?, address = ?, phone_number = ?, email = ?, password = ?
                 WHERE id = ?",
            )
            .bind(&user.name)
            .bind(&user.surname)
            .bind(&user.address)
            .bind(&user.phone_number)
            .bind(&user.email)
            .bind(&user.password)
            .bind(user.id.to_string())
            .execute(self.pool)
            .await
            .map_err(|e| DbError::Update {
                message: e.to_string(),
            })?;

            if result.rows_affected() == 0 {
                return Err(DbError::does_not_exist("User", user.id));
            }

            Ok(user.clone())
        })
        .await
    }

    #[instrument(skip(self))]
    async fn delete(&self, id: Uuid) -> DbResult<()> {
        bounded(self.timeout, Operation::Delete, async {
            let id = id.to_string();
            let mut tx = self
                .pool
                .begin()
                .await
                .map_err(|e| DbError::TransactionBegin {
                    message: e.to_string(),
                })?;

            // Task links of the user's orders, then the orders, then the user
            let statements = [
                "DELETE FROM order_contains_tasks
                 WHERE order_id IN (SELECT id FROM orders WHERE user_id = ?)",
                "DELETE FROM orders WHERE user_id = ?",
                "DELETE FROM users WHERE id = ?",
            ];

            let mut deleted_users = 0;
            for sql in statements {
                let result = sqlx::query(sql).bind(&id).execute(&mut *tx).await;
                match result {
                    Ok(result) => deleted_users = result.rows_affected(),
                    Err(e) => {
                        let error = DbError::Delete {
                            message: e.to_string(),
                        };
                        return Err(rollback_with(tx, error).await);
                    }
                }
            }

            if deleted_users == 0 {
                return Err(rollback_with(tx, DbError::does_not_exist("User", &id)).await);
            }

            tx.commit().await.map_err(|e| DbError::TransactionCommit {
                message: e.to_string(),
            })?;

            Ok(())
        })
        .await
    }

    async fn get_by_id(&self, id: Uuid) -> DbResult<User> {
        bounded(self.timeout, Operation::Select, async {
            let row = sqlx::query(&format!("SELECT {} FROM users WHERE id = ?", USER_COLUMNS))
                .bind(id.to_string())
                .fetch_optional(self.pool)
                .await
                .map_err(|e| DbError::Select {
                    message: e.to_string(),
                })?;

            let row = row.ok_or_else(|| DbError::does_not_exist("User", id))?;
            row_to_user(&row).map_err(|message| DbError::Select { message })
        })
        .await
    }

    async fn list(&self) -> DbResult<Vec<User>> {
        bounded(self.timeout, Operation::Select, async {
            let rows = sqlx::query(&format!(
                "SELECT {} FROM users ORDER BY surname, name",
                USER_COLUMNS
            ))
            .fetch_all(self.pool)
            .await
            .map_err(|e| DbError::Select {
                message: e.to_string(),
            })?;

            rows.iter()
                .map(row_to_user)
                .collect::<Result<Vec<_>, _>>()
                .map_err(|message| DbError::Select { message })
        })
        .await
    }

    async fn get_by_email(&self, email: &str) -> DbResult<User> {
        bounded(self.timeout, Operation::Select, async {
            let row = sqlx::query(&format!(
                "SELECT {} FROM users WHERE email = ?",
                USER_COLUMNS
            ))
            .bind(email)
            .fetch_optional(self.pool)
            .await
            .map_err(|e| DbError::Select {
                message: e.to_string(),
            })?;

            let row = row.ok_or_else(|| DbError::does_not_exist("User", email))?;
            row_to_user(&row).map_err(|message| DbError::Select { message })
        })
        .await
    }
}

fn row_to_user(row: &SqliteRow) -> Result<User, String> {
    Ok(User {
        id: get_uuid(row, "id")?,
        name: get(row, "name")?,
        surname: get(row, "surname")?,
        address: get(row, "address")?,
        phone_number: get(row, "phone_number")?,
        email: get(row, "email")?,
        password: get(row, "password")?,
    })
}
