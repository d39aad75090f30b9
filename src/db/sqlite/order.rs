//! SQLite OrderRepository implementation.
//!
//! Orders and their task links (`order_contains_tasks`) are managed here.
//! Multi-row writes run inside a single transaction.

use std::collections::HashMap;
use std::time::Duration;

use sqlx::SqlitePool;
use sqlx::sqlite::SqliteRow;
use tracing::{debug, instrument};
use uuid::Uuid;

use super::helpers::{
    bind_filter_values, build_filter_clause, get, get_optional_uuid, get_timestamp, get_uuid,
    rollback_with,
};
use super::task::row_to_task;
use crate::db::utils::{
    assign_id, bounded, current_timestamp, format_timestamp, to_storage_precision,
};
use crate::db::{
    DEFAULT_QUANTITY, DbError, DbResult, Operation, Order, OrderFilter, OrderRepository,
    OrderedTask, Task, validate_quantity,
};

const ORDER_COLUMNS: &str = "id, worker_id, user_id, status, address, creation_date, deadline, rate";

/// SQLx-backed order repository.
pub struct SqliteOrderRepository<'a> {
    pub(crate) pool: &'a SqlitePool,
    pub(crate) timeout: Option<Duration>,
}

impl<'a> SqliteOrderRepository<'a> {
    async fn ensure_exists(&self, id: Uuid, op: Operation) -> DbResult<()> {
        let found: Option<i64> = sqlx::query_scalar("SELECT 1 FROM orders WHERE id = ?")
            .bind(id.to_string())
            .fetch_optional(self.pool)
            .await
            .map_err(|e| op.error(e.to_string()))?;

        match found {
            Some(_) => Ok(()),
            None => Err(DbError::does_not_exist("Order", id)),
        }
    }

    async fn fetch_orders(&self, sql: &str, user_id: Option<Uuid>) -> DbResult<Vec<Order>> {
        let mut query = sqlx::query(sql);
        if let Some(user_id) = user_id {
            query = query.bind(user_id.to_string());
        }

        let rows = query
            .fetch_all(self.pool)
            .await
            .map_err(|e| DbError::Select {
                message: e.to_string(),
            })?;

        rows.iter()
            .map(row_to_order)
            .collect::<Result<Vec<_>, _>>()
            .map_err(|message| DbError::Select { message })
    }
}

impl<'a> OrderRepository for SqliteOrderRepository<'a> {
    #[instrument(skip(self, order, ordered_tasks), fields(tasks = ordered_tasks.len()))]
    async fn create(&self, order: &Order, ordered_tasks: &[OrderedTask]) -> DbResult<Order> {
        for ordered in ordered_tasks {
            validate_quantity(ordered.quantity)?;
        }

        let created = Order {
            id: assign_id(order.id),
            creation_date: current_timestamp(),
            deadline: to_storage_precision(order.deadline),
            ..order.clone()
        };

        bounded(self.timeout, Operation::Insert, async {
            let mut tx = self
                .pool
                .begin()
                .await
                .map_err(|e| DbError::TransactionBegin {
                    message: e.to_string(),
                })?;

            let inserted = sqlx::query(
                "INSERT INTO orders (id, worker_id, user_id, status, address, creation_date, deadline, rate)
                 VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
            )
            .bind(created.id.to_string())
            .bind(created.worker_id.map(|id| id.to_string()))
            .bind(created.user_id.to_string())
            .bind(created.status)
            .bind(&created.address)
            .bind(format_timestamp(&created.creation_date))
            .bind(format_timestamp(&created.deadline))
            .bind(created.rate)
            .execute(&mut *tx)
            .await;

            if let Err(e) = inserted {
                let error = DbError::Insert {
                    message: e.to_string(),
                };
                return Err(rollback_with(tx, error).await);
            }

            for ordered in ordered_tasks {
                let linked = sqlx::query(
                    "INSERT INTO order_contains_tasks (order_id, task_id, quantity) VALUES (?, ?, ?)",
                )
                .bind(created.id.to_string())
                .bind(ordered.task_id.to_string())
                .bind(ordered.quantity)
                .execute(&mut *tx)
                .await;

                if let Err(e) = linked {
                    let error = DbError::Insert {
                        message: format!("task {}: {}", ordered.task_id, e),
                    };
                    return Err(rollback_with(tx, error).await);
                }
            }

            tx.commit().await.map_err(|e| DbError::TransactionCommit {
                message: e.to_string(),
            })?;

            debug!(order_id = %created.id, "Created order");
            Ok(created.clone())
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

            let unlinked = sqlx::query("DELETE FROM order_contains_tasks WHERE order_id = ?")
                .bind(&id)
                .execute(&mut *tx)
                .await;

            if let Err(e) = unlinked {
                let error = DbError::Delete {
                    message: e.to_string(),
                };
                return Err(rollback_with(tx, error).await);
            }

            let removed = sqlx::query("DELETE FROM orders WHERE id = ?")
                .bind(&id)
                .execute(&mut *tx)
                .await;

            let deleted = match removed {
                Ok(result) => result.rows_affected(),
                Err(e) => {
                    let error = DbError::Delete {
                        message: e.to_string(),
                    };
                    return Err(rollback_with(tx, error).await);
                }
            };

            if deleted == 0 {
                return Err(rollback_with(tx, DbError::does_not_exist("Order", &id)).await);
            }

            tx.commit().await.map_err(|e| DbError::TransactionCommit {
                message: e.to_string(),
            })?;

            Ok(())
        })
        .await
    }

    async fn update(&self, order: &Order) -> DbResult<Order> {
        let order = &Order {
            creation_date: to_storage_precision(order.creation_date),
            deadline: to_storage_precision(order.deadline),
            ..order.clone()
        };

        bounded(self.timeout, Operation::Update, async {
            let result = sqlx::query(
                "UPDATE orders SET worker_id = ?, user_id = ?, status = ?, address = ?,
                 creation_date = ?, deadline = ?, rate = ? WHERE id = ?",
            )
            .bind(order.worker_id.map(|id| id.to_string()))
            .bind(order.user_id.to_string())
            .bind(order.status)
            .bind(&order.address)
            .bind(format_timestamp(&order.creation_date))
            .bind(format_timestamp(&order.deadline))
            .bind(order.rate)
            .bind(order.id.to_string())
            .execute(self.pool)
            .await
            .map_err(|e| DbError::Update {
                message: e.to_string(),
            })?;

            if result.rows_affected() == 0 {
                return Err(DbError::does_not_exist("Order", order.id));
            }

            Ok(order.clone())
        })
        .await
    }

    async fn get_order_by_id(&self, id: Uuid) -> DbResult<Order> {
        bounded(self.timeout, Operation::Select, async {
            let row = sqlx::query(&format!(
                "SELECT {} FROM orders WHERE id = ?",
                ORDER_COLUMNS
            ))
            .bind(id.to_string())
            .fetch_optional(self.pool)
            .await
            .map_err(|e| DbError::Select {
                message: e.to_string(),
            })?;

            let row = row.ok_or_else(|| DbError::does_not_exist("Order", id))?;
            row_to_order(&row).map_err(|message| DbError::Select { message })
        })
        .await
    }

    async fn list(&self) -> DbResult<Vec<Order>> {
        bounded(self.timeout, Operation::Select, async {
            self.fetch_orders(
                &format!("SELECT {} FROM orders ORDER BY creation_date", ORDER_COLUMNS),
                None,
            )
            .await
        })
        .await
    }

    async fn get_tasks_in_order(&self, id: Uuid) -> DbResult<Vec<Task>> {
        bounded(self.timeout, Operation::Select, async {
            self.ensure_exists(id, Operation::Select).await?;

            let rows = sqlx::query(
                "SELECT l.task_id AS linked_id, t.id, t.name, t.price_per_single, t.category
                 FROM order_contains_tasks l
                 LEFT JOIN tasks t ON t.id = l.task_id
                 WHERE l.order_id = ?
                 ORDER BY t.name",
            )
            .bind(id.to_string())
            .fetch_all(self.pool)
            .await
            .map_err(|e| DbError::Select {
                message: e.to_string(),
            })?;

            let mut tasks = Vec::with_capacity(rows.len());
            for row in &rows {
                let present: Option<String> =
                    get(row, "id").map_err(|message| DbError::Select { message })?;
                if present.is_none() {
                    let linked: String =
                        get(row, "linked_id").map_err(|message| DbError::Select { message })?;
                    return Err(DbError::does_not_exist("Task", linked));
                }
                tasks.push(row_to_task(row).map_err(|message| DbError::Select { message })?);
            }

            Ok(tasks)
        })
        .await
    }

    async fn get_ordered_tasks(&self, id: Uuid) -> DbResult<Vec<OrderedTask>> {
        bounded(self.timeout, Operation::Select, async {
            self.ensure_exists(id, Operation::Select).await?;

            let rows = sqlx::query(
                "SELECT order_id, task_id, quantity FROM order_contains_tasks
                 WHERE order_id = ? ORDER BY task_id",
            )
            .bind(id.to_string())
            .fetch_all(self.pool)
            .await
            .map_err(|e| DbError::Select {
                message: e.to_string(),
            })?;

            rows.iter()
                .map(row_to_ordered_task)
                .collect::<Result<Vec<_>, _>>()
                .map_err(|message| DbError::Select { message })
        })
        .await
    }

    async fn get_current_order_by_user_id(&self, user_id: Uuid) -> DbResult<Order> {
        bounded(self.timeout, Operation::Select, async {
            let mut orders = self
                .fetch_orders(
                    &format!(
                        "SELECT {} FROM orders WHERE user_id = ? ORDER BY creation_date DESC LIMIT 1",
                        ORDER_COLUMNS
                    ),
                    Some(user_id),
                )
                .await?;

            orders
                .pop()
                .ok_or_else(|| DbError::does_not_exist("Order of user", user_id))
        })
        .await
    }

    async fn get_all_orders_by_user_id(&self, user_id: Uuid) -> DbResult<Vec<Order>> {
        bounded(self.timeout, Operation::Select, async {
            self.fetch_orders(
                &format!(
                    "SELECT {} FROM orders WHERE user_id = ? ORDER BY creation_date",
                    ORDER_COLUMNS
                ),
                Some(user_id),
            )
            .await
        })
        .await
    }

    async fn add_task_to_order(&self, order_id: Uuid, task_id: Uuid) -> DbResult<()> {
        bounded(self.timeout, Operation::Insert, async {
            self.ensure_exists(order_id, Operation::Insert).await?;
            validate_quantity(DEFAULT_QUANTITY)?;

            sqlx::query(
                "INSERT INTO order_contains_tasks (order_id, task_id, quantity) VALUES (?, ?, ?)",
            )
            .bind(order_id.to_string())
            .bind(task_id.to_string())
            .bind(DEFAULT_QUANTITY)
            .execute(self.pool)
            .await
            .map_err(|e| DbError::Insert {
                message: e.to_string(),
            })?;

            Ok(())
        })
        .await
    }

    async fn remove_task_from_order(&self, order_id: Uuid, task_id: Uuid) -> DbResult<()> {
        bounded(self.timeout, Operation::Delete, async {
            self.ensure_exists(order_id, Operation::Delete).await?;

            let result =
                sqlx::query("DELETE FROM order_contains_tasks WHERE order_id = ? AND task_id = ?")
                    .bind(order_id.to_string())
                    .bind(task_id.to_string())
                    .execute(self.pool)
                    .await
                    .map_err(|e| DbError::Delete {
                        message: e.to_string(),
                    })?;

            if result.rows_affected() == 0 {
                return Err(DbError::does_not_exist(
                    "OrderedTask",
                    format!("{}/{}", order_id, task_id),
                ));
            }

            Ok(())
        })
        .await
    }

    async fn update_task_quantity(
        &self,
        order_id: Uuid,
        task_id: Uuid,
        quantity: i32,
    ) -> DbResult<()> {
        bounded(self.timeout, Operation::Update, async {
            self.ensure_exists(order_id, Operation::Update).await?;

            let result = sqlx::query(
                "UPDATE order_contains_tasks SET quantity = ? WHERE order_id = ? AND task_id = ?",
            )
            .bind(quantity)
            .bind(order_id.to_string())
            .bind(task_id.to_string())
            .execute(self.pool)
            .await
            .map_err(|e| DbError::Update {
                message: e.to_string(),
            })?;

            if result.rows_affected() == 0 {
                return Err(DbError::does_not_exist(
                    "OrderedTask",
                    format!("{}/{}", order_id, task_id),
                ));
            }

            Ok(())
        })
        .await
    }

    async fn get_task_quantity(&self, order_id: Uuid, task_id: Uuid) -> DbResult<i32> {
        bounded(self.timeout, Operation::Select, async {
            let quantity: Option<i32> = sqlx::query_scalar(
                "SELECT quantity FROM order_contains_tasks WHERE order_id = ? AND task_id = ?",
            )
            .bind(order_id.to_string())
            .bind(task_id.to_string())
            .fetch_optional(self.pool)
            .await
            .map_err(|e| DbError::Select {
                message: e.to_string(),
            })?;

            quantity.ok_or_else(|| {
                DbError::does_not_exist("OrderedTask", format!("{}/{}", order_id, task_id))
            })
        })
        .await
    }

    #[instrument(skip(self))]
    async fn filter(&self, params: &HashMap<String, String>) -> DbResult<Vec<Order>> {
        let filter = OrderFilter::from_params(params)?;
        let clause = build_filter_clause(&filter);

        bounded(self.timeout, Operation::Select, async {
            let sql = format!(
                "SELECT {} FROM orders {} ORDER BY creation_date",
                ORDER_COLUMNS, clause.sql
            );
            debug!(sql = %sql, "Filtering orders");

            let rows = bind_filter_values(sqlx::query(&sql), clause.binds)
                .fetch_all(self.pool)
                .await
                .map_err(|e| DbError::Select {
                    message: e.to_string(),
                })?;

            rows.iter()
                .map(row_to_order)
                .collect::<Result<Vec<_>, _>>()
                .map_err(|message| DbError::Select { message })
        })
        .await
    }
}

fn row_to_order(row: &SqliteRow) -> Result<Order, String> {
    Ok(Order {
        id: get_uuid(row, "id")?,
        worker_id: get_optional_uuid(row, "worker_id")?,
        user_id: get_uuid(row, "user_id")?,
        status: get(row, "status")?,
        address: get(row, "address")?,
        creation_date: get_timestamp(row, "creation_date")?,
        deadline: get_timestamp(row, "deadline")?,
        rate: get(row, "rate")?,
    })
}

fn row_to_ordered_task(row: &SqliteRow) -> Result<OrderedTask, String> {
    Ok(OrderedTask {
        order_id: get_uuid(row, "order_id")?,
        task_id: get_uuid(row, "task_id")?,
        quantity: get(row, "quantity")?,
    })
}
