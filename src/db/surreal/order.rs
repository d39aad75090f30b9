//! SurrealDB OrderRepository implementation.
//!
//! Association documents live in `order_contains_tasks`, one per
//! (order, task) pair, guarded by a unique index. Writes touching several
//! documents run as one SurrealQL transaction.

use std::collections::HashMap;
use std::time::Duration;

use surrealdb::Surreal;
use surrealdb::engine::any::Any;
use tracing::{debug, instrument};
use uuid::Uuid;

use super::documents::{OrderDoc, OrderedTaskDoc, TaskDoc, convert_all};
use super::helpers::{bind_filter_values, build_filter_clause, run_delete_script};
use crate::db::utils::{assign_id, bounded, current_timestamp, to_storage_precision};
use crate::db::{
    DEFAULT_QUANTITY, DbError, DbResult, Operation, Order, OrderFilter, OrderRepository,
    OrderedTask, Task, validate_quantity,
};

/// Document-backed order repository.
pub struct SurrealOrderRepository<'a> {
    pub(crate) db: &'a Surreal<Any>,
    pub(crate) timeout: Option<Duration>,
}

fn pair_key(order_id: Uuid, task_id: Uuid) -> String {
    format!("{}/{}", order_id, task_id)
}

impl<'a> SurrealOrderRepository<'a> {
    async fn ensure_exists(&self, id: Uuid, op: Operation) -> DbResult<()> {
        let mut response = self
            .db
            .query("SELECT VALUE uuid FROM orders WHERE uuid = $uuid")
            .bind(("uuid", id.to_string()))
            .await
            .map_err(|e| op.error(e.to_string()))?;

        let found: Vec<String> = response.take(0).map_err(|e| op.error(e.to_string()))?;
        if found.is_empty() {
            return Err(DbError::does_not_exist("Order", id));
        }
        Ok(())
    }

    async fn select_orders(&self, sql: &str, user_id: Option<Uuid>) -> DbResult<Vec<Order>> {
        let mut query = self.db.query(sql);
        if let Some(user_id) = user_id {
            query = query.bind(("user_id", user_id.to_string()));
        }

        let mut response = query.await.map_err(|e| DbError::Select {
            message: e.to_string(),
        })?;

        let docs: Vec<OrderDoc> = response.take(0).map_err(|e| DbError::Select {
            message: e.to_string(),
        })?;

        convert_all(docs).map_err(|message| DbError::Select { message })
    }

    async fn select_links(&self, id: Uuid) -> DbResult<Vec<OrderedTask>> {
        let mut response = self
            .db
            .query("SELECT * FROM order_contains_tasks WHERE order_id = $uuid ORDER BY task_id")
            .bind(("uuid", id.to_string()))
            .await
            .map_err(|e| DbError::Select {
                message: e.to_string(),
            })?;

        let docs: Vec<OrderedTaskDoc> = response.take(0).map_err(|e| DbError::Select {
            message: e.to_string(),
        })?;

        convert_all(docs).map_err(|message| DbError::Select { message })
    }
}

impl<'a> OrderRepository for SurrealOrderRepository<'a> {
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
        let links: Vec<OrderedTaskDoc> = ordered_tasks
            .iter()
            .map(|ordered| {
                OrderedTaskDoc::from(&OrderedTask {
                    order_id: created.id,
                    ..ordered.clone()
                })
            })
            .collect();

        bounded(self.timeout, Operation::Insert, async {
            self.db
                .query(
                    "BEGIN TRANSACTION;
                     CREATE type::thing('orders', $uuid) CONTENT $order;
                     FOR $link IN $links {
                         CREATE order_contains_tasks CONTENT $link;
                     };
                     COMMIT TRANSACTION;",
                )
                .bind(("uuid", created.id.to_string()))
                .bind(("order", OrderDoc::from(&created)))
                .bind(("links", links))
                .await
                .and_then(|response| response.check())
                .map_err(|e| DbError::Insert {
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
            run_delete_script(
                self.db,
                "BEGIN TRANSACTION;
                 LET $gone = (DELETE orders WHERE uuid = $uuid RETURN BEFORE);
                 IF array::len($gone) = 0 { THROW $missing; };
                 DELETE order_contains_tasks WHERE order_id = $uuid;
                 COMMIT TRANSACTION;",
                "Order",
                id.to_string(),
            )
            .await
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
            // CONTENT replaces the whole document, so an unassigned worker is dropped
            let mut response = self
                .db
                .query("UPDATE orders CONTENT $order WHERE uuid = $uuid RETURN AFTER")
                .bind(("uuid", order.id.to_string()))
                .bind(("order", OrderDoc::from(order)))
                .await
                .map_err(|e| DbError::Update {
                    message: e.to_string(),
                })?;

            let updated: Vec<OrderDoc> = response.take(0).map_err(|e| DbError::Update {
                message: e.to_string(),
            })?;

            if updated.is_empty() {
                return Err(DbError::does_not_exist("Order", order.id));
            }

            Ok(order.clone())
        })
        .await
    }

    async fn get_order_by_id(&self, id: Uuid) -> DbResult<Order> {
        bounded(self.timeout, Operation::Select, async {
            let mut response = self
                .db
                .query("SELECT * FROM orders WHERE uuid = $uuid")
                .bind(("uuid", id.to_string()))
                .await
                .map_err(|e| DbError::Select {
                    message: e.to_string(),
                })?;

            let found: Option<OrderDoc> = response.take(0).map_err(|e| DbError::Select {
                message: e.to_string(),
            })?;

            let doc = found.ok_or_else(|| DbError::does_not_exist("Order", id))?;
            Order::try_from(doc).map_err(|message| DbError::Select { message })
        })
        .await
    }

    async fn list(&self) -> DbResult<Vec<Order>> {
        bounded(self.timeout, Operation::Select, async {
            self.select_orders("SELECT * FROM orders ORDER BY creation_date", None)
                .await
        })
        .await
    }

    async fn get_tasks_in_order(&self, id: Uuid) -> DbResult<Vec<Task>> {
        bounded(self.timeout, Operation::Select, async {
            self.ensure_exists(id, Operation::Select).await?;

            let links = self.select_links(id).await?;
            if links.is_empty() {
                return Ok(Vec::new());
            }

            let ids: Vec<String> = links.iter().map(|l| l.task_id.to_string()).collect();
            let mut response = self
                .db
                .query("SELECT * FROM tasks WHERE uuid INSIDE $ids")
                .bind(("ids", ids))
                .await
                .map_err(|e| DbError::Select {
                    message: e.to_string(),
                })?;

            let docs: Vec<TaskDoc> = response.take(0).map_err(|e| DbError::Select {
                message: e.to_string(),
            })?;
            let mut found: HashMap<Uuid, Task> = convert_all::<TaskDoc, Task>(docs)
                .map_err(|message| DbError::Select { message })?
                .into_iter()
                .map(|task| (task.id, task))
                .collect();

            let mut tasks = links
                .iter()
                .map(|link| {
                    found
                        .remove(&link.task_id)
                        .ok_or_else(|| DbError::does_not_exist("Task", link.task_id))
                })
                .collect::<DbResult<Vec<_>>>()?;
            tasks.sort_by(|a, b| a.name.cmp(&b.name));

            Ok(tasks)
        })
        .await
    }

    async fn get_ordered_tasks(&self, id: Uuid) -> DbResult<Vec<OrderedTask>> {
        bounded(self.timeout, Operation::Select, async {
            self.ensure_exists(id, Operation::Select).await?;
            self.select_links(id).await
        })
        .await
    }

    async fn get_current_order_by_user_id(&self, user_id: Uuid) -> DbResult<Order> {
        bounded(self.timeout, Operation::Select, async {
            let mut orders = self
                .select_orders(
                    "SELECT * FROM orders WHERE user_id = $user_id
                     ORDER BY creation_date DESC LIMIT 1",
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
            self.select_orders(
                "SELECT * FROM orders WHERE user_id = $user_id ORDER BY creation_date",
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

            let link = OrderedTaskDoc::from(&OrderedTask {
                order_id,
                task_id,
                quantity: DEFAULT_QUANTITY,
            });

            self.db
                .query("CREATE order_contains_tasks CONTENT $link")
                .bind(("link", link))
                .await
                .and_then(|response| response.check())
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

            let mut response = self
                .db
                .query(
                    "DELETE order_contains_tasks WHERE order_id = $order AND task_id = $task
                     RETURN BEFORE",
                )
                .bind(("order", order_id.to_string()))
                .bind(("task", task_id.to_string()))
                .await
                .map_err(|e| DbError::Delete {
                    message: e.to_string(),
                })?;

            let removed: Vec<OrderedTaskDoc> = response.take(0).map_err(|e| DbError::Delete {
                message: e.to_string(),
            })?;

            if removed.is_empty() {
                return Err(DbError::does_not_exist(
                    "OrderedTask",
                    pair_key(order_id, task_id),
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

            let mut response = self
                .db
                .query(
                    "UPDATE order_contains_tasks SET quantity = $quantity
                     WHERE order_id = $order AND task_id = $task RETURN AFTER",
                )
                .bind(("order", order_id.to_string()))
                .bind(("task", task_id.to_string()))
                .bind(("quantity", quantity))
                .await
                .map_err(|e| DbError::Update {
                    message: e.to_string(),
                })?;

            let updated: Vec<OrderedTaskDoc> = response.take(0).map_err(|e| DbError::Update {
                message: e.to_string(),
            })?;

            if updated.is_empty() {
                return Err(DbError::does_not_exist(
                    "OrderedTask",
                    pair_key(order_id, task_id),
                ));
            }

            Ok(())
        })
        .await
    }

    async fn get_task_quantity(&self, order_id: Uuid, task_id: Uuid) -> DbResult<i32> {
        bounded(self.timeout, Operation::Select, async {
            let mut response = self
                .db
                .query(
                    "SELECT VALUE quantity FROM order_contains_tasks
                     WHERE order_id = $order AND task_id = $task",
                )
                .bind(("order", order_id.to_string()))
                .bind(("task", task_id.to_string()))
                .await
                .map_err(|e| DbError::Select {
                    message: e.to_string(),
                })?;

            let quantities: Vec<i32> = response.take(0).map_err(|e| DbError::Select {
                message: e.to_string(),
            })?;

            quantities.into_iter().next().ok_or_else(|| {
                DbError::does_not_exist("OrderedTask", pair_key(order_id, task_id))
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
                "SELECT * FROM orders {} ORDER BY creation_date",
                clause.sql
            );
            debug!(sql = %sql, "Filtering orders");

            let mut response = bind_filter_values(self.db.query(sql), clause.binds)
                .await
                .map_err(|e| DbError::Select {
                    message: e.to_string(),
                })?;

            let docs: Vec<OrderDoc> = response.take(0).map_err(|e| DbError::Select {
                message: e.to_string(),
            })?;

            convert_all(docs).map_err(|message| DbError::Select { message })
        })
        .await
    }
}
