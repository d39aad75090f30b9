//! Repository traits for data access abstraction.
//!
//! These traits define the contract for data access, allowing the SQL and
//! document backends to be swapped without changing business logic.
//!
//! Shared contract:
//! - `create` assigns an id when the entity carries a nil one and returns the
//!   stored entity.
//! - `update` never creates; a missing id yields `DbError::DoesNotExist`.
//! - `delete` of a missing id yields `DbError::DoesNotExist`.
//! - `get_*` lookups yield `DbError::DoesNotExist` when nothing matches, list
//!   lookups yield an empty `Vec`.

use std::collections::HashMap;
use std::future::Future;

use uuid::Uuid;

use crate::db::{
    DbResult,
    models::{Category, Order, OrderedTask, Task, User, Worker},
};

/// Repository for Category operations.
pub trait CategoryRepository: Send + Sync {
    /// Create a category. The id is always generated by the backend.
    fn create(&self, category: &Category) -> impl Future<Output = DbResult<Category>> + Send;

    /// Replace the name of an existing category.
    fn update(&self, category: &Category) -> impl Future<Output = DbResult<Category>> + Send;

    /// Delete a category by ID.
    fn delete(&self, id: i64) -> impl Future<Output = DbResult<()>> + Send;

    /// Get a category by ID.
    fn get_by_id(&self, id: i64) -> impl Future<Output = DbResult<Category>> + Send;

    /// Get all categories ordered by id.
    fn list(&self) -> impl Future<Output = DbResult<Vec<Category>>> + Send;
}

/// Repository for Task operations.
pub trait TaskRepository: Send + Sync {
    fn create(&self, task: &Task) -> impl Future<Output = DbResult<Task>> + Send;

    fn update(&self, task: &Task) -> impl Future<Output = DbResult<Task>> + Send;

    fn delete(&self, id: Uuid) -> impl Future<Output = DbResult<()>> + Send;

    fn get_by_id(&self, id: Uuid) -> impl Future<Output = DbResult<Task>> + Send;

    fn list(&self) -> impl Future<Output = DbResult<Vec<Task>>> + Send;

    /// Get all tasks in a category.
    fn get_tasks_in_category(
        &self,
        category: i64,
    ) -> impl Future<Output = DbResult<Vec<Task>>> + Send;

    /// Get a task by its exact name.
    fn get_by_name(&self, name: &str) -> impl Future<Output = DbResult<Task>> + Send;
}

/// Repository for User operations.
pub trait UserRepository: Send + Sync {
    fn create(&self, user: &User) -> impl Future<Output = DbResult<User>> + Send;

    fn update(&self, user: &User) -> impl Future<Output = DbResult<User>> + Send;

    /// Delete a user together with their orders and the orders' task links.
    fn delete(&self, id: Uuid) -> impl Future<Output = DbResult<()>> + Send;

    fn get_by_id(&self, id: Uuid) -> impl Future<Output = DbResult<User>> + Send;

    fn list(&self) -> impl Future<Output = DbResult<Vec<User>>> + Send;

    fn get_by_email(&self, email: &str) -> impl Future<Output = DbResult<User>> + Send;
}

/// Repository for Worker operations.
pub trait WorkerRepository: Send + Sync {
    fn create(&self, worker: &Worker) -> impl Future<Output = DbResult<Worker>> + Send;

    fn update(&self, worker: &Worker) -> impl Future<Output = DbResult<Worker>> + Send;

    /// Delete a worker. Orders assigned to the worker become unassigned.
    fn delete(&self, id: Uuid) -> impl Future<Output = DbResult<()>> + Send;

    fn get_by_id(&self, id: Uuid) -> impl Future<Output = DbResult<Worker>> + Send;

    fn list(&self) -> impl Future<Output = DbResult<Vec<Worker>>> + Send;

    fn get_by_email(&self, email: &str) -> impl Future<Output = DbResult<Worker>> + Send;

    fn get_workers_by_role(&self, role: i32)
    -> impl Future<Output = DbResult<Vec<Worker>>> + Send;

    /// Mean rate over the worker's completed, rated orders. 0 when none.
    fn get_average_order_rate(
        &self,
        worker: &Worker,
    ) -> impl Future<Output = DbResult<f64>> + Send;
}

/// Repository for Order operations, including the order/task association.
pub trait OrderRepository: Send + Sync {
    /// Create an order and its task links as one operation.
    fn create(
        &self,
        order: &Order,
        ordered_tasks: &[OrderedTask],
    ) -> impl Future<Output = DbResult<Order>> + Send;

    /// Delete an order and its task links.
    fn delete(&self, id: Uuid) -> impl Future<Output = DbResult<()>> + Send;

    fn update(&self, order: &Order) -> impl Future<Output = DbResult<Order>> + Send;

    fn get_order_by_id(&self, id: Uuid) -> impl Future<Output = DbResult<Order>> + Send;

    fn list(&self) -> impl Future<Output = DbResult<Vec<Order>>> + Send;

    /// Tasks linked to the order. Fails with `DoesNotExist` if any link
    /// points at a task that is gone.
    fn get_tasks_in_order(&self, id: Uuid) -> impl Future<Output = DbResult<Vec<Task>>> + Send;

    /// Association rows of the order, with quantities.
    fn get_ordered_tasks(
        &self,
        id: Uuid,
    ) -> impl Future<Output = DbResult<Vec<OrderedTask>>> + Send;

    /// Most recently created order of a user.
    fn get_current_order_by_user_id(
        &self,
        user_id: Uuid,
    ) -> impl Future<Output = DbResult<Order>> + Send;

    fn get_all_orders_by_user_id(
        &self,
        user_id: Uuid,
    ) -> impl Future<Output = DbResult<Vec<Order>>> + Send;

    /// Link a task to an existing order with quantity 1.
    fn add_task_to_order(
        &self,
        order_id: Uuid,
        task_id: Uuid,
    ) -> impl Future<Output = DbResult<()>> + Send;

    fn remove_task_from_order(
        &self,
        order_id: Uuid,
        task_id: Uuid,
    ) -> impl Future<Output = DbResult<()>> + Send;

    fn update_task_quantity(
        &self,
        order_id: Uuid,
        task_id: Uuid,
        quantity: i32,
    ) -> impl Future<Output = DbResult<()>> + Send;

    fn get_task_quantity(
        &self,
        order_id: Uuid,
        task_id: Uuid,
    ) -> impl Future<Output = DbResult<i32>> + Send;

    /// Orders matching free-form field/value parameters. See `db::filter`.
    fn filter(
        &self,
        params: &HashMap<String, String>,
    ) -> impl Future<Output = DbResult<Vec<Order>>> + Send;
}

/// Combined database interface.
///
/// Provides access to repositories via associated types, avoiding dynamic
/// dispatch. The backend is chosen once at startup and code above this layer
/// is generic over `D: Database`.
pub trait Database: Send + Sync {
    type Categories<'a>: CategoryRepository
    where
        Self: 'a;
    type Tasks<'a>: TaskRepository
    where
        Self: 'a;
    type Users<'a>: UserRepository
    where
        Self: 'a;
    type Workers<'a>: WorkerRepository
    where
        Self: 'a;
    type Orders<'a>: OrderRepository
    where
        Self: 'a;

    /// Create tables and indexes if they do not exist yet.
    fn migrate(&self) -> impl Future<Output = DbResult<()>> + Send;

    fn categories(&self) -> Self::Categories<'_>;

    fn tasks(&self) -> Self::Tasks<'_>;

    fn users(&self) -> Self::Users<'_>;

    fn workers(&self) -> Self::Workers<'_>;

    fn orders(&self) -> Self::Orders<'_>;
}
