//! Document shapes stored in SurrealDB.
//!
//! Record ids are SurrealDB `Thing`s; every document also carries its domain
//! id in a plain field (`uuid`, or `category_id` for categories) that queries
//! filter on. UUIDs and timestamps are stored as strings.

use serde::{Deserialize, Serialize};

use crate::db::utils::{format_timestamp, parse_timestamp, parse_uuid};
use crate::db::{Category, Order, OrderedTask, Task, User, Worker};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryDoc {
    pub category_id: i64,
    pub name: String,
}

impl From<CategoryDoc> for Category {
    fn from(doc: CategoryDoc) -> Self {
        Category {
            id: doc.category_id,
            name: doc.name,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskDoc {
    pub uuid: String,
    pub name: String,
    pub price_per_single: f64,
    pub category: i64,
}

impl From<&Task> for TaskDoc {
    fn from(task: &Task) -> Self {
        TaskDoc {
            uuid: task.id.to_string(),
            name: task.name.clone(),
            price_per_single: task.price_per_single,
            category: task.category,
        }
    }
}

impl TryFrom<TaskDoc> for Task {
    type Error = String;

    fn try_from(doc: TaskDoc) -> Result<Self, Self::Error> {
        Ok(Task {
            id: parse_uuid(&doc.uuid)?,
            name: doc.name,
            price_per_single: doc.price_per_single,
            category: doc.category,
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserDoc {
    pub uuid: String,
    pub name: String,
    pub surname: String,
    pub address: String,
    pub phone_number: String,
    pub email: String,
    pub password: String,
}

impl From<&User> for UserDoc {
    fn from(user: &User) -> Self {
        UserDoc {
            uuid: user.id.to_string(),
            name: user.name.clone(),
            surname: user.surname.clone(),
            address: user.address.clone(),
            phone_number: user.phone_number.clone(),
            email: user.email.clone(),
            password: user.password.clone(),
        }
    }
}

impl TryFrom<UserDoc> for User {
    type Error = String;

    fn try_from(doc: UserDoc) -> Result<Self, Self::Error> {
        Ok(User {
            id: parse_uuid(&doc.uuid)?,
            name: doc.name,
            surname: doc.surname,
            address: doc.address,
            phone_number: doc.phone_number,
            email: doc.email,
            password: doc.password,
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkerDoc {
    pub uuid: String,
    pub name: String,
    pub surname: String,
    pub address: String,
    pub phone_number: String,
    pub email: String,
    pub role: i32,
    pub password: String,
}

impl From<&Worker> for WorkerDoc {
    fn from(worker: &Worker) -> Self {
        WorkerDoc {
            uuid: worker.id.to_string(),
            name: worker.name.clone(),
            surname: worker.surname.clone(),
            address: worker.address.clone(),
            phone_number: worker.phone_number.clone(),
            email: worker.email.clone(),
            role: worker.role,
            password: worker.password.clone(),
        }
    }
}

impl TryFrom<WorkerDoc> for Worker {
    type Error = String;

    fn try_from(doc: WorkerDoc) -> Result<Self, Self::Error> {
        Ok(Worker {
            id: parse_uuid(&doc.uuid)?,
            name: doc.name,
            surname: doc.surname,
            address: doc.address,
            phone_number: doc.phone_number,
            email: doc.email,
            role: doc.role,
            password: doc.password,
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderDoc {
    pub uuid: String,
    /// Absent (NONE) when unassigned.
    #[serde(default)]
    pub worker_id: Option<String>,
    pub user_id: String,
    pub status: i32,
    pub address: String,
    pub creation_date: String,
    pub deadline: String,
    pub rate: i32,
}

impl From<&Order> for OrderDoc {
    fn from(order: &Order) -> Self {
        OrderDoc {
            uuid: order.id.to_string(),
            worker_id: order.worker_id.map(|id| id.to_string()),
            user_id: order.user_id.to_string(),
            status: order.status,
            address: order.address.clone(),
            creation_date: format_timestamp(&order.creation_date),
            deadline: format_timestamp(&order.deadline),
            rate: order.rate,
        }
    }
}

impl TryFrom<OrderDoc> for Order {
    type Error = String;

    fn try_from(doc: OrderDoc) -> Result<Self, Self::Error> {
        Ok(Order {
            id: parse_uuid(&doc.uuid)?,
            worker_id: doc.worker_id.as_deref().map(parse_uuid).transpose()?,
            user_id: parse_uuid(&doc.user_id)?,
            status: doc.status,
            address: doc.address,
            creation_date: parse_timestamp(&doc.creation_date)?,
            deadline: parse_timestamp(&doc.deadline)?,
            rate: doc.rate,
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderedTaskDoc {
    pub order_id: String,
    pub task_id: String,
    pub quantity: i32,
}

impl From<&OrderedTask> for OrderedTaskDoc {
    fn from(ordered: &OrderedTask) -> Self {
        OrderedTaskDoc {
            order_id: ordered.order_id.to_string(),
            task_id: ordered.task_id.to_string(),
            quantity: ordered.quantity,
        }
    }
}

impl TryFrom<OrderedTaskDoc> for OrderedTask {
    type Error = String;

    fn try_from(doc: OrderedTaskDoc) -> Result<Self, Self::Error> {
        Ok(OrderedTask {
            order_id: parse_uuid(&doc.order_id)?,
            task_id: parse_uuid(&doc.task_id)?,
            quantity: doc.quantity,
        })
    }
}

/// Convert a batch of documents, failing on the first malformed one.
pub fn convert_all<D, T>(docs: Vec<D>) -> Result<Vec<T>, String>
where
    T: TryFrom<D, Error = String>,
{
    docs.into_iter().map(T::try_from).collect()
}
