//! Domain models for the marketplace database.
//!
//! These models are storage-agnostic and represent the core entities
//! used throughout the application.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::db::{DbError, DbResult};

// =============================================================================
// Enumerated integers
// =============================================================================

/// Order status values. Transitions are driven by the caller; the storage
/// layer only persists the number.
pub mod order_status {
    pub const NO_STATUS: i32 = 0;
    pub const NEW: i32 = 1;
    pub const IN_PROGRESS: i32 = 2;
    pub const COMPLETED: i32 = 3;
    pub const CANCELLED: i32 = 4;
}

/// Worker role values.
pub mod worker_role {
    pub const MANAGER: i32 = 1;
    pub const MASTER: i32 = 2;
}

/// Sentinel for "not rated" in `Order::rate`.
pub const UNRATED: i32 = 0;

// =============================================================================
// Entities
// =============================================================================

/// A task category. Ids are integers generated by the backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: i64,
    pub name: String,
}

/// A unit of work that can be ordered.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub id: Uuid,
    pub name: String,
    pub price_per_single: f64,
    /// Category id. Not enforced as a foreign key.
    pub category: i64,
}

/// A customer placing orders.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub surname: String,
    pub address: String,
    pub phone_number: String,
    pub email: String,
    /// Opaque password hash.
    pub password: String,
}

/// A worker fulfilling orders.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Worker {
    pub id: Uuid,
    pub name: String,
    pub surname: String,
    pub address: String,
    pub phone_number: String,
    pub email: String,
    pub role: i32,
    pub password: String,
}

impl Worker {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.name, self.surname)
    }
}

/// An order placed by a user, optionally assigned to a worker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    pub id: Uuid,
    pub worker_id: Option<Uuid>,
    pub user_id: Uuid,
    pub status: i32,
    pub address: String,
    /// Assigned by the repository on create.
    pub creation_date: DateTime<Utc>,
    pub deadline: DateTime<Utc>,
    /// 0 means unrated.
    pub rate: i32,
}

/// Association row between an order and a task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderedTask {
    pub order_id: Uuid,
    pub task_id: Uuid,
    pub quantity: i32,
}

impl OrderedTask {
    /// Build an association for an order that does not exist yet.
    /// `order_id` is filled in by `OrderRepository::create`.
    pub fn new(task_id: Uuid, quantity: i32) -> Self {
        Self {
            order_id: Uuid::nil(),
            task_id,
            quantity,
        }
    }
}

/// Default quantity for `OrderRepository::add_task_to_order`.
pub const DEFAULT_QUANTITY: i32 = 1;

// =============================================================================
// Validation
// =============================================================================
//
// Both backends run the same checks before writing, so behavior does not
// depend on which store is deployed. Failures surface as the error kind of
// the calling operation (Insert for create, Update for update).

fn require(field: &str, value: &str, on_error: fn(String) -> DbError) -> DbResult<()> {
    if value.trim().is_empty() {
        return Err(on_error(format!("{} cannot be empty", field)));
    }
    Ok(())
}

fn insert_error(message: String) -> DbError {
    DbError::Insert { message }
}

fn update_error(message: String) -> DbError {
    DbError::Update { message }
}

/// Selects the error kind used by validation helpers.
#[derive(Debug, Clone, Copy)]
pub enum WriteKind {
    Create,
    Update,
}

impl WriteKind {
    fn on_error(self) -> fn(String) -> DbError {
        match self {
            WriteKind::Create => insert_error,
            WriteKind::Update => update_error,
        }
    }
}

impl Category {
    pub fn validate(&self, kind: WriteKind) -> DbResult<()> {
        require("category name", &self.name, kind.on_error())
    }
}

impl Task {
    pub fn validate(&self, kind: WriteKind) -> DbResult<()> {
        require("task name", &self.name, kind.on_error())
    }
}

impl User {
    pub fn validate(&self, kind: WriteKind) -> DbResult<()> {
        let on_error = kind.on_error();
        require("user name", &self.name, on_error)?;
        require("user surname", &self.surname, on_error)?;
        require("user email", &self.email, on_error)?;
        require("user password", &self.password, on_error)
    }
}

impl Worker {
    pub fn validate(&self, kind: WriteKind) -> DbResult<()> {
        let on_error = kind.on_error();
        require("worker name", &self.name, on_error)?;
        require("worker surname", &self.surname, on_error)?;
        require("worker email", &self.email, on_error)?;
        require("worker password", &self.password, on_error)
    }
}

/// Quantities below one are rejected when associations are created.
pub fn validate_quantity(quantity: i32) -> DbResult<()> {
    if quantity < 1 {
        return Err(DbError::Insert {
            message: format!("quantity must be at least 1, got {}", quantity),
        });
    }
    Ok(())
}
