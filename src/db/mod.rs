//! Database abstraction layer.
//!
//! This module provides trait-based abstractions for data access, with two
//! interchangeable storage backends: a SQL database (SQLite via sqlx) and a
//! document database (SurrealDB). Exactly one is opened per process.
//!
//! # Architecture
//!
//! - `error`: Storage-agnostic error taxonomy
//! - `models`: Domain entities (Category, Task, User, Worker, Order, OrderedTask)
//! - `repository`: Trait definitions for data access
//! - `filter`: Parsing of free-form order filters
//! - `sqlite` / `surreal`: Backend implementations

mod error;
mod filter;
mod models;
mod repository;
pub mod sqlite;
pub mod surreal;
pub mod utils;

#[cfg(test)]
pub(crate) mod fixtures;
#[cfg(test)]
mod filter_test;

pub use error::{DbError, DbResult, Operation};
pub use filter::{Condition, FilterValue, OrderField, OrderFilter, Predicate};
pub use models::*;
pub use repository::*;
pub use sqlite::SqliteDatabase;
pub use surreal::SurrealDatabase;
