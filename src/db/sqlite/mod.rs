//! SQLite implementation of the database traits.
//!
//! This module provides a SQLite-backed implementation of the repository
//! traits defined in the parent module.

mod category;
mod connection;
mod helpers;
mod order;
mod task;
mod user;
mod worker;

#[cfg(test)]
mod worker_test;

pub use category::SqliteCategoryRepository;
pub use connection::SqliteDatabase;
pub use order::SqliteOrderRepository;
pub use task::SqliteTaskRepository;
pub use user::SqliteUserRepository;
pub use worker::SqliteWorkerRepository;
