//! SurrealDB implementation of the database traits.
//!
//! Documents mirror the relational rows; see `documents` for the stored
//! shapes. Category ids come from a persisted counter (`sequence`).

mod category;
mod connection;
mod documents;
mod helpers;
mod order;
pub mod sequence;
mod task;
mod user;
mod worker;

#[cfg(test)]
mod repositories_test;

pub use category::SurrealCategoryRepository;
pub use connection::{Credentials, SurrealDatabase};
pub use order::SurrealOrderRepository;
pub use task::SurrealTaskRepository;
pub use user::SurrealUserRepository;
pub use worker::SurrealWorkerRepository;
