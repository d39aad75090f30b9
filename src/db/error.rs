//! Database error types.
//!
//! Every repository operation maps whatever the storage engine reports onto
//! exactly one of these variants, so callers never see a raw `sqlx` or
//! `surrealdb` error. The variants are shared by both backends.

use miette::Diagnostic;
use thiserror::Error;

/// Database operation errors.
#[derive(Error, Diagnostic, Debug)]
pub enum DbError {
    #[error("Insert operation was not successful: {message}")]
    #[diagnostic(code(taskmarket::db::insert))]
    Insert { message: String },

    #[error("Update operation was not successful: {message}")]
    #[diagnostic(code(taskmarket::db::update))]
    Update { message: String },

    #[error("Delete operation was not successful: {message}")]
    #[diagnostic(code(taskmarket::db::delete))]
    Delete { message: String },

    #[error("Select operation was not successful: {message}")]
    #[diagnostic(code(taskmarket::db::select))]
    Select { message: String },

    #[error("{entity_type} with id '{id}' does not exist")]
    #[diagnostic(code(taskmarket::db::does_not_exist))]
    DoesNotExist { entity_type: String, id: String },

    #[error("Connection error: {message}")]
    #[diagnostic(
        code(taskmarket::db::connection),
        help("Check the backend endpoint and credentials (TM_DB, TM_USER, TM_PASSWORD)")
    )]
    Connection { message: String },

    #[error("Transaction begin error: {message}")]
    #[diagnostic(code(taskmarket::db::transaction_begin))]
    TransactionBegin { message: String },

    #[error("Transaction rollback error: {message}")]
    #[diagnostic(code(taskmarket::db::transaction_rollback))]
    TransactionRollback { message: String },

    #[error("Transaction commit error: {message}")]
    #[diagnostic(code(taskmarket::db::transaction_commit))]
    TransactionCommit { message: String },

    #[error("Migration error: {message}")]
    #[diagnostic(code(taskmarket::db::migration))]
    Migration { message: String },
}

impl DbError {
    /// Shorthand for the not-found case.
    pub fn does_not_exist(entity_type: &str, id: impl ToString) -> Self {
        DbError::DoesNotExist {
            entity_type: entity_type.to_string(),
            id: id.to_string(),
        }
    }

    /// Whether this is the shared not-found sentinel.
    pub fn is_does_not_exist(&self) -> bool {
        matches!(self, DbError::DoesNotExist { .. })
    }
}

/// Result type for database operations.
pub type DbResult<T> = Result<T, DbError>;

/// The kind of work an operation performs, used to pick the error variant
/// when a failure is not specific to one statement (timeouts, row decoding).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Insert,
    Update,
    Delete,
    Select,
}

impl Operation {
    pub fn error(self, message: impl Into<String>) -> DbError {
        let message = message.into();
        match self {
            Operation::Insert => DbError::Insert { message },
            Operation::Update => DbError::Update { message },
            Operation::Delete => DbError::Delete { message },
            Operation::Select => DbError::Select { message },
        }
    }
}
