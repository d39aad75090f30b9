use miette::Diagnostic;
use thiserror::Error;

use crate::db::DbError;

#[derive(Error, Diagnostic, Debug)]
pub enum CliError {
    #[error(transparent)]
    #[diagnostic(transparent)]
    Database(#[from] DbError),

    #[error("Invalid argument: {message}")]
    #[diagnostic(
        code(taskmarket::cli::invalid_argument),
        help("Ids of tasks, users, workers and orders are UUIDs; category ids are integers.")
    )]
    InvalidArgument { message: String },

    #[error("Failed to render output: {message}")]
    #[diagnostic(code(taskmarket::cli::output))]
    Output { message: String },

    #[error("Failed to create data directory: {0}")]
    #[diagnostic(code(taskmarket::cli::io))]
    Io(#[from] std::io::Error),
}

impl From<serde_json::Error> for CliError {
    fn from(e: serde_json::Error) -> Self {
        CliError::Output {
            message: e.to_string(),
        }
    }
}

pub type CliResult<T> = Result<T, CliError>;
