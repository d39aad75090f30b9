//! Shared helper functions for SQLite repositories.

use chrono::{DateTime, Utc};
use sqlx::sqlite::{SqliteArguments, SqliteRow};
use sqlx::{Row, Transaction};
use sqlx::{Sqlite, query::Query};
use tracing::warn;
use uuid::Uuid;

use crate::db::utils::{parse_timestamp, parse_uuid};
use crate::db::{DbError, FilterValue, OrderFilter, Predicate};

/// Roll back `tx` and hand back the error that caused it. A failed rollback
/// is reported instead of the original error.
pub async fn rollback_with(tx: Transaction<'_, Sqlite>, error: DbError) -> DbError {
    warn!(error = %error, "Rolling back transaction");
    match tx.rollback().await {
        Ok(()) => error,
        Err(e) => DbError::TransactionRollback {
            message: e.to_string(),
        },
    }
}

/// Read a TEXT column holding a UUID.
pub fn get_uuid(row: &SqliteRow, column: &str) -> Result<Uuid, String> {
    let raw: String = row.try_get(column).map_err(|e| e.to_string())?;
    parse_uuid(&raw)
}

/// Read a nullable TEXT column holding a UUID.
pub fn get_optional_uuid(row: &SqliteRow, column: &str) -> Result<Option<Uuid>, String> {
    let raw: Option<String> = row.try_get(column).map_err(|e| e.to_string())?;
    raw.as_deref().map(parse_uuid).transpose()
}

/// Read a TEXT column holding a timestamp.
pub fn get_timestamp(row: &SqliteRow, column: &str) -> Result<DateTime<Utc>, String> {
    let raw: String = row.try_get(column).map_err(|e| e.to_string())?;
    parse_timestamp(&raw)
}

/// Read any other column.
pub fn get<'r, T>(row: &'r SqliteRow, column: &str) -> Result<T, String>
where
    T: sqlx::Decode<'r, Sqlite> + sqlx::Type<Sqlite>,
{
    row.try_get(column).map_err(|e| e.to_string())
}

/// A rendered WHERE clause with `?` placeholders and the values to bind,
/// in placeholder order.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct WhereClause {
    pub sql: String,
    pub binds: Vec<FilterValue>,
}

/// Render an order filter as SQL. Column names come from the `OrderField`
/// whitelist; every literal becomes a bind parameter.
pub fn build_filter_clause(filter: &OrderFilter) -> WhereClause {
    if filter.is_empty() {
        return WhereClause::default();
    }

    let mut parts = Vec::with_capacity(filter.conditions().len());
    let mut binds = Vec::new();

    for condition in filter.conditions() {
        let column = condition.field.name();
        let part = match &condition.predicate {
            Predicate::IsNull => format!("{} IS NULL", column),
            Predicate::IsNotNull => format!("{} IS NOT NULL", column),
            Predicate::Equals(value) => {
                binds.push(value.clone());
                format!("{} = ?", column)
            }
            Predicate::In {
                values,
                include_null,
            } => {
                let mut alternatives = Vec::new();
                if !values.is_empty() {
                    let placeholders = vec!["?"; values.len()].join(", ");
                    alternatives.push(format!("{} IN ({})", column, placeholders));
                    binds.extend(values.iter().cloned());
                }
                if *include_null {
                    alternatives.push(format!("{} IS NULL", column));
                }
                format!("({})", alternatives.join(" OR "))
            }
        };
        parts.push(part);
    }

    WhereClause {
        sql: format!("WHERE {}", parts.join(" AND ")),
        binds,
    }
}

/// Attach filter values to a query in order.
pub fn bind_filter_values<'q>(
    mut query: Query<'q, Sqlite, SqliteArguments<'q>>,
    values: Vec<FilterValue>,
) -> Query<'q, Sqlite, SqliteArguments<'q>> {
    for value in values {
        query = match value {
            FilterValue::Int(v) => query.bind(v),
            FilterValue::Text(v) => query.bind(v),
        };
    }
    query
}
