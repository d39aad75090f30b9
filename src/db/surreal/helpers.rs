//! Shared helper functions for SurrealDB repositories.

use serde::Serialize;
use surrealdb::Surreal;
use surrealdb::engine::any::Any;
use surrealdb::method::Query;

use crate::db::{DbError, DbResult, FilterValue, OrderField, OrderFilter, Predicate};

/// Value thrown by a transactional delete script whose target is absent.
const MISSING_MARKER: &str = "taskmarket:missing-document";

/// Run a transactional delete script bound to `$uuid`.
///
/// The script must delete the target first and `THROW $missing` when that
/// delete removed nothing, which aborts the whole transaction. That case is
/// reported as `DoesNotExist`.
pub(crate) async fn run_delete_script(
    db: &Surreal<Any>,
    script: &str,
    entity_type: &str,
    id: String,
) -> DbResult<()> {
    let mut response = db
        .query(script)
        .bind(("uuid", id.clone()))
        .bind(("missing", MISSING_MARKER))
        .await
        .map_err(|e| DbError::Delete {
            message: e.to_string(),
        })?;

    let errors: Vec<String> = response
        .take_errors()
        .into_values()
        .map(|e| e.to_string())
        .collect();
    if errors.iter().any(|e| e.contains(MISSING_MARKER)) {
        return Err(DbError::does_not_exist(entity_type, id));
    }
    match errors.into_iter().next() {
        Some(message) => Err(DbError::Delete { message }),
        None => Ok(()),
    }
}

/// A value bound to a `$fN` parameter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Binding {
    One(FilterValue),
    Many(Vec<FilterValue>),
}

/// A rendered SurrealQL WHERE clause and its named parameters.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct WhereClause {
    pub sql: String,
    pub binds: Vec<(String, Binding)>,
}

/// Document field for an order column. The order id lives in `uuid`.
fn field_name(field: OrderField) -> &'static str {
    match field {
        OrderField::Id => "uuid",
        other => other.name(),
    }
}

fn is_null(field: &str) -> String {
    format!("({} = NONE OR {} = NULL)", field, field)
}

/// Render an order filter as SurrealQL. Field names come from the
/// `OrderField` whitelist; every literal becomes a `$fN` parameter.
pub fn build_filter_clause(filter: &OrderFilter) -> WhereClause {
    if filter.is_empty() {
        return WhereClause::default();
    }

    let mut parts = Vec::with_capacity(filter.conditions().len());
    let mut binds = Vec::new();

    for condition in filter.conditions() {
        let field = field_name(condition.field);
        let param = format!("f{}", binds.len());
        let part = match &condition.predicate {
            Predicate::IsNull => is_null(field),
            Predicate::IsNotNull => format!("({} != NONE AND {} != NULL)", field, field),
            Predicate::Equals(value) => {
                binds.push((param.clone(), Binding::One(value.clone())));
                format!("{} = ${}", field, param)
            }
            Predicate::In {
                values,
                include_null,
            } => {
                let mut alternatives = Vec::new();
                if !values.is_empty() {
                    binds.push((param.clone(), Binding::Many(values.clone())));
                    alternatives.push(format!("{} INSIDE ${}", field, param));
                }
                if *include_null {
                    alternatives.push(is_null(field));
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

/// Attach filter parameters to a query.
pub fn bind_filter_values<'r>(
    mut query: Query<'r, Any>,
    binds: Vec<(String, Binding)>,
) -> Query<'r, Any> {
    for bind in binds {
        query = query.bind(bind);
    }
    query
}
