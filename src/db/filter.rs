//! Order filter parsing.
//!
//! Turns free-form `field -> value` parameters (as they arrive from a query
//! string) into a backend-neutral [`OrderFilter`]. Each backend renders the
//! filter into its own parameterized query; input values never become part
//! of query text, and field names are restricted to the order columns.
//!
//! Value grammar per field:
//!
//! | value          | meaning                                  |
//! |----------------|------------------------------------------|
//! | `null`         | field is null                            |
//! | `not null`     | field is not null                        |
//! | `a,b,null`     | field is `a` or `b` or null              |
//! | anything else  | field equals the literal                 |
//!
//! `status` and `rate` literals are integers. Id fields must be UUIDs and
//! date fields RFC 3339 timestamps; both are rewritten to the exact text
//! storage holds, so any spelling of the same value matches. `address`
//! compares as exact text.

use std::collections::HashMap;
use std::str::FromStr;

use serde::Serialize;
use uuid::Uuid;

use crate::db::utils::{format_timestamp, parse_timestamp};
use crate::db::{DbError, DbResult};

const NULL_LITERAL: &str = "null";
const NOT_NULL_LITERAL: &str = "not null";

/// Filterable order columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum OrderField {
    Id,
    WorkerId,
    UserId,
    Status,
    Address,
    CreationDate,
    Deadline,
    Rate,
}

impl OrderField {
    /// Column / document field name.
    pub fn name(self) -> &'static str {
        match self {
            OrderField::Id => "id",
            OrderField::WorkerId => "worker_id",
            OrderField::UserId => "user_id",
            OrderField::Status => "status",
            OrderField::Address => "address",
            OrderField::CreationDate => "creation_date",
            OrderField::Deadline => "deadline",
            OrderField::Rate => "rate",
        }
    }

    fn is_integer(self) -> bool {
        matches!(self, OrderField::Status | OrderField::Rate)
    }

    fn is_uuid(self) -> bool {
        matches!(
            self,
            OrderField::Id | OrderField::WorkerId | OrderField::UserId
        )
    }

    fn is_timestamp(self) -> bool {
        matches!(self, OrderField::CreationDate | OrderField::Deadline)
    }
}

impl FromStr for OrderField {
    type Err = DbError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "id" => Ok(OrderField::Id),
            "worker_id" => Ok(OrderField::WorkerId),
            "user_id" => Ok(OrderField::UserId),
            "status" => Ok(OrderField::Status),
            "address" => Ok(OrderField::Address),
            "creation_date" => Ok(OrderField::CreationDate),
            "deadline" => Ok(OrderField::Deadline),
            "rate" => Ok(OrderField::Rate),
            _ => Err(DbError::Select {
                message: format!("Unknown order filter field: {}", s),
            }),
        }
    }
}

/// A literal to compare against.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum FilterValue {
    Int(i64),
    Text(String),
}

/// What a single field must satisfy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Predicate {
    IsNull,
    IsNotNull,
    Equals(FilterValue),
    /// Membership; `include_null` adds a null alternative.
    In {
        values: Vec<FilterValue>,
        include_null: bool,
    },
}

/// One field and its predicate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Condition {
    pub field: OrderField,
    pub predicate: Predicate,
}

/// Conjunction of conditions, ordered by field.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OrderFilter {
    conditions: Vec<Condition>,
}

impl OrderFilter {
    /// Parse query parameters. Any unknown field or malformed integer aborts
    /// the whole filter.
    pub fn from_params(params: &HashMap<String, String>) -> DbResult<Self> {
        let mut conditions = params
            .iter()
            .map(|(field, value)| parse_condition(field, value))
            .collect::<DbResult<Vec<_>>>()?;
        conditions.sort_by_key(|c| c.field);
        Ok(Self { conditions })
    }

    pub fn conditions(&self) -> &[Condition] {
        &self.conditions
    }

    pub fn is_empty(&self) -> bool {
        self.conditions.is_empty()
    }
}

fn parse_condition(field: &str, value: &str) -> DbResult<Condition> {
    let field = OrderField::from_str(field.trim())?;
    let members: Vec<&str> = value.split(',').map(str::trim).collect();

    let predicate = if members.len() > 1 {
        let mut values = Vec::with_capacity(members.len());
        let mut include_null = false;
        for member in members {
            if member == NULL_LITERAL {
                include_null = true;
            } else {
                values.push(parse_literal(field, member)?);
            }
        }
        Predicate::In {
            values,
            include_null,
        }
    } else {
        match members[0] {
            NULL_LITERAL => Predicate::IsNull,
            NOT_NULL_LITERAL => Predicate::IsNotNull,
            literal => Predicate::Equals(parse_literal(field, literal)?),
        }
    };

    Ok(Condition { field, predicate })
}

fn parse_literal(field: OrderField, literal: &str) -> DbResult<FilterValue> {
    let invalid = |e: String| DbError::Select {
        message: format!("Invalid {} value '{}': {}", field.name(), literal, e),
    };

    if field.is_integer() {
        literal
            .parse::<i64>()
            .map(FilterValue::Int)
            .map_err(|e| invalid(e.to_string()))
    } else if field.is_uuid() {
        Uuid::parse_str(literal)
            .map(|id| FilterValue::Text(id.to_string()))
            .map_err(|e| invalid(e.to_string()))
    } else if field.is_timestamp() {
        parse_timestamp(literal)
            .map(|ts| FilterValue::Text(format_timestamp(&ts)))
            .map_err(invalid)
    } else {
        Ok(FilterValue::Text(literal.to_string()))
    }
}
