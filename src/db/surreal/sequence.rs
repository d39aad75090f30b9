//! Named integer sequences for the document backend.
//!
//! Each sequence is one `counters` record. Incrementing and reading happen in
//! a single statement, so concurrent callers never observe the same value.

use std::time::Duration;

use serde::Deserialize;
use surrealdb::Surreal;
use surrealdb::engine::any::Any;
use tracing::debug;

use crate::db::{DbError, DbResult};

/// Sequence used for category ids.
pub const CATEGORY_SEQUENCE: &str = "categoryid";

const MAX_ATTEMPTS: u32 = 20;

#[derive(Debug, Deserialize)]
struct Counter {
    seq: i64,
}

async fn increment(db: &Surreal<Any>, name: &str) -> Result<i64, String> {
    let mut response = db
        .query("UPSERT type::thing('counters', $name) SET seq += 1 RETURN AFTER")
        .bind(("name", name.to_string()))
        .await
        .map_err(|e| e.to_string())?;

    let counter: Option<Counter> = response.take(0).map_err(|e| e.to_string())?;
    counter
        .map(|c| c.seq)
        .ok_or_else(|| format!("sequence '{}' returned no value", name))
}

/// Advance the named sequence and return its new value. The first call for a
/// name returns 1.
///
/// Concurrent increments of one counter can abort with a write conflict;
/// those attempts are retried.
pub async fn next_value(db: &Surreal<Any>, name: &str) -> DbResult<i64> {
    let mut attempt = 1;
    loop {
        match increment(db, name).await {
            Ok(value) => return Ok(value),
            Err(message) if attempt < MAX_ATTEMPTS => {
                debug!(sequence = name, attempt, error = %message, "Retrying sequence increment");
                tokio::time::sleep(Duration::from_millis(2 * u64::from(attempt))).await;
                attempt += 1;
            }
            Err(message) => return Err(DbError::Insert { message }),
        }
    }
}
