//! Database utility functions.

use std::future::Future;
use std::time::Duration;

use chrono::{DateTime, SecondsFormat, SubsecRound, Utc};
use uuid::Uuid;

use crate::db::{DbResult, Operation};

/// Keep a caller-supplied id, or generate one when it is nil.
pub fn assign_id(id: Uuid) -> Uuid {
    if id.is_nil() { Uuid::new_v4() } else { id }
}

/// Current time at the precision timestamps are stored with.
pub fn current_timestamp() -> DateTime<Utc> {
    to_storage_precision(Utc::now())
}

/// Drop the sub-microsecond part, which storage does not keep.
pub fn to_storage_precision(ts: DateTime<Utc>) -> DateTime<Utc> {
    ts.trunc_subsecs(6)
}

//
// TIMESTAMP STORAGE
//
// Both backends persist timestamps as RFC 3339 text with exactly six
// fractional digits and a `Z` suffix, e.g. `2025-01-01T09:30:00.000000Z`.
// Fixed width keeps lexicographic order equal to chronological order, which
// `get_current_order_by_user_id` relies on.
//

/// Format a timestamp for storage.
pub fn format_timestamp(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Micros, true)
}

/// Parse a stored timestamp.
pub fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>, String> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| format!("Invalid timestamp '{}': {}", raw, e))
}

/// Parse a stored UUID.
pub fn parse_uuid(raw: &str) -> Result<Uuid, String> {
    Uuid::parse_str(raw).map_err(|e| format!("Invalid uuid '{}': {}", raw, e))
}

/// Run a repository operation under an optional deadline.
///
/// An elapsed deadline is reported with the error kind of the operation.
/// The future is dropped on timeout, which rolls back any open SQL
/// transaction.
pub async fn bounded<T, F>(limit: Option<Duration>, op: Operation, fut: F) -> DbResult<T>
where
    F: Future<Output = DbResult<T>>,
{
    match limit {
        Some(limit) => match tokio::time::timeout(limit, fut).await {
            Ok(result) => result,
            Err(_) => Err(op.error(format!(
                "operation timed out after {} ms",
                limit.as_millis()
            ))),
        },
        None => fut.await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::DbError;

    #[test]
    fn assign_id_preserves_non_nil() {
        let id = Uuid::new_v4();
        assert_eq!(assign_id(id), id);
    }

    #[test]
    fn assign_id_generates_for_nil() {
        assert!(!assign_id(Uuid::nil()).is_nil());
    }

    #[test]
    fn timestamp_roundtrips_through_storage_format() {
        let now = current_timestamp();
        let stored = format_timestamp(&now);
        assert!(stored.ends_with('Z'));
        assert_eq!(parse_timestamp(&stored).unwrap(), now);
    }

    #[test]
    fn storage_precision_survives_format_and_parse() {
        let precise = parse_timestamp("2030-06-01T12:00:00.123456789Z").unwrap();
        let stored = to_storage_precision(precise);
        assert_eq!(format_timestamp(&stored), "2030-06-01T12:00:00.123456Z");
        assert_eq!(parse_timestamp(&format_timestamp(&stored)).unwrap(), stored);
    }

    #[test]
    fn storage_format_is_fixed_width() {
        let a = parse_timestamp("2025-01-01T09:30:00Z").unwrap();
        let b = parse_timestamp("2025-01-01T09:30:00.5Z").unwrap();
        assert_eq!(format_timestamp(&a).len(), format_timestamp(&b).len());
        assert!(format_timestamp(&a) < format_timestamp(&b));
    }

    #[test]
    fn parse_uuid_rejects_garbage() {
        assert!(parse_uuid("not-a-uuid").is_err());
    }

    #[tokio::test]
    async fn bounded_reports_timeout_with_operation_kind() {
        let result: DbResult<()> = bounded(
            Some(Duration::from_millis(10)),
            Operation::Select,
            async {
                tokio::time::sleep(Duration::from_secs(5)).await;
                Ok(())
            },
        )
        .await;
        assert!(matches!(result, Err(DbError::Select { .. })));
    }

    #[tokio::test]
    async fn bounded_without_limit_runs_to_completion() {
        let result = bounded(None, Operation::Insert, async { Ok(7) }).await;
        assert_eq!(result.unwrap(), 7);
    }
}
