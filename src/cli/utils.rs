//! Shared utilities for CLI commands

use std::collections::HashMap;

use tabled::{Table, settings::Style};
use uuid::Uuid;

use crate::cli::error::{CliError, CliResult};

/// Truncate a string with ellipsis if it exceeds max length
pub fn truncate_with_ellipsis(s: &str, max: usize) -> String {
    let char_count = s.chars().count();
    if char_count <= max {
        s.to_string()
    } else {
        let truncated: String = s.chars().take(max.saturating_sub(3)).collect();
        format!("{}...", truncated)
    }
}

/// Render an optional id, `-` when absent
pub fn format_optional_id(id: Option<Uuid>) -> String {
    id.map(|id| id.to_string()).unwrap_or_else(|| "-".to_string())
}

/// Parse a UUID argument
pub fn parse_uuid(value: &str) -> CliResult<Uuid> {
    Uuid::parse_str(value.trim()).map_err(|e| CliError::InvalidArgument {
        message: format!("'{}' is not a valid id: {}", value, e),
    })
}

/// Parse repeated `key=value` arguments into filter parameters
pub fn parse_key_values(pairs: &[String]) -> CliResult<HashMap<String, String>> {
    pairs
        .iter()
        .map(|pair| match pair.split_once('=') {
            Some((key, value)) if !key.trim().is_empty() => {
                Ok((key.trim().to_string(), value.trim().to_string()))
            }
            _ => Err(CliError::InvalidArgument {
                message: format!("expected key=value, got '{}'", pair),
            }),
        })
        .collect()
}

/// Apply consistent table styling
pub fn apply_table_style(table: &mut Table) {
    table.with(Style::rounded());
}
