use crate::cli::error::CliError;
use crate::cli::utils::*;
use uuid::Uuid;

#[test]
fn test_truncate_with_ellipsis_short_string() {
    let result = truncate_with_ellipsis("hello", 10);
    assert_eq!(result, "hello");
}

#[test]
fn test_truncate_with_ellipsis_long_string() {
    let result = truncate_with_ellipsis("Replace bathroom tiles and grout", 10);
    assert_eq!(result, "Replace...");
}

#[test]
fn test_truncate_with_ellipsis_unicode() {
    let result = truncate_with_ellipsis("Čišćenje žlijeba", 7);
    assert_eq!(result, "Čišć...");
}

#[test]
fn test_truncate_with_ellipsis_tiny_width() {
    assert_eq!(truncate_with_ellipsis("hello", 2), "...");
    assert_eq!(truncate_with_ellipsis("hello", 0), "...");
}

#[test]
fn test_format_optional_id() {
    assert_eq!(format_optional_id(None), "-");
    let id = Uuid::new_v4();
    assert_eq!(format_optional_id(Some(id)), id.to_string());
}

#[test]
fn test_parse_uuid() {
    let id = Uuid::new_v4();
    assert_eq!(parse_uuid(&format!(" {} ", id)).unwrap(), id);
    assert!(matches!(
        parse_uuid("42"),
        Err(CliError::InvalidArgument { .. })
    ));
}

#[test]
fn test_parse_key_values() {
    let params = parse_key_values(&["status=1,2".to_string(), " worker_id = null".to_string()])
        .unwrap();
    assert_eq!(params.get("status").map(String::as_str), Some("1,2"));
    assert_eq!(params.get("worker_id").map(String::as_str), Some("null"));

    assert!(parse_key_values(&["status".to_string()]).is_err());
    assert!(parse_key_values(&["=1".to_string()]).is_err());
}
