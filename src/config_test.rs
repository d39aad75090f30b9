use std::time::Duration;

use clap::Parser;

use crate::config::{Backend, DbConfig, get_data_dir};

#[derive(Parser)]
struct Harness {
    #[command(flatten)]
    db: DbConfig,
}

fn parse(args: &[&str]) -> DbConfig {
    let mut argv = vec!["tm"];
    argv.extend_from_slice(args);
    Harness::try_parse_from(argv).unwrap().db
}

#[test]
fn test_explicit_flags_override_defaults() {
    let config = parse(&[
        "--backend",
        "surreal",
        "--db",
        "mem://",
        "--namespace",
        "ns",
        "--database",
        "shop",
        "--timeout",
        "5",
    ]);

    assert_eq!(config.backend, Backend::Surreal);
    assert_eq!(config.resolved_endpoint(), "mem://");
    assert_eq!(config.namespace, "ns");
    assert_eq!(config.database, "shop");
    assert_eq!(config.operation_timeout(), Some(Duration::from_secs(5)));
}

#[test]
fn test_zero_timeout_disables_deadline() {
    let config = parse(&["--db", "x.db", "--timeout", "0"]);
    assert_eq!(config.operation_timeout(), None);
}

#[test]
fn test_unknown_backend_is_rejected() {
    let result = Harness::try_parse_from(["tm", "--backend", "mongo"]);
    assert!(result.is_err());
}

#[test]
fn test_credentials_need_both_parts() {
    let config = parse(&["--db", "ws://localhost:8000", "--user", "root"]);
    assert!(config.credentials().is_none());

    let config = parse(&[
        "--db",
        "ws://localhost:8000",
        "--user",
        "root",
        "--password",
        "secret",
    ]);
    let credentials = config.credentials().unwrap();
    assert_eq!(credentials.username, "root");
    assert_eq!(credentials.password, "secret");
}

#[test]
fn test_default_endpoints_live_in_data_dir() {
    let mut config = parse(&["--db", "ignored"]);
    config.endpoint = None;

    config.backend = Backend::Sqlite;
    assert!(config.resolved_endpoint().ends_with("taskmarket/taskmarket.db"));

    config.backend = Backend::Surreal;
    let endpoint = config.resolved_endpoint();
    assert!(endpoint.starts_with("surrealkv://"));
    assert!(endpoint.ends_with("taskmarket/taskmarket.kv"));
}

#[test]
fn test_data_dir_ends_with_taskmarket() {
    assert!(get_data_dir().ends_with("taskmarket"));
}
