use clap::{CommandFactory, Parser};

use crate::cli::{Cli, Commands, OrderCommands, open_and_execute};
use crate::config::Backend;

fn parse(args: &[&str]) -> Cli {
    let mut argv = vec!["tm"];
    argv.extend_from_slice(args);
    Cli::try_parse_from(argv).unwrap()
}

#[test]
fn test_cli_definition_is_valid() {
    Cli::command().debug_assert();
}

#[test]
fn test_global_flags_after_subcommand() {
    let cli = parse(&[
        "order",
        "filter",
        "--where",
        "status=1",
        "--where",
        "worker_id=null",
        "--backend",
        "surreal",
    ]);
    assert_eq!(cli.db.backend, Backend::Surreal);
    match cli.command {
        Some(Commands::Order {
            command: OrderCommands::Filter { filters, format },
        }) => {
            assert_eq!(filters, vec!["status=1", "worker_id=null"]);
            assert_eq!(format, "table");
        }
        _ => panic!("expected order filter"),
    }
}

#[tokio::test(flavor = "multi_thread")]
async fn test_sqlite_file_is_created_in_nested_dir() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested").join("market.db");
    let path = path.to_str().unwrap();

    let cli = parse(&["--db", path, "category", "create", "Plumbing"]);
    let output = open_and_execute(&cli.db, cli.command.unwrap())
        .await
        .unwrap();
    assert_eq!(output, "✓ Created category: Plumbing (1)");

    // A second process run sees the stored category
    let cli = parse(&["--db", path, "category", "list", "--format", "json"]);
    let output = open_and_execute(&cli.db, cli.command.unwrap())
        .await
        .unwrap();
    assert!(output.contains("Plumbing"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_surreal_memory_backend_runs_commands() {
    let cli = parse(&["--backend", "surreal", "--db", "mem://", "user", "list"]);
    let output = open_and_execute(&cli.db, cli.command.unwrap())
        .await
        .unwrap();
    assert_eq!(output, "No users found.");
}

#[tokio::test(flavor = "multi_thread")]
async fn test_invalid_id_is_reported() {
    let cli = parse(&["--backend", "surreal", "--db", "mem://", "order", "delete", "abc"]);
    let result = open_and_execute(&cli.db, cli.command.unwrap()).await;
    assert!(matches!(
        result,
        Err(crate::cli::error::CliError::InvalidArgument { .. })
    ));
}
