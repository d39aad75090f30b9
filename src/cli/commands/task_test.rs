use crate::cli::commands::task::*;
use crate::db::{Database, SqliteDatabase, Task};

async fn setup_db() -> SqliteDatabase {
    let db = SqliteDatabase::in_memory()
        .await
        .expect("Failed to create test database");
    db.migrate().await.expect("Failed to run migrations");
    db
}

#[test]
fn test_format_table_empty() {
    assert_eq!(format_table(&[]), "No tasks found.");
}

#[tokio::test(flavor = "multi_thread")]
async fn test_create_and_list_tasks_by_category() {
    let db = setup_db().await;

    let output = create_task(&db, "Fix sink", 40.0, 1).await.unwrap();
    assert!(output.starts_with("✓ Created task: Fix sink ("));
    create_task(&db, "Paint wall", 80.0, 2).await.unwrap();

    let table = list_tasks(&db, None, "table").await.unwrap();
    assert!(table.contains("Fix sink"));
    assert!(table.contains("80.00"));

    let json = list_tasks(&db, Some(2), "json").await.unwrap();
    let parsed: Vec<Task> = serde_json::from_str(&json).unwrap();
    assert_eq!(parsed.len(), 1);
    assert_eq!(parsed[0].name, "Paint wall");

    assert_eq!(list_tasks(&db, Some(9), "table").await.unwrap(), "No tasks found.");
}
