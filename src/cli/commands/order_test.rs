use crate::cli::commands::order::*;
use crate::cli::error::CliError;
use crate::db::fixtures::{make_order, make_task, make_user, make_worker};
use crate::db::{
    Database, DbError, Order, OrderRepository, OrderedTask, SqliteDatabase, SurrealDatabase,
    TaskRepository, UserRepository, WorkerRepository, order_status,
};
use uuid::Uuid;

async fn setup_db() -> SqliteDatabase {
    let db = SqliteDatabase::in_memory()
        .await
        .expect("Failed to create test database");
    db.migrate().await.expect("Failed to run migrations");
    db
}

#[test]
fn test_status_label() {
    assert_eq!(status_label(order_status::IN_PROGRESS), "in progress");
    assert_eq!(status_label(order_status::CANCELLED), "cancelled");
    assert_eq!(status_label(42), "42");
}

#[test]
fn test_format_table_empty() {
    assert_eq!(format_table(&[]), "No orders found.");
    assert_eq!(format_lines(&[]), "No tasks in order.");
}

#[tokio::test(flavor = "multi_thread")]
async fn test_filter_orders() {
    let db = setup_db().await;
    let user = db.users().create(&make_user("u@example.com")).await.unwrap();
    let worker = db.workers().create(&make_worker("w@example.com")).await.unwrap();

    let mut assigned = make_order(user.id, Some(worker.id));
    assigned.status = order_status::IN_PROGRESS;
    let assigned = db.orders().create(&assigned, &[]).await.unwrap();
    let open = db
        .orders()
        .create(&make_order(user.id, None), &[])
        .await
        .unwrap();

    let json = filter_orders(&db, &["worker_id=null".to_string()], "json")
        .await
        .unwrap();
    let parsed: Vec<Order> = serde_json::from_str(&json).unwrap();
    assert_eq!(parsed.len(), 1);
    assert_eq!(parsed[0].id, open.id);

    let table = filter_orders(&db, &["status=2".to_string()], "table")
        .await
        .unwrap();
    assert!(table.contains(&assigned.id.to_string()));
    assert!(table.contains("in progress"));

    let all = filter_orders(&db, &[], "json").await.unwrap();
    let parsed: Vec<Order> = serde_json::from_str(&all).unwrap();
    assert_eq!(parsed.len(), 2);

    let result = filter_orders(&db, &["colour=red".to_string()], "table").await;
    assert!(matches!(
        result,
        Err(CliError::Database(DbError::Select { .. }))
    ));
    let result = filter_orders(&db, &["status".to_string()], "table").await;
    assert!(matches!(result, Err(CliError::InvalidArgument { .. })));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_order_tasks_show_quantities_and_total() {
    let db = SurrealDatabase::in_memory().await.unwrap();
    db.migrate().await.unwrap();
    let user = db.users().create(&make_user("u@example.com")).await.unwrap();
    let mut sink = make_task("Fix sink", 1);
    sink.price_per_single = 10.0;
    let sink = db.tasks().create(&sink).await.unwrap();
    let mut tap = make_task("Fix tap", 1);
    tap.price_per_single = 2.5;
    let tap = db.tasks().create(&tap).await.unwrap();

    let order = db
        .orders()
        .create(
            &make_order(user.id, None),
            &[OrderedTask::new(sink.id, 3), OrderedTask::new(tap.id, 2)],
        )
        .await
        .unwrap();

    let table = order_tasks(&db, &order.id.to_string(), "table")
        .await
        .unwrap();
    assert!(table.contains("Fix sink"));
    assert!(table.contains("30.00"));
    assert!(table.ends_with("Total: 35.00"));

    let json = order_tasks(&db, &order.id.to_string(), "json")
        .await
        .unwrap();
    let parsed: serde_json::Value = serde_json::from_str(&json).unwrap();
    assert_eq!(parsed[0]["name"], "Fix sink");
    assert_eq!(parsed[0]["quantity"], 3);
    assert_eq!(parsed[1]["quantity"], 2);
}

#[tokio::test(flavor = "multi_thread")]
async fn test_delete_order() {
    let db = setup_db().await;
    let user = db.users().create(&make_user("u@example.com")).await.unwrap();
    let order = db
        .orders()
        .create(&make_order(user.id, None), &[])
        .await
        .unwrap();

    let output = delete_order(&db, &order.id.to_string()).await.unwrap();
    assert_eq!(output, format!("✓ Deleted order: {}", order.id));

    let result = delete_order(&db, &order.id.to_string()).await;
    assert!(matches!(
        result,
        Err(CliError::Database(DbError::DoesNotExist { .. }))
    ));

    let result = order_tasks(&db, &Uuid::new_v4().to_string(), "table").await;
    assert!(matches!(
        result,
        Err(CliError::Database(DbError::DoesNotExist { .. }))
    ));
}
