//! Tests for the SurrealDB task, user and worker repositories.

use uuid::Uuid;

use crate::db::fixtures::{make_order, make_task, make_user, make_worker};
use crate::db::{
    Database, DbError, OrderRepository, OrderedTask, SurrealDatabase, TaskRepository, UNRATED,
    UserRepository, WorkerRepository, order_status, worker_role,
};

async fn setup_db() -> SurrealDatabase {
    let db = SurrealDatabase::in_memory()
        .await
        .expect("Failed to create in-memory database");
    db.migrate().await.expect("Migration should succeed");
    db
}

// =============================================================================
// Tasks
// =============================================================================

#[tokio::test(flavor = "multi_thread")]
async fn task_create_get_and_preserve_id() {
    let db = setup_db().await;
    let tasks = db.tasks();

    let created = tasks.create(&make_task("Fix sink", 1)).await.unwrap();
    assert!(!created.id.is_nil());
    assert_eq!(tasks.get_by_id(created.id).await.unwrap(), created);

    let id = Uuid::new_v4();
    let mut task = make_task("Fix tap", 1);
    task.id = id;
    assert_eq!(tasks.create(&task).await.unwrap().id, id);

    let result = tasks.create(&task).await;
    assert!(matches!(result, Err(DbError::Insert { .. })), "got {:?}", result);
}

#[tokio::test(flavor = "multi_thread")]
async fn task_update_delete_and_missing() {
    let db = setup_db().await;
    let tasks = db.tasks();

    let mut task = tasks.create(&make_task("Mow lawn", 1)).await.unwrap();
    task.price_per_single = 55.5;
    task.category = 4;
    tasks.update(&task).await.unwrap();
    assert_eq!(tasks.get_by_id(task.id).await.unwrap(), task);

    tasks.delete(task.id).await.unwrap();
    assert!(tasks.get_by_id(task.id).await.unwrap_err().is_does_not_exist());
    assert!(tasks.delete(task.id).await.unwrap_err().is_does_not_exist());
    assert!(tasks.update(&task).await.unwrap_err().is_does_not_exist());
}

#[tokio::test(flavor = "multi_thread")]
async fn task_lookup_by_category_and_name() {
    let db = setup_db().await;
    let tasks = db.tasks();

    tasks.create(&make_task("Unclog drain", 1)).await.unwrap();
    tasks.create(&make_task("Fix tap", 1)).await.unwrap();
    tasks.create(&make_task("Install socket", 2)).await.unwrap();

    let names: Vec<String> = tasks
        .get_tasks_in_category(1)
        .await
        .unwrap()
        .into_iter()
        .map(|t| t.name)
        .collect();
    assert_eq!(names, vec!["Fix tap", "Unclog drain"]);
    assert_eq!(tasks.list().await.unwrap().len(), 3);

    assert_eq!(tasks.get_by_name("Install socket").await.unwrap().category, 2);
    assert!(tasks.get_by_name("Nothing").await.unwrap_err().is_does_not_exist());
}

// =============================================================================
// Users
// =============================================================================

#[tokio::test(flavor = "multi_thread")]
async fn user_round_trip_and_lookup() {
    let db = setup_db().await;
    let users = db.users();

    let mut user = users.create(&make_user("ana@example.com")).await.unwrap();
    assert_eq!(users.get_by_id(user.id).await.unwrap(), user);
    assert_eq!(users.get_by_email("ana@example.com").await.unwrap().id, user.id);

    user.phone_number = "+385 91 000 0000".to_string();
    users.update(&user).await.unwrap();
    assert_eq!(users.get_by_id(user.id).await.unwrap(), user);

    let mut ghost = user.clone();
    ghost.id = Uuid::new_v4();
    assert!(users.update(&ghost).await.unwrap_err().is_does_not_exist());
    assert!(users.delete(ghost.id).await.unwrap_err().is_does_not_exist());
}

#[tokio::test(flavor = "multi_thread")]
async fn user_validation_matches_relational_backend() {
    let db = setup_db().await;

    let mut user = make_user("v@example.com");
    user.name = " ".to_string();
    let result = db.users().create(&user).await;
    assert!(matches!(result, Err(DbError::Insert { .. })));
    assert!(db.users().list().await.unwrap().is_empty());
}

#[tokio::test(flavor = "multi_thread")]
async fn user_delete_cascades_to_orders_and_links() {
    let db = setup_db().await;
    let user = db.users().create(&make_user("gone@example.com")).await.unwrap();
    let keep = db.users().create(&make_user("stay@example.com")).await.unwrap();
    let task = db.tasks().create(&make_task("Fix door", 1)).await.unwrap();

    let order = db
        .orders()
        .create(&make_order(user.id, None), &[OrderedTask::new(task.id, 2)])
        .await
        .unwrap();
    let kept = db
        .orders()
        .create(&make_order(keep.id, None), &[OrderedTask::new(task.id, 1)])
        .await
        .unwrap();

    db.users().delete(user.id).await.expect("Delete should succeed");

    assert!(db.users().get_by_id(user.id).await.unwrap_err().is_does_not_exist());
    assert!(
        db.orders()
            .get_order_by_id(order.id)
            .await
            .unwrap_err()
            .is_does_not_exist()
    );
    assert!(
        db.orders()
            .get_task_quantity(order.id, task.id)
            .await
            .unwrap_err()
            .is_does_not_exist()
    );
    assert_eq!(db.orders().get_ordered_tasks(kept.id).await.unwrap().len(), 1);
}

// =============================================================================
// Workers
// =============================================================================

#[tokio::test(flavor = "multi_thread")]
async fn worker_round_trip_and_role_lookup() {
    let db = setup_db().await;
    let workers = db.workers();

    let mut manager = make_worker("boss@example.com");
    manager.role = worker_role::MANAGER;
    let manager = workers.create(&manager).await.unwrap();
    workers.create(&make_worker("m@example.com")).await.unwrap();

    assert_eq!(workers.get_by_id(manager.id).await.unwrap(), manager);
    assert_eq!(
        workers.get_by_email("boss@example.com").await.unwrap().id,
        manager.id
    );
    assert_eq!(
        workers
            .get_workers_by_role(worker_role::MASTER)
            .await
            .unwrap()
            .len(),
        1
    );
    assert_eq!(workers.list().await.unwrap().len(), 2);
}

#[tokio::test(flavor = "multi_thread")]
async fn worker_update_and_missing() {
    let db = setup_db().await;
    let workers = db.workers();

    let mut worker = workers.create(&make_worker("ivo@example.com")).await.unwrap();
    worker.address = "Riva 2, Split".to_string();
    worker.role = worker_role::MANAGER;
    assert_eq!(workers.update(&worker).await.unwrap(), worker);
    assert_eq!(workers.get_by_id(worker.id).await.unwrap(), worker);

    let mut ghost = worker.clone();
    ghost.id = Uuid::new_v4();
    ghost.email = "ghost@example.com".to_string();
    assert!(workers.update(&ghost).await.unwrap_err().is_does_not_exist());
    assert!(workers.get_by_id(ghost.id).await.unwrap_err().is_does_not_exist());
}

#[tokio::test(flavor = "multi_thread")]
async fn worker_average_rate_counts_completed_rated_orders() {
    let db = setup_db().await;
    let user = db.users().create(&make_user("u@example.com")).await.unwrap();
    let worker = db.workers().create(&make_worker("w@example.com")).await.unwrap();

    assert_eq!(
        db.workers().get_average_order_rate(&worker).await.unwrap(),
        0.0
    );

    for (status, rate) in [
        (order_status::COMPLETED, 4),
        (order_status::COMPLETED, UNRATED),
        (order_status::COMPLETED, 5),
        (order_status::CANCELLED, 1),
    ] {
        let mut order = make_order(user.id, Some(worker.id));
        order.status = status;
        order.rate = rate;
        db.orders().create(&order, &[]).await.unwrap();
    }

    let average = db.workers().get_average_order_rate(&worker).await.unwrap();
    assert!((average - 4.5).abs() < f64::EPSILON, "got {}", average);
}

#[tokio::test(flavor = "multi_thread")]
async fn worker_delete_unassigns_orders() {
    let db = setup_db().await;
    let user = db.users().create(&make_user("u@example.com")).await.unwrap();
    let worker = db.workers().create(&make_worker("w@example.com")).await.unwrap();
    let order = db
        .orders()
        .create(&make_order(user.id, Some(worker.id)), &[])
        .await
        .unwrap();

    db.workers().delete(worker.id).await.unwrap();

    assert_eq!(
        db.orders().get_order_by_id(order.id).await.unwrap().worker_id,
        None
    );
    assert!(db.workers().get_by_id(worker.id).await.unwrap_err().is_does_not_exist());
    assert!(db.workers().delete(worker.id).await.unwrap_err().is_does_not_exist());
}

#[tokio::test(flavor = "multi_thread")]
async fn concurrent_deletes_report_a_single_success() {
    let db = setup_db().await;
    let worker = db.workers().create(&make_worker("w@example.com")).await.unwrap();
    let user = db.users().create(&make_user("u@example.com")).await.unwrap();

    let workers = db.workers();
    let (a, b) = tokio::join!(workers.delete(worker.id), workers.delete(worker.id));
    assert!(!(a.is_ok() && b.is_ok()), "both deletes reported success");
    assert!(a.is_ok() || b.is_ok());

    let users = db.users();
    let (a, b) = tokio::join!(users.delete(user.id), users.delete(user.id));
    assert!(!(a.is_ok() && b.is_ok()), "both deletes reported success");
    assert!(db.users().get_by_id(user.id).await.unwrap_err().is_does_not_exist());
}

#[tokio::test(flavor = "multi_thread")]
async fn missing_delete_changes_nothing() {
    let db = setup_db().await;
    let user = db.users().create(&make_user("u@example.com")).await.unwrap();
    let worker = db.workers().create(&make_worker("w@example.com")).await.unwrap();
    let order = db
        .orders()
        .create(&make_order(user.id, Some(worker.id)), &[])
        .await
        .unwrap();

    let ghost = Uuid::new_v4();
    assert!(db.workers().delete(ghost).await.unwrap_err().is_does_not_exist());
    assert!(db.users().delete(ghost).await.unwrap_err().is_does_not_exist());
    assert!(db.orders().delete(ghost).await.unwrap_err().is_does_not_exist());

    assert_eq!(db.orders().get_order_by_id(order.id).await.unwrap(), order);
}
