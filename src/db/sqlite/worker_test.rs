//! Tests for SqliteWorkerRepository.

use uuid::Uuid;

use crate::db::fixtures::{make_order, make_user, make_worker};
use crate::db::{
    Database, DbError, OrderRepository, SqliteDatabase, UNRATED, UserRepository,
    WorkerRepository, order_status, worker_role,
};

async fn setup_db() -> SqliteDatabase {
    let db = SqliteDatabase::in_memory()
        .await
        .expect("Failed to create in-memory database");
    db.migrate().await.expect("Migration should succeed");
    db
}

#[tokio::test(flavor = "multi_thread")]
async fn worker_create_get_and_lookup() {
    let db = setup_db().await;
    let workers = db.workers();

    let created = workers.create(&make_worker("ivo@example.com")).await.unwrap();
    assert_eq!(workers.get_by_id(created.id).await.unwrap(), created);
    assert_eq!(
        workers.get_by_email("ivo@example.com").await.unwrap().id,
        created.id
    );
    assert_eq!(created.full_name(), "Ivo Kovac");
}

#[tokio::test(flavor = "multi_thread")]
async fn worker_create_rejects_empty_password() {
    let db = setup_db().await;

    let mut worker = make_worker("nopass@example.com");
    worker.password = String::new();
    let result = db.workers().create(&worker).await;
    assert!(matches!(result, Err(DbError::Insert { .. })));
}

#[tokio::test(flavor = "multi_thread")]
async fn worker_filter_by_role() {
    let db = setup_db().await;
    let workers = db.workers();

    let mut manager = make_worker("boss@example.com");
    manager.role = worker_role::MANAGER;
    workers.create(&manager).await.unwrap();
    workers.create(&make_worker("m1@example.com")).await.unwrap();
    workers.create(&make_worker("m2@example.com")).await.unwrap();

    assert_eq!(
        workers
            .get_workers_by_role(worker_role::MASTER)
            .await
            .unwrap()
            .len(),
        2
    );
    assert_eq!(
        workers
            .get_workers_by_role(worker_role::MANAGER)
            .await
            .unwrap()
            .len(),
        1
    );
    assert!(workers.get_workers_by_role(7).await.unwrap().is_empty());
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

    // Completed with rates 4, 0 (unrated) and 5, plus a rated order still in progress
    for (status, rate) in [
        (order_status::COMPLETED, 4),
        (order_status::COMPLETED, UNRATED),
        (order_status::COMPLETED, 5),
        (order_status::IN_PROGRESS, 1),
    ] {
        let mut order = make_order(user.id, Some(worker.id));
        order.status = status;
        order.rate = rate;
        db.orders().create(&order, &[]).await.unwrap();
    }

    let average = db.workers().get_average_order_rate(&worker).await.unwrap();
    assert!((average - 4.5).abs() < f64::EPSILON);
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

    let order = db.orders().get_order_by_id(order.id).await.unwrap();
    assert_eq!(order.worker_id, None);
    assert!(db.workers().delete(worker.id).await.unwrap_err().is_does_not_exist());
}

#[tokio::test(flavor = "multi_thread")]
async fn worker_update_missing_returns_does_not_exist() {
    let db = setup_db().await;

    let mut worker = make_worker("ghost@example.com");
    worker.id = Uuid::new_v4();
    assert!(
        db.workers()
            .update(&worker)
            .await
            .unwrap_err()
            .is_does_not_exist()
    );
}
