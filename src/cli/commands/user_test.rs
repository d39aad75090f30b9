use crate::cli::commands::user::*;
use crate::db::fixtures::make_user;
use crate::db::{Database, SqliteDatabase, UserRepository};

#[tokio::test(flavor = "multi_thread")]
async fn test_list_users_hides_password() {
    let db = SqliteDatabase::in_memory().await.unwrap();
    db.migrate().await.unwrap();

    assert_eq!(list_users(&db, "table").await.unwrap(), "No users found.");

    let user = db.users().create(&make_user("ana@example.com")).await.unwrap();

    let table = list_users(&db, "table").await.unwrap();
    assert!(table.contains("ana@example.com"));

    let json = list_users(&db, "json").await.unwrap();
    let parsed: serde_json::Value = serde_json::from_str(&json).unwrap();
    assert_eq!(parsed[0]["id"], user.id.to_string());
    assert!(parsed[0].get("password").is_none());
    assert!(!json.contains(&user.password));
}
