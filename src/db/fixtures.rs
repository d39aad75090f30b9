//! Entity builders shared by the backend test suites.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::db::{Category, Order, Task, UNRATED, User, Worker, order_status, worker_role};

pub fn make_category(name: &str) -> Category {
    Category {
        id: 0,
        name: name.to_string(),
    }
}

pub fn make_task(name: &str, category: i64) -> Task {
    Task {
        id: Uuid::nil(),
        name: name.to_string(),
        price_per_single: 12.5,
        category,
    }
}

pub fn make_user(email: &str) -> User {
    User {
        id: Uuid::nil(),
        name: "Ana".to_string(),
        surname: "Horvat".to_string(),
        address: "Ilica 1, Zagreb".to_string(),
        phone_number: "+385 1 555 0101".to_string(),
        email: email.to_string(),
        password: "$2b$12$hash".to_string(),
    }
}

pub fn make_worker(email: &str) -> Worker {
    Worker {
        id: Uuid::nil(),
        name: "Ivo".to_string(),
        surname: "Kovac".to_string(),
        address: "Vukovarska 5, Split".to_string(),
        phone_number: "+385 21 555 0202".to_string(),
        email: email.to_string(),
        role: worker_role::MASTER,
        password: "$2b$12$hash".to_string(),
    }
}

pub fn deadline() -> DateTime<Utc> {
    DateTime::parse_from_rfc3339("2030-06-01T12:00:00Z")
        .unwrap()
        .with_timezone(&Utc)
}

pub fn make_order(user_id: Uuid, worker_id: Option<Uuid>) -> Order {
    Order {
        id: Uuid::nil(),
        worker_id,
        user_id,
        status: order_status::NEW,
        address: "Ilica 1, Zagreb".to_string(),
        creation_date: Utc::now(),
        deadline: deadline(),
        rate: UNRATED,
    }
}
