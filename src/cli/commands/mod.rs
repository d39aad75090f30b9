pub mod category;
pub mod order;
pub mod task;
pub mod user;
pub mod worker;


#[cfg(test)]
#[path = "order_test.rs"]
mod order_test;

#[cfg(test)]
#[path = "task_test.rs"]
mod task_test;

#[cfg(test)]
#[path = "user_test.rs"]
mod user_test;
