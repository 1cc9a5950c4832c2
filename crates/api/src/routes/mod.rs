pub mod health;
pub mod metrics;
pub mod todo_lists;
