//! Domain layer for the todo-list system.
//!
//! This crate provides:
//! - Aggregate trait for event-sourced entities
//! - DomainEvent trait for domain events
//! - CommandHandler with optimistic-lock retry
//! - TodoList aggregate and TodoListService

pub mod aggregate;
pub mod command;
pub mod error;
pub mod retry;
pub mod todo_list;

pub use aggregate::{Aggregate, DomainEvent};
pub use command::{Command, CommandHandler, CommandResult, Target};
pub use error::DomainError;
pub use retry::{RetryPolicy, Sleeper, TokioSleeper};
pub use todo_list::{
    AddTodo, CreateTodoList, MAX_ITEMS, TodoAddedData, TodoItem, TodoList, TodoListCreatedData,
    TodoListError, TodoListEvent, TodoListService, TodoText, UserId,
};
