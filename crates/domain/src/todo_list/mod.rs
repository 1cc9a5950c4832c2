//! Todo-list aggregate and related types.

mod aggregate;
mod commands;
mod events;
mod service;
mod value_objects;

pub use aggregate::{MAX_ITEMS, TodoList};
pub use commands::{AddTodo, CreateTodoList};
pub use events::{
    TODO_ADDED, TODO_LIST_CREATED, TodoAddedData, TodoListCreatedData, TodoListEvent, registry,
};
pub use service::TodoListService;
pub use value_objects::{MAX_TODO_TEXT_LEN, MAX_USER_ID_LEN, TodoItem, TodoText, UserId};

use common::ErrorKind;
use thiserror::Error;

/// Errors that can occur during todo-list operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TodoListError {
    /// `create` on a list that already exists.
    #[error("Todo list already created")]
    AlreadyCreated,

    /// `add_todo` on a list that was never created.
    #[error("Todo list not created")]
    NotCreated,

    /// The list already holds the maximum number of items.
    #[error("Todo list is full: at most {max} items")]
    CapacityExceeded { max: usize },

    #[error("Invalid user id: {0}")]
    InvalidUserId(String),

    #[error("Invalid todo text: {0}")]
    InvalidTodoText(String),
}

impl TodoListError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            TodoListError::AlreadyCreated
            | TodoListError::InvalidUserId(_)
            | TodoListError::InvalidTodoText(_) => ErrorKind::InvalidParameter,
            TodoListError::NotCreated => ErrorKind::NotFound,
            TodoListError::CapacityExceeded { .. } => ErrorKind::CapacityExceeded,
        }
    }
}
