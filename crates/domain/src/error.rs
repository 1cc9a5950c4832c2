//! Domain error types.

use common::ErrorKind;
use event_store::EventStoreError;
use thiserror::Error;

use crate::todo_list::TodoListError;

/// Errors that can occur during domain operations.
#[derive(Debug, Error)]
pub enum DomainError {
    /// An error occurred in the event store.
    #[error("Event store error: {0}")]
    EventStore(#[from] EventStoreError),

    /// A todo-list command was rejected.
    #[error("Todo list error: {0}")]
    TodoList(#[from] TodoListError),

    /// An event could not be encoded for storage.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl DomainError {
    /// Classifies the error; the retry loop and the HTTP layer only look at this.
    pub fn kind(&self) -> ErrorKind {
        match self {
            DomainError::EventStore(e) => e.kind(),
            DomainError::TodoList(e) => e.kind(),
            DomainError::Serialization(_) => ErrorKind::Repository,
        }
    }
}
