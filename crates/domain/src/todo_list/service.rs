//! Todo-list service providing a simplified API for list operations.

use std::sync::Arc;

use common::AggregateId;
use event_bus::InMemoryEventBus;
use event_store::EventStore;

use crate::command::{Command, CommandHandler, CommandResult};
use crate::error::DomainError;
use crate::retry::RetryPolicy;

use super::{AddTodo, CreateTodoList, TodoList, TodoListEvent};

/// Service for managing todo lists.
///
/// Wraps the command handler; every write goes through its
/// load-decide-append-commit cycle and is retried on version conflicts.
pub struct TodoListService<S: EventStore> {
    handler: CommandHandler<S, TodoList>,
}

impl<S: EventStore> TodoListService<S> {
    /// Creates a service with the default retry policy.
    pub fn new(store: S, bus: Arc<InMemoryEventBus<TodoListEvent>>) -> Self {
        Self::from_handler(CommandHandler::new(store, bus))
    }

    pub fn with_retry_policy(
        store: S,
        bus: Arc<InMemoryEventBus<TodoListEvent>>,
        retry: RetryPolicy,
    ) -> Self {
        Self::from_handler(CommandHandler::new(store, bus).with_retry_policy(retry))
    }

    pub fn from_handler(handler: CommandHandler<S, TodoList>) -> Self {
        Self { handler }
    }

    /// Returns a reference to the underlying command handler.
    pub fn handler(&self) -> &CommandHandler<S, TodoList> {
        &self.handler
    }

    /// Creates a new todo list.
    #[tracing::instrument(skip(self))]
    pub async fn create_list(
        &self,
        cmd: CreateTodoList,
    ) -> Result<CommandResult<TodoList>, DomainError> {
        self.handler
            .execute(cmd.target(), |list| list.create(cmd.clone()).map(|_| ()))
            .await
    }

    /// Adds an item to a todo list.
    #[tracing::instrument(skip(self))]
    pub async fn add_todo(&self, cmd: AddTodo) -> Result<CommandResult<TodoList>, DomainError> {
        self.handler
            .execute(cmd.target(), |list| list.add_todo(cmd.clone()).map(|_| ()))
            .await
    }

    /// Rebuilds a list from its events.
    #[tracing::instrument(skip(self))]
    pub async fn get_list(&self, aggregate_id: AggregateId) -> Result<TodoList, DomainError> {
        self.handler.load(aggregate_id).await
    }
}
