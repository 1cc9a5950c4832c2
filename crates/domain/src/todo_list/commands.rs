//! Todo-list commands.

use common::AggregateId;

use crate::command::{Command, Target};

use super::{TodoList, TodoText, UserId};

/// Command to create a new todo list. The list id is assigned on creation.
#[derive(Debug, Clone)]
pub struct CreateTodoList {
    pub user_id: UserId,
}

impl CreateTodoList {
    pub fn new(user_id: UserId) -> Self {
        Self { user_id }
    }
}

impl Command for CreateTodoList {
    type Aggregate = TodoList;

    fn target(&self) -> Target {
        Target::New
    }
}

/// Command to add an item to an existing todo list.
#[derive(Debug, Clone)]
pub struct AddTodo {
    pub aggregate_id: AggregateId,
    pub user_id: UserId,
    pub text: TodoText,
}

impl AddTodo {
    pub fn new(aggregate_id: AggregateId, user_id: UserId, text: TodoText) -> Self {
        Self {
            aggregate_id,
            user_id,
            text,
        }
    }
}

impl Command for AddTodo {
    type Aggregate = TodoList;

    fn target(&self) -> Target {
        Target::Existing(self.aggregate_id)
    }
}
