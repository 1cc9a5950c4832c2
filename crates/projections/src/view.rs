//! Query-side shape of a todo list.

use chrono::{DateTime, Utc};
use common::AggregateId;
use domain::{TodoText, UserId};
use event_store::Version;
use serde::Serialize;

/// One item as shown to readers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TodoItemView {
    pub text: TodoText,
}

/// Denormalized todo list, one per aggregate.
///
/// `version` is the version of the last event folded into the view.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TodoListView {
    pub aggregate_id: AggregateId,
    pub user_id: UserId,
    pub items: Vec<TodoItemView>,
    pub version: Version,
    pub updated_at: DateTime<Utc>,
}

impl TodoListView {
    pub fn item_count(&self) -> usize {
        self.items.len()
    }
}
