//! TodoList aggregate implementation.

use common::AggregateId;
use event_store::{EventRegistry, Version};

use crate::aggregate::Aggregate;

use super::{
    AddTodo, CreateTodoList, TodoItem, TodoListError, TodoListEvent, UserId,
    events::{self, TodoAddedData, TodoListCreatedData},
};

/// Maximum number of items a list can hold.
pub const MAX_ITEMS: usize = 3;

/// TodoList aggregate root.
///
/// Transient: rebuilt from the event store for every command and discarded
/// afterwards.
#[derive(Debug, Clone, Default)]
pub struct TodoList {
    id: Option<AggregateId>,
    user_id: Option<UserId>,
    items: Vec<TodoItem>,
    version: Version,
    uncommitted: Vec<TodoListEvent>,
}

impl Aggregate for TodoList {
    type Event = TodoListEvent;
    type Error = TodoListError;

    fn aggregate_type() -> &'static str {
        "TodoList"
    }

    fn registry() -> &'static EventRegistry<TodoListEvent> {
        events::registry()
    }

    fn id(&self) -> Option<AggregateId> {
        self.id
    }

    fn version(&self) -> Version {
        self.version
    }

    fn apply(&mut self, event: &TodoListEvent) {
        match event {
            TodoListEvent::TodoListCreated(data) => self.apply_created(data),
            TodoListEvent::TodoAdded(data) => self.apply_todo_added(data),
        }
    }

    fn uncommitted_events(&self) -> &[TodoListEvent] {
        &self.uncommitted
    }

    fn mark_events_as_committed(&mut self) {
        self.uncommitted.clear();
    }
}

// Query methods
impl TodoList {
    pub fn user_id(&self) -> Option<&UserId> {
        self.user_id.as_ref()
    }

    pub fn items(&self) -> &[TodoItem] {
        &self.items
    }

    pub fn item_count(&self) -> usize {
        self.items.len()
    }

    pub fn is_full(&self) -> bool {
        self.items.len() >= MAX_ITEMS
    }
}

// Command methods (record events)
impl TodoList {
    /// Creates the list under a fresh id at version 1.
    pub fn create(&mut self, cmd: CreateTodoList) -> Result<TodoListEvent, TodoListError> {
        if self.id.is_some() {
            return Err(TodoListError::AlreadyCreated);
        }

        let event =
            TodoListEvent::todo_list_created(AggregateId::new(), cmd.user_id, Version::first());
        Ok(self.record(event))
    }

    /// Appends an item. State is unchanged on rejection.
    pub fn add_todo(&mut self, cmd: AddTodo) -> Result<TodoListEvent, TodoListError> {
        let Some(id) = self.id else {
            return Err(TodoListError::NotCreated);
        };

        if self.is_full() {
            return Err(TodoListError::CapacityExceeded { max: MAX_ITEMS });
        }

        let event = TodoListEvent::todo_added(id, cmd.user_id, cmd.text, self.version.next());
        Ok(self.record(event))
    }

    fn record(&mut self, event: TodoListEvent) -> TodoListEvent {
        self.apply(&event);
        self.uncommitted.push(event.clone());
        event
    }
}

// Event application
impl TodoList {
    fn apply_created(&mut self, data: &TodoListCreatedData) {
        self.id = Some(data.aggregate_id);
        self.user_id = Some(data.user_id.clone());
        self.items.clear();
        self.version = data.version;
    }

    fn apply_todo_added(&mut self, data: &TodoAddedData) {
        self.items.push(TodoItem::new(data.text.clone()));
        self.version = data.version;
    }
}
