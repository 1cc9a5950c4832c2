//! Todo-list domain events.

use std::sync::LazyLock;

use chrono::{DateTime, Utc};
use common::AggregateId;
use event_store::{EventEnvelope, EventId, EventRegistry, Version};
use serde::{Deserialize, Serialize};

use crate::aggregate::DomainEvent;

use super::{TodoText, UserId};

/// Stored discriminator of [`TodoListEvent::TodoListCreated`].
pub const TODO_LIST_CREATED: &str = "TodoListCreated";

/// Stored discriminator of [`TodoListEvent::TodoAdded`].
pub const TODO_ADDED: &str = "TodoAdded";

/// Events that can occur on a todo list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum TodoListEvent {
    /// The list was created.
    TodoListCreated(TodoListCreatedData),

    /// An item was added to the list.
    TodoAdded(TodoAddedData),
}

/// Data for TodoListCreated event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TodoListCreatedData {
    pub aggregate_id: AggregateId,
    pub event_id: EventId,
    pub user_id: UserId,
    pub version: Version,
    pub timestamp: DateTime<Utc>,
}

/// Data for TodoAdded event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TodoAddedData {
    pub aggregate_id: AggregateId,
    pub event_id: EventId,
    pub user_id: UserId,
    pub text: TodoText,
    pub version: Version,
    pub timestamp: DateTime<Utc>,
}

impl TodoListEvent {
    /// Creates a TodoListCreated event with a fresh event id.
    pub fn todo_list_created(aggregate_id: AggregateId, user_id: UserId, version: Version) -> Self {
        TodoListEvent::TodoListCreated(TodoListCreatedData {
            aggregate_id,
            event_id: EventId::new(),
            user_id,
            version,
            timestamp: Utc::now(),
        })
    }

    /// Creates a TodoAdded event with a fresh event id.
    pub fn todo_added(
        aggregate_id: AggregateId,
        user_id: UserId,
        text: TodoText,
        version: Version,
    ) -> Self {
        TodoListEvent::TodoAdded(TodoAddedData {
            aggregate_id,
            event_id: EventId::new(),
            user_id,
            text,
            version,
            timestamp: Utc::now(),
        })
    }
}

impl DomainEvent for TodoListEvent {
    fn event_type(&self) -> &'static str {
        match self {
            TodoListEvent::TodoListCreated(_) => TODO_LIST_CREATED,
            TodoListEvent::TodoAdded(_) => TODO_ADDED,
        }
    }

    fn event_id(&self) -> EventId {
        match self {
            TodoListEvent::TodoListCreated(data) => data.event_id,
            TodoListEvent::TodoAdded(data) => data.event_id,
        }
    }

    fn aggregate_id(&self) -> AggregateId {
        match self {
            TodoListEvent::TodoListCreated(data) => data.aggregate_id,
            TodoListEvent::TodoAdded(data) => data.aggregate_id,
        }
    }

    fn version(&self) -> Version {
        match self {
            TodoListEvent::TodoListCreated(data) => data.version,
            TodoListEvent::TodoAdded(data) => data.version,
        }
    }

    fn timestamp(&self) -> DateTime<Utc> {
        match self {
            TodoListEvent::TodoListCreated(data) => data.timestamp,
            TodoListEvent::TodoAdded(data) => data.timestamp,
        }
    }

    /// Stores the variant's data as the payload; the discriminator column
    /// carries the variant.
    fn to_envelope(&self) -> serde_json::Result<EventEnvelope> {
        let (aggregate_id, event_id, version, timestamp) = (
            self.aggregate_id(),
            self.event_id(),
            self.version(),
            self.timestamp(),
        );
        match self {
            TodoListEvent::TodoListCreated(data) => EventEnvelope::encode(
                aggregate_id,
                event_id,
                TODO_LIST_CREATED,
                version,
                timestamp,
                data,
            ),
            TodoListEvent::TodoAdded(data) => {
                EventEnvelope::encode(aggregate_id, event_id, TODO_ADDED, version, timestamp, data)
            }
        }
    }
}

static REGISTRY: LazyLock<EventRegistry<TodoListEvent>> = LazyLock::new(|| {
    EventRegistry::new()
        .register(TODO_LIST_CREATED, |bytes| {
            serde_json::from_slice(bytes).map(TodoListEvent::TodoListCreated)
        })
        .register(TODO_ADDED, |bytes| {
            serde_json::from_slice(bytes).map(TodoListEvent::TodoAdded)
        })
});

/// Decoders for every todo-list event variant.
pub fn registry() -> &'static EventRegistry<TodoListEvent> {
    &REGISTRY
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_events() -> Vec<TodoListEvent> {
        let id = AggregateId::new();
        let user = UserId::new("user123").unwrap();
        vec![
            TodoListEvent::todo_list_created(id, user.clone(), Version::first()),
            TodoListEvent::todo_added(
                id,
                user,
                TodoText::new("Buy milk").unwrap(),
                Version::new(2),
            ),
        ]
    }

    #[test]
    fn every_variant_is_registered() {
        for event in sample_events() {
            assert!(
                registry().contains(event.event_type()),
                "{} has no decoder",
                event.event_type()
            );
        }
        assert_eq!(registry().len(), 2);
    }

    #[test]
    fn envelope_decodes_back_to_the_same_event() {
        for event in sample_events() {
            let envelope = event.to_envelope().unwrap();
            assert_eq!(envelope.event_type, event.event_type());
            assert_eq!(envelope.version, event.version());
            assert_eq!(envelope.event_id, event.event_id());
            assert_eq!(registry().decode(&envelope).unwrap(), event);
        }
    }

    #[test]
    fn unknown_discriminator_is_rejected() {
        let mut envelope = sample_events()[0].to_envelope().unwrap();
        envelope.event_type = "TodoRemoved".to_string();

        let err = registry().decode(&envelope).unwrap_err();
        assert_eq!(err.kind(), common::ErrorKind::UnknownEventType);
    }

    #[test]
    fn payload_with_invalid_text_fails_to_decode() {
        let mut envelope = sample_events()[1].to_envelope().unwrap();
        let mut payload: serde_json::Value = serde_json::from_slice(&envelope.payload).unwrap();
        payload["text"] = serde_json::json!("   ");
        envelope.payload = serde_json::to_vec(&payload).unwrap();

        assert!(registry().decode(&envelope).is_err());
    }
}
