//! Projection processor for replaying stored events into projections.

use std::sync::Arc;

use event_store::{EventRegistry, EventStore};

use crate::Result;
use crate::projection::Projection;

/// Replays the event store into projections.
///
/// Live events reach projections through the bus; the processor covers what
/// the bus cannot: filling read models on startup and rebuilding them.
pub struct ProjectionProcessor<S: EventStore, E: 'static> {
    store: S,
    registry: &'static EventRegistry<E>,
    projections: Vec<Arc<dyn Projection<E>>>,
}

impl<S: EventStore, E: Send + Sync + 'static> ProjectionProcessor<S, E> {
    /// Creates a processor decoding stored rows with `registry`.
    pub fn new(store: S, registry: &'static EventRegistry<E>) -> Self {
        Self {
            store,
            registry,
            projections: Vec::new(),
        }
    }

    /// Registers a projection with this processor.
    pub fn register(&mut self, projection: Arc<dyn Projection<E>>) {
        self.projections.push(projection);
    }

    /// Returns the number of registered projections.
    pub fn projection_count(&self) -> usize {
        self.projections.len()
    }

    /// Delivers every stored event, oldest first, to every projection.
    ///
    /// Safe to repeat: projections ignore events they already reflect.
    /// Returns the number of events replayed.
    #[tracing::instrument(skip(self))]
    pub async fn run_catch_up(&self) -> Result<usize> {
        let envelopes = self.store.load_all().await?;

        for envelope in &envelopes {
            let event = self.registry.decode(envelope)?;
            for projection in &self.projections {
                projection.project(&event).await?;
            }
        }

        tracing::info!(
            events = envelopes.len(),
            projections = self.projections.len(),
            "catch-up complete"
        );

        Ok(envelopes.len())
    }

    /// Resets all projections and replays all events from the store.
    #[tracing::instrument(skip(self))]
    pub async fn rebuild_all(&self) -> Result<usize> {
        for projection in &self.projections {
            tracing::info!(projection = projection.name(), "resetting projection");
            projection.reset().await?;
        }
        self.run_catch_up().await
    }
}

#[cfg(test)]
mod tests {
    use common::AggregateId;
    use domain::{Aggregate, DomainEvent, TodoList, TodoListEvent, TodoText, UserId};
    use event_store::{EventEnvelope, InMemoryEventStore, Version};

    use super::*;
    use crate::{InMemoryTodoListStore, ProjectionError, ReadModelStore, TodoListProjector};

    async fn append(store: &InMemoryEventStore, events: &[TodoListEvent]) {
        let envelopes: Vec<EventEnvelope> =
            events.iter().map(|e| e.to_envelope().unwrap()).collect();
        let aggregate_id = envelopes[0].aggregate_id;
        let mut tx = store.begin().await.unwrap();
        store.append(&mut tx, aggregate_id, &envelopes).await.unwrap();
        store.commit(tx).await.unwrap();
    }

    fn history(id: AggregateId, items: &[&str]) -> Vec<TodoListEvent> {
        let user = UserId::new("user123").unwrap();
        let mut events = vec![TodoListEvent::todo_list_created(
            id,
            user.clone(),
            Version::first(),
        )];
        for (i, item) in items.iter().enumerate() {
            events.push(TodoListEvent::todo_added(
                id,
                user.clone(),
                TodoText::new(item).unwrap(),
                Version::new(i as i64 + 2),
            ));
        }
        events
    }

    fn setup(
        store: InMemoryEventStore,
    ) -> (
        ProjectionProcessor<InMemoryEventStore, TodoListEvent>,
        Arc<TodoListProjector<InMemoryTodoListStore>>,
    ) {
        let projector = Arc::new(TodoListProjector::new(InMemoryTodoListStore::new()));
        let mut processor = ProjectionProcessor::new(store, TodoList::registry());
        processor.register(projector.clone());
        (processor, projector)
    }

    #[tokio::test]
    async fn catch_up_projects_every_list() {
        let store = InMemoryEventStore::new();
        let first = AggregateId::new();
        let second = AggregateId::new();
        append(&store, &history(first, &["Buy milk", "Walk dog"])).await;
        append(&store, &history(second, &[])).await;

        let (processor, projector) = setup(store);
        assert_eq!(processor.projection_count(), 1);

        let replayed = processor.run_catch_up().await.unwrap();

        assert_eq!(replayed, 4);
        assert_eq!(projector.get_list(first).await.unwrap().item_count(), 2);
        assert_eq!(projector.get_list(second).await.unwrap().item_count(), 0);
    }

    #[tokio::test]
    async fn repeated_catch_up_is_idempotent() {
        let store = InMemoryEventStore::new();
        let id = AggregateId::new();
        append(&store, &history(id, &["Buy milk"])).await;

        let (processor, projector) = setup(store);
        processor.run_catch_up().await.unwrap();
        processor.run_catch_up().await.unwrap();

        let view = projector.get_list(id).await.unwrap();
        assert_eq!(view.item_count(), 1);
        assert_eq!(view.version, Version::new(2));
    }

    #[tokio::test]
    async fn rebuild_resets_and_replays() {
        let store = InMemoryEventStore::new();
        let id = AggregateId::new();
        append(&store, &history(id, &["Buy milk", "Walk dog", "Pay rent"])).await;

        let (processor, projector) = setup(store);
        processor.run_catch_up().await.unwrap();
        processor.rebuild_all().await.unwrap();

        let view = projector.get_list(id).await.unwrap();
        assert_eq!(view.item_count(), 3);
        assert_eq!(view.version, Version::new(4));
    }

    #[tokio::test]
    async fn unknown_stored_event_fails_catch_up() {
        let store = InMemoryEventStore::new();
        let id = AggregateId::new();
        let mut envelope = history(id, &[])[0].to_envelope().unwrap();
        envelope.event_type = "TodoListArchived".to_string();
        let mut tx = store.begin().await.unwrap();
        store.append(&mut tx, id, &[envelope]).await.unwrap();
        store.commit(tx).await.unwrap();

        let (processor, _projector) = setup(store);
        let err = processor.run_catch_up().await.unwrap_err();

        assert!(matches!(err, ProjectionError::EventStore(_)));
        assert_eq!(err.kind(), common::ErrorKind::UnknownEventType);
    }

    #[tokio::test]
    async fn empty_store_catch_up() {
        let (processor, projector) = setup(InMemoryEventStore::new());
        assert_eq!(processor.run_catch_up().await.unwrap(), 0);
        assert_eq!(projector.store().count().await, 0);
    }
}
