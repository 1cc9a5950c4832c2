//! Projector maintaining [`TodoListView`]s from published events.

use std::collections::HashSet;

use async_trait::async_trait;
use common::AggregateId;
use domain::{DomainEvent, TodoAddedData, TodoListCreatedData, TodoListEvent};
use event_bus::{EventHandler, HandlerError};
use event_store::EventId;
use tokio::sync::Mutex;

use crate::projection::Projection;
use crate::read_model::ReadModelStore;
use crate::view::{TodoItemView, TodoListView};
use crate::{ProjectionError, Result};

/// What handling one event did to the read model.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Outcome {
    Applied,
    /// Already reflected in the view.
    Skipped,
    /// Could not be applied; not remembered so a redelivery can still land.
    Dropped,
}

/// Idempotent projector for todo lists.
///
/// Events are deduplicated by id. The id set lives as long as the projector
/// and is never pruned. One mutex covers the id set and the
/// read-modify-write of the view, so concurrent deliveries never interleave.
pub struct TodoListProjector<R: ReadModelStore> {
    store: R,
    seen: Mutex<HashSet<EventId>>,
}

impl<R: ReadModelStore> TodoListProjector<R> {
    pub fn new(store: R) -> Self {
        Self {
            store,
            seen: Mutex::new(HashSet::new()),
        }
    }

    pub fn store(&self) -> &R {
        &self.store
    }

    /// Returns a copy of the projected list.
    pub async fn get_list(&self, aggregate_id: AggregateId) -> Result<TodoListView> {
        self.store.get(aggregate_id).await
    }

    /// Number of distinct events remembered.
    pub async fn seen_count(&self) -> usize {
        self.seen.lock().await.len()
    }

    /// Folds one event into the read model.
    #[tracing::instrument(skip(self, event), fields(event_type = event.event_type(), version = %event.version()))]
    pub async fn handle(&self, event: &TodoListEvent) -> Result<()> {
        let mut seen = self.seen.lock().await;
        let event_id = event.event_id();

        if seen.contains(&event_id) {
            tracing::debug!(%event_id, "duplicate event ignored");
            return Ok(());
        }

        let outcome = match event {
            TodoListEvent::TodoListCreated(data) => self.on_created(data).await?,
            TodoListEvent::TodoAdded(data) => self.on_todo_added(data).await?,
        };

        match outcome {
            Outcome::Applied => {
                seen.insert(event_id);
                metrics::counter!("projections_events_processed").increment(1);
            }
            Outcome::Skipped => {
                seen.insert(event_id);
            }
            Outcome::Dropped => {
                metrics::counter!("projections_events_dropped").increment(1);
            }
        }

        Ok(())
    }

    async fn existing_view(&self, aggregate_id: AggregateId) -> Result<Option<TodoListView>> {
        match self.store.get(aggregate_id).await {
            Ok(view) => Ok(Some(view)),
            Err(ProjectionError::NotFound(_)) => Ok(None),
            Err(e) => Err(e),
        }
    }

    async fn on_created(&self, data: &TodoListCreatedData) -> Result<Outcome> {
        if let Some(view) = self.existing_view(data.aggregate_id).await?
            && view.version >= data.version
        {
            tracing::debug!(aggregate_id = %data.aggregate_id, "view already newer than creation");
            return Ok(Outcome::Skipped);
        }

        self.store
            .upsert(TodoListView {
                aggregate_id: data.aggregate_id,
                user_id: data.user_id.clone(),
                items: Vec::new(),
                version: data.version,
                updated_at: data.timestamp,
            })
            .await?;
        Ok(Outcome::Applied)
    }

    async fn on_todo_added(&self, data: &TodoAddedData) -> Result<Outcome> {
        let Some(mut view) = self.existing_view(data.aggregate_id).await? else {
            tracing::warn!(
                aggregate_id = %data.aggregate_id,
                version = %data.version,
                "todo added before list was projected, dropping"
            );
            return Ok(Outcome::Dropped);
        };

        if data.version <= view.version {
            tracing::debug!(
                aggregate_id = %data.aggregate_id,
                event_version = %data.version,
                view_version = %view.version,
                "stale event ignored"
            );
            return Ok(Outcome::Skipped);
        }

        if data.version > view.version.next() {
            tracing::debug!(
                aggregate_id = %data.aggregate_id,
                event_version = %data.version,
                view_version = %view.version,
                "version gap accepted"
            );
        }

        view.items.push(TodoItemView {
            text: data.text.clone(),
        });
        view.version = data.version;
        view.updated_at = data.timestamp;
        self.store.upsert(view).await?;
        Ok(Outcome::Applied)
    }
}

#[async_trait]
impl<R: ReadModelStore> Projection<TodoListEvent> for TodoListProjector<R> {
    fn name(&self) -> &'static str {
        "TodoListProjector"
    }

    async fn project(&self, event: &TodoListEvent) -> Result<()> {
        self.handle(event).await
    }

    async fn reset(&self) -> Result<()> {
        let mut seen = self.seen.lock().await;
        seen.clear();
        self.store.clear().await
    }
}

#[async_trait]
impl<R: ReadModelStore> EventHandler<TodoListEvent> for TodoListProjector<R> {
    fn name(&self) -> &'static str {
        "TodoListProjector"
    }

    async fn handle(&self, event: &TodoListEvent) -> std::result::Result<(), HandlerError> {
        TodoListProjector::handle(self, event)
            .await
            .map_err(HandlerError::from)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use domain::{TodoText, UserId};
    use event_store::Version;

    use super::*;
    use crate::read_model::InMemoryTodoListStore;

    fn user() -> UserId {
        UserId::new("user123").unwrap()
    }

    fn created(id: AggregateId) -> TodoListEvent {
        TodoListEvent::todo_list_created(id, user(), Version::first())
    }

    fn added(id: AggregateId, text: &str, version: i64) -> TodoListEvent {
        TodoListEvent::todo_added(id, user(), TodoText::new(text).unwrap(), Version::new(version))
    }

    fn projector() -> TodoListProjector<InMemoryTodoListStore> {
        TodoListProjector::new(InMemoryTodoListStore::new())
    }

    fn texts(view: &TodoListView) -> Vec<&str> {
        view.items.iter().map(|i| i.text.as_str()).collect()
    }

    #[tokio::test]
    async fn created_then_added_builds_view() {
        let projector = projector();
        let id = AggregateId::new();

        projector.handle(&created(id)).await.unwrap();
        projector.handle(&added(id, "Buy milk", 2)).await.unwrap();

        let view = projector.get_list(id).await.unwrap();
        assert_eq!(view.user_id, user());
        assert_eq!(view.version, Version::new(2));
        assert_eq!(texts(&view), vec!["Buy milk"]);
    }

    #[tokio::test]
    async fn duplicate_delivery_is_a_no_op() {
        let projector = projector();
        let id = AggregateId::new();
        let add = added(id, "Buy milk", 2);

        projector.handle(&created(id)).await.unwrap();
        projector.handle(&add).await.unwrap();
        projector.handle(&add).await.unwrap();

        let view = projector.get_list(id).await.unwrap();
        assert_eq!(view.item_count(), 1);
        assert_eq!(projector.seen_count().await, 2);
    }

    #[tokio::test]
    async fn stale_version_is_ignored() {
        let projector = projector();
        let id = AggregateId::new();

        projector.handle(&created(id)).await.unwrap();
        projector.handle(&added(id, "Buy milk", 2)).await.unwrap();
        // A different event carrying an already-projected version.
        projector.handle(&added(id, "Walk dog", 2)).await.unwrap();

        let view = projector.get_list(id).await.unwrap();
        assert_eq!(texts(&view), vec!["Buy milk"]);
    }

    #[tokio::test]
    async fn version_gap_is_accepted() {
        let projector = projector();
        let id = AggregateId::new();

        projector.handle(&created(id)).await.unwrap();
        projector.handle(&added(id, "Pay rent", 4)).await.unwrap();

        let view = projector.get_list(id).await.unwrap();
        assert_eq!(view.version, Version::new(4));
        assert_eq!(view.item_count(), 1);
    }

    #[tokio::test]
    async fn added_before_created_is_dropped_but_can_be_redelivered() {
        let projector = projector();
        let id = AggregateId::new();
        let add = added(id, "Buy milk", 2);

        projector.handle(&add).await.unwrap();
        assert!(matches!(
            projector.get_list(id).await,
            Err(ProjectionError::NotFound(_))
        ));
        assert_eq!(projector.seen_count().await, 0);

        projector.handle(&created(id)).await.unwrap();
        projector.handle(&add).await.unwrap();

        let view = projector.get_list(id).await.unwrap();
        assert_eq!(texts(&view), vec!["Buy milk"]);
    }

    #[tokio::test]
    async fn late_creation_does_not_wipe_newer_view() {
        let projector = projector();
        let id = AggregateId::new();
        let creation = created(id);

        projector.handle(&creation).await.unwrap();
        projector.handle(&added(id, "Buy milk", 2)).await.unwrap();
        projector.reset_seen_for_test().await;
        projector.handle(&creation).await.unwrap();

        assert_eq!(projector.get_list(id).await.unwrap().item_count(), 1);
    }

    #[tokio::test]
    async fn concurrent_redeliveries_apply_once() {
        let projector = Arc::new(projector());
        let id = AggregateId::new();
        projector.handle(&created(id)).await.unwrap();
        let add = added(id, "Buy milk", 2);

        let tasks: Vec<_> = (0..8)
            .map(|_| {
                let projector = Arc::clone(&projector);
                let add = add.clone();
                tokio::spawn(async move { projector.handle(&add).await })
            })
            .collect();
        for task in tasks {
            task.await.unwrap().unwrap();
        }

        let view = projector.get_list(id).await.unwrap();
        assert_eq!(view.item_count(), 1);
        assert_eq!(view.version, Version::new(2));
    }

    #[tokio::test]
    async fn reset_forgets_views_and_ids() {
        let projector = projector();
        let id = AggregateId::new();
        projector.handle(&created(id)).await.unwrap();

        Projection::reset(&projector).await.unwrap();

        assert_eq!(projector.seen_count().await, 0);
        assert_eq!(projector.store().count().await, 0);
    }

    impl<R: ReadModelStore> TodoListProjector<R> {
        async fn reset_seen_for_test(&self) {
            self.seen.lock().await.clear();
        }
    }
}
