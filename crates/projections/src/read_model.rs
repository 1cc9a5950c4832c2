//! Storage for projected views.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use common::AggregateId;
use tokio::sync::RwLock;

use crate::view::TodoListView;
use crate::{ProjectionError, Result};

/// Keyed storage for [`TodoListView`]s.
///
/// The store does no validation; the projector decides what to write.
#[async_trait]
pub trait ReadModelStore: Send + Sync {
    /// Returns a copy of the view, or [`ProjectionError::NotFound`].
    async fn get(&self, aggregate_id: AggregateId) -> Result<TodoListView>;

    /// Inserts or replaces the view stored under its aggregate id.
    async fn upsert(&self, view: TodoListView) -> Result<()>;

    /// Number of stored views.
    async fn count(&self) -> usize;

    /// Removes every view.
    async fn clear(&self) -> Result<()>;
}

/// Read model store backed by a map.
///
/// Clones share the same map. Readers always receive copies.
#[derive(Clone, Default)]
pub struct InMemoryTodoListStore {
    views: Arc<RwLock<HashMap<AggregateId, TodoListView>>>,
}

impl InMemoryTodoListStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ReadModelStore for InMemoryTodoListStore {
    async fn get(&self, aggregate_id: AggregateId) -> Result<TodoListView> {
        self.views
            .read()
            .await
            .get(&aggregate_id)
            .cloned()
            .ok_or(ProjectionError::NotFound(aggregate_id))
    }

    async fn upsert(&self, view: TodoListView) -> Result<()> {
        self.views.write().await.insert(view.aggregate_id, view);
        Ok(())
    }

    async fn count(&self) -> usize {
        self.views.read().await.len()
    }

    async fn clear(&self) -> Result<()> {
        self.views.write().await.clear();
        Ok(())
    }
}
