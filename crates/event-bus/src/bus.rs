use std::sync::Arc;

use tokio::sync::RwLock;

use crate::{BusError, EventHandler, Result};

/// Synchronous in-memory pub/sub bus.
///
/// `publish` awaits every handler for every event before returning. The
/// handler list is copied before dispatch, so a handler may subscribe
/// further handlers without deadlocking; those only see later publishes.
pub struct InMemoryEventBus<E> {
    handlers: RwLock<Vec<Arc<dyn EventHandler<E>>>>,
}

impl<E: Send + Sync> InMemoryEventBus<E> {
    pub fn new() -> Self {
        Self {
            handlers: RwLock::new(Vec::new()),
        }
    }

    /// Adds a handler. There is no unsubscribe.
    pub async fn subscribe(&self, handler: Arc<dyn EventHandler<E>>) {
        tracing::info!(handler = handler.name(), "subscribed event handler");
        self.handlers.write().await.push(handler);
    }

    pub async fn handler_count(&self) -> usize {
        self.handlers.read().await.len()
    }

    /// Delivers `events` in order to every handler in registration order.
    ///
    /// The first handler error aborts the rest of this call.
    pub async fn publish(&self, events: &[E]) -> Result<()> {
        let handlers = self.handlers.read().await.clone();

        for event in events {
            for handler in &handlers {
                handler
                    .handle(event)
                    .await
                    .map_err(|source| BusError::Handler {
                        handler: handler.name(),
                        source,
                    })?;
            }
        }

        tracing::debug!(
            events = events.len(),
            handlers = handlers.len(),
            "published events"
        );
        Ok(())
    }
}

impl<E: Send + Sync> Default for InMemoryEventBus<E> {
    fn default() -> Self {
        Self::new()
    }
}
