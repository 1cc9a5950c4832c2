use async_trait::async_trait;

use crate::HandlerError;

/// Consumer of published events.
#[async_trait]
pub trait EventHandler<E>: Send + Sync {
    /// Name used in logs and errors.
    fn name(&self) -> &'static str;

    /// Handles one event. May be called more than once for the same event.
    async fn handle(&self, event: &E) -> Result<(), HandlerError>;
}
