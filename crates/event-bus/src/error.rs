use common::ErrorKind;
use thiserror::Error;

/// Error type returned by event handlers.
pub type HandlerError = Box<dyn std::error::Error + Send + Sync>;

/// Errors that can occur while publishing.
#[derive(Debug, Error)]
pub enum BusError {
    /// A subscribed handler rejected an event; later handlers and events were
    /// not invoked.
    #[error("Handler {handler} failed: {source}")]
    Handler {
        handler: &'static str,
        #[source]
        source: HandlerError,
    },
}

impl BusError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            BusError::Handler { .. } => ErrorKind::Repository,
        }
    }
}

/// Result type for bus operations.
pub type Result<T> = std::result::Result<T, BusError>;
