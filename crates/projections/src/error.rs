//! Projection error types.

use common::{AggregateId, ErrorKind};
use thiserror::Error;

/// Errors that can occur during projection processing.
#[derive(Debug, Error)]
pub enum ProjectionError {
    /// No view has been projected for the aggregate yet.
    #[error("View not found: {0}")]
    NotFound(AggregateId),

    /// Reading or decoding stored events failed.
    #[error("Event store error: {0}")]
    EventStore(#[from] event_store::EventStoreError),
}

impl ProjectionError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ProjectionError::NotFound(_) => ErrorKind::NotFound,
            ProjectionError::EventStore(e) => e.kind(),
        }
    }
}

/// Result type for projection operations.
pub type Result<T> = std::result::Result<T, ProjectionError>;
