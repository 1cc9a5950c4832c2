use thiserror::Error;

use crate::unit_of_work::HookError;
use crate::{AggregateId, ErrorKind, Version};

/// Errors that can occur when interacting with the event store.
#[derive(Debug, Error)]
pub enum EventStoreError {
    /// The `(aggregate_id, version)` row already exists: another writer got
    /// there first.
    #[error("Optimistic lock conflict for aggregate {aggregate_id} at version {version}")]
    OptimisticLock {
        aggregate_id: AggregateId,
        version: Version,
    },

    /// No events are stored for the aggregate.
    #[error("Aggregate not found: {0}")]
    AggregateNotFound(AggregateId),

    /// A stored event's discriminator has no registered decoder.
    #[error("Unknown event type: {0}")]
    UnknownEventType(String),

    /// Writing to storage or managing the transaction failed.
    #[error("Repository error: {message}")]
    Repository {
        message: String,
        #[source]
        source: Option<sqlx::Error>,
    },

    /// Reading from storage failed.
    #[error("Query error: {message}")]
    Query {
        message: String,
        #[source]
        source: Option<sqlx::Error>,
    },

    /// A database migration error occurred.
    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    /// A payload could not be encoded or decoded.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The transaction committed but a post-commit hook failed.
    #[error("After-commit hook failed: {0}")]
    AfterCommit(#[source] HookError),
}

impl EventStoreError {
    pub(crate) fn repository(message: impl Into<String>, source: sqlx::Error) -> Self {
        Self::Repository {
            message: message.into(),
            source: Some(source),
        }
    }

    pub(crate) fn query(message: impl Into<String>, source: sqlx::Error) -> Self {
        Self::Query {
            message: message.into(),
            source: Some(source),
        }
    }

    /// Classifies the error for retry and transport decisions.
    pub fn kind(&self) -> ErrorKind {
        match self {
            EventStoreError::OptimisticLock { .. } => ErrorKind::OptimisticLock,
            EventStoreError::AggregateNotFound(_) => ErrorKind::NotFound,
            EventStoreError::UnknownEventType(_) => ErrorKind::UnknownEventType,
            EventStoreError::Query { .. } | EventStoreError::Serialization(_) => ErrorKind::Query,
            EventStoreError::Repository { .. }
            | EventStoreError::Migration(_)
            | EventStoreError::AfterCommit(_) => ErrorKind::Repository,
        }
    }
}

/// Result type for event store operations.
pub type Result<T> = std::result::Result<T, EventStoreError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kinds_are_structural() {
        let conflict = EventStoreError::OptimisticLock {
            aggregate_id: AggregateId::new(),
            version: Version::new(2),
        };
        assert_eq!(conflict.kind(), ErrorKind::OptimisticLock);

        let missing = EventStoreError::AggregateNotFound(AggregateId::new());
        assert_eq!(missing.kind(), ErrorKind::NotFound);

        let unknown = EventStoreError::UnknownEventType("TodoRenamed".to_string());
        assert_eq!(unknown.kind(), ErrorKind::UnknownEventType);

        let repo = EventStoreError::Repository {
            message: "duplicate key value violates unique constraint".to_string(),
            source: None,
        };
        // Message text never influences classification.
        assert_eq!(repo.kind(), ErrorKind::Repository);
    }
}
