use async_trait::async_trait;

use crate::{AggregateId, EventEnvelope, EventStoreError, Result};

/// Core trait for event store implementations.
///
/// Writes and per-aggregate reads happen inside a transaction owned by the
/// caller, so that a command's load-decide-append cycle sees one consistent
/// snapshot and its rows become durable together. All implementations must be
/// thread-safe (Send + Sync).
#[async_trait]
pub trait EventStore: Send + Sync {
    /// Handle of an open transaction.
    type Tx: Send;

    /// Opens a read-write transaction.
    async fn begin(&self) -> Result<Self::Tx>;

    /// Makes every row appended through `tx` durable.
    async fn commit(&self, tx: Self::Tx) -> Result<()>;

    /// Discards every row appended through `tx`.
    async fn rollback(&self, tx: Self::Tx) -> Result<()>;

    /// Inserts one row per event.
    ///
    /// A row whose `(aggregate_id, version)` already exists fails the whole
    /// call with [`EventStoreError::OptimisticLock`]; any other storage failure
    /// surfaces as [`EventStoreError::Repository`].
    async fn append(
        &self,
        tx: &mut Self::Tx,
        aggregate_id: AggregateId,
        events: &[EventEnvelope],
    ) -> Result<()>;

    /// Returns the aggregate's events in ascending version order.
    ///
    /// Fails with [`EventStoreError::AggregateNotFound`] when there are none;
    /// this is how callers learn that an aggregate does not exist.
    async fn load(&self, tx: &mut Self::Tx, aggregate_id: AggregateId)
    -> Result<Vec<EventEnvelope>>;

    /// Returns every committed event, ordered by creation time then version.
    ///
    /// Used to rebuild read models; runs outside any command transaction.
    async fn load_all(&self) -> Result<Vec<EventEnvelope>>;
}

/// Checks that a batch targets one aggregate with consecutive versions.
pub fn validate_events_for_append(
    aggregate_id: AggregateId,
    events: &[EventEnvelope],
) -> Result<()> {
    let invalid = |message: String| EventStoreError::Repository {
        message,
        source: None,
    };

    let Some(first) = events.first() else {
        return Err(invalid("cannot append empty event list".to_string()));
    };

    let mut expected_version = first.version;
    for (index, event) in events.iter().enumerate() {
        if event.aggregate_id != aggregate_id {
            return Err(invalid(format!(
                "event {} belongs to aggregate {}, not {}",
                event.event_id, event.aggregate_id, aggregate_id
            )));
        }
        if index > 0 {
            expected_version = expected_version.next();
            if event.version != expected_version {
                return Err(invalid(format!(
                    "event versions must be sequential: expected {}, got {}",
                    expected_version, event.version
                )));
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;
    use crate::{EventId, Version};

    fn envelope(aggregate_id: AggregateId, version: i64) -> EventEnvelope {
        EventEnvelope {
            aggregate_id,
            event_id: EventId::new(),
            event_type: "TodoAdded".to_string(),
            payload: b"{}".to_vec(),
            version: Version::new(version),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn accepts_consecutive_batch() {
        let id = AggregateId::new();
        let events = vec![envelope(id, 2), envelope(id, 3)];
        assert!(validate_events_for_append(id, &events).is_ok());
    }

    #[test]
    fn rejects_empty_batch() {
        assert!(validate_events_for_append(AggregateId::new(), &[]).is_err());
    }

    #[test]
    fn rejects_foreign_aggregate() {
        let id = AggregateId::new();
        let events = vec![envelope(id, 1), envelope(AggregateId::new(), 2)];
        assert!(validate_events_for_append(id, &events).is_err());
    }

    #[test]
    fn rejects_version_gap() {
        let id = AggregateId::new();
        let events = vec![envelope(id, 1), envelope(id, 3)];
        assert!(validate_events_for_append(id, &events).is_err());
    }
}
