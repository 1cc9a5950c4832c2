use std::collections::HashSet;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;

use crate::{
    AggregateId, EventEnvelope, EventId, EventStoreError, Result, Version,
    store::{EventStore, validate_events_for_append},
};

#[derive(Debug, Default)]
struct MemoryLog {
    /// Committed rows in insertion order.
    events: Vec<EventEnvelope>,
    /// Unique index on `(aggregate_id, version)`, including keys reserved by
    /// transactions that have not finished yet.
    keys: HashSet<(AggregateId, Version)>,
    /// Primary key on `event_id`, reserved the same way.
    event_ids: HashSet<EventId>,
}

fn lock(log: &Mutex<MemoryLog>) -> MutexGuard<'_, MemoryLog> {
    // No operation leaves the log half-updated, so a poisoned lock is safe to reuse.
    log.lock().unwrap_or_else(PoisonError::into_inner)
}

/// In-memory event store implementation.
///
/// Behaves like the PostgreSQL store under concurrency: an append reserves its
/// `(aggregate_id, version)` keys immediately, so a second transaction
/// inserting the same key fails with `OptimisticLock` even before the first
/// one commits. Rolling back (or dropping) a transaction releases its keys.
#[derive(Clone, Default)]
pub struct InMemoryEventStore {
    log: Arc<Mutex<MemoryLog>>,
}

impl InMemoryEventStore {
    /// Creates a new empty in-memory event store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of committed events.
    pub fn event_count(&self) -> usize {
        lock(&self.log).events.len()
    }

    /// Clears all committed events.
    pub fn clear(&self) {
        let mut log = lock(&self.log);
        log.events.clear();
        log.keys.clear();
        log.event_ids.clear();
    }
}

/// Open transaction on an [`InMemoryEventStore`].
pub struct InMemoryTransaction {
    log: Arc<Mutex<MemoryLog>>,
    staged: Vec<EventEnvelope>,
    open: bool,
}

impl InMemoryTransaction {
    fn release(&mut self) {
        if !self.open {
            return;
        }
        self.open = false;
        let staged = std::mem::take(&mut self.staged);
        if staged.is_empty() {
            return;
        }
        let mut log = lock(&self.log);
        for event in &staged {
            log.keys.remove(&(event.aggregate_id, event.version));
            log.event_ids.remove(&event.event_id);
        }
    }
}

impl Drop for InMemoryTransaction {
    fn drop(&mut self) {
        self.release();
    }
}

#[async_trait]
impl EventStore for InMemoryEventStore {
    type Tx = InMemoryTransaction;

    async fn begin(&self) -> Result<Self::Tx> {
        Ok(InMemoryTransaction {
            log: Arc::clone(&self.log),
            staged: Vec::new(),
            open: true,
        })
    }

    async fn commit(&self, mut tx: Self::Tx) -> Result<()> {
        if !tx.open {
            return Err(EventStoreError::Repository {
                message: "transaction already finished".to_string(),
                source: None,
            });
        }
        let staged = std::mem::take(&mut tx.staged);
        tx.open = false;

        // The keys stay in the index: they now belong to committed rows.
        lock(&self.log).events.extend(staged);
        Ok(())
    }

    async fn rollback(&self, mut tx: Self::Tx) -> Result<()> {
        tx.release();
        Ok(())
    }

    async fn append(
        &self,
        tx: &mut Self::Tx,
        aggregate_id: AggregateId,
        events: &[EventEnvelope],
    ) -> Result<()> {
        validate_events_for_append(aggregate_id, events)?;

        let mut log = lock(&self.log);

        if let Some(taken) = events
            .iter()
            .find(|e| log.keys.contains(&(e.aggregate_id, e.version)))
        {
            metrics::counter!("event_store_optimistic_lock_conflicts").increment(1);
            return Err(EventStoreError::OptimisticLock {
                aggregate_id,
                version: taken.version,
            });
        }

        let mut batch_ids = HashSet::with_capacity(events.len());
        if let Some(taken) = events
            .iter()
            .find(|e| log.event_ids.contains(&e.event_id) || !batch_ids.insert(e.event_id))
        {
            return Err(EventStoreError::Repository {
                message: format!("event {} is already stored", taken.event_id),
                source: None,
            });
        }

        for event in events {
            log.keys.insert((event.aggregate_id, event.version));
            log.event_ids.insert(event.event_id);
        }
        tx.staged.extend_from_slice(events);

        metrics::counter!("event_store_events_appended").increment(events.len() as u64);
        Ok(())
    }

    async fn load(
        &self,
        tx: &mut Self::Tx,
        aggregate_id: AggregateId,
    ) -> Result<Vec<EventEnvelope>> {
        let log = lock(&self.log);
        let mut events: Vec<_> = log
            .events
            .iter()
            .chain(tx.staged.iter())
            .filter(|e| e.aggregate_id == aggregate_id)
            .cloned()
            .collect();

        if events.is_empty() {
            return Err(EventStoreError::AggregateNotFound(aggregate_id));
        }

        events.sort_by_key(|e| e.version);
        Ok(events)
    }

    async fn load_all(&self) -> Result<Vec<EventEnvelope>> {
        let mut events = lock(&self.log).events.clone();
        events.sort_by(|a, b| {
            a.created_at
                .cmp(&b.created_at)
                .then(a.version.cmp(&b.version))
        });
        Ok(events)
    }
}
