//! Core aggregate and domain event traits.

use chrono::{DateTime, Utc};
use common::AggregateId;
use event_store::{EventEnvelope, EventId, EventRegistry, Version};
use serde::{Serialize, de::DeserializeOwned};

use crate::error::DomainError;

/// Trait for domain events.
///
/// Domain events represent facts that have happened in the domain.
/// They are immutable and should be named in past tense.
pub trait DomainEvent: Serialize + DeserializeOwned + Send + Sync + Clone + 'static {
    /// Returns the event type name stored alongside the payload.
    fn event_type(&self) -> &'static str;

    fn event_id(&self) -> EventId;

    fn aggregate_id(&self) -> AggregateId;

    /// Version of the aggregate after this event.
    fn version(&self) -> Version;

    fn timestamp(&self) -> DateTime<Utc>;

    /// Serializes the event into a storable row.
    fn to_envelope(&self) -> serde_json::Result<EventEnvelope>;
}

/// Trait for aggregates in an event-sourced system.
///
/// An aggregate is rebuilt from its history for every command, decides whether
/// the command is allowed, and records the resulting events in an uncommitted
/// buffer. The buffer is cleared only once the events are durable.
pub trait Aggregate: Default + Send + Sync + Sized {
    /// The type of events this aggregate produces and consumes.
    type Event: DomainEvent;

    /// The type of errors this aggregate can produce.
    type Error: std::error::Error + Send + Sync;

    /// Returns the aggregate type name.
    fn aggregate_type() -> &'static str;

    /// Decoders for every event variant of this aggregate.
    fn registry() -> &'static EventRegistry<Self::Event>;

    /// Returns None for a new, uninitialized aggregate.
    fn id(&self) -> Option<AggregateId>;

    /// Version of the last applied event, 0 when none.
    fn version(&self) -> Version;

    /// Applies an event to the aggregate, updating its state.
    ///
    /// Must be deterministic and infallible: events are facts.
    fn apply(&mut self, event: &Self::Event);

    /// Events recorded by commands and not yet persisted.
    fn uncommitted_events(&self) -> &[Self::Event];

    /// Clears the uncommitted buffer after a successful commit.
    fn mark_events_as_committed(&mut self);

    /// Rebuilds state from stored rows, oldest first.
    ///
    /// Leaves the uncommitted buffer untouched.
    fn hydrate(&mut self, history: &[EventEnvelope]) -> Result<(), DomainError> {
        let registry = Self::registry();
        for envelope in history {
            let event = registry.decode(envelope)?;
            self.apply(&event);
        }
        Ok(())
    }
}
