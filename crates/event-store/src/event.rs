use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::AggregateId;

/// Identity of one stored event. The projector deduplicates on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EventId(Uuid);

impl EventId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl Default for EventId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for EventId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        std::fmt::Display::fmt(&self.0, f)
    }
}

/// Position of an event in its aggregate's stream.
///
/// 0 means "no events yet"; the first event carries 1 and each following
/// event exactly one more. `(aggregate_id, version)` is unique in the store.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Version(i64);

impl Version {
    pub fn new(value: i64) -> Self {
        Self(value)
    }

    /// Version of an aggregate with no events.
    pub fn initial() -> Self {
        Self(0)
    }

    /// Version carried by a creation event.
    pub fn first() -> Self {
        Self(1)
    }

    pub fn next(&self) -> Self {
        Self(self.0 + 1)
    }

    pub fn as_i64(&self) -> i64 {
        self.0
    }
}

impl std::fmt::Display for Version {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        std::fmt::Display::fmt(&self.0, f)
    }
}

/// One stored row of the event log.
///
/// Mirrors the persisted shape `(aggregate_id, event_id, event_type,
/// payload, version, created_at)`. The payload is the serialized domain
/// event; `event_type` selects the decoder in an [`EventRegistry`].
///
/// [`EventRegistry`]: crate::EventRegistry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventEnvelope {
    pub aggregate_id: AggregateId,
    pub event_id: EventId,
    pub event_type: String,
    pub payload: Vec<u8>,
    pub version: Version,
    pub created_at: DateTime<Utc>,
}

impl EventEnvelope {
    /// Serializes `payload` as JSON and wraps it with its storage metadata.
    pub fn encode<T: Serialize>(
        aggregate_id: AggregateId,
        event_id: EventId,
        event_type: impl Into<String>,
        version: Version,
        created_at: DateTime<Utc>,
        payload: &T,
    ) -> Result<Self, serde_json::Error> {
        Ok(Self {
            aggregate_id,
            event_id,
            event_type: event_type.into(),
            payload: serde_json::to_vec(payload)?,
            version,
            created_at,
        })
    }
}
