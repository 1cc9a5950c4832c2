use std::collections::HashMap;

use crate::{EventEnvelope, EventStoreError, Result};

/// Decodes one payload into the domain event type.
pub type Decoder<E> = fn(&[u8]) -> serde_json::Result<E>;

/// Maps stored discriminators to decode functions.
///
/// A stored event whose `event_type` was never registered fails with
/// [`EventStoreError::UnknownEventType`] instead of being skipped.
pub struct EventRegistry<E> {
    decoders: HashMap<&'static str, Decoder<E>>,
}

impl<E> EventRegistry<E> {
    pub fn new() -> Self {
        Self {
            decoders: HashMap::new(),
        }
    }

    /// Registers `decoder` for `event_type`, replacing any previous one.
    pub fn register(mut self, event_type: &'static str, decoder: Decoder<E>) -> Self {
        self.decoders.insert(event_type, decoder);
        self
    }

    pub fn contains(&self, event_type: &str) -> bool {
        self.decoders.contains_key(event_type)
    }

    pub fn len(&self) -> usize {
        self.decoders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.decoders.is_empty()
    }

    pub fn decode(&self, envelope: &EventEnvelope) -> Result<E> {
        let decoder = self
            .decoders
            .get(envelope.event_type.as_str())
            .ok_or_else(|| EventStoreError::UnknownEventType(envelope.event_type.clone()))?;
        Ok(decoder(&envelope.payload)?)
    }

    /// Decodes a whole history, stopping at the first failure.
    pub fn decode_all(&self, envelopes: &[EventEnvelope]) -> Result<Vec<E>> {
        envelopes.iter().map(|envelope| self.decode(envelope)).collect()
    }
}

impl<E> Default for EventRegistry<E> {
    fn default() -> Self {
        Self::new()
    }
}
