//! In-process event bus.
//!
//! Committed events are fanned out to subscribed handlers synchronously and in
//! registration order. Delivery is at-least-once: a publish that fails halfway
//! may be repeated, so handlers must be idempotent.

pub mod bus;
pub mod error;
pub mod handler;

pub use bus::InMemoryEventBus;
pub use error::{BusError, HandlerError, Result};
pub use handler::EventHandler;
