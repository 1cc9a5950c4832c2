pub mod error;
pub mod event;
pub mod memory;
pub mod postgres;
pub mod registry;
pub mod store;
pub mod unit_of_work;

pub use common::{AggregateId, ErrorKind};
pub use error::{EventStoreError, Result};
pub use event::{EventEnvelope, EventId, Version};
pub use memory::{InMemoryEventStore, InMemoryTransaction};
pub use postgres::PostgresEventStore;
pub use registry::EventRegistry;
pub use store::EventStore;
pub use unit_of_work::{AfterCommitHook, HookError, UnitOfWork};
