//! Read models and projections for the CQRS query side.
//!
//! - [`TodoListProjector`] folds published events into [`TodoListView`]s,
//!   deduplicating by event id
//! - [`ReadModelStore`] holds the views; [`InMemoryTodoListStore`] keeps them
//!   in a map
//! - [`ProjectionProcessor`] replays the event store on startup

pub mod error;
pub mod processor;
pub mod projection;
pub mod projector;
pub mod read_model;
pub mod view;

pub use error::{ProjectionError, Result};
pub use processor::ProjectionProcessor;
pub use projection::Projection;
pub use projector::TodoListProjector;
pub use read_model::{InMemoryTodoListStore, ReadModelStore};
pub use view::{TodoItemView, TodoListView};
