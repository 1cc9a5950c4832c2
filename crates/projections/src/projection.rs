//! Core projection trait.

use async_trait::async_trait;

use crate::Result;

/// A projection that folds events into a read model.
///
/// `project` may see the same event more than once (bus redelivery, catch-up
/// after live delivery) and must be idempotent.
#[async_trait]
pub trait Projection<E>: Send + Sync {
    /// Returns the name of this projection.
    fn name(&self) -> &'static str;

    /// Folds a single event into the read model.
    async fn project(&self, event: &E) -> Result<()>;

    /// Resets the projection to its initial state.
    async fn reset(&self) -> Result<()>;
}
