//! Transaction wrapper with post-commit hooks.

use std::future::Future;

use futures_util::future::BoxFuture;

use crate::store::EventStore;
use crate::{AggregateId, EventEnvelope, EventStoreError, Result};

/// Error returned by an after-commit hook.
pub type HookError = Box<dyn std::error::Error + Send + Sync>;

/// Side effect deferred until the surrounding transaction has committed.
pub type AfterCommitHook =
    Box<dyn FnOnce() -> BoxFuture<'static, std::result::Result<(), HookError>> + Send>;

/// One read-write transaction against an [`EventStore`].
///
/// Hooks registered with [`after_commit`](Self::after_commit) run in
/// registration order once the commit succeeded, and never on rollback, so
/// nothing outside the store can observe rows that are not durable yet.
pub struct UnitOfWork<'s, S: EventStore> {
    store: &'s S,
    tx: S::Tx,
    after_commit: Vec<AfterCommitHook>,
}

impl<'s, S: EventStore> UnitOfWork<'s, S> {
    /// Opens a transaction on `store`.
    pub async fn begin(store: &'s S) -> Result<Self> {
        let tx = store.begin().await?;
        Ok(Self {
            store,
            tx,
            after_commit: Vec::new(),
        })
    }

    pub async fn load(&mut self, aggregate_id: AggregateId) -> Result<Vec<EventEnvelope>> {
        self.store.load(&mut self.tx, aggregate_id).await
    }

    pub async fn append(
        &mut self,
        aggregate_id: AggregateId,
        events: &[EventEnvelope],
    ) -> Result<()> {
        self.store.append(&mut self.tx, aggregate_id, events).await
    }

    /// Defers `hook` until after a successful commit.
    pub fn after_commit<F, Fut>(&mut self, hook: F)
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = std::result::Result<(), HookError>> + Send + 'static,
    {
        self.after_commit.push(Box::new(move || Box::pin(hook())));
    }

    /// Number of hooks waiting for the commit.
    pub fn pending_hooks(&self) -> usize {
        self.after_commit.len()
    }

    /// Commits, then runs the hooks.
    ///
    /// A failing hook stops the remaining hooks and is reported as
    /// [`EventStoreError::AfterCommit`]; the rows stay committed.
    pub async fn commit(self) -> Result<()> {
        let Self {
            store,
            tx,
            after_commit,
        } = self;

        store.commit(tx).await?;

        for hook in after_commit {
            hook().await.map_err(EventStoreError::AfterCommit)?;
        }

        Ok(())
    }

    /// Discards the transaction and its hooks.
    pub async fn rollback(self) -> Result<()> {
        self.store.rollback(self.tx).await
    }
}
