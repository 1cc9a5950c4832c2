//! Command handling infrastructure.

use std::marker::PhantomData;
use std::sync::Arc;

use common::AggregateId;
use event_bus::InMemoryEventBus;
use event_store::{EventStore, HookError, UnitOfWork, Version};

use crate::aggregate::{Aggregate, DomainEvent};
use crate::error::DomainError;
use crate::retry::{RetryPolicy, Sleeper, TokioSleeper};

/// Result of command execution.
#[derive(Debug)]
pub struct CommandResult<A: Aggregate> {
    /// The aggregate after applying the new events.
    pub aggregate: A,

    /// The events that were generated and persisted.
    pub events: Vec<A::Event>,

    /// The new version of the aggregate after the command.
    pub new_version: Version,
}

/// Which aggregate a command runs against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Target {
    /// A fresh aggregate; nothing is loaded.
    New,
    /// An existing aggregate, rebuilt from its history.
    Existing(AggregateId),
}

/// Trait for commands that can be executed against an aggregate.
pub trait Command: Send + Sync {
    /// The type of aggregate this command targets.
    type Aggregate: Aggregate;

    fn target(&self) -> Target;
}

/// Handler for executing commands against aggregates.
///
/// Each attempt runs in its own [`UnitOfWork`]:
/// 1. Load and hydrate the aggregate (skipped for [`Target::New`])
/// 2. Run the command, which records events on the aggregate
/// 3. Append the recorded events
/// 4. Commit, then publish the events on the bus
///
/// An attempt that fails with an optimistic-lock conflict is retried from
/// step 1 according to the [`RetryPolicy`]. Any other failure is returned
/// as-is after rolling back.
pub struct CommandHandler<S, A>
where
    S: EventStore,
    A: Aggregate,
{
    store: S,
    bus: Arc<InMemoryEventBus<A::Event>>,
    retry: RetryPolicy,
    sleeper: Arc<dyn Sleeper>,
    _phantom: PhantomData<A>,
}

impl<S, A> CommandHandler<S, A>
where
    S: EventStore,
    A: Aggregate,
{
    /// Creates a handler with the default retry policy.
    pub fn new(store: S, bus: Arc<InMemoryEventBus<A::Event>>) -> Self {
        Self {
            store,
            bus,
            retry: RetryPolicy::default(),
            sleeper: Arc::new(TokioSleeper),
            _phantom: PhantomData,
        }
    }

    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn with_sleeper(mut self, sleeper: Arc<dyn Sleeper>) -> Self {
        self.sleeper = sleeper;
        self
    }

    /// Returns a reference to the underlying event store.
    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn bus(&self) -> &Arc<InMemoryEventBus<A::Event>> {
        &self.bus
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        self.retry
    }

    /// Rebuilds an aggregate from the store without modifying anything.
    pub async fn load(&self, aggregate_id: AggregateId) -> Result<A, DomainError> {
        let mut uow = UnitOfWork::begin(&self.store).await?;
        let history = uow.load(aggregate_id).await;
        uow.rollback().await?;

        let mut aggregate = A::default();
        aggregate.hydrate(&history?)?;
        Ok(aggregate)
    }

    /// Executes a command and persists the events it records.
    ///
    /// `command_fn` runs once per attempt against a freshly loaded aggregate.
    pub async fn execute<F>(
        &self,
        target: Target,
        command_fn: F,
    ) -> Result<CommandResult<A>, DomainError>
    where
        F: Fn(&mut A) -> Result<(), A::Error> + Send + Sync,
        DomainError: From<A::Error>,
    {
        let mut attempt = 1;
        loop {
            match self.attempt(target, &command_fn).await {
                Err(err) if err.kind().is_retryable() && attempt < self.retry.max_attempts => {
                    let delay = self.retry.delay_for(attempt);
                    tracing::warn!(
                        attempt,
                        delay_ms = delay.as_millis() as u64,
                        error = %err,
                        "optimistic lock conflict, retrying command"
                    );
                    metrics::counter!("commands_retried").increment(1);
                    self.sleeper.sleep(delay).await;
                    attempt += 1;
                }
                result => return result,
            }
        }
    }

    async fn attempt<F>(&self, target: Target, command_fn: &F) -> Result<CommandResult<A>, DomainError>
    where
        F: Fn(&mut A) -> Result<(), A::Error> + Send + Sync,
        DomainError: From<A::Error>,
    {
        let mut uow = UnitOfWork::begin(&self.store).await?;

        let mut aggregate = match Self::decide(&mut uow, target, command_fn).await {
            Ok(aggregate) => aggregate,
            Err(err) => {
                if let Err(rollback_err) = uow.rollback().await {
                    tracing::error!(error = %rollback_err, "rollback failed");
                }
                return Err(err);
            }
        };

        let events = aggregate.uncommitted_events().to_vec();
        if !events.is_empty() {
            let bus = Arc::clone(&self.bus);
            let published = events.clone();
            uow.after_commit(move || async move {
                bus.publish(&published).await.map_err(HookError::from)
            });
        }

        uow.commit().await?;
        aggregate.mark_events_as_committed();

        let new_version = aggregate.version();
        tracing::info!(
            aggregate_type = A::aggregate_type(),
            aggregate_id = ?aggregate.id(),
            version = %new_version,
            events = events.len(),
            "command committed"
        );

        Ok(CommandResult {
            aggregate,
            events,
            new_version,
        })
    }

    /// Loads, runs the command and appends its events inside `uow`.
    async fn decide<F>(
        uow: &mut UnitOfWork<'_, S>,
        target: Target,
        command_fn: &F,
    ) -> Result<A, DomainError>
    where
        F: Fn(&mut A) -> Result<(), A::Error> + Send + Sync,
        DomainError: From<A::Error>,
    {
        let mut aggregate = A::default();
        if let Target::Existing(aggregate_id) = target {
            let history = uow.load(aggregate_id).await?;
            aggregate.hydrate(&history)?;
        }

        command_fn(&mut aggregate)?;

        let events = aggregate.uncommitted_events();
        if let Some(first) = events.first() {
            let envelopes = events
                .iter()
                .map(DomainEvent::to_envelope)
                .collect::<Result<Vec<_>, _>>()?;
            uow.append(first.aggregate_id(), &envelopes).await?;
        }

        Ok(aggregate)
    }
}
