use async_trait::async_trait;
use sqlx::{
    PgPool, Postgres, Row, Transaction,
    postgres::{PgPoolOptions, PgRow},
};
use uuid::Uuid;

use crate::{
    AggregateId, EventEnvelope, EventId, EventStoreError, Result, Version,
    store::{EventStore, validate_events_for_append},
};

/// Name of the `UNIQUE (aggregate_id, version)` constraint in the migration.
/// Only its violation is a version conflict; a reused `event_id` hits the
/// primary key instead and is a plain repository failure.
const AGGREGATE_VERSION_CONSTRAINT: &str = "unique_aggregate_version";

/// PostgreSQL-backed event store implementation.
///
/// Every transaction runs at REPEATABLE READ. Concurrent writers are
/// serialized by the `UNIQUE (aggregate_id, version)` constraint on the
/// `events` table: the losing insert fails with a unique violation, which is
/// reported as [`EventStoreError::OptimisticLock`].
#[derive(Clone)]
pub struct PostgresEventStore {
    pool: PgPool,
}

impl PostgresEventStore {
    /// Creates a new PostgreSQL event store.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Connects a pool to `database_url`.
    pub async fn connect(database_url: &str, max_connections: u32) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(database_url)
            .await
            .map_err(|e| EventStoreError::repository("failed to connect to database", e))?;
        Ok(Self::new(pool))
    }

    /// Gets a reference to the underlying connection pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Runs the database migrations.
    pub async fn run_migrations(&self) -> Result<()> {
        sqlx::migrate!("../../migrations").run(&self.pool).await?;
        Ok(())
    }

    fn row_to_event(row: PgRow) -> Result<EventEnvelope> {
        let read = |e| EventStoreError::query("failed to read event row", e);

        Ok(EventEnvelope {
            aggregate_id: AggregateId::from_uuid(row.try_get::<Uuid, _>("aggregate_id").map_err(read)?),
            event_id: EventId::from_uuid(row.try_get::<Uuid, _>("event_id").map_err(read)?),
            event_type: row.try_get("event_type").map_err(read)?,
            payload: row.try_get("payload").map_err(read)?,
            version: Version::new(row.try_get("version").map_err(read)?),
            created_at: row.try_get("created_at").map_err(read)?,
        })
    }
}

#[async_trait]
impl EventStore for PostgresEventStore {
    type Tx = Transaction<'static, Postgres>;

    async fn begin(&self) -> Result<Self::Tx> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| EventStoreError::repository("failed to begin transaction", e))?;

        sqlx::query("SET TRANSACTION ISOLATION LEVEL REPEATABLE READ")
            .execute(&mut *tx)
            .await
            .map_err(|e| EventStoreError::repository("failed to set isolation level", e))?;

        Ok(tx)
    }

    async fn commit(&self, tx: Self::Tx) -> Result<()> {
        tx.commit()
            .await
            .map_err(|e| EventStoreError::repository("failed to commit transaction", e))
    }

    async fn rollback(&self, tx: Self::Tx) -> Result<()> {
        tx.rollback()
            .await
            .map_err(|e| EventStoreError::repository("failed to roll back transaction", e))
    }

    async fn append(
        &self,
        tx: &mut Self::Tx,
        aggregate_id: AggregateId,
        events: &[EventEnvelope],
    ) -> Result<()> {
        validate_events_for_append(aggregate_id, events)?;

        for event in events {
            sqlx::query(
                r#"
                INSERT INTO events (aggregate_id, event_id, event_type, payload, version, created_at)
                VALUES ($1, $2, $3, $4, $5, $6)
                "#,
            )
            .bind(event.aggregate_id.as_uuid())
            .bind(event.event_id.as_uuid())
            .bind(&event.event_type)
            .bind(&event.payload)
            .bind(event.version.as_i64())
            .bind(event.created_at)
            .execute(&mut **tx)
            .await
            .map_err(|e| {
                if let sqlx::Error::Database(ref db_err) = e
                    && db_err.is_unique_violation()
                    && db_err.constraint() == Some(AGGREGATE_VERSION_CONSTRAINT)
                {
                    metrics::counter!("event_store_optimistic_lock_conflicts").increment(1);
                    return EventStoreError::OptimisticLock {
                        aggregate_id,
                        version: event.version,
                    };
                }
                EventStoreError::repository("failed to insert event", e)
            })?;
        }

        tracing::debug!(%aggregate_id, count = events.len(), "appended events");
        metrics::counter!("event_store_events_appended").increment(events.len() as u64);
        Ok(())
    }

    async fn load(
        &self,
        tx: &mut Self::Tx,
        aggregate_id: AggregateId,
    ) -> Result<Vec<EventEnvelope>> {
        let rows = sqlx::query(
            r#"
            SELECT aggregate_id, event_id, event_type, payload, version, created_at
            FROM events
            WHERE aggregate_id = $1
            ORDER BY version ASC
            "#,
        )
        .bind(aggregate_id.as_uuid())
        .fetch_all(&mut **tx)
        .await
        .map_err(|e| EventStoreError::query("failed to load events", e))?;

        if rows.is_empty() {
            return Err(EventStoreError::AggregateNotFound(aggregate_id));
        }

        rows.into_iter().map(Self::row_to_event).collect()
    }

    async fn load_all(&self) -> Result<Vec<EventEnvelope>> {
        let rows = sqlx::query(
            r#"
            SELECT aggregate_id, event_id, event_type, payload, version, created_at
            FROM events
            ORDER BY created_at ASC, version ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| EventStoreError::query("failed to load all events", e))?;

        rows.into_iter().map(Self::row_to_event).collect()
    }
}
