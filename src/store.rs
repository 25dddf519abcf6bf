//! # State Store (async)
//!
//! Durable per-entity state keyed by canonical identity, backed by a
//! single SQLite table. Every operation is a suspension point; two
//! calls awaited sequentially by the same caller are applied in order,
//! while concurrent callers on the same identity are only as ordered
//! as the backend's per-statement atomicity (the upsert is a single
//! atomic statement, so no check-then-act race exists).
//!
//! One store instance owns one backend connection for its lifetime;
//! there is no pooling and no cross-instance sharing.

use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use std::path::Path;
use tracing::debug;

use crate::error::{Result, StateError};
use crate::filter::StateFilter;
use crate::identity::EntityRef;
use crate::state::State;

/// The one table all tracked entities live in.
pub(crate) const TABLE: &str = "user_states";

pub(crate) const CREATE_TABLE_SQL: &str = "\
CREATE TABLE IF NOT EXISTS user_states (
    user_id    INTEGER PRIMARY KEY,
    state      TEXT NOT NULL,
    state_data TEXT
)";

pub(crate) const SELECT_SQL: &str = "SELECT state, state_data FROM user_states WHERE user_id = ?1";

// Single-statement upsert: existence check and write are one atomic
// operation at the backend.
pub(crate) const UPSERT_SQL: &str = "\
INSERT INTO user_states (user_id, state, state_data) VALUES (?1, ?2, ?3)
ON CONFLICT (user_id) DO UPDATE SET state = excluded.state, state_data = excluded.state_data";

pub(crate) const DELETE_SQL: &str = "DELETE FROM user_states WHERE user_id = ?1";

/// Async state store over an exclusively-owned SQLite connection.
///
/// Construction is two-phase: allocate nothing, then await [`open`]
/// (or [`in_memory`]) which connects and ensures the schema before the
/// store is handed out. No operation may be issued before `open`
/// completes, which the API enforces by construction.
///
/// [`open`]: StateStore::open
/// [`in_memory`]: StateStore::in_memory
#[derive(Clone)]
pub struct StateStore {
    pool: SqlitePool,
}

impl StateStore {
    /// Open (creating if missing) a file-backed store and ensure the
    /// schema exists.
    pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
        let options = SqliteConnectOptions::new()
            .filename(path.as_ref())
            .create_if_missing(true);
        Self::connect(options).await
    }

    /// Open an ephemeral in-memory store. Contents are lost when the
    /// store is dropped.
    pub async fn in_memory() -> Result<Self> {
        Self::connect(SqliteConnectOptions::new().in_memory(true)).await
    }

    /// Open a store from caller-supplied connection options and ensure
    /// the schema exists.
    pub async fn connect(options: SqliteConnectOptions) -> Result<Self> {
        // Exactly one connection, kept alive for the store's lifetime.
        // An in-memory database lives and dies with its connection, so
        // the pool must never recycle it.
        let pool = SqlitePoolOptions::new()
            .min_connections(1)
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await?;

        sqlx::query(CREATE_TABLE_SQL).execute(&pool).await?;
        debug!(table = TABLE, "state store opened");

        Ok(Self { pool })
    }

    /// Current state of the referenced entity, or `None` when it has
    /// no tracked state. Never mutates; absence is not an error.
    pub async fn get<R: EntityRef + ?Sized>(&self, entity: &R) -> Result<Option<State>> {
        let entity_id = entity.entity_id()?;
        let row: Option<(String, Option<String>)> = sqlx::query_as(SELECT_SQL)
            .bind(entity_id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(|(name, data)| State::from_parts(name, data)))
    }

    /// Upsert the entity's state: insert on first set, overwrite name
    /// and payload in place on every later one. Accepts a full
    /// [`State`] or a bare name (payload defaults to absent).
    pub async fn set<R: EntityRef + ?Sized>(
        &self,
        entity: &R,
        state: impl Into<State>,
    ) -> Result<()> {
        let entity_id = entity.entity_id()?;
        let (name, data) = state.into().into_parts();

        sqlx::query(UPSERT_SQL)
            .bind(entity_id)
            .bind(&name)
            .bind(&data)
            .execute(&self.pool)
            .await?;

        debug!(entity_id, state = %name, "state set");
        Ok(())
    }

    /// Remove the entity's tracked state. Fails with
    /// [`StateError::NotFound`] when none exists: callers are expected
    /// to know a flow was in progress before clearing it.
    pub async fn delete<R: EntityRef + ?Sized>(&self, entity: &R) -> Result<()> {
        let entity_id = entity.entity_id()?;
        let result = sqlx::query(DELETE_SQL)
            .bind(entity_id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(StateError::NotFound { entity_id });
        }

        debug!(entity_id, "state deleted");
        Ok(())
    }

    /// Build a reusable, named predicate answering "is this entity
    /// currently in `state`". Payload is ignored in the comparison;
    /// an entity with no tracked state matches nothing.
    pub fn at(&self, state: impl Into<State>) -> StateFilter {
        StateFilter::new(self.clone(), state.into())
    }

    /// Close the underlying connection. Dropping the store closes it
    /// too; this is for callers that want to await the shutdown.
    pub async fn close(self) {
        self.pool.close().await;
    }
}
