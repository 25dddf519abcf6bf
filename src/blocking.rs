//! # State Store (blocking)
//!
//! The synchronous twin of the crate-root [`StateStore`]: identical
//! schema, identical semantics, every operation running to completion
//! on the calling thread. Built for dispatch frameworks whose
//! predicate shape is a plain `(context) -> bool`.
//!
//! A store owns its `rusqlite` connection exclusively and is meant to
//! live on a single logical owner thread; no locking is layered on
//! top of what SQLite itself provides for one connection.
//!
//! [`StateStore`]: crate::StateStore

use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;
use tracing::{debug, warn};

use crate::error::{Result, StateError};
use crate::identity::EntityRef;
use crate::state::State;
use crate::store::{CREATE_TABLE_SQL, DELETE_SQL, SELECT_SQL, TABLE, UPSERT_SQL};

/// Blocking state store over an exclusively-owned SQLite connection.
pub struct StateStore {
    conn: Connection,
}

impl StateStore {
    /// Open (creating if missing) a file-backed store and ensure the
    /// schema exists.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let conn = Connection::open(path)?;
        Self::bootstrap(conn)
    }

    /// Open an ephemeral in-memory store. Contents are lost when the
    /// store is dropped.
    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        Self::bootstrap(conn)
    }

    fn bootstrap(conn: Connection) -> Result<Self> {
        conn.execute(CREATE_TABLE_SQL, [])?;
        debug!(table = TABLE, "blocking state store opened");
        Ok(Self { conn })
    }

    /// Current state of the referenced entity, or `None` when it has
    /// no tracked state. Never mutates; absence is not an error.
    pub fn get<R: EntityRef + ?Sized>(&self, entity: &R) -> Result<Option<State>> {
        let entity_id = entity.entity_id()?;
        let row = self
            .conn
            .query_row(SELECT_SQL, params![entity_id], |row| {
                Ok((row.get::<_, String>(0)?, row.get::<_, Option<String>>(1)?))
            })
            .optional()?;

        Ok(row.map(|(name, data)| State::from_parts(name, data)))
    }

    /// Upsert the entity's state: insert on first set, overwrite in
    /// place on every later one. Accepts a full [`State`] or a bare
    /// name.
    pub fn set<R: EntityRef + ?Sized>(&self, entity: &R, state: impl Into<State>) -> Result<()> {
        let entity_id = entity.entity_id()?;
        let (name, data) = state.into().into_parts();

        self.conn
            .execute(UPSERT_SQL, params![entity_id, name, data])?;

        debug!(entity_id, state = %name, "state set");
        Ok(())
    }

    /// Remove the entity's tracked state. Fails with
    /// [`StateError::NotFound`] when none exists.
    pub fn delete<R: EntityRef + ?Sized>(&self, entity: &R) -> Result<()> {
        let entity_id = entity.entity_id()?;
        let deleted = self.conn.execute(DELETE_SQL, params![entity_id])?;

        if deleted == 0 {
            return Err(StateError::NotFound { entity_id });
        }

        debug!(entity_id, "state deleted");
        Ok(())
    }

    /// Build a reusable "entity is currently in `state`" test that
    /// borrows this store.
    pub fn at(&self, state: impl Into<State>) -> StateFilter<'_> {
        StateFilter::new(self, state.into())
    }
}

/// Blocking twin of the async [`StateFilter`]: same comparison rule,
/// plain `bool` calling convention.
///
/// [`StateFilter`]: crate::StateFilter
#[derive(Clone)]
pub struct StateFilter<'a> {
    store: &'a StateStore,
    target: String,
    name: String,
}

impl<'a> StateFilter<'a> {
    fn new(store: &'a StateStore, state: State) -> Self {
        let (target, _) = state.into_parts();
        let name = format!("at_state:{target}");
        Self {
            store,
            target,
            name,
        }
    }

    /// Stable name for registration and logging, `at_state:<target>`.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The state name this filter tests for.
    pub fn target(&self) -> &str {
        &self.target
    }

    /// True iff the referenced entity has a tracked state whose name
    /// equals the target. Errors propagate.
    pub fn matches<R: EntityRef + ?Sized>(&self, entity: &R) -> Result<bool> {
        let current = self.store.get(entity)?;
        Ok(current.is_some_and(|state| state.name() == self.target))
    }

    /// Dispatcher-facing shape: never errors; resolution or backend
    /// failures evaluate to non-match with a `warn` event.
    pub fn evaluate<R: EntityRef + ?Sized>(&self, update: &R) -> bool {
        match self.matches(update) {
            Ok(hit) => hit,
            Err(err) => {
                warn!(filter = %self.name, error = %err, "filter evaluation failed, treating as non-match");
                false
            }
        }
    }

    /// Type-erase into a plain closure for dispatchers that register
    /// `Fn(&U) -> bool` callables directly.
    pub fn into_fn<U>(self) -> impl Fn(&U) -> bool + 'a
    where
        U: EntityRef + ?Sized,
    {
        move |update| self.evaluate(update)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn upsert_overwrites_in_place() {
        let store = StateStore::in_memory().unwrap();
        store.set(&7i64, "awaiting_name").unwrap();
        store
            .set(&7i64, State::with_data("awaiting_age", "25"))
            .unwrap();

        let state = store.get(&7i64).unwrap().unwrap();
        assert_eq!(state, State::with_data("awaiting_age", "25"));

        // Exactly one row survives the overwrite.
        let rows: i64 = store
            .conn
            .query_row("SELECT COUNT(*) FROM user_states", [], |row| row.get(0))
            .unwrap();
        assert_eq!(rows, 1);
    }

    #[test]
    fn delete_on_absent_entity_fails() {
        let store = StateStore::in_memory().unwrap();
        let err = store.delete(&7i64).unwrap_err();
        assert!(matches!(err, StateError::NotFound { entity_id: 7 }));
    }
}
