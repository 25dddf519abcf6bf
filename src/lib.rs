#![allow(clippy::missing_errors_doc)] // Allow public functions without # Errors sections
#![allow(clippy::must_use_candidate)] // Allow methods without must_use when context is clear

//! # statekeeper
//!
//! Durable per-entity state tracking for multi-step interactive flows.
//!
//! ## Overview
//!
//! `statekeeper` persists one current [`State`] (a name plus an
//! optional opaque payload) per entity in a single SQLite table, and
//! turns "is this entity currently in state S" into a reusable
//! predicate that plugs into an external dispatch pipeline. It is the
//! state-tracking backbone for conversation wizards and similar
//! flows: for each state a caller defines, it registers a handler
//! gated by [`StateStore::at`] for that state, and moves entities
//! between states with [`StateStore::set`]. The crate itself neither
//! enumerates nor validates the set of state names; the machine is
//! whatever the caller's handlers make of it.
//!
//! Two stores with identical semantics over the identical schema are
//! provided: the async [`StateStore`] at the crate root (sqlx, every
//! operation a suspension point) and [`blocking::StateStore`]
//! (rusqlite, every operation running on the calling thread).
//!
//! ## Module Organization
//!
//! - [`identity`] - Entity references and canonical identity resolution
//! - [`state`] - The immutable state value object
//! - [`store`] - Async state store over SQLite
//! - [`filter`] - Predicate factory for dispatch pipelines
//! - [`blocking`] - Blocking store and filter
//! - [`error`] - Structured error handling
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use statekeeper::{State, StateStore};
//!
//! # async fn example() -> statekeeper::Result<()> {
//! let store = StateStore::open("states.db").await?;
//!
//! // A wizard advances an entity through caller-defined states.
//! store.set(&7i64, "awaiting_name").await?;
//! store.set(&7i64, State::with_data("awaiting_age", "{\"name\":\"Ada\"}")).await?;
//!
//! // Handlers are gated on the current state.
//! let awaiting_age = store.at("awaiting_age");
//! assert!(awaiting_age.matches(&7i64).await?);
//!
//! // The flow is over; the entity is untracked again.
//! store.delete(&7i64).await?;
//! # Ok(())
//! # }
//! ```

pub mod blocking;
pub mod error;
pub mod filter;
pub mod identity;
pub mod state;
pub mod store;

pub use error::{Result, StateError};
pub use filter::{Predicate, StateFilter};
pub use identity::{EntityId, EntityRef, Incoming, SenderIdentity};
pub use state::State;
pub use store::StateStore;
