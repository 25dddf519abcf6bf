//! # Predicate Factory (async)
//!
//! Turns "is entity X currently in state S" into a reusable, named
//! boolean test that plugs into an external dispatch pipeline. Built
//! by [`StateStore::at`]; evaluation is a `get` plus a name
//! comparison, in the same suspending calling convention as the store
//! it closes over.
//!
//! [`StateStore::at`]: crate::StateStore::at

use async_trait::async_trait;
use futures::future::{BoxFuture, FutureExt};
use tracing::warn;

use crate::error::Result;
use crate::identity::EntityRef;
use crate::state::State;
use crate::store::StateStore;

/// The dispatcher-facing shape: `(context) -> awaitable<bool>`.
///
/// Evaluation never errors. A reference that cannot be resolved or a
/// backend failure evaluates to non-match, with the error surfaced as
/// a `warn` event rather than swallowed; callers that need the error
/// itself use [`StateFilter::matches`].
#[async_trait]
pub trait Predicate<U: ?Sized> {
    async fn evaluate(&self, update: &U) -> bool;
}

/// A named, reusable "entity is currently in state S" test.
///
/// Captures the target state name at construction and a handle to the
/// store; payloads are ignored in the comparison, and an entity with
/// no tracked state matches no state at all.
#[derive(Clone)]
pub struct StateFilter {
    store: StateStore,
    target: String,
    name: String,
}

impl StateFilter {
    pub(crate) fn new(store: StateStore, state: State) -> Self {
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
    /// equals the target. Errors from identity resolution or the
    /// backend propagate.
    pub async fn matches<R: EntityRef + ?Sized>(&self, entity: &R) -> Result<bool> {
        let current = self.store.get(entity).await?;
        Ok(current.is_some_and(|state| state.name() == self.target))
    }

    /// Type-erase into a plain closure for dispatchers that register
    /// `Fn(&U) -> awaitable<bool>` callables directly.
    pub fn into_fn<U>(self) -> impl for<'u> Fn(&'u U) -> BoxFuture<'u, bool>
    where
        U: EntityRef + Sync + ?Sized,
    {
        move |update| {
            let filter = self.clone();
            async move { filter.evaluate(update).await }.boxed()
        }
    }
}

#[async_trait]
impl<U> Predicate<U> for StateFilter
where
    U: EntityRef + Sync + ?Sized,
{
    async fn evaluate(&self, update: &U) -> bool {
        match self.matches(update).await {
            Ok(hit) => hit,
            Err(err) => {
                warn!(filter = %self.name, error = %err, "filter evaluation failed, treating as non-match");
                false
            }
        }
    }
}

