//! # Identity Resolution
//!
//! Maps heterogeneous entity references (raw ids, numeric strings,
//! incoming updates from a dispatch framework) to the canonical 64-bit
//! identity under which state is stored.
//!
//! The seam is the [`EntityRef`] trait: the store never inspects the
//! shape of what it is handed, it only asks for an identity. New
//! external shapes are supported by implementing `EntityRef` (or
//! [`SenderIdentity`] for message-like shapes) on the caller's side,
//! without touching the store.

use crate::error::{Result, StateError};

/// The canonical 64-bit identity under which state is persisted.
pub type EntityId = i64;

/// Anything from which a canonical identity can be derived.
///
/// Implementations are provided for integers, numeric strings, and the
/// [`Incoming`] adapter. For shapes whose identity is always present
/// (a user, a chat, a callback query carrying its originator),
/// implement this directly:
///
/// ```
/// use statekeeper::{EntityId, EntityRef};
///
/// struct CallbackQuery {
///     from_user: EntityId,
/// }
///
/// impl EntityRef for CallbackQuery {
///     fn entity_id(&self) -> statekeeper::Result<EntityId> {
///         Ok(self.from_user)
///     }
/// }
/// ```
pub trait EntityRef {
    /// Resolve this reference to its canonical identity.
    fn entity_id(&self) -> Result<EntityId>;
}

impl EntityRef for EntityId {
    fn entity_id(&self) -> Result<EntityId> {
        Ok(*self)
    }
}

impl EntityRef for i32 {
    fn entity_id(&self) -> Result<EntityId> {
        Ok(EntityId::from(*self))
    }
}

impl EntityRef for u32 {
    fn entity_id(&self) -> Result<EntityId> {
        Ok(EntityId::from(*self))
    }
}

/// Numeric strings resolve to the integer they spell; anything else is
/// `InvalidIdentity`.
impl EntityRef for str {
    fn entity_id(&self) -> Result<EntityId> {
        self.trim()
            .parse::<EntityId>()
            .map_err(|_| StateError::InvalidIdentity {
                reference: self.to_string(),
            })
    }
}

impl EntityRef for String {
    fn entity_id(&self) -> Result<EntityId> {
        self.as_str().entity_id()
    }
}

impl<T: EntityRef + ?Sized> EntityRef for &T {
    fn entity_id(&self) -> Result<EntityId> {
        (**self).entity_id()
    }
}

/// Capability of message-like updates: an optional originating user
/// and an optional originating chat (channel posts and anonymous admin
/// messages carry a chat but no user).
pub trait SenderIdentity {
    /// Identity of the sending user, when one is attached.
    fn from_user_id(&self) -> Option<EntityId>;

    /// Identity of the sending chat, for user-less updates.
    fn sender_chat_id(&self) -> Option<EntityId>;
}

/// Adapter resolving a message-like update through its
/// [`SenderIdentity`] capability: the originating user wins, the
/// originating chat is the fallback, and an update carrying neither
/// fails with `UnsupportedReference`.
pub struct Incoming<'a, T: ?Sized>(pub &'a T);

impl<T: SenderIdentity + ?Sized> EntityRef for Incoming<'_, T> {
    fn entity_id(&self) -> Result<EntityId> {
        self.0
            .from_user_id()
            .or_else(|| self.0.sender_chat_id())
            .ok_or_else(|| {
                StateError::unsupported("update carries neither a sender user nor a sender chat")
            })
    }
}
