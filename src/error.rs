//! # Error Types
//!
//! Structured error handling for the state store using thiserror
//! instead of `Box<dyn Error>` patterns.

use thiserror::Error;

/// Errors surfaced by identity resolution and store operations.
#[derive(Error, Debug)]
pub enum StateError {
    /// A string entity reference could not be parsed as a 64-bit integer.
    #[error("invalid identity: {reference:?} is not a 64-bit integer")]
    InvalidIdentity { reference: String },

    /// The entity reference carries no resolvable identity (e.g. an
    /// anonymous message with neither sender nor originating chat).
    #[error("unsupported reference: {reason}")]
    UnsupportedReference { reason: &'static str },

    /// `delete` was called for an entity with no tracked state.
    #[error("no tracked state for entity {entity_id}")]
    NotFound { entity_id: i64 },

    /// The underlying storage failed. Fatal; never retried internally.
    #[error("backend error: {0}")]
    Backend(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl StateError {
    pub(crate) fn unsupported(reason: &'static str) -> Self {
        Self::UnsupportedReference { reason }
    }
}

impl From<sqlx::Error> for StateError {
    fn from(err: sqlx::Error) -> Self {
        Self::Backend(Box::new(err))
    }
}

impl From<rusqlite::Error> for StateError {
    fn from(err: rusqlite::Error) -> Self {
        Self::Backend(Box::new(err))
    }
}

pub type Result<T> = std::result::Result<T, StateError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_messages_name_the_entity() {
        let err = StateError::NotFound { entity_id: 42 };
        assert_eq!(err.to_string(), "no tracked state for entity 42");

        let err = StateError::InvalidIdentity {
            reference: "4x2".to_string(),
        };
        assert!(err.to_string().contains("4x2"));
    }
}
