//! State value object: a named position in a caller-defined flow plus
//! an optional opaque payload.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Where an entity currently is in a caller-defined flow.
///
/// Immutable once constructed; two states compare equal when both the
/// name and the payload match. The payload is an opaque string owned
/// by the caller (commonly serialized JSON) and is never interpreted
/// by the store.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct State {
    name: String,
    data: Option<String>,
}

impl State {
    /// A state with no payload.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            data: None,
        }
    }

    /// A state carrying an opaque payload.
    pub fn with_data(name: impl Into<String>, data: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            data: Some(data.into()),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn data(&self) -> Option<&str> {
        self.data.as_deref()
    }

    pub(crate) fn from_parts(name: String, data: Option<String>) -> Self {
        Self { name, data }
    }

    pub(crate) fn into_parts(self) -> (String, Option<String>) {
        (self.name, self.data)
    }
}

/// Bare names stand in for payload-less states, so `set` accepts
/// either a full `State` or just `"awaiting_name"`.
impl From<&str> for State {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl From<String> for State {
    fn from(name: String) -> Self {
        Self::new(name)
    }
}

impl fmt::Display for State {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.data {
            Some(data) => write!(f, "{} ({} bytes of data)", self.name, data.len()),
            None => write!(f, "{}", self.name),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bare_name_defaults_to_no_payload() {
        let state: State = "awaiting_name".into();
        assert_eq!(state.name(), "awaiting_name");
        assert_eq!(state.data(), None);
    }

    #[test]
    fn equality_is_by_field_values() {
        let a = State::with_data("awaiting_age", "25");
        let b = State::with_data("awaiting_age".to_string(), "25".to_string());
        assert_eq!(a, b);
        assert_ne!(a, State::new("awaiting_age"));
    }

    #[test]
    fn display_omits_payload_contents() {
        let state = State::with_data("awaiting_age", "some-secret");
        assert!(!state.to_string().contains("some-secret"));
    }
}
