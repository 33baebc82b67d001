//! Per-conversation key/value attributes.
//!
//! The platform echoes attributes back on every turn, so the skill never keeps
//! them in process memory. Values are JSON primitives.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

/// Errors raised by the typed attribute accessors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AttributeError {
    /// The stored value has a shape the accessor cannot read.
    #[error("session attribute {key} is not a {expected}")]
    WrongType {
        /// Attribute key.
        key: String,
        /// What the accessor expected.
        expected: &'static str,
    },

    /// A counter reached its maximum.
    #[error("session counter {key} overflowed")]
    Overflow {
        /// Attribute key.
        key: String,
    },
}

/// Mutable attribute map for one session.
///
/// Created empty when a session starts and mutated in place by handler
/// actions.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionState(Map<String, Value>);

impl SessionState {
    /// An empty session.
    pub fn new() -> Self {
        Self::default()
    }

    /// Borrows the raw attribute map.
    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    /// Consumes the session and returns the raw attribute map.
    pub fn into_map(self) -> Map<String, Value> {
        self.0
    }

    /// Raw value for `key`.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// Stores `value` under `key`, replacing any previous value.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.0.insert(key.into(), value.into());
    }

    /// Removes `key`, returning its previous value.
    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.0.remove(key)
    }

    /// Number of attributes held.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// True when no attributes are held.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Reads `key` as display text.
    ///
    /// Falsy values read as `None`: missing, `null`, `false`, zero, and the
    /// empty string. Other numbers and `true` are rendered as written.
    ///
    /// # Errors
    ///
    /// Returns [`AttributeError::WrongType`] for arrays and objects.
    pub fn text(&self, key: &str) -> Result<Option<String>, AttributeError> {
        match self.0.get(key) {
            None | Some(Value::Null) => Ok(None),
            Some(Value::String(s)) if s.is_empty() => Ok(None),
            Some(Value::String(s)) => Ok(Some(s.clone())),
            Some(Value::Number(n)) if n.as_f64() == Some(0.0) => Ok(None),
            Some(Value::Number(n)) => Ok(Some(n.to_string())),
            Some(Value::Bool(false)) => Ok(None),
            Some(Value::Bool(true)) => Ok(Some("true".to_string())),
            Some(Value::Array(_) | Value::Object(_)) => Err(AttributeError::WrongType {
                key: key.to_string(),
                expected: "primitive",
            }),
        }
    }

    /// Adds one to the integer counter at `key` and returns the new value.
    ///
    /// A missing or `null` counter starts at zero.
    ///
    /// # Errors
    ///
    /// Returns [`AttributeError::WrongType`] if the stored value is not a
    /// non-negative integer and [`AttributeError::Overflow`] at `u64::MAX`.
    /// The session is unchanged on error.
    pub fn increment(&mut self, key: &str) -> Result<u64, AttributeError> {
        let current = match self.0.get(key) {
            None | Some(Value::Null) => 0,
            Some(value) => value.as_u64().ok_or_else(|| AttributeError::WrongType {
                key: key.to_string(),
                expected: "non-negative integer",
            })?,
        };
        let next = current.checked_add(1).ok_or_else(|| AttributeError::Overflow {
            key: key.to_string(),
        })?;
        self.0.insert(key.to_string(), Value::from(next));
        Ok(next)
    }
}

impl From<Map<String, Value>> for SessionState {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}
