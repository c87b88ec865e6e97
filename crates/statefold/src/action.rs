//! Actions and the reserved action types
//!
//! An action is a plain key/value record with a `type` field describing the
//! requested transition. Anything can be handed to `dispatch` (middleware may
//! understand richer values), but the base store only accepts values that
//! validate into an [`Action`].

use crate::error::StoreError;
use crate::utils::is_plain_record;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Name of the discriminant field
pub const TYPE_KEY: &str = "type";

/// Action types reserved by the store.
///
/// Reducers must not handle these; for any unknown action they return the
/// current state, or their initial state when the current one is undefined.
pub mod action_types {
    use rand::Rng;

    /// Dispatched on store creation and after every reducer replacement
    pub const INIT: &str = "@@statefold/INIT";

    /// Prefix of the randomized types used to probe combined reducers
    pub const PROBE_UNKNOWN_ACTION_PREFIX: &str = "@@statefold/PROBE_UNKNOWN_ACTION_";

    const PROBE_ALPHABET: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";
    const PROBE_LEN: usize = 6;

    /// A fresh action type no reducer can reasonably recognize,
    /// e.g. `@@statefold/PROBE_UNKNOWN_ACTION_k.3.z.0.q.a`
    pub fn probe_unknown() -> String {
        let mut rng = rand::thread_rng();
        let suffix: Vec<String> = (0..PROBE_LEN)
            .map(|_| {
                let idx = rng.gen_range(0..PROBE_ALPHABET.len());
                (PROBE_ALPHABET[idx] as char).to_string()
            })
            .collect();
        format!("{}{}", PROBE_UNKNOWN_ACTION_PREFIX, suffix.join("."))
    }

    /// Whether an action type lives in the reserved namespace
    pub fn is_private(kind: &str) -> bool {
        kind == INIT || kind.starts_with(PROBE_UNKNOWN_ACTION_PREFIX)
    }
}

/// A validated action: a plain record whose `type` key is present
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Value", into = "Value")]
pub struct Action {
    fields: Map<String, Value>,
}

impl Action {
    /// Create an action with the given type and no other fields
    pub fn new(kind: impl Into<Value>) -> Self {
        let mut fields = Map::new();
        fields.insert(TYPE_KEY.to_string(), kind.into());
        Self { fields }
    }

    pub(crate) fn init() -> Self {
        Self::new(action_types::INIT)
    }

    /// Builder-style field setter
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        let key = key.into();
        if key != TYPE_KEY {
            self.fields.insert(key, value.into());
        }
        self
    }

    /// The `type` discriminant. `null` is a legal type.
    pub fn kind(&self) -> &Value {
        self.fields.get(TYPE_KEY).unwrap_or(&Value::Null)
    }

    /// Whether the type is the given string
    pub fn is(&self, kind: &str) -> bool {
        self.kind().as_str() == Some(kind)
    }

    /// Human readable type, used in logs and error messages
    pub fn type_name(&self) -> String {
        match self.kind() {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        }
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    pub fn fields(&self) -> &Map<String, Value> {
        &self.fields
    }

    pub fn into_value(self) -> Value {
        Value::Object(self.fields)
    }
}

impl TryFrom<Value> for Action {
    type Error = StoreError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        if !is_plain_record(&value) {
            return Err(StoreError::InvalidAction(
                "Actions must be plain objects. Use custom middleware for async actions.".to_string(),
            ));
        }
        match value {
            Value::Object(fields) if fields.contains_key(TYPE_KEY) => Ok(Self { fields }),
            _ => Err(StoreError::InvalidAction(
                "Actions may not have an undefined \"type\" property. Have you misspelled a constant?"
                    .to_string(),
            )),
        }
    }
}

impl From<Action> for Value {
    fn from(action: Action) -> Self {
        action.into_value()
    }
}
