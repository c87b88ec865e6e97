//! Immutable state values
//!
//! A [`State`] is a JSON-shaped snapshot whose containers are reference
//! counted. Cloning is O(1), and [`State::same`] answers "is this the very
//! same snapshot" the way change detection needs it: scalars compare by
//! value, lists and records compare by pointer.

use indexmap::IndexMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Number, Value};
use std::fmt;
use std::rc::Rc;

/// Ordered key/value mapping used by record states
pub type Record = IndexMap<String, State>;

/// An immutable state snapshot
#[derive(Clone, Debug, Default)]
pub enum State {
    #[default]
    Null,
    Bool(bool),
    Number(Number),
    String(Rc<str>),
    List(Rc<Vec<State>>),
    Record(Rc<Record>),
}

impl State {
    /// Build a record state from `(key, value)` pairs, keeping their order
    pub fn record<K, I>(entries: I) -> Self
    where
        K: Into<String>,
        I: IntoIterator<Item = (K, State)>,
    {
        State::Record(Rc::new(
            entries.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        ))
    }

    /// Build a list state
    pub fn list<I: IntoIterator<Item = State>>(items: I) -> Self {
        State::List(Rc::new(items.into_iter().collect()))
    }

    /// Identity comparison.
    ///
    /// Scalars are the same when their values are equal. Strings, lists and
    /// records are the same only when they share the same allocation.
    pub fn same(&self, other: &State) -> bool {
        match (self, other) {
            (State::Null, State::Null) => true,
            (State::Bool(a), State::Bool(b)) => a == b,
            (State::Number(a), State::Number(b)) => a == b,
            (State::String(a), State::String(b)) => a == b,
            (State::List(a), State::List(b)) => Rc::ptr_eq(a, b),
            (State::Record(a), State::Record(b)) => Rc::ptr_eq(a, b),
            _ => false,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, State::Null)
    }

    /// Plain key/value record check, the state-side counterpart of
    /// [`crate::utils::is_plain_record`]
    pub fn is_record(&self) -> bool {
        matches!(self, State::Record(_))
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            State::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            State::Number(n) => n.as_i64(),
            _ => None,
        }
    }

    pub fn as_u64(&self) -> Option<u64> {
        match self {
            State::Number(n) => n.as_u64(),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            State::Number(n) => n.as_f64(),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            State::String(s) => Some(&**s),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[State]> {
        match self {
            State::List(items) => Some(items.as_slice()),
            _ => None,
        }
    }

    pub fn as_record(&self) -> Option<&Record> {
        match self {
            State::Record(record) => Some(&**record),
            _ => None,
        }
    }

    /// Look up a record field; `None` for missing keys and non-records
    pub fn get(&self, key: &str) -> Option<&State> {
        self.as_record().and_then(|record| record.get(key))
    }

    /// Name of the variant, used in diagnostics
    pub fn type_name(&self) -> &'static str {
        match self {
            State::Null => "Null",
            State::Bool(_) => "Boolean",
            State::Number(_) => "Number",
            State::String(_) => "String",
            State::List(_) => "Array",
            State::Record(_) => "Object",
        }
    }

    /// Deep conversion into a `serde_json::Value`
    pub fn to_value(&self) -> Value {
        match self {
            State::Null => Value::Null,
            State::Bool(b) => Value::Bool(*b),
            State::Number(n) => Value::Number(n.clone()),
            State::String(s) => Value::String(s.to_string()),
            State::List(items) => Value::Array(items.iter().map(State::to_value).collect()),
            State::Record(record) => Value::Object(
                record
                    .iter()
                    .map(|(k, v)| (k.clone(), v.to_value()))
                    .collect(),
            ),
        }
    }
}

/// Structural equality. Use [`State::same`] for identity.
impl PartialEq for State {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (State::Null, State::Null) => true,
            (State::Bool(a), State::Bool(b)) => a == b,
            (State::Number(a), State::Number(b)) => a == b,
            (State::String(a), State::String(b)) => a == b,
            (State::List(a), State::List(b)) => Rc::ptr_eq(a, b) || a == b,
            (State::Record(a), State::Record(b)) => Rc::ptr_eq(a, b) || a == b,
            _ => false,
        }
    }
}

impl fmt::Display for State {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_value())
    }
}

impl From<Value> for State {
    fn from(value: Value) -> Self {
        match value {
            Value::Null => State::Null,
            Value::Bool(b) => State::Bool(b),
            Value::Number(n) => State::Number(n),
            Value::String(s) => State::String(s.into()),
            Value::Array(items) => State::list(items.into_iter().map(State::from)),
            Value::Object(map) => State::record(map.into_iter().map(|(k, v)| (k, State::from(v)))),
        }
    }
}

impl From<&State> for Value {
    fn from(state: &State) -> Self {
        state.to_value()
    }
}

impl From<State> for Value {
    fn from(state: State) -> Self {
        state.to_value()
    }
}

impl From<bool> for State {
    fn from(b: bool) -> Self {
        State::Bool(b)
    }
}

impl From<i64> for State {
    fn from(n: i64) -> Self {
        State::Number(n.into())
    }
}

impl From<i32> for State {
    fn from(n: i32) -> Self {
        State::Number(n.into())
    }
}

impl From<u64> for State {
    fn from(n: u64) -> Self {
        State::Number(n.into())
    }
}

impl From<f64> for State {
    fn from(n: f64) -> Self {
        Number::from_f64(n).map(State::Number).unwrap_or(State::Null)
    }
}

impl From<&str> for State {
    fn from(s: &str) -> Self {
        State::String(s.into())
    }
}

impl From<String> for State {
    fn from(s: String) -> Self {
        State::String(s.into())
    }
}

impl From<Vec<State>> for State {
    fn from(items: Vec<State>) -> Self {
        State::List(Rc::new(items))
    }
}

impl From<Record> for State {
    fn from(record: Record) -> Self {
        State::Record(Rc::new(record))
    }
}

impl Serialize for State {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            State::Null => serializer.serialize_unit(),
            State::Bool(b) => serializer.serialize_bool(*b),
            State::Number(n) => n.serialize(serializer),
            State::String(s) => serializer.serialize_str(s),
            State::List(items) => serializer.collect_seq(items.iter()),
            State::Record(record) => serializer.collect_map(record.iter()),
        }
    }
}

impl<'de> Deserialize<'de> for State {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Value::deserialize(deserializer).map(State::from)
    }
}
