//! The jon value tree.
//!
//! A [`Value`] is produced once by the parser and only read afterwards. Every
//! node owns its children, so the tree can be walked recursively without any
//! cycle bookkeeping.

use crate::error::ValueError;
use indexmap::map::Entry;
use indexmap::IndexMap;
use std::fmt::{self, Display};
use std::str::FromStr;

/// The tag of a [`Value`], also used by schemas to name the expected type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueType {
    Null,
    Bool,
    Int,
    Float,
    String,
    Object,
    Array,
}

/// Canonical type names, as written in the `type` key of a schema.
const TYPE_NAMES: [(&str, ValueType); 7] = [
    ("null", ValueType::Null),
    ("bool", ValueType::Bool),
    ("int", ValueType::Int),
    ("float", ValueType::Float),
    ("string", ValueType::String),
    ("object", ValueType::Object),
    ("array", ValueType::Array),
];

impl ValueType {
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            ValueType::Null => "null",
            ValueType::Bool => "bool",
            ValueType::Int => "int",
            ValueType::Float => "float",
            ValueType::String => "string",
            ValueType::Object => "object",
            ValueType::Array => "array",
        }
    }

    /// Looks up a type by its canonical name.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        TYPE_NAMES
            .iter()
            .find(|(candidate, _)| *candidate == name)
            .map(|(_, ty)| *ty)
    }
}

impl Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ValueType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_name(s).ok_or_else(|| format!("unknown type `{s}`"))
    }
}

/// An insertion-ordered map with unique string keys.
///
/// The order of the entries is part of the document and is kept on iteration
/// and serialization.
#[derive(Debug, Clone, Default)]
pub struct Object {
    entries: IndexMap<String, Value>,
}

impl Object {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends an entry. Fails if the key is already present.
    pub fn insert(&mut self, key: impl Into<String>, value: Value) -> Result<(), ValueError> {
        match self.entries.entry(key.into()) {
            Entry::Occupied(entry) => Err(ValueError::DuplicateKey {
                key: entry.key().clone(),
            }),
            Entry::Vacant(entry) => {
                entry.insert(value);
                Ok(())
            }
        }
    }

    /// Builds an object from `(key, value)` pairs, rejecting duplicate keys.
    pub fn try_from_iter<K, I>(iter: I) -> Result<Self, ValueError>
    where
        K: Into<String>,
        I: IntoIterator<Item = (K, Value)>,
    {
        let mut object = Self::new();
        for (key, value) in iter {
            object.insert(key, value)?;
        }
        Ok(object)
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.entries.get(key)
    }

    #[must_use]
    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn values(&self) -> impl Iterator<Item = &Value> {
        self.entries.values()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }
}

impl PartialEq for Object {
    /// Order-insensitive: same key set, equal value per key.
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len()
            && self
                .iter()
                .all(|(key, value)| other.get(key).is_some_and(|o| o == value))
    }
}

impl<'a> IntoIterator for &'a Object {
    type Item = (&'a str, &'a Value);
    type IntoIter = Box<dyn Iterator<Item = (&'a str, &'a Value)> + 'a>;

    fn into_iter(self) -> Self::IntoIter {
        Box::new(self.iter())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
    Object(Object),
    Array(Vec<Value>),
}

impl Value {
    #[must_use]
    pub fn value_type(&self) -> ValueType {
        match self {
            Value::Null => ValueType::Null,
            Value::Bool(_) => ValueType::Bool,
            Value::Int(_) => ValueType::Int,
            Value::Float(_) => ValueType::Float,
            Value::String(_) => ValueType::String,
            Value::Object(_) => ValueType::Object,
            Value::Array(_) => ValueType::Array,
        }
    }

    #[must_use]
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    #[must_use]
    pub fn is_bool(&self) -> bool {
        matches!(self, Value::Bool(_))
    }

    #[must_use]
    pub fn is_int(&self) -> bool {
        matches!(self, Value::Int(_))
    }

    #[must_use]
    pub fn is_float(&self) -> bool {
        matches!(self, Value::Float(_))
    }

    #[must_use]
    pub fn is_string(&self) -> bool {
        matches!(self, Value::String(_))
    }

    #[must_use]
    pub fn is_object(&self) -> bool {
        matches!(self, Value::Object(_))
    }

    #[must_use]
    pub fn is_array(&self) -> bool {
        matches!(self, Value::Array(_))
    }

    /// Typed retrieval of the payload.
    ///
    /// ```
    /// use jon_core::value::Value;
    ///
    /// let value = Value::Int(42);
    /// assert_eq!(value.get::<i64>().unwrap(), 42);
    /// assert!(value.get::<&str>().is_err());
    /// ```
    pub fn get<'a, T: FromValue<'a>>(&'a self) -> Result<T, ValueError> {
        T::from_value(self).ok_or(ValueError::TypeMismatch {
            expected: T::TYPE,
            found: self.value_type(),
        })
    }

    /// True if this is an object containing `key`.
    #[must_use]
    pub fn has(&self, key: &str) -> bool {
        match self {
            Value::Object(object) => object.contains_key(key),
            _ => false,
        }
    }

    /// Navigates one level down, by key for objects or by position for arrays.
    pub fn at<I: ValueIndex>(&self, index: I) -> Result<&Value, ValueError> {
        index.index_into(self)
    }

    /// [`Value::at`] followed by [`Value::get`].
    pub fn at_as<'a, T, I>(&'a self, index: I) -> Result<T, ValueError>
    where
        T: FromValue<'a>,
        I: ValueIndex,
    {
        self.at(index)?.get::<T>()
    }

    /// Follows a `/`-separated path such as `/servers/0/host`.
    ///
    /// Segments address object keys, or array positions when the current node
    /// is an array. The empty path and `/` address the value itself.
    pub fn pointer(&self, path: &str) -> Result<&Value, ValueError> {
        path.split('/')
            .filter(|segment| !segment.is_empty())
            .try_fold(self, |current, segment| match current {
                Value::Array(_) => {
                    let index = segment.parse::<usize>().map_err(|_| ValueError::NotIndexable {
                        found: ValueType::Array,
                        index: format!("`{segment}`"),
                    })?;
                    current.at(index)
                }
                _ => current.at(segment),
            })
    }

    #[must_use]
    pub fn as_object(&self) -> Option<&Object> {
        match self {
            Value::Object(object) => Some(object),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_array(&self) -> Option<&[Value]> {
        match self {
            Value::Array(items) => Some(items),
            _ => None,
        }
    }
}

/// Payload types that [`Value::get`] can extract.
pub trait FromValue<'a>: Sized {
    const TYPE: ValueType;

    fn from_value(value: &'a Value) -> Option<Self>;
}

impl<'a> FromValue<'a> for bool {
    const TYPE: ValueType = ValueType::Bool;

    fn from_value(value: &'a Value) -> Option<Self> {
        match value {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }
}

impl<'a> FromValue<'a> for i64 {
    const TYPE: ValueType = ValueType::Int;

    fn from_value(value: &'a Value) -> Option<Self> {
        match value {
            Value::Int(i) => Some(*i),
            _ => None,
        }
    }
}

impl<'a> FromValue<'a> for f64 {
    const TYPE: ValueType = ValueType::Float;

    fn from_value(value: &'a Value) -> Option<Self> {
        match value {
            Value::Float(f) => Some(*f),
            _ => None,
        }
    }
}

impl<'a> FromValue<'a> for &'a str {
    const TYPE: ValueType = ValueType::String;

    fn from_value(value: &'a Value) -> Option<Self> {
        match value {
            Value::String(s) => Some(s.as_str()),
            _ => None,
        }
    }
}

impl<'a> FromValue<'a> for &'a Object {
    const TYPE: ValueType = ValueType::Object;

    fn from_value(value: &'a Value) -> Option<Self> {
        value.as_object()
    }
}

impl<'a> FromValue<'a> for &'a [Value] {
    const TYPE: ValueType = ValueType::Array;

    fn from_value(value: &'a Value) -> Option<Self> {
        value.as_array()
    }
}

/// Keys accepted by [`Value::at`]: strings for objects, `usize` for arrays.
pub trait ValueIndex {
    fn index_into<'v>(&self, value: &'v Value) -> Result<&'v Value, ValueError>;
}

impl ValueIndex for &str {
    fn index_into<'v>(&self, value: &'v Value) -> Result<&'v Value, ValueError> {
        match value {
            Value::Object(object) => object.get(self).ok_or_else(|| ValueError::KeyNotFound {
                key: (*self).to_string(),
            }),
            other => Err(ValueError::NotIndexable {
                found: other.value_type(),
                index: format!("key `{self}`"),
            }),
        }
    }
}

impl ValueIndex for String {
    fn index_into<'v>(&self, value: &'v Value) -> Result<&'v Value, ValueError> {
        self.as_str().index_into(value)
    }
}

impl ValueIndex for usize {
    fn index_into<'v>(&self, value: &'v Value) -> Result<&'v Value, ValueError> {
        match value {
            Value::Array(items) => items.get(*self).ok_or(ValueError::IndexOutOfRange {
                index: *self,
                len: items.len(),
            }),
            other => Err(ValueError::NotIndexable {
                found: other.value_type(),
                index: format!("index {self}"),
            }),
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Int(i)
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Value::Float(f)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<Object> for Value {
    fn from(object: Object) -> Self {
        Value::Object(object)
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Value::Array(items)
    }
}
