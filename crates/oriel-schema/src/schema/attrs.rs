//! Attribute values and the ordered override map.

use indexmap::IndexMap;
use serde_json::{Map, Value};

use super::Schema;

/// A single attribute value on a schema node.
#[derive(Debug, Clone, PartialEq)]
pub enum AttrValue {
    /// Plain JSON (strings, numbers, flags, enum member lists).
    Json(Value),
    /// A nested node (`items`, `additionalProperties`).
    Node(Box<Schema>),
    /// An ordered sequence (`oneOf`, `allOf`).
    List(Vec<AttrValue>),
    /// An ordered mapping (`properties`).
    Map(IndexMap<String, AttrValue>),
}

impl AttrValue {
    /// Recursively convert to plain JSON.
    #[must_use]
    pub fn to_value(&self) -> Value {
        match self {
            Self::Json(value) => value.clone(),
            Self::Node(node) => node.to_value(),
            Self::List(items) => Value::Array(items.iter().map(Self::to_value).collect()),
            Self::Map(entries) => Value::Object(
                entries
                    .iter()
                    .map(|(key, value)| (key.clone(), value.to_value()))
                    .collect(),
            ),
        }
    }

    pub(crate) fn without_defaults(&self) -> Self {
        match self {
            Self::Json(value) => Self::Json(value.clone()),
            Self::Node(node) => Self::Node(Box::new(node.without_defaults())),
            Self::List(items) => Self::List(items.iter().map(Self::without_defaults).collect()),
            Self::Map(entries) => Self::Map(
                entries
                    .iter()
                    .map(|(key, value)| (key.clone(), value.without_defaults()))
                    .collect(),
            ),
        }
    }

    /// The nested node, if this value is one.
    #[must_use]
    pub fn as_node(&self) -> Option<&Schema> {
        match self {
            Self::Node(node) => Some(node),
            _ => None,
        }
    }

    /// The plain JSON payload, if this value is one.
    #[must_use]
    pub const fn as_json(&self) -> Option<&Value> {
        match self {
            Self::Json(value) => Some(value),
            _ => None,
        }
    }
}

impl From<Value> for AttrValue {
    fn from(value: Value) -> Self {
        Self::Json(value)
    }
}

impl From<Schema> for AttrValue {
    fn from(node: Schema) -> Self {
        Self::Node(Box::new(node))
    }
}

impl From<Vec<Schema>> for AttrValue {
    fn from(nodes: Vec<Schema>) -> Self {
        Self::List(nodes.into_iter().map(Self::from).collect())
    }
}

impl From<IndexMap<String, Schema>> for AttrValue {
    fn from(nodes: IndexMap<String, Schema>) -> Self {
        Self::Map(
            nodes
                .into_iter()
                .map(|(key, node)| (key, Self::from(node)))
                .collect(),
        )
    }
}

impl From<bool> for AttrValue {
    fn from(value: bool) -> Self {
        Self::Json(Value::Bool(value))
    }
}

impl From<&str> for AttrValue {
    fn from(value: &str) -> Self {
        Self::Json(Value::from(value))
    }
}

impl From<String> for AttrValue {
    fn from(value: String) -> Self {
        Self::Json(Value::String(value))
    }
}

impl From<i64> for AttrValue {
    fn from(value: i64) -> Self {
        Self::Json(Value::from(value))
    }
}

impl From<u64> for AttrValue {
    fn from(value: u64) -> Self {
        Self::Json(Value::from(value))
    }
}

impl From<f64> for AttrValue {
    fn from(value: f64) -> Self {
        Self::Json(Value::from(value))
    }
}

/// Python-style truthiness of a serialized value.
#[must_use]
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(flag) => *flag,
        Value::Number(number) => number.as_f64().is_some_and(|n| n != 0.0),
        Value::String(text) => !text.is_empty(),
        Value::Array(items) => !items.is_empty(),
        Value::Object(entries) => !entries.is_empty(),
    }
}

/// Ordered attribute overrides supplied at node construction.
///
/// Later insertions of the same key replace earlier ones but keep the
/// original position.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Attributes(IndexMap<String, AttrValue>);

impl Attributes {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<AttrValue>) -> Self {
        self.insert(key, value);
        self
    }

    pub fn insert(
        &mut self,
        key: impl Into<String>,
        value: impl Into<AttrValue>,
    ) -> Option<AttrValue> {
        self.0.insert(key.into(), value.into())
    }

    /// Insert only when `key` is not already present.
    pub fn insert_missing(&mut self, key: impl Into<String>, value: impl Into<AttrValue>) {
        self.0.entry(key.into()).or_insert_with(|| value.into());
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<&AttrValue> {
        self.0.get(key)
    }

    pub fn remove(&mut self, key: &str) -> Option<AttrValue> {
        self.0.shift_remove(key)
    }

    #[must_use]
    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    /// Merge `other` into `self`; keys in `other` win.
    pub fn merge(&mut self, other: Self) {
        self.0.extend(other.0);
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &AttrValue)> {
        self.0.iter().map(|(key, value)| (key.as_str(), value))
    }
}

impl IntoIterator for Attributes {
    type Item = (String, AttrValue);
    type IntoIter = indexmap::map::IntoIter<String, AttrValue>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<K: Into<String>, V: Into<AttrValue>> FromIterator<(K, V)> for Attributes {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(key, value)| (key.into(), value.into()))
                .collect(),
        )
    }
}

impl From<Map<String, Value>> for Attributes {
    fn from(map: Map<String, Value>) -> Self {
        map.into_iter().collect()
    }
}
