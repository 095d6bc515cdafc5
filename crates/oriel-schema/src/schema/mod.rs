//! Schema document model.
//!
//! A [`Schema`] is one OpenAPI Schema Object node: a [`SchemaKind`] plus an
//! ordered attribute map. Construction filters the supplied attributes down to
//! the kind's allowlist (plus `x-` extensions) and silently drops the rest.
//! Serialization omits falsy values unless the kind keeps them.

mod attrs;
mod kind;

use std::fmt;

use indexmap::IndexMap;
use serde::{Serialize, Serializer};
use serde_json::{Map, Value};

pub use attrs::{AttrValue, Attributes, is_truthy};
pub use kind::{EXTENSION_PREFIX, SchemaKind};

/// Prefix of component references emitted for named models.
pub const COMPONENTS_PREFIX: &str = "#/components/schemas/";

/// One node of an OpenAPI schema document.
#[derive(Debug, Clone, PartialEq)]
pub struct Schema {
    kind: SchemaKind,
    fields: IndexMap<String, AttrValue>,
}

impl Schema {
    /// Build a node of `kind` from `attributes`.
    ///
    /// Undeclared keys are dropped and baked keys (`type`, `format`) cannot be
    /// overridden. Never fails.
    #[must_use]
    pub fn new(kind: SchemaKind, attributes: Attributes) -> Self {
        let baked = kind.baked();
        let mut fields = IndexMap::with_capacity(baked.len() + attributes.len());
        for (key, value) in &baked {
            fields.insert((*key).to_string(), AttrValue::Json(value.clone()));
        }

        for (key, value) in attributes {
            if !kind.accepts(&key) {
                tracing::trace!(%kind, key = %key, "dropping undeclared schema attribute");
                continue;
            }
            if baked.iter().any(|(baked_key, _)| *baked_key == key) {
                continue;
            }
            fields.insert(key, value);
        }

        Self { kind, fields }
    }

    #[must_use]
    pub fn boolean(attributes: Attributes) -> Self {
        Self::new(SchemaKind::Boolean, attributes)
    }

    #[must_use]
    pub fn integer(attributes: Attributes) -> Self {
        Self::new(SchemaKind::Integer, attributes)
    }

    #[must_use]
    pub fn long(attributes: Attributes) -> Self {
        Self::new(SchemaKind::Long, attributes)
    }

    #[must_use]
    pub fn float(attributes: Attributes) -> Self {
        Self::new(SchemaKind::Float, attributes)
    }

    #[must_use]
    pub fn double(attributes: Attributes) -> Self {
        Self::new(SchemaKind::Double, attributes)
    }

    #[must_use]
    pub fn string(attributes: Attributes) -> Self {
        Self::new(SchemaKind::String, attributes)
    }

    #[must_use]
    pub fn byte(attributes: Attributes) -> Self {
        Self::new(SchemaKind::Byte, attributes)
    }

    #[must_use]
    pub fn binary(attributes: Attributes) -> Self {
        Self::new(SchemaKind::Binary, attributes)
    }

    #[must_use]
    pub fn date(attributes: Attributes) -> Self {
        Self::new(SchemaKind::Date, attributes)
    }

    #[must_use]
    pub fn time(attributes: Attributes) -> Self {
        Self::new(SchemaKind::Time, attributes)
    }

    #[must_use]
    pub fn date_time(attributes: Attributes) -> Self {
        Self::new(SchemaKind::DateTime, attributes)
    }

    #[must_use]
    pub fn password(attributes: Attributes) -> Self {
        Self::new(SchemaKind::Password, attributes)
    }

    #[must_use]
    pub fn email(attributes: Attributes) -> Self {
        Self::new(SchemaKind::Email, attributes)
    }

    #[must_use]
    pub fn uuid(attributes: Attributes) -> Self {
        Self::new(SchemaKind::Uuid, attributes)
    }

    #[must_use]
    pub fn any_value(attributes: Attributes) -> Self {
        Self::new(SchemaKind::AnyValue, attributes)
    }

    /// Object node. Empty `properties` are not recorded.
    #[must_use]
    pub fn object(properties: IndexMap<String, Self>, mut attributes: Attributes) -> Self {
        if !properties.is_empty() {
            attributes.insert("properties", properties);
        }
        Self::new(SchemaKind::Object, attributes)
    }

    /// Array node wrapping a single element schema.
    #[must_use]
    pub fn array(items: Self, mut attributes: Attributes) -> Self {
        attributes.insert("items", items);
        Self::new(SchemaKind::Array, attributes)
    }

    /// `$ref` node pointing at `#/components/schemas/<name>`.
    #[must_use]
    pub fn reference(name: &str) -> Self {
        Self::new(
            SchemaKind::Reference,
            Attributes::new().with("$ref", format!("{COMPONENTS_PREFIX}{name}")),
        )
    }

    #[must_use]
    pub const fn kind(&self) -> SchemaKind {
        self.kind
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<&AttrValue> {
        self.fields.get(key)
    }

    /// Attributes in insertion order.
    pub fn attributes(&self) -> impl Iterator<Item = (&str, &AttrValue)> {
        self.fields.iter().map(|(key, value)| (key.as_str(), value))
    }

    #[must_use]
    pub fn type_name(&self) -> Option<&str> {
        self.json_str("type")
    }

    #[must_use]
    pub fn format(&self) -> Option<&str> {
        self.json_str("format")
    }

    #[must_use]
    pub fn is_nullable(&self) -> bool {
        self.get("nullable")
            .and_then(AttrValue::as_json)
            .is_some_and(is_truthy)
    }

    /// Named property of an object node.
    #[must_use]
    pub fn property(&self, name: &str) -> Option<&Self> {
        match self.get("properties")? {
            AttrValue::Map(entries) => entries.get(name).and_then(AttrValue::as_node),
            _ => None,
        }
    }

    /// Element schema of an array node.
    #[must_use]
    pub fn items(&self) -> Option<&Self> {
        self.get("items").and_then(AttrValue::as_node)
    }

    /// Plain JSON form of this node.
    ///
    /// A key is emitted when its serialized value is truthy or the kind keeps
    /// it regardless. Deterministic: serializing twice yields equal output.
    #[must_use]
    pub fn to_value(&self) -> Value {
        let keep = self.kind.keep_falsy();
        let mut out = Map::with_capacity(self.fields.len());
        for (key, value) in &self.fields {
            let value = value.to_value();
            if is_truthy(&value) || keep.contains(&key.as_str()) {
                out.insert(key.clone(), value);
            }
        }
        Value::Object(out)
    }

    /// Copy of this node with every `default` removed, nested nodes included.
    #[must_use]
    pub fn without_defaults(&self) -> Self {
        let fields = self
            .fields
            .iter()
            .filter(|(key, _)| key.as_str() != "default")
            .map(|(key, value)| (key.clone(), value.without_defaults()))
            .collect();
        Self {
            kind: self.kind,
            fields,
        }
    }

    fn json_str(&self, key: &str) -> Option<&str> {
        self.get(key)
            .and_then(AttrValue::as_json)
            .and_then(Value::as_str)
    }
}

impl Serialize for Schema {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_value().serialize(serializer)
    }
}

impl fmt::Display for Schema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_value().to_string())
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;

    #[test]
    fn primitive_kinds_bake_type_and_format() {
        let cases = [
            (Schema::boolean(Attributes::new()), json!({"type": "boolean"})),
            (
                Schema::integer(Attributes::new()),
                json!({"type": "integer", "format": "int32"}),
            ),
            (
                Schema::long(Attributes::new()),
                json!({"type": "integer", "format": "int64"}),
            ),
            (
                Schema::float(Attributes::new()),
                json!({"type": "number", "format": "float"}),
            ),
            (
                Schema::double(Attributes::new()),
                json!({"type": "number", "format": "double"}),
            ),
            (Schema::string(Attributes::new()), json!({"type": "string"})),
            (
                Schema::byte(Attributes::new()),
                json!({"type": "string", "format": "byte"}),
            ),
            (
                Schema::binary(Attributes::new()),
                json!({"type": "string", "format": "binary"}),
            ),
            (
                Schema::date(Attributes::new()),
                json!({"type": "string", "format": "date"}),
            ),
            (
                Schema::time(Attributes::new()),
                json!({"type": "string", "format": "time"}),
            ),
            (
                Schema::date_time(Attributes::new()),
                json!({"type": "string", "format": "date-time"}),
            ),
            (
                Schema::password(Attributes::new()),
                json!({"type": "string", "format": "password"}),
            ),
            (
                Schema::email(Attributes::new()),
                json!({"type": "string", "format": "email"}),
            ),
            (
                Schema::uuid(Attributes::new()),
                json!({"type": "string", "format": "uuid"}),
            ),
        ];
        for (node, expected) in cases {
            assert_eq!(node.to_value(), expected);
        }
    }

    #[test]
    fn baked_format_cannot_be_overridden() {
        let node = Schema::uuid(
            Attributes::new()
                .with("type", "integer")
                .with("format", "int32"),
        );
        assert_eq!(node.type_name(), Some("string"));
        assert_eq!(node.format(), Some("uuid"));
    }

    #[test]
    fn undeclared_attributes_are_dropped() {
        let node = Schema::string(
            Attributes::new()
                .with("description", "a name")
                .with("colour", "blue")
                .with("items", Schema::string(Attributes::new()))
                .with("x-origin", "legacy"),
        );
        assert_eq!(
            node.to_value(),
            json!({"type": "string", "description": "a name", "x-origin": "legacy"})
        );
        assert!(node.get("colour").is_none());
    }

    #[test]
    fn falsy_values_are_omitted_unless_kept() {
        let node = Schema::integer(
            Attributes::new()
                .with("nullable", false)
                .with("enum", json!([]))
                .with("description", "")
                .with("minimum", 0_i64)
                .with("default", 0_i64),
        );
        assert_eq!(
            node.to_value(),
            json!({"type": "integer", "format": "int32", "minimum": 0, "default": 0})
        );
    }

    #[test]
    fn any_value_always_emits_additional_properties() {
        let node = Schema::any_value(Attributes::new().with("nullable", true));
        assert_eq!(
            node.to_value(),
            json!({"additionalProperties": {}, "nullable": true})
        );
    }

    #[test]
    fn nested_nodes_serialize_recursively() {
        let mut properties = IndexMap::new();
        properties.insert(
            "tags".to_string(),
            Schema::array(Schema::string(Attributes::new()), Attributes::new()),
        );
        properties.insert("id".to_string(), Schema::uuid(Attributes::new()));
        let node = Schema::object(properties, Attributes::new());

        assert_eq!(
            node.to_value(),
            json!({
                "type": "object",
                "properties": {
                    "tags": {"type": "array", "items": {"type": "string"}},
                    "id": {"type": "string", "format": "uuid"}
                }
            })
        );
        assert_eq!(node.property("id").and_then(Schema::format), Some("uuid"));
        assert_eq!(
            node.property("tags").and_then(Schema::items).and_then(Schema::type_name),
            Some("string")
        );
    }

    #[test]
    fn properties_keep_insertion_order() {
        let mut properties = IndexMap::new();
        for name in ["zeta", "alpha", "mid"] {
            properties.insert(name.to_string(), Schema::string(Attributes::new()));
        }
        let value = Schema::object(properties, Attributes::new()).to_value();
        let keys: Vec<&String> = value["properties"]
            .as_object()
            .map(|props| props.keys().collect())
            .unwrap_or_default();
        assert_eq!(keys, vec!["zeta", "alpha", "mid"]);
    }

    #[test]
    fn empty_items_are_dropped_from_output() {
        let node = Schema::array(
            Schema::new(SchemaKind::Schema, Attributes::new()),
            Attributes::new(),
        );
        assert_eq!(node.to_value(), json!({"type": "array"}));
    }

    #[test]
    fn serialization_is_idempotent() {
        let node = Schema::object(
            IndexMap::from([(
                "n".to_string(),
                Schema::double(Attributes::new().with("maximum", 9.5)),
            )]),
            Attributes::new().with("description", "thing"),
        );
        assert_eq!(node.to_value(), node.to_value());
        assert_eq!(node.to_string(), node.to_string());
        let via_serde = serde_json::to_value(&node).unwrap_or_default();
        assert_eq!(via_serde, node.to_value());
    }

    #[test]
    fn reference_points_into_components() {
        let node = Schema::reference("Pet");
        assert_eq!(node.to_value(), json!({"$ref": "#/components/schemas/Pet"}));
        assert_eq!(node.kind(), SchemaKind::Reference);
    }
}
