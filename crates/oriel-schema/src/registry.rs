//! Named schema components.
//!
//! The `ComponentRegistry` holds the reflected node for each named model or
//! enum so that `$ref` back-references emitted by the reflector resolve to a
//! `#/components/schemas/<Name>` entry in the final document.

use std::collections::BTreeSet;

use indexmap::IndexMap;
use serde_json::{Value, json};

use crate::error::SchemaError;
use crate::reflect::Reflector;
use crate::reflectable::Reflectable;
use crate::schema::{Attributes, COMPONENTS_PREFIX, Schema};
use crate::shape::Input;

/// Components keyed by name, in registration order.
#[derive(Debug, Clone, Default)]
pub struct ComponentRegistry {
    reflector: Reflector,
    schemas: IndexMap<String, Schema>,
}

impl ComponentRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry that reflects with a custom rule table.
    #[must_use]
    pub fn with_reflector(reflector: Reflector) -> Self {
        Self {
            reflector,
            schemas: IndexMap::new(),
        }
    }

    /// Reflect `T` and register it under its model or enum name.
    ///
    /// Registering a name twice keeps (and returns) the first node.
    ///
    /// # Errors
    ///
    /// Returns `SchemaError::Anonymous` if `T`'s shape has no name.
    pub fn register<T: Reflectable + ?Sized>(&mut self) -> Result<&Schema, SchemaError> {
        let shape = T::shape();
        let name = shape
            .name()
            .map(str::to_string)
            .ok_or_else(|| SchemaError::Anonymous {
                shape: shape.describe().into_owned(),
            })?;
        Ok(self.register_as(name, shape))
    }

    /// Reflect `input` and register it under `name`.
    pub fn register_as(&mut self, name: impl Into<String>, input: impl Into<Input>) -> &Schema {
        let name = name.into();
        let reflector = &self.reflector;
        self.schemas.entry(name).or_insert_with_key(|name| {
            tracing::debug!(component = %name, "registering schema component");
            reflector.reflect(input, Attributes::new())
        })
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Schema> {
        self.schemas.get(name)
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.schemas.contains_key(name)
    }

    /// Registered names, sorted.
    #[must_use]
    pub fn list(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.schemas.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.schemas.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.schemas.is_empty()
    }

    /// `$ref` node pointing at a registered component.
    ///
    /// # Errors
    ///
    /// Returns `SchemaError::NotFound` if `name` is not registered.
    pub fn reference(&self, name: &str) -> Result<Schema, SchemaError> {
        if self.contains(name) {
            Ok(Schema::reference(name))
        } else {
            Err(SchemaError::NotFound(name.to_string()))
        }
    }

    /// `{"schemas": {...}}` in registration order.
    #[must_use]
    pub fn to_components(&self) -> Value {
        let schemas: serde_json::Map<String, Value> = self
            .schemas
            .iter()
            .map(|(name, node)| (name.clone(), node.to_value()))
            .collect();
        json!({ "schemas": schemas })
    }

    /// Component names referenced by some `$ref` but never registered.
    #[must_use]
    pub fn dangling_references(&self) -> Vec<String> {
        let mut targets = BTreeSet::new();
        for node in self.schemas.values() {
            collect_references(&node.to_value(), &mut targets);
        }
        targets
            .into_iter()
            .filter(|name| !self.contains(name))
            .collect()
    }
}

fn collect_references(value: &Value, targets: &mut BTreeSet<String>) {
    match value {
        Value::Object(entries) => {
            for (key, entry) in entries {
                match (key.as_str(), entry) {
                    ("$ref", Value::String(target)) => {
                        if let Some(name) = target.strip_prefix(COMPONENTS_PREFIX) {
                            targets.insert(name.to_string());
                        }
                    }
                    _ => collect_references(entry, targets),
                }
            }
        }
        Value::Array(items) => {
            for item in items {
                collect_references(item, targets);
            }
        }
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;
    use crate::schema::SchemaKind;
    use crate::shape::{EnumShape, FieldDecl, ModelShape, Sample, TypeShape};

    struct Pet;

    impl Reflectable for Pet {
        fn shape() -> TypeShape {
            ModelShape::new("Pet", || {
                vec![
                    FieldDecl::of::<uuid::Uuid>("id"),
                    FieldDecl::of::<String>("name"),
                    FieldDecl::of::<Vec<Pet>>("friends"),
                ]
            })
            .into()
        }
    }

    struct Color;

    impl Reflectable for Color {
        fn shape() -> TypeShape {
            EnumShape::new("Color").member("Red", "red").member("Blue", "blue").into()
        }
    }

    #[test]
    fn registers_named_shapes() {
        let mut registry = ComponentRegistry::new();
        registry.register::<Pet>().map(|_| ()).unwrap_or_else(|e| panic!("{e}"));
        registry.register::<Color>().map(|_| ()).unwrap_or_else(|e| panic!("{e}"));

        assert_eq!(registry.list(), vec!["Color", "Pet"]);
        assert_eq!(registry.len(), 2);
        assert!(registry.contains("Pet"));
        assert!(registry.dangling_references().is_empty());
    }

    #[test]
    fn anonymous_shapes_are_rejected() {
        let mut registry = ComponentRegistry::new();
        let err = registry.register::<Vec<String>>().map(|_| ()).unwrap_err();
        assert!(matches!(err, SchemaError::Anonymous { ref shape } if shape == "list"));
        assert!(registry.is_empty());
    }

    #[test]
    fn first_registration_wins() {
        let mut registry = ComponentRegistry::new();
        registry.register_as("Thing", Sample::Int(1));
        let kept = registry.register_as("Thing", TypeShape::Str).to_value();
        assert_eq!(kept, json!({"type": "integer", "format": "int32", "default": 1}));
    }

    #[test]
    fn reference_requires_registration() {
        let mut registry = ComponentRegistry::new();
        assert!(matches!(
            registry.reference("Pet"),
            Err(SchemaError::NotFound(name)) if name == "Pet"
        ));

        registry.register_as("Pet", Pet::shape());
        let reference = registry.reference("Pet").map(|node| node.to_value()).ok();
        assert_eq!(reference, Some(json!({"$ref": "#/components/schemas/Pet"})));
    }

    #[test]
    fn unregistered_targets_are_dangling() {
        let mut registry = ComponentRegistry::new();
        let listing = Schema::new(
            SchemaKind::Schema,
            Attributes::new().with("allOf", vec![Schema::reference("Seller")]),
        );
        registry.register_as("Listing", listing);
        assert_eq!(registry.dangling_references(), vec!["Seller".to_string()]);
    }

    #[test]
    fn components_keep_registration_order() {
        let mut registry = ComponentRegistry::new();
        registry.register_as("Zed", TypeShape::Bool);
        registry.register_as("Alpha", TypeShape::Str);
        let components = registry.to_components();
        let names: Vec<&String> = components["schemas"]
            .as_object()
            .map(|schemas| schemas.keys().collect())
            .unwrap_or_default();
        assert_eq!(names, vec!["Zed", "Alpha"]);
    }
}
