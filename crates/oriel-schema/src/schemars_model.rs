//! Reflection of `schemars::JsonSchema` types.
//!
//! [`SchemarsModel<T>`] lets any type deriving `JsonSchema` be reflected
//! without a hand-written [`Reflectable`] impl. The generated JSON Schema is
//! read back into a [`TypeShape`]; property schemas become field metadata so
//! descriptions, defaults and constraints survive into the OpenAPI node.

use std::marker::PhantomData;
use std::sync::Arc;

use schemars::JsonSchema;
use serde_json::{Map, Value};

use crate::field::FieldInfo;
use crate::reflectable::Reflectable;
use crate::schema::EXTENSION_PREFIX;
use crate::shape::{EnumShape, FieldDecl, ModelShape, TypeShape};

/// Property keywords carried into field metadata as extra entries.
const CARRIED_KEYWORDS: &[&str] = &[
    "example",
    "minimum",
    "maximum",
    "exclusiveMinimum",
    "exclusiveMaximum",
    "multipleOf",
    "minLength",
    "maxLength",
    "pattern",
    "minItems",
    "maxItems",
    "uniqueItems",
    "minProperties",
    "maxProperties",
];

const REF_PREFIXES: &[&str] = &["#/$defs/", "#/definitions/"];

/// [`Reflectable`] adapter for a `schemars::JsonSchema` type.
///
/// ```
/// use oriel_schema::{Reflector, SchemarsModel};
///
/// #[derive(schemars::JsonSchema)]
/// struct Pet {
///     /// Display name
///     name: String,
///     age: Option<u32>,
/// }
///
/// let node = Reflector::new().reflect_type::<SchemarsModel<Pet>>();
/// assert_eq!(node.to_value()["properties"]["name"]["description"], "Display name");
/// ```
pub struct SchemarsModel<T: ?Sized>(PhantomData<T>);

impl<T: JsonSchema + ?Sized> Reflectable for SchemarsModel<T> {
    fn shape() -> TypeShape {
        let root = schemars::schema_for!(T).to_value();
        shape_from_json_schema(&root)
    }
}

/// The document being read: its root (for `#` self-references) and its
/// named definitions.
#[derive(Debug, Default)]
struct Document {
    root: Value,
    definitions: Map<String, Value>,
}

type Definitions = Arc<Document>;

/// Read a JSON Schema document back into a [`TypeShape`].
///
/// `$ref`s into `$defs` (or `definitions`) are resolved against the root;
/// model fields are listed lazily so recursive definitions terminate.
#[must_use]
pub fn shape_from_json_schema(root: &Value) -> TypeShape {
    let definitions = root
        .get("$defs")
        .or_else(|| root.get("definitions"))
        .and_then(Value::as_object)
        .cloned()
        .unwrap_or_default();
    let document = Arc::new(Document {
        root: root.clone(),
        definitions,
    });
    convert(root, &document, None)
}

fn convert(node: &Value, definitions: &Definitions, hint: Option<&str>) -> TypeShape {
    let Some(object) = node.as_object() else {
        // `true`, `false` and anything malformed.
        return TypeShape::Any;
    };

    if let Some(target) = object.get("$ref").and_then(Value::as_str) {
        return resolve(target, definitions);
    }

    if object.get("nullable").and_then(Value::as_bool) == Some(true) {
        let mut inner = object.clone();
        inner.remove("nullable");
        return TypeShape::optional(convert(&Value::Object(inner), definitions, hint));
    }

    if let Some(constant) = object.get("const") {
        return enum_shape(object, std::slice::from_ref(constant), hint);
    }
    if let Some(members) = object.get("enum").and_then(Value::as_array) {
        return enum_shape(object, members, hint);
    }

    for keyword in ["anyOf", "oneOf"] {
        if let Some(branches) = object.get(keyword).and_then(Value::as_array) {
            return union(branches, definitions, hint);
        }
    }
    if let Some([only]) = object.get("allOf").and_then(Value::as_array).map(Vec::as_slice) {
        return convert(only, definitions, hint);
    }

    match object.get("type") {
        Some(Value::String(ty)) => typed(ty, object, definitions, hint),
        Some(Value::Array(types)) => {
            let nullable = types.iter().any(|ty| ty == "null");
            let branches: Vec<TypeShape> = types
                .iter()
                .filter_map(Value::as_str)
                .filter(|ty| *ty != "null")
                .map(|ty| typed(ty, object, definitions, hint))
                .collect();
            let base = match <[TypeShape; 1]>::try_from(branches) {
                Ok([only]) => only,
                Err(branches) if branches.is_empty() => TypeShape::None,
                Err(branches) => TypeShape::Union(branches),
            };
            if nullable { TypeShape::optional(base) } else { base }
        }
        _ if object.contains_key("properties") => typed("object", object, definitions, hint),
        _ => TypeShape::Any,
    }
}

fn typed(
    ty: &str,
    object: &Map<String, Value>,
    definitions: &Definitions,
    hint: Option<&str>,
) -> TypeShape {
    let format = object.get("format").and_then(Value::as_str);
    match ty {
        "boolean" => TypeShape::Bool,
        "integer" => match format {
            Some("int64" | "uint64" | "uint" | "int") => TypeShape::Long,
            _ => TypeShape::Int,
        },
        "number" => match format {
            Some("float") => TypeShape::Float,
            _ => TypeShape::Double,
        },
        "string" => match format {
            Some("date") => TypeShape::Date,
            Some("time") => TypeShape::Time,
            Some("date-time") => TypeShape::DateTime,
            Some("uuid") => TypeShape::Uuid,
            Some("byte") => TypeShape::Bytes,
            Some("binary") => TypeShape::ByteArray,
            _ => TypeShape::Str,
        },
        "array" => {
            let item = object
                .get("items")
                .map_or(TypeShape::Any, |items| convert(items, definitions, None));
            TypeShape::list(item)
        }
        "object" => object_shape(object, definitions, hint),
        "null" => TypeShape::None,
        other => TypeShape::Opaque(other.to_string().into()),
    }
}

fn object_shape(
    object: &Map<String, Value>,
    definitions: &Definitions,
    hint: Option<&str>,
) -> TypeShape {
    if object.get("properties").and_then(Value::as_object).is_some() {
        let name = object
            .get("title")
            .and_then(Value::as_str)
            .or(hint)
            .unwrap_or("Model")
            .to_string();
        let node = object.clone();
        let definitions = Arc::clone(definitions);
        return ModelShape::lazy(name, move || model_fields(&node, &definitions)).into();
    }

    match object.get("additionalProperties") {
        Some(values @ Value::Object(_)) => TypeShape::map(convert(values, definitions, None)),
        Some(Value::Bool(true)) => TypeShape::map(TypeShape::Any),
        _ => TypeShape::Opaque("object".into()),
    }
}

fn model_fields(object: &Map<String, Value>, definitions: &Definitions) -> Vec<FieldDecl> {
    let Some(properties) = object.get("properties").and_then(Value::as_object) else {
        return Vec::new();
    };
    properties
        .iter()
        .map(|(name, property)| {
            let decl = FieldDecl::new(name.clone(), convert(property, definitions, None));
            match property_metadata(property) {
                Some(info) => decl.with_metadata(info),
                None => decl,
            }
        })
        .collect()
}

fn property_metadata(property: &Value) -> Option<FieldInfo> {
    let object = property.as_object()?;
    let mut info = FieldInfo::new();

    if let Some(description) = object.get("description").and_then(Value::as_str) {
        info = info.with_description(description);
    }
    if let Some(default) = object.get("default") {
        info = info.default_value(default.clone());
    }
    if !object.contains_key("example") {
        if let Some(first) = object
            .get("examples")
            .and_then(Value::as_array)
            .and_then(|all| all.first())
        {
            info = info.with_extra("example", first.clone());
        }
    }
    for (key, value) in object {
        if CARRIED_KEYWORDS.contains(&key.as_str()) || key.starts_with(EXTENSION_PREFIX) {
            info = info.with_extra(key.clone(), value.clone());
        }
    }

    (info != FieldInfo::default()).then_some(info)
}

fn resolve(target: &str, definitions: &Definitions) -> TypeShape {
    if target == "#" {
        return convert(&definitions.root, definitions, None);
    }
    let name = REF_PREFIXES
        .iter()
        .find_map(|prefix| target.strip_prefix(prefix))
        .unwrap_or(target);
    match definitions.definitions.get(name) {
        Some(definition) => convert(definition, definitions, Some(name)),
        None => {
            tracing::debug!(reference = target, "unresolved $ref; documenting as object");
            TypeShape::Opaque(name.to_string().into())
        }
    }
}

fn union(branches: &[Value], definitions: &Definitions, hint: Option<&str>) -> TypeShape {
    let nullable = branches.iter().any(is_null_schema);
    let mut shapes: Vec<TypeShape> = branches
        .iter()
        .filter(|branch| !is_null_schema(branch))
        .map(|branch| convert(branch, definitions, hint))
        .collect();

    if nullable {
        shapes.push(TypeShape::None);
    }
    if shapes.len() == 1 {
        return shapes.remove(0);
    }
    TypeShape::Union(shapes)
}

fn is_null_schema(schema: &Value) -> bool {
    schema.get("type").and_then(Value::as_str) == Some("null")
}

fn enum_shape(object: &Map<String, Value>, members: &[Value], hint: Option<&str>) -> TypeShape {
    let name = object
        .get("title")
        .and_then(Value::as_str)
        .or(hint)
        .unwrap_or("Enum")
        .to_string();
    let mut shape = EnumShape::new(name);
    let mut nullable = false;
    for value in members {
        match value {
            Value::Null => nullable = true,
            Value::String(text) => shape = shape.member(text.clone(), value.clone()),
            other => shape = shape.member(other.to_string(), other.clone()),
        }
    }
    if nullable {
        TypeShape::optional(shape.into())
    } else {
        shape.into()
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;
    use crate::reflect::Reflector;

    #[derive(JsonSchema)]
    #[allow(dead_code)]
    struct Owner {
        /// Login handle
        handle: String,
        #[schemars(range(min = 0))]
        karma: i64,
        tags: Vec<String>,
        nickname: Option<String>,
    }

    #[derive(JsonSchema)]
    #[allow(dead_code)]
    struct Category {
        name: String,
        parent: Option<Box<Category>>,
    }

    #[derive(JsonSchema)]
    #[serde(rename_all = "lowercase")]
    #[allow(dead_code)]
    enum Size {
        Small,
        Large,
    }

    #[test]
    fn derives_reflect_as_models() {
        let node = Reflector::new().reflect_type::<SchemarsModel<Owner>>();
        assert_eq!(
            node.to_value(),
            json!({
                "type": "object",
                "properties": {
                    "handle": {"type": "string", "description": "Login handle"},
                    "karma": {"type": "integer", "format": "int64", "minimum": 0},
                    "tags": {"type": "array", "items": {"type": "string"}},
                    "nickname": {"type": "string", "nullable": true}
                }
            })
        );
    }

    #[test]
    fn unit_enums_become_string_enums() {
        let node = Reflector::new().reflect_type::<SchemarsModel<Size>>();
        assert_eq!(node.to_value(), json!({"type": "string", "enum": ["small", "large"]}));
    }

    #[test]
    fn recursive_definitions_terminate() {
        let node = Reflector::new().reflect_type::<SchemarsModel<Category>>();
        assert_eq!(
            node.property("parent").map(crate::schema::Schema::to_value),
            Some(json!({"nullable": true, "allOf": [{"$ref": "#/components/schemas/Category"}]}))
        );
    }

    #[test]
    fn raw_schema_with_defs_resolves_references() {
        let root = json!({
            "title": "Order",
            "type": "object",
            "properties": {
                "item": {"$ref": "#/$defs/Item"},
                "count": {"type": "integer", "format": "int32", "default": 1}
            },
            "$defs": {
                "Item": {"type": "object", "properties": {"sku": {"type": "string"}}}
            }
        });
        let shape = shape_from_json_schema(&root);
        assert_eq!(shape.name(), Some("Order"));

        let node = Reflector::new().reflect(shape, crate::schema::Attributes::new());
        assert_eq!(
            node.to_value()["properties"],
            json!({
                "item": {"type": "object", "properties": {"sku": {"type": "string"}}},
                "count": {"type": "integer", "format": "int32", "default": 1}
            })
        );
    }

    #[test]
    fn scalar_formats_and_fallbacks() {
        assert!(matches!(
            shape_from_json_schema(&json!({"type": "number", "format": "float"})),
            TypeShape::Float
        ));
        assert!(matches!(shape_from_json_schema(&json!({"type": "number"})), TypeShape::Double));
        assert!(matches!(
            shape_from_json_schema(&json!({"type": "string", "format": "date-time"})),
            TypeShape::DateTime
        ));
        assert!(matches!(shape_from_json_schema(&json!(true)), TypeShape::Any));
        assert!(matches!(shape_from_json_schema(&json!({})), TypeShape::Any));
        assert!(matches!(
            shape_from_json_schema(&json!({
                "type": "object",
                "additionalProperties": {"type": "boolean"}
            })),
            TypeShape::Map(_, value) if matches!(*value, TypeShape::Bool)
        ));
    }

    #[test]
    fn null_branches_become_optional() {
        let shape =
            shape_from_json_schema(&json!({"anyOf": [{"type": "integer"}, {"type": "null"}]}));
        assert!(matches!(
            shape,
            TypeShape::Union(ref branches)
                if branches.len() == 2 && matches!(branches[1], TypeShape::None)
        ));
        let legacy = shape_from_json_schema(&json!({"type": "string", "nullable": true}));
        assert!(matches!(legacy, TypeShape::Union(_)));
    }
}
