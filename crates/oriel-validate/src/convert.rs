//! OpenAPI 3.0 schema objects to JSON Schema.
//!
//! OpenAPI 3.0 expresses nullability with a `nullable` flag that JSON Schema
//! validators ignore. Conversion rewrites it into a `"null"` type branch,
//! derives `required` from the property nodes, and points component
//! references at a local `$defs` section. Reflected `oneOf` lists
//! alternative shapes, not exclusive ones, so it is checked as `anyOf`.

use oriel_schema::COMPONENTS_PREFIX;
use serde_json::{Map, Value, json};

const DEFS_PREFIX: &str = "#/$defs/";

/// Keywords whose value is a single subschema.
const SUBSCHEMA_KEYWORDS: &[&str] = &["items", "additionalProperties", "not"];

/// Keywords whose value is a list of subschemas.
const SUBSCHEMA_LIST_KEYWORDS: &[&str] = &["oneOf", "anyOf", "allOf"];

/// Convert a root OpenAPI schema node.
///
/// `definitions` maps component names to their OpenAPI nodes; references to
/// names it does not contain are relaxed to an unconstrained `{}`.
#[must_use]
pub fn to_json_schema(root: &Value, definitions: &Map<String, Value>) -> Value {
    let mut converted = convert_node(root, definitions);
    if !definitions.is_empty() {
        if let Value::Object(object) = &mut converted {
            let defs: Map<String, Value> = definitions
                .iter()
                .map(|(name, node)| (name.clone(), convert_node(node, definitions)))
                .collect();
            object.insert("$defs".to_string(), Value::Object(defs));
        }
    }
    converted
}

fn convert_node(node: &Value, definitions: &Map<String, Value>) -> Value {
    let Some(object) = node.as_object() else {
        return node.clone();
    };

    if let Some(target) = object.get("$ref").and_then(Value::as_str) {
        return convert_reference(target, definitions);
    }

    let mut out = Map::with_capacity(object.len());
    let mut alternatives = None;
    for (key, value) in object {
        match key.as_str() {
            "nullable" => {}
            "properties" => {
                if let Some(properties) = value.as_object() {
                    let converted: Map<String, Value> = properties
                        .iter()
                        .map(|(name, property)| (name.clone(), convert_node(property, definitions)))
                        .collect();
                    out.insert(key.clone(), Value::Object(converted));
                }
            }
            key if SUBSCHEMA_KEYWORDS.contains(&key) && value.is_object() => {
                out.insert(key.to_string(), convert_node(value, definitions));
            }
            key if SUBSCHEMA_LIST_KEYWORDS.contains(&key) => {
                let branches: Vec<Value> = value
                    .as_array()
                    .map(|branches| {
                        branches
                            .iter()
                            .map(|branch| convert_node(branch, definitions))
                            .collect()
                    })
                    .unwrap_or_default();
                if key == "oneOf" {
                    alternatives = Some(branches);
                } else {
                    out.insert(key.to_string(), Value::Array(branches));
                }
            }
            _ => {
                out.insert(key.clone(), value.clone());
            }
        }
    }

    if let Some(branches) = alternatives {
        add_alternatives(&mut out, branches);
    }

    if let Some(required) = required_properties(object) {
        out.insert("required".to_string(), required);
    }

    if is_nullable(object) {
        return allow_null(out);
    }
    Value::Object(out)
}

/// Place converted `oneOf` branches under `anyOf`, nesting them in `allOf`
/// when the node already has its own `anyOf`.
fn add_alternatives(out: &mut Map<String, Value>, branches: Vec<Value>) {
    if !out.contains_key("anyOf") {
        out.insert("anyOf".to_string(), Value::Array(branches));
        return;
    }
    let wrapped = json!({ "anyOf": branches });
    match out.get_mut("allOf") {
        Some(Value::Array(all_of)) => all_of.push(wrapped),
        _ => {
            out.insert("allOf".to_string(), json!([wrapped]));
        }
    }
}

fn convert_reference(target: &str, definitions: &Map<String, Value>) -> Value {
    match target.strip_prefix(COMPONENTS_PREFIX) {
        Some(name) if definitions.contains_key(name) => {
            json!({ "$ref": format!("{DEFS_PREFIX}{name}") })
        }
        _ => {
            tracing::debug!(reference = target, "unresolvable reference relaxed to an open schema");
            json!({})
        }
    }
}

/// Properties that are neither nullable nor defaulted, unless the node
/// already declares its own `required` list.
fn required_properties(object: &Map<String, Value>) -> Option<Value> {
    if object.contains_key("required") {
        return None;
    }
    let properties = object.get("properties")?.as_object()?;
    let required: Vec<Value> = properties
        .iter()
        .filter(|(_, property)| {
            property
                .as_object()
                .is_some_and(|property| !is_nullable(property) && !property.contains_key("default"))
        })
        .map(|(name, _)| Value::String(name.clone()))
        .collect();
    (!required.is_empty()).then_some(Value::Array(required))
}

fn is_nullable(object: &Map<String, Value>) -> bool {
    object.get("nullable").and_then(Value::as_bool) == Some(true)
}

/// Widen a converted node so `null` also validates.
fn allow_null(mut out: Map<String, Value>) -> Value {
    if let Some(values) = out.get_mut("enum").and_then(Value::as_array_mut) {
        if !values.contains(&Value::Null) {
            values.push(Value::Null);
        }
    }

    match out.get("type").cloned() {
        Some(Value::String(ty)) => {
            out.insert("type".to_string(), json!([ty, "null"]));
            Value::Object(out)
        }
        Some(Value::Array(mut types)) => {
            if !types.iter().any(|ty| ty == "null") {
                types.push(Value::from("null"));
            }
            out.insert("type".to_string(), Value::Array(types));
            Value::Object(out)
        }
        _ if out.is_empty() => Value::Object(out),
        _ => json!({ "anyOf": [Value::Object(out), {"type": "null"}] }),
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn nullable_scalar_gains_null_type() {
        let converted = to_json_schema(
            &json!({"type": "integer", "format": "int32", "nullable": true}),
            &Map::new(),
        );
        assert_eq!(converted, json!({"type": ["integer", "null"], "format": "int32"}));
    }

    #[test]
    fn required_skips_nullable_and_defaulted() {
        let converted = to_json_schema(
            &json!({
                "type": "object",
                "properties": {
                    "id": {"type": "string", "format": "uuid"},
                    "nickname": {"type": "string", "nullable": true},
                    "age": {"type": "integer", "default": 0}
                }
            }),
            &Map::new(),
        );
        assert_eq!(converted["required"], json!(["id"]));
        assert_eq!(converted["properties"]["nickname"]["type"], json!(["string", "null"]));
    }

    #[test]
    fn nullable_enum_accepts_null() {
        let converted = to_json_schema(
            &json!({"type": "string", "enum": ["a", "b"], "nullable": true}),
            &Map::new(),
        );
        assert_eq!(converted["enum"], json!(["a", "b", null]));
    }

    #[test]
    fn nullable_wrapper_without_type_uses_any_of() {
        let converted = to_json_schema(
            &json!({"nullable": true, "allOf": [{"$ref": "#/components/schemas/Node"}]}),
            &Map::new(),
        );
        assert_eq!(converted, json!({"anyOf": [{"allOf": [{}]}, {"type": "null"}]}));
    }

    #[test]
    fn known_references_point_at_local_defs() {
        let mut definitions = Map::new();
        definitions.insert(
            "Node".to_string(),
            json!({
                "type": "object",
                "properties": {"next": {"$ref": "#/components/schemas/Node"}}
            }),
        );
        let converted = to_json_schema(&json!({"$ref": "#/components/schemas/Node"}), &definitions);
        assert_eq!(converted["$ref"], json!("#/$defs/Node"));
        assert_eq!(
            converted["$defs"]["Node"]["properties"]["next"],
            json!({"$ref": "#/$defs/Node"})
        );
        assert_eq!(converted["$defs"]["Node"]["required"], json!(["next"]));
    }

    #[test]
    fn one_of_is_checked_as_any_of() {
        let converted = to_json_schema(
            &json!({"oneOf": [
                {"type": "integer", "format": "int32"},
                {"type": "number", "format": "double"}
            ]}),
            &Map::new(),
        );
        assert_eq!(
            converted,
            json!({"anyOf": [
                {"type": "integer", "format": "int32"},
                {"type": "number", "format": "double"}
            ]})
        );
    }

    #[test]
    fn one_of_beside_any_of_is_nested_under_all_of() {
        let converted = to_json_schema(
            &json!({"anyOf": [{"type": "string"}], "oneOf": [{"type": "integer"}]}),
            &Map::new(),
        );
        assert_eq!(
            converted,
            json!({
                "anyOf": [{"type": "string"}],
                "allOf": [{"anyOf": [{"type": "integer"}]}]
            })
        );
    }

    #[test]
    fn empty_list_node_stays_permissive() {
        let converted = to_json_schema(
            &json!({"type": "array", "nullable": true, "items": {"nullable": true}}),
            &Map::new(),
        );
        assert_eq!(converted, json!({"type": ["array", "null"], "items": {}}));
    }
}
