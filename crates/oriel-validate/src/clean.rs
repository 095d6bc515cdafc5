//! Turning multi-valued form/query data into a JSON object for validation.
//!
//! Every discovered model field gets an entry: list-like fields take all
//! submitted values, other fields the first one, and absent fields `null`.
//! With coercion on, string values are parsed into the field's scalar type;
//! a value that does not parse stays a string so the schema check reports it.

use oriel_schema::TypeShape;
use serde_json::{Map, Number, Value};

use crate::form::FormData;

/// Clean `data` against the fields of `shape`.
///
/// Model shapes contribute their discovered fields. Any other shape has no
/// declared fields, so every submitted key is kept.
#[must_use]
pub fn clean_data(shape: &TypeShape, data: &FormData, coerce: bool) -> Value {
    let mut cleaned = Map::new();

    match shape {
        TypeShape::Model(model) => {
            for (name, field) in model.discover_fields() {
                cleaned.insert(name.clone(), clean_field(&name, &field.shape, data, coerce));
            }
        }
        TypeShape::Map(_, value) => {
            for key in data.keys() {
                cleaned.insert(key.to_string(), clean_field(key, value, data, coerce));
            }
        }
        other => {
            tracing::debug!(
                shape = %other.describe(),
                "cleaning form data without declared fields"
            );
            for key in data.keys() {
                cleaned.insert(key.to_string(), clean_field(key, &TypeShape::Str, data, coerce));
            }
        }
    }

    Value::Object(cleaned)
}

fn clean_field(name: &str, shape: &TypeShape, data: &FormData, coerce: bool) -> Value {
    if shape.is_list_like() {
        let values = data.get_list(name);
        if values.is_empty() {
            return Value::Null;
        }
        let element = list_element(shape);
        return Value::Array(
            values
                .into_iter()
                .map(|raw| convert(raw, element, coerce))
                .collect(),
        );
    }

    data.get(name)
        .map_or(Value::Null, |raw| convert(raw, shape, coerce))
}

fn convert(raw: &str, shape: &TypeShape, coerce: bool) -> Value {
    if coerce {
        coerce_scalar(raw, shape)
    } else {
        Value::String(raw.to_string())
    }
}

/// Element shape of a list (or of the list branch of a union).
fn list_element(shape: &TypeShape) -> &TypeShape {
    match shape {
        TypeShape::List(item) => &**item,
        TypeShape::Union(branches) => branches
            .iter()
            .find(|branch| branch.is_list_like())
            .map_or(&TypeShape::Str, list_element),
        _ => &TypeShape::Str,
    }
}

/// Parse `raw` as the scalar `shape` names, or keep it as a string.
#[must_use]
pub fn coerce_scalar(raw: &str, shape: &TypeShape) -> Value {
    let text = raw.trim();
    let coerced = match shape {
        TypeShape::Int | TypeShape::Long => text.parse::<i64>().ok().map(Value::from),
        TypeShape::Float | TypeShape::Double => text
            .parse::<f64>()
            .ok()
            .and_then(Number::from_f64)
            .map(Value::Number),
        TypeShape::Bool => parse_bool(text).map(Value::Bool),
        TypeShape::Union(branches) => {
            return branches
                .iter()
                .filter(|branch| !matches!(branch, TypeShape::None))
                .map(|branch| coerce_scalar(raw, branch))
                .find(|value| !value.is_string())
                .unwrap_or_else(|| Value::String(raw.to_string()));
        }
        _ => None,
    };
    coerced.unwrap_or_else(|| Value::String(raw.to_string()))
}

fn parse_bool(text: &str) -> Option<bool> {
    match text.to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}
