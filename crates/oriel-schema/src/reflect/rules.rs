//! Default dispatch table.

use indexmap::IndexMap;
use serde_json::Value;

use super::{Reflector, Rule, Scope};
use crate::field;
use crate::schema::{Attributes, Schema, SchemaKind};
use crate::shape::{EnumShape, Input, ModelShape, Sample, TypeShape};

pub(super) const OBJECT_FALLBACK: Rule = Rule::new("object", always, build_object);

pub(super) fn defaults() -> Vec<Rule> {
    vec![
        Rule::new("union", is_union, build_union),
        Rule::new("schema", is_schema, build_schema),
        Rule::new("scalar_type", is_scalar_type, build_scalar_type),
        Rule::new("scalar_value", is_scalar_value, build_scalar_value),
        Rule::new("sequence_value", is_sequence_value, build_sequence_value),
        Rule::new("mapping_value", is_mapping_value, build_mapping_value),
        Rule::new("mapping_type", is_mapping_type, build_mapping_type),
        Rule::new("sequence_type", is_sequence_type, build_sequence_type),
        Rule::new("enum_type", is_enum_type, build_enum_type),
    ]
}

/// Node kind for a scalar shape.
const fn scalar_kind(shape: &TypeShape) -> Option<SchemaKind> {
    match shape {
        TypeShape::Bool => Some(SchemaKind::Boolean),
        TypeShape::Int => Some(SchemaKind::Integer),
        TypeShape::Long => Some(SchemaKind::Long),
        TypeShape::Float => Some(SchemaKind::Float),
        TypeShape::Double => Some(SchemaKind::Double),
        TypeShape::Str => Some(SchemaKind::String),
        TypeShape::Bytes => Some(SchemaKind::Byte),
        TypeShape::ByteArray => Some(SchemaKind::Binary),
        TypeShape::Date => Some(SchemaKind::Date),
        TypeShape::Time => Some(SchemaKind::Time),
        TypeShape::DateTime => Some(SchemaKind::DateTime),
        TypeShape::Uuid => Some(SchemaKind::Uuid),
        TypeShape::Any => Some(SchemaKind::AnyValue),
        _ => None,
    }
}

// --- union ---------------------------------------------------------------

const fn is_union(input: &Input) -> bool {
    matches!(input, Input::Type(TypeShape::Union(_)))
}

fn build_union(
    reflector: &Reflector,
    scope: &mut Scope,
    input: &Input,
    mut overrides: Attributes,
) -> Schema {
    let Input::Type(TypeShape::Union(branches)) = input else {
        return build_object(reflector, scope, input, overrides);
    };

    if branches.iter().any(|branch| matches!(branch, TypeShape::None)) {
        overrides.insert("nullable", true);
    }

    let mut remaining: Vec<&TypeShape> = branches
        .iter()
        .filter(|branch| !matches!(branch, TypeShape::None))
        .collect();

    if remaining.len() == 1 {
        let only = Input::Type(remaining.remove(0).clone());
        return reflector.reflect_in(scope, &only, overrides);
    }

    let alternatives: Vec<Schema> = remaining
        .into_iter()
        .map(|branch| reflector.reflect_in(scope, &Input::Type(branch.clone()), Attributes::new()))
        .collect();
    overrides.insert("oneOf", alternatives);
    Schema::new(SchemaKind::Schema, overrides)
}

// --- schema pass-through ---------------------------------------------------

const fn is_schema(input: &Input) -> bool {
    matches!(input, Input::Type(TypeShape::Schema(_)))
}

fn build_schema(
    reflector: &Reflector,
    scope: &mut Scope,
    input: &Input,
    overrides: Attributes,
) -> Schema {
    match input {
        Input::Type(TypeShape::Schema(node)) => {
            if !overrides.is_empty() {
                tracing::trace!(kind = %node.kind(), "ignoring overrides on prebuilt schema");
            }
            (**node).clone()
        }
        _ => build_object(reflector, scope, input, overrides),
    }
}

// --- scalars ---------------------------------------------------------------

const fn is_scalar_type(input: &Input) -> bool {
    matches!(input, Input::Type(shape) if scalar_kind(shape).is_some())
}

fn build_scalar_type(
    reflector: &Reflector,
    scope: &mut Scope,
    input: &Input,
    overrides: Attributes,
) -> Schema {
    match input {
        Input::Type(shape) => match scalar_kind(shape) {
            Some(kind) => Schema::new(kind, overrides),
            None => build_object(reflector, scope, input, overrides),
        },
        Input::Value(_) => build_object(reflector, scope, input, overrides),
    }
}

fn is_scalar_value(input: &Input) -> bool {
    matches!(input, Input::Value(sample) if sample.scalar_shape().is_some())
}

fn build_scalar_value(
    reflector: &Reflector,
    scope: &mut Scope,
    input: &Input,
    mut overrides: Attributes,
) -> Schema {
    let Input::Value(sample) = input else {
        return build_object(reflector, scope, input, overrides);
    };
    match sample.scalar_shape().as_ref().and_then(scalar_kind) {
        Some(kind) => {
            overrides.insert_missing("default", sample.to_json());
            Schema::new(kind, overrides)
        }
        None => build_object(reflector, scope, input, overrides),
    }
}

// --- example containers ------------------------------------------------------

const fn is_sequence_value(input: &Input) -> bool {
    matches!(input, Input::Value(Sample::List(_)))
}

/// Input used for a list element: scalars by type, containers by value.
fn element_input(sample: &Sample) -> Input {
    sample
        .scalar_shape()
        .map_or_else(|| Input::Value(sample.clone()), Input::Type)
}

/// Element schema by shape only; container elements lose their nested defaults.
fn reflect_element(
    reflector: &Reflector,
    scope: &mut Scope,
    element: &Sample,
    attributes: Attributes,
) -> Schema {
    reflector
        .reflect_in(scope, &element_input(element), attributes)
        .without_defaults()
}

fn build_sequence_value(
    reflector: &Reflector,
    scope: &mut Scope,
    input: &Input,
    mut overrides: Attributes,
) -> Schema {
    let Input::Value(Sample::List(elements)) = input else {
        return build_object(reflector, scope, input, overrides);
    };

    if elements.is_empty() {
        overrides.insert_missing("nullable", true);
        let items = Schema::new(SchemaKind::Schema, Attributes::new().with("nullable", true));
        return Schema::array(items, overrides);
    }

    let has_null = elements.iter().any(|element| matches!(element, Sample::Null));
    let present: Vec<&Sample> = elements
        .iter()
        .filter(|element| !matches!(element, Sample::Null))
        .collect();

    let item_attributes = || {
        if has_null {
            Attributes::new().with("nullable", true)
        } else {
            Attributes::new()
        }
    };

    let mut distinct: Vec<(&Sample, Schema)> = Vec::new();
    for element in present {
        let node = reflect_element(reflector, scope, element, Attributes::new());
        if !distinct.iter().any(|(_, seen)| *seen == node) {
            distinct.push((element, node));
        }
    }

    let items = match distinct.len() {
        0 => Schema::new(SchemaKind::Schema, item_attributes()),
        1 => {
            let (element, node) = distinct.remove(0);
            if has_null {
                reflect_element(reflector, scope, element, item_attributes())
            } else {
                node
            }
        }
        _ => {
            let alternatives: Vec<Schema> = distinct.into_iter().map(|(_, node)| node).collect();
            Schema::new(SchemaKind::Schema, item_attributes().with("oneOf", alternatives))
        }
    };

    Schema::array(items, overrides)
}

const fn is_mapping_value(input: &Input) -> bool {
    matches!(input, Input::Value(Sample::Map(_)))
}

fn build_mapping_value(
    reflector: &Reflector,
    scope: &mut Scope,
    input: &Input,
    overrides: Attributes,
) -> Schema {
    let Input::Value(Sample::Map(entries)) = input else {
        return build_object(reflector, scope, input, overrides);
    };
    let properties: IndexMap<String, Schema> = entries
        .iter()
        .map(|(key, value)| {
            let node = reflector.reflect_in(scope, &Input::Value(value.clone()), Attributes::new());
            (key.clone(), node)
        })
        .collect();
    Schema::object(properties, overrides)
}

// --- generic containers ------------------------------------------------------

const fn is_mapping_type(input: &Input) -> bool {
    matches!(input, Input::Type(TypeShape::Map(_, _)))
}

fn build_mapping_type(
    reflector: &Reflector,
    scope: &mut Scope,
    input: &Input,
    mut overrides: Attributes,
) -> Schema {
    let Input::Type(TypeShape::Map(key, value)) = input else {
        return build_object(reflector, scope, input, overrides);
    };
    if !matches!(**key, TypeShape::Str) {
        tracing::trace!(key = %key.describe(), "mapping key documented as string");
    }
    let values = reflector.reflect_in(scope, &Input::Type((**value).clone()), Attributes::new());
    overrides.insert("additionalProperties", values);
    Schema::object(IndexMap::new(), overrides)
}

const fn is_sequence_type(input: &Input) -> bool {
    matches!(input, Input::Type(TypeShape::List(_)))
}

fn build_sequence_type(
    reflector: &Reflector,
    scope: &mut Scope,
    input: &Input,
    overrides: Attributes,
) -> Schema {
    let Input::Type(TypeShape::List(item)) = input else {
        return build_object(reflector, scope, input, overrides);
    };
    let items = reflector.reflect_in(scope, &Input::Type((**item).clone()), Attributes::new());
    Schema::array(items, overrides)
}

// --- enums ---------------------------------------------------------------------

const fn is_enum_type(input: &Input) -> bool {
    matches!(input, Input::Type(TypeShape::Enum(_)))
}

/// Scalar shape shared by every member value, if there is exactly one.
fn member_shape(shape: &EnumShape) -> Option<TypeShape> {
    let mut shared: Option<TypeShape> = None;
    for value in shape.values() {
        let current = match value {
            Value::Bool(_) => TypeShape::Bool,
            Value::Number(number) if number.is_i64() || number.is_u64() => TypeShape::Int,
            Value::Number(_) => TypeShape::Float,
            Value::String(_) => TypeShape::Str,
            Value::Null | Value::Array(_) | Value::Object(_) => return None,
        };
        match &shared {
            None => shared = Some(current),
            Some(seen) if std::mem::discriminant(seen) == std::mem::discriminant(&current) => {}
            Some(_) => return None,
        }
    }
    shared
}

fn build_enum_type(
    reflector: &Reflector,
    scope: &mut Scope,
    input: &Input,
    mut overrides: Attributes,
) -> Schema {
    let Input::Type(TypeShape::Enum(shape)) = input else {
        return build_object(reflector, scope, input, overrides);
    };
    let values: Vec<Value> = shape.values().cloned().collect();
    overrides.insert("enum", Value::Array(values));

    let scalar = member_shape(shape).unwrap_or_else(|| {
        tracing::debug!(enum_name = shape.name(), "mixed-type enum documented as string");
        TypeShape::Str
    });
    reflector.reflect_in(scope, &Input::Type(scalar), overrides)
}

// --- fallback --------------------------------------------------------------------

const fn always(_input: &Input) -> bool {
    true
}

fn build_object(
    reflector: &Reflector,
    scope: &mut Scope,
    input: &Input,
    overrides: Attributes,
) -> Schema {
    match input {
        Input::Type(TypeShape::Model(model)) => build_model(reflector, scope, model, overrides),
        Input::Type(shape) => {
            tracing::debug!(shape = %shape.describe(), "no rule matched; documenting as object");
            Schema::object(IndexMap::new(), overrides)
        }
        Input::Value(_) => {
            tracing::debug!("unrecognized example value; documenting as object");
            Schema::object(IndexMap::new(), overrides)
        }
    }
}

fn build_model(
    reflector: &Reflector,
    scope: &mut Scope,
    model: &ModelShape,
    overrides: Attributes,
) -> Schema {
    let name = model.name();
    if scope.is_expanding(name) {
        tracing::debug!(model = name, "cyclic model reference; emitting $ref");
        return back_reference(name, overrides);
    }

    scope.enter(name);
    let mut properties = IndexMap::new();
    for (field_name, decl) in model.discover_fields() {
        let attributes = match decl.metadata.as_deref() {
            Some(metadata) => {
                let extracted = field::extract(metadata);
                if extracted.hidden {
                    tracing::debug!(
                        model = name,
                        field = %field_name,
                        "field hidden from documentation"
                    );
                    continue;
                }
                extracted.attributes
            }
            None => Attributes::new(),
        };
        let node = reflector.reflect_in(scope, &Input::Type(decl.shape), attributes);
        properties.insert(field_name, node);
    }
    scope.exit();

    Schema::object(properties, overrides)
}

/// `$ref` to a model already being expanded. Overrides cannot sit next to a
/// `$ref`, so they are attached to an `allOf` wrapper.
fn back_reference(name: &str, overrides: Attributes) -> Schema {
    let reference = Schema::reference(name);
    if overrides.is_empty() {
        return reference;
    }
    Schema::new(SchemaKind::Schema, overrides.with("allOf", vec![reference]))
}
