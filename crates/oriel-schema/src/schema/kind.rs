//! Node kinds and their attribute allowlists.

use std::fmt;

use serde_json::{Value, json};

/// Attributes every kind accepts.
const BASE_FIELDS: &[&str] = &[
    "title",
    "description",
    "type",
    "format",
    "nullable",
    "required",
    "default",
    "example",
    "oneOf",
    "anyOf",
    "allOf",
    "additionalProperties",
    "multipleOf",
    "maximum",
    "exclusiveMaximum",
    "minimum",
    "exclusiveMinimum",
    "maxLength",
    "minLength",
    "pattern",
    "enum",
];

const OBJECT_FIELDS: &[&str] = &["properties", "maxProperties", "minProperties"];

const ARRAY_FIELDS: &[&str] = &["items", "maxItems", "minItems", "uniqueItems"];

const REFERENCE_FIELDS: &[&str] = &["$ref"];

/// Keys kept in serialized output even when their value is falsy.
///
/// Without this, `minimum: 0` or `default: false` would vanish.
const KEEP_FALSY: &[&str] = &[
    "default",
    "example",
    "minimum",
    "maximum",
    "minLength",
    "maxLength",
    "minItems",
    "maxItems",
    "minProperties",
    "maxProperties",
];

const ANY_VALUE_KEEP: &[&str] = &[
    "default",
    "example",
    "minimum",
    "maximum",
    "minLength",
    "maxLength",
    "minItems",
    "maxItems",
    "minProperties",
    "maxProperties",
    "additionalProperties",
];

/// Prefix of pass-through OpenAPI extension keys.
pub const EXTENSION_PREFIX: &str = "x-";

/// The concrete kind of a schema node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SchemaKind {
    /// Generic node with no baked type (unions, untyped placeholders).
    Schema,
    Boolean,
    Integer,
    Long,
    Float,
    Double,
    String,
    Byte,
    Binary,
    Date,
    Time,
    DateTime,
    Password,
    Email,
    Uuid,
    /// Unconstrained value.
    AnyValue,
    Object,
    Array,
    /// `$ref` to a named component.
    Reference,
}

impl SchemaKind {
    /// Stable name used in logs.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Schema => "schema",
            Self::Boolean => "boolean",
            Self::Integer => "integer",
            Self::Long => "long",
            Self::Float => "float",
            Self::Double => "double",
            Self::String => "string",
            Self::Byte => "byte",
            Self::Binary => "binary",
            Self::Date => "date",
            Self::Time => "time",
            Self::DateTime => "date_time",
            Self::Password => "password",
            Self::Email => "email",
            Self::Uuid => "uuid",
            Self::AnyValue => "any_value",
            Self::Object => "object",
            Self::Array => "array",
            Self::Reference => "reference",
        }
    }

    /// Fixed `type`/`format` pair for this kind, if any.
    #[must_use]
    pub const fn type_format(self) -> Option<(&'static str, Option<&'static str>)> {
        match self {
            Self::Schema | Self::AnyValue | Self::Reference => None,
            Self::Boolean => Some(("boolean", None)),
            Self::Integer => Some(("integer", Some("int32"))),
            Self::Long => Some(("integer", Some("int64"))),
            Self::Float => Some(("number", Some("float"))),
            Self::Double => Some(("number", Some("double"))),
            Self::String => Some(("string", None)),
            Self::Byte => Some(("string", Some("byte"))),
            Self::Binary => Some(("string", Some("binary"))),
            Self::Date => Some(("string", Some("date"))),
            Self::Time => Some(("string", Some("time"))),
            Self::DateTime => Some(("string", Some("date-time"))),
            Self::Password => Some(("string", Some("password"))),
            Self::Email => Some(("string", Some("email"))),
            Self::Uuid => Some(("string", Some("uuid"))),
            Self::Object => Some(("object", None)),
            Self::Array => Some(("array", None)),
        }
    }

    /// Attributes fixed at construction. Caller-supplied values for these
    /// keys are ignored.
    #[must_use]
    pub fn baked(self) -> Vec<(&'static str, Value)> {
        let mut baked = Vec::with_capacity(2);
        if let Some((ty, format)) = self.type_format() {
            baked.push(("type", Value::from(ty)));
            if let Some(format) = format {
                baked.push(("format", Value::from(format)));
            }
        }
        if self == Self::AnyValue {
            baked.push(("additionalProperties", json!({})));
        }
        baked
    }

    /// Whether `key` is declared for this kind or is an `x-` extension.
    #[must_use]
    pub fn accepts(self, key: &str) -> bool {
        if key.starts_with(EXTENSION_PREFIX) {
            return true;
        }
        match self {
            Self::Reference => REFERENCE_FIELDS.contains(&key),
            Self::Object => BASE_FIELDS.contains(&key) || OBJECT_FIELDS.contains(&key),
            Self::Array => BASE_FIELDS.contains(&key) || ARRAY_FIELDS.contains(&key),
            _ => BASE_FIELDS.contains(&key),
        }
    }

    /// Keys retained in serialized output even when falsy.
    #[must_use]
    pub const fn keep_falsy(self) -> &'static [&'static str] {
        match self {
            Self::AnyValue => ANY_VALUE_KEEP,
            Self::Reference => REFERENCE_FIELDS,
            _ => KEEP_FALSY,
        }
    }
}

impl fmt::Display for SchemaKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
