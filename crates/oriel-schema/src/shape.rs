//! Reflector inputs: type shapes, model declarations, and example values.
//!
//! A [`TypeShape`] is the typed stand-in for a type annotation. Models expose
//! their fields through a lazily evaluated [`ModelShape`], so a model that
//! refers to itself can describe its shape without recursing at construction.

use std::borrow::Cow;
use std::fmt;
use std::sync::Arc;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use indexmap::IndexMap;
use serde::Serialize;
use serde_json::Value;
use uuid::Uuid;

use crate::field::FieldMetadata;
use crate::reflectable::Reflectable;
use crate::schema::Schema;

/// Shape of a type as seen by the reflector.
#[derive(Debug, Clone)]
pub enum TypeShape {
    Bool,
    /// 32-bit (or narrower) integer.
    Int,
    /// 64-bit (or wider) integer.
    Long,
    Float,
    Double,
    Str,
    /// Immutable byte sequence, documented as base64 (`format: byte`).
    Bytes,
    /// Mutable byte buffer, documented as raw binary (`format: binary`).
    ByteArray,
    Date,
    Time,
    DateTime,
    Uuid,
    /// Unconstrained value.
    Any,
    /// The unit/null type. Only meaningful inside a [`TypeShape::Union`].
    None,
    Union(Vec<TypeShape>),
    List(Box<TypeShape>),
    Map(Box<TypeShape>, Box<TypeShape>),
    Enum(EnumShape),
    Model(ModelShape),
    /// An already-built node, passed through unchanged.
    Schema(Box<Schema>),
    /// A shape the reflector has no rule for.
    Opaque(Cow<'static, str>),
}

impl TypeShape {
    /// `Union[inner, None]`.
    #[must_use]
    pub fn optional(inner: Self) -> Self {
        Self::Union(vec![inner, Self::None])
    }

    #[must_use]
    pub fn list(item: Self) -> Self {
        Self::List(Box::new(item))
    }

    /// Mapping from string-like keys to `value`.
    #[must_use]
    pub fn map(value: Self) -> Self {
        Self::Map(Box::new(Self::Str), Box::new(value))
    }

    /// Component name for named shapes (models and enums).
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        match self {
            Self::Model(model) => Some(model.name()),
            Self::Enum(shape) => Some(shape.name()),
            _ => None,
        }
    }

    /// Whether this shape (or any union branch) is a list.
    #[must_use]
    pub fn is_list_like(&self) -> bool {
        match self {
            Self::List(_) => true,
            Self::Union(branches) => branches.iter().any(Self::is_list_like),
            _ => false,
        }
    }

    /// Short human-readable label used in errors and logs.
    #[must_use]
    pub fn describe(&self) -> Cow<'_, str> {
        match self {
            Self::Bool => "bool".into(),
            Self::Int => "int".into(),
            Self::Long => "long".into(),
            Self::Float => "float".into(),
            Self::Double => "double".into(),
            Self::Str => "str".into(),
            Self::Bytes => "bytes".into(),
            Self::ByteArray => "bytearray".into(),
            Self::Date => "date".into(),
            Self::Time => "time".into(),
            Self::DateTime => "datetime".into(),
            Self::Uuid => "uuid".into(),
            Self::Any => "any".into(),
            Self::None => "none".into(),
            Self::Union(_) => "union".into(),
            Self::List(_) => "list".into(),
            Self::Map(_, _) => "map".into(),
            Self::Enum(shape) => Cow::Owned(format!("enum {}", shape.name())),
            Self::Model(model) => Cow::Owned(format!("model {}", model.name())),
            Self::Schema(_) => "schema".into(),
            Self::Opaque(name) => Cow::Borrowed(name.as_ref()),
        }
    }
}

impl From<ModelShape> for TypeShape {
    fn from(model: ModelShape) -> Self {
        Self::Model(model)
    }
}

impl From<EnumShape> for TypeShape {
    fn from(shape: EnumShape) -> Self {
        Self::Enum(shape)
    }
}

impl From<Schema> for TypeShape {
    fn from(node: Schema) -> Self {
        Self::Schema(Box::new(node))
    }
}

/// An enumeration: ordered `(member name, member value)` pairs.
#[derive(Debug, Clone, PartialEq)]
pub struct EnumShape {
    name: Cow<'static, str>,
    members: Vec<(String, Value)>,
}

impl EnumShape {
    #[must_use]
    pub fn new(name: impl Into<Cow<'static, str>>) -> Self {
        Self {
            name: name.into(),
            members: Vec::new(),
        }
    }

    /// Builder-style member append.
    #[must_use]
    pub fn member(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.members.push((name.into(), value.into()));
        self
    }

    /// Build from serde-serializable variants. The member name is the
    /// variant's `Debug` output and the value its serialized form.
    ///
    /// Variants that fail to serialize are skipped.
    #[must_use]
    pub fn from_variants<T: Serialize + fmt::Debug>(
        name: impl Into<Cow<'static, str>>,
        variants: &[T],
    ) -> Self {
        let name = name.into();
        let members = variants
            .iter()
            .filter_map(|variant| match serde_json::to_value(variant) {
                Ok(value) => Some((format!("{variant:?}"), value)),
                Err(error) => {
                    tracing::warn!(
                        enum_name = %name,
                        %error,
                        "skipping enum variant that failed to serialize"
                    );
                    None
                }
            })
            .collect();
        Self { name, members }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn members(&self) -> &[(String, Value)] {
        &self.members
    }

    /// Member values in declaration order.
    pub fn values(&self) -> impl Iterator<Item = &Value> {
        self.members.iter().map(|(_, value)| value)
    }
}

type FieldSource = Arc<dyn Fn() -> Vec<FieldDecl> + Send + Sync>;

/// A structured model type: a name plus a lazily listed set of fields.
#[derive(Clone)]
pub struct ModelShape {
    name: Cow<'static, str>,
    fields: FieldSource,
}

impl ModelShape {
    /// Model whose fields are produced by `fields` on demand.
    #[must_use]
    pub fn new(name: impl Into<Cow<'static, str>>, fields: fn() -> Vec<FieldDecl>) -> Self {
        Self::lazy(name, fields)
    }

    /// Model with a capturing field source.
    #[must_use]
    pub fn lazy(
        name: impl Into<Cow<'static, str>>,
        fields: impl Fn() -> Vec<FieldDecl> + Send + Sync + 'static,
    ) -> Self {
        Self {
            name: name.into(),
            fields: Arc::new(fields),
        }
    }

    /// Model with a fixed field list.
    #[must_use]
    pub fn from_fields(name: impl Into<Cow<'static, str>>, fields: Vec<FieldDecl>) -> Self {
        Self::lazy(name, move || fields.clone())
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Raw field declarations, in declaration order.
    #[must_use]
    pub fn fields(&self) -> Vec<FieldDecl> {
        (self.fields)()
    }

    /// Public fields keyed by name.
    ///
    /// Names starting with `_` are skipped. Declared fields come first; a
    /// computed field with the same name replaces the declared entry.
    #[must_use]
    pub fn discover_fields(&self) -> IndexMap<String, FieldDecl> {
        let (declared, computed): (Vec<_>, Vec<_>) = self
            .fields()
            .into_iter()
            .filter(|field| !field.name.starts_with('_'))
            .partition(|field| field.kind == FieldKind::Declared);

        let mut discovered = IndexMap::with_capacity(declared.len() + computed.len());
        for field in declared.into_iter().chain(computed) {
            discovered.insert(field.name.clone(), field);
        }
        discovered
    }
}

impl fmt::Debug for ModelShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModelShape")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

/// How a field is exposed on its model.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// A stored, type-annotated member.
    Declared,
    /// A property-style member whose type is its getter's return type.
    Computed,
}

/// One field of a model.
#[derive(Debug, Clone)]
pub struct FieldDecl {
    pub name: String,
    pub shape: TypeShape,
    pub metadata: Option<Arc<dyn FieldMetadata>>,
    pub kind: FieldKind,
}

impl FieldDecl {
    #[must_use]
    pub fn new(name: impl Into<String>, shape: TypeShape) -> Self {
        Self {
            name: name.into(),
            shape,
            metadata: None,
            kind: FieldKind::Declared,
        }
    }

    /// Field typed by a [`Reflectable`] type.
    #[must_use]
    pub fn of<T: Reflectable + ?Sized>(name: impl Into<String>) -> Self {
        Self::new(name, T::shape())
    }

    /// Property-style field typed by a [`Reflectable`] type.
    #[must_use]
    pub fn computed<T: Reflectable + ?Sized>(name: impl Into<String>) -> Self {
        Self {
            kind: FieldKind::Computed,
            ..Self::of::<T>(name)
        }
    }

    /// Attach framework-declared metadata.
    #[must_use]
    pub fn with_metadata(mut self, metadata: impl FieldMetadata + 'static) -> Self {
        self.metadata = Some(Arc::new(metadata));
        self
    }
}

/// A runtime example value.
#[derive(Debug, Clone, PartialEq)]
pub enum Sample {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    Bytes(Vec<u8>),
    ByteArray(Vec<u8>),
    Date(NaiveDate),
    Time(NaiveTime),
    DateTime(NaiveDateTime),
    Uuid(Uuid),
    List(Vec<Sample>),
    Map(IndexMap<String, Sample>),
}

impl Sample {
    /// Shape of a scalar sample; `None` for null and containers.
    #[must_use]
    pub const fn scalar_shape(&self) -> Option<TypeShape> {
        match self {
            Self::Bool(_) => Some(TypeShape::Bool),
            Self::Int(_) => Some(TypeShape::Int),
            Self::Float(_) => Some(TypeShape::Float),
            Self::Str(_) => Some(TypeShape::Str),
            Self::Bytes(_) => Some(TypeShape::Bytes),
            Self::ByteArray(_) => Some(TypeShape::ByteArray),
            Self::Date(_) => Some(TypeShape::Date),
            Self::Time(_) => Some(TypeShape::Time),
            Self::DateTime(_) => Some(TypeShape::DateTime),
            Self::Uuid(_) => Some(TypeShape::Uuid),
            Self::Null | Self::List(_) | Self::Map(_) => None,
        }
    }

    /// JSON rendering used for `default` values.
    ///
    /// Bytes are base64, temporal values ISO-8601, UUIDs hyphenated.
    #[must_use]
    pub fn to_json(&self) -> Value {
        match self {
            Self::Null => Value::Null,
            Self::Bool(flag) => Value::Bool(*flag),
            Self::Int(number) => Value::from(*number),
            Self::Float(number) => Value::from(*number),
            Self::Str(text) => Value::String(text.clone()),
            Self::Bytes(bytes) | Self::ByteArray(bytes) => Value::String(STANDARD.encode(bytes)),
            Self::Date(date) => Value::String(date.format("%Y-%m-%d").to_string()),
            Self::Time(time) => Value::String(time.format("%H:%M:%S%.f").to_string()),
            Self::DateTime(stamp) => {
                Value::String(stamp.format("%Y-%m-%dT%H:%M:%S%.f").to_string())
            }
            Self::Uuid(id) => Value::String(id.hyphenated().to_string()),
            Self::List(items) => Value::Array(items.iter().map(Self::to_json).collect()),
            Self::Map(entries) => Value::Object(
                entries
                    .iter()
                    .map(|(key, value)| (key.clone(), value.to_json()))
                    .collect(),
            ),
        }
    }
}

impl From<Value> for Sample {
    fn from(value: Value) -> Self {
        match value {
            Value::Null => Self::Null,
            Value::Bool(flag) => Self::Bool(flag),
            Value::Number(number) => number
                .as_i64()
                .map_or_else(|| Self::Float(number.as_f64().unwrap_or(f64::NAN)), Self::Int),
            Value::String(text) => Self::Str(text),
            Value::Array(items) => Self::List(items.into_iter().map(Self::from).collect()),
            Value::Object(entries) => Self::Map(
                entries
                    .into_iter()
                    .map(|(key, value)| (key, Self::from(value)))
                    .collect(),
            ),
        }
    }
}

/// What the reflector is asked to describe.
#[derive(Debug, Clone)]
pub enum Input {
    /// A type annotation.
    Type(TypeShape),
    /// A runtime example value.
    Value(Sample),
}

impl From<TypeShape> for Input {
    fn from(shape: TypeShape) -> Self {
        Self::Type(shape)
    }
}

impl From<Sample> for Input {
    fn from(sample: Sample) -> Self {
        Self::Value(sample)
    }
}

impl From<Schema> for Input {
    fn from(node: Schema) -> Self {
        Self::Type(TypeShape::from(node))
    }
}

impl From<ModelShape> for Input {
    fn from(model: ModelShape) -> Self {
        Self::Type(TypeShape::Model(model))
    }
}

impl From<EnumShape> for Input {
    fn from(shape: EnumShape) -> Self {
        Self::Type(TypeShape::Enum(shape))
    }
}
