//! Compiled validators and the request-level payload validator.

use std::fmt;

use indexmap::IndexMap;
use jsonschema::error::ValidationErrorKind;
use oriel_config::ValidationConfig;
use oriel_schema::{Attributes, ComponentRegistry, Reflector, TypeShape};
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use crate::clean::clean_data;
use crate::convert::to_json_schema;
use crate::error::{InitError, PayloadTarget, ROOT_KEY, ValidationFailure};
use crate::form::FormData;

/// A compiled JSON Schema validator built from an OpenAPI schema node.
pub struct SchemaValidator {
    schema: Value,
    validator: jsonschema::Validator,
}

impl SchemaValidator {
    /// Compile a serialized OpenAPI schema with no named components.
    ///
    /// # Errors
    ///
    /// Returns `InitError::Compile` if the converted schema is rejected.
    pub fn from_openapi(openapi: &Value) -> Result<Self, InitError> {
        Self::with_definitions(openapi, &Map::new(), PayloadTarget::Json)
    }

    /// Compile `openapi`, resolving component references against
    /// `definitions`.
    ///
    /// # Errors
    ///
    /// Returns `InitError::Compile` if the converted schema is rejected.
    pub fn with_definitions(
        openapi: &Value,
        definitions: &Map<String, Value>,
        target: PayloadTarget,
    ) -> Result<Self, InitError> {
        let schema = to_json_schema(openapi, definitions);
        let validator = jsonschema::validator_for(&schema).map_err(|e| InitError::Compile {
            target,
            message: format!("{e}"),
        })?;
        Ok(Self { schema, validator })
    }

    /// Compile the reflected schema of `shape`.
    ///
    /// Every model reachable from `shape` is registered as a definition so
    /// that cyclic back-references resolve.
    ///
    /// # Errors
    ///
    /// Returns `InitError::Compile` if the converted schema is rejected.
    pub fn for_shape(shape: &TypeShape, target: PayloadTarget) -> Result<Self, InitError> {
        let reflector = Reflector::new();
        let root = reflector.reflect(shape.clone(), Attributes::new()).to_value();

        let mut registry = ComponentRegistry::with_reflector(reflector);
        collect_models(shape, &mut registry);
        let definitions = match registry.to_components() {
            Value::Object(mut components) => match components.remove("schemas") {
                Some(Value::Object(schemas)) => schemas,
                _ => Map::new(),
            },
            _ => Map::new(),
        };

        Self::with_definitions(&root, &definitions, target)
    }

    /// The converted JSON Schema.
    #[must_use]
    pub const fn schema(&self) -> &Value {
        &self.schema
    }

    #[must_use]
    pub fn is_valid(&self, instance: &Value) -> bool {
        self.validator.is_valid(instance)
    }

    /// Per-field error messages; empty when `instance` is valid.
    ///
    /// Errors are keyed by the first segment of the failing instance path.
    /// A required property missing from the root object is keyed by its own
    /// name; other root-level errors go under `__root__`. The first message
    /// per key wins.
    #[must_use]
    pub fn errors(&self, instance: &Value) -> IndexMap<String, String> {
        let mut detail = IndexMap::new();
        for error in self.validator.iter_errors(instance) {
            let path = error.instance_path.to_string();
            let key = match &error.kind {
                ValidationErrorKind::Required { property } if path.is_empty() => property
                    .as_str()
                    .map_or_else(|| property.to_string(), str::to_string),
                _ => first_segment(&path),
            };
            detail.entry(key).or_insert_with(|| format!("{error}"));
        }
        detail
    }

    /// # Errors
    ///
    /// Returns the [`ValidationFailure`] for `target` if `instance` is invalid.
    pub fn validate(
        &self,
        instance: &Value,
        target: PayloadTarget,
    ) -> Result<(), ValidationFailure> {
        let detail = self.errors(instance);
        if detail.is_empty() {
            Ok(())
        } else {
            tracing::debug!(%target, fields = detail.len(), "payload rejected");
            Err(ValidationFailure::new(target, detail))
        }
    }
}

impl fmt::Debug for SchemaValidator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SchemaValidator")
            .field("schema", &self.schema)
            .finish_non_exhaustive()
    }
}

/// First JSON-pointer segment of `pointer`, unescaped.
fn first_segment(pointer: &str) -> String {
    pointer
        .split('/')
        .find(|segment| !segment.is_empty())
        .map_or_else(
            || ROOT_KEY.to_string(),
            |segment| segment.replace("~1", "/").replace("~0", "~"),
        )
}

fn collect_models(shape: &TypeShape, registry: &mut ComponentRegistry) {
    match shape {
        TypeShape::Model(model) => {
            if registry.contains(model.name()) {
                return;
            }
            registry.register_as(model.name(), model.clone());
            for field in model.discover_fields().values() {
                collect_models(&field.shape, registry);
            }
        }
        TypeShape::Union(branches) => {
            for branch in branches {
                collect_models(branch, registry);
            }
        }
        TypeShape::List(item) => collect_models(item, registry),
        TypeShape::Map(_, value) => collect_models(value, registry),
        _ => {}
    }
}

/// One configured part of the request.
#[derive(Debug)]
struct Target {
    kind: PayloadTarget,
    shape: TypeShape,
    validator: SchemaValidator,
    coerce: bool,
}

impl Target {
    fn compile(kind: PayloadTarget, shape: TypeShape, coerce: bool) -> Result<Self, InitError> {
        let validator = SchemaValidator::for_shape(&shape, kind)?;
        Ok(Self {
            kind,
            shape,
            validator,
            coerce,
        })
    }

    fn check(&self, request: &RequestPayload) -> Result<Value, ValidationFailure> {
        let data = match self.kind {
            PayloadTarget::Json => request.json.clone().unwrap_or(Value::Null),
            PayloadTarget::Form => clean_data(&self.shape, &request.form, self.coerce),
            PayloadTarget::Query => clean_data(&self.shape, &request.query, self.coerce),
        };
        self.validator.validate(&data, self.kind)?;
        Ok(data)
    }
}

/// Builder for a [`PayloadValidator`].
#[derive(Debug, Clone)]
pub struct ValidatorBuilder {
    json: Option<TypeShape>,
    form: Option<TypeShape>,
    query: Option<TypeShape>,
    body_argument: String,
    query_argument: String,
    coerce_form: bool,
    coerce_query: bool,
}

impl Default for ValidatorBuilder {
    fn default() -> Self {
        Self::from_config(&ValidationConfig::default())
    }
}

impl ValidatorBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder seeded with configured argument names and coercion flags.
    #[must_use]
    pub fn from_config(config: &ValidationConfig) -> Self {
        Self {
            json: None,
            form: None,
            query: None,
            body_argument: config.body_argument.clone(),
            query_argument: config.query_argument.clone(),
            coerce_form: config.coerce_form,
            coerce_query: config.coerce_query,
        }
    }

    /// Validate the JSON body against `shape`.
    #[must_use]
    pub fn json(mut self, shape: impl Into<TypeShape>) -> Self {
        self.json = Some(shape.into());
        self
    }

    /// Validate the form body against `shape`.
    #[must_use]
    pub fn form(mut self, shape: impl Into<TypeShape>) -> Self {
        self.form = Some(shape.into());
        self
    }

    /// Validate the query string against `shape`.
    #[must_use]
    pub fn query(mut self, shape: impl Into<TypeShape>) -> Self {
        self.query = Some(shape.into());
        self
    }

    #[must_use]
    pub fn body_argument(mut self, name: impl Into<String>) -> Self {
        self.body_argument = name.into();
        self
    }

    #[must_use]
    pub fn query_argument(mut self, name: impl Into<String>) -> Self {
        self.query_argument = name.into();
        self
    }

    #[must_use]
    pub const fn coerce_form(mut self, coerce: bool) -> Self {
        self.coerce_form = coerce;
        self
    }

    #[must_use]
    pub const fn coerce_query(mut self, coerce: bool) -> Self {
        self.coerce_query = coerce;
        self
    }

    /// Compile every configured target.
    ///
    /// # Errors
    ///
    /// Returns `InitError::ConflictingBodyTargets` if both `json` and `form`
    /// are set, or `InitError::Compile` if a schema does not compile.
    pub fn build(self) -> Result<PayloadValidator, InitError> {
        let body = match (self.json, self.form) {
            (Some(_), Some(_)) => return Err(InitError::ConflictingBodyTargets),
            (Some(shape), None) => Some(Target::compile(PayloadTarget::Json, shape, false)?),
            (None, Some(shape)) => Some(Target::compile(
                PayloadTarget::Form,
                shape,
                self.coerce_form,
            )?),
            (None, None) => None,
        };
        let query = self
            .query
            .map(|shape| Target::compile(PayloadTarget::Query, shape, self.coerce_query))
            .transpose()?;

        Ok(PayloadValidator {
            body,
            query,
            body_argument: self.body_argument,
            query_argument: self.query_argument,
        })
    }
}

/// Request data handed to [`PayloadValidator::validate`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RequestPayload {
    /// Parsed JSON body, if the request carried one.
    pub json: Option<Value>,
    pub form: FormData,
    pub query: FormData,
}

impl RequestPayload {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_json(mut self, body: Value) -> Self {
        self.json = Some(body);
        self
    }

    #[must_use]
    pub fn with_form(mut self, form: FormData) -> Self {
        self.form = form;
        self
    }

    #[must_use]
    pub fn with_query(mut self, query: FormData) -> Self {
        self.query = query;
        self
    }
}

/// Validates the body and query of a request against compiled schemas.
#[derive(Debug)]
pub struct PayloadValidator {
    body: Option<Target>,
    query: Option<Target>,
    body_argument: String,
    query_argument: String,
}

impl PayloadValidator {
    /// Validate the body target, then the query target.
    ///
    /// # Errors
    ///
    /// Returns the first target's [`ValidationFailure`].
    pub fn validate(&self, request: &RequestPayload) -> Result<Validated, ValidationFailure> {
        let mut validated = Validated::default();

        if let Some(body) = &self.body {
            let value = body.check(request)?;
            validated.push(&self.body_argument, body.kind, value);
        }
        if let Some(query) = &self.query {
            let value = query.check(request)?;
            validated.push(&self.query_argument, query.kind, value);
        }

        Ok(validated)
    }

    /// Target validating the request body, if any.
    #[must_use]
    pub fn body_target(&self) -> Option<PayloadTarget> {
        self.body.as_ref().map(|target| target.kind)
    }

    #[must_use]
    pub const fn has_query(&self) -> bool {
        self.query.is_some()
    }
}

/// Validated payloads bound to their argument names.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Validated {
    arguments: Vec<(String, PayloadTarget, Value)>,
}

impl Validated {
    fn push(&mut self, argument: &str, target: PayloadTarget, value: Value) {
        self.arguments.push((argument.to_string(), target, value));
    }

    #[must_use]
    pub fn get(&self, argument: &str) -> Option<&Value> {
        self.arguments
            .iter()
            .find(|(name, _, _)| name == argument)
            .map(|(_, _, value)| value)
    }

    /// `(argument, value)` pairs in validation order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.arguments
            .iter()
            .map(|(name, _, value)| (name.as_str(), value))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.arguments.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.arguments.is_empty()
    }

    /// Deserialize the value bound to `argument`.
    ///
    /// # Errors
    ///
    /// A missing argument is reported under `__root__`; a deserialization
    /// error under the first segment of its path.
    pub fn extract<T: DeserializeOwned>(&self, argument: &str) -> Result<T, ValidationFailure> {
        let Some((_, target, value)) = self
            .arguments
            .iter()
            .find(|(name, _, _)| name == argument)
        else {
            return Err(ValidationFailure::single(
                PayloadTarget::Json,
                ROOT_KEY,
                format!("no validated payload bound to '{argument}'"),
            ));
        };

        serde_path_to_error::deserialize::<_, T>(value).map_err(|err| {
            let field = match err.path().iter().next() {
                Some(serde_path_to_error::Segment::Map { key }) => key.clone(),
                Some(serde_path_to_error::Segment::Seq { index }) => index.to_string(),
                _ => ROOT_KEY.to_string(),
            };
            ValidationFailure::single(*target, field, err.into_inner().to_string())
        })
    }
}
