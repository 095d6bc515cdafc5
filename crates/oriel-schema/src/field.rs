//! Field metadata extraction.
//!
//! Model frameworks attach documentation metadata to their field
//! declarations. [`extract`] flattens it into node attributes: the
//! description, every `extra` entry merged by key, and `default_value`
//! renamed to `default`. A truthy `disable_doc` entry hides the field from
//! the generated document.

use std::fmt;

use serde_json::{Map, Value};

use crate::schema::{Attributes, is_truthy};

/// Extra key that hides a field from the generated document.
pub const DISABLE_DOC: &str = "disable_doc";

/// Extra key carrying a field's documented default.
pub const DEFAULT_VALUE: &str = "default_value";

/// Read-only view of a framework's per-field metadata object.
///
/// Both accessors are optional; an implementation that exposes neither
/// yields an empty extraction.
pub trait FieldMetadata: fmt::Debug + Send + Sync {
    fn description(&self) -> Option<&str> {
        None
    }

    fn extra(&self) -> Option<&Map<String, Value>> {
        None
    }
}

/// Native field metadata declaration.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FieldInfo {
    pub description: Option<String>,
    pub extra: Map<String, Value>,
}

impl FieldInfo {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Add an arbitrary extra entry (e.g. `example`, `x-internal`).
    #[must_use]
    pub fn with_extra(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.extra.insert(key.into(), value.into());
        self
    }

    /// Documented default value.
    #[must_use]
    pub fn default_value(self, value: impl Into<Value>) -> Self {
        self.with_extra(DEFAULT_VALUE, value)
    }

    /// Exclude the field from generated documents.
    #[must_use]
    pub fn hidden(self) -> Self {
        self.with_extra(DISABLE_DOC, true)
    }
}

impl FieldMetadata for FieldInfo {
    fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    fn extra(&self) -> Option<&Map<String, Value>> {
        Some(&self.extra)
    }
}

/// Untyped metadata: an object with optional `description` and `extra` keys.
impl FieldMetadata for Value {
    fn description(&self) -> Option<&str> {
        self.get("description").and_then(Self::as_str)
    }

    fn extra(&self) -> Option<&Map<String, Value>> {
        self.get("extra").and_then(Self::as_object)
    }
}

/// Result of [`extract`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExtractedField {
    /// Overrides to apply to the field's reflected node.
    pub attributes: Attributes,
    /// The field must not appear in the generated document.
    pub hidden: bool,
}

/// Flatten `metadata` into node attributes.
#[must_use]
pub fn extract(metadata: &dyn FieldMetadata) -> ExtractedField {
    let mut attributes = Attributes::new();

    if let Some(description) = metadata.description().filter(|text| !text.is_empty()) {
        attributes.insert("description", description);
    }

    if let Some(extra) = metadata.extra() {
        for (key, value) in extra {
            attributes.insert(key.clone(), value.clone());
        }
    }

    if let Some(default) = attributes.remove(DEFAULT_VALUE) {
        attributes.insert("default", default);
    }

    let hidden = attributes
        .remove(DISABLE_DOC)
        .and_then(|flag| flag.as_json().map(is_truthy))
        .unwrap_or(false);

    ExtractedField { attributes, hidden }
}
