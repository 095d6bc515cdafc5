//! Validation error types.

use std::fmt;

use indexmap::IndexMap;
use serde_json::{Value, json};
use thiserror::Error;

/// Detail key for errors that do not belong to a single field.
pub const ROOT_KEY: &str = "__root__";

/// Errors raised while configuring a validator.
#[derive(Debug, Error)]
pub enum InitError {
    /// A request body can be read as JSON or as a form, not both.
    #[error("json and form validation cannot be combined on one endpoint")]
    ConflictingBodyTargets,

    /// The converted schema was rejected by the JSON Schema compiler.
    #[error("Failed to compile {target} schema: {message}")]
    Compile { target: PayloadTarget, message: String },
}

/// Which part of the request a validator reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PayloadTarget {
    Json,
    Form,
    Query,
}

impl PayloadTarget {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Json => "json",
            Self::Form => "form",
            Self::Query => "query",
        }
    }
}

impl fmt::Display for PayloadTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A rejected payload: one message per offending field.
///
/// Maps onto an HTTP 400 response whose body is `{"detail": {...}}`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{target} payload failed validation ({} field(s))", .detail.len())]
pub struct ValidationFailure {
    pub target: PayloadTarget,
    pub detail: IndexMap<String, String>,
}

impl ValidationFailure {
    #[must_use]
    pub const fn new(target: PayloadTarget, detail: IndexMap<String, String>) -> Self {
        Self { target, detail }
    }

    /// Failure with a single detail entry.
    #[must_use]
    pub fn single(
        target: PayloadTarget,
        field: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        let mut detail = IndexMap::new();
        detail.insert(field.into(), message.into());
        Self { target, detail }
    }

    /// HTTP status for the response.
    #[must_use]
    pub const fn status(&self) -> u16 {
        400
    }

    /// Response body.
    #[must_use]
    pub fn to_body(&self) -> Value {
        json!({ "detail": self.detail })
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn failure_renders_detail_body() {
        let failure =
            ValidationFailure::single(PayloadTarget::Form, "age", "'x' is not of type 'integer'");
        assert_eq!(failure.status(), 400);
        assert_eq!(
            failure.to_body(),
            json!({"detail": {"age": "'x' is not of type 'integer'"}})
        );
        assert_eq!(failure.to_string(), "form payload failed validation (1 field(s))");
    }
}
