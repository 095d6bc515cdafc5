//! Schema registry error types.

use thiserror::Error;

/// Errors from the component registry.
///
/// Reflection itself is infallible; these only surface when a caller asks the
/// registry for something it cannot name or find.
#[derive(Debug, Error)]
pub enum SchemaError {
    /// Requested component name was not found in the registry.
    #[error("Schema not found: {0}")]
    NotFound(String),

    /// The reflected shape carries no model or enum name to register under.
    #[error("Cannot register anonymous shape '{shape}' without an explicit name")]
    Anonymous {
        /// Short description of the offending shape.
        shape: String,
    },
}
