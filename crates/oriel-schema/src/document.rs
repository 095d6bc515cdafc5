//! OpenAPI document shell around the registered components.

use serde_json::{Value, json};

use crate::registry::ComponentRegistry;

/// OpenAPI version written when none is configured.
pub const DEFAULT_OPENAPI_VERSION: &str = "3.0.3";

/// The document's `info` object plus the OpenAPI version to declare.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Info {
    pub title: String,
    pub version: String,
    pub description: Option<String>,
    pub openapi_version: String,
}

impl Info {
    #[must_use]
    pub fn new(title: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            version: version.into(),
            description: None,
            openapi_version: DEFAULT_OPENAPI_VERSION.to_string(),
        }
    }

    /// Set the description. An empty string clears it.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        let description = description.into();
        self.description = (!description.is_empty()).then_some(description);
        self
    }

    #[must_use]
    pub fn with_openapi_version(mut self, version: impl Into<String>) -> Self {
        self.openapi_version = version.into();
        self
    }
}

impl Default for Info {
    fn default() -> Self {
        Self::new("API", "1.0.0")
    }
}

/// Full document: `openapi`, `info`, empty `paths`, and `components`.
#[must_use]
pub fn build_document(info: &Info, registry: &ComponentRegistry) -> Value {
    let mut info_object = serde_json::Map::new();
    info_object.insert("title".to_string(), Value::from(info.title.as_str()));
    info_object.insert("version".to_string(), Value::from(info.version.as_str()));
    if let Some(description) = &info.description {
        info_object.insert("description".to_string(), Value::from(description.as_str()));
    }

    json!({
        "openapi": info.openapi_version,
        "info": info_object,
        "paths": {},
        "components": registry.to_components(),
    })
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::shape::TypeShape;

    #[test]
    fn empty_registry_still_has_components() {
        let document = build_document(&Info::default(), &ComponentRegistry::new());
        assert_eq!(
            document,
            json!({
                "openapi": "3.0.3",
                "info": {"title": "API", "version": "1.0.0"},
                "paths": {},
                "components": {"schemas": {}}
            })
        );
    }

    #[test]
    fn info_and_components_are_rendered() {
        let mut registry = ComponentRegistry::new();
        registry.register_as("Flag", TypeShape::Bool);
        let info = Info::new("Pets", "2.1.0")
            .with_description("Pet store")
            .with_openapi_version("3.0.0");

        let document = build_document(&info, &registry);
        assert_eq!(document["openapi"], "3.0.0");
        assert_eq!(
            document["info"],
            json!({"title": "Pets", "version": "2.1.0", "description": "Pet store"})
        );
        assert_eq!(document["components"]["schemas"]["Flag"], json!({"type": "boolean"}));
    }

    #[test]
    fn empty_description_is_omitted() {
        let info = Info::default().with_description("");
        assert_eq!(info.description, None);
    }
}
