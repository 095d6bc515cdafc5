//! Document-level settings written into the generated OpenAPI `info` block.

use serde::{Deserialize, Serialize};

fn default_title() -> String {
    "API".to_string()
}

fn default_version() -> String {
    "1.0.0".to_string()
}

fn default_openapi_version() -> String {
    "3.0.3".to_string()
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct OpenApiConfig {
    /// `info.title` of the generated document.
    #[serde(default = "default_title")]
    pub title: String,

    /// `info.version` of the generated document.
    #[serde(default = "default_version")]
    pub version: String,

    /// `info.description`; omitted from the document when empty.
    #[serde(default)]
    pub description: String,

    /// Value of the top-level `openapi` key.
    #[serde(default = "default_openapi_version")]
    pub openapi_version: String,
}

impl Default for OpenApiConfig {
    fn default() -> Self {
        Self {
            title: default_title(),
            version: default_version(),
            description: String::new(),
            openapi_version: default_openapi_version(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_correct() {
        let config = OpenApiConfig::default();
        assert_eq!(config.title, "API");
        assert_eq!(config.version, "1.0.0");
        assert!(config.description.is_empty());
        assert_eq!(config.openapi_version, "3.0.3");
    }
}
