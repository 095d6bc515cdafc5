//! Request payload validation settings.

use serde::{Deserialize, Serialize};

fn default_body_argument() -> String {
    "body".to_string()
}

fn default_query_argument() -> String {
    "query".to_string()
}

const fn default_coerce_query() -> bool {
    true
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct ValidationConfig {
    /// Argument name the validated JSON or form body is bound to.
    #[serde(default = "default_body_argument")]
    pub body_argument: String,

    /// Argument name the validated query parameters are bound to.
    #[serde(default = "default_query_argument")]
    pub query_argument: String,

    /// Coerce query-string values to the field's scalar type before validating.
    #[serde(default = "default_coerce_query")]
    pub coerce_query: bool,

    /// Coerce form values to the field's scalar type before validating.
    #[serde(default)]
    pub coerce_form: bool,
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            body_argument: default_body_argument(),
            query_argument: default_query_argument(),
            coerce_query: default_coerce_query(),
            coerce_form: false,
        }
    }
}
