use std::process::ExitCode;

use oriel_config::{OrielConfig, ValidationConfig};
use oriel_schema::shape_from_json_schema;
use oriel_validate::{FormData, PayloadTarget, SchemaValidator, ValidationFailure, clean_data};
use serde_json::{Value, json};

use crate::cli::GlobalFlags;
use crate::cli::root_commands::{PayloadKind, ValidateArgs};
use crate::commands::{read_json, read_text};
use crate::output::output;

/// Handle `oriel validate`.
///
/// Prints the validated payload on success. On failure prints the 400 body
/// and exits non-zero.
pub fn handle(
    args: &ValidateArgs,
    config: &OrielConfig,
    flags: &GlobalFlags,
) -> anyhow::Result<ExitCode> {
    let schema = read_json(&args.schema)?;
    let payload = match args.kind {
        PayloadKind::Json => Payload::Json(read_json(&args.payload)?),
        PayloadKind::Form => Payload::Form(FormData::parse(read_text(&args.payload)?.trim())),
        PayloadKind::Query => Payload::Query(FormData::parse(
            read_text(&args.payload)?.trim().trim_start_matches('?'),
        )),
    };

    match check(&schema, payload, &config.validation)? {
        Ok(validated) => {
            output(&validated, flags.format)?;
            Ok(ExitCode::SUCCESS)
        }
        Err(failure) => {
            tracing::info!(
                target_kind = %failure.target,
                fields = failure.detail.len(),
                "payload rejected"
            );
            output(&json!({"status": failure.status(), "body": failure.to_body()}), flags.format)?;
            Ok(ExitCode::FAILURE)
        }
    }
}

pub(crate) enum Payload {
    Json(Value),
    Form(FormData),
    Query(FormData),
}

/// Validate one payload. The outer error covers schemas that do not compile.
pub(crate) fn check(
    schema: &Value,
    payload: Payload,
    config: &ValidationConfig,
) -> anyhow::Result<Result<Value, ValidationFailure>> {
    let validator = SchemaValidator::from_openapi(schema)?;
    let (target, instance) = match payload {
        Payload::Json(body) => (PayloadTarget::Json, body),
        Payload::Form(data) => (
            PayloadTarget::Form,
            clean_data(&shape_from_json_schema(schema), &data, config.coerce_form),
        ),
        Payload::Query(data) => (
            PayloadTarget::Query,
            clean_data(&shape_from_json_schema(schema), &data, config.coerce_query),
        ),
    };
    Ok(validator.validate(&instance, target).map(|()| instance))
}

#[cfg(test)]
mod tests {
    use oriel_config::ValidationConfig;
    use oriel_validate::FormData;
    use pretty_assertions::assert_eq;
    use serde_json::{Value, json};

    use super::{Payload, check};

    fn pet_schema() -> Value {
        json!({
            "type": "object",
            "properties": {
                "name": {"type": "string"},
                "age": {"type": "integer", "format": "int32"},
                "tags": {"type": "array", "items": {"type": "string"}, "nullable": true}
            }
        })
    }

    #[test]
    fn json_payload_passes() {
        let outcome = check(
            &pet_schema(),
            Payload::Json(json!({"name": "rex", "age": 3})),
            &ValidationConfig::default(),
        )
        .expect("schema should compile");
        assert_eq!(outcome, Ok(json!({"name": "rex", "age": 3})));
    }

    #[test]
    fn json_payload_reports_missing_field() {
        let failure = check(
            &pet_schema(),
            Payload::Json(json!({"name": "rex"})),
            &ValidationConfig::default(),
        )
        .expect("schema should compile")
        .expect_err("age is required");
        assert_eq!(failure.detail.keys().collect::<Vec<_>>(), vec!["age"]);
    }

    #[test]
    fn query_payload_is_coerced_by_default() {
        let outcome = check(
            &pet_schema(),
            Payload::Query(FormData::parse("name=rex&age=3&tags=a&tags=b")),
            &ValidationConfig::default(),
        )
        .expect("schema should compile");
        assert_eq!(outcome, Ok(json!({"name": "rex", "age": 3, "tags": ["a", "b"]})));
    }

    #[test]
    fn form_payload_stays_textual_without_coercion() {
        let failure = check(
            &pet_schema(),
            Payload::Form(FormData::parse("name=rex&age=3")),
            &ValidationConfig::default(),
        )
        .expect("schema should compile")
        .expect_err("age arrives as a string");
        assert!(failure.detail.contains_key("age"));
        assert_eq!(failure.status(), 400);
    }
}
