use std::path::Path;
use std::process::ExitCode;

use anyhow::Context;
use oriel_config::OrielConfig;
use oriel_schema::{ComponentRegistry, Info, Sample, build_document};

use crate::cli::GlobalFlags;
use crate::cli::root_commands::DocumentArgs;
use crate::commands::read_json;
use crate::output::output;

/// Handle `oriel document`.
pub fn handle(
    args: &DocumentArgs,
    config: &OrielConfig,
    flags: &GlobalFlags,
) -> anyhow::Result<ExitCode> {
    let registry = collect_components(&args.files)?;
    let info = document_info(config, args.title.as_deref(), args.api_version.as_deref());
    let document = build_document(&info, &registry);
    tracing::debug!(components = registry.len(), "assembled openapi document");
    output(&document, flags.format)?;
    Ok(ExitCode::SUCCESS)
}

fn component_name(path: &Path) -> anyhow::Result<String> {
    path.file_stem()
        .and_then(|stem| stem.to_str())
        .filter(|stem| !stem.is_empty())
        .map(str::to_string)
        .with_context(|| format!("cannot derive a component name from {}", path.display()))
}

pub(crate) fn document_info(
    config: &OrielConfig,
    title: Option<&str>,
    version: Option<&str>,
) -> Info {
    let openapi = &config.openapi;
    Info::new(
        title.unwrap_or(&openapi.title),
        version.unwrap_or(&openapi.version),
    )
    .with_description(openapi.description.as_str())
    .with_openapi_version(openapi.openapi_version.as_str())
}

/// Register one component per example file, named after the file stem.
pub(crate) fn collect_components(paths: &[impl AsRef<Path>]) -> anyhow::Result<ComponentRegistry> {
    let mut registry = ComponentRegistry::new();
    for path in paths {
        let path = path.as_ref();
        let name = component_name(path)?;
        let example = read_json(path)?;
        if registry.contains(&name) {
            tracing::warn!(
                component = %name,
                file = %path.display(),
                "duplicate component name; keeping the first"
            );
        }
        registry.register_as(name, Sample::from(example));
    }
    Ok(registry)
}

#[cfg(test)]
mod tests {
    use std::fs;

    use oriel_config::OrielConfig;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use oriel_schema::build_document;

    use super::{collect_components, component_name, document_info};

    #[test]
    fn components_are_named_after_file_stems() {
        let dir = tempfile::tempdir().expect("tempdir should be created");
        let pet = dir.path().join("Pet.json");
        let owner = dir.path().join("Owner.json");
        fs::write(&pet, r#"{"name": "rex"}"#).expect("pet example should write");
        fs::write(&owner, r#"{"email": "a@b.c"}"#).expect("owner example should write");

        let info = document_info(&OrielConfig::default(), Some("Pets"), None);
        let registry = collect_components(&[pet, owner]).expect("components should collect");
        let document = build_document(&info, &registry);

        assert_eq!(document["openapi"], json!("3.0.3"));
        assert_eq!(document["info"], json!({"title": "Pets", "version": "1.0.0"}));
        assert_eq!(document["paths"], json!({}));
        let schemas = document["components"]["schemas"]
            .as_object()
            .expect("schemas should be an object");
        assert_eq!(schemas.keys().collect::<Vec<_>>(), vec!["Pet", "Owner"]);
        assert_eq!(
            schemas["Pet"]["properties"]["name"],
            json!({"type": "string", "default": "rex"})
        );
    }

    #[test]
    fn config_supplies_info_fields() {
        let mut config = OrielConfig::default();
        config.openapi.description = "Pet store".to_string();
        config.openapi.openapi_version = "3.0.0".to_string();

        let info = document_info(&config, None, Some("2.1.0"));
        assert_eq!(info.title, "API");
        assert_eq!(info.version, "2.1.0");
        assert_eq!(info.description.as_deref(), Some("Pet store"));
        assert_eq!(info.openapi_version, "3.0.0");
    }

    #[test]
    fn invalid_json_reports_the_file() {
        let dir = tempfile::tempdir().expect("tempdir should be created");
        let broken = dir.path().join("Broken.json");
        fs::write(&broken, "{not json").expect("file should write");

        let error = collect_components(&[&broken]).expect_err("invalid json should fail");
        assert!(format!("{error:#}").contains("Broken.json"));
    }

    #[test]
    fn duplicate_stems_keep_the_first_example() {
        let dir = tempfile::tempdir().expect("tempdir should be created");
        fs::create_dir(dir.path().join("v2")).expect("subdir should be created");
        let first = dir.path().join("Pet.json");
        let second = dir.path().join("v2").join("Pet.json");
        fs::write(&first, r#"{"name": "rex"}"#).expect("first example should write");
        fs::write(&second, r#"{"id": 1}"#).expect("second example should write");

        let registry = collect_components(&[first, second]).expect("components should collect");
        assert_eq!(registry.len(), 1);
        let pet = registry.get("Pet").expect("Pet should be registered").to_value();
        assert!(pet["properties"].get("name").is_some());
    }

    #[test]
    fn stemless_paths_are_rejected() {
        assert!(component_name(std::path::Path::new("/")).is_err());
    }
}
