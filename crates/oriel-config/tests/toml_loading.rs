//! Integration tests for TOML configuration loading.
//!
//! Uses figment::Jail for sandboxed files and env vars.

use figment::{
    Figment, Jail,
    providers::{Env, Format, Serialized, Toml},
};
use oriel_config::{LOCAL_CONFIG_PATH, OrielConfig};

#[test]
fn loads_openapi_section_from_toml() {
    Jail::expect_with(|jail| {
        jail.create_file(
            "config.toml",
            r#"
[openapi]
title = "Pet Store"
version = "2.0.0"
description = "Pets and their owners"
"#,
        )?;

        let config: OrielConfig = Figment::from(Serialized::defaults(OrielConfig::default()))
            .merge(Toml::file("config.toml"))
            .extract()?;

        assert_eq!(config.openapi.title, "Pet Store");
        assert_eq!(config.openapi.version, "2.0.0");
        assert_eq!(config.openapi.description, "Pets and their owners");
        assert_eq!(config.openapi.openapi_version, "3.0.3");
        Ok(())
    });
}

#[test]
fn loads_validation_section_from_toml() {
    Jail::expect_with(|jail| {
        jail.create_file(
            "config.toml",
            r#"
[validation]
body_argument = "payload"
coerce_form = true
"#,
        )?;

        let config: OrielConfig = Figment::from(Serialized::defaults(OrielConfig::default()))
            .merge(Toml::file("config.toml"))
            .extract()?;

        assert_eq!(config.validation.body_argument, "payload");
        assert_eq!(config.validation.query_argument, "query");
        assert!(config.validation.coerce_form);
        assert!(config.validation.coerce_query);
        Ok(())
    });
}

#[test]
fn env_overrides_toml() {
    Jail::expect_with(|jail| {
        jail.create_file(
            "config.toml",
            r#"
[openapi]
title = "from-toml"
version = "1.2.3"
"#,
        )?;
        jail.set_env("ORIEL_OPENAPI__TITLE", "from-env");

        let config: OrielConfig = Figment::from(Serialized::defaults(OrielConfig::default()))
            .merge(Toml::file("config.toml"))
            .merge(Env::prefixed("ORIEL_").split("__"))
            .extract()?;

        assert_eq!(config.openapi.title, "from-env");
        assert_eq!(config.openapi.version, "1.2.3");
        Ok(())
    });
}

#[test]
fn project_local_file_is_picked_up() {
    Jail::expect_with(|jail| {
        jail.create_dir(".oriel")?;
        jail.create_file(
            LOCAL_CONFIG_PATH,
            r#"
[openapi]
title = "Local Project"
"#,
        )?;

        let config = OrielConfig::load().map_err(|e| e.to_string())?;
        assert_eq!(config.openapi.title, "Local Project");
        Ok(())
    });
}

#[test]
fn malformed_toml_is_a_figment_error() {
    Jail::expect_with(|jail| {
        jail.create_dir(".oriel")?;
        jail.create_file(LOCAL_CONFIG_PATH, "[openapi\ntitle = ")?;

        let result = OrielConfig::load();
        assert!(matches!(result, Err(oriel_config::ConfigError::Figment(_))));
        Ok(())
    });
}
