//! # oriel-config
//!
//! Layered configuration loading for Oriel using figment.
//!
//! Configuration sources (in priority order, highest wins):
//! 1. Environment variables (`ORIEL_*` prefix, `__` as separator)
//! 2. Project-level `.oriel/config.toml`
//! 3. User-level `~/.config/oriel/config.toml`
//! 4. Built-in defaults
//!
//! # Environment Variable Mapping
//!
//! Figment maps `ORIEL_OPENAPI__TITLE` -> `openapi.title`,
//! `ORIEL_VALIDATION__COERCE_QUERY` -> `validation.coerce_query`, etc.
//!
//! # Usage
//!
//! ```no_run
//! use oriel_config::OrielConfig;
//!
//! let config = OrielConfig::load_with_dotenv().expect("config");
//! println!("documenting {} v{}", config.openapi.title, config.openapi.version);
//! ```

mod error;
mod openapi;
mod validation;

pub use error::ConfigError;
pub use openapi::OpenApiConfig;
pub use validation::ValidationConfig;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Prefix of environment variables read by [`OrielConfig::figment`].
pub const ENV_PREFIX: &str = "ORIEL_";

/// Project-local config file, relative to the working directory.
pub const LOCAL_CONFIG_PATH: &str = ".oriel/config.toml";

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct OrielConfig {
    #[serde(default)]
    pub openapi: OpenApiConfig,
    #[serde(default)]
    pub validation: ValidationConfig,
}

impl OrielConfig {
    /// Load and validate configuration from TOML files and environment
    /// variables.
    ///
    /// Does NOT call `dotenvy`; use [`Self::load_with_dotenv`] for `.env` support.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Figment` when a source fails to parse or
    /// extract, and `ConfigError::InvalidValue` when [`Self::validate`] fails.
    pub fn load() -> Result<Self, ConfigError> {
        let config: Self = Self::figment().extract()?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration after reading the workspace `.env` file.
    ///
    /// # Errors
    ///
    /// Same as [`Self::load`].
    pub fn load_with_dotenv() -> Result<Self, ConfigError> {
        Self::load_dotenv_from_workspace();
        Self::load()
    }

    /// Build the figment provider chain.
    ///
    /// Public so tests can inspect the figment directly or add providers on
    /// top.
    #[must_use]
    pub fn figment() -> Figment {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        if let Some(global_path) = Self::global_config_path() {
            if global_path.exists() {
                figment = figment.merge(Toml::file(global_path));
            }
        }

        let local_path = PathBuf::from(LOCAL_CONFIG_PATH);
        if local_path.exists() {
            figment = figment.merge(Toml::file(local_path));
        }

        figment.merge(Env::prefixed(ENV_PREFIX).split("__"))
    }

    /// Reject values the document builder and validators cannot work with.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` naming the first offending field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let required = [
            ("openapi.title", &self.openapi.title),
            ("openapi.version", &self.openapi.version),
            ("validation.body_argument", &self.validation.body_argument),
            ("validation.query_argument", &self.validation.query_argument),
        ];
        for (field, value) in required {
            if value.trim().is_empty() {
                tracing::warn!(field, "rejecting empty configuration value");
                return Err(ConfigError::invalid(field, "must not be empty"));
            }
        }

        if self.validation.body_argument == self.validation.query_argument {
            tracing::warn!(
                argument = %self.validation.body_argument,
                "body and query arguments share a name"
            );
            return Err(ConfigError::invalid(
                "validation.query_argument",
                format!("must differ from body_argument '{}'", self.validation.body_argument),
            ));
        }
        Ok(())
    }

    /// Path to the user-global config file.
    #[must_use]
    pub fn global_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("oriel").join("config.toml"))
    }

    /// Load `.env` from the workspace root.
    ///
    /// Walks up from `CARGO_MANIFEST_DIR` (if set) looking for a `.env`
    /// file, then falls back to the current directory. Silently does nothing
    /// if none is found.
    fn load_dotenv_from_workspace() {
        if let Ok(manifest_dir) = std::env::var("CARGO_MANIFEST_DIR") {
            let mut dir = PathBuf::from(manifest_dir);
            // crate -> crates/ -> workspace
            for _ in 0..3 {
                let env_path = dir.join(".env");
                if env_path.exists() {
                    let _ = dotenvy::from_path(&env_path);
                    return;
                }
                if !dir.pop() {
                    break;
                }
            }
        }

        let _ = dotenvy::dotenv();
    }
}
