use std::fs;
use std::path::Path;
use std::process::ExitCode;

use anyhow::Context;
use oriel_config::OrielConfig;
use serde_json::Value;

use crate::cli::{Commands, GlobalFlags};

pub mod config;
pub mod document;
pub mod reflect;
pub mod validate;

/// Route a parsed command to its handler.
pub fn dispatch(
    command: &Commands,
    config: &OrielConfig,
    flags: &GlobalFlags,
) -> anyhow::Result<ExitCode> {
    match command {
        Commands::Reflect(args) => reflect::handle(args, flags),
        Commands::Document(args) => document::handle(args, config, flags),
        Commands::Validate(args) => validate::handle(args, config, flags),
        Commands::Config => config::handle(config, flags),
    }
}

pub(crate) fn read_text(path: &Path) -> anyhow::Result<String> {
    fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))
}

pub(crate) fn read_json(path: &Path) -> anyhow::Result<Value> {
    let text = read_text(path)?;
    serde_json::from_str(&text).with_context(|| format!("{} is not valid JSON", path.display()))
}
