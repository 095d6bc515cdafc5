use std::process::ExitCode;

use oriel_schema::{Attributes, Sample, Schema, reflect};

use crate::cli::GlobalFlags;
use crate::cli::root_commands::ReflectArgs;
use crate::commands::read_json;
use crate::output::output;

/// Handle `oriel reflect`.
pub fn handle(args: &ReflectArgs, flags: &GlobalFlags) -> anyhow::Result<ExitCode> {
    let example = read_json(&args.file)?;
    let node = reflect_example(example, args.description.as_deref());
    tracing::debug!(
        file = %args.file.display(),
        node_type = node.type_name().unwrap_or("any"),
        "reflected example payload"
    );
    output(&node, flags.format)?;
    Ok(ExitCode::SUCCESS)
}

pub(crate) fn reflect_example(example: serde_json::Value, description: Option<&str>) -> Schema {
    let overrides = match description {
        Some(description) => Attributes::new().with("description", description),
        None => Attributes::new(),
    };
    reflect(Sample::from(example), overrides)
}
