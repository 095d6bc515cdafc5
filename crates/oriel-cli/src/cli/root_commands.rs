use std::path::PathBuf;

use clap::{Args, Subcommand, ValueEnum};

/// Top-level command tree.
#[derive(Clone, Debug, Subcommand)]
pub enum Commands {
    /// Print the schema node reflected from a JSON example payload.
    Reflect(ReflectArgs),
    /// Assemble an OpenAPI document from example payloads, one component per file.
    Document(DocumentArgs),
    /// Validate a payload against a serialized OpenAPI schema.
    Validate(ValidateArgs),
    /// Print the effective configuration.
    Config,
}

#[derive(Clone, Debug, Args)]
pub struct ReflectArgs {
    /// JSON file holding the example value.
    pub file: PathBuf,

    /// Description attached to the top-level node.
    #[arg(long)]
    pub description: Option<String>,
}

#[derive(Clone, Debug, Args)]
pub struct DocumentArgs {
    /// JSON example files; each is registered under its file stem.
    #[arg(required = true)]
    pub files: Vec<PathBuf>,

    /// Override `openapi.title` from the configuration.
    #[arg(long)]
    pub title: Option<String>,

    /// Override `openapi.version` from the configuration.
    #[arg(long = "api-version")]
    pub api_version: Option<String>,
}

/// Which part of a request the payload file represents.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, ValueEnum)]
pub enum PayloadKind {
    /// A JSON body.
    #[default]
    Json,
    /// A urlencoded form body.
    Form,
    /// A query string.
    Query,
}

#[derive(Clone, Debug, Args)]
pub struct ValidateArgs {
    /// File holding the OpenAPI schema node (JSON).
    #[arg(long)]
    pub schema: PathBuf,

    /// File holding the payload: JSON, or a urlencoded string for form/query.
    #[arg(long)]
    pub payload: PathBuf,

    /// How to read the payload file.
    #[arg(long, value_enum, default_value_t = PayloadKind::Json)]
    pub kind: PayloadKind,
}
