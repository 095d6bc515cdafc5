//! # oriel-schema
//!
//! OpenAPI schema synthesis for Oriel.
//!
//! This crate provides:
//! - [`Schema`]: the schema document model (typed node kinds with a
//!   permissive attribute allowlist and a deterministic JSON serialization)
//! - [`Reflector`]: a priority-ordered rule table that maps type shapes and
//!   example values to schema nodes
//! - [`field`]: extraction of per-field documentation metadata
//! - [`Reflectable`]: the capability interface model types implement, with
//!   impls for std, chrono, uuid, and `serde_json::Value`
//! - [`SchemarsModel`]: an adapter that reflects any `schemars::JsonSchema` type
//! - [`ComponentRegistry`] and [`build_document`]: named components and the
//!   OpenAPI document shell around them
//!
//! ## Architecture
//!
//! Reflection never fails. Unknown shapes become generic objects, unknown
//! attributes are dropped at construction, and self-referential models are
//! cut with a `$ref` back-reference to `#/components/schemas/<Name>`.
//! Consumer crates (oriel-validate, oriel-cli) build on the serialized output.

pub mod document;
pub mod error;
pub mod field;
pub mod reflect;
pub mod reflectable;
pub mod registry;
pub mod schema;
pub mod schemars_model;
pub mod shape;

pub use document::{Info, build_document};
pub use error::SchemaError;
pub use field::{ExtractedField, FieldInfo, FieldMetadata};
pub use reflect::{Reflector, Rule, Scope, reflect};
pub use reflectable::Reflectable;
pub use registry::ComponentRegistry;
pub use schema::{AttrValue, Attributes, COMPONENTS_PREFIX, Schema, SchemaKind};
pub use schemars_model::{SchemarsModel, shape_from_json_schema};
pub use shape::{EnumShape, FieldDecl, FieldKind, Input, ModelShape, Sample, TypeShape};
