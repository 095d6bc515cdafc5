//! # oriel-validate
//!
//! Request payload validation against reflected OpenAPI schemas.
//!
//! A [`ValidatorBuilder`] names the model shapes an endpoint accepts for its JSON
//! body, form body, or query string. [`ValidatorBuilder::build`] reflects each
//! shape, converts the OpenAPI node into JSON Schema, and compiles it once.
//! The resulting [`PayloadValidator`] is `Send + Sync` and is reused for
//! every request:
//!
//! ```
//! use oriel_schema::{FieldDecl, ModelShape};
//! use oriel_validate::{FormData, RequestPayload, ValidatorBuilder};
//!
//! let search = ModelShape::new("Search", || {
//!     vec![FieldDecl::of::<String>("q"), FieldDecl::of::<Option<i32>>("page")]
//! });
//! let validator = ValidatorBuilder::new().query(search).build().expect("compiles");
//!
//! let request = RequestPayload::new().with_query(FormData::parse("q=rust&page=2"));
//! let validated = validator.validate(&request).expect("valid");
//! assert_eq!(validated.get("query").unwrap()["page"], 2);
//! ```
//!
//! Form and query data are cleaned first (see [`clean`]); failures carry a
//! per-field `detail` map ready to be returned as an HTTP 400 body.

pub mod clean;
pub mod convert;
pub mod error;
pub mod form;
pub mod validator;

pub use clean::{clean_data, coerce_scalar};
pub use convert::to_json_schema;
pub use error::{InitError, PayloadTarget, ROOT_KEY, ValidationFailure};
pub use form::FormData;
pub use validator::{PayloadValidator, RequestPayload, SchemaValidator, Validated, ValidatorBuilder};
