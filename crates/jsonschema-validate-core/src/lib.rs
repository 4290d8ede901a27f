//! Compile JSON Schema documents into executable validators.
//!
//! [`compile`] turns a schema (as a [`serde_json::Value`]) into a
//! [`Validator`] tree. The validator checks candidate values and returns
//! their parsed form, or a [`ConformanceFailure`] listing every problem with
//! an RFC 6901 data path.
//!
//! Supported keywords: `$ref` (against `$defs`/`definitions`), `anyOf`,
//! `type` (single or array), `enum`, `const`, string length/`pattern`/`format`,
//! numeric bounds and `multipleOf`, `items`, `minItems`/`maxItems`,
//! `properties`, `required` and `additionalProperties`. Unrecognised schemas
//! accept anything.
//!
//! Recursive `$ref` chains compile to [`Validator::Deferred`] nodes that
//! resolve on first use, so self-referential schemas terminate.

pub mod config;
pub mod definitions;
pub mod error;
pub mod validator;

mod compiler;
mod node;
mod schema_utils;

pub use compiler::{compile, compile_node, compile_request_schema, compile_str, compile_with_options};
pub use config::{CompileOptions, FormatPolicy, RequestKind};
pub use definitions::{DefinitionsPool, VisitedPath};
pub use error::{CompileError, ConformanceFailure, Issue, IssueKind};
pub use node::PrimitiveType;
pub use schema_utils::{build_path, escape_pointer_segment, unescape_pointer_segment};
pub use validator::Validator;
