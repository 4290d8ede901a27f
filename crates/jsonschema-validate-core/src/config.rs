//! Configuration for schema compilation.

use serde::{Deserialize, Serialize};

/// How `format` hints on string schemas are treated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FormatPolicy {
    /// Recognised formats (`email`, `uuid`, `uri`/`url`, `date-time`) are checked.
    Enforce,
    /// All `format` keywords are ignored.
    Ignore,
}

/// Kind of request a schema arrives with.
///
/// Decides the fallback validator when a request carries no schema at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RequestKind {
    /// Structured extraction. Without a schema the result must be a string.
    Extract,
    /// Free-form query. Without a schema anything is accepted.
    Query,
}

/// Options for schema compilation.
///
/// ## Serialization Format
///
/// Fields are serialized in `kebab-case` (e.g., `max-depth`). Missing fields
/// take their default, so `{}` is a valid configuration file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct CompileOptions {
    /// Maximum schema nesting depth before compilation fails (stack overflow guard).
    /// Cyclic `$ref`s never count against this; they are deferred instead.
    pub max_depth: usize,
    /// Treatment of string `format` hints.
    pub formats: FormatPolicy,
}

impl Default for CompileOptions {
    fn default() -> Self {
        Self {
            max_depth: 128,
            formats: FormatPolicy::Enforce,
        }
    }
}
