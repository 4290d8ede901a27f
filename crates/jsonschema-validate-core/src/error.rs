//! Error types for schema compilation and data validation.
//!
//! Two separate taxonomies:
//! - [`CompileError`] is returned by the compiler when the schema itself
//!   cannot be turned into a validator (missing `$ref` target, bad regex).
//! - [`ConformanceFailure`] is returned by a [`crate::Validator`] when input
//!   data does not match the compiled shape.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CompileError {
    #[error("JSON parsing error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Could not resolve schema reference: {reference} (no definition named '{name}')")]
    SchemaResolution { reference: String, name: String },

    #[error("Invalid pattern at {path}: {pattern:?} ({message})")]
    InvalidPattern {
        path: String,
        pattern: String,
        message: String,
    },

    #[error("Recursion depth exceeded at {path} (max: {max_depth})")]
    RecursionDepthExceeded { path: String, max_depth: usize },
}

/// A single reason why a value was rejected.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Issue {
    /// Data location of the offending value (e.g. "/users/0/email", "/" for the root).
    pub path: String,
    /// Classification of the issue.
    pub kind: IssueKind,
    /// Human-readable description.
    pub message: String,
}

/// Classification of validation issues.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum IssueKind {
    /// The value has the wrong JSON type.
    InvalidType { expected: String, actual: String },
    /// A required value is absent.
    Missing,
    /// A closed object carries a key it does not declare.
    UnknownProperty { name: String },
    TooShort { min_length: u64 },
    TooLong { max_length: u64 },
    PatternMismatch { pattern: String },
    InvalidFormat { format: String },
    NotInteger,
    /// A numeric bound was violated. `constraint` is the schema keyword
    /// (`minimum`, `exclusiveMaximum`, ...).
    OutOfRange { constraint: String, bound: Value },
    NotMultipleOf { multiple_of: Value },
    TooFewItems { min_items: u64 },
    TooManyItems { max_items: u64 },
    LiteralMismatch { expected: Value },
    NotInEnum { allowed: Vec<String> },
    /// No alternative of a union accepted the value.
    NoMatchingVariant { variants: usize },
    /// A deferred `$ref` could not be resolved when first used.
    UnresolvedReference { reference: String },
}

impl Issue {
    pub(crate) fn new(path: &str, kind: IssueKind, message: impl Into<String>) -> Self {
        Self {
            path: if path.is_empty() {
                "/".to_string()
            } else {
                path.to_string()
            },
            kind,
            message: message.into(),
        }
    }
}

impl fmt::Display for Issue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.path, self.message)
    }
}

/// Returned by [`crate::Validator::parse`] when the input does not conform.
///
/// Always carries at least one [`Issue`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConformanceFailure {
    pub issues: Vec<Issue>,
}

impl ConformanceFailure {
    pub(crate) fn new(issues: Vec<Issue>) -> Self {
        debug_assert!(!issues.is_empty(), "conformance failure without issues");
        Self { issues }
    }

    /// Whether any issue was reported at exactly `path`.
    pub fn has_issue_at(&self, path: &str) -> bool {
        self.issues.iter().any(|issue| issue.path == path)
    }
}

impl fmt::Display for ConformanceFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.issues.as_slice() {
            [] => write!(f, "value does not conform to schema"),
            [only] => write!(f, "value does not conform to schema: {only}"),
            [first, rest @ ..] => write!(
                f,
                "value does not conform to schema: {first} (and {} more)",
                rest.len()
            ),
        }
    }
}

impl std::error::Error for ConformanceFailure {}
