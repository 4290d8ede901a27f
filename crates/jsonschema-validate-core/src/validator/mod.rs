//! Compiled validators.
//!
//! A [`Validator`] is the output of the schema compiler: a tree that checks
//! candidate JSON values and, when they conform, produces the parsed value.
//! Parsing is not the identity: open objects drop undeclared keys, and
//! property order follows the schema's declaration order.
//!
//! Issues are reported with RFC 6901 data paths (`/users/0/email`).

mod constraints;
mod deferred;
mod formats;
mod shape;

use std::sync::Arc;

use serde_json::Value;

use crate::error::{ConformanceFailure, Issue, IssueKind};

pub use constraints::{ItemBounds, NumberRules, StringRules};
pub use deferred::DeferredRef;
pub use formats::StringFormat;
pub use shape::{AdditionalProperties, ArrayShape, ObjectShape, Property};

/// An executable validation schema.
#[derive(Debug, Clone)]
pub enum Validator {
    /// Accepts every value, including absence.
    Any,
    Null,
    Boolean,
    String(StringRules),
    /// Numbers and integers (`NumberRules::integer`).
    Number(NumberRules),
    /// Exactly one value (deep equality).
    Literal(Value),
    /// A closed set of strings.
    StringEnum(Vec<String>),
    Array(ArrayShape),
    Object(ObjectShape),
    /// Ordered alternatives; the first that accepts the value wins.
    Union(Vec<Validator>),
    /// Optional and nullable: absent and `null` are both accepted.
    Optional(Box<Validator>),
    /// A re-entrant `$ref`, compiled on first use.
    Deferred(Arc<DeferredRef>),
    /// A followed `$ref`; every use of the same definition in one compile
    /// pass points at the same node.
    Shared(Arc<Validator>),
}

impl Validator {
    /// Whether `value` conforms.
    pub fn check(&self, value: &Value) -> bool {
        self.parse_at(value, "").is_ok()
    }

    /// Validate `value` and return its parsed form.
    pub fn parse(&self, value: &Value) -> Result<Value, ConformanceFailure> {
        self.parse_at(value, "").map_err(ConformanceFailure::new)
    }

    /// Like [`parse`](Self::parse), but `None` stands for an absent value.
    ///
    /// Absence is accepted only by validators that allow it
    /// ([`Validator::Any`], [`Validator::Optional`], or a union containing one).
    pub fn parse_optional(&self, value: Option<&Value>) -> Result<Option<Value>, ConformanceFailure> {
        match value {
            Some(v) => self.parse(v).map(Some),
            None if self.accepts_absent() => Ok(None),
            None => Err(ConformanceFailure::new(vec![Issue::new(
                "",
                IssueKind::Missing,
                "value is required",
            )])),
        }
    }

    /// Whether an absent value is acceptable.
    pub fn accepts_absent(&self) -> bool {
        match self {
            Validator::Any | Validator::Optional(_) => true,
            Validator::Union(variants) => variants.iter().any(Validator::accepts_absent),
            Validator::Shared(target) => target.accepts_absent(),
            Validator::Deferred(deferred) => deferred
                .resolve()
                .map(Validator::accepts_absent)
                .unwrap_or(false),
            _ => false,
        }
    }

    /// Index of the union alternative that accepts `value`.
    ///
    /// Alternatives are tried in declaration order, so when several would
    /// accept the value the earliest one is reported. Returns `None` when
    /// this is not a union or no alternative matches. Optional, shared and
    /// deferred wrappers are looked through.
    pub fn matched_variant(&self, value: &Value) -> Option<usize> {
        match self {
            Validator::Union(variants) => variants.iter().position(|v| v.check(value)),
            Validator::Optional(inner) if !value.is_null() => inner.matched_variant(value),
            Validator::Shared(target) => target.matched_variant(value),
            Validator::Deferred(deferred) => deferred.resolve().ok()?.matched_variant(value),
            _ => None,
        }
    }

    pub(crate) fn parse_at(&self, value: &Value, path: &str) -> Result<Value, Vec<Issue>> {
        match self {
            Validator::Any => Ok(value.clone()),
            Validator::Null => match value {
                Value::Null => Ok(Value::Null),
                other => Err(vec![type_mismatch("null", other, path)]),
            },
            Validator::Boolean => match value {
                Value::Bool(_) => Ok(value.clone()),
                other => Err(vec![type_mismatch("boolean", other, path)]),
            },
            Validator::String(rules) => {
                let Value::String(s) = value else {
                    return Err(vec![type_mismatch("string", value, path)]);
                };
                let mut issues = Vec::new();
                rules.check(s, path, &mut issues);
                finish(value, issues)
            }
            Validator::Number(rules) => {
                let Value::Number(n) = value else {
                    let expected = if rules.integer { "integer" } else { "number" };
                    return Err(vec![type_mismatch(expected, value, path)]);
                };
                let mut issues = Vec::new();
                rules.check(n, path, &mut issues);
                finish(value, issues)
            }
            Validator::Literal(expected) => {
                if value == expected {
                    Ok(value.clone())
                } else {
                    Err(vec![Issue::new(
                        path,
                        IssueKind::LiteralMismatch {
                            expected: expected.clone(),
                        },
                        format!("expected literal {}, got {}", expected, value),
                    )])
                }
            }
            Validator::StringEnum(allowed) => {
                let Value::String(s) = value else {
                    return Err(vec![type_mismatch("string", value, path)]);
                };
                if allowed.iter().any(|a| a == s) {
                    Ok(value.clone())
                } else {
                    Err(vec![Issue::new(
                        path,
                        IssueKind::NotInEnum {
                            allowed: allowed.clone(),
                        },
                        format!("value {:?} is not one of {:?}", s, allowed),
                    )])
                }
            }
            Validator::Array(shape) => shape.parse_at(value, path),
            Validator::Object(shape) => shape.parse_at(value, path),
            Validator::Union(variants) => parse_union(variants, value, path),
            Validator::Optional(inner) => match value {
                Value::Null => Ok(Value::Null),
                other => inner.parse_at(other, path),
            },
            Validator::Shared(target) => target.parse_at(value, path),
            Validator::Deferred(deferred) => match deferred.resolve() {
                Ok(target) => target.parse_at(value, path),
                Err(message) => Err(vec![Issue::new(
                    path,
                    IssueKind::UnresolvedReference {
                        reference: deferred.reference().to_string(),
                    },
                    message.to_string(),
                )]),
            },
        }
    }
}

fn parse_union(variants: &[Validator], value: &Value, path: &str) -> Result<Value, Vec<Issue>> {
    let mut summaries = Vec::with_capacity(variants.len());
    for (i, variant) in variants.iter().enumerate() {
        match variant.parse_at(value, path) {
            Ok(parsed) => return Ok(parsed),
            Err(issues) => {
                if let Some(first) = issues.first() {
                    summaries.push(format!("variant {}: {}", i, first.message));
                }
            }
        }
    }

    let mut message = format!("value matched none of {} variants", variants.len());
    if !summaries.is_empty() {
        message.push_str(&format!(" ({})", summaries.join("; ")));
    }
    Err(vec![Issue::new(
        path,
        IssueKind::NoMatchingVariant {
            variants: variants.len(),
        },
        message,
    )])
}

fn finish(value: &Value, issues: Vec<Issue>) -> Result<Value, Vec<Issue>> {
    if issues.is_empty() {
        Ok(value.clone())
    } else {
        Err(issues)
    }
}

pub(crate) fn type_mismatch(expected: &str, value: &Value, path: &str) -> Issue {
    let actual = json_type_name(value);
    Issue::new(
        path,
        IssueKind::InvalidType {
            expected: expected.to_string(),
            actual: actual.to_string(),
        },
        format!("expected {}, got {}", expected, actual),
    )
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
