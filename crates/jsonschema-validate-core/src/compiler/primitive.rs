//! `string`, `number` and `integer` constraint extraction.
//!
//! Each keyword is read independently. A keyword with an unusable value
//! (`minLength: "3"`, `multipleOf: 0`) is skipped with a warning rather than
//! failing the whole compilation. The exception is `pattern`: a regex that
//! does not compile is a [`CompileError::InvalidPattern`].

use regex::Regex;
use serde_json::{Map, Number, Value};

use super::{Compiler, Ctx};
use crate::config::FormatPolicy;
use crate::error::CompileError;
use crate::schema_utils::build_path;
use crate::validator::{NumberRules, StringFormat, StringRules, Validator};

impl Compiler<'_> {
    pub(super) fn compile_string(
        &self,
        obj: &Map<String, Value>,
        ctx: &Ctx<'_>,
    ) -> Result<Validator, CompileError> {
        let mut rules = StringRules {
            min_length: read_count(obj, "minLength", ctx.path),
            max_length: read_count(obj, "maxLength", ctx.path),
            ..Default::default()
        };

        match obj.get("pattern") {
            Some(Value::String(pattern)) if !pattern.is_empty() => {
                let re = Regex::new(pattern).map_err(|e| CompileError::InvalidPattern {
                    path: build_path(ctx.path, &["pattern"]),
                    pattern: pattern.clone(),
                    message: e.to_string(),
                })?;
                rules.pattern = Some(re);
            }
            Some(Value::String(_)) | None => {}
            Some(other) => {
                tracing::warn!(path = %ctx.path, value = %other, "ignoring non-string pattern");
            }
        }

        if self.options.formats == FormatPolicy::Enforce {
            if let Some(format) = obj.get("format").and_then(Value::as_str) {
                rules.format = StringFormat::from_keyword(format);
                if rules.format.is_none() {
                    tracing::debug!(path = %ctx.path, format, "unrecognised format, not checked");
                }
            }
        }

        Ok(Validator::String(rules))
    }
}

pub(super) fn compile_number(obj: &Map<String, Value>, integer: bool, path: &str) -> Validator {
    let mut rules = NumberRules {
        integer,
        minimum: read_number(obj, "minimum", path),
        maximum: read_number(obj, "maximum", path),
        exclusive_minimum: read_number(obj, "exclusiveMinimum", path),
        exclusive_maximum: read_number(obj, "exclusiveMaximum", path),
        multiple_of: read_number(obj, "multipleOf", path),
    };

    // Draft 4 spelling: `exclusiveMinimum: true` turns `minimum` exclusive.
    if obj.get("exclusiveMinimum") == Some(&Value::Bool(true)) {
        rules.exclusive_minimum = rules.minimum.take();
    }
    if obj.get("exclusiveMaximum") == Some(&Value::Bool(true)) {
        rules.exclusive_maximum = rules.maximum.take();
    }

    if let Some(step) = &rules.multiple_of {
        if !step.as_f64().is_some_and(|f| f > 0.0) {
            tracing::warn!(path, multiple_of = %step, "ignoring non-positive multipleOf");
            rules.multiple_of = None;
        }
    }

    Validator::Number(rules)
}

/// A non-negative integer keyword (`minLength`, `maxItems`, ...).
pub(super) fn read_count(obj: &Map<String, Value>, keyword: &str, path: &str) -> Option<u64> {
    let value = obj.get(keyword)?;
    let count = value.as_u64().or_else(|| {
        value
            .as_f64()
            .filter(|f| *f >= 0.0 && f.fract() == 0.0 && *f <= u64::MAX as f64)
            .map(|f| f as u64)
    });
    if count.is_none() {
        tracing::warn!(path, keyword, value = %value, "ignoring non-integer count keyword");
    }
    count
}

fn read_number(obj: &Map<String, Value>, keyword: &str, path: &str) -> Option<Number> {
    match obj.get(keyword)? {
        Value::Number(n) => Some(n.clone()),
        // Draft 4 boolean exclusive bounds, handled by the caller.
        Value::Bool(_) if keyword.starts_with("exclusive") => None,
        other => {
            tracing::warn!(path, keyword, value = %other, "ignoring non-numeric keyword");
            None
        }
    }
}
