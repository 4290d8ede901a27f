//! Union and optional normalization for `anyOf` and `type: [..]`.
//!
//! Both keywords are commonly used to spell "T or null". That shape is
//! detected and compiled to [`Validator::Optional`] around a single `T`
//! validator; every other combination becomes an ordered [`Validator::Union`].

use serde_json::{Map, Value};

use super::{Compiler, Ctx};
use crate::error::CompileError;
use crate::schema_utils::build_path;
use crate::validator::Validator;

impl Compiler<'_> {
    /// `anyOf: [..]`.
    ///
    /// With exactly one non-null branch and at least one `{"type": "null"}`
    /// branch, the non-null branch is merged over the outer node (so outer
    /// keywords such as `description` survive), `anyOf` is stripped, and the
    /// result is made optional. Otherwise each branch is compiled on its own.
    pub(super) fn compile_any_of(
        &self,
        obj: &Map<String, Value>,
        variants: &[Value],
        ctx: &Ctx<'_>,
    ) -> Result<Validator, CompileError> {
        let non_null: Vec<(usize, &Value)> = variants
            .iter()
            .enumerate()
            .filter(|(_, v)| !is_null_typed(v))
            .collect();
        let has_null = non_null.len() < variants.len();

        if let ([(index, branch)], true) = (non_null.as_slice(), has_null) {
            let mut merged = obj.clone();
            if let Some(fields) = branch.as_object() {
                for (key, value) in fields {
                    merged.insert(key.clone(), value.clone());
                }
            }
            merged.remove("anyOf");

            tracing::debug!(path = %ctx.path, "anyOf with null branch, compiling as optional");
            let path = build_path(ctx.path, &["anyOf", &index.to_string()]);
            let inner = self.compile(&Value::Object(merged), &ctx.descend(&path))?;
            return Ok(Validator::Optional(Box::new(inner)));
        }

        let mut compiled = Vec::with_capacity(variants.len());
        for (i, variant) in variants.iter().enumerate() {
            let path = build_path(ctx.path, &["anyOf", &i.to_string()]);
            compiled.push(self.compile(variant, &ctx.descend(&path))?);
        }
        Ok(Validator::Union(compiled))
    }

    /// `type: [..]`.
    ///
    /// `"null"` plus exactly one other name is optional-of-that-type; any
    /// other list is a union with one alternative per name, in listed order.
    /// Each alternative is the outer node with `type` overridden.
    pub(super) fn compile_type_array(
        &self,
        obj: &Map<String, Value>,
        names: &[Value],
        ctx: &Ctx<'_>,
    ) -> Result<Validator, CompileError> {
        let non_null: Vec<&Value> = names
            .iter()
            .filter(|name| name.as_str() != Some("null"))
            .collect();
        let has_null = non_null.len() < names.len();

        if let ([name], true) = (non_null.as_slice(), has_null) {
            tracing::debug!(path = %ctx.path, "nullable type array, compiling as optional");
            let inner = self.compile(&with_type(obj, name), &ctx.descend(ctx.path))?;
            return Ok(Validator::Optional(Box::new(inner)));
        }

        let mut compiled = Vec::with_capacity(names.len());
        for (i, name) in names.iter().enumerate() {
            let path = build_path(ctx.path, &["type", &i.to_string()]);
            compiled.push(self.compile(&with_type(obj, name), &ctx.descend(&path))?);
        }
        Ok(Validator::Union(compiled))
    }
}

/// A branch written as `{"type": "null"}` (plus any other keywords).
fn is_null_typed(branch: &Value) -> bool {
    branch.get("type").and_then(Value::as_str) == Some("null")
}

fn with_type(obj: &Map<String, Value>, name: &Value) -> Value {
    let mut node = obj.clone();
    node.insert("type".to_string(), name.clone());
    Value::Object(node)
}
