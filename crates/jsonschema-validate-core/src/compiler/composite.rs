//! `array` and `object` nodes.

use std::collections::HashSet;

use serde_json::{Map, Value};

use super::primitive::read_count;
use super::{Compiler, Ctx};
use crate::error::CompileError;
use crate::schema_utils::build_path;
use crate::validator::{
    AdditionalProperties, ArrayShape, ItemBounds, ObjectShape, Property, Validator,
};

impl Compiler<'_> {
    /// `items` is a single schema applied to every element. Anything else
    /// (missing, tuple form, `true`) leaves elements unchecked.
    pub(super) fn compile_array(
        &self,
        obj: &Map<String, Value>,
        ctx: &Ctx<'_>,
    ) -> Result<Validator, CompileError> {
        let items = match obj.get("items") {
            Some(items @ Value::Object(_)) => {
                let path = build_path(ctx.path, &["items"]);
                let visited = ctx.visited.nested();
                self.compile(items, &ctx.nested(&path, &visited))?
            }
            Some(Value::Array(_)) => {
                tracing::warn!(path = %ctx.path, "tuple-form items not supported, elements unchecked");
                Validator::Any
            }
            _ => Validator::Any,
        };

        Ok(Validator::Array(ArrayShape {
            items: Box::new(items),
            bounds: ItemBounds {
                min_items: read_count(obj, "minItems", ctx.path),
                max_items: read_count(obj, "maxItems", ctx.path),
            },
        }))
    }

    /// Properties are compiled in declaration order. A property is required
    /// only when listed in `required`; `additionalProperties: false` closes
    /// the object and an object-valued `additionalProperties` becomes a
    /// catch-all.
    pub(super) fn compile_object(
        &self,
        obj: &Map<String, Value>,
        ctx: &Ctx<'_>,
    ) -> Result<Validator, CompileError> {
        let required = required_names(obj, ctx.path);
        let visited = ctx.visited.nested();

        let mut properties = Vec::new();
        match obj.get("properties") {
            Some(Value::Object(props)) => {
                for (name, schema) in props {
                    let path = build_path(ctx.path, &["properties", name]);
                    let validator = self.compile(schema, &ctx.nested(&path, &visited))?;
                    properties.push(Property {
                        name: name.clone(),
                        validator,
                        required: required.contains(name.as_str()),
                    });
                }
            }
            Some(other) => {
                tracing::warn!(path = %ctx.path, value = %other, "ignoring non-object properties");
            }
            None => {}
        }

        for name in &required {
            if !properties.iter().any(|p| p.name == *name) {
                tracing::debug!(path = %ctx.path, name, "required name has no declared property");
            }
        }

        let additional = match obj.get("additionalProperties") {
            Some(Value::Bool(false)) => AdditionalProperties::Reject,
            Some(schema @ (Value::Object(_) | Value::Null)) => {
                let path = build_path(ctx.path, &["additionalProperties"]);
                let catch_all = self.compile(schema, &ctx.nested(&path, &visited))?;
                AdditionalProperties::Schema(Box::new(catch_all))
            }
            _ => AdditionalProperties::Ignore,
        };

        Ok(Validator::Object(ObjectShape::new(properties, additional)))
    }
}

fn required_names<'a>(obj: &'a Map<String, Value>, path: &str) -> HashSet<&'a str> {
    match obj.get("required") {
        Some(Value::Array(names)) => names.iter().filter_map(Value::as_str).collect(),
        Some(other) => {
            tracing::warn!(path, value = %other, "ignoring non-array required");
            HashSet::new()
        }
        None => HashSet::new(),
    }
}
