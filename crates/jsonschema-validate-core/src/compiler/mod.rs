//! Schema compiler: JSON Schema node → [`Validator`].
//!
//! One recursive routine, [`Compiler::compile`], classifies each node
//! ([`crate::node::classify`]) and hands it to a translation rule:
//!
//! | Node                | Rule                                  | Module        |
//! |---------------------|---------------------------------------|---------------|
//! | `$ref`              | resolve against the pool, cycle guard | here          |
//! | `anyOf`, `type: []` | optional/union normalization          | [`union`]     |
//! | `enum`, `const`     | literals                              | [`literal`]   |
//! | scalar `type`       | string/number/boolean/null            | [`primitive`] |
//! | `array`, `object`   | items, properties                     | [`composite`] |
//!
//! Anything else (including non-object nodes) compiles to [`Validator::Any`].
//!
//! ## Cycle guard
//!
//! Every call carries the set of `$ref` strings being resolved on its branch
//! ([`VisitedPath`]). A reference already in that set is not followed:
//!
//! - if the branch has descended into an array item or object property since
//!   the reference was entered, it becomes a [`Validator::Deferred`] that
//!   compiles the definition on first use;
//! - otherwise the cycle never reaches a nested value (`A: {$ref: A}`,
//!   `A: {anyOf: [{$ref: A}, ...]}`) and the re-entry compiles to a union
//!   with no alternatives, which matches nothing.
//!
//! Sibling branches get independent copies of the set, so two properties
//! referencing the same definition never look cyclic to each other.
//!
//! ## Shared definitions
//!
//! A followed reference is compiled once per pass for each distinct
//! (pool, reference, visited path, depth) and reused as a
//! [`Validator::Shared`] node. Definitions that refer to one another several
//! times (`D2: {a: D1, b: D1}`) therefore compile in time proportional to
//! the schema, not to its unfolding.

mod composite;
mod literal;
mod primitive;
mod union;

use std::cell::RefCell;
use std::collections::HashMap;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use serde_json::Value;

use crate::config::{CompileOptions, RequestKind};
use crate::definitions::{DefinitionsPool, VisitedPath};
use crate::error::CompileError;
use crate::node::{classify, PrimitiveType, SchemaNode};
use crate::validator::{DeferredRef, StringRules, Validator};

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Compile a root schema with default options.
///
/// The definitions pool is taken from the schema's `$defs` (or
/// `definitions`).
///
/// # Example
///
/// ```
/// use jsonschema_validate_core::compile;
/// use serde_json::json;
///
/// let validator = compile(&json!({
///     "type": "object",
///     "properties": { "name": { "type": "string" } },
///     "required": ["name"]
/// })).unwrap();
///
/// assert!(validator.check(&json!({ "name": "Ada" })));
/// assert!(!validator.check(&json!({})));
/// ```
pub fn compile(schema: &Value) -> Result<Validator, CompileError> {
    compile_with_options(schema, &CompileOptions::default())
}

/// Compile a root schema.
pub fn compile_with_options(
    schema: &Value,
    options: &CompileOptions,
) -> Result<Validator, CompileError> {
    compile_node(
        schema,
        &DefinitionsPool::default(),
        &VisitedPath::new(),
        options,
    )
}

/// Parse JSON text and compile it as a root schema.
pub fn compile_str(schema: &str, options: &CompileOptions) -> Result<Validator, CompileError> {
    let schema: Value = serde_json::from_str(schema)?;
    compile_with_options(&schema, options)
}

/// Compile `node` against an explicit definitions pool and visited path.
///
/// An empty `pool` is bootstrapped from the first node that declares
/// `$defs`/`definitions`; a non-empty one is used unchanged for the whole
/// pass.
pub fn compile_node(
    node: &Value,
    pool: &DefinitionsPool,
    visited: &VisitedPath,
    options: &CompileOptions,
) -> Result<Validator, CompileError> {
    let ctx = Ctx {
        pool,
        visited,
        path: "#",
        depth: 0,
    };
    Compiler::new(options).compile(node, &ctx)
}

/// Compile the optional schema attached to an extraction or query request.
///
/// A missing (or `null`) schema falls back to a plain string validator for
/// [`RequestKind::Extract`] and to [`Validator::Any`] for [`RequestKind::Query`].
pub fn compile_request_schema(
    schema: Option<&Value>,
    kind: RequestKind,
    options: &CompileOptions,
) -> Result<Validator, CompileError> {
    match schema {
        Some(schema) if !schema.is_null() => compile_with_options(schema, options),
        _ => {
            tracing::debug!(?kind, "request has no schema, using default validator");
            Ok(match kind {
                RequestKind::Extract => Validator::String(StringRules::default()),
                RequestKind::Query => Validator::Any,
            })
        }
    }
}

/// Compile the definition a deferred `$ref` points at.
///
/// `reference` is re-entered on `visited`, so self-references inside the
/// definition are deferred again rather than followed.
pub(crate) fn compile_definition(
    reference: &str,
    pool: &DefinitionsPool,
    visited: &VisitedPath,
    options: &CompileOptions,
) -> Result<Validator, CompileError> {
    let target = pool.resolve(reference)?;
    let visited = visited.with(reference);
    let ctx = Ctx {
        pool,
        visited: &visited,
        path: reference,
        depth: 0,
    };
    Compiler::new(options).compile(target, &ctx)
}

// ---------------------------------------------------------------------------
// Compiler
// ---------------------------------------------------------------------------

/// Per-call position in the recursion.
#[derive(Clone, Copy)]
struct Ctx<'a> {
    pool: &'a DefinitionsPool,
    visited: &'a VisitedPath,
    /// Schema location, for error messages (`#/properties/a/items`).
    path: &'a str,
    depth: usize,
}

impl<'a> Ctx<'a> {
    /// Same pool and visited path, one level deeper at `path`.
    fn descend<'b>(&self, path: &'b str) -> Ctx<'b>
    where
        'a: 'b,
    {
        Ctx {
            pool: self.pool,
            visited: self.visited,
            path,
            depth: self.depth + 1,
        }
    }

    /// Like [`descend`](Self::descend), for the schema of a nested value
    /// (array item, object property).
    fn nested<'b>(&self, path: &'b str, visited: &'b VisitedPath) -> Ctx<'b>
    where
        'a: 'b,
    {
        Ctx {
            visited,
            ..self.descend(path)
        }
    }
}

/// Everything a followed `$ref` compiles from, apart from the options.
struct ReferenceKey {
    pool: DefinitionsPool,
    reference: String,
    visited: VisitedPath,
    depth: usize,
}

impl PartialEq for ReferenceKey {
    fn eq(&self, other: &Self) -> bool {
        self.pool.same_as(&other.pool)
            && self.reference == other.reference
            && self.depth == other.depth
            && self.visited == other.visited
    }
}

impl Eq for ReferenceKey {}

impl Hash for ReferenceKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.pool.addr().hash(state);
        self.reference.hash(state);
        self.visited.hash(state);
        self.depth.hash(state);
    }
}

struct Compiler<'o> {
    options: &'o CompileOptions,
    /// Followed references compiled so far in this pass. Keys hold their
    /// pool, so a pool's address is never reused while its entries live.
    compiled: RefCell<HashMap<ReferenceKey, Arc<Validator>>>,
}

impl<'o> Compiler<'o> {
    fn new(options: &'o CompileOptions) -> Self {
        Self {
            options,
            compiled: RefCell::new(HashMap::new()),
        }
    }
}

impl Compiler<'_> {
    fn compile(&self, node: &Value, ctx: &Ctx<'_>) -> Result<Validator, CompileError> {
        let Some(obj) = node.as_object() else {
            tracing::debug!(path = %ctx.path, "non-object schema node, accepting anything");
            return Ok(Validator::Any);
        };

        if ctx.depth > self.options.max_depth {
            return Err(CompileError::RecursionDepthExceeded {
                path: ctx.path.to_string(),
                max_depth: self.options.max_depth,
            });
        }

        let pool = ctx.pool.or_bootstrap(obj);
        let ctx = Ctx { pool: &pool, ..*ctx };

        match classify(obj) {
            SchemaNode::Reference(reference) => self.compile_reference(reference, &ctx),
            SchemaNode::Union(variants) => self.compile_any_of(obj, variants, &ctx),
            SchemaNode::TypeArray(names) => self.compile_type_array(obj, names, &ctx),
            SchemaNode::Literal(set) => Ok(literal::compile_literal(set)),
            SchemaNode::Primitive(primitive) => self.compile_typed(obj, primitive, &ctx),
            SchemaNode::ImplicitObject => self.compile_typed(obj, PrimitiveType::Object, &ctx),
            SchemaNode::Unknown => {
                tracing::debug!(path = %ctx.path, "no recognised keyword, accepting anything");
                Ok(Validator::Any)
            }
        }
    }

    fn compile_reference(&self, reference: &str, ctx: &Ctx<'_>) -> Result<Validator, CompileError> {
        if ctx.visited.contains(reference) {
            if !ctx.visited.is_nested(reference) {
                tracing::warn!(
                    reference,
                    path = %ctx.path,
                    "reference cycle never reaches a nested value, matches nothing"
                );
                return Ok(Validator::Union(Vec::new()));
            }
            tracing::debug!(reference, path = %ctx.path, "re-entrant reference, deferring");
            return Ok(Validator::Deferred(Arc::new(DeferredRef::new(
                reference,
                ctx.pool.clone(),
                ctx.visited.clone(),
                self.options.clone(),
            ))));
        }

        let key = ReferenceKey {
            pool: ctx.pool.clone(),
            reference: reference.to_string(),
            visited: ctx.visited.with(reference),
            depth: ctx.depth,
        };
        let cached = self.compiled.borrow().get(&key).cloned();
        if let Some(shared) = cached {
            tracing::trace!(reference, path = %ctx.path, "reusing compiled reference");
            return Ok(Validator::Shared(shared));
        }

        let target = ctx.pool.resolve(reference)?;
        let inner = Ctx {
            pool: ctx.pool,
            visited: &key.visited,
            path: reference,
            depth: ctx.depth + 1,
        };
        let compiled = Arc::new(self.compile(target, &inner)?);
        self.compiled.borrow_mut().insert(key, Arc::clone(&compiled));
        Ok(Validator::Shared(compiled))
    }

    fn compile_typed(
        &self,
        obj: &serde_json::Map<String, Value>,
        primitive: PrimitiveType,
        ctx: &Ctx<'_>,
    ) -> Result<Validator, CompileError> {
        match primitive {
            PrimitiveType::String => self.compile_string(obj, ctx),
            PrimitiveType::Number | PrimitiveType::Integer => {
                Ok(primitive::compile_number(obj, primitive == PrimitiveType::Integer, ctx.path))
            }
            PrimitiveType::Boolean => Ok(Validator::Boolean),
            PrimitiveType::Null => Ok(Validator::Null),
            PrimitiveType::Array => self.compile_array(obj, ctx),
            PrimitiveType::Object => self.compile_object(obj, ctx),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_non_object_nodes_accept_anything() {
        for schema in [json!(null), json!(true), json!(42), json!("string"), json!([])] {
            let v = compile(&schema).unwrap();
            assert!(matches!(v, Validator::Any), "{schema} should compile to Any");
        }
    }

    #[test]
    fn test_explicit_pool_is_used_for_refs() {
        let pool: DefinitionsPool = [("Name".to_string(), json!({ "type": "string" }))]
            .into_iter()
            .collect();
        let v = compile_node(
            &json!({ "$ref": "#/$defs/Name" }),
            &pool,
            &VisitedPath::new(),
            &CompileOptions::default(),
        )
        .unwrap();
        assert!(v.check(&json!("Ada")));
        assert!(!v.check(&json!(1)));
    }

    #[test]
    fn test_pre_visited_reference_is_deferred() {
        let pool: DefinitionsPool = [("Name".to_string(), json!({ "type": "string" }))]
            .into_iter()
            .collect();
        let visited = VisitedPath::new().with("#/$defs/Name").nested();
        let v = compile_node(
            &json!({ "$ref": "#/$defs/Name" }),
            &pool,
            &visited,
            &CompileOptions::default(),
        )
        .unwrap();
        let Validator::Deferred(deferred) = &v else {
            panic!("expected deferred validator, got {v:?}");
        };
        assert!(!deferred.is_resolved());
        assert!(v.check(&json!("Ada")));
        assert!(deferred.is_resolved());
    }

    #[test]
    fn test_unproductive_cycle_matches_nothing() {
        let v = compile(&json!({
            "$defs": {
                "A": { "$ref": "#/$defs/B" },
                "B": { "anyOf": [{ "$ref": "#/$defs/A" }, { "type": "string" }] }
            },
            "$ref": "#/$defs/A"
        }))
        .unwrap();
        assert!(v.check(&json!("text")));
        assert!(!v.check(&json!(1)));
        assert_eq!(v.matched_variant(&json!("text")), Some(1));
    }

    #[test]
    fn test_separately_declared_pools_are_kept_apart() {
        let v = compile(&json!({
            "type": "object",
            "properties": {
                "a": { "$defs": { "X": { "type": "string" } }, "$ref": "#/$defs/X" },
                "b": { "$defs": { "X": { "type": "integer" } }, "$ref": "#/$defs/X" }
            }
        }))
        .unwrap();
        assert!(v.check(&json!({ "a": "s", "b": 1 })));
        assert!(!v.check(&json!({ "a": 1 })));
        assert!(!v.check(&json!({ "b": "s" })));
    }

    #[test]
    fn test_depth_guard_reports_schema_path() {
        let mut schema = json!({ "type": "string" });
        for _ in 0..5 {
            schema = json!({ "type": "array", "items": schema });
        }
        let options = CompileOptions {
            max_depth: 3,
            ..Default::default()
        };
        match compile_with_options(&schema, &options) {
            Err(CompileError::RecursionDepthExceeded { path, max_depth }) => {
                assert_eq!(max_depth, 3);
                assert_eq!(path, "#/items/items/items/items");
            }
            other => panic!("expected RecursionDepthExceeded, got {other:?}"),
        }
    }

    #[test]
    fn test_compile_str_rejects_invalid_json() {
        let err = compile_str("{ not json", &CompileOptions::default()).unwrap_err();
        assert!(matches!(err, CompileError::JsonError(_)));
    }

    #[test]
    fn test_request_defaults_depend_on_kind() {
        let options = CompileOptions::default();
        let extract = compile_request_schema(None, RequestKind::Extract, &options).unwrap();
        assert!(extract.check(&json!("text")));
        assert!(!extract.check(&json!({ "a": 1 })));

        let query = compile_request_schema(Some(&Value::Null), RequestKind::Query, &options).unwrap();
        assert!(query.check(&json!({ "a": 1 })));

        let schema = json!({ "type": "integer" });
        let explicit = compile_request_schema(Some(&schema), RequestKind::Extract, &options).unwrap();
        assert!(explicit.check(&json!(3)));
        assert!(!explicit.check(&json!("3")));
    }
}
