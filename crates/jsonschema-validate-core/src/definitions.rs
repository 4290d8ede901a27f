//! Definitions pool and visited-reference path.
//!
//! [`DefinitionsPool`] is the single place `$ref` strings are turned into
//! schema nodes. It is fixed for one compilation pass and shared by value
//! (an `Arc` clone) with every nested call and every deferred validator.
//!
//! [`VisitedPath`] records the `$ref` strings being resolved on the current
//! branch of the recursion. Each branch works on its own copy.

use std::collections::BTreeMap;
use std::sync::Arc;

use serde_json::{Map, Value};

use crate::error::CompileError;
use crate::schema_utils::ref_target_name;

// ---------------------------------------------------------------------------
// DefinitionsPool
// ---------------------------------------------------------------------------

/// Named sub-schemas that `$ref` values are resolved against.
#[derive(Debug, Clone, Default)]
pub struct DefinitionsPool {
    defs: Arc<Map<String, Value>>,
}

impl DefinitionsPool {
    pub fn new(defs: Map<String, Value>) -> Self {
        Self {
            defs: Arc::new(defs),
        }
    }

    /// Extract the pool declared on a schema node.
    ///
    /// `$defs` takes precedence over the legacy `definitions`. Nodes with
    /// neither (or non-object values) yield an empty pool.
    pub fn from_schema(schema: &Value) -> Self {
        schema
            .as_object()
            .map(Self::from_node)
            .unwrap_or_default()
    }

    pub(crate) fn from_node(node: &Map<String, Value>) -> Self {
        for keyword in ["$defs", "definitions"] {
            if let Some(Value::Object(defs)) = node.get(keyword) {
                return Self::new(defs.clone());
            }
        }
        Self::default()
    }

    /// The pool to use for `node`: this pool when it is already established,
    /// otherwise whatever `node` itself declares.
    pub(crate) fn or_bootstrap(&self, node: &Map<String, Value>) -> Self {
        if self.is_empty() {
            Self::from_node(node)
        } else {
            self.clone()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.defs.is_empty()
    }

    pub fn len(&self) -> usize {
        self.defs.len()
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.defs.get(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.defs.keys().map(String::as_str)
    }

    /// Whether both handles share the same underlying map.
    pub(crate) fn same_as(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.defs, &other.defs)
    }

    pub(crate) fn addr(&self) -> *const Map<String, Value> {
        Arc::as_ptr(&self.defs)
    }

    /// Resolve a `$ref` string to its target node.
    ///
    /// Only the final path segment is looked up: `#/$defs/Node`,
    /// `#/definitions/Node` and `Node` all name the same definition.
    pub fn resolve(&self, reference: &str) -> Result<&Value, CompileError> {
        let name = ref_target_name(reference);
        self.defs
            .get(name.as_ref())
            .ok_or_else(|| CompileError::SchemaResolution {
                reference: reference.to_string(),
                name: name.into_owned(),
            })
    }
}

impl From<Map<String, Value>> for DefinitionsPool {
    fn from(defs: Map<String, Value>) -> Self {
        Self::new(defs)
    }
}

impl FromIterator<(String, Value)> for DefinitionsPool {
    fn from_iter<I: IntoIterator<Item = (String, Value)>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

// ---------------------------------------------------------------------------
// VisitedPath
// ---------------------------------------------------------------------------

/// `$ref` strings currently being resolved on one branch of the recursion.
///
/// Each entry also records whether the branch has since descended into a
/// nested value (an array item or an object property). Re-entering a
/// reference after such a step is ordinary recursion; re-entering it
/// without one is a cycle that never consumes any data.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct VisitedPath {
    refs: BTreeMap<String, bool>,
}

impl VisitedPath {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, reference: &str) -> bool {
        self.refs.contains_key(reference)
    }

    /// Whether the branch has descended into a nested value since
    /// `reference` was entered.
    pub fn is_nested(&self, reference: &str) -> bool {
        self.refs.get(reference).copied().unwrap_or(false)
    }

    /// A copy of this path extended with `reference`. `self` is untouched.
    pub fn with(&self, reference: &str) -> Self {
        let mut refs = self.refs.clone();
        refs.insert(reference.to_string(), false);
        Self { refs }
    }

    /// A copy of this path for a nested value: every entry is marked as
    /// having descended.
    pub fn nested(&self) -> Self {
        Self {
            refs: self.refs.keys().map(|r| (r.clone(), true)).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.refs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.refs.is_empty()
    }
}
