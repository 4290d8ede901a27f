//! Deferred validators for re-entrant `$ref`s.
//!
//! When the compiler meets a reference that is already being resolved on the
//! current branch, it cannot recurse (the schema is cyclic). It emits a
//! [`DeferredRef`] instead: a thunk holding everything needed to compile the
//! referenced definition later. The first time the validator is used against
//! real data, the definition is compiled and cached; nested self-references
//! inside it turn into further deferred nodes, so materialisation only ever
//! goes as deep as the data being validated.

use std::fmt;

use once_cell::sync::OnceCell;

use super::Validator;
use crate::config::CompileOptions;
use crate::definitions::{DefinitionsPool, VisitedPath};

pub struct DeferredRef {
    reference: String,
    pool: DefinitionsPool,
    visited: VisitedPath,
    options: CompileOptions,
    target: OnceCell<Result<Validator, String>>,
}

impl DeferredRef {
    pub(crate) fn new(
        reference: &str,
        pool: DefinitionsPool,
        visited: VisitedPath,
        options: CompileOptions,
    ) -> Self {
        Self {
            reference: reference.to_string(),
            pool,
            visited,
            options,
            target: OnceCell::new(),
        }
    }

    /// The `$ref` string this validator stands in for.
    pub fn reference(&self) -> &str {
        &self.reference
    }

    pub fn is_resolved(&self) -> bool {
        self.target.get().is_some()
    }

    /// Compile (once) and return the referenced definition's validator.
    ///
    /// The error string is the compile error's message; it only occurs if the
    /// pool no longer resolves the reference.
    pub(crate) fn resolve(&self) -> Result<&Validator, &str> {
        self.target
            .get_or_init(|| {
                tracing::trace!(reference = %self.reference, "resolving deferred reference");
                crate::compiler::compile_definition(
                    &self.reference,
                    &self.pool,
                    &self.visited,
                    &self.options,
                )
                .map_err(|e| e.to_string())
            })
            .as_ref()
            .map_err(String::as_str)
    }
}

impl fmt::Debug for DeferredRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Target omitted: it nests further deferred nodes.
        f.debug_struct("DeferredRef")
            .field("reference", &self.reference)
            .field("resolved", &self.is_resolved())
            .finish()
    }
}
