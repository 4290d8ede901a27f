//! JSON Pointer helpers (RFC 6901).
//!
//! Used for two kinds of paths:
//! 1. **Schema paths** (`#/properties/a/items`) reported in [`crate::CompileError`]s
//! 2. **Data paths** (`/a/0`) reported in [`crate::Issue`]s
//!
//! plus the final-segment lookup that maps a `$ref` onto a definition name.

use std::borrow::Cow;

/// Escape a single path segment per RFC 6901.
///
/// - `~` → `~0`
/// - `/` → `~1`
///
/// Returns `Cow::Borrowed` when no escaping is needed (the common case).
pub fn escape_pointer_segment(segment: &str) -> Cow<'_, str> {
    if segment.contains('~') || segment.contains('/') {
        Cow::Owned(segment.replace('~', "~0").replace('/', "~1"))
    } else {
        Cow::Borrowed(segment)
    }
}

/// Unescape a single path segment per RFC 6901.
///
/// Order matters: unescape `~1` first to avoid double-unescaping.
pub fn unescape_pointer_segment(segment: &str) -> Cow<'_, str> {
    if segment.contains("~0") || segment.contains("~1") {
        Cow::Owned(segment.replace("~1", "/").replace("~0", "~"))
    } else {
        Cow::Borrowed(segment)
    }
}

/// Build a JSON Pointer path by appending segments to a parent path.
///
/// # Example
/// ```
/// use jsonschema_validate_core::build_path;
/// assert_eq!(build_path("#", &["properties", "a/b"]), "#/properties/a~1b");
/// assert_eq!(build_path("", &["tags", "0"]), "/tags/0");
/// ```
pub fn build_path(parent: &str, segments: &[&str]) -> String {
    let mut path = parent.to_string();
    for segment in segments {
        path.push('/');
        path.push_str(&escape_pointer_segment(segment));
    }
    path
}

/// Definition name a `$ref` points at: its final `/`-separated segment.
///
/// `"#/$defs/TreeNode"` → `"TreeNode"`, `"#/definitions/a~1b"` → `"a/b"`,
/// `"Plain"` → `"Plain"`.
pub(crate) fn ref_target_name(reference: &str) -> Cow<'_, str> {
    let last = reference.rsplit('/').next().unwrap_or(reference);
    unescape_pointer_segment(last)
}
