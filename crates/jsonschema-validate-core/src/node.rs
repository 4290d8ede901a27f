//! Schema node classification.
//!
//! A raw schema object may legally carry several recognised keywords at once
//! (`$ref` next to `type`, `anyOf` next to `description`, ...). [`classify`]
//! resolves that ambiguity once, in a fixed precedence order, so the compiler
//! can `match` on a single tagged value instead of probing fields.
//!
//! | Precedence | Keyword                               | Variant                       |
//! |------------|---------------------------------------|-------------------------------|
//! | 1          | `$ref` (non-empty string)             | [`SchemaNode::Reference`]     |
//! | 2          | `anyOf` (array)                       | [`SchemaNode::Union`]         |
//! | 3          | `type` (array)                        | [`SchemaNode::TypeArray`]     |
//! | 4          | `enum` (array) / `const`              | [`SchemaNode::Literal`]       |
//! | 5          | `type` (recognised name)              | [`SchemaNode::Primitive`]     |
//! | 6          | `properties`                          | [`SchemaNode::ImplicitObject`]|
//! | 7          | anything else                         | [`SchemaNode::Unknown`]       |

use std::fmt;

use serde_json::{Map, Value};

/// The type names a schema node may declare in `type`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrimitiveType {
    String,
    Number,
    Integer,
    Boolean,
    Null,
    Array,
    Object,
}

impl PrimitiveType {
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "string" => Some(Self::String),
            "number" => Some(Self::Number),
            "integer" => Some(Self::Integer),
            "boolean" => Some(Self::Boolean),
            "null" => Some(Self::Null),
            "array" => Some(Self::Array),
            "object" => Some(Self::Object),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Number => "number",
            Self::Integer => "integer",
            Self::Boolean => "boolean",
            Self::Null => "null",
            Self::Array => "array",
            Self::Object => "object",
        }
    }
}

impl fmt::Display for PrimitiveType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Literal keyword found on a node.
#[derive(Debug, Clone, Copy)]
pub(crate) enum LiteralSet<'a> {
    Enum(&'a [Value]),
    Const(&'a Value),
}

/// Classified view of one schema object. Borrows from the raw node.
#[derive(Debug, Clone, Copy)]
pub(crate) enum SchemaNode<'a> {
    Reference(&'a str),
    Union(&'a [Value]),
    TypeArray(&'a [Value]),
    Literal(LiteralSet<'a>),
    Primitive(PrimitiveType),
    ImplicitObject,
    Unknown,
}

/// Classify a schema object by the first matching keyword rule.
///
/// Keywords with the wrong JSON shape (`anyOf: {}`, `$ref: 3`) are skipped
/// with a warning and classification moves on to the next rule.
pub(crate) fn classify(obj: &Map<String, Value>) -> SchemaNode<'_> {
    match obj.get("$ref") {
        Some(Value::String(reference)) if !reference.is_empty() => {
            return SchemaNode::Reference(reference);
        }
        Some(other) => {
            tracing::warn!(value = %other, "ignoring malformed $ref");
        }
        None => {}
    }

    match obj.get("anyOf") {
        Some(Value::Array(variants)) => return SchemaNode::Union(variants),
        Some(other) => {
            tracing::warn!(value = %other, "ignoring anyOf that is not an array");
        }
        None => {}
    }

    let declared_type = obj.get("type");
    if let Some(Value::Array(names)) = declared_type {
        return SchemaNode::TypeArray(names);
    }

    match obj.get("enum") {
        Some(Value::Array(values)) => return SchemaNode::Literal(LiteralSet::Enum(values)),
        Some(other) => {
            tracing::warn!(value = %other, "ignoring enum that is not an array");
        }
        None => {}
    }
    if let Some(value) = obj.get("const") {
        return SchemaNode::Literal(LiteralSet::Const(value));
    }

    if let Some(primitive) = declared_type
        .and_then(Value::as_str)
        .and_then(PrimitiveType::from_name)
    {
        return SchemaNode::Primitive(primitive);
    }

    if obj.contains_key("properties") {
        return SchemaNode::ImplicitObject;
    }

    SchemaNode::Unknown
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn classify_value(value: &Value) -> SchemaNode<'_> {
        classify(value.as_object().unwrap())
    }

    #[test]
    fn test_ref_wins_over_everything() {
        let schema = json!({"$ref": "#/$defs/A", "anyOf": [], "type": "string"});
        assert!(matches!(
            classify_value(&schema),
            SchemaNode::Reference("#/$defs/A")
        ));
    }

    #[test]
    fn test_any_of_wins_over_type_array() {
        let schema = json!({"anyOf": [{"type": "string"}], "type": ["string", "null"]});
        assert!(matches!(classify_value(&schema), SchemaNode::Union(v) if v.len() == 1));
    }

    #[test]
    fn test_type_array_wins_over_enum() {
        let schema = json!({"type": ["string", "null"], "enum": ["a", null]});
        assert!(matches!(classify_value(&schema), SchemaNode::TypeArray(_)));
    }

    #[test]
    fn test_enum_wins_over_primitive_type() {
        let schema = json!({"type": "string", "enum": ["a", "b"]});
        assert!(matches!(
            classify_value(&schema),
            SchemaNode::Literal(LiteralSet::Enum(_))
        ));
    }

    #[test]
    fn test_falsy_const_is_still_a_literal() {
        let schema = json!({"const": false});
        assert!(matches!(
            classify_value(&schema),
            SchemaNode::Literal(LiteralSet::Const(Value::Bool(false)))
        ));
    }

    #[test]
    fn test_properties_without_type_is_implicit_object() {
        let schema = json!({"properties": {"a": {}}});
        assert!(matches!(classify_value(&schema), SchemaNode::ImplicitObject));

        let schema = json!({"type": "thing", "properties": {"a": {}}});
        assert!(matches!(classify_value(&schema), SchemaNode::ImplicitObject));
    }

    #[test]
    fn test_malformed_keywords_fall_through() {
        let schema = json!({"$ref": 7, "anyOf": {"a": 1}, "enum": "x", "type": "integer"});
        assert!(matches!(
            classify_value(&schema),
            SchemaNode::Primitive(PrimitiveType::Integer)
        ));
    }

    #[test]
    fn test_empty_ref_is_ignored() {
        let schema = json!({"$ref": ""});
        assert!(matches!(classify_value(&schema), SchemaNode::Unknown));
    }

    #[test]
    fn test_unknown_type_name_is_unknown() {
        let schema = json!({"type": "date", "description": "when"});
        assert!(matches!(classify_value(&schema), SchemaNode::Unknown));
    }
}
