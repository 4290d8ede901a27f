//! Property-based negative tests.
//!
//! The invariant under test is **no panics**: `compile()` returns either `Ok`
//! or a `CompileError` for any JSON input, and a compiled validator returns
//! either `Ok` or a `ConformanceFailure` for any candidate value.

use jsonschema_validate_core::{compile, CompileError};
use proptest::prelude::*;
use serde_json::{json, Map, Value};

// ===========================================================================
// 1. Deterministic negative tests: known malformed schemas
// ===========================================================================

#[test]
fn malformed_keywords_fall_back_gracefully() {
    let schemas = [
        json!({ "$ref": 42 }),
        json!({ "$ref": "" }),
        json!({ "anyOf": { "not": "an_array" } }),
        json!({ "anyOf": [] }),
        json!({ "enum": "red" }),
        json!({ "type": [] }),
        json!({ "type": [1, null, {}] }),
        json!({ "type": "string", "minLength": "3", "maxLength": -2 }),
        json!({ "type": "number", "minimum": [], "multipleOf": -1 }),
        json!({ "type": "array", "items": [{ "type": "string" }], "minItems": 1.5 }),
        json!({ "type": "object", "properties": [], "required": { "a": true } }),
        json!({ "type": "object", "additionalProperties": 5 }),
        json!({ "properties": { "a": "not a schema" } }),
    ];
    for schema in schemas {
        let v = compile(&schema).unwrap_or_else(|e| panic!("{schema} failed: {e}"));
        let _ = v.parse(&json!({ "a": [1, "b", null] }));
        let _ = v.parse(&json!(null));
    }
}

#[test]
fn ref_into_empty_pool_is_an_error() {
    let err = compile(&json!({ "$ref": "#/$defs/Nowhere" })).unwrap_err();
    assert!(matches!(err, CompileError::SchemaResolution { .. }));
}

#[test]
fn definition_that_only_refers_to_itself() {
    let v = compile(&json!({
        "$defs": { "Loop": { "$ref": "#/$defs/Loop" } },
        "$ref": "#/$defs/Loop"
    }))
    .unwrap();
    // `Loop` never reaches a nested value, so nothing can satisfy it.
    assert!(!v.check(&json!(1)));
    assert!(!v.check(&json!(null)));
}

// ===========================================================================
// 2. Generated inputs
// ===========================================================================

fn arb_json() -> impl Strategy<Value = Value> {
    let leaf = prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::Bool),
        any::<i64>().prop_map(|n| json!(n)),
        (-1.0e6f64..1.0e6).prop_map(|f| json!(f)),
        "[a-z]{0,6}".prop_map(Value::String),
    ];
    leaf.prop_recursive(4, 32, 4, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..4).prop_map(Value::Array),
            prop::collection::vec(("[a-z]{1,4}", inner), 0..4)
                .prop_map(|entries| Value::Object(entries.into_iter().collect::<Map<_, _>>())),
        ]
    })
}

fn arb_keyword() -> impl Strategy<Value = (&'static str, Value)> {
    let name = prop_oneof![
        Just("type"),
        Just("anyOf"),
        Just("enum"),
        Just("const"),
        Just("properties"),
        Just("required"),
        Just("additionalProperties"),
        Just("items"),
        Just("minLength"),
        Just("maxLength"),
        Just("pattern"),
        Just("format"),
        Just("minimum"),
        Just("exclusiveMaximum"),
        Just("multipleOf"),
        Just("minItems"),
        Just("$ref"),
    ];
    (name, arb_json())
}

fn arb_schema() -> impl Strategy<Value = Value> {
    let known_types = prop_oneof![
        Just(json!("string")),
        Just(json!("number")),
        Just(json!("integer")),
        Just(json!("object")),
        Just(json!("array")),
        Just(json!(["string", "null"])),
    ];
    (known_types, prop::collection::vec(arb_keyword(), 0..5)).prop_map(|(ty, keywords)| {
        let mut obj = Map::new();
        obj.insert("type".to_string(), ty);
        for (key, value) in keywords {
            obj.insert(key.to_string(), value);
        }
        Value::Object(obj)
    })
}

proptest! {
    #![proptest_config(ProptestConfig { cases: 128, ..Default::default() })]

    /// Property: `compile()` never panics on arbitrary JSON.
    #[test]
    fn compile_never_panics_on_arbitrary_json(schema in arb_json()) {
        let _ = compile(&schema);
    }

    /// Property: keyword soup on top of a real type never panics, and a
    /// compiled validator never panics on arbitrary data.
    #[test]
    fn validators_never_panic(schema in arb_schema(), data in arb_json()) {
        if let Ok(v) = compile(&schema) {
            let checked = v.check(&data);
            let parsed = v.parse(&data);
            prop_assert_eq!(checked, parsed.is_ok());
            let _ = v.matched_variant(&data);
            let _ = v.parse_optional(None);
        }
    }
}
