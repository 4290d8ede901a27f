#![no_main]

use libfuzzer_sys::fuzz_target;

// Arbitrary bytes, parsed as JSON, compiled as a schema and then used to
// validate the schema document itself. Goal: no panics, even on malformed input.
fuzz_target!(|data: &[u8]| {
    if let Ok(schema) = serde_json::from_slice::<serde_json::Value>(data) {
        if let Ok(validator) = jsonschema_validate_core::compile(&schema) {
            let _ = validator.parse(&schema);
            let _ = validator.parse_optional(None);
        }
    }
});
