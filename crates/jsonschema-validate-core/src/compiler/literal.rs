//! `enum` and `const`.

use crate::node::LiteralSet;
use crate::validator::Validator;

pub(super) fn compile_literal(set: LiteralSet<'_>) -> Validator {
    match set {
        LiteralSet::Const(value) => Validator::Literal(value.clone()),
        LiteralSet::Enum([]) => Validator::Union(Vec::new()),
        LiteralSet::Enum([single]) => Validator::Literal(single.clone()),
        LiteralSet::Enum(values) => {
            let strings: Option<Vec<String>> = values
                .iter()
                .map(|v| v.as_str().map(str::to_string))
                .collect();
            match strings {
                Some(strings) => Validator::StringEnum(strings),
                None => Validator::Union(values.iter().cloned().map(Validator::Literal).collect()),
            }
        }
    }
}
