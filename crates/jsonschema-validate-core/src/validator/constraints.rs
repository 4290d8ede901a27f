//! Per-type constraint rules for string, number and array validators.
//!
//! Every rule is optional. A rule that is `None` imposes nothing; all rules
//! that are present are checked, and every violation becomes its own
//! [`Issue`] (constraints are conjunctive, so order does not matter).

use std::cmp::Ordering;

use regex::Regex;
use serde_json::{Number, Value};

use super::formats::StringFormat;
use crate::error::{Issue, IssueKind};

// ---------------------------------------------------------------------------
// Strings
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default)]
pub struct StringRules {
    pub min_length: Option<u64>,
    pub max_length: Option<u64>,
    /// Unanchored: matches if the pattern occurs anywhere in the string.
    pub pattern: Option<Regex>,
    pub format: Option<StringFormat>,
}

impl StringRules {
    pub(crate) fn check(&self, s: &str, path: &str, issues: &mut Vec<Issue>) {
        let char_count = s.chars().count() as u64;

        if let Some(min) = self.min_length {
            if char_count < min {
                issues.push(Issue::new(
                    path,
                    IssueKind::TooShort { min_length: min },
                    format!("string length {} is less than minLength {}", char_count, min),
                ));
            }
        }

        if let Some(max) = self.max_length {
            if char_count > max {
                issues.push(Issue::new(
                    path,
                    IssueKind::TooLong { max_length: max },
                    format!("string length {} exceeds maxLength {}", char_count, max),
                ));
            }
        }

        if let Some(re) = &self.pattern {
            if !re.is_match(s) {
                issues.push(Issue::new(
                    path,
                    IssueKind::PatternMismatch {
                        pattern: re.as_str().to_string(),
                    },
                    format!("value {:?} does not match pattern {:?}", s, re.as_str()),
                ));
            }
        }

        if let Some(format) = self.format {
            if !format.matches(s) {
                issues.push(Issue::new(
                    path,
                    IssueKind::InvalidFormat {
                        format: format.as_str().to_string(),
                    },
                    format!("value {:?} is not a valid {}", s, format.as_str()),
                ));
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Numbers
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq)]
pub struct NumberRules {
    /// Require a whole number (`type: "integer"`).
    pub integer: bool,
    pub minimum: Option<Number>,
    pub exclusive_minimum: Option<Number>,
    pub maximum: Option<Number>,
    pub exclusive_maximum: Option<Number>,
    pub multiple_of: Option<Number>,
}

impl NumberRules {
    pub(crate) fn check(&self, n: &Number, path: &str, issues: &mut Vec<Issue>) {
        if self.integer && !is_whole(n) {
            issues.push(Issue::new(
                path,
                IssueKind::NotInteger,
                format!("expected an integer, got {}", n),
            ));
        }

        let bounds: [(&str, &Option<Number>, fn(Ordering) -> bool, &str); 4] = [
            ("minimum", &self.minimum, |o| o != Ordering::Less, "is less than minimum"),
            (
                "exclusiveMinimum",
                &self.exclusive_minimum,
                |o| o == Ordering::Greater,
                "is not greater than exclusive minimum",
            ),
            ("maximum", &self.maximum, |o| o != Ordering::Greater, "exceeds maximum"),
            (
                "exclusiveMaximum",
                &self.exclusive_maximum,
                |o| o == Ordering::Less,
                "is not less than exclusive maximum",
            ),
        ];

        for (constraint, bound, accepts, phrase) in bounds {
            let Some(bound) = bound else { continue };
            if !accepts(compare_numbers(n, bound)) {
                issues.push(Issue::new(
                    path,
                    IssueKind::OutOfRange {
                        constraint: constraint.to_string(),
                        bound: Value::Number(bound.clone()),
                    },
                    format!("value {} {} {}", n, phrase, bound),
                ));
            }
        }

        if let Some(step) = &self.multiple_of {
            if !is_multiple_of(n, step) {
                issues.push(Issue::new(
                    path,
                    IssueKind::NotMultipleOf {
                        multiple_of: Value::Number(step.clone()),
                    },
                    format!("value {} is not a multiple of {}", n, step),
                ));
            }
        }
    }
}

/// Compare two JSON numbers exactly when both fit the same integer type,
/// falling back to `f64` otherwise.
fn compare_numbers(a: &Number, b: &Number) -> Ordering {
    if let (Some(x), Some(y)) = (a.as_i64(), b.as_i64()) {
        return x.cmp(&y);
    }
    if let (Some(x), Some(y)) = (a.as_u64(), b.as_u64()) {
        return x.cmp(&y);
    }
    match (a.as_f64(), b.as_f64()) {
        (Some(x), Some(y)) => x.partial_cmp(&y).unwrap_or(Ordering::Equal),
        _ => Ordering::Equal,
    }
}

fn is_whole(n: &Number) -> bool {
    if n.is_i64() || n.is_u64() {
        return true;
    }
    n.as_f64().is_some_and(|f| f.is_finite() && f.fract() == 0.0)
}

/// `multipleOf` check that tolerates binary floating-point noise
/// (`0.3` is a multiple of `0.1`).
fn is_multiple_of(n: &Number, step: &Number) -> bool {
    // Integers are compared exactly on their magnitudes, across the whole
    // i64 and u64 range.
    if let (Some(x), Some(y)) = (integer_magnitude(n), integer_magnitude(step)) {
        return y != 0 && x % y == 0;
    }
    let (Some(value), Some(step)) = (n.as_f64(), step.as_f64()) else {
        return false;
    };
    if step == 0.0 {
        return false;
    }

    let decimals = decimal_places(value).max(decimal_places(step));
    if decimals <= 15 {
        let scale = 10f64.powi(decimals as i32);
        let scaled_value = (value * scale).round();
        let scaled_step = (step * scale).round();
        // Above 2^53 scaled values stop being exact integers.
        if scaled_step != 0.0 && scaled_value.abs() < 9.0e15 && scaled_step.abs() < 9.0e15 {
            return scaled_value % scaled_step == 0.0;
        }
    }

    let quotient = value / step;
    (quotient - quotient.round()).abs() < 1e-9
}

fn integer_magnitude(n: &Number) -> Option<u64> {
    n.as_u64().or_else(|| n.as_i64().map(i64::unsigned_abs))
}

fn decimal_places(f: f64) -> usize {
    let repr = f.to_string();
    repr.split_once('.').map_or(0, |(_, frac)| frac.len())
}

// ---------------------------------------------------------------------------
// Arrays
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ItemBounds {
    pub min_items: Option<u64>,
    pub max_items: Option<u64>,
}

impl ItemBounds {
    pub(crate) fn check(&self, len: usize, path: &str, issues: &mut Vec<Issue>) {
        let len = len as u64;
        if let Some(min) = self.min_items {
            if len < min {
                issues.push(Issue::new(
                    path,
                    IssueKind::TooFewItems { min_items: min },
                    format!("array length {} is less than minItems {}", len, min),
                ));
            }
        }
        if let Some(max) = self.max_items {
            if len > max {
                issues.push(Issue::new(
                    path,
                    IssueKind::TooManyItems { max_items: max },
                    format!("array length {} exceeds maxItems {}", len, max),
                ));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn num(v: Value) -> Number {
        match v {
            Value::Number(n) => n,
            other => panic!("not a number: {other}"),
        }
    }

    fn number_issues(rules: &NumberRules, v: Value) -> Vec<IssueKind> {
        let mut issues = Vec::new();
        rules.check(&num(v), "", &mut issues);
        issues.into_iter().map(|i| i.kind).collect()
    }

    #[test]
    fn test_integer_rejects_fraction_but_accepts_whole_float() {
        let rules = NumberRules {
            integer: true,
            ..Default::default()
        };
        assert_eq!(number_issues(&rules, json!(3.5)), vec![IssueKind::NotInteger]);
        assert!(number_issues(&rules, json!(4.0)).is_empty());
        assert!(number_issues(&rules, json!(-4)).is_empty());
    }

    #[test]
    fn test_inclusive_bounds_accept_the_bound() {
        let rules = NumberRules {
            minimum: Some(num(json!(0))),
            maximum: Some(num(json!(10))),
            ..Default::default()
        };
        assert!(number_issues(&rules, json!(0)).is_empty());
        assert!(number_issues(&rules, json!(10)).is_empty());
        assert_eq!(number_issues(&rules, json!(-1)).len(), 1);
        assert_eq!(number_issues(&rules, json!(10.5)).len(), 1);
    }

    #[test]
    fn test_exclusive_bounds_reject_the_bound() {
        let rules = NumberRules {
            exclusive_minimum: Some(num(json!(0))),
            exclusive_maximum: Some(num(json!(1.5))),
            ..Default::default()
        };
        assert!(number_issues(&rules, json!(0.5)).is_empty());
        assert_eq!(
            number_issues(&rules, json!(0)),
            vec![IssueKind::OutOfRange {
                constraint: "exclusiveMinimum".to_string(),
                bound: json!(0),
            }]
        );
        assert_eq!(number_issues(&rules, json!(1.5)).len(), 1);
    }

    #[test]
    fn test_all_violations_are_reported() {
        let rules = NumberRules {
            integer: true,
            maximum: Some(num(json!(1))),
            multiple_of: Some(num(json!(2))),
            ..Default::default()
        };
        assert_eq!(number_issues(&rules, json!(2.5)).len(), 3);
    }

    #[test]
    fn test_multiple_of_handles_decimal_steps() {
        assert!(is_multiple_of(&num(json!(0.3)), &num(json!(0.1))));
        assert!(is_multiple_of(&num(json!(10)), &num(json!(2.5))));
        assert!(!is_multiple_of(&num(json!(0.35)), &num(json!(0.1))));
        assert!(is_multiple_of(&num(json!(-9)), &num(json!(3))));
        assert!(!is_multiple_of(&num(json!(7)), &num(json!(0))));
    }

    #[test]
    fn test_multiple_of_is_exact_for_large_integers() {
        let three = num(json!(3));
        assert!(!is_multiple_of(&num(json!(10_000_000_000_000_000_001u64)), &three));
        assert!(is_multiple_of(&num(json!(10_000_000_000_000_000_002u64)), &three));
        assert!(is_multiple_of(&num(json!(u64::MAX)), &three));
        assert!(!is_multiple_of(&num(json!(i64::MIN + 1)), &num(json!(2))));
        assert!(is_multiple_of(&num(json!(u64::MAX - 5)), &num(json!(-5))));
        assert!(!is_multiple_of(&num(json!(-1)), &num(json!(u64::MAX))));

        let rules = NumberRules {
            integer: true,
            multiple_of: Some(three),
            ..Default::default()
        };
        let issues = number_issues(&rules, json!(10_000_000_000_000_000_001u64));
        assert_eq!(issues.len(), 1);
        assert!(matches!(issues[0], IssueKind::NotMultipleOf { .. }));
    }

    #[test]
    fn test_large_unsigned_compares_exactly() {
        let big = num(json!(u64::MAX));
        let bound = num(json!(u64::MAX - 1));
        assert_eq!(compare_numbers(&big, &bound), Ordering::Greater);
        assert_eq!(compare_numbers(&num(json!(-1)), &big), Ordering::Less);
    }

    #[test]
    fn test_string_length_counts_chars_not_bytes() {
        let rules = StringRules {
            min_length: Some(2),
            max_length: Some(3),
            ..Default::default()
        };
        let mut issues = Vec::new();
        rules.check("héé", "/name", &mut issues);
        assert!(issues.is_empty());
        rules.check("ü", "/name", &mut issues);
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].path, "/name");
        assert_eq!(issues[0].kind, IssueKind::TooShort { min_length: 2 });
    }

    #[test]
    fn test_pattern_is_unanchored() {
        let rules = StringRules {
            pattern: Some(Regex::new("[0-9]+").unwrap()),
            ..Default::default()
        };
        let mut issues = Vec::new();
        rules.check("abc123def", "", &mut issues);
        assert!(issues.is_empty());
        rules.check("abc", "", &mut issues);
        assert!(matches!(issues[0].kind, IssueKind::PatternMismatch { .. }));
    }

    #[test]
    fn test_item_bounds_are_inclusive() {
        let bounds = ItemBounds {
            min_items: Some(1),
            max_items: Some(2),
        };
        let mut issues = Vec::new();
        bounds.check(1, "", &mut issues);
        bounds.check(2, "", &mut issues);
        assert!(issues.is_empty());
        bounds.check(0, "", &mut issues);
        bounds.check(3, "", &mut issues);
        assert_eq!(
            issues.into_iter().map(|i| i.kind).collect::<Vec<_>>(),
            vec![
                IssueKind::TooFewItems { min_items: 1 },
                IssueKind::TooManyItems { max_items: 2 }
            ]
        );
    }
}
